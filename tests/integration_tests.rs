//! Integration tests for the translation history service
//!
//! These tests run the HTTP router against an in-memory store and a mocked DeepL
//! API, covering seeding, the translation form, and the history endpoints.
//! PostgreSQL-backed tests live in src/db.rs and are ignored by default.

use serde_json::{json, Value};
use std::sync::Arc;
use wiremock::{
    matchers::{body_partial_json, header, method, path, query_param},
    Mock, MockServer, ResponseTemplate,
};

use translation_history::deepl::DeepLClient;
use translation_history::seeding::seed_languages;
use translation_history::service::TranslationService;
use translation_history::store::{LanguageStore, MemoryStore, TranslationStore};
use translation_history::web::{self, AppState};

const AUTH_KEY: &str = "test-key:fx";

// Catalog ids after seeding with the mocked language lists below
const ENGLISH: i32 = 1;
const GERMAN: i32 = 2;
const ENGLISH_US: i32 = 3;
const DETECT: i32 = 5;

// ==================== Test Helpers ====================

async fn mount_language_lists(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/v2/languages"))
        .and(query_param("type", "source"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"language": "EN", "name": "English"},
            {"language": "DE", "name": "German"}
        ])))
        .mount(server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v2/languages"))
        .and(query_param("type", "target"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([
            {"language": "DE", "name": "German"},
            {"language": "EN-US", "name": "English (American)"},
            {"language": "EN-GB", "name": "English (British)"}
        ])))
        .mount(server)
        .await;
}

struct TestApp {
    base_url: String,
    client: reqwest::Client,
    store: MemoryStore,
}

impl TestApp {
    fn url(&self, route: &str) -> String {
        format!("{}{}", self.base_url, route)
    }

    async fn translate(&self, body: Value) -> reqwest::Response {
        self.client
            .post(self.url("/"))
            .json(&body)
            .send()
            .await
            .expect("Failed to send request")
    }

    async fn get(&self, route: &str) -> reqwest::Response {
        self.client
            .get(self.url(route))
            .send()
            .await
            .expect("Failed to send request")
    }

    async fn delete(&self, route: &str) -> reqwest::Response {
        self.client
            .delete(self.url(route))
            .send()
            .await
            .expect("Failed to send request")
    }
}

/// Start the router on a random port. The catalog is seeded from `seed_from` when
/// given; translations go to `deepl_url`.
async fn spawn_app(seed_from: Option<&MockServer>, deepl_url: &str) -> TestApp {
    let store = MemoryStore::new();

    if let Some(server) = seed_from {
        let seeder = DeepLClient::new(server.uri(), AUTH_KEY).expect("client");
        seed_languages(&store, &seeder).await.expect("seeding");
    }

    let provider = Arc::new(DeepLClient::new(deepl_url, AUTH_KEY).expect("client"));
    let state = AppState::new(
        Arc::new(store.clone()),
        Arc::new(store.clone()),
        TranslationService::new(provider),
    );

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
        .await
        .expect("Failed to bind");
    let addr = listener.local_addr().expect("local addr");
    tokio::spawn(async move {
        axum::serve(listener, web::router(state))
            .await
            .expect("server");
    });

    TestApp {
        base_url: format!("http://{}", addr),
        client: reqwest::Client::new(),
        store,
    }
}

async fn seeded_app() -> (TestApp, MockServer) {
    let server = MockServer::start().await;
    mount_language_lists(&server).await;
    let app = spawn_app(Some(&server), &server.uri()).await;
    (app, server)
}

// ==================== Seeding ====================

#[tokio::test]
async fn test_seeding_builds_catalog() {
    let (app, _server) = seeded_app().await;

    let languages: Vec<Value> = app.get("/languages").await.json().await.unwrap();
    let codes: Vec<&str> = languages
        .iter()
        .map(|l| l["abbreviation"].as_str().unwrap())
        .collect();

    // The synthetic English entry collides with the provider's and is stored once
    assert_eq!(codes, vec!["en", "de", "en-US", "en-GB", "DL"]);
    assert_eq!(languages[0]["id"], ENGLISH);
    assert_eq!(languages[4]["id"], DETECT);
}

#[tokio::test]
async fn test_reseeding_is_idempotent() {
    let (app, server) = seeded_app().await;
    let seeder = DeepLClient::new(server.uri(), AUTH_KEY).unwrap();

    let inserted = seed_languages(&app.store, &seeder).await.unwrap();

    assert_eq!(inserted, 0);
    assert_eq!(app.store.list_languages().await.unwrap().len(), 5);
}

#[tokio::test]
async fn test_seeding_fails_when_provider_unavailable() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v2/languages"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({"message": "Forbidden"})))
        .mount(&server)
        .await;

    let store = MemoryStore::new();
    let client = DeepLClient::new(server.uri(), AUTH_KEY).unwrap();

    assert!(seed_languages(&store, &client).await.is_err());
    assert!(store.list_languages().await.unwrap().is_empty());
}

// ==================== Form ====================

#[tokio::test]
async fn test_health() {
    let (app, _server) = seeded_app().await;

    let response = app.get("/health").await;
    assert_eq!(response.status(), 200);
    assert_eq!(response.text().await.unwrap(), "OK");
}

#[tokio::test]
async fn test_form_preselects_defaults() {
    let (app, _server) = seeded_app().await;

    let response = app.get("/").await;
    assert_eq!(response.status(), 200);

    let view_model: Value = response.json().await.unwrap();
    assert_eq!(view_model["selectedOriginId"], DETECT);
    assert_eq!(view_model["selectedTargetId"], GERMAN);
    assert_eq!(view_model["originLanguages"].as_array().unwrap().len(), 3);
    assert_eq!(view_model["targetLanguages"].as_array().unwrap().len(), 3);
    assert_eq!(view_model["wellKnown"]["englishUs"], ENGLISH_US);
}

#[tokio::test]
async fn test_form_without_catalog_is_not_found() {
    let server = MockServer::start().await;
    let app = spawn_app(None, &server.uri()).await;

    let response = app.get("/").await;
    assert_eq!(response.status(), 404);
}

// ==================== Translation ====================

#[tokio::test]
async fn test_translate_and_browse_history() {
    let (app, server) = seeded_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(header("Authorization", "DeepL-Auth-Key test-key:fx"))
        .and(body_partial_json(json!({
            "text": ["This is a test"],
            "source_lang": "EN",
            "target_lang": "DE"
        })))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translations": [{"detected_source_language": "EN", "text": "Dies ist ein Test"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = app
        .translate(json!({
            "languageFrom": ENGLISH,
            "languageTo": GERMAN,
            "originalText": "This is a test"
        }))
        .await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    let translation = &body["translation"];
    assert_eq!(translation["id"], 1);
    assert_eq!(translation["originalText"], "This is a test");
    assert_eq!(translation["translatedText"], "Dies ist ein Test");
    assert_eq!(translation["originLanguage"]["abbreviation"], "en");
    assert_eq!(translation["targetLanguage"]["abbreviation"], "de");
    assert!(translation["translatedAt"].is_string());

    // The form keeps the user's selection
    assert_eq!(body["viewModel"]["selectedOriginId"], ENGLISH);
    assert_eq!(body["viewModel"]["selectedTargetId"], GERMAN);

    let history: Vec<Value> = app.get("/history").await.json().await.unwrap();
    assert_eq!(history.len(), 1);
    assert_eq!(history[0]["translatedText"], "Dies ist ein Test");

    let details = app.get("/history/1").await;
    assert_eq!(details.status(), 200);
    let details: Value = details.json().await.unwrap();
    assert_eq!(details["originalText"], "This is a test");

    assert_eq!(app.delete("/history/1").await.status(), 204);
    assert_eq!(app.get("/history/1").await.status(), 404);
    assert_eq!(app.delete("/history/1").await.status(), 404);

    let history: Vec<Value> = app.get("/history").await.json().await.unwrap();
    assert!(history.is_empty());
}

#[tokio::test]
async fn test_translate_with_detected_origin() {
    let (app, server) = seeded_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .and(body_partial_json(json!({"text": ["Bonjour"], "target_lang": "EN-US"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "translations": [{"detected_source_language": "FR", "text": "Hello"}]
        })))
        .expect(1)
        .mount(&server)
        .await;

    let response = app
        .translate(json!({
            "languageFrom": DETECT,
            "languageTo": ENGLISH_US,
            "originalText": "Bonjour"
        }))
        .await;
    assert_eq!(response.status(), 201);

    let body: Value = response.json().await.unwrap();
    assert_eq!(body["translation"]["translatedText"], "Hello");
    assert_eq!(body["translation"]["originLanguage"]["abbreviation"], "DL");
}

#[tokio::test]
async fn test_missing_language_selection_is_rejected() {
    let (app, server) = seeded_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for body in [
        json!({"languageFrom": 0, "languageTo": GERMAN, "originalText": "Hello"}),
        json!({"languageFrom": ENGLISH, "originalText": "Hello"}),
        json!({"languageFrom": 99, "languageTo": GERMAN, "originalText": "Hello"}),
    ] {
        let response = app.translate(body).await;
        assert_eq!(response.status(), 400);

        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], "invalid_argument");
        assert!(error["message"]
            .as_str()
            .unwrap()
            .contains("Invalid language selection"));
    }

    assert!(app.store.list_translations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_missing_or_oversized_text_is_rejected() {
    let (app, server) = seeded_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    for body in [
        json!({"languageFrom": ENGLISH, "languageTo": GERMAN}),
        json!({"languageFrom": ENGLISH, "languageTo": GERMAN, "originalText": ""}),
        json!({"languageFrom": ENGLISH, "languageTo": GERMAN, "originalText": "a".repeat(501)}),
    ] {
        let response = app.translate(body).await;
        assert_eq!(response.status(), 400);

        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], "invalid_argument");
    }
}

// ==================== Provider Failures ====================

#[tokio::test]
async fn test_quota_exceeded() {
    let (app, server) = seeded_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .respond_with(
            ResponseTemplate::new(456).set_body_json(json!({"message": "Quota exceeded"})),
        )
        .expect(1)
        .mount(&server)
        .await;

    let response = app
        .translate(json!({"languageFrom": ENGLISH, "languageTo": GERMAN, "originalText": "Hi"}))
        .await;
    assert_eq!(response.status(), 503);

    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "provider_quota_exceeded");
    assert!(error["message"].as_str().unwrap().contains("Quota exceeded"));

    // Nothing is stored for failed translations
    assert!(app.store.list_translations().await.unwrap().is_empty());
}

#[tokio::test]
async fn test_rejected_language_pair() {
    let (app, server) = seeded_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "message": "Value for 'target_lang' not supported."
        })))
        .mount(&server)
        .await;

    let response = app
        .translate(json!({"languageFrom": GERMAN, "languageTo": GERMAN, "originalText": "Hallo"}))
        .await;
    assert_eq!(response.status(), 422);

    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "provider_request");
    assert!(error["message"].as_str().unwrap().contains("target_lang"));
}

#[tokio::test]
async fn test_unreachable_provider() {
    let catalog = MockServer::start().await;
    mount_language_lists(&catalog).await;

    // Nothing listens on port 1
    let app = spawn_app(Some(&catalog), "http://127.0.0.1:1").await;

    let response = app
        .translate(json!({"languageFrom": ENGLISH, "languageTo": GERMAN, "originalText": "Hi"}))
        .await;
    assert_eq!(response.status(), 502);

    let error: Value = response.json().await.unwrap();
    assert_eq!(error["error"], "provider_connection");
    assert!(error["message"]
        .as_str()
        .unwrap()
        .starts_with("Could not connect to the translation service"));
}

// ==================== History ====================

#[tokio::test]
async fn test_history_details_of_unknown_id() {
    let (app, _server) = seeded_app().await;

    assert_eq!(app.get("/history/42").await.status(), 404);
    assert_eq!(app.delete("/history/42").await.status(), 404);

    let error: Value = app.get("/history/42").await.json().await.unwrap();
    assert_eq!(error["error"], "not_found");
}

// ==================== Malformed Requests ====================

#[tokio::test]
async fn test_malformed_form_body_returns_json_error() {
    let (app, server) = seeded_app().await;

    Mock::given(method("POST"))
        .and(path("/v2/translate"))
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&server)
        .await;

    let broken = app
        .client
        .post(app.url("/"))
        .header("Content-Type", "application/json")
        .body("{not json")
        .send()
        .await
        .expect("Failed to send request");
    assert_eq!(broken.status(), 400);
    let error: Value = broken.json().await.unwrap();
    assert_eq!(error["error"], "invalid_argument");
    assert!(error["message"]
        .as_str()
        .unwrap()
        .starts_with("Invalid request body"));

    let wrong_type = app
        .translate(json!({"languageFrom": "one", "languageTo": GERMAN, "originalText": "Hi"}))
        .await;
    assert_eq!(wrong_type.status(), 400);
    let error: Value = wrong_type.json().await.unwrap();
    assert_eq!(error["error"], "invalid_argument");
}

#[tokio::test]
async fn test_non_numeric_history_id_returns_json_error() {
    let (app, _server) = seeded_app().await;

    for response in [app.get("/history/abc").await, app.delete("/history/abc").await] {
        assert_eq!(response.status(), 400);
        let error: Value = response.json().await.unwrap();
        assert_eq!(error["error"], "invalid_argument");
        assert!(error["message"].as_str().unwrap().starts_with("Invalid path"));
    }
}
