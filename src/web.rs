//! HTTP surface: the translation form, translation history and the language catalog.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::trace::TraceLayer;
use tracing::{error, info, warn};

use crate::error::TranslateError;
use crate::models::{Language, Translation, TranslationDraft, TranslateRequest};
use crate::service::TranslationService;
use crate::store::{LanguageStore, TranslationStore};
use crate::view_model::{build_view_model, CreateTranslationViewModel};

const INVALID_SELECTION: &str = "Invalid language selection. Please choose valid languages.";

/// Shared handler state
#[derive(Clone)]
pub struct AppState {
    pub languages: Arc<dyn LanguageStore>,
    pub translations: Arc<dyn TranslationStore>,
    pub service: TranslationService,
}

impl AppState {
    pub fn new(
        languages: Arc<dyn LanguageStore>,
        translations: Arc<dyn TranslationStore>,
        service: TranslationService,
    ) -> Self {
        Self {
            languages,
            translations,
            service,
        }
    }
}

pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health))
        .route("/", get(show_form).post(submit_translation))
        .route("/history", get(list_history))
        .route("/history/:id", get(show_translation).delete(delete_translation))
        .route("/languages", get(list_languages))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ==================== Request / Response Types ====================

/// Form submission. Ids of 0 (or absent) mean "nothing selected".
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationForm {
    #[serde(default)]
    pub language_from: i32,
    #[serde(default)]
    pub language_to: i32,
    pub original_text: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationResponse {
    pub translation: Translation,
    pub view_model: CreateTranslationViewModel,
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

// ==================== Errors ====================

#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Translate(TranslateError),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::BadRequest(_) => StatusCode::BAD_REQUEST,
            Self::Translate(err) => match err {
                TranslateError::InvalidArgument(_) => StatusCode::BAD_REQUEST,
                TranslateError::ProviderConnection(_) => StatusCode::BAD_GATEWAY,
                TranslateError::ProviderQuotaExceeded(_) => StatusCode::SERVICE_UNAVAILABLE,
                TranslateError::ProviderRequest(_) => StatusCode::UNPROCESSABLE_ENTITY,
                TranslateError::Unexpected(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<TranslateError> for ApiError {
    fn from(err: TranslateError) -> Self {
        Self::Translate(err)
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(format!("Invalid request body: {}", rejection.body_text()))
    }
}

impl From<PathRejection> for ApiError {
    fn from(rejection: PathRejection) -> Self {
        Self::BadRequest(format!("Invalid path: {}", rejection.body_text()))
    }
}

impl From<anyhow::Error> for ApiError {
    fn from(err: anyhow::Error) -> Self {
        Self::Translate(TranslateError::Unexpected(err))
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            Self::NotFound(message) => ErrorResponse {
                error: "not_found".to_string(),
                message,
            },
            Self::BadRequest(message) => ErrorResponse {
                error: "invalid_argument".to_string(),
                message,
            },
            Self::Translate(err) => {
                if status.is_server_error() {
                    error!("Request failed: {:#}", err);
                } else {
                    warn!("Request rejected: {}", err);
                }
                ErrorResponse {
                    error: err.kind().as_str().to_string(),
                    message: err.user_message(),
                }
            }
        };

        (status, Json(body)).into_response()
    }
}

type ApiResult<T> = Result<T, ApiError>;

// ==================== Handlers ====================

async fn health() -> &'static str {
    "OK"
}

async fn show_form(State(state): State<AppState>) -> ApiResult<Json<CreateTranslationViewModel>> {
    let mut view_model = build_view_model(state.languages.as_ref()).await?;

    if view_model.origin_languages.is_empty() || view_model.target_languages.is_empty() {
        return Err(ApiError::NotFound(
            "No languages available. The language catalog has not been seeded.".to_string(),
        ));
    }

    view_model.preselect_defaults();
    Ok(Json(view_model))
}

async fn submit_translation(
    State(state): State<AppState>,
    form: Result<Json<TranslationForm>, JsonRejection>,
) -> ApiResult<(StatusCode, Json<TranslationResponse>)> {
    let Json(form) = form?;
    let origin = resolve_language(state.languages.as_ref(), form.language_from).await?;
    let target = resolve_language(state.languages.as_ref(), form.language_to).await?;

    let request = TranslateRequest {
        translation: Some(TranslationDraft {
            original_text: form.original_text,
            origin_language: Some(origin),
            target_language: Some(target),
        }),
    };

    let completed = state.service.translate(request).await?;
    let translation = state.translations.add_translation(&completed).await?;
    info!("Stored translation {}", translation.id);

    let view_model = build_view_model(state.languages.as_ref())
        .await?
        .with_selection(form.language_from, form.language_to);

    Ok((
        StatusCode::CREATED,
        Json(TranslationResponse {
            translation,
            view_model,
        }),
    ))
}

async fn resolve_language(store: &dyn LanguageStore, id: i32) -> ApiResult<Language> {
    if id == 0 {
        return Err(ApiError::BadRequest(INVALID_SELECTION.to_string()));
    }

    store
        .get_language(id)
        .await?
        .ok_or_else(|| ApiError::BadRequest(INVALID_SELECTION.to_string()))
}

async fn list_history(State(state): State<AppState>) -> ApiResult<Json<Vec<Translation>>> {
    Ok(Json(state.translations.list_translations().await?))
}

async fn show_translation(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<Json<Translation>> {
    let Path(id) = id?;

    state
        .translations
        .get_translation(id)
        .await?
        .map(Json)
        .ok_or_else(|| ApiError::NotFound(format!("Translation {} not found", id)))
}

async fn delete_translation(
    State(state): State<AppState>,
    id: Result<Path<i32>, PathRejection>,
) -> ApiResult<StatusCode> {
    let Path(id) = id?;

    if !state.translations.delete_translation(id).await? {
        return Err(ApiError::NotFound(format!("Translation {} not found", id)));
    }

    info!("Deleted translation {}", id);
    Ok(StatusCode::NO_CONTENT)
}

async fn list_languages(State(state): State<AppState>) -> ApiResult<Json<Vec<Language>>> {
    Ok(Json(state.languages.list_languages().await?))
}
