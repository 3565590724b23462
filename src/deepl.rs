//! DeepL REST API client and the provider abstraction the service talks to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;
use tracing::debug;

use crate::config::Config;
use crate::models::ProviderLanguage;

/// DeepL reports an exhausted character quota with this non-standard status.
const QUOTA_EXCEEDED_STATUS: u16 = 456;

/// Errors reported by a translation provider
#[derive(Error, Debug)]
pub enum ProviderError {
    /// The provider could not be reached (DNS, connect, timeout)
    #[error("{0}")]
    Connection(String),

    /// The account's usage limit has been reached
    #[error("{0}")]
    QuotaExceeded(String),

    /// The provider rejected the request
    #[error("{message}")]
    Request {
        /// HTTP status code, if the failure came with one
        status: Option<u16>,
        message: String,
    },

    /// The provider answered with something we could not interpret
    #[error("{0}")]
    InvalidResponse(String),
}

/// Result of a single text translation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextResult {
    pub text: String,
    pub detected_source_language: String,
}

/// A machine-translation backend.
#[async_trait]
pub trait TranslationProvider: Send + Sync {
    /// Translate `text` into `target`. A `source` of `None` lets the provider detect it.
    async fn translate(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> Result<TextResult, ProviderError>;

    /// Languages usable as the source of a translation.
    async fn source_languages(&self) -> Result<Vec<ProviderLanguage>, ProviderError>;

    /// Languages usable as the target of a translation.
    async fn target_languages(&self) -> Result<Vec<ProviderLanguage>, ProviderError>;
}

#[derive(Debug, Serialize)]
struct TranslateBody<'a> {
    text: Vec<&'a str>,
    target_lang: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    source_lang: Option<String>,
}

#[derive(Debug, Deserialize)]
struct TranslateResponse {
    translations: Vec<TranslatedText>,
}

#[derive(Debug, Deserialize)]
struct TranslatedText {
    text: String,
    #[serde(default)]
    detected_source_language: String,
}

#[derive(Debug, Deserialize)]
struct LanguageEntry {
    language: String,
    name: String,
}

#[derive(Debug, Deserialize)]
struct ErrorBody {
    message: Option<String>,
}

/// Client for the DeepL v2 REST API
#[derive(Debug, Clone)]
pub struct DeepLClient {
    client: reqwest::Client,
    base_url: String,
    auth_key: String,
}

impl DeepLClient {
    pub fn new(base_url: impl Into<String>, auth_key: impl Into<String>) -> Result<Self, ProviderError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .map_err(|e| ProviderError::Connection(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            auth_key: auth_key.into(),
        })
    }

    pub fn from_config(config: &Config) -> Result<Self, ProviderError> {
        Self::new(&config.deepl_api_url, &config.deepl_auth_key)
    }

    fn auth_header(&self) -> String {
        format!("DeepL-Auth-Key {}", self.auth_key)
    }

    async fn fetch_languages(&self, kind: &str) -> Result<Vec<ProviderLanguage>, ProviderError> {
        let url = format!("{}/v2/languages", self.base_url);
        debug!("Fetching DeepL {} languages", kind);

        let response = self
            .client
            .get(&url)
            .header("Authorization", self.auth_header())
            .query(&[("type", kind)])
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;

        let entries: Vec<LanguageEntry> = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse DeepL language list: {}", e))
        })?;

        Ok(entries
            .into_iter()
            .map(|entry| ProviderLanguage::new(standardize_code(&entry.language), entry.name))
            .collect())
    }
}

#[async_trait]
impl TranslationProvider for DeepLClient {
    async fn translate(
        &self,
        text: &str,
        source: Option<&str>,
        target: &str,
    ) -> Result<TextResult, ProviderError> {
        let url = format!("{}/v2/translate", self.base_url);
        let body = TranslateBody {
            text: vec![text],
            target_lang: target.to_uppercase(),
            source_lang: source.map(str::to_uppercase),
        };

        debug!(
            "Requesting DeepL translation ({} -> {}, {} chars)",
            source.unwrap_or("auto"),
            target,
            text.chars().count()
        );

        let response = self
            .client
            .post(&url)
            .header("Authorization", self.auth_header())
            .json(&body)
            .send()
            .await
            .map_err(transport_error)?;

        let response = check_status(response).await?;

        let parsed: TranslateResponse = response.json().await.map_err(|e| {
            ProviderError::InvalidResponse(format!("Failed to parse DeepL translation: {}", e))
        })?;

        let first = parsed.translations.into_iter().next().ok_or_else(|| {
            ProviderError::InvalidResponse("DeepL response contained no translations".to_string())
        })?;

        Ok(TextResult {
            text: first.text,
            detected_source_language: standardize_code(&first.detected_source_language),
        })
    }

    async fn source_languages(&self) -> Result<Vec<ProviderLanguage>, ProviderError> {
        self.fetch_languages("source").await
    }

    async fn target_languages(&self) -> Result<Vec<ProviderLanguage>, ProviderError> {
        self.fetch_languages("target").await
    }
}

/// Normalise a language code: primary subtag lowercase, region uppercase (`EN-US` -> `en-US`).
pub fn standardize_code(code: &str) -> String {
    match code.split_once('-') {
        Some((primary, region)) => format!(
            "{}-{}",
            primary.to_ascii_lowercase(),
            region.to_ascii_uppercase()
        ),
        None => code.to_ascii_lowercase(),
    }
}

fn transport_error(error: reqwest::Error) -> ProviderError {
    if error.is_connect() || error.is_timeout() || error.is_request() {
        ProviderError::Connection(format!("Failed to reach DeepL: {}", error))
    } else {
        ProviderError::Request {
            status: error.status().map(|s| s.as_u16()),
            message: error.to_string(),
        }
    }
}

async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, ProviderError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }

    let body = response
        .text()
        .await
        .unwrap_or_else(|e| format!("<failed to read body: {}>", e));
    let detail = serde_json::from_str::<ErrorBody>(&body)
        .ok()
        .and_then(|b| b.message)
        .unwrap_or(body);

    if status.as_u16() == QUOTA_EXCEEDED_STATUS {
        return Err(ProviderError::QuotaExceeded(format!(
            "Quota for this billing period has been exceeded: {}",
            detail
        )));
    }

    Err(ProviderError::Request {
        status: Some(status.as_u16()),
        message: format!("DeepL API error ({}): {}", status, detail),
    })
}
