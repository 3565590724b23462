use chrono::Utc;
use std::sync::Arc;
use tracing::{info, warn};

use crate::deepl::TranslationProvider;
use crate::error::TranslateError;
use crate::models::{CompletedTranslation, Language, TranslateRequest, MAX_TEXT_LENGTH};

/// Validates translation requests and runs them through the provider.
///
/// Persisting the result is left to the caller. Provider failures are returned
/// as-is; nothing is retried.
#[derive(Clone)]
pub struct TranslationService {
    provider: Arc<dyn TranslationProvider>,
}

impl TranslationService {
    pub fn new(provider: Arc<dyn TranslationProvider>) -> Self {
        Self { provider }
    }

    pub async fn translate(
        &self,
        request: TranslateRequest,
    ) -> Result<CompletedTranslation, TranslateError> {
        let Validated {
            original_text,
            origin,
            target,
            source_code,
            target_code,
        } = validate(request)?;

        let result = self
            .provider
            .translate(&original_text, source_code.as_deref(), &target_code)
            .await
            .map_err(|e| {
                warn!(
                    "Translation {} -> {} failed: {}",
                    source_code.as_deref().unwrap_or("auto"),
                    target_code,
                    e
                );
                TranslateError::from(e)
            })?;

        info!(
            "Translated {} chars ({} -> {})",
            original_text.chars().count(),
            source_code.as_deref().unwrap_or(&result.detected_source_language),
            target_code
        );

        Ok(CompletedTranslation {
            original_text,
            translated_text: result.text,
            translated_at: Utc::now(),
            origin_language: origin,
            target_language: target,
            detected_source_language: Some(result.detected_source_language)
                .filter(|code| !code.is_empty()),
        })
    }
}

/// A request whose fields are all present, with the provider codes resolved
struct Validated {
    original_text: String,
    origin: Language,
    target: Language,
    /// `None` when the provider should detect the source
    source_code: Option<String>,
    target_code: String,
}

fn validate(request: TranslateRequest) -> Result<Validated, TranslateError> {
    let draft = request
        .translation
        .ok_or_else(|| invalid("translation is missing"))?;
    let original_text = draft
        .original_text
        .ok_or_else(|| invalid("original text is missing"))?;
    let origin = draft
        .origin_language
        .ok_or_else(|| invalid("origin language is missing"))?;
    let target = draft
        .target_language
        .ok_or_else(|| invalid("target language is missing"))?;

    let origin_code = origin
        .abbreviation
        .clone()
        .ok_or_else(|| invalid("origin language has no abbreviation"))?;
    let target_code = target
        .abbreviation
        .clone()
        .ok_or_else(|| invalid("target language has no abbreviation"))?;

    let length = original_text.chars().count();
    if length == 0 || length > MAX_TEXT_LENGTH {
        return Err(invalid(&format!(
            "original text must be between 1 and {} characters",
            MAX_TEXT_LENGTH
        )));
    }

    let source_code = if origin.is_detect_language() {
        None
    } else {
        Some(origin_code)
    };

    Ok(Validated {
        original_text,
        origin,
        target,
        source_code,
        target_code,
    })
}

fn invalid(detail: &str) -> TranslateError {
    TranslateError::InvalidArgument(detail.to_string())
}
