use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Abbreviation of the pseudo-language that lets the provider detect the source.
pub const DETECT_LANGUAGE_CODE: &str = "DL";

/// Maximum length of a text submitted for translation, in characters.
pub const MAX_TEXT_LENGTH: usize = 500;

/// A catalog entry as stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, sqlx::FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Language {
    pub id: i32,
    pub name: String,
    pub abbreviation: Option<String>,
    pub is_origin_language: bool,
    pub is_target_language: bool,
}

impl Language {
    /// Whether this entry stands for "let the provider detect the language".
    pub fn is_detect_language(&self) -> bool {
        self.abbreviation.as_deref() == Some(DETECT_LANGUAGE_CODE)
    }
}

/// A catalog entry that has not been stored yet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct NewLanguage {
    pub name: String,
    pub abbreviation: Option<String>,
    pub is_origin_language: bool,
    pub is_target_language: bool,
}

impl NewLanguage {
    pub fn new(
        name: impl Into<String>,
        abbreviation: impl Into<String>,
        is_origin_language: bool,
        is_target_language: bool,
    ) -> Self {
        Self {
            name: name.into(),
            abbreviation: Some(abbreviation.into()),
            is_origin_language,
            is_target_language,
        }
    }
}

/// A language as reported by the translation provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProviderLanguage {
    pub code: String,
    pub name: String,
}

impl ProviderLanguage {
    pub fn new(code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
        }
    }
}

/// A stored translation. Language references are absent when the referenced
/// catalog entry has since been removed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Translation {
    pub id: i32,
    pub original_text: String,
    pub translated_text: Option<String>,
    pub translated_at: Option<DateTime<Utc>>,
    pub origin_language: Option<Language>,
    pub target_language: Option<Language>,
}

/// Result of a successful provider call, ready to be stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CompletedTranslation {
    pub original_text: String,
    pub translated_text: String,
    pub translated_at: DateTime<Utc>,
    pub origin_language: Language,
    pub target_language: Language,
    /// Source code reported by the provider (useful when the origin was detected)
    pub detected_source_language: Option<String>,
}

/// The user-supplied part of a translation, every field possibly missing.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslationDraft {
    pub original_text: Option<String>,
    pub origin_language: Option<Language>,
    pub target_language: Option<Language>,
}

/// Input to the translation service.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct TranslateRequest {
    pub translation: Option<TranslationDraft>,
}

impl TranslateRequest {
    pub fn new(
        original_text: impl Into<String>,
        origin_language: Language,
        target_language: Language,
    ) -> Self {
        Self {
            translation: Some(TranslationDraft {
                original_text: Some(original_text.into()),
                origin_language: Some(origin_language),
                target_language: Some(target_language),
            }),
        }
    }
}
