//! Storage interfaces for the language catalog and translation history,
//! plus an in-memory implementation used when no database is configured.

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, MutexGuard};

use crate::models::{CompletedTranslation, Language, NewLanguage, Translation};

#[async_trait]
pub trait LanguageStore: Send + Sync {
    /// Store a single language and return it with its assigned id
    async fn add_language(&self, language: &NewLanguage) -> Result<Language>;

    /// Store all languages at once. Returns the number inserted; empty input is a no-op.
    async fn insert_languages(&self, languages: &[NewLanguage]) -> Result<usize>;

    /// Remove a language. Returns false if it did not exist.
    async fn remove_language(&self, id: i32) -> Result<bool>;

    async fn get_language(&self, id: i32) -> Result<Option<Language>>;

    /// All languages in insertion order
    async fn list_languages(&self) -> Result<Vec<Language>>;

    async fn language_exists(&self, id: i32) -> Result<bool>;

    /// Exact match on name and abbreviation (an absent abbreviation only matches absent)
    async fn exists_by_name_and_abbreviation(
        &self,
        name: &str,
        abbreviation: Option<&str>,
    ) -> Result<bool>;

    async fn find_by_abbreviation(&self, abbreviation: &str) -> Result<Option<Language>>;
}

#[async_trait]
pub trait TranslationStore: Send + Sync {
    /// Store a completed translation and return it with its assigned id
    async fn add_translation(&self, translation: &CompletedTranslation) -> Result<Translation>;

    /// All translations in insertion order, languages resolved
    async fn list_translations(&self) -> Result<Vec<Translation>>;

    async fn get_translation(&self, id: i32) -> Result<Option<Translation>>;

    /// Delete a translation. Returns false if it did not exist.
    async fn delete_translation(&self, id: i32) -> Result<bool>;

    async fn translation_exists(&self, id: i32) -> Result<bool>;
}

#[derive(Debug, Clone)]
struct TranslationRow {
    id: i32,
    original_text: String,
    translated_text: String,
    translated_at: chrono::DateTime<chrono::Utc>,
    origin_language_id: i32,
    target_language_id: i32,
}

#[derive(Debug, Default)]
struct Inner {
    languages: Vec<Language>,
    translations: Vec<TranslationRow>,
    next_language_id: i32,
    next_translation_id: i32,
}

impl Inner {
    fn push_language(&mut self, language: &NewLanguage) -> Language {
        self.next_language_id += 1;
        let stored = Language {
            id: self.next_language_id,
            name: language.name.clone(),
            abbreviation: language.abbreviation.clone(),
            is_origin_language: language.is_origin_language,
            is_target_language: language.is_target_language,
        };
        self.languages.push(stored.clone());
        stored
    }

    fn language(&self, id: i32) -> Option<Language> {
        self.languages.iter().find(|l| l.id == id).cloned()
    }

    fn resolve(&self, row: &TranslationRow) -> Translation {
        Translation {
            id: row.id,
            original_text: row.original_text.clone(),
            translated_text: Some(row.translated_text.clone()),
            translated_at: Some(row.translated_at),
            origin_language: self.language(row.origin_language_id),
            target_language: self.language(row.target_language_id),
        }
    }
}

/// Process-local store. Clones share the same data.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    inner: Arc<Mutex<Inner>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<MutexGuard<'_, Inner>> {
        self.inner
            .lock()
            .map_err(|_| anyhow!("In-memory store lock poisoned"))
    }
}

#[async_trait]
impl LanguageStore for MemoryStore {
    async fn add_language(&self, language: &NewLanguage) -> Result<Language> {
        Ok(self.lock()?.push_language(language))
    }

    async fn insert_languages(&self, languages: &[NewLanguage]) -> Result<usize> {
        let mut inner = self.lock()?;
        for language in languages {
            inner.push_language(language);
        }
        Ok(languages.len())
    }

    async fn remove_language(&self, id: i32) -> Result<bool> {
        let mut inner = self.lock()?;
        let before = inner.languages.len();
        inner.languages.retain(|l| l.id != id);
        Ok(inner.languages.len() < before)
    }

    async fn get_language(&self, id: i32) -> Result<Option<Language>> {
        Ok(self.lock()?.language(id))
    }

    async fn list_languages(&self) -> Result<Vec<Language>> {
        Ok(self.lock()?.languages.clone())
    }

    async fn language_exists(&self, id: i32) -> Result<bool> {
        Ok(self.lock()?.languages.iter().any(|l| l.id == id))
    }

    async fn exists_by_name_and_abbreviation(
        &self,
        name: &str,
        abbreviation: Option<&str>,
    ) -> Result<bool> {
        Ok(self
            .lock()?
            .languages
            .iter()
            .any(|l| l.name == name && l.abbreviation.as_deref() == abbreviation))
    }

    async fn find_by_abbreviation(&self, abbreviation: &str) -> Result<Option<Language>> {
        Ok(self
            .lock()?
            .languages
            .iter()
            .find(|l| l.abbreviation.as_deref() == Some(abbreviation))
            .cloned())
    }
}

#[async_trait]
impl TranslationStore for MemoryStore {
    async fn add_translation(&self, translation: &CompletedTranslation) -> Result<Translation> {
        let mut inner = self.lock()?;
        inner.next_translation_id += 1;
        let row = TranslationRow {
            id: inner.next_translation_id,
            original_text: translation.original_text.clone(),
            translated_text: translation.translated_text.clone(),
            translated_at: translation.translated_at,
            origin_language_id: translation.origin_language.id,
            target_language_id: translation.target_language.id,
        };
        let stored = inner.resolve(&row);
        inner.translations.push(row);
        Ok(stored)
    }

    async fn list_translations(&self) -> Result<Vec<Translation>> {
        let inner = self.lock()?;
        Ok(inner.translations.iter().map(|row| inner.resolve(row)).collect())
    }

    async fn get_translation(&self, id: i32) -> Result<Option<Translation>> {
        let inner = self.lock()?;
        Ok(inner
            .translations
            .iter()
            .find(|row| row.id == id)
            .map(|row| inner.resolve(row)))
    }

    async fn delete_translation(&self, id: i32) -> Result<bool> {
        let mut inner = self.lock()?;
        let before = inner.translations.len();
        inner.translations.retain(|row| row.id != id);
        Ok(inner.translations.len() < before)
    }

    async fn translation_exists(&self, id: i32) -> Result<bool> {
        Ok(self.lock()?.translations.iter().any(|row| row.id == id))
    }
}
