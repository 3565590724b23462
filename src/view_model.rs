//! View model for the translation form: the catalog split into origin and target
//! lists, plus the ids of a few well-known languages used as default selections.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::models::{Language, DETECT_LANGUAGE_CODE};
use crate::store::LanguageStore;

/// Catalog ids of languages the form preselects or highlights
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WellKnownLanguages {
    pub german: Option<i32>,
    pub english_us: Option<i32>,
    pub english_gb: Option<i32>,
    pub english: Option<i32>,
    pub detect_language: Option<i32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateTranslationViewModel {
    pub origin_languages: Vec<Language>,
    pub target_languages: Vec<Language>,
    pub selected_origin_id: Option<i32>,
    pub selected_target_id: Option<i32>,
    pub well_known: WellKnownLanguages,
}

impl CreateTranslationViewModel {
    /// Fill unset selections: origin prefers auto-detect then English,
    /// target prefers German then US English.
    pub fn preselect_defaults(&mut self) {
        if self.selected_origin_id.is_none() {
            self.selected_origin_id = self.well_known.detect_language.or(self.well_known.english);
        }
        if self.selected_target_id.is_none() {
            self.selected_target_id = self.well_known.german.or(self.well_known.english_us);
        }
    }

    /// Keep the user's choice, e.g. when re-rendering the form after a submission
    pub fn with_selection(mut self, origin_id: i32, target_id: i32) -> Self {
        self.selected_origin_id = Some(origin_id);
        self.selected_target_id = Some(target_id);
        self
    }
}

/// Split the catalog. Each entry is checked independently for both roles, so a
/// language with both flags lands in both lists. If several entries share a
/// well-known abbreviation, the last one in iteration order wins.
pub fn partition_languages(languages: Vec<Language>) -> CreateTranslationViewModel {
    let mut view_model = CreateTranslationViewModel::default();

    for language in languages {
        if language.is_target_language {
            match language.abbreviation.as_deref() {
                Some("de") => view_model.well_known.german = Some(language.id),
                Some("en-US") => view_model.well_known.english_us = Some(language.id),
                Some("en-GB") => view_model.well_known.english_gb = Some(language.id),
                _ => {}
            }
            view_model.target_languages.push(language.clone());
        }

        if language.is_origin_language {
            match language.abbreviation.as_deref() {
                Some(DETECT_LANGUAGE_CODE) => {
                    view_model.well_known.detect_language = Some(language.id)
                }
                Some("en") => view_model.well_known.english = Some(language.id),
                _ => {}
            }
            view_model.origin_languages.push(language);
        }
    }

    view_model
}

/// Build a fresh view model from the current catalog
pub async fn build_view_model(store: &dyn LanguageStore) -> Result<CreateTranslationViewModel> {
    let languages = store
        .list_languages()
        .await
        .context("Failed to load language catalog")?;

    Ok(partition_languages(languages))
}
