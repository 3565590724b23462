//! Language catalog reconciliation.
//!
//! Merges the provider's source- and target-capable language lists into catalog
//! entries and stores the ones the catalog does not know yet. Runs once at start-up.

use anyhow::{Context, Result};
use std::collections::HashSet;
use tracing::info;

use crate::deepl::TranslationProvider;
use crate::models::{NewLanguage, ProviderLanguage, DETECT_LANGUAGE_CODE};
use crate::store::LanguageStore;

/// Entries that do not come from the provider: the auto-detect pseudo-language and
/// a plain "English" origin (the provider only offers regional English as a target).
pub fn synthetic_languages() -> Vec<NewLanguage> {
    vec![
        NewLanguage::new("Detect Language", DETECT_LANGUAGE_CODE, true, false),
        NewLanguage::new("English", "en", true, false),
    ]
}

/// Merge provider capability lists by language code.
///
/// Every source language becomes an origin-capable candidate, also target-capable
/// when its code appears in `target`. Target languages whose code is not among the
/// source languages become target-only candidates. Source order comes first.
pub fn merge_provider_languages(
    source: &[ProviderLanguage],
    target: &[ProviderLanguage],
) -> Vec<NewLanguage> {
    let target_codes: HashSet<&str> = target.iter().map(|l| l.code.as_str()).collect();
    let mut seen: HashSet<&str> = HashSet::new();
    let mut merged = Vec::with_capacity(source.len() + target.len());

    for lang in source {
        seen.insert(lang.code.as_str());
        merged.push(NewLanguage::new(
            lang.name.as_str(),
            lang.code.as_str(),
            true,
            target_codes.contains(lang.code.as_str()),
        ));
    }

    for lang in target {
        if seen.insert(lang.code.as_str()) {
            merged.push(NewLanguage::new(
                lang.name.as_str(),
                lang.code.as_str(),
                false,
                true,
            ));
        }
    }

    merged
}

/// Full candidate list for a reconciliation run: merged provider entries plus synthetic ones
pub fn catalog_candidates(
    source: &[ProviderLanguage],
    target: &[ProviderLanguage],
) -> Vec<NewLanguage> {
    let mut candidates = merge_provider_languages(source, target);
    candidates.extend(synthetic_languages());
    candidates
}

/// Candidates with no (name, abbreviation) match in the store. Within one run the
/// first candidate for a pair wins; existing entries are never updated.
pub async fn missing_languages(
    store: &dyn LanguageStore,
    candidates: Vec<NewLanguage>,
) -> Result<Vec<NewLanguage>> {
    let mut batch_keys: HashSet<(String, Option<String>)> = HashSet::new();
    let mut missing = Vec::new();

    for candidate in candidates {
        let key = (candidate.name.clone(), candidate.abbreviation.clone());
        if batch_keys.contains(&key) {
            continue;
        }

        let exists = store
            .exists_by_name_and_abbreviation(&candidate.name, candidate.abbreviation.as_deref())
            .await
            .context("Failed to check catalog for existing language")?;

        batch_keys.insert(key);
        if !exists {
            missing.push(candidate);
        }
    }

    Ok(missing)
}

/// Bring the catalog in line with the provider's capabilities.
///
/// Returns the number of inserted entries. Re-running with unchanged provider
/// output inserts nothing. Provider failures are returned to the caller.
pub async fn seed_languages(
    store: &dyn LanguageStore,
    provider: &dyn TranslationProvider,
) -> Result<usize> {
    let source = provider
        .source_languages()
        .await
        .context("Failed to fetch source languages from provider")?;
    let target = provider
        .target_languages()
        .await
        .context("Failed to fetch target languages from provider")?;

    info!(
        "Provider reports {} source and {} target languages",
        source.len(),
        target.len()
    );

    let candidates = catalog_candidates(&source, &target);
    let missing = missing_languages(store, candidates).await?;

    if missing.is_empty() {
        info!("Language catalog already up to date");
        return Ok(0);
    }

    let inserted = store
        .insert_languages(&missing)
        .await
        .context("Failed to insert languages into catalog")?;

    info!("✓ Added {} languages to the catalog", inserted);
    Ok(inserted)
}
