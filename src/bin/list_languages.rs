//! List languages binary - shows what the catalog would contain after seeding
//!
//! Fetches the source and target language lists from DeepL and prints the merged
//! catalog entries (plus the synthetic ones) without touching any database.
//!
//! Usage:
//!   cargo run --bin list-languages            # Print a table
//!   cargo run --bin list-languages -- --json  # Print JSON
//!
//! Required environment variables:
//! - DEEPL_AUTH_KEY
//!
//! Optional:
//! - DEEPL_API_URL (defaults to the free or pro endpoint based on the key)

use anyhow::{Context, Result};
use serde::Serialize;
use tracing::info;
use translation_history::config::Config;
use translation_history::deepl::{DeepLClient, TranslationProvider};
use translation_history::models::NewLanguage;
use translation_history::seeding::catalog_candidates;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct CatalogEntry<'a> {
    name: &'a str,
    abbreviation: Option<&'a str>,
    is_origin_language: bool,
    is_target_language: bool,
}

impl<'a> From<&'a NewLanguage> for CatalogEntry<'a> {
    fn from(language: &'a NewLanguage) -> Self {
        Self {
            name: &language.name,
            abbreviation: language.abbreviation.as_deref(),
            is_origin_language: language.is_origin_language,
            is_target_language: language.is_target_language,
        }
    }
}

fn flag(value: bool) -> &'static str {
    if value {
        "yes"
    } else {
        "-"
    }
}

fn print_table(candidates: &[NewLanguage]) {
    println!("{:<8} {:<28} {:<7} {:<7}", "CODE", "NAME", "ORIGIN", "TARGET");
    println!("{}", "-".repeat(52));
    for language in candidates {
        println!(
            "{:<8} {:<28} {:<7} {:<7}",
            language.abbreviation.as_deref().unwrap_or(""),
            language.name,
            flag(language.is_origin_language),
            flag(language.is_target_language)
        );
    }
    println!();
    println!("{} entries", candidates.len());
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_history=info".parse()?),
        )
        .with_writer(std::io::stderr)
        .init();

    let as_json = std::env::args().any(|arg| arg == "--json");

    let config = Config::from_env()?;
    let client = DeepLClient::from_config(&config)?;
    info!("Fetching languages from {}", config.deepl_api_url);

    let source = client
        .source_languages()
        .await
        .context("Failed to fetch source languages")?;
    let target = client
        .target_languages()
        .await
        .context("Failed to fetch target languages")?;

    info!(
        "DeepL reports {} source and {} target languages",
        source.len(),
        target.len()
    );

    let candidates = catalog_candidates(&source, &target);

    if as_json {
        let entries: Vec<CatalogEntry> = candidates.iter().map(CatalogEntry::from).collect();
        println!("{}", serde_json::to_string_pretty(&entries)?);
    } else {
        print_table(&candidates);
    }

    Ok(())
}
