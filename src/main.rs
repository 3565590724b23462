use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::{info, warn};

use translation_history::config::Config;
use translation_history::db::Database;
use translation_history::deepl::DeepLClient;
use translation_history::retry::RetryConfig;
use translation_history::seeding::seed_languages;
use translation_history::service::TranslationService;
use translation_history::store::{LanguageStore, MemoryStore, TranslationStore};
use translation_history::web::{self, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file (ignored when variables come from the environment)
    let _ = dotenvy::dotenv();

    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive("translation_history=info".parse()?),
        )
        .init();

    info!("Starting translation history service");

    let config = Config::from_env()?;
    let provider = Arc::new(DeepLClient::from_config(&config)?);
    info!("Using DeepL API at {}", config.deepl_api_url);

    let (languages, translations): (Arc<dyn LanguageStore>, Arc<dyn TranslationStore>) =
        match &config.database_url {
            Some(url) => {
                let retry = RetryConfig::database_connect(config.db_connect_attempts);
                let db = Arc::new(Database::connect_with_retry(url, &retry).await?);
                info!("✓ Connected to PostgreSQL");
                let languages: Arc<dyn LanguageStore> = db.clone();
                let translations: Arc<dyn TranslationStore> = db;
                (languages, translations)
            }
            None => {
                warn!("DATABASE_URL not set, translations are kept in memory only");
                let store = Arc::new(MemoryStore::new());
                let languages: Arc<dyn LanguageStore> = store.clone();
                let translations: Arc<dyn TranslationStore> = store;
                (languages, translations)
            }
        };

    if config.seed_languages {
        info!("Reconciling language catalog with DeepL");
        seed_languages(languages.as_ref(), provider.as_ref())
            .await
            .context("Language catalog seeding failed")?;
    } else {
        info!("Language seeding disabled");
    }

    let state = AppState::new(languages, translations, TranslationService::new(provider));
    let app = web::router(state);

    let addr = format!("{}:{}", config.host, config.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .with_context(|| format!("Failed to bind {}", addr))?;
    info!("Listening on http://{}", addr);

    axum::serve(listener, app).await.context("Server error")?;
    Ok(())
}
