use anyhow::{Context, Result};

const DEEPL_FREE_API_URL: &str = "https://api-free.deepl.com";
const DEEPL_PRO_API_URL: &str = "https://api.deepl.com";

#[derive(Debug, Clone)]
pub struct Config {
    // DeepL
    pub deepl_auth_key: String,
    pub deepl_api_url: String,

    // Database (in-memory store when unset)
    pub database_url: Option<String>,
    pub db_connect_attempts: u32,

    // Startup
    pub seed_languages: bool,

    // Server
    pub host: String,
    pub port: u16,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        let deepl_auth_key =
            std::env::var("DEEPL_AUTH_KEY").context("DEEPL_AUTH_KEY not set")?;

        // Free-tier keys carry a ":fx" suffix and are served from a separate host
        let deepl_api_url = std::env::var("DEEPL_API_URL")
            .unwrap_or_else(|_| default_api_url(&deepl_auth_key).to_string());

        Ok(Self {
            deepl_auth_key,
            deepl_api_url,

            database_url: std::env::var("DATABASE_URL")
                .ok()
                .filter(|v| !v.trim().is_empty()),
            db_connect_attempts: std::env::var("DB_CONNECT_ATTEMPTS")
                .ok()
                .and_then(|v| v.parse().ok())
                .filter(|n| *n >= 1)
                .unwrap_or(5),

            seed_languages: std::env::var("SEED_LANGUAGES")
                .ok()
                .and_then(|v| parse_bool(&v))
                .unwrap_or(true),

            host: std::env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: std::env::var("PORT")
                .ok()
                .and_then(|v| v.parse().ok())
                .unwrap_or(8080),
        })
    }
}

fn default_api_url(auth_key: &str) -> &'static str {
    if auth_key.ends_with(":fx") {
        DEEPL_FREE_API_URL
    } else {
        DEEPL_PRO_API_URL
    }
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Some(true),
        "0" | "false" | "no" | "off" => Some(false),
        _ => None,
    }
}
