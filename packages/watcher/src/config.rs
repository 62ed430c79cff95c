use anyhow::{bail, Context, Result};
use dotenvy::dotenv;
use std::env;
use std::time::Duration;

const DEFAULT_CHECK_INTERVAL_SECS: u64 = 180;
const DEFAULT_LISTING_PAUSE_SECS: u64 = 2;
const DEFAULT_HTTP_TIMEOUT_SECS: u64 = 15;
const DEFAULT_DATABASE_URL: &str = "sqlite:sent_offers.db?mode=rwc";
const DEFAULT_BASE_URL: &str = "https://www.olx.pl";

/// Watcher configuration loaded from environment variables
#[derive(Debug, Clone)]
pub struct Config {
    pub telegram_token: String,
    pub chat_id: String,
    pub search_url: String,
    pub check_interval: Duration,
    pub listing_pause: Duration,
    pub http_timeout: Duration,
    pub database_url: String,
    pub base_url: String,
}

impl Config {
    /// Load configuration from environment variables
    pub fn from_env() -> Result<Self> {
        // Load .env file if present (development)
        let _ = dotenv();

        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Build configuration from any key lookup (environment, map in tests)
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| clean_value(&v)).filter(|v| !v.is_empty());
        let required = |key: &str| get(key).with_context(|| format!("{} must be set", key));
        let seconds = |key: &str, default: u64| -> Result<Duration> {
            match get(key) {
                Some(raw) => raw
                    .parse::<u64>()
                    .map(Duration::from_secs)
                    .with_context(|| format!("{} must be a whole number of seconds", key)),
                None => Ok(Duration::from_secs(default)),
            }
        };

        let config = Self {
            telegram_token: required("TELEGRAM_TOKEN")?,
            chat_id: required("CHAT_ID")?,
            search_url: required("OLX_SEARCH_URL")?,
            check_interval: seconds("CHECK_INTERVAL", DEFAULT_CHECK_INTERVAL_SECS)?,
            listing_pause: seconds("LISTING_PAUSE_SECS", DEFAULT_LISTING_PAUSE_SECS)?,
            http_timeout: seconds("HTTP_TIMEOUT_SECS", DEFAULT_HTTP_TIMEOUT_SECS)?,
            database_url: get("DATABASE_URL").unwrap_or_else(|| DEFAULT_DATABASE_URL.to_string()),
            base_url: get("OLX_BASE_URL").unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
        };

        if !config.search_url.starts_with("http://") && !config.search_url.starts_with("https://") {
            bail!("OLX_SEARCH_URL must be an absolute http(s) URL");
        }
        if config.http_timeout.is_zero() {
            bail!("HTTP_TIMEOUT_SECS must be greater than zero");
        }

        Ok(config)
    }
}

/// Trim whitespace and one layer of surrounding quotes, as `.env` files often carry them.
fn clean_value(raw: &str) -> String {
    raw.trim()
        .trim_matches('"')
        .trim_matches('\'')
        .trim()
        .to_string()
}
