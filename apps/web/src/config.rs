use std::path::PathBuf;

use anyhow::{Context, Result};

pub const DEFAULT_OPENROUTER_URL: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
pub const DEFAULT_IMAGE_ENDPOINT: &str = "https://source.unsplash.com/800x600/";

/// Application configuration loaded from environment variables.
///
/// Nothing here is required at startup: a missing `OPENROUTER_KEY` only turns
/// every generated deck into the one-slide error deck.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_key: Option<String>,
    pub openrouter_url: String,
    pub model: String,
    pub image_endpoint: String,
    pub logo_path: Option<PathBuf>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_key: optional_env("OPENROUTER_KEY"),
            openrouter_url: env_or("OPENROUTER_URL", DEFAULT_OPENROUTER_URL),
            model: env_or("OPENROUTER_MODEL", DEFAULT_MODEL),
            image_endpoint: env_or("IMAGE_ENDPOINT", DEFAULT_IMAGE_ENDPOINT),
            logo_path: optional_env("LOGO_PATH").map(PathBuf::from),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "5000".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

impl Default for Config {
    fn default() -> Self {
        Config {
            openrouter_key: None,
            openrouter_url: DEFAULT_OPENROUTER_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            image_endpoint: DEFAULT_IMAGE_ENDPOINT.to_string(),
            logo_path: None,
            port: 5000,
            rust_log: "info".to_string(),
        }
    }
}

fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_matches_documented_values() {
        let config = Config::default();
        assert!(config.openrouter_key.is_none());
        assert_eq!(config.openrouter_url, DEFAULT_OPENROUTER_URL);
        assert_eq!(config.model, "openai/gpt-3.5-turbo");
        assert_eq!(config.port, 5000);
        assert!(config.logo_path.is_none());
    }

    #[test]
    fn test_optional_env_ignores_unset_variable() {
        assert_eq!(optional_env("DECKFORGE_TEST_SURELY_UNSET_VARIABLE"), None);
        assert_eq!(
            env_or("DECKFORGE_TEST_SURELY_UNSET_VARIABLE", "fallback"),
            "fallback"
        );
    }
}
