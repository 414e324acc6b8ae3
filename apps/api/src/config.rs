use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::llm_client::DEFAULT_GENERATOR_URL;

/// Application configuration loaded from environment variables.
/// Every variable is optional; malformed numbers fail startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Derived page directories are created under this root.
    pub output_root: PathBuf,
    pub generator_url: String,
    pub generator_max_tokens: u32,
    pub generator_timeout_secs: u64,
    /// Used when a render request does not name a font.
    pub default_font_path: Option<PathBuf>,
    /// Directory that request `font_path` values are resolved against.
    /// Unset means requests may not name fonts at all.
    pub font_dir: Option<PathBuf>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: parse_env("PORT", 8080)?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
            output_root: std::env::var("OUTPUT_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|_| PathBuf::from(".")),
            generator_url: std::env::var("GENERATOR_URL")
                .unwrap_or_else(|_| DEFAULT_GENERATOR_URL.to_string()),
            generator_max_tokens: parse_env("GENERATOR_MAX_TOKENS", 512)?,
            generator_timeout_secs: parse_env("GENERATOR_TIMEOUT_SECS", 600)?,
            default_font_path: optional_path("DEFAULT_FONT_PATH"),
            font_dir: optional_path("FONT_DIR"),
        })
    }
}

fn optional_path(key: &str) -> Option<PathBuf> {
    std::env::var(key)
        .ok()
        .filter(|p| !p.trim().is_empty())
        .map(PathBuf::from)
}

fn parse_env<T>(key: &str, default: T) -> Result<T>
where
    T: std::str::FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match std::env::var(key) {
        Ok(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("Environment variable '{key}' has invalid value '{raw}'")),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_env_uses_default_when_unset() {
        let value: u16 = parse_env("FOLIO_TEST_UNSET_VARIABLE", 8080).unwrap();
        assert_eq!(value, 8080);
    }

    #[test]
    fn test_parse_env_reads_and_rejects_values() {
        std::env::set_var("FOLIO_TEST_MAX_TOKENS", " 256 ");
        let value: u32 = parse_env("FOLIO_TEST_MAX_TOKENS", 512).unwrap();
        assert_eq!(value, 256);

        std::env::set_var("FOLIO_TEST_PORT", "not-a-port");
        assert!(parse_env::<u16>("FOLIO_TEST_PORT", 8080).is_err());
    }

    #[test]
    fn test_optional_path_ignores_blank_values() {
        std::env::set_var("FOLIO_TEST_FONT_DIR_BLANK", "  ");
        assert_eq!(optional_path("FOLIO_TEST_FONT_DIR_BLANK"), None);

        std::env::set_var("FOLIO_TEST_FONT_DIR", "/srv/fonts");
        assert_eq!(
            optional_path("FOLIO_TEST_FONT_DIR"),
            Some(PathBuf::from("/srv/fonts"))
        );
    }
}
