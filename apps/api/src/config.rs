use std::path::PathBuf;

use anyhow::{Context, Result};

const DEFAULT_MODEL: &str = "openai/gpt-3.5-turbo";
const DEFAULT_BASE_URL: &str = "https://openrouter.ai/api/v1";
const DEFAULT_OUTPUT_DIR: &str = "output";

/// Application configuration loaded from environment variables.
///
/// The API key is optional: the service starts without one and reports a
/// configuration warning on every AI operation until a key is supplied.
#[derive(Debug, Clone)]
pub struct Config {
    pub openrouter_api_key: Option<String>,
    pub openrouter_model: String,
    pub openrouter_base_url: String,
    pub output_dir: PathBuf,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            openrouter_api_key: optional_env("OPENROUTER_API_KEY"),
            openrouter_model: optional_env("OPENROUTER_MODEL")
                .unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            openrouter_base_url: optional_env("OPENROUTER_BASE_URL")
                .unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            output_dir: optional_env("OUTPUT_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR)),
            port: std::env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: std::env::var("RUST_LOG").unwrap_or_else(|_| "info".to_string()),
        })
    }
}

/// Reads a variable, treating unset and blank values the same.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key)
        .ok()
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

#[cfg(test)]
impl Config {
    /// Config for tests: no key, output under the given directory.
    pub fn for_tests(output_dir: PathBuf) -> Self {
        Config {
            openrouter_api_key: None,
            openrouter_model: DEFAULT_MODEL.to_string(),
            openrouter_base_url: DEFAULT_BASE_URL.to_string(),
            output_dir,
            port: 0,
            rust_log: "debug".to_string(),
        }
    }
}
