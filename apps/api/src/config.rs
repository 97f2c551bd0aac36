use std::str::FromStr;
use std::time::Duration;

use anyhow::{ensure, Context, Result};

use crate::extract::pdf::DEFAULT_PDF_TIMEOUT_SECS;
use crate::extract::web::{DEFAULT_FETCH_TIMEOUT_SECS, DEFAULT_MAX_PAGE_BYTES};
use crate::llm_client::{self, LlmSettings};

const DEFAULT_MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;
const DEFAULT_PORT: u16 = 5001;

/// Application configuration loaded from environment variables.
/// Startup fails if the completion service credential is missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: String,
    pub openai_model: String,
    pub openai_base_url: String,
    pub llm_timeout_secs: u64,
    pub fetch_timeout_secs: u64,
    pub pdf_timeout_secs: u64,
    pub max_upload_bytes: usize,
    pub max_page_bytes: usize,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(&|key| std::env::var(key).ok())
    }

    pub fn from_lookup(lookup: &dyn Fn(&str) -> Option<String>) -> Result<Self> {
        let config = Config {
            openai_api_key: require(lookup, "OPENAI_API_KEY")?,
            openai_model: optional(lookup, "OPENAI_MODEL", llm_client::DEFAULT_MODEL),
            openai_base_url: optional(lookup, "OPENAI_BASE_URL", llm_client::DEFAULT_BASE_URL),
            llm_timeout_secs: parse_or(lookup, "LLM_TIMEOUT_SECS", llm_client::DEFAULT_TIMEOUT_SECS)?,
            fetch_timeout_secs: parse_or(lookup, "FETCH_TIMEOUT_SECS", DEFAULT_FETCH_TIMEOUT_SECS)?,
            pdf_timeout_secs: parse_or(lookup, "PDF_TIMEOUT_SECS", DEFAULT_PDF_TIMEOUT_SECS)?,
            max_upload_bytes: parse_or(lookup, "MAX_UPLOAD_BYTES", DEFAULT_MAX_UPLOAD_BYTES)?,
            max_page_bytes: parse_or(lookup, "MAX_PAGE_BYTES", DEFAULT_MAX_PAGE_BYTES)?,
            port: parse_or(lookup, "PORT", DEFAULT_PORT)?,
            rust_log: optional(lookup, "RUST_LOG", "info"),
        };

        ensure!(config.llm_timeout_secs > 0, "LLM_TIMEOUT_SECS must be positive");
        ensure!(config.fetch_timeout_secs > 0, "FETCH_TIMEOUT_SECS must be positive");
        ensure!(config.pdf_timeout_secs > 0, "PDF_TIMEOUT_SECS must be positive");

        Ok(config)
    }

    pub fn llm_settings(&self) -> LlmSettings {
        LlmSettings {
            api_key: self.openai_api_key.clone(),
            model: self.openai_model.clone(),
            base_url: self.openai_base_url.clone(),
            timeout: Duration::from_secs(self.llm_timeout_secs),
        }
    }

    pub fn fetch_timeout(&self) -> Duration {
        Duration::from_secs(self.fetch_timeout_secs)
    }

    pub fn pdf_timeout(&self) -> Duration {
        Duration::from_secs(self.pdf_timeout_secs)
    }
}

fn require(lookup: &dyn Fn(&str) -> Option<String>, key: &str) -> Result<String> {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .with_context(|| format!("Required environment variable '{key}' is not set"))
}

fn optional(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: &str) -> String {
    lookup(key)
        .filter(|value| !value.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parse_or<T>(lookup: &dyn Fn(&str) -> Option<String>, key: &str, default: T) -> Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    match lookup(key) {
        Some(raw) => raw
            .trim()
            .parse::<T>()
            .with_context(|| format!("{key} must be a valid number, got '{raw}'")),
        None => Ok(default),
    }
}
