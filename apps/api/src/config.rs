use std::time::Duration;

use anyhow::{Context, Result};

/// Application configuration loaded from environment variables.
/// Every variable has a default except the optional LLM key.
#[derive(Debug, Clone)]
pub struct Config {
    pub port: u16,
    pub rust_log: String,
    /// Base URL of the résumé generation backend.
    pub generation_api_url: String,
    pub llm_base_url: String,
    pub llm_api_key: Option<String>,
    pub llm_model: String,
    pub success_min_display: Duration,
    /// Sessions untouched this long are evicted.
    pub session_idle_ttl: Duration,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        Ok(Config {
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
            generation_api_url: env_or("GENERATION_API_URL", "http://localhost:8000"),
            llm_base_url: env_or("LLM_BASE_URL", "https://ai-gateway.vercel.sh/v1"),
            llm_api_key: std::env::var("LLM_API_KEY")
                .ok()
                .filter(|k| !k.trim().is_empty()),
            llm_model: env_or("LLM_MODEL", "mistral/devstral-2"),
            success_min_display: env_or("SUCCESS_MIN_DISPLAY_MS", "8000")
                .parse::<u64>()
                .map(Duration::from_millis)
                .context("SUCCESS_MIN_DISPLAY_MS must be a whole number of milliseconds")?,
            session_idle_ttl: env_or("SESSION_IDLE_TTL_SECS", "3600")
                .parse::<u64>()
                .map(Duration::from_secs)
                .context("SESSION_IDLE_TTL_SECS must be a whole number of seconds")?,
        })
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}
