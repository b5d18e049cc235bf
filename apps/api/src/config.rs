use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Context, Result};

use crate::llm_client::ProviderKind;

/// Application configuration loaded from environment variables.
/// Provider keys are optional; a provider without a key is reported as
/// unavailable at request time instead of failing startup.
#[derive(Debug, Clone)]
pub struct Config {
    pub openai_api_key: Option<String>,
    pub openai_model: String,
    pub openai_base_url: String,
    pub gemini_api_key: Option<String>,
    pub gemini_model: String,
    pub gemini_base_url: String,
    pub default_provider: ProviderKind,
    pub traits_config_path: PathBuf,
    /// Runs the critique/revise pass after every generation.
    pub auto_qa: bool,
    /// One backoff "unit" of the dispatcher retry policy.
    pub retry_backoff: Duration,
    /// Sessions idle for longer than this are dropped. `None` keeps them for
    /// the life of the process.
    pub session_idle_ttl: Option<Duration>,
    pub port: u16,
    pub rust_log: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing

        let default_provider = env_or("DEFAULT_PROVIDER", "openai");
        let default_provider = ProviderKind::parse(&default_provider).with_context(|| {
            format!("DEFAULT_PROVIDER must be 'openai' or 'gemini', got '{default_provider}'")
        })?;

        Ok(Config {
            openai_api_key: optional_env("OPENAI_API_KEY"),
            openai_model: env_or("OPENAI_MODEL", "gpt-4o"),
            openai_base_url: env_or("OPENAI_BASE_URL", "https://api.openai.com/v1"),
            gemini_api_key: optional_env("GEMINI_API_KEY"),
            gemini_model: env_or("GEMINI_MODEL", "gemini-1.5-pro"),
            gemini_base_url: env_or(
                "GEMINI_BASE_URL",
                "https://generativelanguage.googleapis.com/v1beta",
            ),
            default_provider,
            traits_config_path: PathBuf::from(env_or("TRAITS_CONFIG_PATH", "traits_config.json")),
            auto_qa: parse_bool(&env_or("AUTO_QA", "true")).context("AUTO_QA must be a boolean")?,
            retry_backoff: Duration::from_millis(
                env_or("RETRY_BACKOFF_MS", "1000")
                    .parse::<u64>()
                    .context("RETRY_BACKOFF_MS must be a whole number of milliseconds")?,
            ),
            session_idle_ttl: parse_ttl(&env_or("SESSION_IDLE_TTL_SECS", "3600"))
                .context("SESSION_IDLE_TTL_SECS must be a whole number of seconds")?,
            port: env_or("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: env_or("RUST_LOG", "info"),
        })
    }
}

/// Returns the variable's value, treating unset and blank the same way.
fn optional_env(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_or(key: &str, default: &str) -> String {
    optional_env(key).unwrap_or_else(|| default.to_string())
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.trim().to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => bail!("expected a boolean, got '{other}'"),
    }
}

/// `0` disables eviction.
fn parse_ttl(value: &str) -> Result<Option<Duration>> {
    let secs = value.trim().parse::<u64>()?;
    Ok((secs > 0).then(|| Duration::from_secs(secs)))
}
