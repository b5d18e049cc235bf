/// LLM Client: the single point of entry for all provider calls in the copywriter.
///
/// ARCHITECTURAL RULE: no generation module may call a provider API directly.
/// Every request goes through `LlmClient::dispatch`, which owns the retry policy.
///
/// Providers are adapters behind the `ChatProvider` trait. Adding a backend means
/// adding an adapter and registering it in `LlmClient::from_config`; callers only
/// ever see a `ProviderKind`.
use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, warn};

use crate::config::Config;

pub mod gemini;
pub mod openai;
pub mod prompts;

#[cfg(test)]
pub(crate) mod testing;

/// Output token ceiling sent with every request.
pub const MAX_TOKENS: u32 = 4096;
const MAX_ATTEMPTS: u32 = 3;
const HTTP_TIMEOUT: Duration = Duration::from_secs(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    OpenAi,
    Gemini,
}

impl ProviderKind {
    pub fn parse(value: &str) -> Option<Self> {
        match value.trim().to_ascii_lowercase().as_str() {
            "openai" => Some(ProviderKind::OpenAi),
            "gemini" | "google" => Some(ProviderKind::Gemini),
            _ => None,
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ProviderKind::OpenAi => f.write_str("openai"),
            ProviderKind::Gemini => f.write_str("gemini"),
        }
    }
}

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("API error (status {status}): {message}")]
    Api { status: u16, message: String },

    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("LLM returned empty content")]
    EmptyContent,

    #[error("provider '{0}' is not configured (missing API key)")]
    ProviderUnavailable(ProviderKind),
}

impl LlmError {
    /// Rate limits, server errors and transport failures are worth another attempt.
    /// Other client errors will fail the same way again.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Http(_) | LlmError::Parse(_) | LlmError::EmptyContent => true,
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::ProviderUnavailable(_) => false,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: Role::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
        }
    }
}

/// Provider-neutral request: role-tagged messages plus output options.
#[derive(Debug, Clone)]
pub struct ChatRequest {
    pub messages: Vec<ChatMessage>,
    /// Ask the provider for a structured JSON reply.
    pub json_mode: bool,
    pub temperature: Option<f32>,
    pub max_tokens: u32,
}

impl ChatRequest {
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            json_mode: false,
            temperature: None,
            max_tokens: MAX_TOKENS,
        }
    }

    pub fn json(mut self) -> Self {
        self.json_mode = true;
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = Some(temperature);
        self
    }
}

/// One LLM backend. Implementations make exactly one attempt per call and
/// return the trimmed reply text; retries belong to `LlmClient::dispatch`.
#[async_trait]
pub trait ChatProvider: Send + Sync {
    fn kind(&self) -> ProviderKind;

    fn model(&self) -> &str;

    async fn send(&self, request: &ChatRequest) -> Result<String, LlmError>;
}

/// Linear backoff: after failed attempt `k` (0-indexed) wait `(1 + k)` units.
#[derive(Debug, Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub unit: Duration,
}

impl RetryPolicy {
    pub fn new(unit: Duration) -> Self {
        Self {
            max_attempts: MAX_ATTEMPTS,
            unit,
        }
    }

    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.unit * (1 + attempt)
    }
}

/// Result of a dispatch. Exhaustion is a value, not an error: callers turn it
/// into a user-visible notice and carry on with an empty result.
#[derive(Debug)]
pub enum DispatchOutcome {
    Reply(String),
    Exhausted { attempts: u32, error: LlmError },
}

impl DispatchOutcome {
    /// Returns the reply text, or an empty string after recording a notice.
    pub fn into_text(self, action: &str, notices: &mut Vec<String>) -> String {
        match self {
            DispatchOutcome::Reply(text) => text,
            DispatchOutcome::Exhausted { attempts, error } => {
                notices.push(format!(
                    "{action} failed after {attempts} attempt(s): {error}"
                ));
                String::new()
            }
        }
    }
}

/// The single LLM client used by every generation component.
#[derive(Clone)]
pub struct LlmClient {
    providers: Arc<HashMap<ProviderKind, Arc<dyn ChatProvider>>>,
    retry: RetryPolicy,
}

impl LlmClient {
    pub fn new(providers: Vec<Arc<dyn ChatProvider>>, retry: RetryPolicy) -> Self {
        let providers = providers.into_iter().map(|p| (p.kind(), p)).collect();
        Self {
            providers: Arc::new(providers),
            retry,
        }
    }

    /// Registers an adapter for every provider that has credentials configured.
    pub fn from_config(config: &Config) -> Self {
        let http = build_http_client();
        let mut providers: Vec<Arc<dyn ChatProvider>> = Vec::new();

        if let Some(key) = &config.openai_api_key {
            providers.push(Arc::new(openai::OpenAiProvider::new(
                http.clone(),
                key.clone(),
                config.openai_model.clone(),
                config.openai_base_url.clone(),
            )));
        }
        if let Some(key) = &config.gemini_api_key {
            providers.push(Arc::new(gemini::GeminiProvider::new(
                http,
                key.clone(),
                config.gemini_model.clone(),
                config.gemini_base_url.clone(),
            )));
        }

        Self::new(providers, RetryPolicy::new(config.retry_backoff))
    }

    /// Providers with credentials, in a stable order.
    pub fn available(&self) -> Vec<ProviderKind> {
        let mut kinds: Vec<_> = self.providers.keys().copied().collect();
        kinds.sort();
        kinds
    }

    pub fn model_for(&self, kind: ProviderKind) -> Option<&str> {
        self.providers.get(&kind).map(|p| p.model())
    }

    /// Pre-flight check, run before any prompt is built or sent.
    pub fn ensure_available(&self, kind: ProviderKind) -> Result<(), LlmError> {
        if self.providers.contains_key(&kind) {
            Ok(())
        } else {
            Err(LlmError::ProviderUnavailable(kind))
        }
    }

    /// Sends `request` to the selected provider, retrying per the policy.
    pub async fn dispatch(&self, kind: ProviderKind, request: &ChatRequest) -> DispatchOutcome {
        let Some(provider) = self.providers.get(&kind) else {
            return DispatchOutcome::Exhausted {
                attempts: 0,
                error: LlmError::ProviderUnavailable(kind),
            };
        };

        let mut attempt = 0;
        loop {
            match provider.send(request).await {
                Ok(text) => {
                    debug!(
                        "LLM call succeeded: provider={} model={} attempt={} chars={}",
                        kind,
                        provider.model(),
                        attempt + 1,
                        text.len()
                    );
                    return DispatchOutcome::Reply(text);
                }
                Err(error) => {
                    let attempts = attempt + 1;
                    if !error.is_retryable() || attempts >= self.retry.max_attempts {
                        warn!(
                            "LLM call to {} giving up after {} attempt(s): {}",
                            kind, attempts, error
                        );
                        return DispatchOutcome::Exhausted { attempts, error };
                    }

                    let delay = self.retry.delay_after(attempt);
                    warn!(
                        "LLM call attempt {} to {} failed ({}), retrying after {}ms...",
                        attempts,
                        kind,
                        error,
                        delay.as_millis()
                    );
                    tokio::time::sleep(delay).await;
                    attempt += 1;
                }
            }
        }
    }
}

fn build_http_client() -> Client {
    Client::builder()
        .timeout(HTTP_TIMEOUT)
        .connect_timeout(Duration::from_secs(10))
        .build()
        .unwrap_or_else(|_| Client::new())
}

#[derive(Debug, Deserialize)]
struct ProviderErrorEnvelope {
    error: ProviderErrorBody,
}

#[derive(Debug, Deserialize)]
struct ProviderErrorBody {
    message: String,
}

/// Builds an `Api` error, preferring the provider's `{"error":{"message":..}}` text.
pub(crate) fn api_error(status: StatusCode, body: String) -> LlmError {
    let message = serde_json::from_str::<ProviderErrorEnvelope>(&body)
        .map(|e| e.error.message)
        .unwrap_or(body);
    LlmError::Api {
        status: status.as_u16(),
        message,
    }
}

/// Strips ```json ... ``` or ``` ... ``` code fences from LLM output.
pub fn strip_json_fences(text: &str) -> &str {
    let text = text.trim();
    if let Some(stripped) = text.strip_prefix("```json") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else if let Some(stripped) = text.strip_prefix("```") {
        stripped
            .trim_start()
            .strip_suffix("```")
            .map(|s| s.trim())
            .unwrap_or(stripped.trim_start())
    } else {
        text
    }
}
