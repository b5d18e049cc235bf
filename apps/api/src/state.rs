use std::sync::Arc;

use crate::config::Config;
use crate::generation::generator::PipelineOptions;
use crate::generation::trait_rules::TraitConfigMap;
use crate::llm_client::LlmClient;
use crate::models::session::SessionStore;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub llm: LlmClient,
    /// Loaded once at startup, read-only afterwards.
    pub traits: Arc<TraitConfigMap>,
    pub sessions: SessionStore,
    pub config: Config,
}

impl AppState {
    pub fn pipeline_options(&self) -> PipelineOptions {
        PipelineOptions {
            default_provider: self.config.default_provider,
            auto_qa: self.config.auto_qa,
        }
    }
}
