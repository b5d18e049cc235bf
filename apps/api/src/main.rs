mod config;
mod errors;
mod export;
mod generation;
mod llm_client;
mod models;
mod routes;
mod state;

use anyhow::{Context, Result};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;
use crate::generation::trait_rules::TraitConfigMap;
use crate::llm_client::LlmClient;
use crate::models::session::SessionStore;
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Copywriter API v{}", env!("CARGO_PKG_VERSION"));

    // Trait config is required; a bad file stops startup
    let traits = TraitConfigMap::load(&config.traits_config_path).with_context(|| {
        format!(
            "failed to load trait config from {}",
            config.traits_config_path.display()
        )
    })?;
    if traits.is_empty() {
        warn!("Trait config is empty; no hard requirements will be compiled");
    }
    info!(
        "Loaded {} trait rules from {}",
        traits.len(),
        config.traits_config_path.display()
    );

    // Initialize LLM client
    let llm = LlmClient::from_config(&config);
    for kind in llm.available() {
        info!(
            "LLM provider {kind} ready (model: {})",
            llm.model_for(kind).unwrap_or("unknown")
        );
    }
    if llm.ensure_available(config.default_provider).is_err() {
        warn!(
            "Default provider {} has no API key; requests using it will be rejected",
            config.default_provider
        );
    }
    if !config.auto_qa {
        info!("Self-QA disabled (AUTO_QA=false)");
    }

    let sessions = SessionStore::new();
    match config.session_idle_ttl {
        Some(ttl) => spawn_session_sweeper(sessions.clone(), ttl),
        None => info!("Session eviction disabled (SESSION_IDLE_TTL_SECS=0)"),
    }

    let state = AppState {
        llm,
        traits: Arc::new(traits),
        sessions,
        config: config.clone(),
    };

    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the web client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Periodically drops sessions idle for longer than `ttl`.
fn spawn_session_sweeper(sessions: SessionStore, ttl: Duration) {
    let period = (ttl / 4).max(Duration::from_secs(30));
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(period);
        ticker.tick().await;
        loop {
            ticker.tick().await;
            let evicted = sessions.evict_idle(ttl).await;
            if evicted > 0 {
                info!("Evicted {evicted} idle session(s)");
            }
        }
    });
}
