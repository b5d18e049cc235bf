//! Axum route handlers for the session and generation API.

use std::sync::Arc;

use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;
use uuid::Uuid;

use crate::errors::AppError;
use crate::export::{render_document, RenderedDocument};
use crate::generation::adapt::adapt_copy;
use crate::generation::generator::{
    generate_copy, GenerateParams, GenerationMode, GenerationOutcome,
};
use crate::generation::variants::{generate_variants, VariantSet, DEFAULT_VARIANT_COUNT};
use crate::llm_client::ProviderKind;
use crate::models::campaign::{CopyType, Country, LengthBucket, TraitScores};
use crate::models::session::Session;
use crate::state::AppState;

// ────────────────────────────────────────────────────────────────────────────
// Request / Response types
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
pub struct CopyTypeOption {
    pub id: CopyType,
    pub label: &'static str,
}

#[derive(Debug, Serialize)]
pub struct CountryOption {
    pub id: Country,
    pub name: &'static str,
}

#[derive(Debug, Serialize)]
pub struct LengthOption {
    pub id: LengthBucket,
    pub label: &'static str,
    pub min_words: u32,
    pub max_words: Option<u32>,
}

#[derive(Debug, Serialize)]
pub struct OptionsResponse {
    pub copy_types: Vec<CopyTypeOption>,
    pub countries: Vec<CountryOption>,
    pub lengths: Vec<LengthOption>,
    pub default_traits: TraitScores,
    pub providers: Vec<ProviderKind>,
    pub default_provider: ProviderKind,
    pub auto_qa: bool,
}

#[derive(Debug, Deserialize)]
pub struct VariantsParams {
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    #[serde(default = "default_variant_count")]
    pub count: usize,
}

fn default_variant_count() -> usize {
    DEFAULT_VARIANT_COUNT
}

#[derive(Debug, Serialize)]
pub struct VariantsResponse {
    pub variants: Option<VariantSet>,
    pub notices: Vec<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdaptParams {
    #[serde(default)]
    pub provider: Option<ProviderKind>,
    /// Copy pasted for adaptation. Falls back to the session's current copy.
    #[serde(default)]
    pub original_copy: Option<String>,
    pub source_country: Country,
    pub target_country: Country,
}

#[derive(Debug, Serialize)]
pub struct AdaptResponse {
    pub adapted_copy: String,
    pub notices: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportSource {
    #[default]
    Generated,
    Adapted,
}

#[derive(Debug, Deserialize)]
pub struct ExportQuery {
    #[serde(default)]
    pub source: ExportSource,
}

// ────────────────────────────────────────────────────────────────────────────
// Handlers
// ────────────────────────────────────────────────────────────────────────────

async fn session_handle(state: &AppState, id: Uuid) -> Result<Arc<Mutex<Session>>, AppError> {
    state
        .sessions
        .get(id)
        .await
        .ok_or_else(|| AppError::NotFound(format!("Session {id} not found")))
}

/// GET /api/v1/options
///
/// Everything a client needs to render the campaign form.
pub async fn handle_options(State(state): State<AppState>) -> Json<OptionsResponse> {
    Json(OptionsResponse {
        copy_types: CopyType::ALL
            .iter()
            .map(|&id| CopyTypeOption { id, label: id.label() })
            .collect(),
        countries: Country::ALL
            .iter()
            .map(|&id| CountryOption { id, name: id.name() })
            .collect(),
        lengths: LengthBucket::ALL
            .iter()
            .map(|&id| {
                let (min_words, max_words) = id.bounds();
                LengthOption {
                    id,
                    label: id.label(),
                    min_words,
                    max_words,
                }
            })
            .collect(),
        default_traits: TraitScores::default_panel(),
        providers: state.llm.available(),
        default_provider: state.config.default_provider,
        auto_qa: state.config.auto_qa,
    })
}

/// POST /api/v1/sessions
pub async fn handle_create_session(
    State(state): State<AppState>,
) -> (StatusCode, Json<Session>) {
    let session = state.sessions.create().await;
    tracing::info!(
        "Created session {} ({} active)",
        session.id,
        state.sessions.len().await
    );
    (StatusCode::CREATED, Json(session))
}

/// GET /api/v1/sessions/:id
pub async fn handle_get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    Ok(Json(session.clone()))
}

/// DELETE /api/v1/sessions/:id
pub async fn handle_delete_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    if state.sessions.remove(id).await {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::NotFound(format!("Session {id} not found")))
    }
}

/// POST /api/v1/sessions/:id/generate
///
/// Fresh generation. Replaces the session's copy and plan on success.
pub async fn handle_generate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(params): Json<GenerateParams>,
) -> Result<Json<GenerationOutcome>, AppError> {
    run_generation(state, id, params, GenerationMode::Fresh).await
}

/// POST /api/v1/sessions/:id/update
///
/// Rewrites the current copy under new trait settings, keeping its structure.
pub async fn handle_update(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(params): Json<GenerateParams>,
) -> Result<Json<GenerationOutcome>, AppError> {
    run_generation(state, id, params, GenerationMode::Revision).await
}

async fn run_generation(
    state: AppState,
    id: Uuid,
    params: GenerateParams,
    mode: GenerationMode,
) -> Result<Json<GenerationOutcome>, AppError> {
    let handle = session_handle(&state, id).await?;
    // Held for the whole action so generations on one session never overlap.
    let mut session = handle.lock().await;
    let outcome = generate_copy(
        &state.llm,
        &state.traits,
        state.pipeline_options(),
        &mut session,
        params,
        mode,
    )
    .await?;
    Ok(Json(outcome))
}

/// POST /api/v1/sessions/:id/variants
pub async fn handle_variants(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(params): Json<VariantsParams>,
) -> Result<Json<VariantsResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    let provider = params.provider.unwrap_or(state.config.default_provider);

    let mut notices = Vec::new();
    let variants = generate_variants(
        &state.llm,
        provider,
        &session.current_copy,
        params.count,
        &mut notices,
    )
    .await?;

    if let Some(set) = &variants {
        session.record_variants(set.clone());
    }
    Ok(Json(VariantsResponse { variants, notices }))
}

/// POST /api/v1/sessions/:id/adapt
///
/// Rewrites pasted copy, or the current copy when none is sent, for another
/// market. The result is stored separately and never replaces the generated copy.
pub async fn handle_adapt(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(params): Json<AdaptParams>,
) -> Result<Json<AdaptResponse>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    let provider = params.provider.unwrap_or(state.config.default_provider);

    let original = params
        .original_copy
        .filter(|c| !c.trim().is_empty())
        .unwrap_or_else(|| session.current_copy.clone());

    let mut notices = Vec::new();
    let adapted_copy = adapt_copy(
        &state.llm,
        provider,
        &original,
        params.source_country,
        params.target_country,
        &mut notices,
    )
    .await?;

    if !adapted_copy.is_empty() {
        session.record_adaptation(adapted_copy.clone());
    }
    Ok(Json(AdaptResponse {
        adapted_copy,
        notices,
    }))
}

/// POST /api/v1/sessions/:id/clear
pub async fn handle_clear(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.clear_generated();
    Ok(Json(session.clone()))
}

/// POST /api/v1/sessions/:id/adapted/clear
pub async fn handle_clear_adapted(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    let handle = session_handle(&state, id).await?;
    let mut session = handle.lock().await;
    session.clear_adapted();
    Ok(Json(session.clone()))
}

/// GET /api/v1/sessions/:id/export?source=generated|adapted
pub async fn handle_export(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Query(query): Query<ExportQuery>,
) -> Result<Json<RenderedDocument>, AppError> {
    let handle = session_handle(&state, id).await?;
    let session = handle.lock().await;
    let text = match query.source {
        ExportSource::Generated => &session.current_copy,
        ExportSource::Adapted => &session.adapted_copy,
    };

    let document = render_document(text);
    if document.is_empty() {
        return Err(AppError::Validation(format!(
            "Nothing to export: the {} copy is empty",
            match query.source {
                ExportSource::Generated => "generated",
                ExportSource::Adapted => "adapted",
            }
        )));
    }
    Ok(Json(document))
}
