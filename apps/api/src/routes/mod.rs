pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::generation::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        .route("/api/v1/options", get(handlers::handle_options))
        // Sessions
        .route("/api/v1/sessions", post(handlers::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(handlers::handle_get_session).delete(handlers::handle_delete_session),
        )
        // Generation
        .route(
            "/api/v1/sessions/:id/generate",
            post(handlers::handle_generate),
        )
        .route("/api/v1/sessions/:id/update", post(handlers::handle_update))
        .route(
            "/api/v1/sessions/:id/variants",
            post(handlers::handle_variants),
        )
        .route("/api/v1/sessions/:id/adapt", post(handlers::handle_adapt))
        .route("/api/v1/sessions/:id/clear", post(handlers::handle_clear))
        .route(
            "/api/v1/sessions/:id/adapted/clear",
            post(handlers::handle_clear_adapted),
        )
        // Export
        .route("/api/v1/sessions/:id/export", get(handlers::handle_export))
        .with_state(state)
}
