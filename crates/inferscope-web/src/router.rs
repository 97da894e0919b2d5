//! Axum router — maps all URL paths to handlers.

use std::sync::Arc;

use axum::{
    response::Redirect,
    routing::get,
    Router,
};
use tower_http::{
    compression::CompressionLayer,
    cors::CorsLayer,
    services::ServeDir,
    trace::TraceLayer,
};

use crate::handlers::{
    detail::{detail_export, detail_page},
    health::api_health,
    inference::{inference_page, inference_run},
    overview::{overview_export, overview_page},
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let static_dir = state.config.server.static_dir.clone();
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pages
        .route("/",          get(|| async { Redirect::to("/inference") }))
        .route("/inference", get(inference_page).post(inference_run))
        .route("/overview",  get(overview_page))
        .route("/detail",    get(detail_page))

        // Downloads
        .route("/overview/export.csv",                get(overview_export))
        .route("/detail/{submission_id}/export.csv",  get(detail_export))

        // API endpoints
        .route("/api/health", get(api_health))

        // Static files
        .nest_service("/static", ServeDir::new(static_dir))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}
