//! JSON passthrough of the backend health report.

use axum::{extract::State, http::StatusCode, Json};

use inferscope_common::HealthReport;

use crate::state::SharedState;

/// GET /api/health - 200 when the backend reports healthy, 503 otherwise.
pub async fn api_health(State(state): State<SharedState>) -> (StatusCode, Json<HealthReport>) {
    let health = state.backend.health_check().await;
    let status = if health.is_healthy() {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };
    (status, Json(health))
}
