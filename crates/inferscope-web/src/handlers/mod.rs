//! HTTP handlers, one module per page.

pub mod layout;
pub mod inference;
pub mod overview;
pub mod detail;
pub mod health;

use axum::http::header;
use axum::response::{IntoResponse, Response};

use inferscope_common::HealthReport;

use crate::state::SharedState;
use layout::{disconnected_response, safe_file_name, Nav};

/// Every page is gated on the health check. `Err` carries the disconnected
/// page, which the handler returns as is.
pub(crate) async fn require_backend(
    state: &SharedState,
    title: &str,
    active: Nav,
) -> Result<HealthReport, Response> {
    let health = state.backend.health_check().await;
    if health.is_healthy() {
        Ok(health)
    } else {
        tracing::warn!(
            status = %health.status,
            error = health.error.as_deref().unwrap_or(""),
            "Backend unhealthy, showing disconnected banner"
        );
        Err(disconnected_response(title, active, &health, state.backend.base_url()))
    }
}

/// CSV body served as a file download.
pub(crate) fn csv_download(file_name: &str, csv: String) -> Response {
    (
        [
            (header::CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (
                header::CONTENT_DISPOSITION,
                format!("attachment; filename=\"{}\"", safe_file_name(file_name)),
            ),
        ],
        csv,
    )
        .into_response()
}
