//! Error type for handlers that answer with something other than a page,
//! i.e. the CSV downloads.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use inferscope_common::{ApiError, ExportError};

#[derive(Debug, Error)]
pub enum WebError {
    #[error(transparent)]
    Api(#[from] ApiError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),
}

impl WebError {
    pub fn status(&self) -> StatusCode {
        match self {
            WebError::Api(e) if e.is_not_found() => StatusCode::NOT_FOUND,
            WebError::Api(ApiError::Client(_))   => StatusCode::INTERNAL_SERVER_ERROR,
            WebError::Api(_)                     => StatusCode::BAD_GATEWAY,
            WebError::Export(_)                  => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for WebError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        }
        (status, self.to_string()).into_response()
    }
}
