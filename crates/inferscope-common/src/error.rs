use thiserror::Error;

/// Failure of a single call against the remote inference API.
///
/// Callers only ever need to tell two things apart: the resource does not exist
/// (`NotFound`) or the call failed for some other reason that retrying later may fix.
#[derive(Debug, Clone, Error, PartialEq)]
pub enum ApiError {
    #[error("{resource} not found")]
    NotFound { resource: String },

    #[error("Backend unreachable: {0}")]
    Unreachable(String),

    #[error("Backend returned HTTP {status}: {body}")]
    Server { status: u16, body: String },

    #[error("Unexpected response body: {0}")]
    Decode(String),

    #[error("HTTP client error: {0}")]
    Client(String),
}

impl ApiError {
    pub fn not_found(resource: impl Into<String>) -> Self {
        ApiError::NotFound { resource: resource.into() }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ApiError::NotFound { .. })
    }

    /// Everything except `NotFound` is a transient failure from the caller's point of view.
    pub fn is_transient(&self) -> bool {
        !self.is_not_found()
    }
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("CSV serialization error: {0}")]
    Csv(#[from] csv::Error),

    #[error("CSV buffer flush failed: {0}")]
    Flush(String),

    #[error("CSV output is not valid UTF-8: {0}")]
    Utf8(#[from] std::string::FromUtf8Error),
}

pub type Result<T> = std::result::Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_is_not_transient() {
        let err = ApiError::not_found("Submission abc123");
        assert!(err.is_not_found());
        assert!(!err.is_transient());
        assert_eq!(err.to_string(), "Submission abc123 not found");
    }

    #[test]
    fn test_server_error_is_transient() {
        let err = ApiError::Server { status: 500, body: "boom".into() };
        assert!(err.is_transient());
        assert_eq!(err.to_string(), "Backend returned HTTP 500: boom");
    }
}
