//! inferscope-common — Shared types, errors, and presentation helpers used across all Inferscope crates.

pub mod error;
pub mod models;
pub mod format;
pub mod normalise;
pub mod table;
pub mod stats;

// Re-export commonly used types
pub use error::{ApiError, ExportError};
pub use models::{
    HealthReport, InferenceResult, ModelStatus, Pagination, ParameterResult, ParameterStatus,
    Scalar, Submission, SubmissionDetail, SubmissionPage, TrackedSubmission,
};
pub use normalise::{AgreementBadge, AgreementTier};
pub use table::{Row, Table};
