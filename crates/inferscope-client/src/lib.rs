//! inferscope-client — Client for the remote inference / tracking REST API.
//!
//! `InferenceBackend` is the seam the web layer talks to; `InferenceApiClient`
//! is the reqwest implementation and `MockBackend` an in-memory one for tests.

pub mod api_client;
pub mod mock;
pub mod query;

use async_trait::async_trait;
use tracing::warn;

use inferscope_common::{
    ApiError, HealthReport, InferenceResult, Submission, SubmissionDetail, SubmissionPage,
};

pub use api_client::{InferenceApiClient, Timeouts, DEFAULT_BASE_URL};
pub use mock::MockBackend;
pub use query::{SortField, SortOrder, SubmissionQuery};

/// Remote operations the dashboard depends on.
#[async_trait]
pub trait InferenceBackend: Send + Sync {
    /// Base URL of the backend, for display in banners.
    fn base_url(&self) -> &str;

    /// Never fails: an unreachable backend is reported as a non-healthy `HealthReport`.
    async fn health_check(&self) -> HealthReport;

    /// Most-recent-first, as ordered by the server.
    async fn list_recent_submissions(&self, limit: u32) -> Result<Vec<Submission>, ApiError>;

    async fn run_inference(&self, submission_id: &str) -> Result<InferenceResult, ApiError>;

    async fn list_tracked_submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<SubmissionPage, ApiError>;

    async fn get_submission_detail(&self, submission_id: &str)
        -> Result<SubmissionDetail, ApiError>;

    /// Recent submissions, degrading to an empty list (logged) when the call fails.
    async fn recent_submissions_or_empty(&self, limit: u32) -> Vec<Submission> {
        match self.list_recent_submissions(limit).await {
            Ok(submissions) => submissions,
            Err(e) => {
                warn!(error = %e, "Could not load recent submissions, continuing with an empty list");
                Vec::new()
            }
        }
    }
}
