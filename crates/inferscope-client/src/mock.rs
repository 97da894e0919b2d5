//! In-memory `InferenceBackend` for handler tests and offline demos.

use std::collections::HashMap;
use std::sync::Mutex;

use async_trait::async_trait;

use inferscope_common::{
    ApiError, HealthReport, InferenceResult, Submission, SubmissionDetail, SubmissionPage,
};

use crate::query::SubmissionQuery;
use crate::InferenceBackend;

const MOCK_BASE_URL: &str = "http://mock.invalid";

// ── Mock Implementation for Testing ────────────────────────────────────────

pub struct MockBackend {
    health: HealthReport,
    recent: Result<Vec<Submission>, ApiError>,
    inference: HashMap<String, Result<InferenceResult, ApiError>>,
    details: HashMap<String, Result<SubmissionDetail, ApiError>>,
    page: Result<SubmissionPage, ApiError>,
    queries: Mutex<Vec<SubmissionQuery>>,
}

impl MockBackend {
    /// A healthy backend with no data.
    pub fn new() -> Self {
        Self {
            health: HealthReport {
                status: "healthy".to_string(),
                ..Default::default()
            },
            recent: Ok(Vec::new()),
            inference: HashMap::new(),
            details: HashMap::new(),
            page: Ok(SubmissionPage::default()),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn with_health(mut self, health: HealthReport) -> Self {
        self.health = health;
        self
    }

    pub fn unreachable(self, message: &str) -> Self {
        self.with_health(HealthReport::unreachable(message))
    }

    pub fn with_recent(mut self, submissions: Vec<Submission>) -> Self {
        self.recent = Ok(submissions);
        self
    }

    pub fn with_recent_error(mut self, err: ApiError) -> Self {
        self.recent = Err(err);
        self
    }

    pub fn with_inference(mut self, result: InferenceResult) -> Self {
        self.inference.insert(result.submission_id.clone(), Ok(result));
        self
    }

    pub fn with_inference_error(mut self, submission_id: &str, err: ApiError) -> Self {
        self.inference.insert(submission_id.to_string(), Err(err));
        self
    }

    pub fn with_detail(mut self, detail: SubmissionDetail) -> Self {
        self.details.insert(detail.submission_id.clone(), Ok(detail));
        self
    }

    pub fn with_detail_error(mut self, submission_id: &str, err: ApiError) -> Self {
        self.details.insert(submission_id.to_string(), Err(err));
        self
    }

    pub fn with_page(mut self, page: SubmissionPage) -> Self {
        self.page = Ok(page);
        self
    }

    pub fn with_page_error(mut self, err: ApiError) -> Self {
        self.page = Err(err);
        self
    }

    /// Every tracked-submission query received so far, oldest first.
    pub fn recorded_queries(&self) -> Vec<SubmissionQuery> {
        self.queries
            .lock()
            .map(|q| q.clone())
            .unwrap_or_default()
    }
}

impl Default for MockBackend {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl InferenceBackend for MockBackend {
    fn base_url(&self) -> &str {
        MOCK_BASE_URL
    }

    async fn health_check(&self) -> HealthReport {
        self.health.clone()
    }

    async fn list_recent_submissions(&self, limit: u32) -> Result<Vec<Submission>, ApiError> {
        self.recent
            .clone()
            .map(|subs| subs.into_iter().take(limit as usize).collect())
    }

    async fn run_inference(&self, submission_id: &str) -> Result<InferenceResult, ApiError> {
        self.inference
            .get(submission_id)
            .cloned()
            .unwrap_or_else(|| Err(ApiError::not_found(format!("Submission {}", submission_id))))
    }

    async fn list_tracked_submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<SubmissionPage, ApiError> {
        if let Ok(mut queries) = self.queries.lock() {
            queries.push(query.clone());
        }
        self.page.clone()
    }

    async fn get_submission_detail(
        &self,
        submission_id: &str,
    ) -> Result<SubmissionDetail, ApiError> {
        self.details
            .get(submission_id)
            .cloned()
            .unwrap_or_else(|| {
                Err(ApiError::not_found(format!(
                    "Submission {} in tracking database",
                    submission_id
                )))
            })
    }
}
