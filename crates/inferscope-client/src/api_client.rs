//! reqwest implementation of `InferenceBackend`.
//!
//! Endpoints (all under `{base}/api/v1`):
//!   GET  /health
//!   GET  /submissions/recent?limit=N
//!   POST /inference/{submission_id}
//!   GET  /tracking/submissions?limit&offset&min_agreement&start_date&end_date&sort_by&sort_order
//!   GET  /tracking/submissions/{submission_id}

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Client, Response, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};
use url::Url;

use inferscope_common::models::RecentSubmissions;
use inferscope_common::{
    ApiError, HealthReport, InferenceResult, Submission, SubmissionDetail, SubmissionPage,
};

use crate::query::SubmissionQuery;
use crate::InferenceBackend;

pub const DEFAULT_BASE_URL: &str = "https://api.knoxxi.net/knoxxi-uriscan-inference";

/// Longest error body kept from a failed response.
const MAX_ERROR_BODY: usize = 512;

/// Per-operation request timeouts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timeouts {
    pub health: Duration,
    pub listing: Duration,
    pub inference: Duration,
}

impl Default for Timeouts {
    fn default() -> Self {
        Self {
            health: Duration::from_secs(5),
            listing: Duration::from_secs(10),
            inference: Duration::from_secs(60),
        }
    }
}

#[derive(Debug, Clone)]
pub struct InferenceApiClient {
    client: Client,
    base_url: String,
    timeouts: Timeouts,
}

impl InferenceApiClient {
    pub fn new(base_url: &str) -> Result<Self, ApiError> {
        Self::with_timeouts(base_url, Timeouts::default())
    }

    pub fn with_timeouts(base_url: &str, timeouts: Timeouts) -> Result<Self, ApiError> {
        let base_url = base_url.trim().trim_end_matches('/').to_string();
        let parsed = Url::parse(&base_url)
            .map_err(|e| ApiError::Client(format!("Invalid base URL {}: {}", base_url, e)))?;
        if parsed.cannot_be_a_base() {
            return Err(ApiError::Client(format!("Base URL {} cannot carry a path", base_url)));
        }

        let client = Client::builder()
            .user_agent(concat!("inferscope/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| ApiError::Client(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client, base_url, timeouts })
    }

    pub fn timeouts(&self) -> Timeouts {
        self.timeouts
    }

    /// `{base}/api/v1/<segments...>`, each segment percent-encoded.
    fn endpoint(&self, segments: &[&str]) -> Result<Url, ApiError> {
        let mut url = Url::parse(&format!("{}/api/v1", self.base_url))
            .map_err(|e| ApiError::Client(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| ApiError::Client(format!("Base URL {} cannot carry a path", self.base_url)))?
            .extend(segments);
        Ok(url)
    }
}

/// Translate a transport-level failure into the caller-facing taxonomy.
fn transport_error(err: reqwest::Error) -> ApiError {
    if err.is_timeout() {
        ApiError::Unreachable(format!("request timed out: {}", err))
    } else if err.is_decode() {
        ApiError::Decode(err.to_string())
    } else {
        ApiError::Unreachable(err.to_string())
    }
}

fn truncate_body(mut body: String) -> String {
    if body.len() > MAX_ERROR_BODY {
        let mut cut = MAX_ERROR_BODY;
        while !body.is_char_boundary(cut) {
            cut -= 1;
        }
        body.truncate(cut);
        body.push('…');
    }
    body
}

/// Check the status and decode the JSON body.
/// `lookup` names the resource when a 404 means "does not exist"; listing calls pass `None`.
async fn decode<T: DeserializeOwned>(resp: Response, lookup: Option<String>) -> Result<T, ApiError> {
    let status = resp.status();
    if status == StatusCode::NOT_FOUND {
        if let Some(resource) = lookup {
            return Err(ApiError::not_found(resource));
        }
    }
    if !status.is_success() {
        let body = resp.text().await.unwrap_or_default();
        return Err(ApiError::Server { status: status.as_u16(), body: truncate_body(body) });
    }
    resp.json::<T>()
        .await
        .map_err(|e| ApiError::Decode(e.to_string()))
}

#[async_trait]
impl InferenceBackend for InferenceApiClient {
    fn base_url(&self) -> &str {
        &self.base_url
    }

    #[instrument(skip(self))]
    async fn health_check(&self) -> HealthReport {
        let url = match self.endpoint(&["health"]) {
            Ok(url) => url,
            Err(e) => return HealthReport::unreachable(e.to_string()),
        };
        let resp = match self.client.get(url).timeout(self.timeouts.health).send().await {
            Ok(resp) => resp,
            Err(e) => {
                warn!(error = %e, "Health check failed");
                return HealthReport::unreachable(transport_error(e).to_string());
            }
        };
        match decode::<HealthReport>(resp, None).await {
            Ok(report) => {
                debug!(status = %report.status, "Health check returned");
                report
            }
            Err(e) => {
                warn!(error = %e, "Health check returned an unusable response");
                HealthReport::unreachable(e.to_string())
            }
        }
    }

    #[instrument(skip(self))]
    async fn list_recent_submissions(&self, limit: u32) -> Result<Vec<Submission>, ApiError> {
        let url = self.endpoint(&["submissions", "recent"])?;
        let resp = self.client
            .get(url)
            .query(&[("limit", limit)])
            .timeout(self.timeouts.listing)
            .send()
            .await
            .map_err(transport_error)?;

        let recent: RecentSubmissions = decode(resp, None).await?;
        debug!(count = recent.submissions.len(), "Recent submissions loaded");
        Ok(recent.submissions)
    }

    #[instrument(skip(self))]
    async fn run_inference(&self, submission_id: &str) -> Result<InferenceResult, ApiError> {
        let url = self.endpoint(&["inference", submission_id])?;
        let resp = self.client
            .post(url)
            .timeout(self.timeouts.inference)
            .send()
            .await
            .map_err(transport_error)?;

        let result: InferenceResult =
            decode(resp, Some(format!("Submission {}", submission_id))).await?;
        debug!(
            total = result.total_parameters,
            successful = result.successful,
            failed = result.failed,
            "Inference completed"
        );
        Ok(result)
    }

    #[instrument(skip(self))]
    async fn list_tracked_submissions(
        &self,
        query: &SubmissionQuery,
    ) -> Result<SubmissionPage, ApiError> {
        let url = self.endpoint(&["tracking", "submissions"])?;
        let resp = self.client
            .get(url)
            .query(query)
            .timeout(self.timeouts.listing)
            .send()
            .await
            .map_err(transport_error)?;

        let page: SubmissionPage = decode(resp, None).await?;
        debug!(
            count = page.submissions.len(),
            total = page.pagination.total_count,
            "Tracked submissions loaded"
        );
        Ok(page)
    }

    #[instrument(skip(self))]
    async fn get_submission_detail(
        &self,
        submission_id: &str,
    ) -> Result<SubmissionDetail, ApiError> {
        let url = self.endpoint(&["tracking", "submissions", submission_id])?;
        let resp = self.client
            .get(url)
            .timeout(self.timeouts.listing)
            .send()
            .await
            .map_err(transport_error)?;

        decode(resp, Some(format!("Submission {} in tracking database", submission_id))).await
    }
}
