//! Wire types returned by the remote inference / tracking API.
//! Every field the backend may omit is defaulted, so partial payloads still deserialize.
//! Submission, detail and result fields also read an explicit `null` as their default.

use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;

fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn null_as_first_run<'de, D>(deserializer: D) -> Result<u32, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<u32>::deserialize(deserializer)?.unwrap_or(1))
}

// ---------------------------------------------------------------------------
// Scalar values whose JSON type varies per model (0/1, "pos", 0.73, true ...)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Scalar {
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Bool(b)  => write!(f, "{}", b),
            Scalar::Int(i)   => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Text(s)  => f.write_str(s),
        }
    }
}

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// A previously ingested sample, as listed by the "recent submissions" endpoint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Submission {
    pub id: String,
    #[serde(default, alias = "createdAt")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RecentSubmissions {
    #[serde(default)]
    pub submissions: Vec<Submission>,
}

/// One row of the tracking list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TrackedSubmission {
    #[serde(deserialize_with = "null_as_default")]
    pub submission_id: String,
    pub inference_timestamp: Option<String>,
    #[serde(deserialize_with = "null_as_default")]
    pub overall_agreement_pct: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub correct_predictions: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_parameters: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Pagination {
    pub total_count: u64,
    pub current_page: u32,
    pub total_pages: u32,
    pub has_next: bool,
    pub has_prev: bool,
    pub limit: u32,
}

impl Default for Pagination {
    fn default() -> Self {
        Self {
            total_count: 0,
            current_page: 1,
            total_pages: 1,
            has_next: false,
            has_prev: false,
            limit: 50,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionPage {
    #[serde(deserialize_with = "null_as_default")]
    pub submissions: Vec<TrackedSubmission>,
    #[serde(deserialize_with = "null_as_default")]
    pub pagination: Pagination,
}

// ---------------------------------------------------------------------------
// Parameter results
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParameterStatus {
    Success,
    Error,
    #[default]
    #[serde(other)]
    Unknown,
}

/// Deployment status of the model that produced a prediction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ModelStatus {
    Production,
    ShadowMode,
    #[serde(other)]
    Unknown,
}

impl ModelStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            ModelStatus::Production => "production",
            ModelStatus::ShadowMode => "shadow_mode",
            ModelStatus::Unknown    => "unknown",
        }
    }
}

/// Prediction for one named parameter of a submission.
///
/// `agreement` is tri-state: `Some(true)` agrees with ground truth, `Some(false)` disagrees,
/// `None` means no ground truth was available. It is never collapsed to a bool.
/// The inference endpoint names the parameter `name`, the tracking endpoint `parameter_name`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ParameterResult {
    #[serde(alias = "parameter_name", deserialize_with = "null_as_default")]
    pub name: String,
    #[serde(deserialize_with = "null_as_default")]
    pub status: ParameterStatus,
    pub model_type: Option<String>,
    pub model_status: Option<ModelStatus>,
    pub prediction: Option<Scalar>,
    pub probability: Option<f64>,
    pub confidence: Option<Scalar>,
    pub ground_truth_raw: Option<Scalar>,
    pub ground_truth_binary: Option<Scalar>,
    pub agreement: Option<bool>,
    pub agreement_pct: Option<f64>,
    pub threshold: Option<f64>,
    pub error: Option<String>,
}

impl ParameterResult {
    pub fn is_error(&self) -> bool {
        self.status == ParameterStatus::Error
    }
}

/// Output of a single inference invocation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct InferenceResult {
    #[serde(deserialize_with = "null_as_default")]
    pub submission_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub total_parameters: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub successful: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub failed: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub parameters: Vec<ParameterResult>,
}

// ---------------------------------------------------------------------------
// Submission detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusStats {
    #[serde(deserialize_with = "null_as_default")]
    pub total: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub correct: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub agreement_pct: f64,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StatusBreakdown {
    pub production: Option<StatusStats>,
    pub shadow_mode: Option<StatusStats>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetailStatistics {
    pub by_status: Option<StatusBreakdown>,
}

/// Aggregate view of one tracked submission and all of its parameter results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SubmissionDetail {
    #[serde(deserialize_with = "null_as_default")]
    pub submission_id: String,
    #[serde(deserialize_with = "null_as_default")]
    pub overall_agreement_pct: f64,
    #[serde(deserialize_with = "null_as_default")]
    pub correct_predictions: u32,
    #[serde(deserialize_with = "null_as_default")]
    pub total_parameters: u32,
    #[serde(deserialize_with = "null_as_first_run")]
    pub run_count: u32,
    pub last_updated: Option<String>,
    pub inference_timestamp: Option<String>,
    pub created_at: Option<String>,
    pub user_id: Option<String>,
    pub lab_name: Option<String>,
    pub statistics: Option<DetailStatistics>,
    #[serde(deserialize_with = "null_as_default")]
    pub parameters: Vec<ParameterResult>,
}

impl Default for SubmissionDetail {
    fn default() -> Self {
        Self {
            submission_id: String::new(),
            overall_agreement_pct: 0.0,
            correct_predictions: 0,
            total_parameters: 0,
            run_count: 1,
            last_updated: None,
            inference_timestamp: None,
            created_at: None,
            user_id: None,
            lab_name: None,
            statistics: None,
            parameters: Vec::new(),
        }
    }
}

impl SubmissionDetail {
    /// Most recent activity on the submission, falling back to the inference time.
    pub fn updated_at(&self) -> Option<&str> {
        self.last_updated
            .as_deref()
            .or(self.inference_timestamp.as_deref())
    }
}

// ---------------------------------------------------------------------------
// Health
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelHealth {
    pub loaded: u32,
    pub total: u32,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseHealth {
    pub status: String,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthComponents {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub models: Option<ModelHealth>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub database: Option<DatabaseHealth>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct HealthReport {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub components: Option<HealthComponents>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl HealthReport {
    /// Report used when the backend could not be reached at all.
    pub fn unreachable(message: impl Into<String>) -> Self {
        Self {
            status: "error".to_string(),
            components: None,
            error: Some(message.into()),
        }
    }

    pub fn is_healthy(&self) -> bool {
        self.status == "healthy"
    }

    pub fn database_ok(&self) -> bool {
        self.components
            .as_ref()
            .and_then(|c| c.database.as_ref())
            .map(|db| db.status == "ok")
            .unwrap_or(false)
    }

    /// `(loaded, total)` model counts, zero when the backend did not report them.
    pub fn model_counts(&self) -> (u32, u32) {
        self.components
            .as_ref()
            .and_then(|c| c.models.as_ref())
            .map(|m| (m.loaded, m.total))
            .unwrap_or((0, 0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_agreement_null_stays_distinct_from_false() {
        let null_gt: ParameterResult = serde_json::from_value(json!({
            "name": "P1", "status": "success", "agreement": null
        })).unwrap();
        let disagree: ParameterResult = serde_json::from_value(json!({
            "name": "P1", "status": "success", "agreement": false
        })).unwrap();
        let missing: ParameterResult = serde_json::from_value(json!({
            "name": "P1", "status": "success"
        })).unwrap();

        assert_eq!(null_gt.agreement, None);
        assert_eq!(disagree.agreement, Some(false));
        assert_eq!(missing.agreement, None);
    }

    #[test]
    fn test_parameter_name_alias() {
        let p: ParameterResult = serde_json::from_value(json!({
            "parameter_name": "Glucose", "status": "error", "error": "model load failed"
        })).unwrap();
        assert_eq!(p.name, "Glucose");
        assert!(p.is_error());
        assert_eq!(p.error.as_deref(), Some("model load failed"));
    }

    #[test]
    fn test_unknown_status_values_do_not_fail() {
        let p: ParameterResult = serde_json::from_value(json!({
            "name": "P9", "status": "skipped", "model_status": "canary"
        })).unwrap();
        assert_eq!(p.status, ParameterStatus::Unknown);
        assert_eq!(p.model_status, Some(ModelStatus::Unknown));
    }

    #[test]
    fn test_scalar_variants() {
        let p: ParameterResult = serde_json::from_value(json!({
            "name": "P1",
            "prediction": 1,
            "confidence": "high",
            "ground_truth_raw": "2+",
            "ground_truth_binary": true
        })).unwrap();
        assert_eq!(p.prediction, Some(Scalar::Int(1)));
        assert_eq!(p.confidence.unwrap().to_string(), "high");
        assert_eq!(p.ground_truth_binary.unwrap().to_string(), "true");
    }

    #[test]
    fn test_recent_submissions_camel_case() {
        let recent: RecentSubmissions = serde_json::from_value(json!({
            "submissions": [
                {"id": "abc", "createdAt": "2026-01-20T16:08:59"},
                {"id": "def", "created_at": "2026-01-19T10:00:00Z"}
            ]
        })).unwrap();
        assert_eq!(recent.submissions.len(), 2);
        assert_eq!(recent.submissions[0].created_at.as_deref(), Some("2026-01-20T16:08:59"));
        assert_eq!(recent.submissions[1].created_at.as_deref(), Some("2026-01-19T10:00:00Z"));
    }

    #[test]
    fn test_detail_defaults() {
        let detail: SubmissionDetail = serde_json::from_value(json!({
            "submission_id": "abc123",
            "inference_timestamp": "2026-01-20T16:08:59"
        })).unwrap();
        assert_eq!(detail.run_count, 1);
        assert!(detail.parameters.is_empty());
        assert_eq!(detail.updated_at(), Some("2026-01-20T16:08:59"));
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let page: SubmissionPage = serde_json::from_value(json!({
            "submissions": [
                {"submission_id": "sub-1", "overall_agreement_pct": null, "correct_predictions": null},
                {"submission_id": "sub-2", "overall_agreement_pct": 75.0, "total_parameters": 4}
            ],
            "pagination": null
        })).unwrap();
        assert_eq!(page.submissions.len(), 2);
        assert_eq!(page.submissions[0].overall_agreement_pct, 0.0);
        assert_eq!(page.submissions[0].correct_predictions, 0);
        assert_eq!(page.submissions[1].overall_agreement_pct, 75.0);
        assert_eq!(page.pagination, Pagination::default());

        let detail: SubmissionDetail = serde_json::from_value(json!({
            "submission_id": "abc123",
            "overall_agreement_pct": null,
            "run_count": null,
            "statistics": {"by_status": {"production": {"total": 3, "correct": null, "agreement_pct": null}}},
            "parameters": [{"parameter_name": null, "status": null, "agreement": null}]
        })).unwrap();
        assert_eq!(detail.overall_agreement_pct, 0.0);
        assert_eq!(detail.run_count, 1);
        assert_eq!(detail.parameters[0].name, "");
        assert_eq!(detail.parameters[0].status, ParameterStatus::Unknown);
        let production = detail.statistics.and_then(|s| s.by_status).and_then(|b| b.production);
        assert_eq!(production, Some(StatusStats { total: 3, correct: 0, agreement_pct: 0.0 }));
    }

    #[test]
    fn test_health_report_accessors() {
        let health: HealthReport = serde_json::from_value(json!({
            "status": "healthy",
            "components": {
                "models": {"loaded": 11, "total": 12},
                "database": {"status": "ok"}
            }
        })).unwrap();
        assert!(health.is_healthy());
        assert!(health.database_ok());
        assert_eq!(health.model_counts(), (11, 12));

        let down = HealthReport::unreachable("connection refused");
        assert!(!down.is_healthy());
        assert!(!down.database_ok());
        assert_eq!(down.model_counts(), (0, 0));
    }
}
