//! Result normalisation: shape parameter results and tracked submissions into
//! display rows.
//!
//! Pure functions only. The same input always produces the same table, no matter
//! which page renders it or how often.

use crate::format::{
    format_percentage, format_probability, format_threshold, format_timestamp, MISSING,
    PERCENT_DECIMALS,
};
use crate::models::{ParameterResult, Scalar, TrackedSubmission};
use crate::table::{Row, Table};

/// Placeholder used for every derived cell of a parameter whose model failed.
pub const ERROR_PLACEHOLDER: &str = "-";

// ---------------------------------------------------------------------------
// Agreement badge (parameter level)
// ---------------------------------------------------------------------------

/// Display state of one parameter. Priority: error > no ground truth > agree/disagree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgreementBadge {
    Agree,
    Disagree,
    NoGroundTruth,
    Error,
}

impl AgreementBadge {
    pub fn for_parameter(param: &ParameterResult) -> Self {
        if param.is_error() {
            return AgreementBadge::Error;
        }
        match param.agreement {
            Some(true)  => AgreementBadge::Agree,
            Some(false) => AgreementBadge::Disagree,
            None        => AgreementBadge::NoGroundTruth,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementBadge::Agree         => "agree",
            AgreementBadge::Disagree      => "disagree",
            AgreementBadge::NoGroundTruth => "no-ground-truth",
            AgreementBadge::Error         => "error",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AgreementBadge::Agree         => "✅",
            AgreementBadge::Disagree      => "❌",
            AgreementBadge::NoGroundTruth => "⚠️",
            AgreementBadge::Error         => "🔴",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            AgreementBadge::Agree         => "row-agree",
            AgreementBadge::Disagree      => "row-disagree",
            AgreementBadge::NoGroundTruth => "row-no-gt",
            AgreementBadge::Error         => "row-error",
        }
    }
}

// ---------------------------------------------------------------------------
// Agreement-rate tier (submission level)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgreementTier {
    High,
    Medium,
    Low,
}

impl AgreementTier {
    pub const HIGH_THRESHOLD: f64 = 80.0;
    pub const MEDIUM_THRESHOLD: f64 = 50.0;

    pub fn from_pct(pct: f64) -> Self {
        if pct >= Self::HIGH_THRESHOLD {
            AgreementTier::High
        } else if pct >= Self::MEDIUM_THRESHOLD {
            AgreementTier::Medium
        } else {
            AgreementTier::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgreementTier::High   => "high",
            AgreementTier::Medium => "medium",
            AgreementTier::Low    => "low",
        }
    }

    pub fn symbol(&self) -> &'static str {
        match self {
            AgreementTier::High   => "🟢",
            AgreementTier::Medium => "🟡",
            AgreementTier::Low    => "🔴",
        }
    }

    pub fn css_class(&self) -> &'static str {
        match self {
            AgreementTier::High   => "tier-high",
            AgreementTier::Medium => "tier-medium",
            AgreementTier::Low    => "tier-low",
        }
    }
}

// ---------------------------------------------------------------------------
// Parameter rows
// ---------------------------------------------------------------------------

pub const PARAMETER_COLUMNS: &[&str] = &[
    "Agreement",
    "Parameter",
    "Model Status",
    "Model Type",
    "Prediction",
    "Probability",
    "Confidence",
    "Ground Truth",
    "GT Binary",
    "Agreement %",
    "Threshold",
    "Error",
];

fn scalar_cell(value: Option<&Scalar>) -> String {
    value.map(Scalar::to_string).unwrap_or_else(|| MISSING.to_string())
}

/// Cells of one parameter row, in `PARAMETER_COLUMNS` order.
pub fn parameter_cells(param: &ParameterResult) -> Vec<String> {
    let badge = AgreementBadge::for_parameter(param);
    let name = if param.name.is_empty() { MISSING.to_string() } else { param.name.clone() };
    let model_status = param
        .model_status
        .map(|s| s.as_str().to_string())
        .unwrap_or_else(|| "unknown".to_string());

    if badge == AgreementBadge::Error {
        let dash = || ERROR_PLACEHOLDER.to_string();
        return vec![
            badge.as_str().to_string(),
            name,
            model_status,
            dash(),
            dash(),
            dash(),
            dash(),
            dash(),
            dash(),
            dash(),
            dash(),
            param.error.clone().unwrap_or_else(|| "Unknown error".to_string()),
        ];
    }

    vec![
        badge.as_str().to_string(),
        name,
        model_status,
        param
            .model_type
            .as_deref()
            .map(str::to_uppercase)
            .unwrap_or_else(|| MISSING.to_string()),
        scalar_cell(param.prediction.as_ref()),
        param.probability.map(format_probability).unwrap_or_else(|| MISSING.to_string()),
        scalar_cell(param.confidence.as_ref()),
        scalar_cell(param.ground_truth_raw.as_ref()),
        scalar_cell(param.ground_truth_binary.as_ref()),
        format_percentage(param.agreement_pct, PERCENT_DECIMALS),
        param.threshold.map(format_threshold).unwrap_or_else(|| MISSING.to_string()),
        ERROR_PLACEHOLDER.to_string(),
    ]
}

pub fn parameter_table<'a, I>(params: I) -> Table
where
    I: IntoIterator<Item = &'a ParameterResult>,
{
    let mut table = Table::new(PARAMETER_COLUMNS);
    for param in params {
        let badge = AgreementBadge::for_parameter(param);
        table.push(Row {
            cells: parameter_cells(param),
            tone: badge.css_class(),
            key: Some(param.name.clone()),
        });
    }
    table
}

// ---------------------------------------------------------------------------
// Submission rows
// ---------------------------------------------------------------------------

pub const SUBMISSION_COLUMNS: &[&str] = &[
    "Status",
    "Submission ID",
    "Date/Time",
    "Agreement %",
    "Correct",
    "Total",
    "Models Tested",
];

pub fn submission_cells(sub: &TrackedSubmission) -> Vec<String> {
    let tier = AgreementTier::from_pct(sub.overall_agreement_pct);
    vec![
        tier.as_str().to_string(),
        sub.submission_id.clone(),
        format_timestamp(sub.inference_timestamp.as_deref()),
        format_percentage(Some(sub.overall_agreement_pct), PERCENT_DECIMALS),
        sub.correct_predictions.to_string(),
        sub.total_parameters.to_string(),
        format!("{}/{}", sub.correct_predictions, sub.total_parameters),
    ]
}

pub fn submission_table<'a, I>(submissions: I) -> Table
where
    I: IntoIterator<Item = &'a TrackedSubmission>,
{
    let mut table = Table::new(SUBMISSION_COLUMNS);
    for sub in submissions {
        table.push(Row {
            cells: submission_cells(sub),
            tone: AgreementTier::from_pct(sub.overall_agreement_pct).css_class(),
            key: Some(sub.submission_id.clone()),
        });
    }
    table
}

/// Client-side, case-insensitive substring match on submission id. An empty query keeps everything.
pub fn filter_by_submission_id<'a>(
    submissions: &'a [TrackedSubmission],
    query: &str,
) -> Vec<&'a TrackedSubmission> {
    let needle = query.trim().to_lowercase();
    submissions
        .iter()
        .filter(|s| needle.is_empty() || s.submission_id.to_lowercase().contains(&needle))
        .collect()
}

/// Parameters whose prediction disagreed with an available ground truth.
pub fn disagreements(params: &[ParameterResult]) -> Vec<&ParameterResult> {
    params
        .iter()
        .filter(|p| AgreementBadge::for_parameter(p) == AgreementBadge::Disagree)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{ModelStatus, ParameterStatus, SubmissionDetail};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn param(status: ParameterStatus, agreement: Option<bool>) -> ParameterResult {
        ParameterResult {
            name: "P".to_string(),
            status,
            agreement,
            ..Default::default()
        }
    }

    #[test]
    fn test_error_badge_wins_over_agreement() {
        for agreement in [Some(true), Some(false), None] {
            let p = param(ParameterStatus::Error, agreement);
            assert_eq!(AgreementBadge::for_parameter(&p), AgreementBadge::Error);
        }
    }

    #[test]
    fn test_badge_follows_tri_state_agreement() {
        for status in [ParameterStatus::Success, ParameterStatus::Unknown] {
            assert_eq!(AgreementBadge::for_parameter(&param(status, Some(true))).as_str(), "agree");
            assert_eq!(AgreementBadge::for_parameter(&param(status, Some(false))).as_str(), "disagree");
            assert_eq!(AgreementBadge::for_parameter(&param(status, None)).as_str(), "no-ground-truth");
        }
    }

    #[test]
    fn test_tier_boundaries() {
        assert_eq!(AgreementTier::from_pct(80.0).as_str(), "high");
        assert_eq!(AgreementTier::from_pct(79.9).as_str(), "medium");
        assert_eq!(AgreementTier::from_pct(50.0).as_str(), "medium");
        assert_eq!(AgreementTier::from_pct(49.9).as_str(), "low");
        assert_eq!(AgreementTier::from_pct(100.0), AgreementTier::High);
        assert_eq!(AgreementTier::from_pct(0.0), AgreementTier::Low);
    }

    #[test]
    fn test_detail_rows_end_to_end() {
        let detail: SubmissionDetail = serde_json::from_value(json!({
            "submission_id": "abc123",
            "parameters": [
                {"parameter_name": "P1", "status": "success", "agreement": true, "probability": 0.812},
                {"parameter_name": "P2", "status": "error", "error": "model load failed"}
            ]
        })).unwrap();

        let table = parameter_table(&detail.parameters);
        assert_eq!(table.len(), 2);
        assert_eq!(table.cell(0, "Agreement"), Some("agree"));
        assert_eq!(table.cell(0, "Probability"), Some("0.812"));
        assert_eq!(table.cell(1, "Agreement"), Some("error"));
        assert_eq!(table.cell(1, "Probability"), Some("-"));
        assert_eq!(table.cell(0, "Agreement %"), Some("N/A"));
        assert_eq!(table.cell(1, "Agreement %"), Some("-"));
        assert_eq!(table.cell(1, "Error"), Some("model load failed"));
        assert_eq!(table.rows[1].tone, "row-error");
    }

    #[test]
    fn test_success_row_formatting() {
        let p = ParameterResult {
            name: "Leukocytes".to_string(),
            status: ParameterStatus::Success,
            model_type: Some("cnn".to_string()),
            model_status: Some(ModelStatus::ShadowMode),
            prediction: Some(Scalar::Int(1)),
            probability: Some(0.91234),
            confidence: Some(Scalar::Text("high".to_string())),
            ground_truth_raw: None,
            ground_truth_binary: None,
            agreement: None,
            agreement_pct: Some(66.666),
            threshold: Some(0.5),
            error: None,
        };
        assert_eq!(
            parameter_cells(&p),
            vec![
                "no-ground-truth", "Leukocytes", "shadow_mode", "CNN", "1", "0.912", "high",
                "N/A", "N/A", "66.7%", "0.50", "-",
            ]
        );
    }

    #[test]
    fn test_normalisation_is_idempotent() {
        let params = vec![
            param(ParameterStatus::Success, Some(false)),
            param(ParameterStatus::Error, None),
        ];
        assert_eq!(parameter_table(&params), parameter_table(&params));
    }

    #[test]
    fn test_submission_rows() {
        let subs = vec![
            TrackedSubmission {
                submission_id: "sub-A".to_string(),
                inference_timestamp: Some("2026-01-20T16:08:59Z".to_string()),
                overall_agreement_pct: 83.333,
                correct_predictions: 10,
                total_parameters: 12,
            },
            TrackedSubmission {
                submission_id: "sub-B".to_string(),
                inference_timestamp: None,
                overall_agreement_pct: 49.9,
                correct_predictions: 5,
                total_parameters: 10,
            },
        ];
        let table = submission_table(&subs);
        assert_eq!(
            table.rows[0].cells,
            vec!["high", "sub-A", "2026-01-20 16:08:59", "83.3%", "10", "12", "10/12"]
        );
        assert_eq!(table.cell(1, "Status"), Some("low"));
        assert_eq!(table.cell(1, "Date/Time"), Some("N/A"));
        assert_eq!(table.rows[1].key.as_deref(), Some("sub-B"));
    }

    #[test]
    fn test_search_filter_is_case_insensitive() {
        let subs = vec![
            TrackedSubmission { submission_id: "ABC-001".into(), ..Default::default() },
            TrackedSubmission { submission_id: "xyz-002".into(), ..Default::default() },
        ];
        let hits = filter_by_submission_id(&subs, " abc ");
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].submission_id, "ABC-001");
        assert_eq!(filter_by_submission_id(&subs, "").len(), 2);
    }

    #[test]
    fn test_disagreements_exclude_null_and_errors() {
        let params = vec![
            param(ParameterStatus::Success, Some(false)),
            param(ParameterStatus::Success, None),
            param(ParameterStatus::Error, Some(false)),
            param(ParameterStatus::Success, Some(true)),
        ];
        assert_eq!(disagreements(&params).len(), 1);
    }
}
