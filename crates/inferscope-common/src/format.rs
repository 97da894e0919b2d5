//! Display formatting shared by every table, card and CSV export.
//!
//! The decimal precision constants are the single source of truth: on-screen
//! and exported values go through the same functions and can never diverge.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

use crate::models::{ModelStatus, Submission};

pub const PROBABILITY_DECIMALS: usize = 3;
pub const PERCENT_DECIMALS: usize = 1;
pub const THRESHOLD_DECIMALS: usize = 2;

/// Placeholder for a value the backend did not provide.
pub const MISSING: &str = "N/A";

const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// Parse an ISO-8601 timestamp into its wall-clock time, keeping whatever offset it was written in.
fn parse_wall_clock(raw: &str) -> Option<NaiveDateTime> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_local());
    }
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(raw, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
}

/// Parse an ISO-8601 timestamp as a UTC instant. Timestamps without an offset are taken as UTC.
pub fn parse_utc(raw: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    parse_wall_clock(raw).map(|naive| naive.and_utc())
}

/// `2026-01-20T16:08:59Z` → `2026-01-20 16:08:59`. Unparsable input is returned as-is.
pub fn format_timestamp(raw: Option<&str>) -> String {
    let raw = match raw.map(str::trim) {
        Some(s) if !s.is_empty() => s,
        _ => return MISSING.to_string(),
    };
    match parse_wall_clock(raw) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S").to_string(),
        None => raw.to_string(),
    }
}

pub fn format_percentage(value: Option<f64>, decimals: usize) -> String {
    match value {
        Some(v) => format!("{:.*}%", decimals, v),
        None => MISSING.to_string(),
    }
}

pub fn format_probability(value: f64) -> String {
    format!("{:.*}", PROBABILITY_DECIMALS, value)
}

pub fn format_threshold(value: f64) -> String {
    format!("{:.*}", THRESHOLD_DECIMALS, value)
}

pub fn model_status_badge(status: Option<ModelStatus>) -> &'static str {
    match status {
        Some(ModelStatus::Production) => "🟦",
        Some(ModelStatus::ShadowMode) => "🟨",
        _                             => "⬜",
    }
}

/// Label for the submission picker, e.g. `a1b2c3d4... - Jan 20, 2026 — 06:58 PM UTC`.
pub fn submission_option_label(submission: &Submission) -> String {
    let id = &submission.id;
    let display_id = if id.chars().count() > 12 {
        format!("{}...", id.chars().take(8).collect::<String>())
    } else {
        id.clone()
    };

    let when = submission
        .created_at
        .as_deref()
        .and_then(parse_utc)
        .map(|dt| dt.format("%b %d, %Y — %I:%M %p UTC").to_string())
        .unwrap_or_else(|| "Unknown time".to_string());

    format!("{} - {}", display_id, when)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_timestamp_variants() {
        assert_eq!(format_timestamp(Some("2026-01-20T16:08:59Z")), "2026-01-20 16:08:59");
        assert_eq!(format_timestamp(Some("2026-01-20T16:08:59.123456")), "2026-01-20 16:08:59");
        assert_eq!(format_timestamp(Some("2026-01-20T16:08:59+02:00")), "2026-01-20 16:08:59");
        assert_eq!(format_timestamp(Some("2026-01-20")), "2026-01-20 00:00:00");
    }

    #[test]
    fn test_format_timestamp_fallbacks() {
        assert_eq!(format_timestamp(None), "N/A");
        assert_eq!(format_timestamp(Some("")), "N/A");
        assert_eq!(format_timestamp(Some("yesterday")), "yesterday");
    }

    #[test]
    fn test_numeric_precision() {
        assert_eq!(format_probability(0.8124), "0.812");
        assert_eq!(format_threshold(0.5), "0.50");
        assert_eq!(format_percentage(Some(87.26), PERCENT_DECIMALS), "87.3%");
        assert_eq!(format_percentage(Some(100.0), 0), "100%");
        assert_eq!(format_percentage(None, PERCENT_DECIMALS), "N/A");
    }

    #[test]
    fn test_model_status_badge() {
        assert_eq!(model_status_badge(Some(ModelStatus::Production)), "🟦");
        assert_eq!(model_status_badge(Some(ModelStatus::ShadowMode)), "🟨");
        assert_eq!(model_status_badge(None), "⬜");
    }

    #[test]
    fn test_submission_option_label_truncates_long_ids() {
        let sub = Submission {
            id: "a1b2c3d4e5f6a7b8c9d0".to_string(),
            created_at: Some("2026-01-20T18:58:00Z".to_string()),
        };
        assert_eq!(submission_option_label(&sub), "a1b2c3d4... - Jan 20, 2026 — 06:58 PM UTC");
    }

    #[test]
    fn test_submission_option_label_short_id_and_bad_time() {
        let sub = Submission {
            id: "abc123".to_string(),
            created_at: Some("not a date".to_string()),
        };
        assert_eq!(submission_option_label(&sub), "abc123 - Unknown time");

        let twelve = Submission { id: "abcdefghijkl".to_string(), created_at: None };
        assert_eq!(submission_option_label(&twelve), "abcdefghijkl - Unknown time");
    }
}
