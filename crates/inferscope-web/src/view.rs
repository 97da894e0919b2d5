//! Per-page view state.
//!
//! Everything a page needs to re-render lives in its query string. Handlers
//! parse it into one of these values, and every link or form on the page is
//! built from a transition (`goto_page`, `with_page_size`, `reset`, ...) on
//! the current value. Nothing is kept between requests.

use std::fmt::Display;
use std::str::FromStr;

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use serde::{de, Deserialize, Deserializer};
use url::form_urlencoded;

use inferscope_client::{SortField, SortOrder, SubmissionQuery};

use crate::config::PAGE_SIZES;

/// Timestamp format the tracking API expects for date filters.
pub const API_DATETIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

const FALLBACK_PAGE_SIZE: u32 = 50;
const CUSTOM_RANGE_DEFAULT_DAYS: i64 = 7;

/// Blank form fields arrive as `field=`; treat them as absent.
fn empty_as_none<'de, D, T>(deserializer: D) -> Result<Option<T>, D::Error>
where
    D: Deserializer<'de>,
    T: FromStr,
    T::Err: Display,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    match raw.as_deref().map(str::trim) {
        None | Some("") => Ok(None),
        Some(s) => s.parse().map(Some).map_err(de::Error::custom),
    }
}

// ---------------------------------------------------------------------------
// Date range presets
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
pub enum DatePreset {
    #[default]
    #[serde(rename = "all")]
    AllTime,
    #[serde(rename = "today")]
    Today,
    #[serde(rename = "7d")]
    Last7Days,
    #[serde(rename = "30d")]
    Last30Days,
    #[serde(rename = "custom")]
    CustomRange,
}

impl DatePreset {
    pub const ALL: [DatePreset; 5] = [
        DatePreset::AllTime,
        DatePreset::Today,
        DatePreset::Last7Days,
        DatePreset::Last30Days,
        DatePreset::CustomRange,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            DatePreset::AllTime     => "all",
            DatePreset::Today       => "today",
            DatePreset::Last7Days   => "7d",
            DatePreset::Last30Days  => "30d",
            DatePreset::CustomRange => "custom",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DatePreset::AllTime     => "All Time",
            DatePreset::Today       => "Today",
            DatePreset::Last7Days   => "Last 7 Days",
            DatePreset::Last30Days  => "Last 30 Days",
            DatePreset::CustomRange => "Custom Range",
        }
    }

    /// Resolve to an inclusive `(start, end)` window relative to `now`.
    /// A custom range with a missing bound falls back to the last seven days.
    pub fn resolve(
        self,
        now: NaiveDateTime,
        custom_start: Option<NaiveDate>,
        custom_end: Option<NaiveDate>,
    ) -> (Option<NaiveDateTime>, Option<NaiveDateTime>) {
        let today = now.date();
        match self {
            DatePreset::AllTime     => (None, None),
            DatePreset::Today       => (Some(start_of_day(today)), Some(end_of_day(today))),
            DatePreset::Last7Days   => (Some(now - Duration::days(7)), Some(now)),
            DatePreset::Last30Days  => (Some(now - Duration::days(30)), Some(now)),
            DatePreset::CustomRange => {
                let start = custom_start.unwrap_or(today - Duration::days(CUSTOM_RANGE_DEFAULT_DAYS));
                let end = custom_end.unwrap_or(today);
                (Some(start_of_day(start)), Some(end_of_day(end)))
            }
        }
    }
}

fn start_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

// Built from the time of day so the latest representable date cannot overflow.
fn end_of_day(date: NaiveDate) -> NaiveDateTime {
    date.and_hms_opt(23, 59, 59)
        .unwrap_or_else(|| start_of_day(date))
}

// ---------------------------------------------------------------------------
// Overview
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct OverviewView {
    pub page: u32,
    #[serde(deserialize_with = "empty_as_none")]
    pub page_size: Option<u32>,
    pub range: DatePreset,
    #[serde(deserialize_with = "empty_as_none")]
    pub start: Option<NaiveDate>,
    #[serde(deserialize_with = "empty_as_none")]
    pub end: Option<NaiveDate>,
    #[serde(deserialize_with = "empty_as_none")]
    pub min_agreement: Option<f64>,
    pub search: String,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for OverviewView {
    fn default() -> Self {
        Self {
            page: 1,
            page_size: None,
            range: DatePreset::default(),
            start: None,
            end: None,
            min_agreement: None,
            search: String::new(),
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}

impl OverviewView {
    /// Clamp whatever arrived in the query string into a usable state.
    pub fn normalized(mut self, default_page_size: u32) -> Self {
        self.page = self.page.max(1);
        self.page_size = Some(
            self.page_size
                .filter(|size| PAGE_SIZES.contains(size))
                .unwrap_or(default_page_size),
        );
        self.min_agreement = self.min_agreement
            .filter(|v| v.is_finite())
            .map(|v| v.clamp(0.0, 100.0));
        self.search = self.search.trim().to_string();
        self
    }

    pub fn page_size(&self) -> u32 {
        self.page_size.unwrap_or(FALLBACK_PAGE_SIZE)
    }

    pub fn offset(&self) -> u32 {
        self.page.saturating_sub(1).saturating_mul(self.page_size())
    }

    pub fn goto_page(&self, page: u32) -> Self {
        Self { page: page.max(1), ..self.clone() }
    }

    /// Changing the page size always starts again from the first page.
    pub fn with_page_size(&self, page_size: u32) -> Self {
        Self { page: 1, page_size: Some(page_size), ..self.clone() }
    }

    /// Clear every filter and go back to page one; the page size is kept.
    pub fn reset(&self) -> Self {
        Self { page_size: self.page_size, ..Self::default() }
    }

    pub fn submission_query(&self, now: NaiveDateTime) -> SubmissionQuery {
        let (start, end) = self.range.resolve(now, self.start, self.end);
        SubmissionQuery {
            limit: self.page_size(),
            offset: self.offset(),
            min_agreement: self.min_agreement,
            start_date: start.map(|t| t.format(API_DATETIME_FORMAT).to_string()),
            end_date: end.map(|t| t.format(API_DATETIME_FORMAT).to_string()),
            sort_by: self.sort_by,
            sort_order: self.sort_order,
        }
    }

    /// Query string holding only the fields that differ from the defaults.
    pub fn to_query_string(&self) -> String {
        let mut qs = form_urlencoded::Serializer::new(String::new());
        if self.page > 1 {
            qs.append_pair("page", &self.page.to_string());
        }
        if let Some(size) = self.page_size {
            qs.append_pair("page_size", &size.to_string());
        }
        if self.range != DatePreset::AllTime {
            qs.append_pair("range", self.range.as_str());
        }
        if self.range == DatePreset::CustomRange {
            if let Some(start) = self.start {
                qs.append_pair("start", &start.to_string());
            }
            if let Some(end) = self.end {
                qs.append_pair("end", &end.to_string());
            }
        }
        if let Some(min) = self.min_agreement {
            qs.append_pair("min_agreement", &min.to_string());
        }
        if !self.search.is_empty() {
            qs.append_pair("search", &self.search);
        }
        if self.sort_by != SortField::default() {
            qs.append_pair("sort_by", self.sort_by.as_str());
        }
        if self.sort_order != SortOrder::default() {
            qs.append_pair("sort_order", self.sort_order.as_str());
        }
        qs.finish()
    }

    pub fn href(&self) -> String {
        with_query("/overview", &self.to_query_string())
    }

    pub fn export_href(&self) -> String {
        with_query("/overview/export.csv", &self.to_query_string())
    }
}

// ---------------------------------------------------------------------------
// Detail
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailTab {
    #[default]
    All,
    Disagreements,
}

impl DetailTab {
    pub fn as_str(&self) -> &'static str {
        match self {
            DetailTab::All           => "all",
            DetailTab::Disagreements => "disagreements",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            DetailTab::All           => "All Parameters",
            DetailTab::Disagreements => "Disagreements Only",
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct DetailView {
    #[serde(deserialize_with = "empty_as_none")]
    pub submission_id: Option<String>,
    pub tab: DetailTab,
}

impl DetailView {
    pub fn for_submission(submission_id: &str) -> Self {
        Self { submission_id: Some(submission_id.to_string()), tab: DetailTab::All }
    }

    pub fn with_tab(&self, tab: DetailTab) -> Self {
        Self { tab, ..self.clone() }
    }

    pub fn href(&self) -> String {
        let mut qs = form_urlencoded::Serializer::new(String::new());
        if let Some(id) = &self.submission_id {
            qs.append_pair("submission_id", id);
        }
        if self.tab != DetailTab::All {
            qs.append_pair("tab", self.tab.as_str());
        }
        with_query("/detail", &qs.finish())
    }
}

/// Path of the CSV export for one submission's parameter table.
pub fn detail_export_href(submission_id: &str) -> String {
    let encoded: String = form_urlencoded::byte_serialize(submission_id.as_bytes()).collect();
    // form encoding writes spaces as '+', which a path segment would keep literally
    format!("/detail/{}/export.csv", encoded.replace('+', "%20"))
}

// ---------------------------------------------------------------------------
// Inference
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, Deserialize)]
pub struct InferenceForm {
    #[serde(default)]
    pub submission_id: String,
}

impl InferenceForm {
    /// The selected id, or `None` when nothing was picked.
    pub fn selected(&self) -> Option<&str> {
        Some(self.submission_id.trim()).filter(|id| !id.is_empty())
    }
}

fn with_query(path: &str, query: &str) -> String {
    if query.is_empty() {
        path.to_string()
    } else {
        format!("{}?{}", path, query)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::extract::Query;
    use axum::http::Uri;

    fn now() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2026, 1, 20)
            .unwrap()
            .and_hms_opt(16, 8, 59)
            .unwrap()
    }

    fn parse(uri: &str) -> OverviewView {
        let uri: Uri = uri.parse().unwrap();
        Query::<OverviewView>::try_from_uri(&uri).unwrap().0
    }

    #[test]
    fn test_preset_resolution() {
        let fmt = |t: Option<NaiveDateTime>| t.map(|t| t.format(API_DATETIME_FORMAT).to_string());

        assert_eq!(DatePreset::AllTime.resolve(now(), None, None), (None, None));

        let (s, e) = DatePreset::Today.resolve(now(), None, None);
        assert_eq!(fmt(s).as_deref(), Some("2026-01-20T00:00:00"));
        assert_eq!(fmt(e).as_deref(), Some("2026-01-20T23:59:59"));

        let (s, e) = DatePreset::Last7Days.resolve(now(), None, None);
        assert_eq!(fmt(s).as_deref(), Some("2026-01-13T16:08:59"));
        assert_eq!(fmt(e).as_deref(), Some("2026-01-20T16:08:59"));

        let (s, _) = DatePreset::Last30Days.resolve(now(), None, None);
        assert_eq!(fmt(s).as_deref(), Some("2025-12-21T16:08:59"));
    }

    #[test]
    fn test_custom_range_bounds_and_fallback() {
        let start = NaiveDate::from_ymd_opt(2026, 1, 1);
        let end = NaiveDate::from_ymd_opt(2026, 1, 5);
        let (s, e) = DatePreset::CustomRange.resolve(now(), start, end);
        assert_eq!(s.unwrap().to_string(), "2026-01-01 00:00:00");
        assert_eq!(e.unwrap().to_string(), "2026-01-05 23:59:59");

        let (s, e) = DatePreset::CustomRange.resolve(now(), None, None);
        assert_eq!(s.unwrap().to_string(), "2026-01-13 00:00:00");
        assert_eq!(e.unwrap().to_string(), "2026-01-20 23:59:59");
    }

    #[test]
    fn test_extreme_custom_dates_resolve_without_overflow() {
        let view = parse("/overview?range=custom&start=2026-01-01&end=%2B262142-12-31").normalized(50);
        assert_eq!(view.end, NaiveDate::from_ymd_opt(262142, 12, 31));

        let query = view.submission_query(now());
        assert_eq!(query.start_date.as_deref(), Some("2026-01-01T00:00:00"));
        assert_eq!(query.end_date.as_deref(), Some("+262142-12-31T23:59:59"));

        let (_, e) = DatePreset::CustomRange.resolve(now(), None, Some(NaiveDate::MAX));
        assert_eq!(e, NaiveDate::MAX.and_hms_opt(23, 59, 59));
    }

    #[test]
    fn test_offset_follows_page_and_size() {
        let view = OverviewView::default().normalized(50);
        assert_eq!(view.offset(), 0);
        assert_eq!(view.goto_page(3).offset(), 100);
        assert_eq!(view.with_page_size(25).goto_page(3).offset(), 50);
    }

    #[test]
    fn test_changing_page_size_resets_to_first_page() {
        let view = OverviewView::default().normalized(50).goto_page(4);
        let resized = view.with_page_size(10);
        assert_eq!(resized.page, 1);
        assert_eq!(resized.page_size(), 10);
    }

    #[test]
    fn test_reset_clears_filters_but_keeps_page_size() {
        let view = OverviewView {
            page: 3,
            page_size: Some(25),
            range: DatePreset::Today,
            min_agreement: Some(70.0),
            search: "abc".into(),
            sort_by: SortField::Agreement,
            ..OverviewView::default()
        };
        let reset = view.reset();
        assert_eq!(reset, OverviewView { page_size: Some(25), ..OverviewView::default() });
    }

    #[test]
    fn test_normalized_rejects_unsupported_values() {
        let view = OverviewView {
            page: 0,
            page_size: Some(37),
            min_agreement: Some(140.0),
            search: "  ab  ".into(),
            ..OverviewView::default()
        }
        .normalized(25);

        assert_eq!(view.page, 1);
        assert_eq!(view.page_size(), 25);
        assert_eq!(view.min_agreement, Some(100.0));
        assert_eq!(view.search, "ab");
    }

    #[test]
    fn test_href_parses_back_to_same_view() {
        let view = OverviewView {
            page: 2,
            page_size: Some(10),
            range: DatePreset::CustomRange,
            start: NaiveDate::from_ymd_opt(2026, 1, 1),
            end: NaiveDate::from_ymd_opt(2026, 1, 5),
            min_agreement: Some(62.5),
            search: "a&b c".into(),
            sort_by: SortField::SubmissionId,
            sort_order: SortOrder::Asc,
        };
        assert_eq!(parse(&view.href()), view);
    }

    #[test]
    fn test_default_view_has_bare_href() {
        assert_eq!(OverviewView::default().href(), "/overview");
    }

    #[test]
    fn test_blank_form_fields_are_absent() {
        let view = parse("/overview?range=all&start=&end=&min_agreement=&search=&page_size=");
        assert_eq!(view, OverviewView::default());
    }

    #[test]
    fn test_submission_query_mapping() {
        let view = OverviewView {
            page: 2,
            range: DatePreset::Last7Days,
            min_agreement: Some(80.0),
            sort_by: SortField::Agreement,
            ..OverviewView::default()
        }
        .normalized(25);

        let query = view.submission_query(now());
        assert_eq!(query.limit, 25);
        assert_eq!(query.offset, 25);
        assert_eq!(query.min_agreement, Some(80.0));
        assert_eq!(query.start_date.as_deref(), Some("2026-01-13T16:08:59"));
        assert_eq!(query.end_date.as_deref(), Some("2026-01-20T16:08:59"));
        assert_eq!(query.sort_by, SortField::Agreement);
        assert_eq!(query.sort_order, SortOrder::Desc);
    }

    #[test]
    fn test_detail_href() {
        let view = DetailView::for_submission("abc 123");
        assert_eq!(view.href(), "/detail?submission_id=abc+123");
        assert_eq!(
            view.with_tab(DetailTab::Disagreements).href(),
            "/detail?submission_id=abc+123&tab=disagreements"
        );
        assert_eq!(DetailView::default().href(), "/detail");
        assert_eq!(detail_export_href("abc 1/2"), "/detail/abc%201%2F2/export.csv");
    }

    #[test]
    fn test_inference_form_selection() {
        assert_eq!(InferenceForm { submission_id: "  ".into() }.selected(), None);
        assert_eq!(InferenceForm { submission_id: " abc ".into() }.selected(), Some("abc"));
    }
}
