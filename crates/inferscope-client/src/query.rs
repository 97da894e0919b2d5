//! Query parameters for the tracked-submissions listing.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SortField {
    #[default]
    Timestamp,
    Agreement,
    SubmissionId,
}

impl SortField {
    pub const ALL: [SortField; 3] = [SortField::Timestamp, SortField::Agreement, SortField::SubmissionId];

    pub fn as_str(&self) -> &'static str {
        match self {
            SortField::Timestamp    => "timestamp",
            SortField::Agreement    => "agreement",
            SortField::SubmissionId => "submission_id",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortField::Timestamp    => "Date/Time",
            SortField::Agreement    => "Agreement %",
            SortField::SubmissionId => "Submission ID",
        }
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

impl SortOrder {
    pub fn as_str(&self) -> &'static str {
        match self {
            SortOrder::Asc  => "asc",
            SortOrder::Desc => "desc",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            SortOrder::Asc  => "Oldest First",
            SortOrder::Desc => "Newest First",
        }
    }
}

/// Filtering, sorting and paging are all done server-side; this is a plain
/// mapping onto the query string. Unset filters are omitted entirely.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SubmissionQuery {
    pub limit: u32,
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_agreement: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    pub sort_by: SortField,
    pub sort_order: SortOrder,
}

impl Default for SubmissionQuery {
    fn default() -> Self {
        Self {
            limit: 50,
            offset: 0,
            min_agreement: None,
            start_date: None,
            end_date: None,
            sort_by: SortField::default(),
            sort_order: SortOrder::default(),
        }
    }
}
