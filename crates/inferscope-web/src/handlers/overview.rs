//! Performance overview: filterable, paginated list of tracked submissions.

use axum::{
    extract::{Query, State},
    response::Response,
};
use chrono::Local;
use tracing::warn;

use inferscope_client::{SortField, SortOrder};
use inferscope_common::format::{format_percentage, PERCENT_DECIMALS};
use inferscope_common::normalise::{filter_by_submission_id, submission_table};
use inferscope_common::stats::OverviewStats;
use inferscope_common::{ApiError, AgreementTier, Pagination, SubmissionPage};

use crate::config::PAGE_SIZES;
use crate::error::WebError;
use crate::handlers::layout::{
    api_error_alert, empty_state, esc, href_attr, page_header, page_response, render_table,
    stat_card, Nav,
};
use crate::handlers::{csv_download, require_backend};
use crate::state::SharedState;
use crate::view::{DatePreset, DetailView, OverviewView};

const TITLE: &str = "Performance Overview";

async fn fetch_page(state: &SharedState, view: &OverviewView) -> Result<SubmissionPage, ApiError> {
    let query = view.submission_query(Local::now().naive_local());
    state.backend.list_tracked_submissions(&query).await
}

/// GET /overview - filters, summary statistics, submissions table and pagination.
pub async fn overview_page(
    State(state): State<SharedState>,
    Query(view): Query<OverviewView>,
) -> Response {
    let health = match require_backend(&state, TITLE, Nav::Overview).await {
        Ok(health) => health,
        Err(page) => return page,
    };
    let view = view.normalized(state.config.dashboard.default_page_size);

    let content = match fetch_page(&state, &view).await {
        Ok(page) => results_html(&view, &page),
        Err(e) => {
            warn!(error = %e, "Failed to load tracked submissions");
            api_error_alert(&e, None)
        }
    };

    let body = format!(
        "{}{}{}",
        page_header(
            "📊 Performance Overview",
            "Agreement between model predictions and ground truth across tracked submissions",
        ),
        filters_html(&view),
        content,
    );
    page_response(TITLE, Nav::Overview, &health, state.backend.base_url(), &body)
}

/// GET /overview/export.csv - the submissions table as shown for the same view.
pub async fn overview_export(
    State(state): State<SharedState>,
    Query(view): Query<OverviewView>,
) -> Result<Response, WebError> {
    let view = view.normalized(state.config.dashboard.default_page_size);
    let page = fetch_page(&state, &view).await?;
    let shown = filter_by_submission_id(&page.submissions, &view.search);
    let csv = submission_table(shown).to_csv()?;
    Ok(csv_download(&format!("submissions_export_{}.csv", view.page), csv))
}

fn results_html(view: &OverviewView, page: &SubmissionPage) -> String {
    let shown = filter_by_submission_id(&page.submissions, &view.search);

    let stats = OverviewStats::from_submissions(shown.iter().copied())
        .map(|s| stats_html(&s))
        .unwrap_or_default();

    let table = if shown.is_empty() {
        empty_state("No submissions found matching the filters.")
    } else {
        let href: &dyn Fn(&str) -> String = &|id| DetailView::for_submission(id).href();
        format!(
            r#"{}
    <div class="d-flex gap-3">
        <a href="{}" class="btn btn-outline">📥 Export to CSV</a>
        <a href="{}" class="btn btn-outline">🔄 Refresh</a>
    </div>"#,
            render_table(&submission_table(shown.iter().copied()), Some(("Submission ID", href))),
            href_attr(&view.export_href()),
            href_attr(&view.href()),
        )
    };

    let pagination = if page.pagination.total_count > 0 {
        pagination_html(view, &page.pagination)
    } else {
        String::new()
    };

    format!(
        r#"{}
    <h2 class="section-title">Submissions ({})</h2>
    {}
    {}"#,
        stats, page.pagination.total_count, table, pagination
    )
}

fn stats_html(stats: &OverviewStats) -> String {
    format!(
        r#"<div class="stats-grid">{}{}{}{}</div>"#,
        stat_card("Total Submissions", &stats.total.to_string(), None),
        stat_card(
            "Avg Agreement",
            &format_percentage(Some(stats.avg_agreement), PERCENT_DECIMALS),
            Some(&format!("{} average on this page", AgreementTier::from_pct(stats.avg_agreement).symbol())),
        ),
        stat_card(
            "High Performers",
            &stats.high_performers.to_string(),
            Some(&format!(
                "{} of submissions ≥ {:.0}%",
                format_percentage(Some(stats.high_performer_share()), 0),
                AgreementTier::HIGH_THRESHOLD,
            )),
        ),
        stat_card("Agreement Range", &stats.range_label(), None),
    )
}

fn filters_html(view: &OverviewView) -> String {
    let ranges: String = DatePreset::ALL
        .iter()
        .map(|r| option(r.as_str(), r.label(), *r == view.range))
        .collect();
    let sort_fields: String = SortField::ALL
        .iter()
        .map(|f| option(f.as_str(), f.label(), *f == view.sort_by))
        .collect();
    let sort_orders: String = [SortOrder::Desc, SortOrder::Asc]
        .iter()
        .map(|o| option(o.as_str(), o.label(), *o == view.sort_order))
        .collect();

    let date_value = |d: Option<chrono::NaiveDate>| d.map(|d| d.to_string()).unwrap_or_default();
    let min_agreement = view.min_agreement.map(|v| v.to_string()).unwrap_or_default();

    format!(r#"
    <form method="get" action="/overview" class="card filters">
        <div class="filter-row">
            <label>Date Range
                <select name="range" class="form-control">{}</select>
            </label>
            <label>From (custom)
                <input type="date" name="start" class="form-control" value="{}">
            </label>
            <label>To (custom)
                <input type="date" name="end" class="form-control" value="{}">
            </label>
            <label>Min Agreement %
                <input type="number" name="min_agreement" class="form-control" min="0" max="100" step="5" value="{}" placeholder="Any">
            </label>
        </div>
        <div class="filter-row">
            <label>Search Submission ID
                <input type="text" name="search" class="form-control" value="{}" placeholder="Enter submission ID...">
            </label>
            <label>Sort By
                <select name="sort_by" class="form-control">{}</select>
            </label>
            <label>Order
                <select name="sort_order" class="form-control">{}</select>
            </label>
            <input type="hidden" name="page_size" value="{}">
        </div>
        <div class="d-flex gap-3">
            <button type="submit" class="btn btn-primary">Apply Filters</button>
            <a href="{}" class="btn btn-outline">Reset</a>
        </div>
    </form>"#,
        ranges,
        date_value(view.start),
        date_value(view.end),
        esc(&min_agreement),
        esc(&view.search),
        sort_fields,
        sort_orders,
        view.page_size(),
        href_attr(&view.reset().href()),
    )
}

fn option(value: &str, label: &str, selected: bool) -> String {
    format!(
        r#"<option value="{}"{}>{}</option>"#,
        value,
        if selected { " selected" } else { "" },
        esc(label),
    )
}

fn pagination_html(view: &OverviewView, pagination: &Pagination) -> String {
    let prev = if pagination.has_prev {
        format!(
            r#"<a href="{}" class="btn btn-outline">← Previous</a>"#,
            href_attr(&view.goto_page(pagination.current_page.saturating_sub(1)).href()),
        )
    } else {
        r#"<span class="btn btn-outline disabled">← Previous</span>"#.to_string()
    };
    let next = if pagination.has_next {
        format!(
            r#"<a href="{}" class="btn btn-outline">Next →</a>"#,
            href_attr(&view.goto_page(pagination.current_page.saturating_add(1)).href()),
        )
    } else {
        r#"<span class="btn btn-outline disabled">Next →</span>"#.to_string()
    };

    let sizes: String = PAGE_SIZES
        .iter()
        .map(|&size| {
            if size == view.page_size() {
                format!(r#"<span class="page-size current">{}</span>"#, size)
            } else {
                format!(
                    r#"<a href="{}" class="page-size">{}</a>"#,
                    href_attr(&view.with_page_size(size).href()),
                    size
                )
            }
        })
        .collect();

    format!(r#"
    <div class="pagination">
        {}
        <span class="page-info">Page {} of {}</span>
        {}
        <span class="page-sizes text-muted">Per page: {}</span>
    </div>"#,
        prev,
        pagination.current_page,
        pagination.total_pages.max(1),
        next,
        sizes,
    )
}
