//! Submission detail: summary, production vs shadow breakdown, and the
//! parameter table with an all / disagreements-only switch.

use axum::{
    extract::{Path, Query, State},
    response::Response,
};
use tracing::warn;

use inferscope_common::format::{
    format_percentage, format_timestamp, model_status_badge, MISSING, PERCENT_DECIMALS,
};
use inferscope_common::models::{StatusBreakdown, StatusStats};
use inferscope_common::normalise::{disagreements, parameter_table};
use inferscope_common::stats::{ParameterTally, StatusComparison};
use inferscope_common::{AgreementTier, ModelStatus, SubmissionDetail};

use crate::error::WebError;
use crate::handlers::layout::{
    alert, api_error_alert, empty_state, esc, href_attr, page_header, page_response,
    render_table, stat_card, AlertKind, Nav,
};
use crate::handlers::{csv_download, require_backend};
use crate::state::SharedState;
use crate::view::{detail_export_href, DetailTab, DetailView, OverviewView};

const TITLE: &str = "Submission Detail";

const NOT_FOUND_HINT: &str = r#"This submission may not have been tracked yet. <a href="/inference">Run inference on this submission first</a>, then come back."#;

/// GET /detail - detail view for `submission_id`, or just the lookup form.
pub async fn detail_page(
    State(state): State<SharedState>,
    Query(view): Query<DetailView>,
) -> Response {
    let health = match require_backend(&state, TITLE, Nav::Detail).await {
        Ok(health) => health,
        Err(page) => return page,
    };

    let content = match view.submission_id.as_deref() {
        None => format!(
            r#"{}<p><a href="{}" class="btn btn-outline">📊 Browse the Performance Overview</a></p>"#,
            alert(
                AlertKind::Info,
                "Enter a submission ID above, or pick one from the Performance Overview.",
            ),
            OverviewView::default().href(),
        ),
        Some(submission_id) => match state.backend.get_submission_detail(submission_id).await {
            Ok(detail) => detail_html(&view, &detail),
            Err(e) => {
                warn!(submission_id, error = %e, "Failed to load submission detail");
                api_error_alert(&e, Some(NOT_FOUND_HINT))
            }
        },
    };

    let body = format!(
        "{}{}{}",
        page_header("🔍 Submission Detail", "Per-parameter breakdown for one tracked submission"),
        lookup_form(&view),
        content,
    );
    page_response(TITLE, Nav::Detail, &health, state.backend.base_url(), &body)
}

/// GET /detail/{submission_id}/export.csv - the full parameter table.
pub async fn detail_export(
    State(state): State<SharedState>,
    Path(submission_id): Path<String>,
) -> Result<Response, WebError> {
    let detail = state.backend.get_submission_detail(&submission_id).await?;
    let csv = parameter_table(&detail.parameters).to_csv()?;
    Ok(csv_download(&format!("{}_detail.csv", submission_id), csv))
}

fn lookup_form(view: &DetailView) -> String {
    format!(r#"
    <form method="get" action="/detail" class="card picker">
        <label class="form-label">Submission ID</label>
        <input type="text" name="submission_id" class="form-control" value="{}" placeholder="Enter submission ID..." required>
        <button type="submit" class="btn btn-primary">Load</button>
    </form>"#,
        esc(view.submission_id.as_deref().unwrap_or("")),
    )
}

fn detail_html(view: &DetailView, detail: &SubmissionDetail) -> String {
    let tier = AgreementTier::from_pct(detail.overall_agreement_pct);

    let summary = format!(
        r#"<div class="stats-grid">{}{}{}{}{}</div>"#,
        stat_card("Submission ID", &detail.submission_id, None),
        stat_card(
            "Overall Agreement",
            &format!(
                "{} {}",
                tier.symbol(),
                format_percentage(Some(detail.overall_agreement_pct), PERCENT_DECIMALS)
            ),
            None,
        ),
        stat_card(
            "Correct Predictions",
            &format!("{}/{}", detail.correct_predictions, detail.total_parameters),
            None,
        ),
        stat_card("Run Count", &format!("#{}", detail.run_count), None),
        stat_card("Last Updated", &format_timestamp(detail.updated_at()), None),
    );

    let mut meta = vec![format!("First run: {}", esc(&format_timestamp(detail.created_at.as_deref())))];
    if let Some(user) = &detail.user_id {
        meta.push(format!("User: {}", esc(user)));
    }
    if let Some(lab) = &detail.lab_name {
        meta.push(format!("Lab: {}", esc(lab)));
    }
    let meta = format!(r#"<p class="text-muted">{}</p>"#, meta.join(" · "));

    let breakdown = detail
        .statistics
        .as_ref()
        .and_then(|s| s.by_status.as_ref())
        .map(breakdown_html)
        .unwrap_or_default();

    let tabs: String = [DetailTab::All, DetailTab::Disagreements]
        .iter()
        .map(|tab| {
            format!(
                r#"<a href="{}" class="tab{}">{}</a>"#,
                href_attr(&view.with_tab(*tab).href()),
                if *tab == view.tab { " active" } else { "" },
                tab.label(),
            )
        })
        .collect();

    let tab_content = match view.tab {
        DetailTab::All => all_parameters_html(detail),
        DetailTab::Disagreements => disagreements_html(detail),
    };

    format!(r#"
    {}
    {}
    {}
    <div class="tabs">{}</div>
    {}
    <div class="d-flex gap-3">
        <a href="{}" class="btn btn-outline">← Back to Overview</a>
        <a href="/inference" class="btn btn-outline">🚀 Run New Inference</a>
        <a href="{}" class="btn btn-outline">📥 Export CSV</a>
    </div>"#,
        summary,
        meta,
        breakdown,
        tabs,
        tab_content,
        OverviewView::default().href(),
        href_attr(&detail_export_href(&detail.submission_id)),
    )
}

fn status_card(status: ModelStatus, stats: Option<&StatusStats>) -> String {
    let label = format!("{} {}", model_status_badge(Some(status)), status.as_str());
    match stats {
        Some(s) if s.total > 0 => stat_card(
            &label,
            &format_percentage(Some(s.agreement_pct), PERCENT_DECIMALS),
            Some(&format!("{}/{} correct", s.correct, s.total)),
        ),
        _ => stat_card(&label, MISSING, Some("no models")),
    }
}

fn breakdown_html(breakdown: &StatusBreakdown) -> String {
    let verdict = StatusComparison::from_breakdown(breakdown)
        .map(|c| alert(AlertKind::Info, &c.message()))
        .unwrap_or_default();

    format!(r#"
    <h2 class="section-title">Production vs Shadow</h2>
    <div class="stats-grid">{}{}</div>
    {}"#,
        status_card(ModelStatus::Production, breakdown.production.as_ref()),
        status_card(ModelStatus::ShadowMode, breakdown.shadow_mode.as_ref()),
        verdict,
    )
}

fn all_parameters_html(detail: &SubmissionDetail) -> String {
    if detail.parameters.is_empty() {
        return empty_state("No parameters recorded for this submission.");
    }
    let tally = ParameterTally::from_parameters(&detail.parameters);
    format!(
        r#"<div class="stats-grid">{}{}{}{}{}</div>{}"#,
        stat_card("Agreed", &tally.agreed.to_string(), None),
        stat_card("Disagreed", &tally.disagreed.to_string(), None),
        stat_card("No Ground Truth", &tally.no_ground_truth.to_string(), None),
        stat_card("Errors", &tally.errors.to_string(), None),
        stat_card(
            "Agreement Rate",
            &format_percentage(tally.agreement_rate(), PERCENT_DECIMALS),
            None,
        ),
        render_table(&parameter_table(&detail.parameters), None),
    )
}

fn disagreements_html(detail: &SubmissionDetail) -> String {
    let disagreed = disagreements(&detail.parameters);
    if disagreed.is_empty() {
        return alert(
            AlertKind::Success,
            "🎉 No disagreements! Every prediction with a ground truth matches it.",
        );
    }
    format!(
        r#"<p class="text-muted">{} parameter(s) disagree with ground truth</p>{}"#,
        disagreed.len(),
        render_table(&parameter_table(disagreed), None),
    )
}
