//! Inference page: pick a recent submission, run inference on it, and inspect
//! or download the per-parameter results.

use axum::{extract::State, response::Response, Form};
use chrono::Local;
use tracing::{info, warn};

use inferscope_common::format::{
    format_percentage, model_status_badge, submission_option_label, PERCENT_DECIMALS,
};
use inferscope_common::normalise::parameter_table;
use inferscope_common::stats::ParameterTally;
use inferscope_common::{AgreementBadge, InferenceResult, ModelStatus, Submission};

use crate::handlers::layout::{
    alert, api_error_alert, csv_data_href, empty_state, esc, href_attr, page_header,
    page_response, render_table, stat_card, AlertKind, Nav,
};
use crate::handlers::require_backend;
use crate::state::SharedState;
use crate::view::{DetailView, InferenceForm, OverviewView};

const TITLE: &str = "Run Inference";

/// GET /inference - submission picker.
pub async fn inference_page(State(state): State<SharedState>) -> Response {
    let health = match require_backend(&state, TITLE, Nav::Inference).await {
        Ok(health) => health,
        Err(page) => return page,
    };
    let recent = state
        .backend
        .recent_submissions_or_empty(state.config.dashboard.recent_limit)
        .await;

    let body = format!(
        "{}{}{}",
        header(),
        picker_html(&recent, None),
        empty_state("Select a submission and click Run Inference to see results."),
    );
    page_response(TITLE, Nav::Inference, &health, state.backend.base_url(), &body)
}

/// POST /inference - run inference on the submitted id and render its results
/// under the picker.
pub async fn inference_run(
    State(state): State<SharedState>,
    Form(form): Form<InferenceForm>,
) -> Response {
    let health = match require_backend(&state, TITLE, Nav::Inference).await {
        Ok(health) => health,
        Err(page) => return page,
    };
    let recent = state
        .backend
        .recent_submissions_or_empty(state.config.dashboard.recent_limit)
        .await;

    let outcome = match form.selected() {
        None => alert(AlertKind::Warning, "Please select a submission"),
        Some(submission_id) => match state.backend.run_inference(submission_id).await {
            Ok(result) => {
                info!(
                    submission_id,
                    total = result.total_parameters,
                    failed = result.failed,
                    "Inference completed"
                );
                format!(
                    "{}{}",
                    alert(AlertKind::Success, "✅ Inference completed successfully!"),
                    results_html(&result),
                )
            }
            Err(e) => {
                warn!(submission_id, error = %e, "Inference failed");
                api_error_alert(&e, None)
            }
        },
    };

    let body = format!("{}{}{}", header(), picker_html(&recent, form.selected()), outcome);
    page_response(TITLE, Nav::Inference, &health, state.backend.base_url(), &body)
}

fn header() -> String {
    page_header(
        "🚀 Run Inference",
        "Select a recent submission and compare model predictions against ground truth",
    )
}

fn picker_html(recent: &[Submission], selected: Option<&str>) -> String {
    let (control, note) = if recent.is_empty() {
        (
            format!(
                r#"<input type="text" name="submission_id" class="form-control" placeholder="Submission ID" value="{}" required>"#,
                esc(selected.unwrap_or("")),
            ),
            alert(
                AlertKind::Warning,
                "⚠️ No recent submissions available. Enter a submission ID directly.",
            ),
        )
    } else {
        let options: String = recent
            .iter()
            .map(|sub| {
                format!(
                    r#"<option value="{}"{}>{}</option>"#,
                    esc(&sub.id),
                    if selected == Some(sub.id.as_str()) { " selected" } else { "" },
                    esc(&submission_option_label(sub)),
                )
            })
            .collect();
        (
            format!(
                r#"<select name="submission_id" class="form-control" required>
                <option value="">-- Select a submission --</option>{}
            </select>"#,
                options
            ),
            format!(
                r#"<p class="text-muted">Showing {} most recent submissions</p>"#,
                recent.len()
            ),
        )
    };

    format!(r#"
    <div class="card">
        <form method="post" action="/inference" class="picker">
            <label class="form-label">Submission</label>
            {}
            <button type="submit" class="btn btn-primary">▶️ Run Inference</button>
            <a href="/inference" class="btn btn-outline">🔄 Refresh</a>
        </form>
        {}
        <p class="text-muted small">Last refreshed: {}</p>
    </div>"#,
        control,
        note,
        Local::now().format("%H:%M:%S"),
    )
}

fn results_html(result: &InferenceResult) -> String {
    let tally = ParameterTally::from_parameters(&result.parameters);

    let summary = format!(
        r#"<div class="stats-grid">{}{}{}{}</div>"#,
        stat_card("Submission ID", &result.submission_id, None),
        stat_card("Total Parameters", &result.total_parameters.to_string(), None),
        stat_card(
            "Successful",
            &result.successful.to_string(),
            Some(&format!("of {}", result.total_parameters)),
        ),
        stat_card("Failed", &result.failed.to_string(), None),
    );

    let outcomes = format!(
        r#"<div class="stats-grid">{}{}{}{}{}</div>"#,
        stat_card(&format!("{} Agreements", AgreementBadge::Agree.symbol()), &tally.agreed.to_string(), None),
        stat_card(&format!("{} Disagreements", AgreementBadge::Disagree.symbol()), &tally.disagreed.to_string(), None),
        stat_card(&format!("{} No Ground Truth", AgreementBadge::NoGroundTruth.symbol()), &tally.no_ground_truth.to_string(), None),
        stat_card(&format!("{} Errors", AgreementBadge::Error.symbol()), &tally.errors.to_string(), None),
        stat_card(
            "Agreement Rate",
            &format_percentage(tally.agreement_rate(), PERCENT_DECIMALS),
            Some(&format!(
                "{} production / {} shadow models",
                tally.production_models, tally.shadow_models
            )),
        ),
    );

    if result.parameters.is_empty() {
        return format!(
            "{}{}{}",
            summary,
            empty_state("No parameter results returned for this submission."),
            links_html(&result.submission_id),
        );
    }

    let table = parameter_table(&result.parameters);
    let download = match table.to_csv() {
        Ok(csv) => {
            let short_id: String = result.submission_id.chars().take(8).collect();
            format!(
                r#"<a href="{}" download="inference_results_{}.csv" class="btn btn-outline">📥 Download CSV</a>"#,
                csv_data_href(&csv),
                esc(&short_id),
            )
        }
        Err(e) => {
            warn!(error = %e, "Could not build CSV for inference results");
            alert(AlertKind::Error, &format!("CSV export unavailable: {}", e))
        }
    };

    let raw_json = serde_json::to_string_pretty(result).unwrap_or_default();

    format!(r#"
    {}
    <h2 class="section-title">📊 Parameter Results</h2>
    {}
    <div class="legend text-muted">{}</div>
    {}
    <div class="d-flex gap-3">{}{}</div>
    <details class="raw-json">
        <summary>View Raw JSON Response</summary>
        <pre>{}</pre>
    </details>"#,
        summary,
        outcomes,
        legend_html(),
        render_table(&table, None),
        download,
        links_html(&result.submission_id),
        esc(&raw_json),
    )
}

fn legend_html() -> String {
    let badges = [
        AgreementBadge::Agree,
        AgreementBadge::Disagree,
        AgreementBadge::NoGroundTruth,
        AgreementBadge::Error,
    ]
    .iter()
    .map(|b| format!("{} {}", b.symbol(), b.as_str()))
    .collect::<Vec<_>>()
    .join(" · ");

    format!(
        "{} | {} production · {} shadow_mode",
        badges,
        model_status_badge(Some(ModelStatus::Production)),
        model_status_badge(Some(ModelStatus::ShadowMode)),
    )
}

fn links_html(submission_id: &str) -> String {
    format!(
        r#"<a href="{}" class="btn btn-outline">🔍 View Detailed Breakdown</a>
    <a href="{}" class="btn btn-outline">📊 Performance Overview</a>"#,
        href_attr(&DetailView::for_submission(submission_id).href()),
        OverviewView::default().href(),
    )
}
