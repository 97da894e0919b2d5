//! Page shell and the small HTML building blocks every page shares.

use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use minijinja::HtmlEscape;

use inferscope_common::{ApiError, HealthReport, Table};

/// Navigation HTML template shared across all pages
pub const NAV_HTML: &str = include_str!("../../templates/nav.html");

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Inference,
    Overview,
    Detail,
}

impl Nav {
    pub fn path(&self) -> &'static str {
        match self {
            Nav::Inference => "/inference",
            Nav::Overview  => "/overview",
            Nav::Detail    => "/detail",
        }
    }
}

/// HTML-escape text that came from the backend or the query string.
pub fn esc(text: &str) -> String {
    HtmlEscape(text).to_string()
}

/// Attribute form of a link built by the view state. Those are already
/// percent-encoded, so only the `&` separators need escaping.
pub fn href_attr(href: &str) -> String {
    href.replace('&', "&amp;")
}

fn health_html(health: &HealthReport) -> String {
    if !health.is_healthy() {
        return format!(
            r#"<div class="status status-error">❌ Disconnected</div>
        <div class="status-line text-muted">{}</div>"#,
            esc(health.error.as_deref().unwrap_or("Health check failed")),
        );
    }

    let mut html = String::from(r#"<div class="status status-ok">✅ Connected</div>"#);
    if let Some(components) = &health.components {
        if components.models.is_some() {
            let (loaded, total) = health.model_counts();
            html.push_str(&format!(
                r#"<div class="status-line">Models loaded: <strong>{}/{}</strong></div>"#,
                loaded, total
            ));
        }
        if let Some(db) = &components.database {
            html.push_str(&format!(
                r#"<div class="status-line">Database: {} {}</div>"#,
                if health.database_ok() { "✅" } else { "❌" },
                esc(&db.status),
            ));
        }
    }
    html
}

pub fn nav_html(active: Nav, health: &HealthReport, backend_url: &str) -> String {
    let mark = |nav: Nav| if nav == active { "active" } else { "" };
    NAV_HTML
        .replace("{{inference}}", mark(Nav::Inference))
        .replace("{{overview}}", mark(Nav::Overview))
        .replace("{{detail}}", mark(Nav::Detail))
        .replace("{{backend}}", &esc(backend_url))
        .replace("{{health}}", &health_html(health))
}

/// Wrap page content in the document shell with the sidebar.
pub fn render_page(
    title: &str,
    active: Nav,
    health: &HealthReport,
    backend_url: &str,
    body: &str,
) -> String {
    format!(r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1">
    <title>{} — Inferscope</title>
    <link rel="stylesheet" href="/static/css/main.css?v=0.1.0">
</head>
<body>
<div class="app-container">
{}
<main class="main-content">
{}
</main>
</div>
</body>
</html>"#, esc(title), nav_html(active, health, backend_url), body)
}

pub fn page_response(
    title: &str,
    active: Nav,
    health: &HealthReport,
    backend_url: &str,
    body: &str,
) -> Response {
    Html(render_page(title, active, health, backend_url, body)).into_response()
}

/// Blocking banner shown instead of any page content while the backend is unhealthy.
pub fn disconnected_response(
    title: &str,
    active: Nav,
    health: &HealthReport,
    backend_url: &str,
) -> Response {
    let body = format!(r#"
    <div class="banner banner-error">
        <h2>🔌 API Disconnected</h2>
        <p>Cannot reach the inference API at <code>{}</code>.</p>
        <p class="text-muted">{}</p>
        <a href="{}" class="btn btn-primary">Retry</a>
    </div>"#,
        esc(backend_url),
        esc(health.error.as_deref().unwrap_or("The health check did not report a healthy service.")),
        active.path(),
    );
    (
        StatusCode::SERVICE_UNAVAILABLE,
        Html(render_page(title, active, health, backend_url, &body)),
    )
        .into_response()
}

pub fn page_header(title: &str, subtitle: &str) -> String {
    format!(r#"
    <div class="page-header">
        <div>
            <h1 class="page-title">{}</h1>
            <p class="text-muted">{}</p>
        </div>
    </div>"#, title, subtitle)
}

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Success,
    Info,
    Warning,
    Error,
}

impl AlertKind {
    fn css_class(&self) -> &'static str {
        match self {
            AlertKind::Success => "alert-success",
            AlertKind::Info    => "alert-info",
            AlertKind::Warning => "alert-warning",
            AlertKind::Error   => "alert-error",
        }
    }
}

/// Dismissible message. `<dialog>` closes itself through its form, no script needed.
pub fn alert(kind: AlertKind, message: &str) -> String {
    format!(r#"
    <dialog open class="alert {}" role="alert">
        <form method="dialog" class="alert-body">
            <span>{}</span>
            <button type="submit" class="alert-close" aria-label="Dismiss">×</button>
        </form>
    </dialog>"#, kind.css_class(), esc(message))
}

/// Error banner for a failed data call, plus an actionable hint when the resource is missing.
pub fn api_error_alert(err: &ApiError, not_found_hint: Option<&str>) -> String {
    let mut html = alert(AlertKind::Error, &format!("❌ {}", err));
    if let (true, Some(hint)) = (err.is_not_found(), not_found_hint) {
        html.push_str(&format!(r#"<div class="hint">💡 {}</div>"#, hint));
    }
    html
}

pub fn empty_state(message: &str) -> String {
    format!(r#"<div class="empty-state text-muted">{}</div>"#, esc(message))
}

pub fn stat_card(label: &str, value: &str, sub: Option<&str>) -> String {
    format!(r#"
        <div class="stat-card">
            <div class="stat-value">{}</div>
            <div class="stat-label">{}</div>{}
        </div>"#,
        esc(value),
        esc(label),
        sub.map(|s| format!(r#"<div class="stat-sub text-muted">{}</div>"#, esc(s)))
            .unwrap_or_default(),
    )
}

// ---------------------------------------------------------------------------
// Tables and downloads
// ---------------------------------------------------------------------------

/// Drill-down link for one column: `(header, href builder fed with the row key)`.
pub type KeyLink<'a> = (&'a str, &'a dyn Fn(&str) -> String);

/// Render a `Table`. Cell text is exactly what the CSV export writes; the first
/// column is shown as a badge toned by the row state.
pub fn render_table(table: &Table, link: Option<KeyLink<'_>>) -> String {
    let link_col = link.and_then(|(header, _)| table.column(header));

    let head: String = table
        .headers
        .iter()
        .map(|h| format!("<th>{}</th>", esc(h)))
        .collect();

    let body: String = table
        .rows
        .iter()
        .map(|row| {
            let cells: String = row
                .cells
                .iter()
                .enumerate()
                .map(|(i, cell)| {
                    let text = esc(cell);
                    if i == 0 {
                        return format!(r#"<td><span class="badge {}">{}</span></td>"#, row.tone, text);
                    }
                    match (link_col, link, row.key.as_deref()) {
                        (Some(col), Some((_, href)), Some(key)) if col == i => {
                            format!(r#"<td><a href="{}">{}</a></td>"#, href_attr(&href(key)), text)
                        }
                        _ => format!("<td>{}</td>", text),
                    }
                })
                .collect();
            format!(r#"<tr class="{}">{}</tr>"#, row.tone, cells)
        })
        .collect();

    format!(r#"
    <div class="table-container">
        <table class="table">
            <thead><tr>{}</tr></thead>
            <tbody>{}</tbody>
        </table>
    </div>"#, head, body)
}

/// `data:` URI carrying a CSV body, for downloads that must not re-run the request.
pub fn csv_data_href(csv: &str) -> String {
    format!("data:text/csv;charset=utf-8;base64,{}", BASE64.encode(csv.as_bytes()))
}

/// Keep a file name safe for a `Content-Disposition` header.
pub fn safe_file_name(name: &str) -> String {
    name.chars()
        .map(|c| if c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-') { c } else { '_' })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use inferscope_common::Row;
    use crate::view::DetailView;

    #[test]
    fn test_escape() {
        assert_eq!(esc("<b>&\"x\""), "&lt;b&gt;&amp;&quot;x&quot;");
        assert_eq!(href_attr("/overview?page=2&search=a%26b"), "/overview?page=2&amp;search=a%26b");
    }

    #[test]
    fn test_nav_marks_active_page() {
        let health = HealthReport { status: "healthy".into(), ..Default::default() };
        let html = nav_html(Nav::Overview, &health, "http://api");
        assert!(html.contains(r#"href="/overview" class="nav-link active""#));
        assert!(html.contains(r#"href="/inference" class="nav-link ""#));
        assert!(html.contains("✅ Connected"));
        assert!(!html.contains("{{"));
    }

    #[test]
    fn test_render_table_links_key_column_and_escapes() {
        let mut table = Table::new(&["Status", "Submission ID"]);
        table.push(Row {
            cells: vec!["high".into(), "<abc>".into()],
            tone: "tier-high",
            key: Some("<abc>".into()),
        });
        let href: &dyn Fn(&str) -> String = &|key| DetailView::for_submission(key).href();
        let html = render_table(&table, Some(("Submission ID", href)));

        assert!(html.contains(r#"<span class="badge tier-high">high</span>"#));
        assert!(html.contains(r#"<a href="/detail?submission_id=%3Cabc%3E">&lt;abc&gt;</a>"#));
        assert!(!html.contains("<abc>"));
    }

    #[test]
    fn test_csv_data_href_round_trips() {
        let href = csv_data_href("a,b\n1,2\n");
        let encoded = href.strip_prefix("data:text/csv;charset=utf-8;base64,").unwrap();
        assert_eq!(BASE64.decode(encoded).unwrap(), b"a,b\n1,2\n");
    }

    #[test]
    fn test_safe_file_name() {
        assert_eq!(safe_file_name("ab\"c/d_detail.csv"), "ab_c_d_detail.csv");
    }

    #[test]
    fn test_not_found_alert_carries_hint() {
        let html = api_error_alert(&ApiError::not_found("Submission x"), Some("Run inference first."));
        assert!(html.contains("Submission x not found"));
        assert!(html.contains("Run inference first."));

        let html = api_error_alert(&ApiError::Unreachable("refused".into()), Some("Run inference first."));
        assert!(!html.contains("Run inference first."));
    }
}
