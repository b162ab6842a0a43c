//! Server-rendered HTML for the studio pages.
//!
//! Pages are plain strings assembled with `format!`; every piece of text
//! that came from the user or the API server goes through [`escape`].

pub mod dashboard;
pub mod data;
pub mod query;
pub mod tables;

use std::fmt::{self, Write};

use axum::response::Html;
use queryx_client::envelope::display_cell;
use queryx_client::QueryResult;

/// Navigation entries, in navbar order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Nav {
    Dashboard,
    Tables,
    Query,
    Data,
}

impl Nav {
    const ALL: [Nav; 4] = [Nav::Dashboard, Nav::Tables, Nav::Query, Nav::Data];

    fn href(self) -> &'static str {
        match self {
            Nav::Dashboard => "/",
            Nav::Tables => "/tables",
            Nav::Query => "/query",
            Nav::Data => "/data",
        }
    }

    fn label(self) -> &'static str {
        match self {
            Nav::Dashboard => "Dashboard",
            Nav::Tables => "Tables",
            Nav::Query => "Query",
            Nav::Data => "Data",
        }
    }
}

/// Transient message shown above a view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Banner {
    Success(String),
    Error(String),
}

impl Banner {
    pub fn success(message: impl Into<String>) -> Self {
        Banner::Success(message.into())
    }

    pub fn error(message: impl fmt::Display) -> Self {
        Banner::Error(message.to_string())
    }

    fn render(&self) -> String {
        let (class, text) = match self {
            Banner::Success(text) => ("success", text),
            Banner::Error(text) => ("error", text),
        };
        format!(
            r#"<div class="banner banner-{class}" role="status">{}</div>"#,
            escape(text)
        )
    }
}

/// Escape text for HTML element content and quoted attribute values.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            c => out.push(c),
        }
    }
    out
}

/// Percent-encode text for a URL path segment or query value.
pub fn encode(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for byte in text.bytes() {
        match byte {
            b'A'..=b'Z' | b'a'..=b'z' | b'0'..=b'9' | b'-' | b'_' | b'.' | b'~' => {
                out.push(byte as char)
            }
            _ => {
                let _ = write!(out, "%{byte:02X}");
            }
        }
    }
    out
}

/// `selected` / `checked` attribute helper.
fn attr(on: bool, name: &str) -> String {
    if on {
        format!(" {name}")
    } else {
        String::new()
    }
}

const STYLE: &str = r#"
* { box-sizing: border-box; }
body { margin: 0; font-family: -apple-system, BlinkMacSystemFont, 'Segoe UI', Roboto, sans-serif; background: #f4f6fb; color: #1f2937; }
nav { display: flex; gap: 4px; align-items: center; padding: 12px 24px; background: #1a1a2e; }
nav .brand { color: #fff; font-weight: 700; margin-right: 24px; }
nav a { color: #cbd5e1; text-decoration: none; padding: 6px 12px; border-radius: 6px; }
nav a.active { background: #4f46e5; color: #fff; }
main { max-width: 1100px; margin: 24px auto; padding: 0 24px; }
.banner { padding: 10px 14px; border-radius: 6px; margin-bottom: 16px; }
.banner-success { background: #dcfce7; color: #166534; }
.banner-error { background: #fee2e2; color: #991b1b; }
.card { background: #fff; border-radius: 8px; padding: 16px 20px; margin-bottom: 16px; box-shadow: 0 1px 3px rgba(0,0,0,.08); }
.stats { display: flex; gap: 16px; }
.stat { flex: 1; }
.stat .value { font-size: 2rem; font-weight: 700; }
table { border-collapse: collapse; width: 100%; }
th, td { text-align: left; padding: 6px 10px; border-bottom: 1px solid #e5e7eb; }
td.null { color: #9ca3af; font-style: italic; }
textarea { width: 100%; min-height: 120px; font-family: monospace; }
.tabs a { margin-right: 12px; }
.tabs a.active { font-weight: 700; }
.muted { color: #6b7280; }
form.inline { display: inline; }
"#;

/// Wrap a view in the navigation shell.
pub fn page(title: &str, active: Nav, banner: Option<&Banner>, body: &str) -> Html<String> {
    let mut links = String::new();
    for nav in Nav::ALL {
        let class = if nav == active { r#" class="active""# } else { "" };
        let _ = write!(links, r#"<a href="{}"{}>{}</a>"#, nav.href(), class, nav.label());
    }
    let banner = banner.map(Banner::render).unwrap_or_default();

    Html(format!(
        r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>{title} - QueryX Studio</title>
    <style>{STYLE}</style>
</head>
<body>
    <nav><span class="brand">QueryX Studio</span>{links}</nav>
    <main>
        {banner}
        {body}
    </main>
</body>
</html>"#,
        title = escape(title),
    ))
}

/// The result panel shared by the SQL and AI query views.
pub fn query_result(result: &QueryResult) -> String {
    let mut html = String::from(r#"<section class="card result"><h2>Results</h2>"#);
    let _ = write!(
        html,
        r#"<p class="muted">Execution time: {}ms &middot; Rows affected: {}</p>"#,
        result.execution_time_ms(),
        result.rows_affected()
    );
    if let Some(sql) = result.executed_query() {
        let _ = write!(html, "<p>Executed SQL:</p><pre><code>{}</code></pre>", escape(sql));
    }

    if result.is_empty() {
        html.push_str("<p>Query executed successfully but returned no data</p>");
    } else {
        html.push_str("<table><thead><tr>");
        for column in result.columns() {
            let _ = write!(html, "<th>{}</th>", escape(column));
        }
        html.push_str("</tr></thead><tbody>");
        for row in result.cells() {
            html.push_str("<tr>");
            for cell in row {
                let null = cell.map_or(true, |v| v.is_null());
                let class = if null { r#" class="null""# } else { "" };
                let _ = write!(html, "<td{}>{}</td>", class, escape(&display_cell(cell)));
            }
            html.push_str("</tr>");
        }
        html.push_str("</tbody></table>");
    }

    html.push_str("</section>");
    html
}
