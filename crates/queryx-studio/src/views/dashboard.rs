use axum::response::Html;
use queryx_client::SchemaSummary;

use super::{page, Banner, Nav};

const QUICK_ACTIONS: [(&str, &str, &str); 4] = [
    ("Create Table", "/tables", "Design a new table and its columns"),
    ("AI Query", "/query?type=ai", "Ask questions about your data in plain language"),
    ("SQL Query", "/query?type=human", "Run SQL statements directly"),
    ("Insert Data", "/data", "Add rows to an existing table"),
];

/// Dashboard with totals and quick actions. `None` means the totals could
/// not be loaded; the banner says why.
pub fn render(summary: Option<&SchemaSummary>, banner: Option<&Banner>) -> Html<String> {
    let (tables, columns) = match summary {
        Some(s) => (s.total_tables.to_string(), s.total_columns.to_string()),
        None => ("-".to_string(), "-".to_string()),
    };

    let actions: String = QUICK_ACTIONS
        .iter()
        .map(|(label, href, hint)| {
            format!(r#"<a class="card stat" href="{href}"><strong>{label}</strong><p class="muted">{hint}</p></a>"#)
        })
        .collect();

    let body = format!(
        r#"<h1>Dashboard</h1>
<div class="stats">
    <div class="card stat"><div class="muted">Total Tables</div><div class="value" id="total-tables">{tables}</div></div>
    <div class="card stat"><div class="muted">Total Columns</div><div class="value" id="total-columns">{columns}</div></div>
</div>
<h2>Quick Actions</h2>
<div class="stats">{actions}</div>"#
    );

    page("Dashboard", Nav::Dashboard, banner, &body)
}
