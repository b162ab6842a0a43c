use std::fmt::Write;

use axum::response::Html;
use queryx_client::config::examples;
use queryx_client::QueryResult;
use serde::Deserialize;

use super::{attr, escape, page, query_result, Banner, Nav};

/// Query tab.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryKind {
    /// Raw SQL.
    #[default]
    Human,
    /// Natural-language question.
    Ai,
}

/// Everything the query view shows.
#[derive(Debug, Default)]
pub struct QueryPage<'a> {
    pub kind: QueryKind,
    /// SQL text to prefill.
    pub sql: String,
    /// Question text to prefill.
    pub question: String,
    /// Tables offered for AI questions.
    pub tables: Vec<String>,
    /// Tables ticked for AI questions.
    pub selected: Vec<String>,
    pub result: Option<&'a QueryResult>,
}

pub fn render(view: &QueryPage<'_>, banner: Option<&Banner>) -> Html<String> {
    let tab = |kind: QueryKind, href: &str, label: &str| {
        let class = if view.kind == kind { r#" class="active""# } else { "" };
        format!(r#"<a href="{href}"{class}>{label}</a>"#)
    };

    let mut body = format!(
        r#"<h1>Query Executor</h1><div class="tabs">{}{}</div>"#,
        tab(QueryKind::Human, "/query?type=human", "SQL Query"),
        tab(QueryKind::Ai, "/query?type=ai", "AI Query"),
    );

    match view.kind {
        QueryKind::Human => body.push_str(&sql_form(view)),
        QueryKind::Ai => body.push_str(&ai_form(view)),
    }

    if let Some(result) = view.result {
        body.push_str(&query_result(result));
    }

    page("Query", Nav::Query, banner, &body)
}

fn sql_form(view: &QueryPage<'_>) -> String {
    let mut html = format!(
        r#"<form class="card" method="post" action="/query/sql">
<label for="query">SQL Query</label>
<textarea id="query" name="query" placeholder="SELECT * FROM users LIMIT 10">{}</textarea>
<button type="submit">Execute Query</button>
</form>"#,
        escape(&view.sql)
    );
    html.push_str(&example_list("Example Queries:", "human", "sql", examples::SQL));
    html
}

fn ai_form(view: &QueryPage<'_>) -> String {
    let mut options = String::new();
    for table in &view.tables {
        let _ = write!(
            options,
            r#"<option value="{name}"{selected}>{name}</option>"#,
            name = escape(table),
            selected = attr(view.selected.contains(table), "selected"),
        );
    }
    let picker = if view.tables.is_empty() {
        r#"<p class="muted">No tables available.</p>"#.to_string()
    } else {
        format!(
            r#"<label for="tables">Select Tables</label>
<select id="tables" name="tables" multiple size="{}">{options}</select>"#,
            view.tables.len().min(8)
        )
    };

    let mut html = format!(
        r#"<form class="card" method="post" action="/query/ai">
{picker}
<label for="question">Your Question</label>
<textarea id="question" name="question" placeholder="Ask a question about your data">{}</textarea>
<button type="submit">Ask AI</button>
</form>"#,
        escape(&view.question)
    );
    html.push_str(&example_list("Example Questions:", "ai", "question", examples::AI));
    html
}

/// Examples as small GET forms that reopen the tab with the text prefilled.
fn example_list(heading: &str, kind: &str, field: &str, items: &[&str]) -> String {
    let mut html = format!(r#"<section class="card examples"><h3>{heading}</h3>"#);
    for item in items {
        let _ = write!(
            html,
            r#"<form class="example" method="get" action="/query"><input type="hidden" name="type" value="{kind}"><input type="hidden" name="{field}" value="{value}"><button type="submit"><code>{value}</code></button></form>"#,
            value = escape(item),
        );
    }
    html.push_str("</section>");
    html
}
