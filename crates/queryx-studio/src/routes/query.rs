use axum::{
    extract::{Query, State},
    response::Html,
    routing::{get, post},
    Form, Router,
};
use serde::Deserialize;

use crate::form::FormFields;
use crate::state::AppState;
use crate::views::query::{self, QueryKind, QueryPage};
use crate::views::Banner;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/query", get(show_query))
        .route("/query/sql", post(run_sql))
        .route("/query/ai", post(run_ai))
}

#[derive(Deserialize)]
struct QueryParams {
    #[serde(default, rename = "type")]
    kind: QueryKind,
    /// Prefilled SQL, set by the example buttons.
    #[serde(default)]
    sql: String,
    /// Prefilled question, set by the example buttons.
    #[serde(default)]
    question: String,
}

async fn show_query(State(state): State<AppState>, Query(params): Query<QueryParams>) -> Html<String> {
    let mut view = QueryPage {
        kind: params.kind,
        sql: params.sql,
        question: params.question,
        ..Default::default()
    };

    let mut banner = None;
    if view.kind == QueryKind::Ai {
        match state.client.list_tables().await {
            Ok(tables) => view.tables = tables,
            Err(e) => banner = Some(Banner::error(format!("Failed to load tables: {e}"))),
        }
    }
    query::render(&view, banner.as_ref())
}

#[derive(Deserialize)]
struct SqlForm {
    #[serde(default)]
    query: String,
}

async fn run_sql(State(state): State<AppState>, Form(form): Form<SqlForm>) -> Html<String> {
    let outcome = state.client.execute_sql(&form.query).await;

    let mut view = QueryPage {
        kind: QueryKind::Human,
        sql: form.query,
        ..Default::default()
    };
    match &outcome {
        Ok(result) => {
            view.result = Some(result);
            query::render(&view, Some(&Banner::success("Query executed successfully!")))
        }
        Err(e) => query::render(&view, Some(&Banner::error(e))),
    }
}

async fn run_ai(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Html<String> {
    let fields = FormFields::from(pairs);
    let question = fields.get("question").unwrap_or_default().to_string();
    let selected: Vec<String> = fields.get_all("tables").map(String::from).collect();

    let outcome = state.client.ai_query(&question, &selected).await;

    // The table picker is re-rendered, so the list is needed either way.
    let (tables, load_error) = match state.client.list_tables().await {
        Ok(tables) => (tables, None),
        Err(e) => (selected.clone(), Some(e)),
    };

    let mut view = QueryPage {
        kind: QueryKind::Ai,
        question,
        tables,
        selected,
        ..Default::default()
    };
    let banner = match &outcome {
        Ok(result) => {
            view.result = Some(result);
            match load_error {
                Some(e) => Banner::error(format!("Failed to load tables: {e}")),
                None => Banner::success("AI query executed successfully!"),
            }
        }
        Err(e) => Banner::error(e),
    };
    query::render(&view, Some(&banner))
}
