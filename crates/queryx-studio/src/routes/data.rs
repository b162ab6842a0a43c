use axum::{
    extract::{Query, State},
    response::Html,
    routing::get,
    Form, Router,
};
use queryx_client::RowForm;
use serde::Deserialize;

use crate::error::{Result, StudioError};
use crate::form::{Action, FormFields, MAX_ROWS};
use crate::state::AppState;
use crate::views::{data, Banner};

pub fn routes() -> Router<AppState> {
    Router::new().route("/data", get(show_data).post(submit_data))
}

#[derive(Deserialize)]
struct DataParams {
    #[serde(default)]
    table: Option<String>,
}

/// Table names for the picker; a failure becomes the banner.
async fn load_tables(state: &AppState, banner: &mut Option<Banner>) -> Vec<String> {
    match state.client.list_tables().await {
        Ok(tables) => tables,
        Err(e) => {
            *banner = Some(Banner::error(format!("Failed to load tables: {e}")));
            Vec::new()
        }
    }
}

async fn show_data(State(state): State<AppState>, Query(params): Query<DataParams>) -> Html<String> {
    let mut banner = None;
    let tables = load_tables(&state, &mut banner).await;

    let form = match params.table.as_deref().filter(|t| !t.is_empty()) {
        Some(table) => match state.client.table_schema(table).await {
            Ok(schema) => Some(RowForm::new(schema)),
            Err(e) => {
                banner = Some(Banner::error(format!("Failed to load schema: {e}")));
                None
            }
        },
        None => None,
    };

    data::render(&tables, form.as_ref(), banner.as_ref())
}

async fn submit_data(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>> {
    let fields = FormFields::from(pairs);
    let action = fields.action()?;

    let mut banner = None;
    let tables = load_tables(&state, &mut banner).await;

    let Some(table) = fields.get("table").filter(|t| !t.is_empty()).map(str::to_string) else {
        let banner = Banner::error("Please select a table");
        return Ok(data::render(&tables, None, Some(&banner)));
    };

    // Cell types come from the schema, so it is fetched again on every post.
    let schema = match state.client.table_schema(&table).await {
        Ok(schema) => schema,
        Err(e) => {
            let banner = Banner::error(format!("Failed to load schema: {e}"));
            return Ok(data::render(&tables, None, Some(&banner)));
        }
    };
    let mut form = fields.row_form(schema)?;

    match action {
        Action::AddRow if form.rows().len() < MAX_ROWS => form.add_row(),
        Action::AddRow => {
            banner = Some(Banner::error(format!("At most {MAX_ROWS} rows can be inserted at once")));
        }
        Action::RemoveRow(index) => {
            form.remove_row(index);
        }
        Action::Submit => {
            let outcome = match form.to_payload() {
                Ok(rows) => state.client.insert_rows(form.table(), &rows).await,
                Err(e) => Err(e),
            };
            banner = Some(match outcome {
                Ok(envelope) => {
                    tracing::info!(table = %table, rows = form.rows().len(), "rows inserted");
                    form.reset();
                    Banner::success(envelope.message)
                }
                Err(e) => Banner::error(e),
            });
        }
        other => return Err(StudioError::UnknownAction(other.value())),
    }

    Ok(data::render(&tables, Some(&form), banner.as_ref()))
}
