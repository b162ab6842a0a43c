use axum::{
    extract::{Path, Query, State},
    response::Html,
    routing::{get, post},
    Form, Router,
};
use queryx_client::TableForm;
use serde::Deserialize;

use crate::error::{Result, StudioError};
use crate::form::{Action, FormFields, MAX_COLUMNS};
use crate::state::AppState;
use crate::views::tables::{self, EditorMode};
use crate::views::Banner;

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/tables", get(list_tables))
        .route("/tables/new", get(new_table).post(create_table))
        .route("/tables/:table/edit", get(edit_table).post(update_table))
        .route("/tables/:table/delete", post(delete_table))
}

#[derive(Deserialize)]
struct ListParams {
    #[serde(default)]
    table: Option<String>,
}

async fn list_tables(State(state): State<AppState>, Query(params): Query<ListParams>) -> Html<String> {
    let selected = params.table.as_deref().filter(|t| !t.is_empty());
    render_list(&state, selected, None).await
}

/// Table list, with the schema of `selected` when given.
async fn render_list(state: &AppState, selected: Option<&str>, banner: Option<Banner>) -> Html<String> {
    let mut banner = banner;

    let tables = match state.client.list_tables().await {
        Ok(tables) => tables,
        Err(e) => {
            banner = Some(Banner::error(format!("Failed to load tables: {e}")));
            Vec::new()
        }
    };

    let schema = match selected {
        Some(table) => match state.client.table_schema(table).await {
            Ok(schema) => Some(schema),
            Err(e) => {
                banner = Some(Banner::error(format!("Failed to load schema: {e}")));
                None
            }
        },
        None => None,
    };

    tables::list(&tables, schema.as_ref(), banner.as_ref())
}

async fn new_table() -> Html<String> {
    tables::editor(&TableForm::new(), EditorMode::Create, None)
}

async fn create_table(
    State(state): State<AppState>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>> {
    handle_editor(&state, pairs.into(), EditorMode::Create).await
}

async fn edit_table(State(state): State<AppState>, Path(table): Path<String>) -> Html<String> {
    match state.client.table_schema(&table).await {
        Ok(schema) => tables::editor(&TableForm::for_table(&schema), EditorMode::Edit(&table), None),
        Err(e) => {
            let banner = Banner::error(format!("Failed to load schema: {e}"));
            render_list(&state, None, Some(banner)).await
        }
    }
}

async fn update_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Form(pairs): Form<Vec<(String, String)>>,
) -> Result<Html<String>> {
    handle_editor(&state, pairs.into(), EditorMode::Edit(&table)).await
}

/// Apply an editor action. Add and remove re-render the form; submit calls
/// the API and returns to the list on success.
async fn handle_editor(state: &AppState, fields: FormFields, mode: EditorMode<'_>) -> Result<Html<String>> {
    let fixed_name = match mode {
        EditorMode::Create => None,
        EditorMode::Edit(table) => Some(table),
    };
    let mut form = fields.table_form(fixed_name)?;

    let mut banner = None;
    match fields.action()? {
        Action::AddColumn if form.columns.len() < MAX_COLUMNS => form.add_column(),
        Action::AddColumn => {
            banner = Some(Banner::error(format!("A table can have at most {MAX_COLUMNS} columns")));
        }
        Action::RemoveColumn(index) => {
            form.remove_column(index);
        }
        Action::Submit => {
            return Ok(match submit_table(state, &form, mode).await {
                Ok(message) => render_list(state, None, Some(Banner::success(message))).await,
                Err(e) => tables::editor(&form, mode, Some(&Banner::error(e))),
            });
        }
        other => return Err(StudioError::UnknownAction(other.value())),
    }

    Ok(tables::editor(&form, mode, banner.as_ref()))
}

async fn submit_table(state: &AppState, form: &TableForm, mode: EditorMode<'_>) -> queryx_client::Result<String> {
    let table = form.table()?;
    let columns = form.to_definitions()?;

    let envelope = match mode {
        EditorMode::Create => state.client.create_table(table, &columns).await?,
        EditorMode::Edit(_) => state.client.update_table(table, &columns).await?,
    };
    tracing::info!(table, columns = columns.len(), "table saved");
    Ok(envelope.message)
}

#[derive(Deserialize)]
struct DeleteForm {
    #[serde(default)]
    confirm: Option<String>,
}

async fn delete_table(
    State(state): State<AppState>,
    Path(table): Path<String>,
    Form(form): Form<DeleteForm>,
) -> Html<String> {
    if form.confirm.as_deref() != Some("yes") {
        return tables::confirm_delete(&table);
    }

    match state.client.delete_table(&table).await {
        Ok(envelope) => {
            tracing::info!(table = %table, "table deleted");
            render_list(&state, None, Some(Banner::success(envelope.message))).await
        }
        Err(e) => {
            let banner = Banner::error(format!("Failed to delete table: {e}"));
            render_list(&state, Some(&table), Some(banner)).await
        }
    }
}
