//! Execution of console operations against the QueryX API.

use crate::formatter::Formatter;
use queryx_client::config::examples;
use queryx_client::{Client, ColumnDraft, RowForm, TableForm};
use thiserror::Error;

/// Execution errors.
#[derive(Debug, Error)]
pub enum ExecuteError {
    /// The API call failed or the input was rejected by form validation.
    #[error("{0}")]
    Client(#[from] queryx_client::Error),

    /// The command line itself was malformed.
    #[error("{0}")]
    Usage(String),
}

impl ExecuteError {
    fn usage(message: impl Into<String>) -> Self {
        ExecuteError::Usage(message.into())
    }
}

/// Run a SQL statement.
pub async fn execute_sql(
    client: &Client,
    sql: &str,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let result = client.execute_sql(sql).await?;
    Ok(formatter.format_query_result(&result))
}

/// Ask a natural-language question about the given tables.
pub async fn execute_ai(
    client: &Client,
    question: &str,
    tables: &[String],
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let result = client.ai_query(question, tables).await?;
    Ok(formatter.format_query_result(&result))
}

/// Parse the arguments of `.ai`: an optional comma-separated table list in
/// brackets, then the question.
///
/// Without a bracketed list the session's selected tables are used.
pub fn parse_ai_args(arg: &str, selected: &[String]) -> (Vec<String>, String) {
    let arg = arg.trim();
    if let Some(rest) = arg.strip_prefix('[') {
        if let Some(end) = rest.find(']') {
            let tables = split_tables(&rest[..end]);
            return (tables, rest[end + 1..].trim().to_string());
        }
    }
    (selected.to_vec(), arg.to_string())
}

/// Split a comma-separated table list, dropping empty entries.
pub fn split_tables(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(String::from)
        .collect()
}

/// List all tables.
pub async fn list_tables(client: &Client, formatter: &dyn Formatter) -> Result<String, ExecuteError> {
    let tables = client.list_tables().await?;
    Ok(formatter.format_tables(&tables))
}

/// Describe one table, or every table when none is named.
pub async fn describe(
    client: &Client,
    table: Option<&str>,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    match table {
        Some(table) => {
            let schema = client.table_schema(table).await?;
            Ok(formatter.format_table_schema(&schema))
        }
        None => {
            let schemas = client.all_schemas().await?;
            if schemas.is_empty() {
                return Ok(formatter.format_tables(&[]));
            }
            Ok(schemas
                .iter()
                .map(|s| formatter.format_table_schema(s))
                .collect::<Vec<_>>()
                .join("\n"))
        }
    }
}

/// Table and column totals.
pub async fn dashboard(client: &Client, formatter: &dyn Formatter) -> Result<String, ExecuteError> {
    let summary = client.summary().await?;
    Ok(formatter.format_summary(&summary))
}

/// Build a table form from `<table> <col-spec>...` arguments.
pub fn table_form(arg: &str) -> Result<TableForm, ExecuteError> {
    let mut parts = arg.split_whitespace();
    let table_name = parts
        .next()
        .ok_or_else(|| ExecuteError::usage("missing table name"))?;

    let columns = parts
        .map(str::parse::<ColumnDraft>)
        .collect::<Result<Vec<_>, _>>()?;

    let mut form = TableForm::new();
    form.table_name = table_name.to_string();
    if !columns.is_empty() {
        form.columns = columns;
    }
    Ok(form)
}

/// Create a table from `<table> <col-spec>...`.
pub async fn create_table(
    client: &Client,
    arg: &str,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let form = table_form(arg)?;
    let envelope = client
        .create_table(form.table()?, &form.to_definitions()?)
        .await?;
    Ok(formatter.format_message(&envelope.message))
}

/// Replace a table's columns from `<table> <col-spec>...`.
pub async fn alter_table(
    client: &Client,
    arg: &str,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let form = table_form(arg)?;
    let envelope = client
        .update_table(form.table()?, &form.to_definitions()?)
        .await?;
    Ok(formatter.format_message(&envelope.message))
}

/// Drop a table.
pub async fn drop_table(
    client: &Client,
    table: &str,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let envelope = client.delete_table(table).await?;
    Ok(formatter.format_message(&envelope.message))
}

/// Insert one row from `<table> <col>=<val>...`.
///
/// Values are coerced with the table's column types, so the schema is
/// fetched first. Quoting is not supported; a value runs to the next space.
pub async fn insert_row(
    client: &Client,
    arg: &str,
    formatter: &dyn Formatter,
) -> Result<String, ExecuteError> {
    let mut parts = arg.split_whitespace();
    let table = parts
        .next()
        .ok_or_else(|| ExecuteError::usage("missing table name"))?;
    let assignments = parts
        .map(|part| {
            part.split_once('=')
                .ok_or_else(|| ExecuteError::usage(format!("expected <column>=<value>, got '{part}'")))
        })
        .collect::<Result<Vec<_>, _>>()?;
    if assignments.is_empty() {
        return Err(ExecuteError::usage("nothing to insert"));
    }

    let schema = client.table_schema(table).await?;
    let mut form = RowForm::new(schema);
    for (column, value) in assignments {
        form.set(0, column, value)?;
    }

    let envelope = client.insert_rows(form.table(), &form.to_payload()?).await?;
    Ok(formatter.format_message(&envelope.message))
}

/// Example SQL statements and AI questions.
pub fn examples() -> String {
    let mut lines = vec!["Example Queries:".to_string()];
    lines.extend(examples::SQL.iter().map(|q| format!("  {q}")));
    lines.push(String::new());
    lines.push("Example Questions:".to_string());
    lines.extend(examples::AI.iter().map(|q| format!("  .ai {q}")));
    lines.join("\n")
}
