//! Output formatters for query results and schema listings.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use queryx_client::envelope::display_cell;
use queryx_client::{QueryResult, SchemaSummary, TableSchema};
use serde_json::{json, Value};

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
    /// CSV format
    Csv,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
            OutputFormat::Csv => write!(f, "csv"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format a query result.
    fn format_query_result(&self, result: &QueryResult) -> String;

    /// Format the list of table names.
    fn format_tables(&self, tables: &[String]) -> String;

    /// Format the columns of one table.
    fn format_table_schema(&self, schema: &TableSchema) -> String;

    /// Format dashboard statistics.
    fn format_summary(&self, summary: &SchemaSummary) -> String;

    /// Format an error message.
    fn format_error(&self, error: &str) -> String;

    /// Format a simple message.
    fn format_message(&self, message: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
        OutputFormat::Csv => Box::new(CsvFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_query_result(&self, result: &QueryResult) -> String {
        let mut lines = Vec::new();

        if let Some(sql) = result.executed_query() {
            lines.push(format!("Executed SQL: {}", sql));
        }

        if result.is_empty() {
            lines.push("Query executed successfully but returned no data".to_string());
        } else {
            let mut table = Table::new();
            table.set_header(result.columns().iter().map(Cell::new).collect::<Vec<_>>());
            for row in result.cells() {
                table.add_row(row.into_iter().map(|v| Cell::new(display_cell(v))).collect::<Vec<_>>());
            }
            lines.push(table.to_string());
        }

        lines.push(format!(
            "{} row(s) in {}ms",
            result.rows_affected(),
            result.execution_time_ms()
        ));
        lines.join("\n")
    }

    fn format_tables(&self, tables: &[String]) -> String {
        if tables.is_empty() {
            return "No tables found. Create your first table with .create".to_string();
        }

        let mut table = Table::new();
        table.set_header(vec![format!("Tables ({})", tables.len())]);
        for name in tables {
            table.add_row(vec![name]);
        }
        table.to_string()
    }

    fn format_table_schema(&self, schema: &TableSchema) -> String {
        let mut table = Table::new();
        table.set_header(vec!["Column", "Type", "Nullable", "Primary Key"]);

        for column in &schema.columns {
            table.add_row(vec![
                Cell::new(&column.name),
                Cell::new(column.display_type()),
                Cell::new(if column.nullable { "YES" } else { "NO" }),
                Cell::new(if column.primary_key { "PK" } else { "" }),
            ]);
        }

        format!("{}\n{}", schema.table, table)
    }

    fn format_summary(&self, summary: &SchemaSummary) -> String {
        format!(
            "Total Tables:  {}\nTotal Columns: {}",
            summary.total_tables, summary.total_columns
        )
    }

    fn format_error(&self, error: &str) -> String {
        format!("Error: {}", error)
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_query_result(&self, result: &QueryResult) -> String {
        let rows: Vec<Value> = result.rows().iter().cloned().map(Value::Object).collect();
        pretty(&json!({
            "message": result.message(),
            "columns": result.columns(),
            "data": rows,
            "executedQuery": result.executed_query(),
            "executionTimeMs": result.execution_time_ms(),
            "rowsAffected": result.rows_affected(),
        }))
    }

    fn format_tables(&self, tables: &[String]) -> String {
        pretty(&json!(tables))
    }

    fn format_table_schema(&self, schema: &TableSchema) -> String {
        pretty(&json!(schema))
    }

    fn format_summary(&self, summary: &SchemaSummary) -> String {
        pretty(&json!(summary))
    }

    fn format_error(&self, error: &str) -> String {
        json!({ "error": error }).to_string()
    }

    fn format_message(&self, message: &str) -> String {
        json!({ "message": message }).to_string()
    }
}

fn pretty(value: &Value) -> String {
    serde_json::to_string_pretty(value).unwrap_or_else(|_| value.to_string())
}

/// CSV formatter.
pub struct CsvFormatter;

impl Formatter for CsvFormatter {
    fn format_query_result(&self, result: &QueryResult) -> String {
        let mut output = String::new();

        let header: Vec<String> = result.columns().iter().map(|c| csv_field(c)).collect();
        output.push_str(&header.join(","));
        output.push('\n');

        for row in result.cells() {
            let cells: Vec<String> = row.into_iter().map(format_value_csv).collect();
            output.push_str(&cells.join(","));
            output.push('\n');
        }

        output
    }

    fn format_tables(&self, tables: &[String]) -> String {
        let mut output = String::from("table\n");
        for table in tables {
            output.push_str(&csv_field(table));
            output.push('\n');
        }
        output
    }

    fn format_table_schema(&self, schema: &TableSchema) -> String {
        let mut output = String::from("column,type,nullable,primary_key\n");
        for column in &schema.columns {
            output.push_str(&format!(
                "{},{},{},{}\n",
                csv_field(&column.name),
                csv_field(&column.display_type()),
                column.nullable,
                column.primary_key
            ));
        }
        output
    }

    fn format_summary(&self, summary: &SchemaSummary) -> String {
        format!(
            "total_tables,total_columns\n{},{}\n",
            summary.total_tables, summary.total_columns
        )
    }

    fn format_error(&self, error: &str) -> String {
        format!("error\n\"{}\"", escape_csv(error))
    }

    fn format_message(&self, message: &str) -> String {
        message.to_string()
    }
}

/// Format a cell for CSV output. Null is an empty field.
fn format_value_csv(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => format!("\"{}\"", escape_csv(s)),
        Some(other) => csv_field(&other.to_string()),
    }
}

/// Quote a field when it contains a separator, quote or newline.
fn csv_field(s: &str) -> String {
    if s.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", escape_csv(s))
    } else {
        s.to_string()
    }
}

/// Escape a string for CSV.
fn escape_csv(s: &str) -> String {
    s.replace('"', "\"\"")
}

#[cfg(test)]
mod tests {
    use super::*;
    use queryx_client::{ColumnInfo, DataType, Envelope};

    fn sample_result() -> QueryResult {
        let envelope: Envelope = serde_json::from_value(json!({
            "rc": "200",
            "message": "Query executed successfully",
            "data": [
                { "id": 1, "name": "Alice, A.", "email": null },
                { "id": 2, "name": "Bob \"B\"", "email": "bob@example.com" }
            ],
            "executionTimeMs": 3,
            "rowsAffected": 2
        }))
        .unwrap();
        QueryResult::from(envelope)
    }

    #[test]
    fn test_escape_csv() {
        assert_eq!(escape_csv("hello"), "hello");
        assert_eq!(escape_csv("hello, world"), "hello, world");
        assert_eq!(escape_csv("say \"hi\""), "say \"\"hi\"\"");
        assert_eq!(csv_field("a,b"), "\"a,b\"");
        assert_eq!(csv_field("plain"), "plain");
    }

    #[test]
    fn test_csv_query_result() {
        let output = CsvFormatter.format_query_result(&sample_result());
        assert_eq!(
            output,
            "id,name,email\n1,\"Alice, A.\",\n2,\"Bob \"\"B\"\"\",\"bob@example.com\"\n"
        );
    }

    #[test]
    fn test_table_query_result() {
        let output = TableFormatter.format_query_result(&sample_result());
        assert!(output.contains("Alice, A."));
        assert!(output.contains("NULL"));
        assert!(output.ends_with("2 row(s) in 3ms"));

        let empty = QueryResult::from(Envelope::ok("done"));
        let output = TableFormatter.format_query_result(&empty);
        assert!(output.starts_with("Query executed successfully but returned no data"));
    }

    #[test]
    fn test_json_query_result() {
        let output = JsonFormatter.format_query_result(&sample_result());
        let value: Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["columns"], json!(["id", "name", "email"]));
        assert_eq!(value["data"][1]["email"], "bob@example.com");
        assert_eq!(value["rowsAffected"], 2);
    }

    #[test]
    fn test_schema_formats() {
        let schema = TableSchema {
            table: "users".to_string(),
            columns: vec![
                ColumnInfo {
                    primary_key: true,
                    nullable: false,
                    ..ColumnInfo::new("id", DataType::Integer)
                },
                ColumnInfo {
                    length: Some(100),
                    ..ColumnInfo::new("name", DataType::Varchar)
                },
            ],
        };

        let csv = CsvFormatter.format_table_schema(&schema);
        assert_eq!(
            csv,
            "column,type,nullable,primary_key\nid,INTEGER,false,true\nname,VARCHAR(100),true,false\n"
        );

        let table = TableFormatter.format_table_schema(&schema);
        assert!(table.starts_with("users\n"));
        assert!(table.contains("VARCHAR(100)"));
    }

    #[test]
    fn test_empty_table_list() {
        assert!(TableFormatter.format_tables(&[]).starts_with("No tables found"));
        assert_eq!(JsonFormatter.format_tables(&["users".to_string()]), "[\n  \"users\"\n]");
    }
}
