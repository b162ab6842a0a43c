//! QueryX client API.
//!
//! This module provides the main `Client` struct, one async method per
//! backend endpoint.

use std::time::Instant;

use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, CONTENT_TYPE};
use reqwest::{Method, StatusCode, Url};
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::config::{endpoints, ClientConfig};
use crate::envelope::{Envelope, QueryResult};
use crate::error::Error;
use crate::forms::CellValue;
use crate::schema::{ColumnDefinition, SchemaSummary, TableSchema};
use crate::Result;

/// A client for a QueryX API server.
///
/// The client is cheap to clone; clones share one connection pool.
///
/// # Example
///
/// ```ignore
/// use queryx_client::{Client, ClientConfig};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let client = Client::new(ClientConfig::localhost())?;
///
///     let schema = client.table_schema("users").await?;
///     for column in &schema.columns {
///         println!("{} {}", column.name, column.display_type());
///     }
///     Ok(())
/// }
/// ```
#[derive(Clone)]
pub struct Client {
    http: reqwest::Client,
    base_url: Url,
    config: ClientConfig,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct TableRequest<'a> {
    table_name: &'a str,
    columns: &'a [ColumnDefinition],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct InsertRequest<'a> {
    table_name: &'a str,
    rows: &'a [Vec<CellValue>],
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct AiQueryRequest<'a> {
    natural_language_query: &'a str,
    table_names: &'a [String],
}

impl Client {
    /// Build a client for the configured server.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let base_url = parse_base_url(&config.base_url)?;

        let mut headers = HeaderMap::new();
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));

        let http = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(config.user_agent.clone())
            .default_headers(headers)
            .build()
            .map_err(|e| Error::InvalidConfig(format!("http client build failed: {e}")))?;

        Ok(Self {
            http,
            base_url,
            config,
        })
    }

    /// Build a client for the server at the given base URL.
    pub fn connect_to(base_url: impl Into<String>) -> Result<Self> {
        Self::new(ClientConfig::new(base_url))
    }

    /// Base URL requests are sent to.
    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Configuration the client was built from.
    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// List table names.
    pub async fn list_tables(&self) -> Result<Vec<String>> {
        let url = self.url(endpoints::GET_ALL_TABLES, None)?;
        let body = self.send(Method::GET, url, None).await?;
        table_names(unwrap_payload(decode(&body)?)?)
    }

    /// Fetch the schema of every table.
    pub async fn all_schemas(&self) -> Result<Vec<TableSchema>> {
        let url = self.url(endpoints::GET_ALL_TABLES_SCHEMA, None)?;
        let body = self.send(Method::GET, url, None).await?;
        TableSchema::all_from_response(&unwrap_payload(decode(&body)?)?)
    }

    /// Fetch the schema of one table.
    pub async fn table_schema(&self, table: &str) -> Result<TableSchema> {
        let table = require_table(table)?;
        let url = self.url(endpoints::GET_TABLE_SCHEMA, Some(table))?;
        let body = self.send(Method::GET, url, None).await?;
        TableSchema::from_response(table, &unwrap_payload(decode(&body)?)?)
    }

    /// Create a table.
    pub async fn create_table(&self, table: &str, columns: &[ColumnDefinition]) -> Result<Envelope> {
        let table = require_table(table)?;
        require_columns(columns)?;
        let url = self.url(endpoints::CREATE_TABLE, None)?;
        let body = to_body(&TableRequest {
            table_name: table,
            columns,
        })?;
        let response = self.send(Method::POST, url, Some(body)).await?;
        acknowledge(&response, "Table created successfully!")
    }

    /// Replace the columns of a table.
    pub async fn update_table(&self, table: &str, columns: &[ColumnDefinition]) -> Result<Envelope> {
        let table = require_table(table)?;
        require_columns(columns)?;
        let url = self.url(endpoints::UPDATE_TABLE, None)?;
        let body = to_body(&TableRequest {
            table_name: table,
            columns,
        })?;
        let response = self.send(Method::POST, url, Some(body)).await?;
        acknowledge(&response, "Table updated successfully!")
    }

    /// Drop a table.
    pub async fn delete_table(&self, table: &str) -> Result<Envelope> {
        let table = require_table(table)?;
        let url = self.url(endpoints::DELETE_TABLE, Some(table))?;
        let response = self.send(Method::DELETE, url, None).await?;
        acknowledge(&response, "Table deleted successfully!")
    }

    /// Insert rows into a table.
    pub async fn insert_rows(&self, table: &str, rows: &[Vec<CellValue>]) -> Result<Envelope> {
        let table = require_table(table)?;
        if rows.is_empty() {
            return Err(Error::validation("Please add at least one row"));
        }
        let url = self.url(endpoints::INSERT_DATA, None)?;
        let body = to_body(&InsertRequest {
            table_name: table,
            rows,
        })?;
        let response = self.send(Method::POST, url, Some(body)).await?;
        acknowledge(&response, "Data inserted successfully!")
    }

    /// Execute a raw SQL query.
    pub async fn execute_sql(&self, query: &str) -> Result<QueryResult> {
        if query.trim().is_empty() {
            return Err(Error::validation("Please enter a SQL query"));
        }
        let mut url = self.url(endpoints::EXECUTE_QUERY, None)?;
        url.query_pairs_mut().append_pair("query", query);
        let response = self.send(Method::POST, url, None).await?;
        query_result(&response)
    }

    /// Translate a natural-language question to SQL on the server and run it
    /// against the given tables.
    pub async fn ai_query(&self, question: &str, tables: &[String]) -> Result<QueryResult> {
        if question.trim().is_empty() {
            return Err(Error::validation("Please enter a natural language query"));
        }
        if tables.is_empty() {
            return Err(Error::validation("Please select at least one table"));
        }
        debug!(question, ?tables, "ai query request");

        let url = self.url(endpoints::AI_QUERY, None)?;
        let body = to_body(&AiQueryRequest {
            natural_language_query: question,
            table_names: tables,
        })?;
        let response = self.send(Method::POST, url, Some(body)).await?;
        let result = query_result(&response)?;

        debug!(
            executed_query = result.executed_query().unwrap_or_default(),
            rows = result.row_count(),
            "ai query response"
        );
        Ok(result)
    }

    /// Table and column counts for the dashboard.
    pub async fn summary(&self) -> Result<SchemaSummary> {
        let tables = self.list_tables().await?;
        let schemas = self.all_schemas().await?;
        Ok(SchemaSummary::from_parts(&tables, &schemas))
    }

    /// Check that the server answers.
    pub async fn ping(&self) -> Result<()> {
        self.list_tables().await.map(|_| ())
    }

    /// Resolve an endpoint path, optionally with one extra path segment.
    ///
    /// The segment is percent-encoded. `.` and `..` are rejected since URL
    /// parsing would resolve them against the endpoint path.
    fn url(&self, path: &str, segment: Option<&str>) -> Result<Url> {
        if let Some(name @ ("." | "..")) = segment {
            return Err(Error::validation(format!("'{name}' is not a valid table name")));
        }

        let mut url = self.base_url.clone();
        {
            let mut segments = url
                .path_segments_mut()
                .map_err(|_| Error::InvalidConfig(format!("'{}' cannot be a base URL", self.base_url)))?;
            segments.pop_if_empty();
            segments.extend(path.split('/').filter(|s| !s.is_empty()));
            if let Some(segment) = segment {
                segments.push(segment);
            }
        }
        Ok(url)
    }

    /// Send a request and return the body of a 2xx response.
    async fn send(&self, method: Method, url: Url, body: Option<Value>) -> Result<Vec<u8>> {
        let path = url.path().to_string();
        let started = Instant::now();

        let mut request = self.http.request(method.clone(), url);
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.inspect_err(|e| {
            debug!(%method, path = %path, error = %e, "request failed");
        })?;
        let status = response.status();
        let bytes = response.bytes().await?.to_vec();

        debug!(
            %method,
            path = %path,
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            "request completed"
        );

        if !status.is_success() {
            return Err(Error::Http {
                status,
                message: error_message(status, &bytes),
            });
        }
        Ok(bytes)
    }
}

impl std::fmt::Debug for Client {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client")
            .field("base_url", &self.base_url.as_str())
            .field("timeout", &self.config.timeout)
            .finish()
    }
}

fn parse_base_url(raw: &str) -> Result<Url> {
    let url = Url::parse(raw.trim())
        .map_err(|e| Error::InvalidConfig(format!("invalid base URL '{raw}': {e}")))?;
    match url.scheme() {
        "http" | "https" if url.has_host() => Ok(url),
        _ => Err(Error::InvalidConfig(format!(
            "base URL '{raw}' must be an absolute http(s) URL"
        ))),
    }
}

fn require_table(table: &str) -> Result<&str> {
    let table = table.trim();
    if table.is_empty() {
        return Err(Error::validation("Please select a table"));
    }
    Ok(table)
}

fn require_columns(columns: &[ColumnDefinition]) -> Result<()> {
    if columns.is_empty() {
        return Err(Error::validation("Please add at least one column"));
    }
    Ok(())
}

fn to_body<T: Serialize>(request: &T) -> Result<Value> {
    Ok(serde_json::to_value(request)?)
}

fn decode(body: &[u8]) -> Result<Value> {
    Ok(serde_json::from_slice(body)?)
}

/// Strip an envelope around a plain payload, if there is one.
///
/// Schema endpoints usually answer with the bare payload. When they answer
/// with an envelope instead, a failed response code becomes an error and the
/// payload is read from `data`.
fn unwrap_payload(value: Value) -> Result<Value> {
    let is_envelope = value
        .as_object()
        .and_then(|obj| obj.get("rc"))
        .is_some_and(|rc| rc.is_string() || rc.is_number());
    if !is_envelope {
        return Ok(value);
    }

    let envelope = serde_json::from_value::<Envelope>(value)?.into_result()?;
    Ok(envelope.data.unwrap_or(Value::Null))
}

fn table_names(value: Value) -> Result<Vec<String>> {
    let Value::Array(items) = value else {
        return Err(Error::Decode(<serde_json::Error as serde::de::Error>::custom(
            "table list is not a JSON array",
        )));
    };

    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            Value::String(name) => Some(name),
            Value::Object(obj) => obj
                .get("table_name")
                .or_else(|| obj.get("name"))
                .and_then(Value::as_str)
                .map(str::to_string),
            _ => None,
        })
        .collect())
}

/// Interpret the body of a schema or data mutation.
///
/// An envelope decides success through its response code. Any other 2xx body
/// is an acknowledgement; its text becomes the message.
fn acknowledge(body: &[u8], default_message: &str) -> Result<Envelope> {
    if let Some(envelope) = Envelope::from_body(body) {
        return envelope.into_result();
    }

    let text = match serde_json::from_slice::<Value>(body) {
        Ok(Value::String(s)) => s,
        Ok(Value::Object(obj)) => obj
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string(),
        _ => String::from_utf8_lossy(body).trim().to_string(),
    };

    if text.is_empty() {
        Ok(Envelope::ok(default_message))
    } else {
        Ok(Envelope::ok(text))
    }
}

fn query_result(body: &[u8]) -> Result<QueryResult> {
    let envelope: Envelope = serde_json::from_slice(body)?;
    Ok(QueryResult::from(envelope.into_result()?))
}

/// Best message for a non-2xx response.
fn error_message(status: StatusCode, body: &[u8]) -> String {
    if let Ok(Value::Object(obj)) = serde_json::from_slice::<Value>(body) {
        for key in ["message", "error"] {
            if let Some(message) = obj.get(key).and_then(Value::as_str) {
                if !message.is_empty() {
                    return message.to_string();
                }
            }
        }
    }

    let text = String::from_utf8_lossy(body).trim().to_string();
    if !text.is_empty() && !text.starts_with('<') {
        return text;
    }

    status
        .canonical_reason()
        .unwrap_or("request failed")
        .to_string()
}
