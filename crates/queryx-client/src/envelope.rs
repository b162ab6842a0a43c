//! Response envelope returned by every QueryX endpoint.

use serde::de::{self, Deserializer};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Response code the backend uses for success.
pub const RC_OK: &str = "200";

/// The `{ rc, message, ... }` wrapper returned by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Envelope {
    /// Response code, `"200"` on success. Numeric codes are accepted and kept as text.
    #[serde(default, deserialize_with = "deserialize_rc")]
    pub rc: String,

    /// Human-readable outcome.
    #[serde(default)]
    pub message: String,

    /// Result rows for query endpoints.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,

    /// Column names of `data`, in display order.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub columns: Option<Vec<String>>,

    /// SQL the server actually ran (generated SQL for AI queries).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub executed_query: Option<String>,

    /// Server-side execution time.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub execution_time_ms: Option<f64>,

    /// Rows returned or modified.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rows_affected: Option<i64>,
}

impl Envelope {
    /// A successful envelope carrying only a message.
    pub fn ok(message: impl Into<String>) -> Self {
        Self {
            rc: RC_OK.to_string(),
            message: message.into(),
            ..Default::default()
        }
    }

    /// Whether the response code signals success.
    pub fn is_success(&self) -> bool {
        self.rc == RC_OK
    }

    /// Convert a failed envelope into [`Error::Rejected`].
    pub fn into_result(self) -> Result<Self, Error> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(Error::Rejected {
                rc: self.rc,
                message: self.message,
            })
        }
    }

    /// Decode a response body as an envelope.
    ///
    /// Returns `None` unless the body is a JSON object with an `rc` field, so
    /// plain payloads (table lists, schema maps, error strings) are not
    /// mistaken for envelopes.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        let value: Value = serde_json::from_slice(body).ok()?;
        if !value.as_object()?.contains_key("rc") {
            return None;
        }
        serde_json::from_value(value).ok()
    }
}

fn deserialize_rc<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::String(s) => Ok(s),
        Value::Number(n) => Ok(n.to_string()),
        Value::Null => Ok(String::new()),
        other => Err(de::Error::custom(format!("invalid response code: {other}"))),
    }
}

/// Result of an SQL or AI query.
///
/// Rows are kept as JSON objects keyed by column name. When the server omits
/// `columns`, they are taken from the keys of the first row.
#[derive(Debug, Clone, PartialEq)]
pub struct QueryResult {
    envelope: Envelope,
    columns: Vec<String>,
    rows: Vec<Map<String, Value>>,
}

impl QueryResult {
    /// Response message.
    pub fn message(&self) -> &str {
        &self.envelope.message
    }

    /// Response code.
    pub fn rc(&self) -> &str {
        &self.envelope.rc
    }

    /// Whether the query succeeded.
    pub fn is_success(&self) -> bool {
        self.envelope.is_success()
    }

    /// SQL the server ran, if reported.
    pub fn executed_query(&self) -> Option<&str> {
        self.envelope.executed_query.as_deref()
    }

    /// Server-side execution time in milliseconds (0 when not reported).
    pub fn execution_time_ms(&self) -> f64 {
        self.envelope.execution_time_ms.unwrap_or(0.0)
    }

    /// Rows affected as reported by the server, falling back to the row count.
    pub fn rows_affected(&self) -> i64 {
        self.envelope
            .rows_affected
            .unwrap_or(self.rows.len() as i64)
    }

    /// Column names in display order.
    pub fn columns(&self) -> &[String] {
        &self.columns
    }

    /// Raw rows.
    pub fn rows(&self) -> &[Map<String, Value>] {
        &self.rows
    }

    /// Number of data rows.
    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Whether the query returned no data.
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Iterate rows as cells in column order. Missing cells are `None`.
    pub fn cells(&self) -> impl Iterator<Item = Vec<Option<&Value>>> + '_ {
        self.rows.iter().map(move |row| {
            self.columns
                .iter()
                .map(|column| row.get(column))
                .collect()
        })
    }

    /// The underlying envelope.
    pub fn envelope(&self) -> &Envelope {
        &self.envelope
    }
}

impl From<Envelope> for QueryResult {
    fn from(mut envelope: Envelope) -> Self {
        let declared = envelope.columns.clone().unwrap_or_default();
        let rows = match envelope.data.take() {
            Some(Value::Array(items)) => items
                .into_iter()
                .filter_map(|item| match item {
                    Value::Object(map) => Some(map),
                    Value::Array(values) => Some(
                        declared
                            .iter()
                            .cloned()
                            .zip(values)
                            .collect::<Map<String, Value>>(),
                    ),
                    _ => None,
                })
                .collect(),
            _ => Vec::new(),
        };

        let columns = if declared.is_empty() {
            rows.first()
                .map(|row| row.keys().cloned().collect())
                .unwrap_or_default()
        } else {
            declared
        };

        Self {
            envelope,
            columns,
            rows,
        }
    }
}

/// Render a cell for display. Null and missing cells render as `NULL`.
pub fn display_cell(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => "NULL".to_string(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
