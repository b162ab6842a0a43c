//! Table schema types and normalization of server-reported column metadata.
//!
//! The backend reports columns in more than one shape. A single table answers
//! either `{ "columns": { <key>: <info> } }` or the bare `{ <key>: <info> }`
//! map, and each `<info>` may use information-schema names (`column_name`,
//! `data_type`, `is_nullable`, `character_maximum_length`) or the console's own
//! (`type`, `nullable`, `length`, `primaryKey`). Everything here converges on
//! [`ColumnInfo`].

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::Error;

/// Type used when the server does not report one.
pub const DEFAULT_TYPE: &str = "VARCHAR";

/// Default length offered for length-taking types in the editor.
pub const DEFAULT_LENGTH: u32 = 255;

/// Column data type.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum DataType {
    #[default]
    Varchar,
    Integer,
    Numeric,
    Text,
    Timestamp,
    Boolean,
    Date,
    Time,
    /// Any other server-reported type, upper-cased.
    Other(String),
}

/// Input widget suited to a column type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputKind {
    Number,
    Checkbox,
    Date,
    Time,
    DateTimeLocal,
    Text,
}

impl InputKind {
    /// The HTML `<input type>` for this kind.
    pub fn html_type(self) -> &'static str {
        match self {
            InputKind::Number => "number",
            InputKind::Checkbox => "checkbox",
            InputKind::Date => "date",
            InputKind::Time => "time",
            InputKind::DateTimeLocal => "datetime-local",
            InputKind::Text => "text",
        }
    }
}

impl DataType {
    /// Types offered by the table editor.
    pub fn editable() -> [DataType; 8] {
        [
            DataType::Varchar,
            DataType::Integer,
            DataType::Numeric,
            DataType::Text,
            DataType::Timestamp,
            DataType::Boolean,
            DataType::Date,
            DataType::Time,
        ]
    }

    /// Parse a type name, case-insensitively. A parenthesized suffix such as
    /// `(255)` is ignored; use [`split_length`] to keep it.
    pub fn from_name(name: &str) -> Self {
        let (base, _) = split_length(name);
        let upper = base.trim().to_uppercase();
        match upper.as_str() {
            "VARCHAR" => DataType::Varchar,
            "INTEGER" => DataType::Integer,
            "NUMERIC" => DataType::Numeric,
            "TEXT" => DataType::Text,
            "TIMESTAMP" => DataType::Timestamp,
            "BOOLEAN" => DataType::Boolean,
            "DATE" => DataType::Date,
            "TIME" => DataType::Time,
            "" => DataType::Varchar,
            _ => DataType::Other(upper),
        }
    }

    /// Upper-case type name.
    pub fn name(&self) -> &str {
        match self {
            DataType::Varchar => "VARCHAR",
            DataType::Integer => "INTEGER",
            DataType::Numeric => "NUMERIC",
            DataType::Text => "TEXT",
            DataType::Timestamp => "TIMESTAMP",
            DataType::Boolean => "BOOLEAN",
            DataType::Date => "DATE",
            DataType::Time => "TIME",
            DataType::Other(name) => name,
        }
    }

    /// Whether form values of this type are sent as integers.
    pub fn is_integer(&self) -> bool {
        matches!(
            self.name(),
            "INTEGER" | "INT" | "INT2" | "INT4" | "INT8" | "SMALLINT" | "BIGINT" | "SERIAL"
                | "BIGSERIAL"
        )
    }

    /// Whether form values of this type are sent as floating point numbers.
    pub fn is_float(&self) -> bool {
        matches!(
            self.name(),
            "NUMERIC" | "DECIMAL" | "FLOAT" | "FLOAT4" | "FLOAT8" | "DOUBLE"
                | "DOUBLE PRECISION" | "REAL"
        )
    }

    /// Whether form values of this type are sent as booleans.
    pub fn is_boolean(&self) -> bool {
        matches!(self.name(), "BOOLEAN" | "BOOL")
    }

    /// Input widget for this type.
    pub fn input_kind(&self) -> InputKind {
        let name = self.name();
        if name.contains("INT") {
            InputKind::Number
        } else if name.contains("NUMERIC") || name.contains("DECIMAL") || name.contains("FLOAT") {
            InputKind::Number
        } else if name.contains("BOOL") {
            InputKind::Checkbox
        } else if name.contains("DATE") && !name.contains("TIME") {
            InputKind::Date
        } else if name.contains("TIME") && !name.contains("STAMP") {
            InputKind::Time
        } else if name.contains("TIMESTAMP") {
            InputKind::DateTimeLocal
        } else {
            InputKind::Text
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl From<&str> for DataType {
    fn from(name: &str) -> Self {
        DataType::from_name(name)
    }
}

impl Serialize for DataType {
    fn serialize<S: serde::Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.name())
    }
}

impl<'de> Deserialize<'de> for DataType {
    fn deserialize<D: serde::Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let name = String::deserialize(deserializer)?;
        Ok(DataType::from_name(&name))
    }
}

/// Split `VARCHAR(120)` into `("VARCHAR", Some(120))`.
///
/// Suffixes that are not a single integer (`NUMERIC(10,2)`) yield `None`.
pub fn split_length(spec: &str) -> (&str, Option<u32>) {
    let spec = spec.trim();
    match spec.find('(') {
        Some(open) if spec.ends_with(')') => {
            let inner = &spec[open + 1..spec.len() - 1];
            (spec[..open].trim_end(), inner.trim().parse().ok())
        }
        _ => (spec, None),
    }
}

/// Column metadata as reported by the server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnInfo {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    pub nullable: bool,
    pub primary_key: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
}

impl ColumnInfo {
    /// Create a nullable, non-key column.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            nullable: true,
            primary_key: false,
            length: None,
        }
    }

    /// Normalize one entry of a schema map.
    ///
    /// `key` is the map key, used when the entry carries no `column_name`.
    /// A bare string entry is read as the type name.
    pub fn from_metadata(key: &str, info: &Value) -> Self {
        let obj = match info {
            Value::Object(obj) => obj,
            Value::String(type_name) => return Self::new(key, DataType::from_name(type_name)),
            _ => return Self::new(key, DataType::default()),
        };

        let name = obj
            .get("column_name")
            .and_then(Value::as_str)
            .unwrap_or(key)
            .to_string();

        let type_name = obj
            .get("data_type")
            .and_then(Value::as_str)
            .or_else(|| obj.get("type").and_then(Value::as_str))
            .unwrap_or(DEFAULT_TYPE);
        let (base, inline_length) = split_length(type_name);

        let nullable = match obj.get("is_nullable").and_then(Value::as_str) {
            Some(flag) => flag.eq_ignore_ascii_case("YES"),
            None => obj.get("nullable") != Some(&Value::Bool(false)),
        };

        let primary_key = obj
            .get("primaryKey")
            .and_then(Value::as_bool)
            .unwrap_or(false);

        let length = read_length(obj, "character_maximum_length")
            .or_else(|| read_length(obj, "length"))
            .or(inline_length);

        Self {
            name,
            data_type: DataType::from_name(base),
            nullable,
            primary_key,
            length,
        }
    }

    /// Type with its length, e.g. `VARCHAR(255)`.
    pub fn display_type(&self) -> String {
        match self.length {
            Some(length) => format!("{}({})", self.data_type, length),
            None => self.data_type.to_string(),
        }
    }
}

fn read_length(obj: &Map<String, Value>, key: &str) -> Option<u32> {
    match obj.get(key)? {
        Value::Number(n) => n.as_u64().and_then(|n| u32::try_from(n).ok()),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

/// Structure of one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TableSchema {
    pub table: String,
    pub columns: Vec<ColumnInfo>,
}

impl TableSchema {
    /// Normalize a single-table schema response.
    pub fn from_response(table: impl Into<String>, body: &Value) -> Result<Self, Error> {
        let table = table.into();
        let map = unwrap_columns(body).ok_or_else(|| {
            decode_error(format!("schema of table '{table}' is not a JSON object"))
        })?;

        let columns = map
            .iter()
            .map(|(key, info)| ColumnInfo::from_metadata(key, info))
            .collect();

        Ok(Self { table, columns })
    }

    /// Normalize the all-tables schema response, `{ <table>: <schema> }`.
    pub fn all_from_response(body: &Value) -> Result<Vec<Self>, Error> {
        let tables = body
            .as_object()
            .ok_or_else(|| decode_error("table schemas are not a JSON object".to_string()))?;

        tables
            .iter()
            .map(|(table, schema)| Self::from_response(table.clone(), schema))
            .collect()
    }

    /// Look up a column by name.
    pub fn column(&self, name: &str) -> Option<&ColumnInfo> {
        self.columns.iter().find(|c| c.name == name)
    }

    /// Column names in order.
    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    /// Primary-key columns.
    pub fn primary_keys(&self) -> impl Iterator<Item = &ColumnInfo> {
        self.columns.iter().filter(|c| c.primary_key)
    }
}

/// Strip the optional `{ "columns": { ... } }` wrapper.
///
/// The wrapper is recognized when `columns` maps to an object whose values are
/// all objects; column metadata itself only holds scalars, so a column that is
/// literally named `columns` is not mistaken for the wrapper.
fn unwrap_columns(body: &Value) -> Option<&Map<String, Value>> {
    let obj = body.as_object()?;
    match obj.get("columns") {
        Some(Value::Object(inner)) if inner.values().all(Value::is_object) => Some(inner),
        _ => Some(obj),
    }
}

fn decode_error(message: String) -> Error {
    Error::Decode(<serde_json::Error as serde::de::Error>::custom(message))
}

/// A column in a create or update request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnDefinition {
    pub name: String,
    #[serde(rename = "type")]
    pub data_type: DataType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub length: Option<u32>,
    #[serde(default)]
    pub primary_key: bool,
    #[serde(default = "default_true")]
    pub nullable: bool,
}

fn default_true() -> bool {
    true
}

impl From<&ColumnInfo> for ColumnDefinition {
    fn from(info: &ColumnInfo) -> Self {
        Self {
            name: info.name.clone(),
            data_type: info.data_type.clone(),
            length: info.length,
            primary_key: info.primary_key,
            nullable: info.nullable,
        }
    }
}

/// Dashboard statistics.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SchemaSummary {
    pub total_tables: usize,
    pub total_columns: usize,
}

impl SchemaSummary {
    /// Count tables from the table list and columns across all schemas.
    pub fn from_parts(tables: &[String], schemas: &[TableSchema]) -> Self {
        Self {
            total_tables: tables.len(),
            total_columns: schemas.iter().map(|s| s.columns.len()).sum(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_data_type_parsing() {
        assert_eq!(DataType::from_name("varchar"), DataType::Varchar);
        assert_eq!(DataType::from_name("VARCHAR(100)"), DataType::Varchar);
        assert_eq!(DataType::from_name(" integer "), DataType::Integer);
        assert_eq!(DataType::from_name(""), DataType::Varchar);
        assert_eq!(
            DataType::from_name("character varying"),
            DataType::Other("CHARACTER VARYING".to_string())
        );
        assert_eq!(DataType::Other("BIGINT".to_string()).to_string(), "BIGINT");
    }

    #[test]
    fn test_split_length() {
        assert_eq!(split_length("VARCHAR(120)"), ("VARCHAR", Some(120)));
        assert_eq!(split_length("NUMERIC(10,2)"), ("NUMERIC", None));
        assert_eq!(split_length("TEXT"), ("TEXT", None));
    }

    #[test]
    fn test_input_kind() {
        assert_eq!(DataType::Integer.input_kind(), InputKind::Number);
        assert_eq!(DataType::from_name("bigint").input_kind(), InputKind::Number);
        assert_eq!(DataType::Numeric.input_kind(), InputKind::Number);
        assert_eq!(DataType::Boolean.input_kind(), InputKind::Checkbox);
        assert_eq!(DataType::Date.input_kind(), InputKind::Date);
        assert_eq!(DataType::Time.input_kind(), InputKind::Time);
        assert_eq!(DataType::Timestamp.input_kind(), InputKind::DateTimeLocal);
        assert_eq!(
            DataType::from_name("timestamp without time zone").input_kind(),
            InputKind::DateTimeLocal
        );
        assert_eq!(DataType::Text.input_kind(), InputKind::Text);
        assert_eq!(InputKind::DateTimeLocal.html_type(), "datetime-local");
    }

    #[test]
    fn test_information_schema_metadata() {
        let info = json!({
            "column_name": "email",
            "data_type": "character varying",
            "is_nullable": "NO",
            "character_maximum_length": 255
        });
        let column = ColumnInfo::from_metadata("ignored", &info);
        assert_eq!(column.name, "email");
        assert_eq!(column.data_type.name(), "CHARACTER VARYING");
        assert!(!column.nullable);
        assert_eq!(column.length, Some(255));
        assert!(!column.primary_key);
    }

    #[test]
    fn test_console_metadata() {
        let info = json!({ "type": "integer", "nullable": false, "primaryKey": true });
        let column = ColumnInfo::from_metadata("id", &info);
        assert_eq!(column.name, "id");
        assert_eq!(column.data_type, DataType::Integer);
        assert!(!column.nullable);
        assert!(column.primary_key);
        assert_eq!(column.display_type(), "INTEGER");
    }

    #[test]
    fn test_nullable_defaults_to_true() {
        let column = ColumnInfo::from_metadata("note", &json!({}));
        assert!(column.nullable);
        assert_eq!(column.data_type, DataType::Varchar);

        let column =
            ColumnInfo::from_metadata("note", &json!({ "is_nullable": "YES", "nullable": false }));
        assert!(column.nullable);
    }

    #[test]
    fn test_schema_response_shapes() {
        let wrapped = json!({
            "columns": {
                "id": { "column_name": "id", "data_type": "integer", "primaryKey": true },
                "name": { "column_name": "name", "data_type": "varchar", "character_maximum_length": 50 }
            }
        });
        let bare = json!({
            "id": { "type": "INTEGER", "primaryKey": true },
            "name": { "type": "VARCHAR", "length": 50 }
        });

        for body in [wrapped, bare] {
            let schema = TableSchema::from_response("users", &body).unwrap();
            assert_eq!(schema.table, "users");
            assert_eq!(schema.column_names().collect::<Vec<_>>(), vec!["id", "name"]);
            assert_eq!(schema.primary_keys().count(), 1);
            assert_eq!(schema.column("name").unwrap().display_type(), "VARCHAR(50)");
        }
    }

    #[test]
    fn test_column_named_columns_is_not_a_wrapper() {
        let body = json!({
            "columns": { "data_type": "text" },
            "id": { "data_type": "integer" }
        });
        let schema = TableSchema::from_response("layouts", &body).unwrap();
        assert_eq!(schema.column_names().collect::<Vec<_>>(), vec!["columns", "id"]);
        assert_eq!(schema.columns[0].data_type, DataType::Text);
    }

    #[test]
    fn test_schema_rejects_non_object() {
        let err = TableSchema::from_response("users", &json!(["id"])).unwrap_err();
        assert!(matches!(err, Error::Decode(_)));
    }

    #[test]
    fn test_all_schemas_and_summary() {
        let body = json!({
            "users": { "id": { "type": "INTEGER" }, "name": { "type": "TEXT" } },
            "orders": { "columns": { "id": { "type": "INTEGER" } } }
        });
        let schemas = TableSchema::all_from_response(&body).unwrap();
        assert_eq!(schemas.len(), 2);
        assert_eq!(schemas[1].table, "orders");

        let tables = vec!["users".to_string(), "orders".to_string()];
        let summary = SchemaSummary::from_parts(&tables, &schemas);
        assert_eq!(summary.total_tables, 2);
        assert_eq!(summary.total_columns, 3);
    }

    #[test]
    fn test_column_definition_payload() {
        let definition = ColumnDefinition {
            name: "title".to_string(),
            data_type: DataType::Varchar,
            length: Some(120),
            primary_key: false,
            nullable: true,
        };
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({ "name": "title", "type": "VARCHAR", "length": 120, "primaryKey": false, "nullable": true })
        );

        let definition = ColumnDefinition::from(&ColumnInfo::new("body", DataType::Text));
        assert_eq!(
            serde_json::to_value(&definition).unwrap(),
            json!({ "name": "body", "type": "TEXT", "primaryKey": false, "nullable": true })
        );
    }
}
