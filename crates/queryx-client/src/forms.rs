//! Form state shared by the consoles.
//!
//! A [`TableForm`] backs the create/update table editor and a [`RowForm`]
//! backs row insertion. Both hold raw user input and only turn it into request
//! payloads on submit, where blank entries are dropped and typed cells are
//! coerced to JSON values.

use std::collections::HashMap;
use std::str::FromStr;

use serde::Serialize;
use serde_json::{Number, Value};

use crate::error::Error;
use crate::schema::{
    split_length, ColumnDefinition, ColumnInfo, DataType, TableSchema, DEFAULT_LENGTH,
};
use crate::Result;

/// One row of the column editor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnDraft {
    pub name: String,
    pub data_type: DataType,
    pub length: u32,
    pub primary_key: bool,
    pub nullable: bool,
}

impl Default for ColumnDraft {
    fn default() -> Self {
        Self {
            name: String::new(),
            data_type: DataType::Varchar,
            length: DEFAULT_LENGTH,
            primary_key: false,
            nullable: true,
        }
    }
}

impl ColumnDraft {
    /// Create a draft with the editor defaults.
    pub fn new(name: impl Into<String>, data_type: DataType) -> Self {
        Self {
            name: name.into(),
            data_type,
            ..Default::default()
        }
    }

    /// Whether the name field is blank.
    pub fn is_blank(&self) -> bool {
        self.name.trim().is_empty()
    }

    /// Build the request item. Every column carries its length, whether or
    /// not the type uses one.
    pub fn to_definition(&self) -> ColumnDefinition {
        ColumnDefinition {
            name: self.name.trim().to_string(),
            data_type: self.data_type.clone(),
            length: Some(self.length),
            primary_key: self.primary_key,
            nullable: self.nullable,
        }
    }
}

impl From<&ColumnInfo> for ColumnDraft {
    fn from(info: &ColumnInfo) -> Self {
        Self {
            name: info.name.clone(),
            data_type: info.data_type.clone(),
            length: info.length.unwrap_or(DEFAULT_LENGTH),
            primary_key: info.primary_key,
            nullable: info.nullable,
        }
    }
}

/// Parse the compact `name:TYPE[(len)][:pk][:notnull|:null]` column spec.
///
/// ```
/// use queryx_client::{ColumnDraft, DataType};
///
/// let column: ColumnDraft = "title:VARCHAR(120):notnull".parse().unwrap();
/// assert_eq!(column.name, "title");
/// assert_eq!(column.data_type, DataType::Varchar);
/// assert_eq!(column.length, 120);
/// assert!(!column.nullable);
/// ```
impl FromStr for ColumnDraft {
    type Err = Error;

    fn from_str(spec: &str) -> Result<Self> {
        let mut parts = spec.split(':');
        let name = parts.next().unwrap_or_default().trim();
        if name.is_empty() {
            return Err(Error::validation(format!("column spec '{spec}' has no name")));
        }

        let mut draft = ColumnDraft::new(name, DataType::Varchar);
        if let Some(type_spec) = parts.next() {
            let (base, length) = split_length(type_spec);
            draft.data_type = DataType::from_name(base);
            if let Some(length) = length {
                draft.length = length;
            }
        }

        for flag in parts {
            match flag.trim().to_lowercase().as_str() {
                "pk" | "primary" | "primarykey" => {
                    draft.primary_key = true;
                    draft.nullable = false;
                }
                "notnull" | "not_null" | "required" => draft.nullable = false,
                "null" | "nullable" => draft.nullable = true,
                other => {
                    return Err(Error::validation(format!(
                        "unknown column flag '{other}' in '{spec}' (use pk, notnull, null)"
                    )))
                }
            }
        }

        Ok(draft)
    }
}

/// Create/update table editor state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableForm {
    pub table_name: String,
    pub columns: Vec<ColumnDraft>,
}

impl Default for TableForm {
    fn default() -> Self {
        Self::new()
    }
}

impl TableForm {
    /// An empty form with one blank column.
    pub fn new() -> Self {
        Self {
            table_name: String::new(),
            columns: vec![ColumnDraft::default()],
        }
    }

    /// A form prefilled from an existing schema, for editing.
    pub fn for_table(schema: &TableSchema) -> Self {
        let mut columns: Vec<ColumnDraft> =
            schema.columns.iter().map(ColumnDraft::from).collect();
        if columns.is_empty() {
            columns.push(ColumnDraft::default());
        }
        Self {
            table_name: schema.table.clone(),
            columns,
        }
    }

    /// Append a blank column.
    pub fn add_column(&mut self) {
        self.columns.push(ColumnDraft::default());
    }

    /// Remove a column. The last remaining column is never removed.
    pub fn remove_column(&mut self, index: usize) -> bool {
        if self.columns.len() <= 1 || index >= self.columns.len() {
            return false;
        }
        self.columns.remove(index);
        true
    }

    /// Mutable access to one column.
    pub fn column_mut(&mut self, index: usize) -> Option<&mut ColumnDraft> {
        self.columns.get_mut(index)
    }

    /// Back to an empty form.
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    /// Validated table name.
    pub fn table(&self) -> Result<&str> {
        let name = self.table_name.trim();
        if name.is_empty() {
            return Err(Error::validation("Please enter a table name"));
        }
        Ok(name)
    }

    /// Column definitions to submit. Blank-named columns are dropped.
    pub fn to_definitions(&self) -> Result<Vec<ColumnDefinition>> {
        let definitions: Vec<ColumnDefinition> = self
            .columns
            .iter()
            .filter(|c| !c.is_blank())
            .map(ColumnDraft::to_definition)
            .collect();

        if definitions.is_empty() {
            return Err(Error::validation("Please add at least one column"));
        }
        Ok(definitions)
    }
}

/// Raw text typed for one row, keyed by column name.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowBuffer {
    cells: HashMap<String, String>,
}

impl RowBuffer {
    /// Text entered for a column, empty when untouched.
    pub fn get(&self, column: &str) -> &str {
        self.cells.get(column).map(String::as_str).unwrap_or("")
    }

    fn set(&mut self, column: &str, text: impl Into<String>) {
        self.cells.insert(column.to_string(), text.into());
    }

    /// Whether every cell is empty.
    pub fn is_empty(&self) -> bool {
        self.cells.values().all(|v| v.is_empty())
    }
}

/// One cell of an insert request.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CellValue {
    pub name: String,
    pub value: Value,
}

/// Row insertion form for one table.
#[derive(Debug, Clone, PartialEq)]
pub struct RowForm {
    schema: TableSchema,
    rows: Vec<RowBuffer>,
}

impl RowForm {
    /// A form with one empty row.
    pub fn new(schema: TableSchema) -> Self {
        Self {
            schema,
            rows: vec![RowBuffer::default()],
        }
    }

    /// Target table.
    pub fn table(&self) -> &str {
        &self.schema.table
    }

    /// Schema the rows are typed against.
    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Current row buffers.
    pub fn rows(&self) -> &[RowBuffer] {
        &self.rows
    }

    /// Append an empty row.
    pub fn add_row(&mut self) {
        self.rows.push(RowBuffer::default());
    }

    /// Remove a row. The last remaining row is never removed.
    pub fn remove_row(&mut self, index: usize) -> bool {
        if self.rows.len() <= 1 || index >= self.rows.len() {
            return false;
        }
        self.rows.remove(index);
        true
    }

    /// Set the text of one cell in an existing row.
    pub fn set(&mut self, row: usize, column: &str, text: impl Into<String>) -> Result<()> {
        if self.schema.column(column).is_none() {
            return Err(Error::validation(format!(
                "table '{}' has no column '{}'",
                self.schema.table, column
            )));
        }
        let count = self.rows.len();
        let buffer = self
            .rows
            .get_mut(row)
            .ok_or_else(|| Error::validation(format!("row {row} is out of range ({count} rows)")))?;
        buffer.set(column, text);
        Ok(())
    }

    /// Back to one empty row.
    pub fn reset(&mut self) {
        self.rows = vec![RowBuffer::default()];
    }

    /// Coerce every row into the insert payload, cells in schema order.
    pub fn to_payload(&self) -> Result<Vec<Vec<CellValue>>> {
        self.rows
            .iter()
            .map(|row| {
                self.schema
                    .columns
                    .iter()
                    .map(|column| -> Result<CellValue> {
                        let value = coerce(row.get(&column.name), &column.data_type).map_err(
                            |e| Error::validation(format!("{}: {}", column.name, e)),
                        )?;
                        Ok(CellValue {
                            name: column.name.clone(),
                            value,
                        })
                    })
                    .collect::<Result<Vec<_>>>()
            })
            .collect()
    }
}

/// Convert form text to the JSON value sent for a column type.
///
/// Empty text is null. Integer and floating point types must parse; boolean
/// types are true for `true` or `1` and false otherwise; every other type
/// keeps the text as is.
pub fn coerce(text: &str, data_type: &DataType) -> Result<Value> {
    if text.is_empty() {
        return Ok(Value::Null);
    }

    if data_type.is_integer() {
        let n: i64 = text
            .trim()
            .parse()
            .map_err(|_| Error::validation(format!("'{text}' is not a valid {data_type}")))?;
        return Ok(Value::Number(n.into()));
    }

    if data_type.is_float() {
        let n = text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(Number::from_f64)
            .ok_or_else(|| Error::validation(format!("'{text}' is not a valid {data_type}")))?;
        return Ok(Value::Number(n));
    }

    if data_type.is_boolean() {
        let text = text.trim();
        return Ok(Value::Bool(text.eq_ignore_ascii_case("true") || text == "1"));
    }

    Ok(Value::String(text.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn users() -> TableSchema {
        TableSchema {
            table: "users".to_string(),
            columns: vec![
                ColumnInfo {
                    primary_key: true,
                    nullable: false,
                    ..ColumnInfo::new("id", DataType::Integer)
                },
                ColumnInfo::new("name", DataType::Varchar),
                ColumnInfo::new("score", DataType::Numeric),
                ColumnInfo::new("active", DataType::Boolean),
            ],
        }
    }

    #[test]
    fn test_coerce() {
        assert_eq!(coerce("", &DataType::Integer).unwrap(), Value::Null);
        assert_eq!(coerce("", &DataType::Text).unwrap(), Value::Null);
        assert_eq!(coerce("42", &DataType::Integer).unwrap(), json!(42));
        assert_eq!(coerce(" -7 ", &DataType::from_name("bigint")).unwrap(), json!(-7));
        assert_eq!(coerce("3.5", &DataType::Numeric).unwrap(), json!(3.5));
        assert_eq!(coerce("2", &DataType::from_name("double")).unwrap(), json!(2.0));
        assert_eq!(coerce("true", &DataType::Boolean).unwrap(), json!(true));
        assert_eq!(coerce("TRUE", &DataType::Boolean).unwrap(), json!(true));
        assert_eq!(coerce("1", &DataType::from_name("bool")).unwrap(), json!(true));
        assert_eq!(coerce("no", &DataType::Boolean).unwrap(), json!(false));
        assert_eq!(coerce(" padded ", &DataType::Text).unwrap(), json!(" padded "));
        assert_eq!(coerce("2024-01-31", &DataType::Date).unwrap(), json!("2024-01-31"));
    }

    #[test]
    fn test_coerce_rejects_bad_numbers() {
        assert!(matches!(coerce("abc", &DataType::Integer), Err(Error::Validation(_))));
        assert!(matches!(coerce("1.5", &DataType::Integer), Err(Error::Validation(_))));
        assert!(matches!(coerce("NaN", &DataType::Numeric), Err(Error::Validation(_))));
    }

    #[test]
    fn test_column_spec_parsing() {
        let id: ColumnDraft = "id:integer:pk".parse().unwrap();
        assert_eq!(id.data_type, DataType::Integer);
        assert!(id.primary_key);
        assert!(!id.nullable);

        let name: ColumnDraft = "name".parse().unwrap();
        assert_eq!(name.data_type, DataType::Varchar);
        assert_eq!(name.length, DEFAULT_LENGTH);
        assert!(name.nullable);

        assert!(":INTEGER".parse::<ColumnDraft>().is_err());
        assert!("id:INTEGER:unique".parse::<ColumnDraft>().is_err());
    }

    #[test]
    fn test_table_form_keeps_one_column() {
        let mut form = TableForm::new();
        assert_eq!(form.columns.len(), 1);
        assert!(!form.remove_column(0));

        form.add_column();
        assert!(form.remove_column(1));
        assert!(!form.remove_column(5));
        assert_eq!(form.columns.len(), 1);
    }

    #[test]
    fn test_table_form_definitions() {
        let mut form = TableForm::new();
        assert!(matches!(form.table(), Err(Error::Validation(_))));
        assert!(matches!(form.to_definitions(), Err(Error::Validation(_))));

        form.table_name = "  posts ".to_string();
        form.column_mut(0).unwrap().name = "title".to_string();
        form.add_column();
        form.add_column();
        if let Some(column) = form.column_mut(2) {
            column.name = " views ".to_string();
            column.data_type = DataType::Integer;
        }

        assert_eq!(form.table().unwrap(), "posts");
        let definitions = form.to_definitions().unwrap();
        assert_eq!(definitions.len(), 2);
        assert_eq!(definitions[0].length, Some(DEFAULT_LENGTH));
        assert_eq!(definitions[1].name, "views");
        assert_eq!(definitions[1].length, Some(DEFAULT_LENGTH));

        form.reset();
        assert_eq!(form, TableForm::new());
    }

    #[test]
    fn test_table_form_from_schema() {
        let form = TableForm::for_table(&users());
        assert_eq!(form.table_name, "users");
        assert_eq!(form.columns.len(), 4);
        assert!(form.columns[0].primary_key);
        assert_eq!(form.columns[1].length, DEFAULT_LENGTH);
    }

    #[test]
    fn test_row_form_payload() {
        let mut form = RowForm::new(users());
        form.set(0, "id", "1").unwrap();
        form.set(0, "name", "Alice").unwrap();
        form.set(0, "active", "true").unwrap();
        form.add_row();
        form.set(1, "id", "2").unwrap();
        form.set(1, "score", "9.5").unwrap();
        assert_eq!(form.rows().len(), 2);

        let payload = form.to_payload().unwrap();
        assert_eq!(
            serde_json::to_value(&payload).unwrap(),
            json!([
                [
                    { "name": "id", "value": 1 },
                    { "name": "name", "value": "Alice" },
                    { "name": "score", "value": null },
                    { "name": "active", "value": true }
                ],
                [
                    { "name": "id", "value": 2 },
                    { "name": "name", "value": null },
                    { "name": "score", "value": 9.5 },
                    { "name": "active", "value": null }
                ]
            ])
        );
    }

    #[test]
    fn test_row_form_errors_name_the_column() {
        let mut form = RowForm::new(users());
        assert!(form.set(0, "missing", "x").is_err());

        form.set(0, "id", "one").unwrap();
        let err = form.to_payload().unwrap_err();
        assert!(err.to_string().starts_with("id: "));
    }

    #[test]
    fn test_row_form_rows() {
        let mut form = RowForm::new(users());
        assert!(!form.remove_row(0));
        assert!(form.set(1, "name", "Bob").is_err());
        assert_eq!(form.rows().len(), 1);
        form.add_row();
        form.set(1, "name", "Bob").unwrap();
        assert!(form.remove_row(0));
        assert_eq!(form.rows()[0].get("name"), "Bob");

        form.reset();
        assert_eq!(form.rows().len(), 1);
        assert!(form.rows()[0].is_empty());
    }
}
