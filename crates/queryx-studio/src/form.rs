//! Decoding of the editor forms posted by the studio pages.
//!
//! The pages post flat `application/x-www-form-urlencoded` bodies. Editor
//! rows are encoded in indexed field names: `col{i}_name`, `col{i}_type`,
//! `col{i}_length`, `col{i}_pk`, `col{i}_nullable` for the table editor and
//! `cell{row}_{column}` for the data form. Checkboxes are only present when
//! ticked.

use std::str::FromStr;

use queryx_client::schema::DEFAULT_LENGTH;
use queryx_client::{ColumnDraft, DataType, RowForm, TableForm, TableSchema};

use crate::error::{Result, StudioError};

/// Upper bound on columns in one table editor post.
pub const MAX_COLUMNS: usize = 1000;

/// Upper bound on rows in one data form post.
pub const MAX_ROWS: usize = 1000;

/// Button pressed to submit an editor form.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Action {
    Submit,
    AddColumn,
    RemoveColumn(usize),
    AddRow,
    RemoveRow(usize),
}

impl Action {
    /// The form value for this action.
    pub fn value(self) -> String {
        match self {
            Action::Submit => "submit".to_string(),
            Action::AddColumn => "add_column".to_string(),
            Action::RemoveColumn(i) => format!("remove_column:{i}"),
            Action::AddRow => "add_row".to_string(),
            Action::RemoveRow(i) => format!("remove_row:{i}"),
        }
    }
}

impl FromStr for Action {
    type Err = StudioError;

    fn from_str(s: &str) -> Result<Self> {
        let unknown = || StudioError::UnknownAction(s.to_string());
        match s.split_once(':') {
            None => match s {
                "submit" => Ok(Action::Submit),
                "add_column" => Ok(Action::AddColumn),
                "add_row" => Ok(Action::AddRow),
                _ => Err(unknown()),
            },
            Some((name, index)) => {
                let index = index.parse().map_err(|_| unknown())?;
                match name {
                    "remove_column" => Ok(Action::RemoveColumn(index)),
                    "remove_row" => Ok(Action::RemoveRow(index)),
                    _ => Err(unknown()),
                }
            }
        }
    }
}

/// A decoded form body, fields in submission order.
#[derive(Debug, Clone, Default)]
pub struct FormFields(Vec<(String, String)>);

impl From<Vec<(String, String)>> for FormFields {
    fn from(pairs: Vec<(String, String)>) -> Self {
        Self(pairs)
    }
}

impl FormFields {
    /// First value of a field.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.0
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Every value of a repeated field, such as a multi-select.
    pub fn get_all<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.0
            .iter()
            .filter(move |(key, _)| key == name)
            .map(|(_, value)| value.as_str())
    }

    /// Whether a checkbox was ticked.
    pub fn checked(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// The submitted action. A form sent without pressing a button submits.
    pub fn action(&self) -> Result<Action> {
        self.get("action").map_or(Ok(Action::Submit), str::parse)
    }

    /// Rebuild the table editor state.
    ///
    /// `fixed_name` replaces the posted table name when editing an existing
    /// table.
    pub fn table_form(&self, fixed_name: Option<&str>) -> Result<TableForm> {
        let count = self
            .0
            .iter()
            .filter_map(|(key, _)| column_index(key))
            .max()
            .map_or(0, |max| max + 1);
        if count > MAX_COLUMNS {
            return Err(StudioError::InvalidField(format!(
                "col{}_name: at most {MAX_COLUMNS} columns",
                count - 1
            )));
        }

        let mut form = TableForm::new();
        form.table_name = fixed_name
            .or_else(|| self.get("table_name"))
            .unwrap_or_default()
            .to_string();
        if count == 0 {
            return Ok(form);
        }

        form.columns = (0..count)
            .map(|i| self.column(i))
            .collect::<Result<Vec<_>>>()?;
        Ok(form)
    }

    fn column(&self, i: usize) -> Result<ColumnDraft> {
        let field = |suffix: &str| format!("col{i}_{suffix}");

        let length = match self.get(&field("length")).map(str::trim) {
            None | Some("") => DEFAULT_LENGTH,
            Some(text) => text
                .parse()
                .map_err(|_| StudioError::InvalidField(format!("{}: '{}' is not a length", field("length"), text)))?,
        };

        Ok(ColumnDraft {
            name: self.get(&field("name")).unwrap_or_default().to_string(),
            data_type: DataType::from_name(self.get(&field("type")).unwrap_or_default()),
            length,
            primary_key: self.checked(&field("pk")),
            nullable: self.checked(&field("nullable")),
        })
    }

    /// Rebuild the data form state for a table.
    pub fn row_form(&self, schema: TableSchema) -> Result<RowForm> {
        let rows = match self.get("rows") {
            Some(text) => text
                .parse::<usize>()
                .map_err(|_| StudioError::InvalidField(format!("rows: '{text}' is not a count")))?,
            None => 1,
        };
        if rows > MAX_ROWS {
            return Err(StudioError::InvalidField(format!("rows: at most {MAX_ROWS} rows")));
        }

        let mut form = RowForm::new(schema);
        for _ in 1..rows {
            form.add_row();
        }

        for (key, value) in &self.0 {
            let Some((row, column)) = cell_index(key) else {
                continue;
            };
            if row >= form.rows().len() {
                return Err(StudioError::InvalidField(format!("{key}: row is beyond the row count")));
            }
            let name = form
                .schema()
                .columns
                .get(column)
                .map(|c| c.name.clone())
                .ok_or_else(|| StudioError::InvalidField(key.clone()))?;
            form.set(row, &name, value.as_str())
                .map_err(|e| StudioError::InvalidField(e.to_string()))?;
        }
        Ok(form)
    }
}

/// Index `i` of a `col{i}_name` field.
fn column_index(key: &str) -> Option<usize> {
    key.strip_prefix("col")?.strip_suffix("_name")?.parse().ok()
}

/// `(row, column)` of a `cell{row}_{column}` field.
fn cell_index(key: &str) -> Option<(usize, usize)> {
    let (row, column) = key.strip_prefix("cell")?.split_once('_')?;
    Some((row.parse().ok()?, column.parse().ok()?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use queryx_client::ColumnInfo;

    fn fields(pairs: &[(&str, &str)]) -> FormFields {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect::<Vec<_>>()
            .into()
    }

    #[test]
    fn parses_actions() {
        assert_eq!("submit".parse::<Action>().unwrap(), Action::Submit);
        assert_eq!("remove_column:3".parse::<Action>().unwrap(), Action::RemoveColumn(3));
        assert_eq!("remove_row:0".parse::<Action>().unwrap(), Action::RemoveRow(0));
        assert!("remove_row:x".parse::<Action>().is_err());
        assert!("drop_everything".parse::<Action>().is_err());
        assert_eq!(Action::RemoveColumn(2).value(), "remove_column:2");

        assert_eq!(fields(&[]).action().unwrap(), Action::Submit);
    }

    #[test]
    fn decodes_table_editor() {
        let form = fields(&[
            ("table_name", "posts"),
            ("col0_name", "id"),
            ("col0_type", "INTEGER"),
            ("col0_length", "255"),
            ("col0_pk", "on"),
            ("col1_name", "title"),
            ("col1_type", "VARCHAR"),
            ("col1_length", "120"),
            ("col1_nullable", "on"),
            ("action", "add_column"),
        ])
        .table_form(None)
        .unwrap();

        assert_eq!(form.table_name, "posts");
        assert_eq!(form.columns.len(), 2);
        assert!(form.columns[0].primary_key);
        assert!(!form.columns[0].nullable);
        assert_eq!(form.columns[1].length, 120);
        assert!(form.columns[1].nullable);

        let form = fields(&[("table_name", "ignored"), ("col0_name", "id")])
            .table_form(Some("users"))
            .unwrap();
        assert_eq!(form.table_name, "users");

        let empty = fields(&[("table_name", "t")]).table_form(None).unwrap();
        assert_eq!(empty.columns.len(), 1);

        assert!(fields(&[("col0_name", "id"), ("col0_length", "long")])
            .table_form(None)
            .is_err());
    }

    #[test]
    fn decodes_data_form() {
        let schema = TableSchema {
            table: "users".to_string(),
            columns: vec![
                ColumnInfo::new("id", DataType::Integer),
                ColumnInfo::new("active", DataType::Boolean),
            ],
        };

        let form = fields(&[
            ("table", "users"),
            ("rows", "3"),
            ("cell0_0", "1"),
            ("cell0_1", "true"),
            ("cell2_0", "3"),
        ])
        .row_form(schema.clone())
        .unwrap();

        assert_eq!(form.rows().len(), 3);
        assert_eq!(form.rows()[0].get("active"), "true");
        assert!(form.rows()[1].is_empty());
        assert_eq!(form.rows()[2].get("id"), "3");

        assert!(fields(&[("cell0_9", "x")]).row_form(schema).is_err());
    }

    #[test]
    fn bounds_form_sizes() {
        let schema = TableSchema {
            table: "users".to_string(),
            columns: vec![ColumnInfo::new("id", DataType::Integer)],
        };

        let too_many_rows = fields(&[("rows", "3000000")]).row_form(schema.clone());
        assert!(matches!(too_many_rows, Err(StudioError::InvalidField(_))));

        let stray_cell = fields(&[("rows", "2"), ("cell4000000_0", "1")]).row_form(schema.clone());
        assert!(matches!(stray_cell, Err(StudioError::InvalidField(_))));

        let undeclared_row = fields(&[("cell1_0", "1")]).row_form(schema.clone());
        assert!(matches!(undeclared_row, Err(StudioError::InvalidField(_))));

        let at_limit = fields(&[("rows", "1000"), ("cell999_0", "7")]).row_form(schema).unwrap();
        assert_eq!(at_limit.rows().len(), MAX_ROWS);
        assert_eq!(at_limit.rows()[999].get("id"), "7");

        let too_many_columns = fields(&[("table_name", "t"), ("col2000000_name", "x")]).table_form(None);
        assert!(matches!(too_many_columns, Err(StudioError::InvalidField(_))));

        let form = fields(&[("table_name", "t"), ("col999_name", "last")]).table_form(None).unwrap();
        assert_eq!(form.columns.len(), MAX_COLUMNS);
        assert_eq!(form.columns[999].name, "last");
    }
}
