use std::fmt::Write;

use axum::response::Html;
use queryx_client::{DataType, TableForm, TableSchema};

use super::{attr, encode, escape, page, Banner, Nav};
use crate::form::Action;

/// Which table the editor writes to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorMode<'a> {
    Create,
    Edit(&'a str),
}

impl EditorMode<'_> {
    fn action_url(&self) -> String {
        match self {
            EditorMode::Create => "/tables/new".to_string(),
            EditorMode::Edit(table) => format!("/tables/{}/edit", encode(table)),
        }
    }
}

/// Table list with an optional schema panel for the selected table.
pub fn list(tables: &[String], selected: Option<&TableSchema>, banner: Option<&Banner>) -> Html<String> {
    let mut body = String::from(
        r#"<h1>Tables</h1><p><a href="/tables/new">+ Create Table</a></p><section class="card">"#,
    );

    if tables.is_empty() {
        body.push_str(r#"<p class="muted empty">No tables found. Create your first table to get started.</p>"#);
    } else {
        let _ = write!(body, "<h2>All Tables ({})</h2><ul>", tables.len());
        for table in tables {
            let current = selected.is_some_and(|s| &s.table == table);
            let _ = write!(
                body,
                r#"<li><a href="/tables?table={}"{}>{}</a></li>"#,
                encode(table),
                if current { r#" class="active""# } else { "" },
                escape(table)
            );
        }
        body.push_str("</ul>");
    }
    body.push_str("</section>");

    if let Some(schema) = selected {
        body.push_str(&schema_panel(schema));
    }

    page("Tables", Nav::Tables, banner, &body)
}

fn schema_panel(schema: &TableSchema) -> String {
    let table = escape(&schema.table);
    let encoded = encode(&schema.table);
    let mut html = format!(
        r#"<section class="card schema"><h2>{table}</h2>
<p><a href="/tables/{encoded}/edit">Edit</a>
<form class="inline" method="post" action="/tables/{encoded}/delete"><button type="submit">Delete</button></form></p>
<table><thead><tr><th>Column</th><th>Type</th><th>Nullable</th><th>Primary Key</th></tr></thead><tbody>"#
    );
    for column in &schema.columns {
        let _ = write!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            escape(&column.name),
            escape(&column.display_type()),
            if column.nullable { "YES" } else { "NO" },
            if column.primary_key { "PK" } else { "" },
        );
    }
    html.push_str("</tbody></table></section>");
    html
}

/// Create or edit form.
pub fn editor(form: &TableForm, mode: EditorMode<'_>, banner: Option<&Banner>) -> Html<String> {
    let (title, submit_label) = match mode {
        EditorMode::Create => ("Create Table".to_string(), "Create Table"),
        EditorMode::Edit(table) => (format!("Edit Table: {table}"), "Update Table"),
    };
    let readonly = attr(matches!(mode, EditorMode::Edit(_)), "readonly");
    let single = form.columns.len() <= 1;

    let mut body = format!(
        r#"<h1>{heading}</h1>
<form class="card editor" method="post" action="{action}">
<button type="submit" name="action" value="submit" tabindex="-1" style="position:absolute;left:-9999px">{submit_label}</button>
<label>Table Name <input type="text" name="table_name" value="{name}" placeholder="e.g. users"{readonly}></label>
<table><thead><tr><th>Column Name</th><th>Type</th><th>Length</th><th>Primary Key</th><th>Nullable</th><th></th></tr></thead><tbody>"#,
        heading = escape(&title),
        action = mode.action_url(),
        name = escape(&form.table_name),
    );

    for (i, column) in form.columns.iter().enumerate() {
        let _ = write!(
            body,
            r#"<tr>
<td><input type="text" name="col{i}_name" value="{name}" placeholder="column_name"></td>
<td><select name="col{i}_type">{options}</select></td>
<td><input type="number" min="1" name="col{i}_length" value="{length}"></td>
<td><input type="checkbox" name="col{i}_pk"{pk}></td>
<td><input type="checkbox" name="col{i}_nullable"{nullable}></td>
<td><button type="submit" name="action" value="{remove}"{disabled}>Remove</button></td>
</tr>"#,
            name = escape(&column.name),
            options = type_options(&column.data_type),
            length = column.length,
            pk = attr(column.primary_key, "checked"),
            nullable = attr(column.nullable, "checked"),
            remove = Action::RemoveColumn(i).value(),
            disabled = attr(single, "disabled"),
        );
    }

    let _ = write!(
        body,
        r#"</tbody></table>
<p class="muted">Length applies to VARCHAR and NUMERIC columns.</p>
<button type="submit" name="action" value="{add}">+ Add Column</button>
<button type="submit" name="action" value="submit">{submit_label}</button>
<a href="/tables">Cancel</a>
</form>"#,
        add = Action::AddColumn.value(),
    );

    page(&title, Nav::Tables, banner, &body)
}

/// `<option>` list for the type select. A server type outside the editable
/// set stays selectable so editing does not silently change it.
fn type_options(current: &DataType) -> String {
    let mut types = DataType::editable().to_vec();
    if !types.contains(current) {
        types.push(current.clone());
    }
    types
        .iter()
        .map(|t| {
            format!(
                r#"<option value="{name}"{selected}>{name}</option>"#,
                name = escape(t.name()),
                selected = attr(t == current, "selected")
            )
        })
        .collect()
}

/// Confirmation step before a table is dropped.
pub fn confirm_delete(table: &str) -> Html<String> {
    let body = format!(
        r#"<h1>Delete Table</h1>
<form class="card" method="post" action="/tables/{encoded}/delete">
<p>Are you sure you want to delete table "{name}"? This cannot be undone.</p>
<input type="hidden" name="confirm" value="yes">
<button type="submit">Delete</button>
<a href="/tables?table={encoded}">Cancel</a>
</form>"#,
        encoded = encode(table),
        name = escape(table),
    );
    page("Delete Table", Nav::Tables, None, &body)
}
