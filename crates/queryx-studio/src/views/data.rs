use std::fmt::Write;

use axum::response::Html;
use queryx_client::{InputKind, RowForm};

use super::{attr, escape, page, Banner, Nav};
use crate::form::Action;

/// Table picker plus, once a table is chosen, the row form.
pub fn render(tables: &[String], form: Option<&RowForm>, banner: Option<&Banner>) -> Html<String> {
    let selected = form.map(RowForm::table);

    let mut options = String::from(r#"<option value="">Choose a table...</option>"#);
    for table in tables {
        let _ = write!(
            options,
            r#"<option value="{name}"{sel}>{name}</option>"#,
            name = escape(table),
            sel = attr(selected == Some(table.as_str()), "selected"),
        );
    }

    let mut body = format!(
        r#"<h1>Insert Data</h1>
<form class="card" method="get" action="/data">
<label for="table">Select Table</label>
<select id="table" name="table">{options}</select>
<button type="submit">Load</button>
</form>"#
    );

    if let Some(form) = form {
        body.push_str(&row_form(form));
    }

    page("Data", Nav::Data, banner, &body)
}

fn row_form(form: &RowForm) -> String {
    let columns = &form.schema().columns;
    let single = form.rows().len() <= 1;

    let mut html = format!(
        r#"<form class="card rows" method="post" action="/data">
<button type="submit" name="action" value="submit" tabindex="-1" style="position:absolute;left:-9999px">Insert</button>
<input type="hidden" name="table" value="{table}">
<input type="hidden" name="rows" value="{rows}">
<table><thead><tr><th>#</th>"#,
        table = escape(form.table()),
        rows = form.rows().len(),
    );
    for column in columns {
        let _ = write!(
            html,
            r#"<th>{}{} <span class="muted">{}</span></th>"#,
            escape(&column.name),
            if column.nullable { "" } else { " *" },
            escape(&column.display_type()),
        );
    }
    html.push_str("<th></th></tr></thead><tbody>");

    for (r, row) in form.rows().iter().enumerate() {
        let _ = write!(html, "<tr><td>{}</td>", r + 1);
        for (c, column) in columns.iter().enumerate() {
            let value = row.get(&column.name);
            let input = match column.data_type.input_kind() {
                InputKind::Checkbox => format!(
                    r#"<input type="checkbox" name="cell{r}_{c}" value="true"{}>"#,
                    attr(value == "true" || value == "1", "checked")
                ),
                kind => format!(
                    r#"<input type="{}" name="cell{r}_{c}" value="{}"{}{}>"#,
                    kind.html_type(),
                    escape(value),
                    if kind == InputKind::Number { r#" step="any""# } else { "" },
                    attr(!column.nullable, "required"),
                ),
            };
            let _ = write!(html, "<td>{input}</td>");
        }
        let _ = write!(
            html,
            r#"<td><button type="submit" name="action" value="{}" formnovalidate{}>Remove</button></td></tr>"#,
            Action::RemoveRow(r).value(),
            attr(single, "disabled"),
        );
    }

    let _ = write!(
        html,
        r#"</tbody></table>
<button type="submit" name="action" value="{}" formnovalidate>+ Add Row</button>
<button type="submit" name="action" value="submit">Insert Data</button>
</form>"#,
        Action::AddRow.value(),
    );
    html
}
