//! Tab completion for the REPL.

use rustyline::completion::{Completer, Pair};
use rustyline::highlight::Highlighter;
use rustyline::hint::Hinter;
use rustyline::validate::Validator;
use rustyline::{Context, Helper};
use std::borrow::Cow;

/// QueryX REPL helper with completion support.
#[derive(Default)]
pub struct QueryxHelper {
    /// Cached table names from the server.
    pub tables: Vec<String>,
}

impl QueryxHelper {
    /// Create a new helper with an empty table list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Update the table list.
    pub fn set_tables(&mut self, tables: Vec<String>) {
        self.tables = tables;
    }
}

/// Dot-commands for completion.
const DOT_COMMANDS: &[&str] = &[
    ".dashboard",
    ".tables",
    ".schema",
    ".create",
    ".alter",
    ".drop",
    ".insert",
    ".sql",
    ".ai",
    ".mode",
    ".use",
    ".examples",
    ".connect",
    ".status",
    ".format",
    ".history",
    ".clear",
    ".help",
    ".exit",
    ".quit",
];

/// Dot-commands whose first argument is a table name.
const TABLE_COMMANDS: &[&str] = &[".schema", ".alter", ".drop", ".insert", ".use"];

/// Keywords after which a table name is expected.
const TABLE_KEYWORDS: &[&str] = &["FROM", "JOIN", "INTO", "UPDATE", "TABLE"];

/// SQL keywords.
const SQL_KEYWORDS: &[&str] = &[
    "SELECT", "FROM", "WHERE", "AND", "OR", "NOT", "NULL", "IS", "IN", "LIKE", "JOIN", "LEFT",
    "RIGHT", "INNER", "ON", "GROUP", "BY", "ORDER", "HAVING", "LIMIT", "OFFSET", "AS", "DISTINCT",
    "COUNT", "SUM", "AVG", "MIN", "MAX", "INSERT", "INTO", "VALUES", "UPDATE", "SET", "DELETE",
    "ASC", "DESC",
];

impl QueryxHelper {
    fn tables_matching(&self, word: &str) -> Vec<Pair> {
        let prefix = word.to_lowercase();
        self.tables
            .iter()
            .filter(|t| t.to_lowercase().starts_with(&prefix))
            .map(|t| Pair {
                display: t.clone(),
                replacement: t.clone(),
            })
            .collect()
    }
}

impl Completer for QueryxHelper {
    type Candidate = Pair;

    fn complete(
        &self,
        line: &str,
        pos: usize,
        _ctx: &Context<'_>,
    ) -> rustyline::Result<(usize, Vec<Pair>)> {
        let line_to_cursor = &line[..pos];

        // Dot commands at start of line
        if line_to_cursor.trim_start().starts_with('.') && !line_to_cursor.trim_start().contains(' ') {
            let typed = line_to_cursor.trim_start();
            let start = line_to_cursor.len() - typed.len();
            let completions = DOT_COMMANDS
                .iter()
                .filter(|cmd| cmd.starts_with(typed))
                .map(|cmd| Pair {
                    display: cmd.to_string(),
                    replacement: cmd.to_string(),
                })
                .collect();
            return Ok((start, completions));
        }

        // Find the start of the current word
        let word_start = line_to_cursor
            .rfind(|c: char| c.is_whitespace() || c == '(' || c == ',')
            .map(|i| i + 1)
            .unwrap_or(0);
        let word = &line_to_cursor[word_start..];
        let previous: Vec<&str> = line_to_cursor[..word_start].split_whitespace().collect();

        // First argument of a table-taking dot-command, or any `.use` list entry
        if let Some(command) = previous.first().filter(|c| c.starts_with('.')) {
            let expects_table = TABLE_COMMANDS.contains(command)
                && (previous.len() == 1 || *command == ".use");
            let completions = if expects_table {
                self.tables_matching(word)
            } else {
                Vec::new()
            };
            return Ok((word_start, completions));
        }

        // A table name after FROM, JOIN, INTO, UPDATE
        if let Some(last) = previous.last() {
            if TABLE_KEYWORDS.iter().any(|k| k.eq_ignore_ascii_case(last)) {
                return Ok((word_start, self.tables_matching(word)));
            }
        }

        if word.is_empty() {
            return Ok((pos, Vec::new()));
        }

        // SQL keywords keep the case the user is typing in
        let lower = word.chars().all(|c| !c.is_ascii_uppercase());
        let mut completions: Vec<Pair> = SQL_KEYWORDS
            .iter()
            .filter(|kw| kw.starts_with(&word.to_uppercase()))
            .map(|kw| {
                let keyword = if lower { kw.to_lowercase() } else { kw.to_string() };
                Pair {
                    display: keyword.clone(),
                    replacement: keyword,
                }
            })
            .collect();
        completions.extend(self.tables_matching(word));

        Ok((word_start, completions))
    }
}

impl Hinter for QueryxHelper {
    type Hint = String;

    fn hint(&self, _line: &str, _pos: usize, _ctx: &Context<'_>) -> Option<String> {
        None
    }
}

impl Highlighter for QueryxHelper {
    fn highlight<'l>(&self, line: &'l str, _pos: usize) -> Cow<'l, str> {
        Cow::Borrowed(line)
    }

    fn highlight_char(&self, _line: &str, _pos: usize, _kind: rustyline::highlight::CmdKind) -> bool {
        false
    }
}

impl Validator for QueryxHelper {}

impl Helper for QueryxHelper {}
