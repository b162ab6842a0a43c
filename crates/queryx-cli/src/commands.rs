//! Console line dispatch and dot-command handling.

use crate::executor::{self, ExecuteError};
use crate::formatter::{self, Formatter, OutputFormat};
use queryx_client::{Client, ClientConfig};

/// How lines without a leading dot are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryMode {
    /// Lines are SQL statements.
    Sql,
    /// Lines are natural-language questions.
    Ai,
}

impl std::fmt::Display for QueryMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            QueryMode::Sql => write!(f, "sql"),
            QueryMode::Ai => write!(f, "ai"),
        }
    }
}

/// Console state shared by every mode.
pub struct Session {
    pub client: Client,
    pub format: OutputFormat,
    pub mode: QueryMode,
    /// Tables AI questions are asked about.
    pub ai_tables: Vec<String>,
}

impl Session {
    pub fn new(client: Client, format: OutputFormat) -> Self {
        Self {
            client,
            format,
            mode: QueryMode::Sql,
            ai_tables: Vec::new(),
        }
    }

    fn formatter(&self) -> Box<dyn Formatter> {
        formatter::create_formatter(self.format)
    }

    fn finish(&self, result: Result<String, ExecuteError>) -> CommandResult {
        match result {
            Ok(output) => CommandResult::Output(output),
            Err(e) => CommandResult::Failed(self.formatter().format_error(&e.to_string())),
        }
    }
}

/// Result of executing a command.
#[derive(Debug, PartialEq, Eq)]
pub enum CommandResult {
    /// Continue the REPL.
    Continue,
    /// Exit the REPL.
    Exit,
    /// Output to display.
    Output(String),
    /// Output after a change to the set of tables.
    Changed(String),
    /// A formatted error.
    Failed(String),
    /// Show history.
    ShowHistory,
    /// Clear screen.
    Clear,
    /// Drop a table once the user confirms.
    ConfirmDrop(String),
}

/// Run one console line: a dot-command, or a query in the current mode.
pub async fn dispatch(line: &str, session: &mut Session) -> CommandResult {
    let line = line.trim();
    if line.is_empty() {
        return CommandResult::Continue;
    }
    if is_command(line) {
        return handle_command(line, session).await;
    }

    let formatter = session.formatter();
    let result = match session.mode {
        QueryMode::Sql => executor::execute_sql(&session.client, line, &*formatter).await,
        QueryMode::Ai => {
            executor::execute_ai(&session.client, line, &session.ai_tables, &*formatter).await
        }
    };
    session.finish(result)
}

/// Parse and execute a dot-command.
pub async fn handle_command(line: &str, session: &mut Session) -> CommandResult {
    let line = line.trim();
    let parts: Vec<&str> = line.splitn(2, char::is_whitespace).collect();
    let command = parts[0].to_lowercase();
    let arg = parts.get(1).map(|s| s.trim()).filter(|s| !s.is_empty());
    let formatter = session.formatter();
    let client = &session.client;

    match command.as_str() {
        ".exit" | ".quit" | ".q" => CommandResult::Exit,

        ".help" | ".h" | ".?" => CommandResult::Output(get_help()),

        ".clear" | ".cls" => CommandResult::Clear,

        ".history" => CommandResult::ShowHistory,

        ".status" => {
            let reachable = match client.ping().await {
                Ok(()) => "reachable".to_string(),
                Err(e) => format!("unreachable ({e})"),
            };
            let tables = if session.ai_tables.is_empty() {
                "none".to_string()
            } else {
                session.ai_tables.join(", ")
            };
            CommandResult::Output(format!(
                "API:       {} ({})\nMode:      {}\nFormat:    {}\nAI tables: {}",
                client.base_url(),
                reachable,
                session.mode,
                session.format,
                tables
            ))
        }

        ".connect" => {
            let Some(url) = arg else {
                return CommandResult::Output("Usage: .connect <url>".to_string());
            };
            let config = ClientConfig::new(url).with_timeout(client.config().timeout);
            match Client::new(config) {
                Ok(new_client) => {
                    let message = match new_client.ping().await {
                        Ok(()) => format!("Connected to {}", new_client.base_url()),
                        Err(e) => format!(
                            "Using {} (server not answering: {})",
                            new_client.base_url(),
                            e
                        ),
                    };
                    tracing::info!(url = %new_client.base_url(), "switched API server");
                    session.client = new_client;
                    session.ai_tables.clear();
                    CommandResult::Changed(message)
                }
                Err(e) => CommandResult::Failed(formatter.format_error(&e.to_string())),
            }
        }

        ".format" => {
            if let Some(fmt) = arg {
                match fmt.to_lowercase().as_str() {
                    "table" => session.format = OutputFormat::Table,
                    "json" => session.format = OutputFormat::Json,
                    "csv" => session.format = OutputFormat::Csv,
                    _ => {
                        return CommandResult::Output(format!(
                            "Unknown format '{}'. Use: table, json, csv",
                            fmt
                        ))
                    }
                }
                CommandResult::Output(format!("Output format set to {}", session.format))
            } else {
                CommandResult::Output(format!("Current format: {}", session.format))
            }
        }

        ".mode" => match arg.map(str::to_lowercase).as_deref() {
            Some("sql") | Some("human") => {
                session.mode = QueryMode::Sql;
                CommandResult::Output("Lines now run as SQL".to_string())
            }
            Some("ai") => {
                session.mode = QueryMode::Ai;
                let hint = if session.ai_tables.is_empty() {
                    " (select tables with .use t1,t2)"
                } else {
                    ""
                };
                CommandResult::Output(format!("Lines now run as AI questions{hint}"))
            }
            Some(other) => CommandResult::Output(format!("Unknown mode '{other}'. Use: sql, ai")),
            None => CommandResult::Output(format!("Current mode: {}", session.mode)),
        },

        ".use" => {
            let Some(list) = arg else {
                return CommandResult::Output("Usage: .use <table>[,<table>...]".to_string());
            };
            session.ai_tables = executor::split_tables(list);
            CommandResult::Output(format!("AI tables: {}", session.ai_tables.join(", ")))
        }

        ".examples" => CommandResult::Output(executor::examples()),

        ".dashboard" => session.finish(executor::dashboard(client, &*formatter).await),

        ".tables" => match executor::list_tables(client, &*formatter).await {
            Ok(output) => CommandResult::Changed(output),
            Err(e) => session.finish(Err(e)),
        },

        ".schema" => session.finish(executor::describe(client, arg, &*formatter).await),

        ".sql" => match arg {
            Some(sql) => session.finish(executor::execute_sql(client, sql, &*formatter).await),
            None => CommandResult::Output("Usage: .sql <query>".to_string()),
        },

        ".ai" => {
            let Some(arg) = arg else {
                return CommandResult::Output("Usage: .ai [t1,t2] <question>".to_string());
            };
            let (tables, question) = executor::parse_ai_args(arg, &session.ai_tables);
            session.finish(executor::execute_ai(client, &question, &tables, &*formatter).await)
        }

        ".create" => changed(session, executor::create_table(client, arg.unwrap_or(""), &*formatter).await),

        ".alter" => session.finish(executor::alter_table(client, arg.unwrap_or(""), &*formatter).await),

        ".insert" => session.finish(executor::insert_row(client, arg.unwrap_or(""), &*formatter).await),

        ".drop" => {
            let mut words = arg.unwrap_or("").split_whitespace();
            let Some(table) = words.next() else {
                return CommandResult::Output("Usage: .drop <table> [--force]".to_string());
            };
            if words.any(|w| w == "--force" || w == "-y") {
                drop_table(session, table).await
            } else {
                CommandResult::ConfirmDrop(table.to_string())
            }
        }

        _ => CommandResult::Output(format!("Unknown command: {}", command)),
    }
}

/// Drop a table without asking.
pub async fn drop_table(session: &Session, table: &str) -> CommandResult {
    let formatter = session.formatter();
    changed(session, executor::drop_table(&session.client, table, &*formatter).await)
}

fn changed(session: &Session, result: Result<String, ExecuteError>) -> CommandResult {
    match session.finish(result) {
        CommandResult::Output(output) => CommandResult::Changed(output),
        other => other,
    }
}

/// Check if a line is a dot-command.
pub fn is_command(line: &str) -> bool {
    line.trim().starts_with('.')
}

/// Get help text for REPL commands.
fn get_help() -> String {
    r#"Console Commands
================

.dashboard                      Show table and column totals
.tables                         List all tables
.schema [table]                 Describe one table, or all of them
.create <table> <col-spec>...   Create a table
.alter <table> <col-spec>...    Replace a table's columns
.drop <table> [--force]         Delete a table (asks for confirmation)
.insert <table> <col>=<val>...  Insert one row
.sql <query>                    Run a SQL statement
.ai [t1,t2] <question>          Ask a question in plain language
.mode [sql|ai]                  Get or set how plain lines are run
.use <t1>[,<t2>...]             Select the tables AI questions are about
.examples                       Show example queries and questions
.connect <url>                  Switch to another API server
.status                         Show API server, mode and format
.format [table|json|csv]        Get or set output format
.history                        Show command history
.clear                          Clear the screen
.help                           Show this help message
.exit / .quit                   Exit the console

Column specs
============
name:TYPE[(len)][:pk][:notnull]

Examples:
  .create users id:INTEGER:pk name:VARCHAR(100):notnull active:BOOLEAN
  .insert users id=1 name=Alice active=true
  SELECT * FROM users LIMIT 10
"#
    .to_string()
}
