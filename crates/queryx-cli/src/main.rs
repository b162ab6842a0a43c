//! QueryX Command-Line Console
//!
//! A terminal console for browsing and managing a QueryX database backend:
//! tables, schemas, row inserts, SQL and natural-language queries.

mod commands;
mod completer;
mod executor;
mod formatter;
mod repl;

use anyhow::Context;
use clap::Parser;
use commands::{CommandResult, Session};
use formatter::OutputFormat;
use queryx_client::config::{API_URL_ENV, DEFAULT_BASE_URL};
use queryx_client::{Client, ClientConfig};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// QueryX Command-Line Console
#[derive(Parser, Debug)]
#[command(name = "queryx")]
#[command(version, about = "QueryX Command-Line Console")]
pub struct Args {
    /// Base URL of the QueryX API server
    #[arg(short = 'H', long, env = API_URL_ENV, default_value = DEFAULT_BASE_URL)]
    pub api_url: String,

    /// Execute a single command and exit
    #[arg(short = 'c', long)]
    pub command: Option<String>,

    /// Execute commands from file
    #[arg(short = 'f', long)]
    pub file: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Request timeout in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout: u64,
}

impl From<&Args> for ClientConfig {
    fn from(args: &Args) -> Self {
        ClientConfig::new(&args.api_url).with_timeout(Duration::from_secs(args.timeout))
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "queryx_cli=warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = Args::parse();
    let client = Client::new(ClientConfig::from(&args)).context("invalid API server URL")?;
    let session = Session::new(client, args.format);

    // Determine which mode to run in
    if let Some(command) = &args.command {
        run_command_mode(session, command).await
    } else if let Some(file) = &args.file {
        run_script_mode(session, file).await
    } else {
        repl::run(session).await
    }
}

/// Execute a single command and exit.
async fn run_command_mode(mut session: Session, command: &str) -> anyhow::Result<()> {
    match commands::dispatch(command, &mut session).await {
        CommandResult::Failed(msg) => {
            eprintln!("{}", msg);
            std::process::exit(1);
        }
        result => {
            print_result(result);
            Ok(())
        }
    }
}

/// Execute commands from a file, one per line.
async fn run_script_mode(mut session: Session, file: &Path) -> anyhow::Result<()> {
    let content = std::fs::read_to_string(file)
        .with_context(|| format!("cannot read script {}", file.display()))?;

    for statement in script_statements(&content) {
        match commands::dispatch(statement, &mut session).await {
            CommandResult::Exit => break,
            CommandResult::Failed(msg) => {
                // Continue with next statement
                eprintln!("Error executing '{}': {}", statement, msg);
            }
            result => print_result(result),
        }
    }

    Ok(())
}

/// Non-empty lines of a script that are not `--` or `#` comments.
fn script_statements(content: &str) -> impl Iterator<Item = &str> {
    content
        .lines()
        .map(str::trim)
        .filter(|l| !l.is_empty() && !l.starts_with("--") && !l.starts_with('#'))
}

/// Print the outcome of a non-interactive command.
fn print_result(result: CommandResult) {
    match result {
        CommandResult::Output(msg) | CommandResult::Changed(msg) => {
            if !msg.is_empty() {
                println!("{}", msg);
            }
        }
        CommandResult::Failed(msg) => eprintln!("{}", msg),
        CommandResult::ConfirmDrop(table) => {
            eprintln!(
                "Refusing to drop '{}' without confirmation; use .drop {} --force",
                table, table
            );
        }
        CommandResult::ShowHistory => eprintln!("History is only kept in the interactive console"),
        CommandResult::Continue | CommandResult::Exit | CommandResult::Clear => {}
    }
}
