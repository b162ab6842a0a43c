//! Interactive REPL implementation.

use crate::commands::{self, CommandResult, QueryMode, Session};
use crate::completer::QueryxHelper;
use rustyline::error::ReadlineError;
use rustyline::history::{DefaultHistory, History};
use rustyline::{Config, Editor};
use std::path::PathBuf;

/// Get the history file path.
fn history_path() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".queryx_history")
}

fn prompt(session: &Session) -> &'static str {
    match session.mode {
        QueryMode::Sql => "queryx> ",
        QueryMode::Ai => "queryx (ai)> ",
    }
}

/// Fetch table names for completion. Failures leave the cache as it was.
async fn refresh_tables(session: &Session, rl: &mut Editor<QueryxHelper, DefaultHistory>) {
    match session.client.list_tables().await {
        Ok(tables) => {
            if let Some(helper) = rl.helper_mut() {
                helper.set_tables(tables);
            }
        }
        Err(e) => tracing::debug!(error = %e, "could not refresh table names"),
    }
}

/// Run the interactive REPL.
pub async fn run(mut session: Session) -> anyhow::Result<()> {
    match session.client.ping().await {
        Ok(()) => println!("Connected to {}", session.client.base_url()),
        Err(e) => {
            println!(
                "Warning: Could not reach {}: {}",
                session.client.base_url(),
                e
            );
            println!("Use .connect <url> to switch servers.\n");
        }
    }

    // Set up rustyline
    let rl_config = Config::builder()
        .history_ignore_space(true)
        .auto_add_history(true)
        .build();

    let mut rl: Editor<QueryxHelper, DefaultHistory> = Editor::with_config(rl_config)?;
    rl.set_helper(Some(QueryxHelper::new()));
    refresh_tables(&session, &mut rl).await;

    // Load history
    let hist_path = history_path();
    if hist_path.exists() {
        let _ = rl.load_history(&hist_path);
    }

    println!("QueryX console - Type .help for commands, .exit to quit\n");

    // Main REPL loop
    loop {
        match rl.readline(prompt(&session)) {
            Ok(line) => {
                let line = line.trim();
                if line.is_empty() {
                    continue;
                }

                match commands::dispatch(line, &mut session).await {
                    CommandResult::Continue => {}
                    CommandResult::Exit => {
                        println!("Goodbye!");
                        break;
                    }
                    CommandResult::Output(msg) => println!("{}", msg),
                    CommandResult::Failed(msg) => println!("{}", msg),
                    CommandResult::Changed(msg) => {
                        println!("{}", msg);
                        refresh_tables(&session, &mut rl).await;
                    }
                    CommandResult::ShowHistory => {
                        let history = rl.history();
                        let len = history.len();
                        let start = len.saturating_sub(20);
                        for (i, entry) in history.iter().skip(start).enumerate() {
                            println!("{:4}  {}", start + i + 1, entry);
                        }
                    }
                    CommandResult::Clear => {
                        // ANSI clear screen
                        print!("\x1B[2J\x1B[1;1H");
                    }
                    CommandResult::ConfirmDrop(table) => {
                        let question = format!(
                            "Are you sure you want to delete table \"{}\"? [y/N] ",
                            table
                        );
                        let confirmed = matches!(
                            rl.readline(&question).map(|a| a.trim().to_lowercase()).as_deref(),
                            Ok("y") | Ok("yes")
                        );
                        if !confirmed {
                            println!("Cancelled");
                            continue;
                        }
                        match commands::drop_table(&session, &table).await {
                            CommandResult::Changed(msg) => {
                                println!("{}", msg);
                                refresh_tables(&session, &mut rl).await;
                            }
                            CommandResult::Failed(msg) | CommandResult::Output(msg) => {
                                println!("{}", msg)
                            }
                            _ => {}
                        }
                    }
                }
            }
            Err(ReadlineError::Interrupted) => {
                println!("^C");
                continue;
            }
            Err(ReadlineError::Eof) => {
                println!("Goodbye!");
                break;
            }
            Err(err) => {
                println!("Error: {:?}", err);
                break;
            }
        }
    }

    // Save history
    let _ = rl.save_history(&hist_path);

    Ok(())
}
