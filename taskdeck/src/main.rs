//! `TaskDeck`: personal task tracker.
//!
//! Runs one task command for the configured user against a file-backed
//! store. Configuration via CLI flags, environment variables, or config file
//! (`~/.config/taskdeck/config.toml`).
//!
//! ```bash
//! # List pending tasks (sample tasks are generated on first use)
//! cargo run --bin taskdeck -- --user alice
//!
//! # Add and complete
//! cargo run --bin taskdeck -- --user alice add "Buy milk" -d "Two litres"
//! cargo run --bin taskdeck -- --user alice complete <task-id>
//!
//! # Or via environment variables
//! TASKDECK_USER=alice cargo run -- list --filter all
//! ```

use std::io::{self, BufRead, Write};
use std::path::Path;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_appender::non_blocking::WorkerGuard;

use taskdeck::auth::{AuthProvider, LocalAuth};
use taskdeck::config::{CliArgs, ClientConfig, Command};
use taskdeck::session::TodoSession;
use taskdeck::store::FileStore;
use taskdeck::tasks::{TaskError, TaskRepository};
use taskdeck_proto::draft::TaskDraft;
use taskdeck_proto::task::{Task, TaskFilter, TaskStats};

type Session = TodoSession<FileStore, LocalAuth>;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = CliArgs::parse();

    // Load and resolve configuration (CLI args > env > config file > defaults).
    let config = match ClientConfig::load(&cli) {
        Ok(c) => c,
        Err(e) => {
            eprintln!("Warning: failed to load config file: {e}");
            ClientConfig::default()
        }
    };

    // Logs go to a file so command output stays clean.
    let _log_guard = init_logging(&cli.log_level, cli.log_file.as_deref());

    tracing::info!(data_dir = %config.data_dir.display(), "taskdeck starting");

    let auth = config
        .user_id
        .as_deref()
        .map_or_else(LocalAuth::signed_out, LocalAuth::signed_in);
    let Some(user_id) = auth.current_user_id() else {
        eprintln!("No user signed in. Pass --user or set TASKDECK_USER.");
        return ExitCode::from(2);
    };

    let store = FileStore::new(config.data_dir.clone());
    let repository = Arc::new(match config.rng_seed {
        Some(seed) => TaskRepository::with_seed(store, seed),
        None => TaskRepository::new(store),
    });
    let session = TodoSession::new(repository, auth, config.session_config());

    let command = cli.command.unwrap_or(Command::List { filter: None });
    let code = run_command(&session, &user_id, &config, command).await;

    tracing::info!("taskdeck exiting");
    code
}

/// Initialize file-based logging.
///
/// Returns a [`WorkerGuard`] that must be held until shutdown to ensure all
/// buffered log entries are flushed.
fn init_logging(level: &str, file_path: Option<&Path>) -> Option<WorkerGuard> {
    let default_path = std::env::temp_dir().join("taskdeck.log");
    let log_path = file_path.unwrap_or(&default_path);

    let log_dir = log_path.parent()?;
    let file_name = log_path.file_name()?.to_str()?;

    let file_appender = tracing_appender::rolling::never(log_dir, file_name);
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(level));

    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_env_filter(env_filter)
        .with_ansi(false)
        .init();

    Some(guard)
}

async fn run_command(
    session: &Session,
    user_id: &str,
    config: &ClientConfig,
    command: Command,
) -> ExitCode {
    let format = config.timestamp_format.as_str();

    match command {
        Command::List { filter } => {
            session
                .apply_filter(filter.unwrap_or(config.default_filter))
                .await;
            let snapshot = session.snapshot();
            if let Some(error) = snapshot.error {
                eprintln!("{error}");
                return ExitCode::FAILURE;
            }
            if snapshot.tasks.is_empty() {
                println!("No {} tasks.", snapshot.filter);
            }
            for task in &snapshot.tasks {
                println!("{}", task_line(task, format));
            }
            println!("{}", stats_line(&snapshot.stats));
            ExitCode::SUCCESS
        }
        Command::Add { title, description } => {
            let draft = match TaskDraft::new(&title, &description) {
                Ok(draft) => draft,
                Err(e) => return report_error(&TaskError::from(e)),
            };
            if session.add_task(&draft).await {
                println!("Added \"{}\".", draft.title());
                println!("{}", stats_line(&session.snapshot().stats));
                ExitCode::SUCCESS
            } else {
                report_failure(session)
            }
        }
        Command::Show { id } => match session.repository().find_task(user_id, &id).await {
            Ok(task) => {
                println!("{}", task_line(&task, format));
                if !task.description.is_empty() {
                    println!("    {}", task.description);
                }
                ExitCode::SUCCESS
            }
            Err(e) => report_error(&e),
        },
        Command::Complete { ids } => {
            if let Some(code) = load_all(session).await {
                return code;
            }
            let before = session.snapshot().stats.completed;
            if session.complete_selected(&ids).await {
                let after = session.snapshot().stats.completed;
                println!("Completed {} task(s).", after.saturating_sub(before));
                ExitCode::SUCCESS
            } else if session.error().is_some() {
                report_failure(session)
            } else {
                println!("Nothing to complete.");
                ExitCode::SUCCESS
            }
        }
        Command::Delete { ids, yes } => {
            if !yes && !confirm(&format!("Delete {} task(s)?", ids.len())) {
                println!("Aborted.");
                return ExitCode::SUCCESS;
            }
            if let Some(code) = load_all(session).await {
                return code;
            }
            let before = session.snapshot().stats.total;
            if session.delete_selected(&ids).await {
                let after = session.snapshot().stats.total;
                println!("Deleted {} task(s).", before.saturating_sub(after));
                ExitCode::SUCCESS
            } else if session.error().is_some() {
                report_failure(session)
            } else {
                println!("No matching tasks.");
                ExitCode::SUCCESS
            }
        }
        Command::Stats => match session.repository().fetch_task_stats(user_id).await {
            Ok(stats) => {
                println!("{}", stats_line(&stats));
                ExitCode::SUCCESS
            }
            Err(e) => report_error(&e),
        },
        Command::Reset { yes } => {
            if !yes && !confirm(&format!("Delete every task of {user_id}?")) {
                println!("Aborted.");
                return ExitCode::SUCCESS;
            }
            match session.repository().clear_user(user_id).await {
                Ok(()) => {
                    println!("Cleared. Sample tasks are generated again on next use.");
                    ExitCode::SUCCESS
                }
                Err(e) => report_error(&e),
            }
        }
    }
}

/// Loads every task so selection-based commands can see them.
async fn load_all(session: &Session) -> Option<ExitCode> {
    session.apply_filter(TaskFilter::All).await;
    session.error().map(|error| {
        eprintln!("{error}");
        ExitCode::FAILURE
    })
}

fn task_line(task: &Task, format: &str) -> String {
    let mark = if task.is_pending() { ' ' } else { 'x' };
    format!(
        "[{mark}] {}  {}  {}",
        task.id,
        task.created_at.format(format),
        task.title
    )
}

fn stats_line(stats: &TaskStats) -> String {
    format!(
        "{} total, {} pending, {} completed",
        stats.total, stats.pending, stats.completed
    )
}

fn report_failure(session: &Session) -> ExitCode {
    let message = session
        .error()
        .unwrap_or_else(|| "operation failed".to_string());
    eprintln!("{message}");
    ExitCode::FAILURE
}

fn report_error(err: &TaskError) -> ExitCode {
    eprintln!("{err}");
    if matches!(err, TaskError::NotFound(_) | TaskError::InvalidInput(_)) {
        ExitCode::from(2)
    } else {
        ExitCode::FAILURE
    }
}

/// Asks a yes/no question on stdin. Anything but `y`/`yes` declines.
fn confirm(question: &str) -> bool {
    print!("{question} [y/N] ");
    if io::stdout().flush().is_err() {
        return false;
    }
    let mut answer = String::new();
    if io::stdin().lock().read_line(&mut answer).is_err() {
        return false;
    }
    matches!(answer.trim().to_ascii_lowercase().as_str(), "y" | "yes")
}
