//! CLI smoke entry point.
//!
//! # Responsibility
//! - Provide a minimal executable to verify `momentum_core` linkage.
//! - Optionally summarize an existing task database: `momentum_cli [db_path]`.
//! - Keep output deterministic for quick local sanity checks.

use mockable::{Clock, DefaultClock};
use momentum_core::{compute_stats, open_db, SqliteTaskRepository, TaskRepository};
use std::process::ExitCode;

fn main() -> ExitCode {
    println!("momentum_core ping={}", momentum_core::ping());
    println!("momentum_core version={}", momentum_core::core_version());

    let Some(db_path) = std::env::args().nth(1) else {
        return ExitCode::SUCCESS;
    };

    match summarize(&db_path) {
        Ok(()) => ExitCode::SUCCESS,
        Err(message) => {
            eprintln!("momentum_cli error={message}");
            ExitCode::FAILURE
        }
    }
}

fn summarize(db_path: &str) -> Result<(), String> {
    let conn = open_db(db_path).map_err(|err| err.to_string())?;
    let tasks = SqliteTaskRepository::new(&conn)
        .list_tasks()
        .map_err(|err| err.to_string())?;

    let local_now = DefaultClock.utc().with_timezone(DefaultClock.local().offset());
    let stats = compute_stats(&tasks, local_now);
    println!(
        "tasks total={} completed={} pending={} overdue={} completion_percent={}",
        stats.total, stats.completed, stats.pending, stats.overdue, stats.completion_percent
    );
    let reminders = tasks.iter().filter(|task| task.has_active_reminder()).count();
    println!("reminders active={reminders}");
    Ok(())
}
