//! Logs command - view and manage the event log

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use dialoguer::Confirm;

use inlet_core::{EntryPoint, LoggingService};

use super::get_inlet_dir;
use crate::output;

#[derive(Subcommand)]
pub enum LogsCommands {
    /// Show recent log entries
    List {
        /// Number of entries to show
        #[arg(short, long, default_value = "50")]
        limit: usize,
        /// Show only errors
        #[arg(long)]
        errors: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
    /// Clear old log entries
    Clear {
        /// Delete logs older than N days
        #[arg(long, default_value = "30")]
        older_than_days: u64,
        /// Skip confirmation prompt
        #[arg(long, short = 'f')]
        force: bool,
    },
    /// Show log statistics and database path
    Stats {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

fn get_logging_service() -> Result<LoggingService> {
    let inlet_dir = get_inlet_dir();
    std::fs::create_dir_all(&inlet_dir)?;
    LoggingService::new(&inlet_dir, EntryPoint::Cli, env!("CARGO_PKG_VERSION"))
}

fn format_timestamp(timestamp_ms: i64) -> String {
    use chrono::{TimeZone, Utc};
    Utc.timestamp_millis_opt(timestamp_ms)
        .single()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| timestamp_ms.to_string())
}

pub fn run(command: LogsCommands) -> Result<()> {
    match command {
        LogsCommands::List { limit, errors, json } => {
            let service = get_logging_service()?;
            let entries = if errors {
                service.get_errors(limit)?
            } else {
                service.get_recent(limit)?
            };

            if json {
                println!("{}", serde_json::to_string_pretty(&entries)?);
                return Ok(());
            }

            if entries.is_empty() {
                println!("No log entries found.");
                return Ok(());
            }

            let mut table = output::create_table();
            table.set_header(vec!["Time", "Event", "Step", "Command", "Error"]);

            for entry in entries {
                let error = entry
                    .error_message
                    .map(|m| m.red().to_string())
                    .unwrap_or_default();

                table.add_row(vec![
                    format_timestamp(entry.timestamp),
                    entry.event,
                    entry.step.unwrap_or_default(),
                    entry.command.unwrap_or_default(),
                    error,
                ]);
            }

            println!("{}", table);
            Ok(())
        }

        LogsCommands::Clear {
            older_than_days,
            force,
        } => {
            let service = get_logging_service()?;

            if !force
                && !Confirm::new()
                    .with_prompt(format!(
                        "Delete log entries older than {} days?",
                        older_than_days
                    ))
                    .default(false)
                    .interact()?
            {
                output::warning("Cancelled");
                return Ok(());
            }

            let cutoff = chrono::Utc::now().timestamp_millis()
                - (older_than_days as i64) * 24 * 60 * 60 * 1000;
            let deleted = service.delete_before(cutoff)?;
            output::success(&format!("Deleted {} log entries", deleted));
            Ok(())
        }

        LogsCommands::Stats { json } => {
            let service = get_logging_service()?;
            let count = service.count()?;

            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "entries": count,
                        "path": service.db_path().display().to_string(),
                    })
                );
                return Ok(());
            }

            println!("Log entries: {}", count);
            println!("Database: {}", service.db_path().display());
            Ok(())
        }
    }
}
