//! Inlet CLI - import bank statements from your terminal

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{import, logs, recent, templates};

/// Inlet - statement import for personal finance
#[derive(Parser)]
#[command(name = "inlet", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Import a bank or card statement
    Import {
        /// Path to the statement file (CSV export or scanned document)
        file: PathBuf,
        /// Owning user id
        #[arg(long, default_value = "local")]
        user: String,
        /// Column name for the transaction date
        #[arg(long)]
        date_column: Option<String>,
        /// Column name for the description/merchant
        #[arg(long)]
        description_column: Option<String>,
        /// Column name for the amount
        #[arg(long)]
        amount_column: Option<String>,
        /// Column name for the category
        #[arg(long)]
        category_column: Option<String>,
        /// Exclude rows flagged as duplicates from the commit
        #[arg(long)]
        skip_duplicates: bool,
        /// Stop after review without writing anything
        #[arg(long)]
        preview: bool,
        /// Skip interactive confirmations
        #[arg(long, short = 'y')]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// List saved column-mapping templates
    Templates {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show recently imported transactions
    Recent {
        /// Owning user id
        #[arg(long, default_value = "local")]
        user: String,
        /// Number of records to show
        #[arg(short, long, default_value = "20")]
        limit: usize,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage the event log
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    let result = run(cli);

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Import {
            file,
            user,
            date_column,
            description_column,
            amount_column,
            category_column,
            skip_duplicates,
            preview,
            yes,
            json,
        } => import::run(
            file,
            &user,
            date_column,
            description_column,
            amount_column,
            category_column,
            skip_duplicates,
            preview,
            yes,
            json,
        ),
        Commands::Templates { json } => templates::run(json),
        Commands::Recent { user, limit, json } => recent::run(&user, limit, json),
        Commands::Logs { command } => logs::run(command),
    }
}
