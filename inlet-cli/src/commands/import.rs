//! Import command - drive the four-step statement import flow
//!
//! upload -> mapping -> review -> commit, with interactive confirmation at
//! the mapping and review steps unless --yes or --json is given.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::ProgressBar;
use serde::Serialize;

use inlet_core::adapters::extraction::ExtractionClient;
use inlet_core::ports::StatementExtractor;
use inlet_core::services::{select_rows, SourceKind};
use inlet_core::{ColumnMapping, LogEvent, NormalizedRow, SourceFile};

use super::{get_context, get_logger, log_event};
use crate::output;

/// Environment variable holding the extraction service API key
const EXTRACTOR_KEY_ENV: &str = "INLET_EXTRACTOR_KEY";

/// Rows shown in the review preview before eliding
const PREVIEW_ROWS: usize = 10;

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct ImportSummary {
    total: usize,
    valid: usize,
    duplicates: usize,
    selected: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    committed: Option<usize>,
    preview: bool,
}

#[allow(clippy::too_many_arguments)]
pub fn run(
    file: PathBuf,
    user: &str,
    date_column: Option<String>,
    description_column: Option<String>,
    amount_column: Option<String>,
    category_column: Option<String>,
    skip_duplicates: bool,
    preview: bool,
    yes: bool,
    json: bool,
) -> Result<()> {
    let logger = get_logger();
    log_event(&logger, LogEvent::new("import_started").with_command("import"));

    let ctx = get_context()?;
    let mut session = ctx.open_session(user, build_extractor()?)?;

    let content =
        std::fs::read(&file).with_context(|| format!("Failed to read {}", file.display()))?;
    let name = file
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file.display().to_string());
    let source = SourceFile::new(name, content);

    let interactive = !yes && !json && atty::is(atty::Stream::Stdin);

    // Documents block on the extraction service; show progress meanwhile
    let spinner = if source.kind() == SourceKind::Document && !json {
        Some(progress_spinner("Extracting transactions from document..."))
    } else {
        None
    };
    let routed = session.select_file(&source);
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }
    if let Err(e) = routed {
        log_event(
            &logger,
            LogEvent::new("file_rejected")
                .with_step("upload")
                .with_error(e.to_string()),
        );
        return Err(e.into());
    }
    log_event(&logger, LogEvent::new("file_parsed").with_step("upload"));

    // Explicit column flags override the suggested mapping
    if date_column.is_some()
        || description_column.is_some()
        || amount_column.is_some()
        || category_column.is_some()
    {
        let mut mapping = session.mapping().cloned().unwrap_or_default();
        if let Some(col) = date_column {
            mapping.date = Some(col);
        }
        if let Some(col) = description_column {
            mapping.description = Some(col);
        }
        if let Some(col) = amount_column {
            mapping.amount = Some(col);
        }
        if let Some(col) = category_column {
            mapping.category = Some(col);
        }
        session.set_mapping(mapping)?;
    }

    if !json {
        if let Some(mapping) = session.mapping() {
            print_mapping(mapping);
        }
    }

    if interactive
        && !Confirm::new()
            .with_prompt("Use this column mapping?")
            .default(true)
            .interact()?
    {
        output::warning("Import cancelled");
        return Ok(());
    }

    if let Err(e) = session.confirm_mapping() {
        log_event(
            &logger,
            LogEvent::new("mapping_rejected")
                .with_step("mapping")
                .with_error(e.to_string()),
        );
        return Err(e.into());
    }
    log_event(&logger, LogEvent::new("mapping_confirmed").with_step("mapping"));

    if skip_duplicates {
        session.set_skip_duplicates(true)?;
    }

    let (total, valid, duplicates, selected) = {
        let rows = session
            .rows()
            .context("session left the review step unexpectedly")?;
        let total = rows.len();
        let valid = rows.iter().filter(|r| r.is_valid).count();
        let duplicates = rows.iter().filter(|r| r.is_duplicate).count();
        let selected = select_rows(rows, skip_duplicates).len();

        if !json {
            print_review_table(rows);
            println!();
            println!(
                "  {} rows, {} valid, {} flagged as duplicates, {} selected",
                total, valid, duplicates, selected
            );
            println!();
        }
        (total, valid, duplicates, selected)
    };

    if preview {
        if json {
            let summary = ImportSummary {
                total,
                valid,
                duplicates,
                selected,
                committed: None,
                preview: true,
            };
            println!("{}", serde_json::to_string_pretty(&summary)?);
        } else {
            output::warning("PREVIEW MODE - no records were written");
        }
        return Ok(());
    }

    if interactive
        && !Confirm::new()
            .with_prompt(format!("Import {} records?", selected))
            .default(true)
            .interact()?
    {
        output::warning("Import cancelled");
        return Ok(());
    }

    let pb = if !json {
        Some(progress_spinner("Writing records..."))
    } else {
        None
    };
    let result = session.commit();
    if let Some(pb) = pb {
        pb.finish_and_clear();
    }

    match result {
        Ok(count) => {
            log_event(&logger, LogEvent::new("commit_succeeded").with_step("review"));
            if json {
                let summary = ImportSummary {
                    total,
                    valid,
                    duplicates,
                    selected,
                    committed: Some(count),
                    preview: false,
                };
                println!("{}", serde_json::to_string_pretty(&summary)?);
            } else {
                output::success(&format!("Imported {} records", count));
            }
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("commit_failed")
                    .with_step("review")
                    .with_error(e.to_string()),
            );
            Err(e.into())
        }
    }
}

/// Build the HTTP extractor when an API key is configured; tabular imports
/// work without one
fn build_extractor() -> Result<Option<Arc<dyn StatementExtractor>>> {
    match std::env::var(EXTRACTOR_KEY_ENV) {
        Ok(key) if !key.is_empty() => Ok(Some(Arc::new(ExtractionClient::new(&key)?))),
        _ => Ok(None),
    }
}

fn progress_spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    pb
}

fn print_mapping(mapping: &ColumnMapping) {
    output::info("Column mapping:");
    println!("  Date: {}", mapping.date.as_deref().unwrap_or("-"));
    println!(
        "  Description: {}",
        mapping.description.as_deref().unwrap_or("-")
    );
    println!("  Amount: {}", mapping.amount.as_deref().unwrap_or("-"));
    println!("  Category: {}", mapping.category.as_deref().unwrap_or("-"));
    println!();
}

fn print_review_table(rows: &[NormalizedRow]) {
    let mut table = output::create_table();
    table.set_header(vec!["Date", "Description", "Amount", "Category", ""]);

    for row in rows.iter().take(PREVIEW_ROWS) {
        let flag = if !row.is_valid {
            "invalid".red().to_string()
        } else if row.is_duplicate {
            "duplicate".yellow().to_string()
        } else {
            String::new()
        };

        table.add_row(vec![
            row.raw_date.clone(),
            row.description.clone(),
            row.amount
                .map(|a| a.to_string())
                .unwrap_or_else(|| "-".to_string()),
            row.category.clone(),
            flag,
        ]);
    }

    println!("{}", table);

    if rows.len() > PREVIEW_ROWS {
        println!("... and {} more", rows.len() - PREVIEW_ROWS);
    }
}
