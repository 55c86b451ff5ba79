//! Inlet Core - statement-import pipeline for personal finance
//!
//! This crate implements the import pipeline following hexagonal architecture:
//!
//! - **domain**: Core entities (StatementTable, ColumnMapping, NormalizedRow, ...)
//! - **ports**: Trait definitions for external dependencies (TransactionStore,
//!   StatementExtractor, TemplateCache)
//! - **services**: Pipeline stages and the import session state machine
//! - **adapters**: Concrete implementations (DuckDB, extraction HTTP client,
//!   settings.json, in-memory doubles)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod log_migrations;
pub mod migrations;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;

use anyhow::Result;

use adapters::duckdb::DuckDbStore;
use adapters::settings::SettingsTemplateCache;
use config::Config;
use ports::StatementExtractor;
use services::ImportSession;

// Re-export commonly used types at crate root
pub use domain::result::Error;
pub use domain::{
    ColumnMapping, NewTransaction, NormalizedRow, StatementTable, StoredTransaction,
    TransactionKind,
};
pub use services::{EntryPoint, ImportStep, LogEvent, LoggingService, SourceFile};

/// Main context for Inlet operations
///
/// The primary entry point for front ends. It holds the store, the template
/// cache, and configuration, and opens import sessions.
pub struct InletContext {
    pub config: Config,
    pub store: Arc<DuckDbStore>,
    pub templates: Arc<SettingsTemplateCache>,
}

impl InletContext {
    /// Create a new Inlet context rooted at the inlet directory
    pub fn new(inlet_dir: &Path) -> Result<Self> {
        let config = Config::load(inlet_dir)?;

        let db_path = inlet_dir.join("inlet.duckdb");
        let store = Arc::new(DuckDbStore::new(&db_path)?);
        store.ensure_schema()?;

        let templates = Arc::new(SettingsTemplateCache::new(inlet_dir));

        Ok(Self {
            config,
            store,
            templates,
        })
    }

    /// Open an import session for a user.
    ///
    /// The extractor is optional: without one, document uploads fail with a
    /// clear error while tabular imports work normally.
    pub fn open_session(
        &self,
        user_id: &str,
        extractor: Option<Arc<dyn StatementExtractor>>,
    ) -> Result<ImportSession> {
        Ok(ImportSession::open(
            self.store.clone(),
            self.templates.clone(),
            extractor,
            user_id,
        )?)
    }
}
