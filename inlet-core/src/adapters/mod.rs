//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - DuckDB for the TransactionStore port
//! - Blocking HTTP client for the StatementExtractor port
//! - settings.json for the TemplateCache port
//! - In-memory doubles for tests and demos

pub mod duckdb;
pub mod extraction;
pub mod memory;
pub mod settings;

#[cfg(test)]
pub mod extraction_mock;
