//! DuckDB transaction store implementation

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use duckdb::{params, Connection};
use rust_decimal::Decimal;
use uuid::Uuid;

use crate::domain::result::{Error as DomainError, Result as DomainResult};
use crate::domain::{NewTransaction, StoredTransaction};
use crate::migrations::MIGRATIONS;
use crate::ports::TransactionStore;
use crate::services::MigrationService;

/// Maximum number of retries when the database file is locked
const MAX_RETRIES: u32 = 5;

/// Initial retry delay in milliseconds (doubles each retry: 50, 100, 200, 400, 800ms)
const INITIAL_RETRY_DELAY_MS: u64 = 50;

/// Check if an error message indicates a file locking issue that should be retried
fn is_retryable_error(err_msg: &str) -> bool {
    let lower = err_msg.to_lowercase();
    // Windows error messages
    lower.contains("being used by another process")
        || lower.contains("cannot access the file")
        // Unix/macOS error messages
        || lower.contains("resource temporarily unavailable")
        || lower.contains("database is locked")
        || lower.contains("file is already open")
}

/// Parse a DATE column rendered as VARCHAR
fn parse_date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap_or_default()
}

/// DuckDB-backed transaction store
///
/// The batch write runs inside one explicit transaction, which is the
/// all-or-nothing primitive the commit contract requires.
pub struct DuckDbStore {
    conn: Mutex<Connection>,
    db_path: PathBuf,
}

impl DuckDbStore {
    /// Open the store database.
    ///
    /// Includes retry logic with exponential backoff for file locking
    /// errors, which can occur when the CLI and a desktop shell touch the
    /// database at the same moment.
    pub fn new(db_path: &Path) -> Result<Self> {
        let mut last_error = None;

        for attempt in 0..MAX_RETRIES {
            match Self::try_open_connection(db_path) {
                Ok(conn) => {
                    return Ok(Self {
                        conn: Mutex::new(conn),
                        db_path: db_path.to_path_buf(),
                    });
                }
                Err(e) => {
                    let err_msg = e.to_string();
                    if is_retryable_error(&err_msg) && attempt < MAX_RETRIES - 1 {
                        let delay =
                            Duration::from_millis(INITIAL_RETRY_DELAY_MS * 2u64.pow(attempt));
                        eprintln!(
                            "[inlet] Database busy, retrying in {}ms (attempt {}/{}): {}",
                            delay.as_millis(),
                            attempt + 1,
                            MAX_RETRIES,
                            err_msg
                        );
                        thread::sleep(delay);
                        last_error = Some(e);
                        continue;
                    }
                    return Err(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| {
            anyhow::anyhow!("Failed to open database after {} retries", MAX_RETRIES)
        }))
    }

    /// Attempt to open a database connection (called by new() with retry logic)
    fn try_open_connection(db_path: &Path) -> Result<Connection> {
        // Disable extension autoloading: cached extensions may carry a
        // different code-signing identity on macOS
        let config = duckdb::Config::default().enable_autoload_extension(false)?;
        Ok(Connection::open_with_flags(db_path, config)?)
    }

    /// Ensure database schema exists (runs pending migrations)
    pub fn ensure_schema(&self) -> Result<()> {
        let conn = self.conn.lock().unwrap();
        MigrationService::new(&conn, MIGRATIONS).run_pending()?;
        Ok(())
    }

    /// Full recent records for display front ends, newest first.
    ///
    /// The dedup window goes through the TransactionStore port; this richer
    /// view exists for listings only.
    pub fn list_recent(&self, user_id: &str, limit: usize) -> Result<Vec<NewTransaction>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn.prepare(
            "SELECT transaction_date::VARCHAR, description, amount, category
             FROM sys_transactions
             WHERE user_id = ?
             ORDER BY transaction_date DESC
             LIMIT ?",
        )?;

        let records = stmt
            .query_map(params![user_id, limit as i64], |row| {
                let date_str: String = row.get(0)?;
                let description: String = row.get(1)?;
                let amount: f64 = row.get(2)?;
                let category: String = row.get(3)?;
                Ok((date_str, description, amount, category))
            })?
            .filter_map(|r| r.ok())
            .map(|(date_str, description, amount, category)| {
                NewTransaction::new(
                    parse_date(&date_str),
                    description,
                    Decimal::try_from(amount).unwrap_or_default(),
                    category,
                )
            })
            .collect();

        Ok(records)
    }

    /// Number of stored transactions for a user
    pub fn transaction_count(&self, user_id: &str) -> Result<i64> {
        let conn = self.conn.lock().unwrap();
        let count: i64 = conn.query_row(
            "SELECT COUNT(*) FROM sys_transactions WHERE user_id = ?",
            [user_id],
            |row| row.get(0),
        )?;
        Ok(count)
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }
}

impl TransactionStore for DuckDbStore {
    fn recent_transactions(
        &self,
        user_id: &str,
        limit: usize,
    ) -> DomainResult<Vec<StoredTransaction>> {
        let conn = self.conn.lock().unwrap();
        let mut stmt = conn
            .prepare(
                "SELECT amount, description
                 FROM sys_transactions
                 WHERE user_id = ?
                 ORDER BY transaction_date DESC
                 LIMIT ?",
            )
            .map_err(|e| DomainError::store(e.to_string()))?;

        let transactions = stmt
            .query_map(params![user_id, limit as i64], |row| {
                let amount: f64 = row.get(0)?;
                let description: String = row.get(1)?;
                Ok((amount, description))
            })
            .map_err(|e| DomainError::store(e.to_string()))?
            .filter_map(|r| r.ok())
            .map(|(amount, description)| StoredTransaction {
                amount: Decimal::try_from(amount).unwrap_or_default(),
                description,
            })
            .collect();

        Ok(transactions)
    }

    fn create_many(&self, user_id: &str, records: &[NewTransaction]) -> DomainResult<()> {
        if records.is_empty() {
            return Ok(());
        }

        let conn = self.conn.lock().unwrap();
        let created_at = Utc::now().to_rfc3339();

        // One explicit transaction: either every insert lands or the whole
        // batch rolls back. No partial commit is ever visible.
        conn.execute_batch("BEGIN TRANSACTION")
            .map_err(|e| DomainError::commit(e.to_string()))?;

        for record in records {
            let result = conn.execute(
                "INSERT INTO sys_transactions (transaction_id, user_id, transaction_date,
                                               description, amount, type, category, created_at)
                 VALUES (?, ?, ?, ?, ?, ?, ?, ?)",
                params![
                    Uuid::new_v4().to_string(),
                    user_id,
                    record.date.to_string(),
                    record.description,
                    record.amount.to_string().parse::<f64>().unwrap_or(0.0),
                    record.kind.as_str(),
                    record.category,
                    created_at,
                ],
            );

            if let Err(e) = result {
                let _ = conn.execute_batch("ROLLBACK");
                return Err(DomainError::commit(e.to_string()));
            }
        }

        if let Err(e) = conn.execute_batch("COMMIT") {
            let _ = conn.execute_batch("ROLLBACK");
            return Err(DomainError::commit(e.to_string()));
        }

        Ok(())
    }
}
