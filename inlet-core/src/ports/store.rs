//! Transaction store port - persistence abstraction
//!
//! The core pipeline only reads a bounded window of recent history (for
//! duplicate detection) and performs one atomic batch write per import.
//! Implementations (adapters) provide the actual storage.

use crate::domain::result::Result;
use crate::domain::{NewTransaction, StoredTransaction};

/// Maximum number of existing records fetched for duplicate comparison
pub const DUPLICATE_WINDOW: usize = 500;

/// Document store abstraction
pub trait TransactionStore: Send + Sync {
    /// Most recent transactions for a user, newest first, bounded by `limit`.
    ///
    /// Fetched once per import session; staleness against concurrent writes
    /// elsewhere is accepted.
    fn recent_transactions(&self, user_id: &str, limit: usize) -> Result<Vec<StoredTransaction>>;

    /// Persist a batch of records with all-or-nothing semantics.
    ///
    /// Either every record is durably written or none are; no partial commit
    /// may ever become visible. A failed call is safe to retry.
    fn create_many(&self, user_id: &str, records: &[NewTransaction]) -> Result<()>;
}
