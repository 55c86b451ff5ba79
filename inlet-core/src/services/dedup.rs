//! Deduplication engine - flag rows that likely already exist in history
//!
//! The comparison is amount-within-epsilon plus case-insensitive description
//! equality. Dates are deliberately excluded: raw date strings from mixed
//! formats cannot be compared reliably without full normalization.

use rust_decimal::Decimal;

use crate::domain::result::Result;
use crate::domain::{NormalizedRow, StoredTransaction};
use crate::ports::{TransactionStore, DUPLICATE_WINDOW};

/// Two amounts closer than this count as the same money value
fn amount_epsilon() -> Decimal {
    Decimal::new(1, 2) // 0.01
}

/// Snapshot of the user's recent history used for duplicate comparison.
///
/// Fetched once per session; concurrent writes elsewhere are not observed
/// until the next session (accepted staleness window).
#[derive(Debug, Default)]
pub struct DuplicateIndex {
    existing: Vec<StoredTransaction>,
}

impl DuplicateIndex {
    pub fn new(existing: Vec<StoredTransaction>) -> Self {
        Self { existing }
    }

    /// Fetch the bounded window of most recent records for the user
    pub fn fetch(store: &dyn TransactionStore, user_id: &str) -> Result<Self> {
        Ok(Self::new(
            store.recent_transactions(user_id, DUPLICATE_WINDOW)?,
        ))
    }

    pub fn len(&self) -> usize {
        self.existing.len()
    }

    pub fn is_empty(&self) -> bool {
        self.existing.is_empty()
    }

    /// Whether a normalized row matches an existing record
    pub fn is_duplicate(&self, row: &NormalizedRow) -> bool {
        let amount = match row.amount {
            Some(a) => a,
            None => return false,
        };
        let description = row.description.to_lowercase();

        self.existing.iter().any(|existing| {
            (existing.amount - amount).abs() < amount_epsilon()
                && existing.description.to_lowercase() == description
        })
    }

    /// Flag every row. Flags are computed unconditionally; the
    /// skip-duplicates toggle only affects which rows get committed.
    pub fn flag(&self, rows: &mut [NormalizedRow]) {
        for row in rows.iter_mut() {
            row.is_duplicate = self.is_duplicate(row);
        }
    }
}
