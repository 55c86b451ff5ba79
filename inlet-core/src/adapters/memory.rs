//! In-memory adapters for tests and demos
//!
//! `MemoryStore` honors the same all-or-nothing contract as the real store:
//! a batch is staged first and swapped in only when every record is
//! accepted, so an injected failure leaves nothing behind.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

use crate::domain::result::{Error, Result};
use crate::domain::{ColumnMapping, NewTransaction, StoredTransaction};
use crate::ports::{TemplateCache, TransactionStore};

/// In-memory transaction store with commit-failure injection
#[derive(Default)]
pub struct MemoryStore {
    /// Pre-existing history served by recent_transactions
    existing: Mutex<HashMap<String, Vec<StoredTransaction>>>,
    /// Batches accepted by create_many
    committed: Mutex<HashMap<String, Vec<NewTransaction>>>,
    /// Fail the next whole batch
    fail_next_commit: AtomicBool,
    /// Accept this many records of the next batch, then fail it
    fail_after_records: Mutex<Option<usize>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed pre-existing history for a user, newest first
    pub fn seed(&self, user_id: &str, transactions: Vec<StoredTransaction>) {
        self.existing
            .lock()
            .unwrap()
            .insert(user_id.to_string(), transactions);
    }

    /// Make the next create_many call fail outright
    pub fn fail_next_commit(&self) {
        self.fail_next_commit.store(true, Ordering::SeqCst);
    }

    /// Make the next create_many call fail after staging `n` records,
    /// simulating a mid-batch write failure
    pub fn fail_after(&self, n: usize) {
        *self.fail_after_records.lock().unwrap() = Some(n);
    }

    /// Number of records committed for a user
    pub fn transaction_count(&self, user_id: &str) -> usize {
        self.committed
            .lock()
            .unwrap()
            .get(user_id)
            .map(Vec::len)
            .unwrap_or(0)
    }

    /// Committed records for a user (test inspection)
    pub fn committed_transactions(&self, user_id: &str) -> Vec<NewTransaction> {
        self.committed
            .lock()
            .unwrap()
            .get(user_id)
            .cloned()
            .unwrap_or_default()
    }
}

impl TransactionStore for MemoryStore {
    fn recent_transactions(&self, user_id: &str, limit: usize) -> Result<Vec<StoredTransaction>> {
        let committed = self.committed.lock().unwrap();
        let existing = self.existing.lock().unwrap();

        // Committed batches are newer than the seeded history
        let mut recent: Vec<StoredTransaction> = committed
            .get(user_id)
            .map(|records| {
                records
                    .iter()
                    .rev()
                    .map(|r| StoredTransaction {
                        amount: r.amount,
                        description: r.description.clone(),
                    })
                    .collect()
            })
            .unwrap_or_default();

        if let Some(seeded) = existing.get(user_id) {
            recent.extend(seeded.iter().cloned());
        }

        recent.truncate(limit);
        Ok(recent)
    }

    fn create_many(&self, user_id: &str, records: &[NewTransaction]) -> Result<()> {
        if self.fail_next_commit.swap(false, Ordering::SeqCst) {
            return Err(Error::commit("injected commit failure"));
        }

        // Stage the batch first; storage is only touched when every record
        // was accepted
        let mut staged = Vec::with_capacity(records.len());
        let fail_after = self.fail_after_records.lock().unwrap().take();
        for (i, record) in records.iter().enumerate() {
            if let Some(n) = fail_after {
                if i >= n {
                    return Err(Error::commit(format!(
                        "injected failure after {} of {} records",
                        n,
                        records.len()
                    )));
                }
            }
            staged.push(record.clone());
        }

        self.committed
            .lock()
            .unwrap()
            .entry(user_id.to_string())
            .or_default()
            .extend(staged);
        Ok(())
    }
}

/// In-memory template cache
#[derive(Default)]
pub struct MemoryTemplateCache {
    templates: Mutex<HashMap<String, ColumnMapping>>,
}

impl MemoryTemplateCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn len(&self) -> usize {
        self.templates.lock().unwrap().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl TemplateCache for MemoryTemplateCache {
    fn get(&self, signature: &str) -> Result<Option<ColumnMapping>> {
        Ok(self.templates.lock().unwrap().get(signature).cloned())
    }

    fn put(&self, signature: &str, mapping: &ColumnMapping) -> Result<()> {
        self.templates
            .lock()
            .unwrap()
            .insert(signature.to_string(), mapping.clone());
        Ok(())
    }
}
