//! Core domain entities
//!
//! Pure data structures with validation logic - no I/O or external
//! dependencies.

mod mapping;
mod row;
mod transaction;
pub mod result;

pub use mapping::{header_signature, ColumnMapping};
pub use row::{NormalizedRow, RawRow, StatementTable};
pub use transaction::{NewTransaction, StoredTransaction, TransactionKind};
