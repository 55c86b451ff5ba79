//! Mapping template cache port
//!
//! Client-local key-value store that remembers a confirmed column mapping per
//! header signature, so a statement with a previously seen layout maps itself.

use crate::domain::result::Result;
use crate::domain::ColumnMapping;

/// Persisted `(header signature -> mapping)` lookup
///
/// Templates are written whenever a mapping is confirmed (overwriting any
/// prior template for the signature) and are never deleted automatically.
pub trait TemplateCache: Send + Sync {
    /// Saved mapping for the exact header signature, if any
    fn get(&self, signature: &str) -> Result<Option<ColumnMapping>>;

    /// Save a mapping for the signature, replacing any existing template
    fn put(&self, signature: &str, mapping: &ColumnMapping) -> Result<()>;
}
