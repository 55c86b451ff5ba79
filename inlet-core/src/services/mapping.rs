//! Column mapping engine - heuristic inference with template reuse
//!
//! The heuristic is a pure function over the header list; a saved template
//! for the exact header signature overrides it entirely. Confirming a
//! mapping validates it and writes it back as the template for that
//! signature.

use std::sync::Arc;

use crate::domain::result::{Error, Result};
use crate::domain::{header_signature, ColumnMapping};
use crate::ports::TemplateCache;

/// Ordered keyword sets per canonical slot. Within a slot, earlier keywords
/// take precedence; the first header containing the keyword wins.
const DATE_KEYWORDS: [&str; 3] = ["date", "time", "day"];
const DESCRIPTION_KEYWORDS: [&str; 4] = ["desc", "narrative", "details", "merchant"];
const AMOUNT_KEYWORDS: [&str; 4] = ["amount", "debit", "value", "cost"];
const CATEGORY_KEYWORDS: [&str; 3] = ["category", "type", "class"];

/// Best-guess mapping from the header list alone.
///
/// Pure so the heuristic stays independently testable; template reuse is
/// layered on top by [`MappingEngine::suggest`].
pub fn infer_mapping(headers: &[String]) -> ColumnMapping {
    ColumnMapping {
        date: find_header(headers, &DATE_KEYWORDS),
        description: find_header(headers, &DESCRIPTION_KEYWORDS),
        amount: find_header(headers, &AMOUNT_KEYWORDS),
        category: find_header(headers, &CATEGORY_KEYWORDS),
    }
}

fn find_header(headers: &[String], keywords: &[&str]) -> Option<String> {
    for keyword in keywords {
        if let Some(header) = headers
            .iter()
            .find(|h| h.to_lowercase().contains(keyword))
        {
            return Some(header.clone());
        }
    }
    None
}

/// Mapping engine: heuristic guess, template override, confirm-and-persist
pub struct MappingEngine {
    templates: Arc<dyn TemplateCache>,
}

impl MappingEngine {
    pub fn new(templates: Arc<dyn TemplateCache>) -> Self {
        Self { templates }
    }

    /// Suggested mapping for the headers.
    ///
    /// A template saved under the exact header signature wins outright over
    /// the heuristic. A cache read failure degrades to the heuristic guess.
    pub fn suggest(&self, headers: &[String]) -> ColumnMapping {
        let signature = header_signature(headers);
        if let Ok(Some(saved)) = self.templates.get(&signature) {
            return saved;
        }
        infer_mapping(headers)
    }

    /// Validate the mapping and persist it as the template for the current
    /// header signature, replacing any prior template.
    ///
    /// Fails with `MappingIncomplete` when a required slot is unmapped or
    /// names a header missing from the current set; the caller must not
    /// advance past the mapping step in that case.
    pub fn confirm(&self, headers: &[String], mapping: &ColumnMapping) -> Result<()> {
        let missing = mapping.missing_required();
        if !missing.is_empty() {
            return Err(Error::mapping_incomplete(&missing));
        }

        for slot in [&mapping.date, &mapping.description, &mapping.amount] {
            if let Some(header) = slot.as_deref() {
                if !headers.iter().any(|h| h == header) {
                    return Err(Error::MappingIncomplete(format!(
                        "column '{}' is not in the uploaded file",
                        header
                    )));
                }
            }
        }

        self.templates.put(&header_signature(headers), mapping)
    }
}
