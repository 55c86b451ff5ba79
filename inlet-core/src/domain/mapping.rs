//! Column mapping between canonical transaction fields and source headers

use serde::{Deserialize, Serialize};

/// Fixed delimiter for header signatures
const SIGNATURE_DELIMITER: &str = ",";

/// The user/engine-selected correspondence between the canonical transaction
/// fields and the source column headers.
///
/// `date`, `description`, and `amount` must all be mapped before the import
/// can leave the mapping step; `category` is optional.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ColumnMapping {
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub amount: Option<String>,
    #[serde(default)]
    pub category: Option<String>,
}

impl ColumnMapping {
    /// Names of required slots that are still unmapped.
    ///
    /// An empty header name counts as unmapped (templates written by older
    /// clients stored "" instead of omitting the slot).
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if is_unmapped(&self.date) {
            missing.push("date");
        }
        if is_unmapped(&self.description) {
            missing.push("description");
        }
        if is_unmapped(&self.amount) {
            missing.push("amount");
        }
        missing
    }

    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }
}

fn is_unmapped(slot: &Option<String>) -> bool {
    slot.as_deref().map_or(true, |h| h.trim().is_empty())
}

/// Cache key for reusing a confirmed mapping: the exact ordered header list
/// joined by a fixed delimiter.
pub fn header_signature(headers: &[String]) -> String {
    headers.join(SIGNATURE_DELIMITER)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_required() {
        let mapping = ColumnMapping {
            date: Some("Date".to_string()),
            description: None,
            amount: Some("".to_string()),
            category: None,
        };
        assert_eq!(mapping.missing_required(), vec!["description", "amount"]);
        assert!(!mapping.is_complete());
    }

    #[test]
    fn test_complete_mapping() {
        let mapping = ColumnMapping {
            date: Some("Date".to_string()),
            description: Some("Description".to_string()),
            amount: Some("Amount".to_string()),
            category: None,
        };
        assert!(mapping.is_complete());
    }

    #[test]
    fn test_header_signature_preserves_order() {
        let headers = vec![
            "Date".to_string(),
            "Description".to_string(),
            "Amount".to_string(),
        ];
        assert_eq!(header_signature(&headers), "Date,Description,Amount");
    }
}
