//! Transaction records exchanged with the document store

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Whether a record is money in or money out, derived from the amount sign
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionKind {
    Income,
    Expense,
}

impl TransactionKind {
    /// `income` for non-negative amounts, `expense` otherwise
    pub fn from_amount(amount: Decimal) -> Self {
        if amount >= Decimal::ZERO {
            Self::Income
        } else {
            Self::Expense
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
        }
    }
}

/// A normalized transaction ready to be written to the store
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub date: NaiveDate,
    pub description: String,
    pub amount: Decimal,
    pub category: String,
    #[serde(rename = "type")]
    pub kind: TransactionKind,
}

impl NewTransaction {
    /// Create a record with its kind derived from the amount sign
    pub fn new(
        date: NaiveDate,
        description: impl Into<String>,
        amount: Decimal,
        category: impl Into<String>,
    ) -> Self {
        Self {
            date,
            description: description.into(),
            amount,
            category: category.into(),
            kind: TransactionKind::from_amount(amount),
        }
    }
}

/// The slice of an existing record the deduplication engine compares against
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredTransaction {
    pub amount: Decimal,
    pub description: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_from_amount_sign() {
        assert_eq!(
            TransactionKind::from_amount(Decimal::new(100, 2)),
            TransactionKind::Income
        );
        assert_eq!(
            TransactionKind::from_amount(Decimal::new(-100, 2)),
            TransactionKind::Expense
        );
        // Zero counts as income per the store write contract
        assert_eq!(
            TransactionKind::from_amount(Decimal::ZERO),
            TransactionKind::Income
        );
    }

    #[test]
    fn test_new_transaction_derives_kind() {
        let date = NaiveDate::from_ymd_opt(2024, 2, 3).unwrap();
        let tx = NewTransaction::new(date, "Salary", Decimal::new(300000, 2), "Income");
        assert_eq!(tx.kind, TransactionKind::Income);
        assert_eq!(tx.kind.as_str(), "income");
    }
}
