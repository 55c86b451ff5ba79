//! Batch committer - all-or-nothing persistence of the accepted rows

use crate::domain::result::{Error, Result};
use crate::domain::{NewTransaction, NormalizedRow};
use crate::ports::TransactionStore;

/// Rows included in the commit: valid, and not flagged as duplicate when the
/// skip-duplicates toggle is on
pub fn select_rows(rows: &[NormalizedRow], skip_duplicates: bool) -> Vec<&NormalizedRow> {
    rows.iter()
        .filter(|r| r.is_valid && (!skip_duplicates || !r.is_duplicate))
        .collect()
}

/// Store record for an accepted row; `None` for rows whose required fields
/// did not parse (those are filtered out by validity already)
fn to_record(row: &NormalizedRow) -> Option<NewTransaction> {
    let date = row.date?;
    let amount = row.amount?;
    Some(NewTransaction::new(
        date,
        row.description.clone(),
        amount,
        row.category.clone(),
    ))
}

/// Submit the accepted subset as a single atomic create-many.
///
/// Returns the committed count. Fails with `NothingToImport` when the subset
/// is empty, and with the store's `Commit` error when the batch write is
/// rejected - in which case nothing was persisted and the same call is safe
/// to retry.
pub fn commit(
    store: &dyn TransactionStore,
    user_id: &str,
    rows: &[NormalizedRow],
    skip_duplicates: bool,
) -> Result<usize> {
    let records: Vec<NewTransaction> = select_rows(rows, skip_duplicates)
        .into_iter()
        .filter_map(to_record)
        .collect();

    if records.is_empty() {
        return Err(Error::NothingToImport);
    }

    store.create_many(user_id, &records)?;
    Ok(records.len())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn row(is_valid: bool, is_duplicate: bool) -> NormalizedRow {
        NormalizedRow {
            row_index: 0,
            raw_date: "01/02/2024".to_string(),
            date: NaiveDate::from_ymd_opt(2024, 2, 1),
            description: "Woolworths".to_string(),
            amount: Some(Decimal::new(-4520, 2)),
            category: "Groceries".to_string(),
            is_valid,
            is_duplicate,
        }
    }

    #[test]
    fn test_selection_matrix() {
        let rows = vec![
            row(true, false),
            row(true, true),
            row(false, false),
            row(false, true),
        ];

        // Duplicates included: every valid row goes through
        assert_eq!(select_rows(&rows, false).len(), 2);
        // Duplicates skipped: only the valid non-duplicate survives
        assert_eq!(select_rows(&rows, true).len(), 1);
    }

    #[test]
    fn test_record_carries_derived_type() {
        let record = to_record(&row(true, false)).unwrap();
        assert_eq!(record.kind.as_str(), "expense");
        assert_eq!(record.category, "Groceries");
        assert_eq!(record.date, NaiveDate::from_ymd_opt(2024, 2, 1).unwrap());
    }
}
