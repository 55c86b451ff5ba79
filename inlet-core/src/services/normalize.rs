//! Row normalizer - coerce raw cells into typed values
//!
//! Each raw row becomes a [`NormalizedRow`] under the confirmed column
//! mapping: amount stripping, multi-format date resolution, category
//! inference, and the validity flag.

use chrono::NaiveDate;
use rust_decimal::Decimal;

use crate::domain::{ColumnMapping, NormalizedRow, RawRow, StatementTable};

/// Fallback date patterns tried in order after the ISO parse.
///
/// chrono accepts unpadded day/month digits for %d and %m, so these four
/// patterns also cover d/M/yyyy and M/d/yyyy. Day-first precedes month-first:
/// a string matching both (e.g. 03/04/2024) resolves day-first. Known
/// limitation, kept deliberately; append here to support more formats.
const DATE_FORMATS: [&str; 4] = ["%d/%m/%Y", "%m/%d/%Y", "%Y-%m-%d", "%d-%m-%Y"];

/// Ordered category rules matched as substrings of the lowercased
/// description. First rule with a hit wins.
const CATEGORY_RULES: &[(&str, &[&str])] = &[
    (
        "Groceries",
        &[
            "woolworths",
            "coles",
            "aldi",
            "tesco",
            "sainsbury",
            "kroger",
            "trader joe",
            "whole foods",
            "grocery",
            "supermarket",
        ],
    ),
    (
        "Transport",
        &[
            "uber", "lyft", "taxi", "transit", "metro", "train", "tram", "parking", "fuel",
            "petrol",
        ],
    ),
    (
        "Entertainment",
        &["netflix", "spotify", "hulu", "disney", "cinema", "theatre"],
    ),
    (
        "Food",
        &[
            "cafe",
            "coffee",
            "restaurant",
            "mcdonald",
            "burger",
            "pizza",
            "bakery",
            "sushi",
        ],
    ),
];

/// Strip everything outside `[0-9.-]` and parse what is left.
///
/// No currency-specific handling beyond the stripping: `$(45.50)` loses its
/// parentheses without gaining a sign, `1,234.56 CR` loses the thousands
/// separator and suffix. Empty or non-numeric leftovers yield `None`.
pub fn parse_amount(raw: &str) -> Option<Decimal> {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.' || *c == '-')
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse().ok()
}

/// Resolve a raw date cell: ISO parse first, then the ordered fallback
/// patterns, first success wins.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }
    if let Ok(date) = raw.parse::<NaiveDate>() {
        return Some(date);
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
}

/// Pick a category for the row.
///
/// A non-empty value from a mapped category column is trusted verbatim.
/// Otherwise the ordered keyword rules run over the lowercased description;
/// with no hit, positive amounts default to "Income" and everything else to
/// "Uncategorized".
pub fn categorize(description: &str, explicit: Option<&str>, amount: Option<Decimal>) -> String {
    if let Some(category) = explicit {
        let category = category.trim();
        if !category.is_empty() {
            return category.to_string();
        }
    }

    let description = description.to_lowercase();
    for (category, keywords) in CATEGORY_RULES {
        if keywords.iter().any(|k| description.contains(k)) {
            return (*category).to_string();
        }
    }

    match amount {
        Some(a) if a > Decimal::ZERO => "Income".to_string(),
        _ => "Uncategorized".to_string(),
    }
}

/// Normalize one raw row under the confirmed mapping.
///
/// Duplicate flagging happens separately; the flag starts false here.
pub fn normalize_row(
    table: &StatementTable,
    row_index: usize,
    row: &RawRow,
    mapping: &ColumnMapping,
) -> NormalizedRow {
    let raw_date = table
        .value(row, mapping.date.as_deref().unwrap_or(""))
        .to_string();
    let description = table
        .value(row, mapping.description.as_deref().unwrap_or(""))
        .to_string();
    let raw_amount = table.value(row, mapping.amount.as_deref().unwrap_or(""));
    let explicit_category = mapping.category.as_deref().map(|h| table.value(row, h));

    let amount = parse_amount(raw_amount);
    let date = parse_date(&raw_date);
    let category = categorize(&description, explicit_category, amount);

    let mut normalized = NormalizedRow {
        row_index,
        raw_date,
        date,
        description,
        amount,
        category,
        is_valid: false,
        is_duplicate: false,
    };
    normalized.is_valid = normalized.validity();
    normalized
}

/// Normalize every row of the table in source order
pub fn normalize_table(table: &StatementTable, mapping: &ColumnMapping) -> Vec<NormalizedRow> {
    table
        .rows()
        .iter()
        .enumerate()
        .map(|(i, row)| normalize_row(table, i, row, mapping))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_amount_strips_currency_noise() {
        // Parentheses are stripped, not treated as a negative sign
        assert_eq!(parse_amount("$(45.50)"), Some(Decimal::new(4550, 2)));
        assert_eq!(parse_amount("1,234.56 CR"), Some(Decimal::new(123456, 2)));
        assert_eq!(parse_amount("-45.20"), Some(Decimal::new(-4520, 2)));
        assert_eq!(parse_amount("AUD 3000.00"), Some(Decimal::new(300000, 2)));
    }

    #[test]
    fn test_parse_amount_rejects_non_numeric() {
        assert_eq!(parse_amount(""), None);
        assert_eq!(parse_amount("pending"), None);
        assert_eq!(parse_amount("--"), None);
        assert_eq!(parse_amount("1.2.3"), None);
    }

    #[test]
    fn test_parse_date_iso_first() {
        assert_eq!(
            parse_date("2024-01-15"),
            NaiveDate::from_ymd_opt(2024, 1, 15)
        );
    }

    #[test]
    fn test_parse_date_day_first_fallback() {
        // 31/01 cannot be month-first, so only the dd/MM pattern matches
        assert_eq!(
            parse_date("31/01/2024"),
            NaiveDate::from_ymd_opt(2024, 1, 31)
        );
    }

    #[test]
    fn test_parse_date_ambiguous_resolves_day_first() {
        // Matches both dd/MM and MM/dd; the first pattern in the list wins
        assert_eq!(
            parse_date("03/04/2024"),
            NaiveDate::from_ymd_opt(2024, 4, 3)
        );
    }

    #[test]
    fn test_parse_date_month_first_when_day_first_invalid() {
        // 12/25 is only a valid date month-first
        assert_eq!(
            parse_date("12/25/2024"),
            NaiveDate::from_ymd_opt(2024, 12, 25)
        );
    }

    #[test]
    fn test_parse_date_unparseable() {
        assert_eq!(parse_date(""), None);
        assert_eq!(parse_date("not a date"), None);
        assert_eq!(parse_date("13/25/2024"), None);
    }

    #[test]
    fn test_categorize_explicit_value_is_trusted() {
        assert_eq!(
            categorize("Woolworths", Some("Custom Bucket"), Some(Decimal::new(-100, 2))),
            "Custom Bucket"
        );
        // Empty explicit value falls through to the keyword rules
        assert_eq!(
            categorize("Woolworths", Some(""), Some(Decimal::new(-100, 2))),
            "Groceries"
        );
    }

    #[test]
    fn test_categorize_keyword_rules() {
        assert_eq!(categorize("WOOLWORTHS 1234", None, None), "Groceries");
        assert_eq!(categorize("Uber Trip Sydney", None, None), "Transport");
        assert_eq!(categorize("Netflix.com", None, None), "Entertainment");
        assert_eq!(categorize("Corner Cafe", None, None), "Food");
        // Rule order decides collisions: "Woolworths Metro" hits both the
        // grocery and transport sets, groceries comes first
        assert_eq!(categorize("Woolworths Metro", None, None), "Groceries");
    }

    #[test]
    fn test_categorize_amount_sign_fallback() {
        assert_eq!(
            categorize("Salary", None, Some(Decimal::new(300000, 2))),
            "Income"
        );
        assert_eq!(
            categorize("Mystery Debit", None, Some(Decimal::new(-500, 2))),
            "Uncategorized"
        );
        assert_eq!(categorize("Mystery", None, None), "Uncategorized");
        assert_eq!(categorize("Zero", None, Some(Decimal::ZERO)), "Uncategorized");
    }

    fn table_and_mapping() -> (StatementTable, ColumnMapping) {
        let table = StatementTable::new(
            vec![
                "TransactionDate".to_string(),
                "Merchant".to_string(),
                "Debit".to_string(),
            ],
            vec![
                RawRow::new(vec![
                    "01/02/2024".to_string(),
                    "Woolworths".to_string(),
                    "-45.20".to_string(),
                ]),
                RawRow::new(vec![
                    "bad date".to_string(),
                    "Netflix".to_string(),
                    "-15.99".to_string(),
                ]),
                RawRow::new(vec![
                    "03/02/2024".to_string(),
                    "".to_string(),
                    "3000.00".to_string(),
                ]),
            ],
        );
        let mapping = ColumnMapping {
            date: Some("TransactionDate".to_string()),
            description: Some("Merchant".to_string()),
            amount: Some("Debit".to_string()),
            category: None,
        };
        (table, mapping)
    }

    #[test]
    fn test_normalize_table_validity_invariant() {
        let (table, mapping) = table_and_mapping();
        let rows = normalize_table(&table, &mapping);
        assert_eq!(rows.len(), 3);

        // Every row satisfies the validity invariant by construction
        for row in &rows {
            assert_eq!(row.is_valid, row.validity());
        }

        assert!(rows[0].is_valid);
        assert_eq!(rows[0].date, NaiveDate::from_ymd_opt(2024, 2, 1));
        assert_eq!(rows[0].category, "Groceries");

        // Unparseable date invalidates the row but keeps the raw cell
        assert!(!rows[1].is_valid);
        assert_eq!(rows[1].date, None);
        assert_eq!(rows[1].raw_date, "bad date");
        assert_eq!(rows[1].category, "Entertainment");

        // Empty description invalidates the row
        assert!(!rows[2].is_valid);
        assert_eq!(rows[2].amount, Some(Decimal::new(300000, 2)));
        assert_eq!(rows[2].category, "Income");
    }

    #[test]
    fn test_normalize_row_back_reference() {
        let (table, mapping) = table_and_mapping();
        let rows = normalize_table(&table, &mapping);
        assert_eq!(rows[2].row_index, 2);
        assert_eq!(
            table.value(&table.rows()[rows[2].row_index], "Debit"),
            "3000.00"
        );
    }
}
