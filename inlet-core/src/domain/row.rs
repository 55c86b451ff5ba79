//! Statement rows - the parsed table and its normalized derivation

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;

/// One source row of the uploaded statement, as ordered raw cells.
///
/// The owning [`StatementTable`] holds the header list; a cell is addressed
/// by its header's position in that list. Rows are immutable once parsed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRow {
    cells: Vec<String>,
}

impl RawRow {
    pub fn new(cells: Vec<String>) -> Self {
        Self { cells }
    }

    /// Cell at the given column index; empty string for short rows
    pub fn cell(&self, index: usize) -> &str {
        self.cells.get(index).map(String::as_str).unwrap_or("")
    }

    pub fn cells(&self) -> &[String] {
        &self.cells
    }
}

/// The uniform row/column table the format router produces from any source
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatementTable {
    headers: Vec<String>,
    rows: Vec<RawRow>,
}

impl StatementTable {
    pub fn new(headers: Vec<String>, rows: Vec<RawRow>) -> Self {
        Self { headers, rows }
    }

    pub fn headers(&self) -> &[String] {
        &self.headers
    }

    pub fn rows(&self) -> &[RawRow] {
        &self.rows
    }

    pub fn row_count(&self) -> usize {
        self.rows.len()
    }

    /// Position of a header, exact match
    pub fn column_index(&self, header: &str) -> Option<usize> {
        self.headers.iter().position(|h| h == header)
    }

    /// Cell value for a header in the given row; empty string when the
    /// header is unknown or the row is short
    pub fn value<'a>(&self, row: &'a RawRow, header: &str) -> &'a str {
        self.column_index(header)
            .map(|i| row.cell(i))
            .unwrap_or("")
    }
}

/// A raw row after type coercion, category inference, and duplicate flagging
///
/// `row_index` is the back-reference into the session table this row was
/// derived from.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizedRow {
    pub row_index: usize,
    /// Raw date cell exactly as uploaded
    pub raw_date: String,
    /// Parsed calendar date; `None` when no format matched
    pub date: Option<NaiveDate>,
    pub description: String,
    /// Parsed amount; `None` when the cell was empty or non-numeric
    pub amount: Option<Decimal>,
    pub category: String,
    pub is_valid: bool,
    pub is_duplicate: bool,
}

impl NormalizedRow {
    /// Validity is a pure function of the coerced fields: both parses
    /// succeeded and the raw date and description cells were non-empty.
    pub fn validity(&self) -> bool {
        self.amount.is_some()
            && self.date.is_some()
            && !self.raw_date.trim().is_empty()
            && !self.description.trim().is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_row_pads_with_empty() {
        let table = StatementTable::new(
            vec!["Date".to_string(), "Description".to_string(), "Amount".to_string()],
            vec![RawRow::new(vec!["2024-01-01".to_string()])],
        );
        let row = &table.rows()[0];
        assert_eq!(table.value(row, "Date"), "2024-01-01");
        assert_eq!(table.value(row, "Amount"), "");
        assert_eq!(table.value(row, "Nonexistent"), "");
    }

    #[test]
    fn test_column_index_is_exact_match() {
        let table = StatementTable::new(
            vec!["Date".to_string(), "date".to_string()],
            Vec::new(),
        );
        assert_eq!(table.column_index("date"), Some(1));
        assert_eq!(table.column_index("DATE"), None);
    }
}
