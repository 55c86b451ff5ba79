//! Format router - classify an uploaded file and produce a uniform table
//!
//! Tabular sources (CSV and friends) are parsed locally; scanned/PDF
//! documents are delegated to the extraction service and its structured
//! response is synthesized into the same row/column shape.

use std::path::Path;

use crate::domain::result::{Error, Result};
use crate::domain::{ColumnMapping, RawRow, StatementTable};
use crate::ports::{ExtractedStatement, StatementExtractor};

/// Canonical headers synthesized from an extraction response
const EXTRACTED_HEADERS: [&str; 4] = ["Date", "Description", "Amount", "Category"];

/// Declared types routed to the extraction service
const DOCUMENT_EXTENSIONS: [&str; 6] = ["pdf", "png", "jpg", "jpeg", "heic", "webp"];

/// How an uploaded file will be turned into a table
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SourceKind {
    /// Delimited text, parsed locally
    Tabular,
    /// Scanned/PDF document, sent to the extraction service
    Document,
}

/// An uploaded statement file: declared name plus raw bytes
#[derive(Debug, Clone)]
pub struct SourceFile {
    pub name: String,
    pub content: Vec<u8>,
}

impl SourceFile {
    pub fn new(name: impl Into<String>, content: Vec<u8>) -> Self {
        Self {
            name: name.into(),
            content,
        }
    }

    /// Classify by the declared type. Anything that is not a known document
    /// format is attempted as a delimited table.
    pub fn kind(&self) -> SourceKind {
        let extension = Path::new(&self.name)
            .extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .unwrap_or_default();

        if DOCUMENT_EXTENSIONS.iter().any(|e| *e == extension) {
            SourceKind::Document
        } else {
            SourceKind::Tabular
        }
    }
}

/// Router output: the uniform table, plus a pre-filled mapping when the
/// source was a document (extraction yields the canonical layout directly,
/// so no mapping heuristics are needed)
#[derive(Debug)]
pub struct RoutedStatement {
    pub table: StatementTable,
    pub premapped: Option<ColumnMapping>,
}

/// Classify and parse an uploaded file into a uniform table.
///
/// Tabular parse failures and empty files fail with `FileParse`; extraction
/// failures map to `RemoteTimeout`/`RemoteExtraction` per the service
/// contract. The caller stays on the upload step in every failure case.
pub fn route(
    file: &SourceFile,
    extractor: Option<&dyn StatementExtractor>,
) -> Result<RoutedStatement> {
    match file.kind() {
        SourceKind::Tabular => Ok(RoutedStatement {
            table: parse_tabular(&file.content)?,
            premapped: None,
        }),
        SourceKind::Document => {
            let extractor = extractor.ok_or_else(|| {
                Error::remote_extraction("no extraction service is configured")
            })?;
            let extracted = extractor.extract(&file.name, &file.content)?;
            synthesize(extracted)
        }
    }
}

/// Parse delimited text: the first non-empty line is the header row, blank
/// lines are skipped, short rows are padded to the header width.
fn parse_tabular(content: &[u8]) -> Result<StatementTable> {
    let text = String::from_utf8_lossy(content);

    // Skip leading blank lines so the header detection does not trip on them;
    // the csv reader ignores interior empty lines on its own.
    let mut start = 0;
    for line in text.split_inclusive('\n') {
        if line.trim().is_empty() {
            start += line.len();
        } else {
            break;
        }
    }
    let body = &text[start..];

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(body.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| Error::file_parse(e.to_string()))?
        .iter()
        .map(|h| h.to_string())
        .collect();

    if headers.iter().all(|h| h.is_empty()) {
        return Err(Error::file_parse("no header row found"));
    }

    let mut rows = Vec::new();
    for result in reader.records() {
        let record = result.map_err(|e| Error::file_parse(e.to_string()))?;
        if record.iter().all(|c| c.trim().is_empty()) {
            continue;
        }
        let mut cells: Vec<String> = record.iter().map(|c| c.to_string()).collect();
        cells.resize(headers.len(), String::new());
        rows.push(RawRow::new(cells));
    }

    if rows.is_empty() {
        return Err(Error::file_parse("the file contains no transaction rows"));
    }

    Ok(StatementTable::new(headers, rows))
}

/// Build the canonical 4-column table from an extraction response and
/// pre-fill the mapping with those exact headers
fn synthesize(extracted: ExtractedStatement) -> Result<RoutedStatement> {
    if extracted.transactions.is_empty() {
        return Err(Error::remote_extraction(
            "no transactions were found in the document",
        ));
    }

    let headers: Vec<String> = EXTRACTED_HEADERS.iter().map(|h| h.to_string()).collect();
    let rows = extracted
        .transactions
        .into_iter()
        .map(|tx| {
            RawRow::new(vec![
                tx.date,
                tx.description,
                tx.amount.to_string(),
                tx.category.unwrap_or_default(),
            ])
        })
        .collect();

    let premapped = ColumnMapping {
        date: Some("Date".to_string()),
        description: Some("Description".to_string()),
        amount: Some("Amount".to_string()),
        category: Some("Category".to_string()),
    };

    Ok(RoutedStatement {
        table: StatementTable::new(headers, rows),
        premapped: Some(premapped),
    })
}
