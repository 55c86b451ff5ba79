//! Statement extractor port
//!
//! Defines the interface to the external document-extraction service that
//! converts a scanned or PDF statement into a structured transaction list.

use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value as JsonValue;

use crate::domain::result::Result;

/// One transaction as returned by the extraction service.
///
/// The service returns `amount` as a JSON number, but some backends quote it;
/// both are accepted.
#[derive(Debug, Clone, Deserialize)]
pub struct ExtractedTransaction {
    pub date: String,
    pub description: String,
    #[serde(deserialize_with = "deserialize_amount")]
    pub amount: Decimal,
    #[serde(default)]
    pub category: Option<String>,
}

/// Successful extraction response: the structured transaction list
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ExtractedStatement {
    pub transactions: Vec<ExtractedTransaction>,
}

/// Document extraction provider trait
///
/// Implementations upload the document and return the structured transaction
/// list. The call is synchronous from the caller's perspective; failures map
/// onto `Error::RemoteTimeout` (gateway timeout) or `Error::RemoteExtraction`
/// (anything else).
pub trait StatementExtractor: Send + Sync {
    /// Provider name (e.g., "http", "mock")
    fn name(&self) -> &str;

    /// Extract transactions from an uploaded document
    fn extract(&self, file_name: &str, content: &[u8]) -> Result<ExtractedStatement>;
}

/// Deserialize an amount that can be a number or a string
fn deserialize_amount<'de, D>(deserializer: D) -> std::result::Result<Decimal, D::Error>
where
    D: serde::Deserializer<'de>,
{
    use serde::de::Error;
    let value: JsonValue = Deserialize::deserialize(deserializer)?;
    match value {
        JsonValue::Number(n) => {
            let s = n.to_string();
            s.parse::<Decimal>()
                .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e)))
        }
        JsonValue::String(s) => s
            .parse::<Decimal>()
            .map_err(|e| D::Error::custom(format!("invalid decimal: {}", e))),
        _ => Err(D::Error::custom("expected number or string for amount")),
    }
}
