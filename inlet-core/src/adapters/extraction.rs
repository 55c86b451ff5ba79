//! Statement extraction API client
//!
//! Handles communication with the document-extraction service that converts
//! a scanned or PDF statement into a structured transaction list. The call
//! is blocking; the front end shows an in-progress indicator for its
//! duration.

use std::time::Duration;

use reqwest::blocking::multipart::{Form, Part};
use reqwest::blocking::Client;
use serde::Deserialize;

use crate::domain::result::{Error, Result};
use crate::ports::{ExtractedStatement, StatementExtractor};

/// Default production API URL
const EXTRACTOR_PRODUCTION_URL: &str = "https://api.inlet.money/v1";

/// Environment variable to override the extraction service base URL.
/// Set this to use a staging/sandbox environment for testing.
pub const EXTRACTOR_BASE_URL_ENV: &str = "INLET_EXTRACTOR_URL";

/// Get the extractor base URL, checking the environment variable first
pub fn get_base_url() -> String {
    std::env::var(EXTRACTOR_BASE_URL_ENV).unwrap_or_else(|_| EXTRACTOR_PRODUCTION_URL.to_string())
}

/// Error payload returned by the service on non-2xx responses
#[derive(Debug, Deserialize)]
struct ErrorResponse {
    #[serde(default)]
    error: Option<String>,
}

/// HTTP client for the extraction service
#[derive(Debug)]
pub struct ExtractionClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl ExtractionClient {
    /// Create a new client with the given API key.
    ///
    /// Uses the `INLET_EXTRACTOR_URL` environment variable if set, otherwise
    /// defaults to the production API.
    pub fn new(api_key: &str) -> anyhow::Result<Self> {
        Self::new_with_base_url(api_key, &get_base_url())
    }

    /// Create a new client with a custom base URL.
    ///
    /// Prefer `new()` with the `INLET_EXTRACTOR_URL` env var for testing.
    pub fn new_with_base_url(api_key: &str, base_url: &str) -> anyhow::Result<Self> {
        if api_key.is_empty() {
            anyhow::bail!("Extraction API key cannot be empty");
        }

        let client = Client::builder()
            .timeout(Duration::from_secs(120))
            .build()?;

        Ok(Self {
            client,
            api_key: api_key.to_string(),
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Map request-level errors to the pipeline's error taxonomy
    fn map_request_error(&self, error: reqwest::Error) -> Error {
        if error.is_timeout() {
            Error::RemoteTimeout
        } else if error.is_connect() {
            Error::remote_extraction("Unable to connect to the extraction service")
        } else {
            Error::remote_extraction(format!("Extraction request failed: {}", error))
        }
    }
}

impl StatementExtractor for ExtractionClient {
    fn name(&self) -> &str {
        "http"
    }

    fn extract(&self, file_name: &str, content: &[u8]) -> Result<ExtractedStatement> {
        let url = format!("{}/extract", self.base_url);

        let part = Part::bytes(content.to_vec()).file_name(file_name.to_string());
        let form = Form::new().part("file", part);

        let response = self
            .client
            .post(&url)
            .header("x-api-key", &self.api_key)
            .multipart(form)
            .send()
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status().as_u16();
        match status {
            200..=299 => response.json::<ExtractedStatement>().map_err(|e| {
                Error::remote_extraction(format!("Failed to parse extraction response: {}", e))
            }),
            // The gateway gave up on the document; guide the user towards a
            // smaller file or a CSV export
            504 => Err(Error::RemoteTimeout),
            _ => {
                let message = response
                    .json::<ErrorResponse>()
                    .ok()
                    .and_then(|e| e.error)
                    .unwrap_or_else(|| format!("HTTP {}", status));
                Err(Error::remote_extraction(message))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::extraction_mock::{MockConfig, MockExtractionServer};
    use rust_decimal::Decimal;

    #[test]
    fn test_reject_empty_api_key() {
        let result = ExtractionClient::new_with_base_url("", "http://localhost");
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("cannot be empty"));
    }

    #[test]
    fn test_base_url_trailing_slash_trimmed() {
        let client = ExtractionClient::new_with_base_url("test_key", "http://localhost/api/").unwrap();
        assert_eq!(client.base_url, "http://localhost/api");
    }

    #[test]
    fn test_default_base_url() {
        std::env::remove_var(EXTRACTOR_BASE_URL_ENV);
        assert_eq!(get_base_url(), "https://api.inlet.money/v1");
    }

    #[test]
    fn test_successful_extraction() {
        let server = MockExtractionServer::start(MockConfig::default()).unwrap();
        let client =
            ExtractionClient::new_with_base_url("test_key", &server.base_url()).unwrap();

        let statement = client.extract("scan.pdf", b"binary").unwrap();
        assert_eq!(statement.transactions.len(), 3);
        assert_eq!(statement.transactions[0].description, "Woolworths");
        assert_eq!(statement.transactions[0].amount, Decimal::new(-452, 1));
        assert_eq!(
            statement.transactions[0].category.as_deref(),
            Some("Groceries")
        );
        assert_eq!(statement.transactions[2].category, None);
    }

    #[test]
    fn test_gateway_timeout_maps_to_remote_timeout() {
        let server = MockExtractionServer::start(MockConfig {
            gateway_timeout: true,
            ..Default::default()
        })
        .unwrap();
        let client =
            ExtractionClient::new_with_base_url("test_key", &server.base_url()).unwrap();

        let err = client.extract("scan.pdf", b"binary").unwrap_err();
        assert!(matches!(err, Error::RemoteTimeout));
        // The message carries the CSV guidance for the user
        assert!(err.to_string().contains("CSV"));
    }

    #[test]
    fn test_server_error_maps_to_remote_extraction() {
        let server = MockExtractionServer::start(MockConfig {
            server_error: true,
            ..Default::default()
        })
        .unwrap();
        let client =
            ExtractionClient::new_with_base_url("test_key", &server.base_url()).unwrap();

        let err = client.extract("scan.pdf", b"binary").unwrap_err();
        match err {
            Error::RemoteExtraction(msg) => {
                assert!(msg.contains("could not be processed"), "got: {}", msg)
            }
            other => panic!("expected RemoteExtraction, got {:?}", other),
        }
    }
}
