//! Mock extraction API server for testing
//!
//! A minimal HTTP server that simulates the document-extraction service,
//! allowing the client to be tested without network access.
//!
//! The mock implements the same response contract as the real service:
//! - POST /extract returns { transactions: [...] } on success
//! - gateway timeout scenario answers 504
//! - server error scenario answers 500 with { error: "..." }

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use serde::Serialize;

/// Mock extraction server for testing
pub struct MockExtractionServer {
    port: u16,
    running: Arc<AtomicBool>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Scenario configuration for the mock
#[derive(Debug, Clone)]
pub struct MockConfig {
    /// Transactions returned on success
    pub transactions: Vec<MockTransaction>,
    /// Answer 504 instead of extracting
    pub gateway_timeout: bool,
    /// Answer 500 with an error body instead of extracting
    pub server_error: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            transactions: vec![
                MockTransaction {
                    date: "2024-02-01".to_string(),
                    description: "Woolworths".to_string(),
                    amount: -45.2,
                    category: Some("Groceries".to_string()),
                },
                MockTransaction {
                    date: "2024-02-02".to_string(),
                    description: "Netflix".to_string(),
                    amount: -15.99,
                    category: Some("Entertainment".to_string()),
                },
                MockTransaction {
                    date: "2024-02-03".to_string(),
                    description: "Salary".to_string(),
                    amount: 3000.0,
                    category: None,
                },
            ],
            gateway_timeout: false,
            server_error: false,
            delay_ms: 0,
        }
    }
}

// Response structures matching the real API

#[derive(Serialize)]
struct ExtractionResponse {
    transactions: Vec<MockTransaction>,
}

#[derive(Debug, Clone, Serialize)]
pub struct MockTransaction {
    pub date: String,
    pub description: String,
    pub amount: f64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<String>,
}

impl MockExtractionServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();

        // Non-blocking accept loop for graceful shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        let cfg = config.clone();
                        thread::spawn(move || {
                            handle_connection(stream, &cfg);
                        });
                    }
                    Err(ref e) if e.kind() == std::io::ErrorKind::WouldBlock => {
                        thread::sleep(std::time::Duration::from_millis(10));
                    }
                    Err(_) => break,
                }
            }
        });

        Ok(Self {
            port,
            running,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockExtractionServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig) {
    // The multipart body is irrelevant to the scenarios; one read is enough
    // to pick up the request line.
    let mut buffer = [0; 65536];

    if let Ok(n) = stream.read(&mut buffer) {
        let request = String::from_utf8_lossy(&buffer[..n]);

        if config.delay_ms > 0 {
            thread::sleep(std::time::Duration::from_millis(config.delay_ms));
        }

        let first_line = request.lines().next().unwrap_or("");
        let parts: Vec<&str> = first_line.split_whitespace().collect();

        if parts.len() < 2 {
            send_response(&mut stream, 400, "Bad Request", r#"{"error": "Invalid request"}"#);
            return;
        }

        let method = parts[0];
        let path = parts[1].split('?').next().unwrap_or(parts[1]);

        if config.gateway_timeout {
            send_response(
                &mut stream,
                504,
                "Gateway Timeout",
                r#"{"error": "Gateway timeout"}"#,
            );
            return;
        }

        if config.server_error {
            send_response(
                &mut stream,
                500,
                "Internal Server Error",
                r#"{"error": "Document could not be processed"}"#,
            );
            return;
        }

        match (method, path) {
            ("POST", "/extract") => {
                let response = ExtractionResponse {
                    transactions: config.transactions.clone(),
                };
                let json = serde_json::to_string(&response).unwrap();
                send_response(&mut stream, 200, "OK", &json);
            }
            _ => {
                send_response(
                    &mut stream,
                    404,
                    "Not Found",
                    r#"{"error": "Endpoint not found"}"#,
                );
            }
        }
    }
}

fn send_response(stream: &mut TcpStream, status: u16, status_text: &str, body: &str) {
    let response = format!(
        "HTTP/1.1 {} {}\r\nContent-Type: application/json\r\nContent-Length: {}\r\n\r\n{}",
        status,
        status_text,
        body.len(),
        body
    );
    let _ = stream.write_all(response.as_bytes());
    let _ = stream.flush();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mock_server_starts() {
        let server = MockExtractionServer::start(MockConfig::default()).unwrap();
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
    }
}
