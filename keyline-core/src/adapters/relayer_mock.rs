//! Mock relayer HTTP server for testing
//!
//! Simulates the relayer endpoint without any network dependency:
//! - POST /transaction returns {success, transactionHash, status, message}
//!
//! Scenario flags on `MockConfig` force failures, delays, and ambiguous
//! responses so outcome mapping can be exercised end to end.

use std::io::{Read, Write};
use std::net::{TcpListener, TcpStream};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;

use sha2::{Digest, Sha256};

/// Mock relayer server for testing
pub struct MockRelayerServer {
    port: u16,
    running: Arc<AtomicBool>,
    requests: Arc<AtomicUsize>,
    thread_handle: Option<thread::JoinHandle<()>>,
}

/// Configuration for mock behavior
#[derive(Debug, Clone, Default)]
pub struct MockConfig {
    /// Respond with a failed transfer envelope
    pub fail_transfers: bool,
    /// Respond 500 with an {error, details} body
    pub server_error: bool,
    /// Respond 200 with a body that states no conclusive status
    pub ambiguous_responses: bool,
    /// Delay in milliseconds before responding
    pub delay_ms: u64,
}

impl MockRelayerServer {
    /// Start a new mock server on a random available port
    pub fn start(config: MockConfig) -> std::io::Result<Self> {
        let listener = TcpListener::bind("127.0.0.1:0")?;
        let port = listener.local_addr()?.port();
        let running = Arc::new(AtomicBool::new(true));
        let running_clone = running.clone();
        let requests = Arc::new(AtomicUsize::new(0));
        let requests_clone = requests.clone();

        // Non-blocking accept loop for graceful shutdown
        listener.set_nonblocking(true)?;

        let thread_handle = thread::spawn(move || {
            while running_clone.load(Ordering::SeqCst) {
                match listener.accept() {
                    Ok((stream, _)) => {
                        requests_clone.fetch_add(1, Ordering::SeqCst);
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
            requests,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get the base URL for this mock server
    pub fn base_url(&self) -> String {
        format!("http://127.0.0.1:{}", self.port)
    }

    /// Number of connections the server has accepted
    pub fn request_count(&self) -> usize {
        self.requests.load(Ordering::SeqCst)
    }

    /// Stop the mock server
    pub fn stop(&mut self) {
        self.running.store(false, Ordering::SeqCst);
        if let Some(handle) = self.thread_handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for MockRelayerServer {
    fn drop(&mut self) {
        self.stop();
    }
}

fn handle_connection(mut stream: TcpStream, config: &MockConfig) {
    let mut buffer = [0; 8192];

    if let Ok(n) = stream.read(&mut buffer) {
        let request = String::from_utf8_lossy(&buffer[..n]).to_string();

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
        let path = parts[1];

        if method != "POST" || path != "/transaction" {
            send_response(
                &mut stream,
                404,
                "Not Found",
                r#"{"error": "Endpoint not found"}"#,
            );
            return;
        }

        if config.server_error {
            send_response(
                &mut stream,
                500,
                "Internal Server Error",
                r#"{"error": "Transaction failed", "details": "forced server error", "status": 500}"#,
            );
            return;
        }

        if config.fail_transfers {
            let body = serde_json::json!({
                "success": false,
                "status": "failed",
                "message": "Transfer failed by mock policy",
            });
            send_response(&mut stream, 200, "OK", &body.to_string());
            return;
        }

        if config.ambiguous_responses {
            let body = serde_json::json!({
                "success": true,
                "status": "pending",
                "message": "Transfer accepted for processing",
            });
            send_response(&mut stream, 200, "OK", &body.to_string());
            return;
        }

        let body = serde_json::json!({
            "success": true,
            "transactionHash": derive_hash(&request),
            "status": "success",
            "message": "USDC transaction completed",
        });
        send_response(&mut stream, 200, "OK", &body.to_string());
    }
}

/// Deterministic 32-byte transaction hash derived from the request body
fn derive_hash(request: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
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
        let server = MockRelayerServer::start(MockConfig::default()).unwrap();
        assert!(server.base_url().starts_with("http://127.0.0.1:"));
        assert_eq!(server.request_count(), 0);
    }

    #[test]
    fn test_derive_hash_shape() {
        let hash = derive_hash("POST /transaction");
        assert!(hash.starts_with("0x"));
        assert_eq!(hash.len(), 66);
        // Deterministic for the same request
        assert_eq!(hash, derive_hash("POST /transaction"));
    }
}
