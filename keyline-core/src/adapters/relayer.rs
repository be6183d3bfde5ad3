//! Relayer transfer backend
//!
//! Submits transfers to the relayer HTTP endpoint:
//! POST {fromAddress, toAddress, amount, chainName, usdcAddress}
//! and expects {success, transactionHash, status, message} back.
//!
//! Outcome mapping is the heart of this adapter. A connection refused before
//! anything was sent is a conclusive failure; a timeout after the request
//! went out means the relayer may have accepted the transfer, so the outcome
//! is `Unknown` and the caller must not try a fallback.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ports::{TransferBackend, TransferOutcome, TransferRequest};

/// Relayer HTTP client
#[derive(Debug, Clone)]
pub struct RelayerClient {
    client: reqwest::Client,
    base_url: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RelayerTransferBody {
    from_address: String,
    to_address: String,
    amount: String,
    chain_name: String,
    usdc_address: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RelayerTransferResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    transaction_hash: Option<String>,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    message: Option<String>,
}

/// Error envelope returned on non-2xx responses
#[derive(Debug, Deserialize)]
struct RelayerErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl RelayerClient {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn submit_transfer(&self, request: &TransferRequest) -> TransferOutcome {
        let url = format!("{}/transaction", self.base_url);
        let body = RelayerTransferBody {
            from_address: request.from_address.clone(),
            to_address: request.to_address.clone(),
            amount: request.amount_units.to_string(),
            chain_name: request.chain_name.clone(),
            usdc_address: request.usdc_address.clone(),
        };

        let response = match self.client.post(&url).json(&body).send().await {
            Ok(response) => response,
            Err(e) => return map_send_error(e),
        };

        let status = response.status();
        if !status.is_success() {
            // The relayer processed the request and rejected it.
            let reason = match response.json::<RelayerErrorResponse>().await {
                Ok(err) => err
                    .error
                    .or(err.details)
                    .unwrap_or_else(|| format!("HTTP {}", status.as_u16())),
                Err(_) => format!("HTTP {}", status.as_u16()),
            };
            return TransferOutcome::Failed { reason };
        }

        match response.json::<RelayerTransferResponse>().await {
            Ok(data) => map_transfer_response(data),
            Err(_) => TransferOutcome::Unknown {
                reason: "Relayer returned an unreadable success response".to_string(),
            },
        }
    }
}

fn map_send_error(error: reqwest::Error) -> TransferOutcome {
    if error.is_connect() {
        // Nothing reached the relayer.
        TransferOutcome::Failed {
            reason: "Unable to connect to relayer".to_string(),
        }
    } else if error.is_timeout() {
        TransferOutcome::Unknown {
            reason: "Relayer request timed out; the transfer may have been accepted".to_string(),
        }
    } else {
        TransferOutcome::Unknown {
            reason: format!("Relayer request failed mid-flight: {}", error),
        }
    }
}

fn map_transfer_response(data: RelayerTransferResponse) -> TransferOutcome {
    let status = data.status.as_deref().unwrap_or("");
    match (data.success, status, data.transaction_hash) {
        (true, "success", Some(hash)) => TransferOutcome::Confirmed { hash },
        (false, _, _) | (_, "failed", _) => TransferOutcome::Failed {
            reason: data
                .message
                .unwrap_or_else(|| "Relayer reported failure".to_string()),
        },
        _ => TransferOutcome::Unknown {
            reason: "Relayer response did not state a conclusive status".to_string(),
        },
    }
}

/// Relayer transfer backend
///
/// Primary submission path; wraps `RelayerClient` behind the
/// `TransferBackend` port.
pub struct RelayerBackend {
    client: RelayerClient,
}

impl RelayerBackend {
    pub fn new(base_url: &str) -> anyhow::Result<Self> {
        Ok(Self {
            client: RelayerClient::new(base_url)?,
        })
    }
}

#[async_trait]
impl TransferBackend for RelayerBackend {
    fn name(&self) -> &str {
        "relayer"
    }

    async fn submit(&self, request: &TransferRequest) -> TransferOutcome {
        self.client.submit_transfer(request).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::relayer_mock::{MockConfig, MockRelayerServer};

    fn request() -> TransferRequest {
        TransferRequest {
            from_address: "0x1111111111111111111111111111111111111111".to_string(),
            to_address: "0x2222222222222222222222222222222222222222".to_string(),
            amount_units: 25_000_000,
            chain_name: "polygonAmoy".to_string(),
            usdc_address: "0x41e94eb019c0762f9bfcf9fb1e58725bfb0e7582".to_string(),
        }
    }

    #[tokio::test]
    async fn test_successful_submission_is_confirmed() {
        let server = MockRelayerServer::start(MockConfig::default()).unwrap();
        let backend = RelayerBackend::new(&server.base_url()).unwrap();

        let outcome = backend.submit(&request()).await;
        match outcome {
            TransferOutcome::Confirmed { hash } => {
                assert!(hash.starts_with("0x"));
                assert_eq!(hash.len(), 66);
            }
            other => panic!("Expected confirmed outcome, got {:?}", other),
        }
        assert_eq!(server.request_count(), 1);
    }

    #[tokio::test]
    async fn test_rejected_submission_is_failed() {
        let server = MockRelayerServer::start(MockConfig {
            fail_transfers: true,
            ..Default::default()
        })
        .unwrap();
        let backend = RelayerBackend::new(&server.base_url()).unwrap();

        let outcome = backend.submit(&request()).await;
        match outcome {
            TransferOutcome::Failed { reason } => {
                assert!(reason.to_lowercase().contains("failed"));
            }
            other => panic!("Expected failed outcome, got {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_ambiguous_body_is_unknown() {
        let server = MockRelayerServer::start(MockConfig {
            ambiguous_responses: true,
            ..Default::default()
        })
        .unwrap();
        let backend = RelayerBackend::new(&server.base_url()).unwrap();

        let outcome = backend.submit(&request()).await;
        assert!(matches!(outcome, TransferOutcome::Unknown { .. }));
    }

    #[tokio::test]
    async fn test_connection_refused_is_failed() {
        // Port from a server that has already shut down.
        let url = {
            let mut server = MockRelayerServer::start(MockConfig::default()).unwrap();
            let url = server.base_url();
            server.stop();
            url
        };
        let backend = RelayerBackend::new(&url).unwrap();

        let outcome = backend.submit(&request()).await;
        assert!(matches!(outcome, TransferOutcome::Failed { .. }));
    }

    #[test]
    fn test_response_mapping() {
        let confirmed = map_transfer_response(RelayerTransferResponse {
            success: true,
            transaction_hash: Some("0xabc".to_string()),
            status: Some("success".to_string()),
            message: None,
        });
        assert!(confirmed.is_confirmed());

        let failed = map_transfer_response(RelayerTransferResponse {
            success: false,
            transaction_hash: None,
            status: Some("failed".to_string()),
            message: Some("insufficient funds".to_string()),
        });
        assert_eq!(
            failed,
            TransferOutcome::Failed {
                reason: "insufficient funds".to_string()
            }
        );

        // success flag without a conclusive status stays unknown
        let unknown = map_transfer_response(RelayerTransferResponse {
            success: true,
            transaction_hash: None,
            status: Some("pending".to_string()),
            message: None,
        });
        assert!(matches!(unknown, TransferOutcome::Unknown { .. }));
    }
}
