//! JSON-RPC gateway client
//!
//! Forwards JSON-RPC 2.0 requests to the public endpoint configured for the
//! active chain, and decodes ERC-20 `balanceOf` reads for USDC balances.

use std::time::Duration;

use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::{json, Value as JsonValue};

use crate::domain::transaction::{from_base_units, validate_address};

/// Selector for `balanceOf(address)`
const BALANCE_OF_SELECTOR: &str = "70a08231";

/// JSON-RPC gateway client for a single chain endpoint
#[derive(Debug, Clone)]
pub struct RpcGatewayClient {
    client: reqwest::Client,
    rpc_url: String,
    chain_name: String,
}

/// JSON-RPC 2.0 response envelope
#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<JsonValue>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

impl RpcGatewayClient {
    /// Create a client for one chain endpoint
    pub fn new(chain_name: &str, rpc_url: &str) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()?;

        Ok(Self {
            client,
            rpc_url: rpc_url.to_string(),
            chain_name: chain_name.to_string(),
        })
    }

    pub fn chain_name(&self) -> &str {
        &self.chain_name
    }

    /// Send a JSON-RPC 2.0 request and return the `result` value
    pub async fn call(&self, method: &str, params: JsonValue) -> Result<JsonValue> {
        let body = json!({
            "jsonrpc": "2.0",
            "id": 1,
            "method": method,
            "params": params,
        });

        let response = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| self.map_request_error(e))?;

        let status = response.status();
        if !status.is_success() {
            let details = response.text().await.unwrap_or_default();
            anyhow::bail!(
                "RPC request failed: HTTP {} from {}: {}",
                status.as_u16(),
                self.chain_name,
                details
            );
        }

        let data: RpcResponse = response
            .json()
            .await
            .context("Failed to parse RPC response")?;

        if let Some(error) = data.error {
            anyhow::bail!("RPC error {}: {}", error.code, error.message);
        }

        data.result
            .ok_or_else(|| anyhow::anyhow!("RPC response missing result"))
    }

    /// Read the USDC balance of an address via `eth_call` on the token
    /// contract, scaled from 6-decimal base units
    pub async fn get_usdc_balance(&self, address: &str, usdc_address: &str) -> Result<Decimal> {
        if !validate_address(address) {
            anyhow::bail!("Invalid address: {}", address);
        }

        let data = encode_balance_of(address);
        let params = json!([
            { "to": usdc_address, "data": data },
            "latest",
        ]);

        let result = self.call("eth_call", params).await?;
        let raw = result
            .as_str()
            .ok_or_else(|| anyhow::anyhow!("eth_call returned a non-string result"))?;

        let units = decode_uint(raw)?;
        Ok(from_base_units(units))
    }

    /// Map request errors to user-friendly messages
    fn map_request_error(&self, error: reqwest::Error) -> anyhow::Error {
        if error.is_timeout() {
            anyhow::anyhow!("RPC connection timed out after 30 seconds")
        } else if error.is_connect() {
            anyhow::anyhow!("Unable to connect to {} RPC endpoint", self.chain_name)
        } else {
            anyhow::anyhow!("RPC request failed: {}", error)
        }
    }
}

/// ABI-encode a `balanceOf(address)` call
fn encode_balance_of(address: &str) -> String {
    let bare = address.trim_start_matches("0x").to_lowercase();
    format!("0x{}{:0>64}", BALANCE_OF_SELECTOR, bare)
}

/// Decode a 0x-prefixed hex quantity into base units
fn decode_uint(raw: &str) -> Result<u64> {
    let bare = raw.trim_start_matches("0x");
    if bare.is_empty() {
        return Ok(0);
    }
    let value = u128::from_str_radix(bare, 16)
        .with_context(|| format!("Invalid hex quantity: {}", raw))?;
    u64::try_from(value).map_err(|_| anyhow::anyhow!("Balance exceeds representable range"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_encode_balance_of() {
        let data = encode_balance_of("0x742d35Cc6634C0532925a3b8D4C9db96590c6C87");
        assert!(data.starts_with("0x70a08231"));
        // 4-byte selector + 32-byte padded address
        assert_eq!(data.len(), 2 + 8 + 64);
        assert!(data.ends_with("742d35cc6634c0532925a3b8d4c9db96590c6c87"));
    }

    #[test]
    fn test_decode_uint() {
        assert_eq!(decode_uint("0x0").unwrap(), 0);
        assert_eq!(decode_uint("0x").unwrap(), 0);
        // 100.00 USDC in base units
        assert_eq!(decode_uint("0x5f5e100").unwrap(), 100_000_000);
        assert!(decode_uint("0xzz").is_err());
    }

    #[test]
    fn test_balance_scaling() {
        let balance = from_base_units(decode_uint("0x5f5e100").unwrap());
        assert_eq!(balance, Decimal::from_str("100").unwrap());
    }
}
