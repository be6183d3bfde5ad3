//! Simulated balance ledger and the direct-write transfer path
//!
//! The ledger is an explicit, in-memory address → balance map owned by the
//! context: constructed at session start, cleared at logout, never global.
//! It makes the demo self-consistent in the absence of real chain state.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use rust_decimal::Decimal;
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::adapters::rpc::RpcGatewayClient;
use crate::domain::result::{Error, Result};
use crate::domain::transaction::from_base_units;
use crate::ports::{BalanceSource, TransferBackend, TransferOutcome, TransferRequest};

/// In-memory address → balance map
#[derive(Debug, Default)]
pub struct SimulatedLedger {
    balances: Mutex<HashMap<String, Decimal>>,
}

impl SimulatedLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Balance for an address, `None` when never seeded
    pub fn balance_of(&self, address: &str) -> Option<Decimal> {
        self.balances
            .lock()
            .ok()
            .and_then(|map| map.get(&normalize(address)).copied())
    }

    /// Set the balance of an address
    pub fn seed(&self, address: &str, balance: Decimal) {
        if let Ok(mut map) = self.balances.lock() {
            map.insert(normalize(address), balance);
        }
    }

    /// Clear every entry
    pub fn reset(&self) {
        if let Ok(mut map) = self.balances.lock() {
            map.clear();
        }
    }

    /// Move `amount` from one address to another
    ///
    /// Debit and credit are applied under one lock so the sum across the
    /// transfer is conserved. Fails without mutating anything when the
    /// sender is unseeded or short.
    pub fn apply_transfer(&self, from: &str, to: &str, amount: Decimal) -> Result<Decimal> {
        let mut map = self
            .balances
            .lock()
            .map_err(|_| Error::storage("Ledger lock poisoned"))?;

        let from_key = normalize(from);
        let to_key = normalize(to);

        let sender = map
            .get(&from_key)
            .copied()
            .ok_or_else(|| Error::backend("Sender has no ledger balance"))?;
        if sender < amount {
            return Err(Error::backend("Insufficient ledger balance"));
        }

        let new_sender = sender - amount;
        map.insert(from_key, new_sender);
        let receiver = map.get(&to_key).copied().unwrap_or(Decimal::ZERO);
        map.insert(to_key, receiver + amount);

        Ok(new_sender)
    }
}

fn normalize(address: &str) -> String {
    address.to_lowercase()
}

/// Direct-write transfer backend
///
/// Fallback submission path: no network hop, just a funds check against the
/// ledger. Returns a deterministic simulated hash on success. Bookkeeping
/// stays with the transfer service; this backend only adjudicates.
pub struct LedgerBackend {
    ledger: Arc<SimulatedLedger>,
}

impl LedgerBackend {
    pub fn new(ledger: Arc<SimulatedLedger>) -> Self {
        Self { ledger }
    }
}

#[async_trait]
impl TransferBackend for LedgerBackend {
    fn name(&self) -> &str {
        "direct"
    }

    async fn submit(&self, request: &TransferRequest) -> TransferOutcome {
        let amount = from_base_units(request.amount_units);
        match self.ledger.balance_of(&request.from_address) {
            Some(balance) if balance >= amount => TransferOutcome::Confirmed {
                hash: simulated_hash(request),
            },
            Some(_) => TransferOutcome::Failed {
                reason: "Insufficient ledger balance".to_string(),
            },
            None => TransferOutcome::Failed {
                reason: "Sender has no ledger balance".to_string(),
            },
        }
    }
}

/// Simulated transaction hash: digest of the transfer tuple plus a nonce
fn simulated_hash(request: &TransferRequest) -> String {
    let mut hasher = Sha256::new();
    hasher.update(request.from_address.as_bytes());
    hasher.update(request.to_address.as_bytes());
    hasher.update(request.amount_units.to_le_bytes());
    hasher.update(Uuid::new_v4().as_bytes());
    format!("0x{}", hex::encode(hasher.finalize()))
}

/// Ledger-overlay balance source
///
/// The canonical balance strategy: a seeded ledger entry wins; otherwise the
/// balance is read once from the chain via the RPC gateway and the ledger is
/// seeded with it for the rest of the session. Without an RPC client the
/// overlay starts every unseeded address at zero.
pub struct OverlayBalanceSource {
    ledger: Arc<SimulatedLedger>,
    rpc: Option<Arc<RpcGatewayClient>>,
    usdc_address: String,
}

impl OverlayBalanceSource {
    pub fn new(
        ledger: Arc<SimulatedLedger>,
        rpc: Option<Arc<RpcGatewayClient>>,
        usdc_address: impl Into<String>,
    ) -> Self {
        Self {
            ledger,
            rpc,
            usdc_address: usdc_address.into(),
        }
    }
}

#[async_trait]
impl BalanceSource for OverlayBalanceSource {
    async fn fetch_balance(&self, address: &str) -> Result<Decimal> {
        if let Some(balance) = self.ledger.balance_of(address) {
            return Ok(balance);
        }

        let balance = match &self.rpc {
            Some(rpc) => rpc
                .get_usdc_balance(address, &self.usdc_address)
                .await
                .map_err(|e| Error::backend(e.to_string()))?,
            None => Decimal::ZERO,
        };

        self.ledger.seed(address, balance);
        Ok(balance)
    }
}
