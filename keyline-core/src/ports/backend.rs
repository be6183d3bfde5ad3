//! Transfer backend and balance source ports
//!
//! Defines the interfaces for submitting transfers and reading balances.
//! The transfer service uses these traits to try a primary backend and a
//! fallback without knowing the specifics of each path.

use async_trait::async_trait;
use rust_decimal::Decimal;

use crate::domain::result::Result;

/// A transfer ready for submission
#[derive(Debug, Clone)]
pub struct TransferRequest {
    pub from_address: String,
    pub to_address: String,
    /// Amount in USDC base units (6 decimals)
    pub amount_units: u64,
    pub chain_name: String,
    pub usdc_address: String,
}

/// Outcome of one submission attempt
///
/// `Unknown` means the backend may have accepted the transfer (e.g. a
/// timeout after the request was sent). A fallback backend must only run
/// after `Failed`; running it after `Unknown` risks a double transfer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    Confirmed { hash: String },
    Failed { reason: String },
    Unknown { reason: String },
}

impl TransferOutcome {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, TransferOutcome::Confirmed { .. })
    }
}

/// Transfer backend trait
///
/// Implementations encode every failure mode into the tagged outcome; they
/// never mutate balances themselves. Bookkeeping is applied by the transfer
/// service, and only after a confirmed outcome.
#[async_trait]
pub trait TransferBackend: Send + Sync {
    /// Backend name (e.g., "relayer", "direct")
    fn name(&self) -> &str;

    /// Submit a transfer and report the tagged outcome
    async fn submit(&self, request: &TransferRequest) -> TransferOutcome;
}

/// Balance source trait
///
/// Implementations resolve the current USDC balance for an address. Errors
/// are surfaced for user-triggered refreshes and logged for background
/// polling.
#[async_trait]
pub trait BalanceSource: Send + Sync {
    async fn fetch_balance(&self, address: &str) -> Result<Decimal>;
}
