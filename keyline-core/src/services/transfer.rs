//! Transfer service - validation, risk gating, and submission
//!
//! Orchestrates a send end to end: field validation, risk classification,
//! re-authentication and compliance screening for high-risk transfers, then
//! submission through a primary backend with an optional fallback. The
//! fallback runs only after a conclusively failed attempt; an unknown
//! outcome stops the chain because the first attempt may have landed.
//! Balances move only on a confirmed outcome.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use serde::Serialize;

use crate::adapters::ledger::SimulatedLedger;
use crate::domain::result::{Error, FieldErrors, Result};
use crate::domain::risk::{self, RiskTier};
use crate::domain::transaction::{
    parse_amount, to_base_units, validate_address, TransactionRecord,
};
use crate::domain::SharedSession;
use crate::ports::credential::fresh_challenge;
use crate::ports::{
    CompliancePolicy, CredentialProvider, Screening, TransferBackend, TransferOutcome,
    TransferRequest,
};

/// Transfer policy knobs resolved from configuration
#[derive(Debug, Clone)]
pub struct TransferSettings {
    pub chain_name: String,
    pub usdc_address: String,
    pub risk_threshold: Decimal,
    pub flagged_recipient_substring: String,
    /// Reject amounts above the cached balance before contacting a backend
    pub strict_balance_check: bool,
}

/// Transfer service for the send workflow
pub struct TransferService {
    session: SharedSession,
    ledger: Arc<SimulatedLedger>,
    credentials: Arc<dyn CredentialProvider>,
    policy: Arc<dyn CompliancePolicy>,
    primary: Arc<dyn TransferBackend>,
    fallback: Option<Arc<dyn TransferBackend>>,
    settings: TransferSettings,
    history: Mutex<Vec<TransactionRecord>>,
}

/// Outcome of a send, in the shape the UI layer renders
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "state", rename_all = "lowercase")]
pub enum SendStatus {
    /// Backend confirmed the transfer
    Approved { hash: String },
    /// Compliance screening terminated the attempt
    Blocked { rule: String, reason: String },
    /// Every attempted backend conclusively failed
    Failed { reason: String },
    /// The last attempt ended ambiguously; nothing was retried
    Uncertain { reason: String },
}

#[derive(Debug, Clone, Serialize)]
pub struct SendReport {
    #[serde(flatten)]
    pub status: SendStatus,
    pub risk: RiskTier,
    /// Backend that produced the final outcome, when one was reached
    #[serde(skip_serializing_if = "Option::is_none")]
    pub backend: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record: Option<TransactionRecord>,
}

impl SendReport {
    pub fn is_approved(&self) -> bool {
        matches!(self.status, SendStatus::Approved { .. })
    }
}

impl TransferService {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        session: SharedSession,
        ledger: Arc<SimulatedLedger>,
        credentials: Arc<dyn CredentialProvider>,
        policy: Arc<dyn CompliancePolicy>,
        primary: Arc<dyn TransferBackend>,
        fallback: Option<Arc<dyn TransferBackend>>,
        settings: TransferSettings,
    ) -> Self {
        Self {
            session,
            ledger,
            credentials,
            policy,
            primary,
            fallback,
            settings,
            history: Mutex::new(Vec::new()),
        }
    }

    /// Validate the send form fields
    ///
    /// Returns per-field errors; an empty result means the request may
    /// proceed. No backend is contacted here.
    pub fn validate_request(&self, to_address: &str, amount: &str) -> FieldErrors {
        let mut errors = FieldErrors::default();

        if to_address.trim().is_empty() {
            errors.recipient = Some("Recipient address is required".to_string());
        } else if !validate_address(to_address.trim()) {
            errors.recipient = Some("Invalid recipient address".to_string());
        }

        match parse_amount(amount) {
            Err(e) => {
                errors.amount = Some(match e {
                    Error::Validation(msg) => msg,
                    other => other.to_string(),
                });
            }
            Ok(parsed) => {
                if self.settings.strict_balance_check {
                    let balance = self.cached_balance();
                    if parsed > balance {
                        errors.amount = Some(format!(
                            "Amount exceeds available balance of {:.2}",
                            balance
                        ));
                    }
                }
            }
        }

        errors
    }

    /// Classify a validated request
    pub fn classify(&self, amount: Decimal, to_address: &str) -> RiskTier {
        risk::classify(
            amount,
            to_address,
            self.settings.risk_threshold,
            &self.settings.flagged_recipient_substring,
        )
    }

    /// Submit a transfer end to end
    pub async fn send(&self, to_address: &str, amount: &str) -> Result<SendReport> {
        let errors = self.validate_request(to_address, amount);
        if !errors.is_empty() {
            return Err(Error::Validation(errors.summary()));
        }
        let to_address = to_address.trim();
        let amount = parse_amount(amount)?;

        let (from_address, cached_balance) = {
            let session = self
                .session
                .lock()
                .map_err(|_| Error::storage("Session lock poisoned"))?;
            if !session.is_authenticated() {
                return Err(Error::credential("Not logged in"));
            }
            (session.address.clone(), session.balance)
        };

        let tier = self.classify(amount, to_address);

        if tier == RiskTier::High {
            // Second authentication step, then compliance screening
            self.credentials.assert_user(&fresh_challenge()).await?;

            if let Screening::Blocked { rule, reason } =
                self.policy.screen(amount, to_address)
            {
                let record = TransactionRecord::blocked(to_address, amount, rule.clone());
                self.push_record(record.clone());
                return Ok(SendReport {
                    status: SendStatus::Blocked { rule, reason },
                    risk: tier,
                    backend: None,
                    record: Some(record),
                });
            }
        }

        // The ledger adjudicates the fallback path and absorbs the
        // bookkeeping on success; make sure the sender is seeded with the
        // balance the session already trusts.
        if self.ledger.balance_of(&from_address).is_none() {
            self.ledger.seed(&from_address, cached_balance);
        }

        let request = TransferRequest {
            from_address: from_address.clone(),
            to_address: to_address.to_string(),
            amount_units: to_base_units(amount)?,
            chain_name: self.settings.chain_name.clone(),
            usdc_address: self.settings.usdc_address.clone(),
        };

        let (outcome, backend_name) = self.attempt_backends(&request).await;

        match outcome {
            TransferOutcome::Confirmed { hash } => {
                let new_balance = self
                    .ledger
                    .apply_transfer(&from_address, to_address, amount)?;
                if let Ok(mut session) = self.session.lock() {
                    session.balance = new_balance;
                }
                let record = TransactionRecord::approved(to_address, amount, hash.clone());
                self.push_record(record.clone());
                Ok(SendReport {
                    status: SendStatus::Approved { hash },
                    risk: tier,
                    backend: Some(backend_name),
                    record: Some(record),
                })
            }
            TransferOutcome::Failed { reason } => Ok(SendReport {
                status: SendStatus::Failed { reason },
                risk: tier,
                backend: Some(backend_name),
                record: None,
            }),
            TransferOutcome::Unknown { reason } => Ok(SendReport {
                status: SendStatus::Uncertain { reason },
                risk: tier,
                backend: Some(backend_name),
                record: None,
            }),
        }
    }

    /// Try the primary backend, then the fallback after a conclusive failure
    async fn attempt_backends(&self, request: &TransferRequest) -> (TransferOutcome, String) {
        let primary_outcome = self.primary.submit(request).await;

        // Only a conclusive failure opens the fallback; Confirmed and
        // Unknown both end the chain here.
        if matches!(primary_outcome, TransferOutcome::Failed { .. }) {
            if let Some(fallback) = &self.fallback {
                let fallback_outcome = fallback.submit(request).await;
                return (fallback_outcome, fallback.name().to_string());
            }
        }

        (primary_outcome, self.primary.name().to_string())
    }

    /// Records for the current session, newest first
    pub fn history(&self) -> Vec<TransactionRecord> {
        let mut records = self
            .history
            .lock()
            .map(|h| h.clone())
            .unwrap_or_default();
        records.reverse();
        records
    }

    fn push_record(&self, record: TransactionRecord) {
        if let Ok(mut history) = self.history.lock() {
            history.push(record);
        }
    }

    fn cached_balance(&self) -> Decimal {
        self.session
            .lock()
            .map(|s| s.balance)
            .unwrap_or(Decimal::ZERO)
    }
}
