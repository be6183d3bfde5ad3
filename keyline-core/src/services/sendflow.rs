//! Send flow state machine
//!
//! Drives the send workflow through its UI-visible steps:
//! form → review → authenticating (high risk only) → processing →
//! done | blocked | failed. Validation gates form → review; terminal steps
//! reset the form.

use serde::Serialize;

use crate::domain::result::{Error, FieldErrors, Result};
use crate::domain::risk::RiskTier;
use crate::domain::transaction::parse_amount;
use crate::services::transfer::{SendReport, SendStatus, TransferService};

/// Step of the send flow
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SendStep {
    Form,
    Review,
    Authenticating,
    Processing,
    Done,
    Blocked,
    Failed,
}

impl SendStep {
    pub fn is_terminal(&self) -> bool {
        matches!(self, SendStep::Done | SendStep::Blocked | SendStep::Failed)
    }
}

/// Send flow state
#[derive(Debug)]
pub struct SendFlow {
    step: SendStep,
    recipient: String,
    amount: String,
    risk: Option<RiskTier>,
    errors: FieldErrors,
    report: Option<SendReport>,
}

impl Default for SendFlow {
    fn default() -> Self {
        Self::new()
    }
}

impl SendFlow {
    pub fn new() -> Self {
        Self {
            step: SendStep::Form,
            recipient: String::new(),
            amount: String::new(),
            risk: None,
            errors: FieldErrors::default(),
            report: None,
        }
    }

    pub fn step(&self) -> SendStep {
        self.step
    }

    pub fn risk(&self) -> Option<RiskTier> {
        self.risk
    }

    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn report(&self) -> Option<&SendReport> {
        self.report.as_ref()
    }

    pub fn recipient(&self) -> &str {
        &self.recipient
    }

    pub fn amount(&self) -> &str {
        &self.amount
    }

    /// form → review, on passing validation
    ///
    /// On validation failure the flow stays on the form with field errors
    /// set.
    pub fn review(
        &mut self,
        transfers: &TransferService,
        recipient: &str,
        amount: &str,
    ) -> Result<SendStep> {
        if self.step != SendStep::Form {
            return Err(Error::validation("Review is only reachable from the form"));
        }

        self.recipient = recipient.trim().to_string();
        self.amount = amount.trim().to_string();
        self.errors = transfers.validate_request(&self.recipient, &self.amount);

        if self.errors.is_empty() {
            let parsed = parse_amount(&self.amount)?;
            self.risk = Some(transfers.classify(parsed, &self.recipient));
            self.step = SendStep::Review;
        }
        Ok(self.step)
    }

    /// review → form, discarding nothing but the step
    pub fn back(&mut self) -> Result<SendStep> {
        if self.step != SendStep::Review {
            return Err(Error::validation("Back is only reachable from review"));
        }
        self.step = SendStep::Form;
        Ok(self.step)
    }

    /// Confirm the reviewed transfer and drive it to a terminal step
    ///
    /// High-risk transfers pass through `authenticating`; a failed
    /// re-authentication returns the flow to review for another try. A
    /// conclusive backend failure also returns to review; blocked and done
    /// are terminal.
    pub async fn confirm(&mut self, transfers: &TransferService) -> Result<SendStep> {
        if self.step != SendStep::Review {
            return Err(Error::validation("Confirm is only reachable from review"));
        }

        if self.risk == Some(RiskTier::High) {
            self.step = SendStep::Authenticating;
        } else {
            self.step = SendStep::Processing;
        }

        let report = match transfers.send(&self.recipient, &self.amount).await {
            Ok(report) => report,
            Err(Error::Credential(msg)) => {
                // Re-auth failed: retryable, back to review
                self.step = SendStep::Review;
                return Err(Error::Credential(msg));
            }
            Err(e) => {
                self.step = SendStep::Review;
                return Err(e);
            }
        };

        self.step = match report.status {
            SendStatus::Approved { .. } => SendStep::Done,
            SendStatus::Blocked { .. } => SendStep::Blocked,
            SendStatus::Uncertain { .. } => SendStep::Failed,
            SendStatus::Failed { .. } => SendStep::Review,
        };
        self.report = Some(report);

        if self.step.is_terminal() {
            self.reset_form();
        }
        Ok(self.step)
    }

    /// Clear the form fields; the report survives for display
    fn reset_form(&mut self) {
        self.recipient.clear();
        self.amount.clear();
        self.errors = FieldErrors::default();
        self.risk = None;
    }
}
