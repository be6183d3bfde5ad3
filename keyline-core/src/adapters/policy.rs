//! Compliance policy implementations

use rust_decimal::Decimal;

use crate::ports::{CompliancePolicy, Screening};

/// Denylist compliance policy
///
/// Blocks recipients whose address contains any configured denylist entry
/// (case-insensitive). Deterministic: the same transfer always screens the
/// same way.
pub struct DenylistPolicy {
    denylist: Vec<String>,
}

impl DenylistPolicy {
    pub fn new(denylist: Vec<String>) -> Self {
        Self {
            denylist: denylist
                .into_iter()
                .map(|entry| entry.to_lowercase())
                .filter(|entry| !entry.is_empty())
                .collect(),
        }
    }
}

impl CompliancePolicy for DenylistPolicy {
    fn name(&self) -> &str {
        "denylist"
    }

    fn screen(&self, _amount: Decimal, recipient: &str) -> Screening {
        let recipient = recipient.to_lowercase();
        for entry in &self.denylist {
            if recipient.contains(entry) {
                return Screening::Blocked {
                    rule: "Recipient denylist".to_string(),
                    reason: format!("Recipient matches denylist entry \"{}\"", entry),
                };
            }
        }
        Screening::Clear
    }
}
