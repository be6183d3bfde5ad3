//! Risk tier classification

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Risk tier for a proposed transfer
///
/// High-tier transfers require a second authentication step and a compliance
/// screening before submission; low-tier transfers submit directly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskTier {
    Low,
    High,
}

impl RiskTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            RiskTier::Low => "low",
            RiskTier::High => "high",
        }
    }
}

/// Default amount threshold above which a transfer is high risk
pub fn default_threshold() -> Decimal {
    Decimal::new(1000, 0)
}

/// Default recipient substring that flags a transfer as high risk
pub const DEFAULT_FLAGGED_SUBSTRING: &str = "bad";

/// Classify a transfer by amount and recipient
///
/// Pure function of its inputs: amount above the threshold or a recipient
/// containing the flagged substring (case-insensitive) is high risk,
/// everything else is low.
pub fn classify(amount: Decimal, recipient: &str, threshold: Decimal, flagged: &str) -> RiskTier {
    if amount > threshold || recipient.to_lowercase().contains(&flagged.to_lowercase()) {
        RiskTier::High
    } else {
        RiskTier::Low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn classify_default(amount: &str, recipient: &str) -> RiskTier {
        classify(
            Decimal::from_str(amount).unwrap(),
            recipient,
            default_threshold(),
            DEFAULT_FLAGGED_SUBSTRING,
        )
    }

    #[test]
    fn test_amount_over_threshold_is_high() {
        assert_eq!(
            classify_default("1000.01", "0x8ba1f109551bd432803012645ac136c22c177ec9"),
            RiskTier::High
        );
    }

    #[test]
    fn test_amount_at_threshold_is_low() {
        assert_eq!(
            classify_default("1000", "0x8ba1f109551bd432803012645ac136c22c177ec9"),
            RiskTier::Low
        );
    }

    #[test]
    fn test_flagged_recipient_is_high() {
        assert_eq!(
            classify_default("10", "0xbad1f109551bd432803012645ac136c22c177ec9"),
            RiskTier::High
        );
        // Case-insensitive match
        assert_eq!(
            classify_default("10", "0xBAD1f109551bd432803012645ac136c22c177ec9"),
            RiskTier::High
        );
    }

    #[test]
    fn test_small_amount_clean_recipient_is_low() {
        assert_eq!(
            classify_default("999.99", "0x8ba1f109551bd432803012645ac136c22c177ec9"),
            RiskTier::Low
        );
    }

    #[test]
    fn test_classification_is_stateless() {
        // Repeated calls with the same inputs always agree, regardless of
        // what was classified in between.
        let a = classify_default("50", "0x8ba1f109551bd432803012645ac136c22c177ec9");
        let _ = classify_default("5000", "0xbad1f109551bd432803012645ac136c22c177ec9");
        let b = classify_default("50", "0x8ba1f109551bd432803012645ac136c22c177ec9");
        assert_eq!(a, b);
    }
}
