//! Transaction record domain model and amount/address helpers

use chrono::{DateTime, Utc};
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::result::{Error, Result};

/// USDC carries six decimal places on every supported chain
pub const USDC_DECIMALS: u32 = 6;

/// Final status of a transfer attempt, as shown in the history view
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionStatus {
    Approved,
    Blocked,
}

/// A display-only record of a transfer attempt
///
/// Held in memory for the current session; there is no durable transaction
/// store and no ordering or uniqueness invariant.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionRecord {
    pub id: Uuid,
    pub recipient: String,
    pub amount: Decimal,
    pub timestamp: DateTime<Utc>,
    pub status: TransactionStatus,
    /// Transaction hash reported by the backend, when one was produced
    pub hash: Option<String>,
    /// Rule that blocked the transfer, for blocked records
    pub rule_triggered: Option<String>,
}

impl TransactionRecord {
    pub fn approved(recipient: impl Into<String>, amount: Decimal, hash: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            amount,
            timestamp: Utc::now(),
            status: TransactionStatus::Approved,
            hash: Some(hash.into()),
            rule_triggered: None,
        }
    }

    pub fn blocked(recipient: impl Into<String>, amount: Decimal, rule: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            recipient: recipient.into(),
            amount,
            timestamp: Utc::now(),
            status: TransactionStatus::Blocked,
            hash: None,
            rule_triggered: Some(rule.into()),
        }
    }
}

/// Validate a recipient address against the canonical 40-hex-digit form
pub fn validate_address(address: &str) -> bool {
    let re = Regex::new(r"^0x[0-9a-fA-F]{40}$").unwrap();
    re.is_match(address)
}

/// Parse a user-entered USDC amount
///
/// Accepts positive decimal strings; rejects non-numeric input, zero, and
/// negative values before any backend is contacted.
pub fn parse_amount(input: &str) -> Result<Decimal> {
    let amount: Decimal = input
        .trim()
        .parse()
        .map_err(|_| Error::validation("Amount must be a number"))?;
    if amount <= Decimal::ZERO {
        return Err(Error::validation("Amount must be a positive number"));
    }
    Ok(amount)
}

/// Convert a decimal USDC amount to integer base units (6 decimals)
///
/// Truncates sub-unit precision, matching standard token transfer encoding.
pub fn to_base_units(amount: Decimal) -> Result<u64> {
    let scaled = amount * Decimal::from(10u64.pow(USDC_DECIMALS));
    scaled
        .trunc()
        .to_u64()
        .ok_or_else(|| Error::validation("Amount out of range"))
}

/// Convert integer base units back to a decimal USDC amount
pub fn from_base_units(units: u64) -> Decimal {
    Decimal::from_i128_with_scale(units as i128, USDC_DECIMALS).normalize()
}

/// Shorten an address for display: `0x1234...abcd`
pub fn format_address(address: &str) -> String {
    if address.len() < 10 {
        return address.to_string();
    }
    format!("{}...{}", &address[..6], &address[address.len() - 4..])
}

/// Format a balance or amount with two decimal places
pub fn format_usdc(amount: Decimal) -> String {
    format!("{:.2}", amount)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_validate_address() {
        assert!(validate_address(
            "0x742d35Cc6634C0532925a3b8D4C9db96590c6C87"
        ));
        assert!(!validate_address("0x742d35Cc"));
        assert!(!validate_address(
            "742d35Cc6634C0532925a3b8D4C9db96590c6C87ab"
        ));
        assert!(!validate_address(
            "0x742d35Cc6634C0532925a3b8D4C9db96590c6CZZ"
        ));
        assert!(!validate_address(""));
    }

    #[test]
    fn test_parse_amount_rejects_bad_input() {
        assert!(parse_amount("abc").is_err());
        assert!(parse_amount("").is_err());
        assert!(parse_amount("0").is_err());
        assert!(parse_amount("-5").is_err());
    }

    #[test]
    fn test_parse_amount_accepts_positive_decimals() {
        assert_eq!(
            parse_amount("12.34").unwrap(),
            Decimal::from_str("12.34").unwrap()
        );
        assert_eq!(parse_amount(" 5 ").unwrap(), Decimal::from(5));
    }

    #[test]
    fn test_base_unit_round_trip() {
        let amount = Decimal::from_str("25.50").unwrap();
        let units = to_base_units(amount).unwrap();
        assert_eq!(units, 25_500_000);
        assert_eq!(from_base_units(units), amount.normalize());
    }

    #[test]
    fn test_base_units_truncate_excess_precision() {
        let amount = Decimal::from_str("0.0000019").unwrap();
        assert_eq!(to_base_units(amount).unwrap(), 1);
    }

    #[test]
    fn test_format_address() {
        assert_eq!(
            format_address("0x742d35Cc6634C0532925a3b8D4C9db96590c6C87"),
            "0x742d...6C87"
        );
        assert_eq!(format_address("0x1234"), "0x1234");
    }

    #[test]
    fn test_format_usdc() {
        assert_eq!(format_usdc(Decimal::from(100)), "100.00");
        assert_eq!(format_usdc(Decimal::from_str("75.5").unwrap()), "75.50");
    }
}
