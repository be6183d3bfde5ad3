//! Session domain model
//!
//! The session mirrors what the product persists client-side: an
//! authenticated flag, the wallet address, and the serialized smart account,
//! plus a cached balance that lives only in memory.

use std::sync::{Arc, Mutex};

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::domain::account::SmartAccount;

/// Persisted key: authenticated flag ("true" when logged in)
pub const KEY_AUTHENTICATED: &str = "walletAuthenticated";
/// Persisted key: wallet address
pub const KEY_ADDRESS: &str = "walletAddress";
/// Persisted key: serialized smart account
pub const KEY_ACCOUNT: &str = "smartAccount";

/// Wallet session state
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub authenticated: bool,
    /// Empty string when logged out
    pub address: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<SmartAccount>,
    /// Cached balance; refreshed by polling and confirmed transfers
    pub balance: Decimal,
}

impl Session {
    /// A fresh, unauthenticated session
    pub fn logged_out() -> Self {
        Self {
            authenticated: false,
            address: String::new(),
            account: None,
            balance: Decimal::ZERO,
        }
    }

    /// An authenticated session for the given account
    pub fn authenticated(account: SmartAccount) -> Self {
        Self {
            authenticated: true,
            address: account.address.clone(),
            account: Some(account),
            balance: Decimal::ZERO,
        }
    }

    pub fn is_authenticated(&self) -> bool {
        self.authenticated && self.account.is_some()
    }
}

/// Session state shared between services
///
/// The refresher and the transfer service both mutate the cached balance;
/// overlapping updates are last-write-wins, as the product specifies.
pub type SharedSession = Arc<Mutex<Session>>;

/// Wrap a session for sharing
pub fn shared(session: Session) -> SharedSession {
    Arc::new(Mutex::new(session))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_logged_out_session() {
        let session = Session::logged_out();
        assert!(!session.is_authenticated());
        assert_eq!(session.address, "");
        assert_eq!(session.balance, Decimal::ZERO);
    }

    #[test]
    fn test_authenticated_requires_account() {
        let mut session = Session::logged_out();
        // Flag alone is not enough; the account handle must be present.
        session.authenticated = true;
        assert!(!session.is_authenticated());
    }
}
