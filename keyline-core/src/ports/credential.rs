//! Platform credential port
//!
//! Defines the interface to the passkey-style authenticator used as the
//! login gate. Every ceremony takes a fresh random challenge generated at
//! call time; challenges are never reused or zeroed.

use async_trait::async_trait;
use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::domain::result::Result;

/// Challenge bytes for a single credential ceremony
pub type Challenge = [u8; 32];

/// Generate a random challenge for one create/assert attempt
pub fn fresh_challenge() -> Challenge {
    let mut challenge = [0u8; 32];
    rand::thread_rng().fill_bytes(&mut challenge);
    challenge
}

/// A public-key credential returned by the authenticator
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Credential {
    pub id: String,
    /// Base64-encoded public key bytes
    pub public_key: String,
}

/// Platform credential provider trait
///
/// Implementations wrap whatever authenticator is available. The session
/// service tries `get_credential` first and falls back to
/// `create_credential` when no credential exists yet.
#[async_trait]
pub trait CredentialProvider: Send + Sync {
    /// Provider name (e.g., "device-key")
    fn name(&self) -> &str;

    /// Whether the authenticator is available in this environment
    fn is_available(&self) -> bool;

    /// Retrieve an existing credential
    async fn get_credential(&self, challenge: &Challenge) -> Result<Credential>;

    /// Create a new credential for the given username
    async fn create_credential(&self, username: &str, challenge: &Challenge) -> Result<Credential>;

    /// Re-assert user presence (the second authentication step for
    /// high-risk transfers)
    async fn assert_user(&self, challenge: &Challenge) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fresh_challenges_differ() {
        // A zeroed or constant challenge would defeat the ceremony.
        let a = fresh_challenge();
        let b = fresh_challenge();
        assert_ne!(a, [0u8; 32]);
        assert_ne!(a, b);
    }
}
