//! Device key credential provider
//!
//! Stands in for the platform passkey authenticator: a key pair generated on
//! first login and kept in `credential.json` under the keyline directory.
//! Assertions sign the caller's challenge with the stored secret. This is
//! demonstration-grade key handling, not custody.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::Engine;
use rand::RngCore;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

use crate::domain::result::{Error, Result};
use crate::ports::credential::{Challenge, Credential, CredentialProvider};

/// Stored credential record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StoredCredential {
    id: String,
    username: String,
    /// Base64-encoded public key bytes
    public_key: String,
    /// Base64-encoded secret bytes (demo-grade)
    secret: String,
}

/// Credential provider backed by a key file on the device
pub struct DeviceKeyProvider {
    path: PathBuf,
}

impl DeviceKeyProvider {
    pub fn new(keyline_dir: &Path) -> Self {
        Self {
            path: keyline_dir.join("credential.json"),
        }
    }

    fn load(&self) -> Result<Option<StoredCredential>> {
        match std::fs::read_to_string(&self.path) {
            Ok(content) => {
                let stored = serde_json::from_str(&content)
                    .map_err(|_| Error::credential("Stored credential is unreadable"))?;
                Ok(Some(stored))
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(Error::credential(format!(
                "Cannot read stored credential: {}",
                e
            ))),
        }
    }

    fn save(&self, stored: &StoredCredential) -> Result<()> {
        let content = serde_json::to_string_pretty(stored)?;
        std::fs::write(&self.path, content)
            .map_err(|e| Error::credential(format!("Cannot store credential: {}", e)))?;
        Ok(())
    }

    /// Sign a challenge with the stored secret (digest, not a real signature
    /// scheme)
    fn sign(stored: &StoredCredential, challenge: &Challenge) -> Result<Vec<u8>> {
        let secret = base64::engine::general_purpose::STANDARD
            .decode(&stored.secret)
            .map_err(|_| Error::credential("Stored credential secret is corrupt"))?;
        let mut hasher = Sha256::new();
        hasher.update(&secret);
        hasher.update(challenge);
        Ok(hasher.finalize().to_vec())
    }
}

#[async_trait]
impl CredentialProvider for DeviceKeyProvider {
    fn name(&self) -> &str {
        "device-key"
    }

    fn is_available(&self) -> bool {
        true
    }

    async fn get_credential(&self, challenge: &Challenge) -> Result<Credential> {
        let stored = self
            .load()?
            .ok_or_else(|| Error::credential("No credential registered on this device"))?;

        // Assertion must succeed before the credential is handed back
        Self::sign(&stored, challenge)?;

        Ok(Credential {
            id: stored.id,
            public_key: stored.public_key,
        })
    }

    async fn create_credential(&self, username: &str, _challenge: &Challenge) -> Result<Credential> {
        let mut secret = [0u8; 32];
        rand::thread_rng().fill_bytes(&mut secret);

        // Public key derived from the secret; enough to bind an address to
        // this credential in the demo.
        let mut hasher = Sha256::new();
        hasher.update(secret);
        let public = hasher.finalize();

        let stored = StoredCredential {
            id: Uuid::new_v4().to_string(),
            username: username.to_string(),
            public_key: base64::engine::general_purpose::STANDARD.encode(public),
            secret: base64::engine::general_purpose::STANDARD.encode(secret),
        };
        self.save(&stored)?;

        Ok(Credential {
            id: stored.id,
            public_key: stored.public_key,
        })
    }

    async fn assert_user(&self, challenge: &Challenge) -> Result<()> {
        let stored = self
            .load()?
            .ok_or_else(|| Error::credential("No credential registered on this device"))?;
        Self::sign(&stored, challenge)?;
        Ok(())
    }
}

/// Credential provider that is never available
///
/// Models the environment where the platform credential API is missing.
pub struct UnavailableCredentialProvider;

#[async_trait]
impl CredentialProvider for UnavailableCredentialProvider {
    fn name(&self) -> &str {
        "unavailable"
    }

    fn is_available(&self) -> bool {
        false
    }

    async fn get_credential(&self, _challenge: &Challenge) -> Result<Credential> {
        Err(Error::credential(
            "Platform credentials are not supported in this environment",
        ))
    }

    async fn create_credential(&self, _username: &str, _challenge: &Challenge) -> Result<Credential> {
        Err(Error::credential(
            "Platform credentials are not supported in this environment",
        ))
    }

    async fn assert_user(&self, _challenge: &Challenge) -> Result<()> {
        Err(Error::credential(
            "Platform credentials are not supported in this environment",
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ports::credential::fresh_challenge;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_get_before_create_fails() {
        let dir = tempdir().unwrap();
        let provider = DeviceKeyProvider::new(dir.path());

        let result = provider.get_credential(&fresh_challenge()).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_create_then_get_returns_same_credential() {
        let dir = tempdir().unwrap();
        let provider = DeviceKeyProvider::new(dir.path());

        let created = provider
            .create_credential("casey", &fresh_challenge())
            .await
            .unwrap();
        let fetched = provider.get_credential(&fresh_challenge()).await.unwrap();

        assert_eq!(created.id, fetched.id);
        assert_eq!(created.public_key, fetched.public_key);
    }

    #[tokio::test]
    async fn test_assert_user_requires_stored_credential() {
        let dir = tempdir().unwrap();
        let provider = DeviceKeyProvider::new(dir.path());

        assert!(provider.assert_user(&fresh_challenge()).await.is_err());

        provider
            .create_credential("casey", &fresh_challenge())
            .await
            .unwrap();
        assert!(provider.assert_user(&fresh_challenge()).await.is_ok());
    }

    #[tokio::test]
    async fn test_unavailable_provider() {
        let provider = UnavailableCredentialProvider;
        assert!(!provider.is_available());
        let err = provider
            .get_credential(&fresh_challenge())
            .await
            .unwrap_err();
        assert!(err.to_string().contains("not supported"));
    }
}
