//! Smart account domain model
//!
//! A `SmartAccount` is an opaque association between a locally held key pair
//! and a wallet address. The key material is demonstration-grade: it is
//! generated on device, never escrowed, and carries no custody guarantees.

use base64::Engine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::domain::result::{Error, Result};
use crate::ports::credential::Credential;

/// A local smart account bound to a platform credential
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SmartAccount {
    /// Wallet address in canonical `0x` + 40 hex form
    pub address: String,
    /// Identifier of the credential this account was derived from
    pub credential_id: String,
    /// Base64-encoded public key bytes
    pub public_key: String,
    pub created_at: DateTime<Utc>,
}

impl SmartAccount {
    /// Derive a smart account from a platform credential
    ///
    /// The address is the first 20 bytes of the SHA-256 digest of the
    /// credential's public key, hex-encoded with a `0x` prefix.
    pub fn from_credential(credential: &Credential) -> Result<Self> {
        let key_bytes = base64::engine::general_purpose::STANDARD
            .decode(&credential.public_key)
            .map_err(|_| Error::credential("Credential public key is not valid base64"))?;

        let mut hasher = Sha256::new();
        hasher.update(&key_bytes);
        let digest = hasher.finalize();
        let address = format!("0x{}", hex::encode(&digest[..20]));

        Ok(Self {
            address,
            credential_id: credential.id.clone(),
            public_key: credential.public_key.clone(),
            created_at: Utc::now(),
        })
    }

    /// Serialize for the session store
    pub fn to_stored(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }

    /// Deserialize from the session store
    pub fn from_stored(data: &str) -> Result<Self> {
        Ok(serde_json::from_str(data)?)
    }
}
