//! Session service - login, logout, and rehydration
//!
//! Owns the session lifecycle against the credential provider and the
//! session store. Balance polling and transfers are separate services that
//! share the session state this service produces.

use std::sync::Arc;

use serde::Serialize;

use crate::domain::result::{Error, Result};
use crate::domain::transaction::format_usdc;
use crate::domain::{
    Session, SharedSession, SmartAccount, KEY_ACCOUNT, KEY_ADDRESS, KEY_AUTHENTICATED,
};
use crate::ports::credential::fresh_challenge;
use crate::ports::{CredentialProvider, SessionStore};

/// Session service for authentication and session persistence
pub struct SessionService {
    store: Arc<dyn SessionStore>,
    credentials: Arc<dyn CredentialProvider>,
}

impl SessionService {
    pub fn new(store: Arc<dyn SessionStore>, credentials: Arc<dyn CredentialProvider>) -> Self {
        Self { store, credentials }
    }

    /// Rehydrate the session from the store
    ///
    /// A corrupt stored account is discarded and the session comes back
    /// unauthenticated; rehydration never fails the caller over bad
    /// persisted data.
    pub fn initialize(&self) -> Result<Session> {
        let authenticated = self
            .store
            .get(KEY_AUTHENTICATED)?
            .map(|v| v == "true")
            .unwrap_or(false);
        let address = self.store.get(KEY_ADDRESS)?.unwrap_or_default();
        let account_data = self.store.get(KEY_ACCOUNT)?;

        if !authenticated || address.is_empty() {
            return Ok(Session::logged_out());
        }

        match account_data.as_deref().map(SmartAccount::from_stored) {
            Some(Ok(account)) => Ok(Session {
                authenticated: true,
                address,
                account: Some(account),
                balance: rust_decimal::Decimal::ZERO,
            }),
            Some(Err(_)) | None => {
                // Corrupt or missing account data: drop it and start over
                self.store.remove(KEY_ACCOUNT)?;
                self.store.remove(KEY_AUTHENTICATED)?;
                self.store.remove(KEY_ADDRESS)?;
                Ok(Session::logged_out())
            }
        }
    }

    /// Authenticate and create the session
    ///
    /// Tries to assert an existing credential first and registers a new one
    /// for the username when none exists.
    pub async fn login(&self, username: &str) -> Result<Session> {
        if username.trim().is_empty() {
            return Err(Error::validation("Username is required"));
        }
        if !self.credentials.is_available() {
            return Err(Error::credential(format!(
                "Credential provider \"{}\" is not available in this environment",
                self.credentials.name()
            )));
        }

        let credential = match self.credentials.get_credential(&fresh_challenge()).await {
            Ok(credential) => credential,
            Err(_) => {
                self.credentials
                    .create_credential(username, &fresh_challenge())
                    .await?
            }
        };

        let account = SmartAccount::from_credential(&credential)?;

        self.store.set(KEY_AUTHENTICATED, "true")?;
        self.store.set(KEY_ADDRESS, &account.address)?;
        self.store.set(KEY_ACCOUNT, &account.to_stored()?)?;

        Ok(Session::authenticated(account))
    }

    /// Clear the persisted session
    pub fn logout(&self) -> Result<()> {
        self.store.remove(KEY_AUTHENTICATED)?;
        self.store.remove(KEY_ADDRESS)?;
        self.store.remove(KEY_ACCOUNT)?;
        Ok(())
    }

    /// Summarize a session for display
    pub fn status(&self, session: &SharedSession) -> StatusSummary {
        let session = session.lock().map(|s| s.clone()).unwrap_or_else(|_| Session::logged_out());
        StatusSummary {
            authenticated: session.is_authenticated(),
            address: session.address.clone(),
            balance: format_usdc(session.balance),
            credential_id: session
                .account
                .as_ref()
                .map(|a| a.credential_id.clone()),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusSummary {
    pub authenticated: bool,
    pub address: String,
    pub balance: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credential_id: Option<String>,
}
