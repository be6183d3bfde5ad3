//! Keyline Core - Session, balance, and transfer logic for the smart wallet demo
//!
//! This crate implements the core domain logic following hexagonal architecture:
//!
//! - **domain**: Core business entities (Session, SmartAccount, TransactionRecord, risk tiers)
//! - **ports**: Trait definitions for external dependencies (CredentialProvider, TransferBackend, SessionStore)
//! - **services**: Business logic orchestration
//! - **adapters**: Concrete implementations (RPC gateway, relayer client, simulated ledger, file store)

pub mod adapters;
pub mod config;
pub mod domain;
pub mod ports;
pub mod services;

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;

use adapters::device_key::DeviceKeyProvider;
use adapters::file_store::FileSessionStore;
use adapters::ledger::{LedgerBackend, OverlayBalanceSource, SimulatedLedger};
use adapters::policy::DenylistPolicy;
use adapters::relayer::RelayerBackend;
use adapters::rpc::RpcGatewayClient;
use config::Config;
use ports::TransferBackend;
use services::*;

// Re-export commonly used types at crate root
pub use domain::result::{Error, FieldErrors};
pub use domain::{RiskTier, Session, SharedSession, SmartAccount, TransactionRecord, TransactionStatus};

/// Main context for Keyline operations
///
/// This is the primary entry point for all business logic. It holds the
/// configuration, the session state, and all services. The simulated ledger
/// is owned here: constructed with the context, cleared on logout, never a
/// module-level global.
pub struct KeylineContext {
    pub config: Config,
    pub session: SharedSession,
    pub ledger: Arc<SimulatedLedger>,
    pub logger: Arc<LoggingService>,
    pub session_service: SessionService,
    pub transfer_service: TransferService,
    pub refresher: BalanceRefresher,
}

impl KeylineContext {
    /// Create a new Keyline context
    pub fn new(keyline_dir: &Path, entry_point: EntryPoint, app_version: &str) -> Result<Self> {
        let config = Config::load(keyline_dir)?;
        let chain = config.active_chain()?.clone();

        let logger = Arc::new(LoggingService::new(keyline_dir, entry_point, app_version)?);
        let store = Arc::new(FileSessionStore::new(keyline_dir));
        let credentials: Arc<dyn ports::CredentialProvider> =
            Arc::new(DeviceKeyProvider::new(keyline_dir));
        let ledger = Arc::new(SimulatedLedger::new());

        let rpc = Arc::new(RpcGatewayClient::new(&config.default_chain, &chain.rpc_url)?);
        let balance_source = Arc::new(OverlayBalanceSource::new(
            Arc::clone(&ledger),
            Some(rpc),
            chain.usdc_address.clone(),
        ));

        let session_service = SessionService::new(store, Arc::clone(&credentials));
        let session = domain::shared(session_service.initialize()?);

        // Relayer is the primary path when configured; the direct ledger
        // write covers the rest.
        let direct: Arc<dyn TransferBackend> = Arc::new(LedgerBackend::new(Arc::clone(&ledger)));
        let (primary, fallback): (Arc<dyn TransferBackend>, Option<Arc<dyn TransferBackend>>) =
            match &config.relayer_url {
                Some(url) => (Arc::new(RelayerBackend::new(url)?), Some(direct)),
                None => (direct, None),
            };

        let transfer_service = TransferService::new(
            Arc::clone(&session),
            Arc::clone(&ledger),
            credentials,
            Arc::new(DenylistPolicy::new(config.compliance_denylist.clone())),
            primary,
            fallback,
            TransferSettings {
                chain_name: config.default_chain.clone(),
                usdc_address: chain.usdc_address.clone(),
                risk_threshold: config.risk_threshold,
                flagged_recipient_substring: config.flagged_recipient_substring.clone(),
                strict_balance_check: config.strict_balance_check,
            },
        );

        let refresher = BalanceRefresher::new(
            balance_source,
            Arc::clone(&session),
            Arc::clone(&logger),
            Duration::from_secs(config.refresh_interval_secs),
        );

        Ok(Self {
            config,
            session,
            ledger,
            logger,
            session_service,
            transfer_service,
            refresher,
        })
    }

    /// Authenticate and load the initial balance
    pub async fn login(&self, username: &str) -> Result<Session> {
        let session = self.session_service.login(username).await?;
        if let Ok(mut shared) = self.session.lock() {
            *shared = session.clone();
        }

        // Initial balance load; a cold RPC endpoint must not fail the login
        if let Err(e) = self.refresher.refresh_now(&session.address).await {
            let _ = self.logger.log(
                LogEvent::new("initial_balance_failed").with_error(e.to_string()),
            );
        }

        self.current_session()
    }

    /// End the session: stop polling, clear persisted keys, drop the ledger
    pub fn logout(&self) -> Result<()> {
        self.refresher.stop();
        self.session_service.logout()?;
        self.ledger.reset();
        if let Ok(mut shared) = self.session.lock() {
            *shared = Session::logged_out();
        }
        Ok(())
    }

    /// Snapshot of the current session state
    pub fn current_session(&self) -> Result<Session> {
        self.session
            .lock()
            .map(|s| s.clone())
            .map_err(|_| anyhow::anyhow!("Session lock poisoned"))
    }
}
