//! Balance refresher - periodic polling of the session balance
//!
//! Once started, fetches the balance immediately and then on a fixed
//! interval until stopped. Background failures are logged and swallowed;
//! only a user-triggered `refresh_now` surfaces its error. At most one
//! listener observes new balances; registering another replaces it.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use rust_decimal::Decimal;
use tokio::task::JoinHandle;

use crate::domain::result::Result;
use crate::domain::SharedSession;
use crate::ports::BalanceSource;
use crate::services::logging::{LogEvent, LoggingService};

/// Callback observing each new balance value
pub type BalanceListener = Box<dyn Fn(Decimal) + Send + 'static>;

/// Periodic balance refresher
pub struct BalanceRefresher {
    source: Arc<dyn BalanceSource>,
    session: SharedSession,
    logger: Arc<LoggingService>,
    interval: Duration,
    listener: Arc<Mutex<Option<BalanceListener>>>,
    handle: Mutex<Option<JoinHandle<()>>>,
}

impl BalanceRefresher {
    pub fn new(
        source: Arc<dyn BalanceSource>,
        session: SharedSession,
        logger: Arc<LoggingService>,
        interval: Duration,
    ) -> Self {
        Self {
            source,
            session,
            logger,
            interval,
            listener: Arc::new(Mutex::new(None)),
            handle: Mutex::new(None),
        }
    }

    /// Register the listener, replacing any previous one
    pub fn set_listener(&self, listener: Option<BalanceListener>) {
        if let Ok(mut slot) = self.listener.lock() {
            *slot = listener;
        }
    }

    /// Whether the polling task is currently scheduled
    pub fn is_running(&self) -> bool {
        self.handle
            .lock()
            .map(|h| h.as_ref().map_or(false, |handle| !handle.is_finished()))
            .unwrap_or(false)
    }

    /// Start polling for the given address
    ///
    /// The first fetch happens immediately; subsequent fetches follow the
    /// configured interval. Restarting replaces the previous task.
    pub fn start(&self, address: String) {
        self.stop();

        let source = Arc::clone(&self.source);
        let session = Arc::clone(&self.session);
        let logger = Arc::clone(&self.logger);
        let listener = Arc::clone(&self.listener);
        let period = self.interval;

        let handle = tokio::spawn(async move {
            let mut ticker = tokio::time::interval(period);
            loop {
                // First tick fires immediately
                ticker.tick().await;
                match source.fetch_balance(&address).await {
                    Ok(balance) => {
                        apply_balance(&session, &listener, balance);
                    }
                    Err(e) => {
                        // Background refresh: log, never surface
                        let _ = logger.log(
                            LogEvent::new("balance_refresh_failed").with_error(e.to_string()),
                        );
                    }
                }
            }
        });

        if let Ok(mut slot) = self.handle.lock() {
            *slot = Some(handle);
        }
    }

    /// Stop polling; safe to call when not running
    pub fn stop(&self) {
        if let Ok(mut slot) = self.handle.lock() {
            if let Some(handle) = slot.take() {
                handle.abort();
            }
        }
    }

    /// User-triggered refresh; errors are surfaced to the caller
    pub async fn refresh_now(&self, address: &str) -> Result<Decimal> {
        let balance = self.source.fetch_balance(address).await?;
        apply_balance(&self.session, &self.listener, balance);
        Ok(balance)
    }
}

fn apply_balance(
    session: &SharedSession,
    listener: &Arc<Mutex<Option<BalanceListener>>>,
    balance: Decimal,
) {
    if let Ok(mut session) = session.lock() {
        session.balance = balance;
    }
    if let Ok(slot) = listener.lock() {
        if let Some(callback) = slot.as_ref() {
            callback(balance);
        }
    }
}

impl Drop for BalanceRefresher {
    fn drop(&mut self) {
        self.stop();
    }
}
