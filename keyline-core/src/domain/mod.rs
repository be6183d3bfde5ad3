//! Core domain entities
//!
//! All business entities are defined here. These are pure data structures
//! with validation logic - no I/O or external dependencies.

mod account;
pub mod risk;
mod session;
pub mod transaction;
pub mod result;

pub use account::SmartAccount;
pub use risk::RiskTier;
pub use session::{shared, Session, SharedSession, KEY_ACCOUNT, KEY_ADDRESS, KEY_AUTHENTICATED};
pub use transaction::{TransactionRecord, TransactionStatus};
