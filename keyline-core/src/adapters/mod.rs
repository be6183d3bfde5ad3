//! Adapter implementations
//!
//! Adapters implement the port traits with concrete technologies:
//! - JSON-RPC gateway client for chain balance reads
//! - Relayer HTTP client for the primary TransferBackend
//! - Simulated in-memory ledger for the fallback TransferBackend
//! - JSON file for the SessionStore port
//! - Device key file for the CredentialProvider port

pub mod device_key;
pub mod file_store;
pub mod ledger;
pub mod policy;
pub mod relayer;
pub mod rpc;

#[cfg(test)]
pub mod relayer_mock;
