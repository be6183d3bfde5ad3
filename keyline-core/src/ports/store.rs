//! Session store port
//!
//! A minimal string key-value store mirroring browser local storage: three
//! session keys, no versioning, no migration.

use crate::domain::result::Result;

/// Session store trait
pub trait SessionStore: Send + Sync {
    /// Read a value, `None` when the key is absent
    fn get(&self, key: &str) -> Result<Option<String>>;

    /// Write a value, replacing any previous one
    fn set(&self, key: &str, value: &str) -> Result<()>;

    /// Remove a key; removing an absent key is not an error
    fn remove(&self, key: &str) -> Result<()>;
}
