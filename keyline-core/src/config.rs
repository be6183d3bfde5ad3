//! Configuration management
//!
//! Reads `settings.json` from the keyline directory:
//! ```json
//! {
//!   "app": { "defaultChain": "polygonAmoy", "strictBalanceCheck": true, ... },
//!   "chains": { "polygonAmoy": { "rpcUrl": "...", "usdcAddress": "..." }, ... }
//! }
//! ```

use std::collections::HashMap;
use std::path::Path;

use anyhow::Result;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use url::Url;

use crate::domain::risk;

/// Raw settings.json structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct SettingsFile {
    #[serde(default)]
    app: AppSettings,
    #[serde(default)]
    chains: HashMap<String, ChainConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AppSettings {
    #[serde(default = "default_chain_name")]
    default_chain: String,
    #[serde(default = "default_true")]
    strict_balance_check: bool,
    #[serde(default = "default_refresh_interval")]
    refresh_interval_secs: u64,
    #[serde(default = "risk::default_threshold")]
    risk_threshold: Decimal,
    #[serde(default = "default_flagged_substring")]
    flagged_recipient_substring: String,
    #[serde(default)]
    compliance_denylist: Vec<String>,
    #[serde(default)]
    relayer_url: Option<String>,
    #[serde(flatten)]
    other: HashMap<String, serde_json::Value>,
}

impl Default for AppSettings {
    fn default() -> Self {
        Self {
            default_chain: default_chain_name(),
            strict_balance_check: true,
            refresh_interval_secs: default_refresh_interval(),
            risk_threshold: risk::default_threshold(),
            flagged_recipient_substring: default_flagged_substring(),
            compliance_denylist: Vec::new(),
            relayer_url: None,
            other: HashMap::new(),
        }
    }
}

fn default_chain_name() -> String {
    "polygonAmoy".to_string()
}

fn default_true() -> bool {
    true
}

fn default_refresh_interval() -> u64 {
    30
}

fn default_flagged_substring() -> String {
    risk::DEFAULT_FLAGGED_SUBSTRING.to_string()
}

/// Per-chain RPC endpoint and token contract
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChainConfig {
    pub rpc_url: String,
    pub usdc_address: String,
}

/// The fixed set of chains the demo knows about
fn builtin_chains() -> HashMap<String, ChainConfig> {
    let mut chains = HashMap::new();
    chains.insert(
        "polygonAmoy".to_string(),
        ChainConfig {
            rpc_url: "https://rpc-amoy.polygon.technology".to_string(),
            usdc_address: "0x41e94eb019c0762f9bfcf9fb1e58725bfb0e7582".to_string(),
        },
    );
    chains.insert(
        "arbitrum".to_string(),
        ChainConfig {
            rpc_url: "https://arb1.arbitrum.io/rpc".to_string(),
            usdc_address: "0x75faf114eafb1bdbe2f0316df893fd58ce46aa4d".to_string(),
        },
    );
    chains.insert(
        "optimism".to_string(),
        ChainConfig {
            rpc_url: "https://mainnet.optimism.io".to_string(),
            usdc_address: "0x0b2c639c533813f4aa9d7837caf62653d097ff85".to_string(),
        },
    );
    chains
}

/// Keyline configuration (simplified view of settings)
#[derive(Debug, Clone)]
pub struct Config {
    pub default_chain: String,
    pub strict_balance_check: bool,
    pub refresh_interval_secs: u64,
    pub risk_threshold: Decimal,
    pub flagged_recipient_substring: String,
    pub compliance_denylist: Vec<String>,
    pub relayer_url: Option<String>,
    pub chains: HashMap<String, ChainConfig>,
    // Keep the raw settings for preservation when saving
    _raw_settings: SettingsFile,
}

impl Default for Config {
    fn default() -> Self {
        let app = AppSettings::default();
        Self {
            default_chain: app.default_chain.clone(),
            strict_balance_check: app.strict_balance_check,
            refresh_interval_secs: app.refresh_interval_secs,
            risk_threshold: app.risk_threshold,
            flagged_recipient_substring: app.flagged_recipient_substring.clone(),
            compliance_denylist: Vec::new(),
            relayer_url: None,
            chains: builtin_chains(),
            _raw_settings: SettingsFile::default(),
        }
    }
}

impl Config {
    /// Load config from the keyline directory
    ///
    /// The active chain can be overridden via the KEYLINE_CHAIN environment
    /// variable (for CI/testing).
    pub fn load(keyline_dir: &Path) -> Result<Self> {
        let settings_path = keyline_dir.join("settings.json");

        let raw: SettingsFile = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        let default_chain = match std::env::var("KEYLINE_CHAIN").ok() {
            Some(chain) if !chain.trim().is_empty() => chain,
            _ => raw.app.default_chain.clone(),
        };

        // Configured chains extend the builtin table
        let mut chains = builtin_chains();
        for (name, chain) in &raw.chains {
            chains.insert(name.clone(), chain.clone());
        }

        if let Some(url) = &raw.app.relayer_url {
            Self::validate_endpoint(url)?;
        }

        Ok(Self {
            default_chain,
            strict_balance_check: raw.app.strict_balance_check,
            refresh_interval_secs: raw.app.refresh_interval_secs,
            risk_threshold: raw.app.risk_threshold,
            flagged_recipient_substring: raw.app.flagged_recipient_substring.clone(),
            compliance_denylist: raw.app.compliance_denylist.clone(),
            relayer_url: raw.app.relayer_url.clone(),
            chains,
            _raw_settings: raw,
        })
    }

    /// Save config to the keyline directory
    /// Preserves other settings that the CLI doesn't manage
    pub fn save(&self, keyline_dir: &Path) -> Result<()> {
        let settings_path = keyline_dir.join("settings.json");

        let mut settings = if settings_path.exists() {
            let content = std::fs::read_to_string(&settings_path)?;
            serde_json::from_str::<SettingsFile>(&content).unwrap_or_default()
        } else {
            SettingsFile::default()
        };

        settings.app.default_chain = self.default_chain.clone();
        settings.app.strict_balance_check = self.strict_balance_check;
        settings.app.refresh_interval_secs = self.refresh_interval_secs;
        settings.app.risk_threshold = self.risk_threshold;
        settings.app.flagged_recipient_substring = self.flagged_recipient_substring.clone();
        settings.app.compliance_denylist = self.compliance_denylist.clone();
        settings.app.relayer_url = self.relayer_url.clone();
        // Persist only chains that differ from the builtin table
        let builtin = builtin_chains();
        settings.chains = self
            .chains
            .iter()
            .filter(|(name, chain)| {
                builtin.get(*name).map_or(true, |b| {
                    b.rpc_url != chain.rpc_url || b.usdc_address != chain.usdc_address
                })
            })
            .map(|(name, chain)| (name.clone(), chain.clone()))
            .collect();

        let content = serde_json::to_string_pretty(&settings)?;
        std::fs::write(&settings_path, content)?;
        Ok(())
    }

    /// Resolve the active chain configuration
    pub fn active_chain(&self) -> Result<&ChainConfig> {
        self.chains
            .get(&self.default_chain)
            .ok_or_else(|| anyhow::anyhow!("Unsupported chain: {}", self.default_chain))
    }

    /// Validate a custom endpoint URL (http for loopback only, else https)
    pub fn validate_endpoint(endpoint: &str) -> Result<()> {
        let parsed = Url::parse(endpoint)
            .map_err(|_| anyhow::anyhow!("Invalid URL format: {}", endpoint))?;
        let host = parsed.host_str().unwrap_or("");
        let loopback = host == "localhost" || host == "127.0.0.1";
        match parsed.scheme() {
            "https" => Ok(()),
            "http" if loopback => Ok(()),
            _ => anyhow::bail!("Endpoint must use HTTPS: {}", endpoint),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = Config::default();
        assert_eq!(config.default_chain, "polygonAmoy");
        assert!(config.strict_balance_check);
        assert_eq!(config.refresh_interval_secs, 30);
        assert_eq!(config.risk_threshold, Decimal::new(1000, 0));
        assert_eq!(config.flagged_recipient_substring, "bad");
        assert_eq!(config.chains.len(), 3);
    }

    #[test]
    fn test_active_chain_lookup() {
        let mut config = Config::default();
        assert!(config.active_chain().is_ok());

        config.default_chain = "sepolia".to_string();
        assert!(config.active_chain().is_err());
    }

    #[test]
    fn test_validate_endpoint() {
        assert!(Config::validate_endpoint("https://relayer.example.com").is_ok());
        assert!(Config::validate_endpoint("http://127.0.0.1:8545").is_ok());
        assert!(Config::validate_endpoint("http://relayer.example.com").is_err());
        assert!(Config::validate_endpoint("not a url").is_err());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load(dir.path()).unwrap();
        assert_eq!(config.refresh_interval_secs, 30);
    }

    #[test]
    fn test_save_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();

        let mut config = Config::default();
        config.default_chain = "optimism".to_string();
        config.relayer_url = Some("https://relayer.example.com".to_string());
        config.compliance_denylist = vec!["0xbad".to_string()];
        config.save(dir.path()).unwrap();

        let loaded = Config::load(dir.path()).unwrap();
        assert_eq!(loaded.default_chain, "optimism");
        assert_eq!(
            loaded.relayer_url.as_deref(),
            Some("https://relayer.example.com")
        );
        assert_eq!(loaded.compliance_denylist, vec!["0xbad".to_string()]);
        // Builtin chains survive a round trip
        assert_eq!(loaded.chains.len(), 3);
    }
}
