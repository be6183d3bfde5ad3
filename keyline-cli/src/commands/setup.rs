//! Setup command - manage chain, relayer, and policy configuration

use anyhow::Result;
use clap::Subcommand;
use colored::Colorize;
use keyline_core::config::{ChainConfig, Config};

use super::get_keyline_dir;
use crate::output;

#[derive(Subcommand)]
pub enum SetupCommands {
    /// Select the active chain
    Chain {
        /// Chain name (polygonAmoy, arbitrum, optimism, or a custom entry)
        name: String,
        /// Custom RPC endpoint URL
        #[arg(long)]
        rpc_url: Option<String>,
        /// Custom USDC contract address
        #[arg(long)]
        usdc_address: Option<String>,
    },
    /// Configure the relayer endpoint (primary transfer path)
    Relayer {
        /// Relayer base URL; omit with --clear to remove
        url: Option<String>,
        /// Remove the configured relayer
        #[arg(long)]
        clear: bool,
    },
    /// Manage the compliance denylist
    Denylist {
        /// Add an entry
        #[arg(long)]
        add: Option<String>,
        /// Remove an entry
        #[arg(long)]
        remove: Option<String>,
    },
    /// Show the active configuration
    Show {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

pub fn run(command: SetupCommands) -> Result<()> {
    let keyline_dir = get_keyline_dir();
    std::fs::create_dir_all(&keyline_dir)?;
    let mut config = Config::load(&keyline_dir)?;

    match command {
        SetupCommands::Chain {
            name,
            rpc_url,
            usdc_address,
        } => {
            match (rpc_url, usdc_address) {
                (Some(rpc_url), Some(usdc_address)) => {
                    Config::validate_endpoint(&rpc_url)?;
                    config
                        .chains
                        .insert(name.clone(), ChainConfig { rpc_url, usdc_address });
                }
                (None, None) => {
                    if !config.chains.contains_key(&name) {
                        anyhow::bail!(
                            "Unknown chain: {}. Pass --rpc-url and --usdc-address to define it.",
                            name
                        );
                    }
                }
                _ => anyhow::bail!("--rpc-url and --usdc-address must be given together"),
            }
            config.default_chain = name.clone();
            config.save(&keyline_dir)?;
            output::success(&format!("Active chain set to {}", name));
        }
        SetupCommands::Relayer { url, clear } => {
            if clear {
                config.relayer_url = None;
                config.save(&keyline_dir)?;
                output::success("Relayer removed; transfers use the direct path only");
            } else {
                let url = url.ok_or_else(|| anyhow::anyhow!("Relayer URL required"))?;
                Config::validate_endpoint(&url)?;
                config.relayer_url = Some(url.clone());
                config.save(&keyline_dir)?;
                output::success(&format!("Relayer set to {}", url));
            }
        }
        SetupCommands::Denylist { add, remove } => {
            match (add, remove) {
                (Some(entry), None) => {
                    if !config.compliance_denylist.contains(&entry) {
                        config.compliance_denylist.push(entry.clone());
                    }
                    config.save(&keyline_dir)?;
                    output::success(&format!("Added \"{}\" to the denylist", entry));
                }
                (None, Some(entry)) => {
                    config.compliance_denylist.retain(|e| e != &entry);
                    config.save(&keyline_dir)?;
                    output::success(&format!("Removed \"{}\" from the denylist", entry));
                }
                _ => anyhow::bail!("Pass exactly one of --add or --remove"),
            }
        }
        SetupCommands::Show { json } => {
            if json {
                let chain = config.active_chain()?;
                println!(
                    "{}",
                    serde_json::json!({
                        "defaultChain": config.default_chain,
                        "rpcUrl": chain.rpc_url,
                        "usdcAddress": chain.usdc_address,
                        "relayerUrl": config.relayer_url,
                        "strictBalanceCheck": config.strict_balance_check,
                        "refreshIntervalSecs": config.refresh_interval_secs,
                        "riskThreshold": config.risk_threshold.to_string(),
                        "complianceDenylist": config.compliance_denylist,
                    })
                );
                return Ok(());
            }

            println!("{}", "Configuration".bold());
            let chain = config.active_chain()?;
            let mut table = output::create_table();
            table.add_row(vec!["Chain", &config.default_chain]);
            table.add_row(vec!["RPC endpoint", &chain.rpc_url]);
            table.add_row(vec!["USDC contract", &chain.usdc_address]);
            table.add_row(vec![
                "Relayer",
                config.relayer_url.as_deref().unwrap_or("(not configured)"),
            ]);
            table.add_row(vec![
                "Strict balance check",
                if config.strict_balance_check { "on" } else { "off" },
            ]);
            table.add_row(vec![
                "Refresh interval",
                &format!("{}s", config.refresh_interval_secs),
            ]);
            table.add_row(vec![
                "Risk threshold",
                &format!("{} USDC", config.risk_threshold),
            ]);
            table.add_row(vec![
                "Denylist entries",
                &config.compliance_denylist.len().to_string(),
            ]);
            println!("{}", table);
        }
    }

    Ok(())
}
