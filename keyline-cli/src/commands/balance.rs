//! Balance command - refresh the balance, once or continuously

use anyhow::Result;
use colored::Colorize;
use keyline_core::domain::transaction::{format_address, format_usdc};
use keyline_core::services::{EntryPoint, LogEvent};

use super::{get_context, get_logger, log_event};

pub async fn run(watch: bool, json: bool) -> Result<()> {
    let entry_point = if watch {
        EntryPoint::Watcher
    } else {
        EntryPoint::Cli
    };
    let ctx = get_context(entry_point)?;

    let session = ctx.current_session()?;
    if !session.is_authenticated() {
        anyhow::bail!("Not logged in. Use 'kl login' first.");
    }

    if watch {
        return run_watch(ctx, session.address).await;
    }

    let logger = get_logger();
    // Manual refresh: failures are surfaced, not swallowed
    match ctx.refresher.refresh_now(&session.address).await {
        Ok(balance) => {
            if json {
                println!(
                    "{}",
                    serde_json::json!({
                        "address": session.address,
                        "balance": format_usdc(balance),
                    })
                );
            } else {
                println!("{} USDC", format_usdc(balance));
            }
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("balance_refresh_failed")
                    .with_command("balance")
                    .with_error(e.to_string()),
            );
            Err(e.into())
        }
    }
}

/// Poll until interrupted, printing each new balance
async fn run_watch(ctx: keyline_core::KeylineContext, address: String) -> Result<()> {
    println!(
        "Watching balance for {} (refresh every {}s, ctrl-c to stop)",
        format_address(&address),
        ctx.config.refresh_interval_secs
    );

    ctx.refresher.set_listener(Some(Box::new(|balance| {
        println!("{} {} USDC", "Balance:".cyan(), format_usdc(balance));
    })));
    ctx.refresher.start(address);

    tokio::signal::ctrl_c().await?;
    ctx.refresher.stop();
    println!();
    println!("{}", "Stopped.".yellow());
    Ok(())
}
