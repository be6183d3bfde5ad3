//! Login command - authenticate with the device credential

use anyhow::Result;
use colored::Colorize;
use keyline_core::domain::transaction::{format_address, format_usdc};
use keyline_core::services::{EntryPoint, LogEvent};

use super::{get_context, get_logger, log_event};

pub async fn run(username: Option<String>, json: bool) -> Result<()> {
    let logger = get_logger();

    let username = match username {
        Some(name) => name,
        None => dialoguer::Input::new()
            .with_prompt("Username")
            .interact_text()?,
    };

    let ctx = get_context(EntryPoint::Cli)?;
    match ctx.login(&username).await {
        Ok(session) => {
            log_event(&logger, LogEvent::new("login_succeeded").with_command("login"));

            if json {
                println!("{}", serde_json::to_string_pretty(&session)?);
                return Ok(());
            }

            println!("{}", "Authentication successful".green());
            println!("  Address: {}", format_address(&session.address));
            println!("  Balance: {} USDC", format_usdc(session.balance));
            Ok(())
        }
        Err(e) => {
            log_event(
                &logger,
                LogEvent::new("login_failed")
                    .with_command("login")
                    .with_error(e.to_string()),
            );
            Err(e)
        }
    }
}
