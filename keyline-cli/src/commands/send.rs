//! Send command - submit a USDC transfer through the send flow

use std::time::Duration;

use anyhow::Result;
use colored::Colorize;
use dialoguer::Confirm;
use indicatif::{ProgressBar, ProgressStyle};
use keyline_core::domain::transaction::{format_address, format_usdc};
use keyline_core::services::{EntryPoint, LogEvent, SendStatus, SendStep};
use keyline_core::{FieldErrors, RiskTier};

use super::{get_context, get_logger, log_event};
use crate::output;

pub async fn run(to: String, amount: String, yes: bool, json: bool) -> Result<()> {
    let logger = get_logger();
    let ctx = get_context(EntryPoint::Cli)?;

    let session = ctx.current_session()?;
    if !session.is_authenticated() {
        anyhow::bail!("Not logged in. Use 'kl login' first.");
    }

    // Load the balance the strict check validates against
    if let Err(e) = ctx.refresher.refresh_now(&session.address).await {
        log_event(
            &logger,
            LogEvent::new("balance_refresh_failed")
                .with_command("send")
                .with_error(e.to_string()),
        );
    }

    let mut flow = keyline_core::services::SendFlow::new();

    // form -> review
    let step = flow.review(&ctx.transfer_service, &to, &amount)?;
    if step == SendStep::Form {
        print_field_errors(flow.errors());
        anyhow::bail!("Transfer rejected by validation");
    }

    let risk = flow.risk().unwrap_or(RiskTier::Low);
    if !json {
        print_review(&ctx, &to, &amount, risk)?;
    }

    // review -> confirm (interactive unless --yes)
    if !yes && !json {
        let prompt = match risk {
            RiskTier::High => "High-risk transfer: re-authenticate and send?",
            RiskTier::Low => "Send transaction?",
        };
        if !Confirm::new().with_prompt(prompt).default(false).interact()? {
            println!("{}", "Cancelled.".yellow());
            return Ok(());
        }
    }

    let spinner = (!json).then(|| {
        let bar = ProgressBar::new_spinner();
        bar.set_style(ProgressStyle::default_spinner());
        bar.enable_steady_tick(Duration::from_millis(120));
        bar.set_message(match risk {
            RiskTier::High => "Authenticating...",
            RiskTier::Low => "Processing transaction...",
        });
        bar
    });

    let step = flow.confirm(&ctx.transfer_service).await;
    if let Some(bar) = spinner {
        bar.finish_and_clear();
    }
    let step = step?;

    let report = flow
        .report()
        .ok_or_else(|| anyhow::anyhow!("Send flow ended without a report"))?;

    if json {
        println!("{}", serde_json::to_string_pretty(report)?);
        return Ok(());
    }

    match &report.status {
        SendStatus::Approved { hash } => {
            log_event(
                &logger,
                LogEvent::new("transfer_submitted")
                    .with_command("send")
                    .with_chain(&ctx.config.default_chain)
                    .with_backend(report.backend.as_deref().unwrap_or("unknown")),
            );
            output::success(&format!("Successfully sent {} USDC", amount));
            println!("  Hash: {}", hash);
            println!(
                "  New balance: {} USDC",
                format_usdc(ctx.current_session()?.balance)
            );
        }
        SendStatus::Blocked { rule, reason } => {
            log_event(
                &logger,
                LogEvent::new("transfer_blocked")
                    .with_command("send")
                    .with_error(rule.clone()),
            );
            output::error("Transaction blocked by compliance policy");
            println!("  Rule: {}", rule);
            println!("  {}", reason.dimmed());
        }
        SendStatus::Failed { reason } => {
            log_event(
                &logger,
                LogEvent::new("transfer_failed")
                    .with_command("send")
                    .with_error(reason.clone()),
            );
            output::error(&format!("Transaction failed: {}", reason));
            if step == SendStep::Review {
                println!("{}", "No balances were changed; you can retry.".yellow());
            }
        }
        SendStatus::Uncertain { reason } => {
            log_event(
                &logger,
                LogEvent::new("transfer_uncertain")
                    .with_command("send")
                    .with_error(reason.clone()),
            );
            output::warning(&format!("Transaction outcome is uncertain: {}", reason));
            println!(
                "{}",
                "Do not retry until the outcome is known; no local balances were changed."
                    .yellow()
            );
        }
    }

    Ok(())
}

fn print_field_errors(errors: &FieldErrors) {
    if let Some(e) = &errors.recipient {
        output::error(&format!("Recipient: {}", e));
    }
    if let Some(e) = &errors.amount {
        output::error(&format!("Amount: {}", e));
    }
}

fn print_review(
    ctx: &keyline_core::KeylineContext,
    to: &str,
    amount: &str,
    risk: RiskTier,
) -> Result<()> {
    println!("{}", "Review Transaction".bold());

    let mut table = output::create_table();
    table.add_row(vec!["To", &format_address(to)]);
    table.add_row(vec!["Amount", &format!("{} USDC", amount)]);
    table.add_row(vec!["Chain", &ctx.config.default_chain]);
    println!("{}", table);

    match risk {
        RiskTier::Low => {
            println!("{}", "Risk: low - ready to send".green());
        }
        RiskTier::High => {
            println!(
                "{}",
                "Risk: high - requires re-authentication and compliance screening".yellow()
            );
        }
    }
    Ok(())
}
