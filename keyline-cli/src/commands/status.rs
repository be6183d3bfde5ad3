//! Status command - show session and wallet summary

use anyhow::Result;
use colored::Colorize;
use keyline_core::domain::transaction::format_address;
use keyline_core::services::EntryPoint;

use super::get_context;
use crate::output;

pub fn run(json: bool) -> Result<()> {
    let ctx = get_context(EntryPoint::Cli)?;
    let status = ctx.session_service.status(&ctx.session);

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("{}", "Wallet Status".bold());
    println!();

    let mut table = output::create_table();
    table.add_row(vec![
        "Authenticated",
        if status.authenticated { "yes" } else { "no" },
    ]);
    if status.authenticated {
        table.add_row(vec!["Address", &format_address(&status.address)]);
        table.add_row(vec!["Cached balance", &format!("{} USDC", status.balance)]);
    }
    table.add_row(vec!["Chain", &ctx.config.default_chain]);
    table.add_row(vec![
        "Relayer",
        ctx.config.relayer_url.as_deref().unwrap_or("(direct only)"),
    ]);

    println!("{}", table);

    if !status.authenticated {
        println!();
        println!("{}", "Use 'kl login' to authenticate.".yellow());
    }

    Ok(())
}
