//! Logout command - clear the session and stop polling

use anyhow::Result;
use colored::Colorize;
use keyline_core::services::{EntryPoint, LogEvent};

use super::{get_context, get_logger, log_event};

pub fn run() -> Result<()> {
    let logger = get_logger();
    let ctx = get_context(EntryPoint::Cli)?;

    if !ctx.current_session()?.is_authenticated() {
        println!("{}", "Not logged in.".yellow());
        return Ok(());
    }

    ctx.logout()?;
    log_event(&logger, LogEvent::new("logout").with_command("logout"));
    println!("{}", "Logged out.".green());
    Ok(())
}
