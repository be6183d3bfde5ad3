//! Keyline CLI - smart wallet demo in your terminal

use std::process::ExitCode;

use anyhow::Result;
use clap::{Parser, Subcommand};

mod commands;
mod output;

use commands::{balance, login, logout, logs, send, setup, status};

/// Keyline - smart wallet demo in your terminal
#[derive(Parser)]
#[command(name = "kl", version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Authenticate with the device credential
    Login {
        /// Username (prompted if omitted)
        username: Option<String>,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Clear the session and stop balance polling
    Logout,

    /// Show session and wallet summary
    Status {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Refresh the USDC balance
    Balance {
        /// Keep polling on the configured interval until interrupted
        #[arg(long)]
        watch: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Send USDC to an address
    Send {
        /// Recipient address (0x + 40 hex digits)
        to: String,
        /// Amount in USDC
        amount: String,
        /// Skip the confirmation prompt
        #[arg(long, short)]
        yes: bool,
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// View and manage application logs
    Logs {
        #[command(subcommand)]
        command: logs::LogsCommands,
    },

    /// Manage chain, relayer, and policy configuration
    Setup {
        #[command(subcommand)]
        command: setup::SetupCommands,
    },
}

#[tokio::main]
async fn main() -> ExitCode {
    // Plain output when piped
    if !atty::is(atty::Stream::Stdout) {
        colored::control::set_override(false);
    }

    let cli = Cli::parse();

    let result = run(cli).await;

    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("{}", e);
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Commands::Login { username, json } => login::run(username, json).await,
        Commands::Logout => logout::run(),
        Commands::Status { json } => status::run(json),
        Commands::Balance { watch, json } => balance::run(watch, json).await,
        Commands::Send { to, amount, yes, json } => send::run(to, amount, yes, json).await,
        Commands::Logs { command } => logs::run(command),
        Commands::Setup { command } => setup::run(command),
    }
}
