//! Workspace State Sync CLI
//!
//! Publishes and restores workspace state through a shared remote directory.

mod cli;
mod commands;
mod error;

use clap::Parser;
use colored::Colorize;

use cli::{Cli, Commands};
use commands::Session;
use error::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("{}: {}", "error".red().bold(), e);
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    let level = if cli.verbose { "debug" } else { "warn" };
    if let Err(e) = state_core::logging::init(level) {
        eprintln!("{}: logging unavailable: {}", "warning".yellow(), e);
    }
    tracing::debug!("Verbose mode enabled");

    let Some(command) = cli.command else {
        println!("{} Workspace State Sync", "wstate".green().bold());
        println!();
        println!("Run {} for available commands.", "wstate --help".cyan());
        return Ok(());
    };

    let cwd = std::env::current_dir()?;
    let session = Session::load(&cwd, cli.config.as_deref())?;

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()?;
    runtime.block_on(execute_command(session, command))
}

async fn execute_command(session: Session, command: Commands) -> Result<()> {
    match command {
        Commands::Push { folders } => commands::run_push(session, &folders).await,
        Commands::Pull { folders } => commands::run_pull(session, &folders).await,
        Commands::Show { json } => commands::run_show(&session, json).await,
        Commands::Set { key, value } => commands::run_set(&session, &key, &value).await,
        Commands::Get { key } => commands::run_get(&session, &key).await,
    }
}
