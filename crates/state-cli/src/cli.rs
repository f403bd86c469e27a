//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::{Parser, Subcommand};

/// Workspace State Sync - carry workspace state between checkouts and machines
#[derive(Parser, Debug)]
#[command(name = "wstate")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file (default: .workspace-state/config.toml)
    #[arg(short, long, global = true, env = "WSTATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// The command to run
    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Available commands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Commands {
    /// Capture local workspace state and publish it
    ///
    /// Examples:
    ///   wstate push --folder .
    ///   wstate push --folder api --folder web
    Push {
        /// Workspace folder (repeat for multi-root workspaces)
        #[arg(short, long = "folder", required = true)]
        folders: Vec<PathBuf>,
    },

    /// Restore published workspace state into this workspace
    ///
    /// State is only restored when the recorded folders match the given
    /// ones; paths inside stored values are rewritten to the local folders.
    Pull {
        /// Workspace folder (repeat for multi-root workspaces)
        #[arg(short, long = "folder", required = true)]
        folders: Vec<PathBuf>,
    },

    /// Show the published workspace state
    Show {
        /// Output the raw document as JSON
        #[arg(long)]
        json: bool,
    },

    /// Store a JSON value under a workspace state key
    Set {
        /// State key
        key: String,

        /// Value as JSON, e.g. '{"open": ["src/main.rs"]}'
        value: String,
    },

    /// Print the value stored under a workspace state key
    Get {
        /// State key
        key: String,
    },
}
