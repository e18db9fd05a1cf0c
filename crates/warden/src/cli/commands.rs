//! CLI command definitions.

use clap::{Parser, Subcommand, ValueEnum};
use std::net::SocketAddr;
use std::path::PathBuf;

/// Warden - removes members who spread unauthorized group invitations
#[derive(Parser, Debug)]
#[command(name = "warden")]
#[command(
    about = "Detects and removes members who spread unauthorized group invitations",
    long_about = None
)]
#[command(version)]
pub struct Cli {
    /// Command to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Path to the configuration file
    #[arg(short, long, global = true, env = "WARDEN_CONFIG", default_value = "warden.toml")]
    pub config: PathBuf,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    pub json_logs: bool,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the event webhook and moderation pipeline
    Serve {
        /// Override the configured listen address
        #[arg(long)]
        bind: Option<SocketAddr>,
    },

    /// Validate the configuration and print a summary
    Check,

    /// Decode a detection wire line and print it as JSON
    Decode {
        /// The wire line, starting with the detection sentinel
        line: String,
    },

    /// Show recent ledger entries
    Ledger {
        /// Maximum number of entries to display
        #[arg(long, default_value = "20")]
        limit: usize,

        /// Output format
        #[arg(long, default_value = "human")]
        format: OutputFormat,
    },
}

/// Output format options
#[derive(ValueEnum, Clone, Copy, Debug)]
pub enum OutputFormat {
    /// Tab-separated ledger lines
    Human,
    /// JSON array
    Json,
}
