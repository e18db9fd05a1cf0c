//! Warden CLI binary.
//!
//! This binary provides command-line access to the invite warden:
//! - Serve the OneBot event webhook and enforce the policy
//! - Validate configuration files
//! - Inspect wire lines and the violation ledger

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    use cli::{Cli, Commands, check_config, decode_line, serve, show_ledger};

    // Load .env before reading env-backed arguments
    let _ = dotenvy::dotenv();

    // Parse command-line arguments
    let cli = Cli::parse();

    // Initialize tracing; RUST_LOG wins over the verbosity flag
    let default_level = if cli.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    if cli.json_logs {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(filter)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_target(false)
            .init();
    }

    // Execute the requested command
    match cli.command {
        Commands::Serve { bind } => {
            serve(&cli.config, bind).await?;
        }

        Commands::Check => {
            check_config(&cli.config)?;
        }

        Commands::Decode { line } => {
            decode_line(&line)?;
        }

        Commands::Ledger { limit, format } => {
            show_ledger(&cli.config, limit, format).await?;
        }
    }

    Ok(())
}
