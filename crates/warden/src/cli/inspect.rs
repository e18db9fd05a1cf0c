//! Offline commands: `check`, `decode` and `ledger`.

use super::OutputFormat;
use std::path::Path;
use warden_core::{WardenConfig, wire};
use warden_moderation::FileLedger;

/// Load the configuration and print what the pipeline would run with.
pub fn check_config(path: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let config = WardenConfig::from_file(path)?;
    let policy = config.policy();

    println!("config:    {}", path.display());
    println!("mode:      {}", policy.mode());
    println!("enabled:   {}", policy.enabled());
    println!("detector:  {}", policy.detector_identity());
    println!("enforcer:  {}", policy.enforcer_identity());
    let groups: Vec<String> = policy
        .watched_groups()
        .iter()
        .map(ToString::to_string)
        .collect();
    println!("watched:   [{}]", groups.join(", "));
    match policy.bus_group() {
        Some(bus) => println!("bus group: {}", bus),
        None => println!("bus group: none"),
    }
    println!("reject:    {}", policy.reject_on_detect());
    println!("ledger:    {}", config.ledger().path().display());
    println!("listen:    {}", config.server().bind());

    if let Err(e) = policy.validate() {
        println!("problem:   {}", e.message);
    }
    for peer in [policy.detector_identity(), policy.enforcer_identity()] {
        match config.peer(peer) {
            Some(endpoint) => println!("peer {}: {}", peer, endpoint.api_base()),
            None => println!("peer {}: no [[peers]] entry", peer),
        }
    }
    Ok(())
}

/// Decode one wire line and print the record.
pub fn decode_line(line: &str) -> Result<(), Box<dyn std::error::Error>> {
    let record = wire::decode(line.trim())?;
    println!("{}", serde_json::to_string_pretty(&record)?);
    Ok(())
}

/// Print the most recent ledger entries.
pub async fn show_ledger(
    path: &Path,
    limit: usize,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let config = WardenConfig::from_file(path)?;
    let ledger = FileLedger::new(config.ledger().path());
    let entries = ledger.read_recent(limit).await?;

    match format {
        OutputFormat::Human => {
            if entries.is_empty() {
                println!("No ledger entries in {}", ledger.path().display());
            }
            for entry in &entries {
                println!("{}", entry.to_line());
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&entries)?),
    }
    Ok(())
}
