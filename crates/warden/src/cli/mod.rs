//! Command-line interface module.
//!
//! This module provides the CLI structure and command handlers for the warden binary.

mod commands;
mod inspect;
mod serve;

pub use commands::{Cli, Commands, OutputFormat};
pub use inspect::{check_config, decode_line, show_ledger};
pub use serve::serve;
