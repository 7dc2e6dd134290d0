//! CLI argument definitions
//!
//! Global options shared by every command.

use std::path::PathBuf;

use clap::Parser;

use crate::consts::UNKNOWN;

use super::commands::Commands;

#[derive(Parser)]
#[command(name = "grokrelay")]
#[command(about = "Relay chat messages to Grok with date/time sanity checks", version)]
pub(crate) struct Cli {
    #[command(subcommand)]
    pub(crate) command: Commands,

    /// Config file (defaults to ~/.config/grokrelay/config.toml)
    #[arg(long, global = true, value_name = "PATH")]
    pub(crate) config: Option<PathBuf>,

    /// Output the JSON envelope instead of plain text
    #[arg(short, long, global = true)]
    pub(crate) json: bool,

    /// Enable debug logging (overridden by RUST_LOG)
    #[arg(long, global = true)]
    pub(crate) debug: bool,

    /// Sender label recorded in the logs
    #[arg(short, long, global = true, default_value = UNKNOWN)]
    pub(crate) nick: String,

    /// Fix the reference time (epoch seconds) instead of using the system clock
    #[arg(long, global = true, value_name = "EPOCH")]
    pub(crate) timestamp: Option<String>,
}
