//! CLI subcommand definitions

use std::path::PathBuf;

use clap::Subcommand;

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Send one message and print the reply
    Ask {
        /// The chat message
        message: String,
    },
    /// Process one message per line, concurrently, as JSON lines
    Batch {
        /// Read messages from a file instead of stdin
        #[arg(short, long, value_name = "FILE")]
        input: Option<PathBuf>,
    },
    /// Check connectivity to the API
    Ping,
    /// Show redacted config, uptime and last API success
    Status,
}
