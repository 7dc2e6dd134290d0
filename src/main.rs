mod app;
mod cli;
mod client;
mod config;
mod consts;
mod core;
mod error;
mod output;
mod utils;

use std::fs::OpenOptions;
use std::process::ExitCode;
use std::sync::Mutex;
use std::time::Instant;

use clap::Parser;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::fmt::writer::BoxMakeWriter;

use app::{CommandContext, handle_command, ping};
use cli::Cli;
use client::XaiClient;
use config::Config;
use error::ConfigError;
use utils::{Clock, FixedClock, SystemClock, parse_epoch};

fn init_logging(config: &Config, debug: bool) -> Result<(), ConfigError> {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(if debug { "debug" } else { "info" }));

    let writer = match &config.log_file {
        Some(path) => {
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .map_err(|source| ConfigError::LogFile {
                    path: path.clone(),
                    source,
                })?;
            BoxMakeWriter::new(Mutex::new(file))
        }
        None => BoxMakeWriter::new(std::io::stderr),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(config.log_file.is_none())
        .init();
    Ok(())
}

fn main() -> ExitCode {
    let started = Instant::now();
    let cli = Cli::parse();

    let loaded = Config::locate(cli.config.as_deref())
        .and_then(|path| Config::load(&path).map(|config| (path, config)));
    let (config_path, config) = match loaded {
        Ok(loaded) => loaded,
        Err(e) => {
            eprintln!("{e}");
            return ExitCode::FAILURE;
        }
    };
    if let Err(e) = init_logging(&config, cli.debug) {
        eprintln!("{e}");
        return ExitCode::FAILURE;
    }
    tracing::info!("grokrelay v{} starting", env!("CARGO_PKG_VERSION"));
    tracing::info!("loaded config from {}", config_path.display());
    tracing::debug!("config: {}", config.redacted());

    let clock: Box<dyn Clock> = match cli.timestamp.as_deref() {
        Some(raw) => match parse_epoch(raw) {
            Ok(at) => Box::new(FixedClock(at)),
            Err(e) => {
                eprintln!("{e}");
                return ExitCode::FAILURE;
            }
        },
        None => Box::new(SystemClock),
    };

    let client = XaiClient::new(config.api_key.clone(), &config.api_base_url);

    if config.run_startup_test {
        tracing::info!("running startup API connectivity test");
        if let Err(e) = ping(&client, &config) {
            tracing::error!("API connectivity test failed: {e}");
            eprintln!("API connectivity test failed: {e}");
            return ExitCode::FAILURE;
        }
    }

    let ctx = CommandContext {
        cli: &cli,
        config: &config,
        completion: &client,
        clock: clock.as_ref(),
        started,
    };
    handle_command(&ctx)
}
