use std::fs::{self, OpenOptions};
use std::sync::Mutex;

use anyhow::{Context, Result};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::Config;

/// Where log lines should go.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogTarget {
    /// Append to the log file in the data directory. Used while the TUI is
    /// drawing on the terminal.
    File,
    /// Plain stderr for the headless subcommands.
    Stderr,
}

fn filter(config: &Config) -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "{}={}",
            env!("CARGO_CRATE_NAME"),
            config.log_level
        ))
    })
}

/// Install the global `tracing` subscriber.
pub fn init(config: &Config, target: LogTarget) -> Result<()> {
    match target {
        LogTarget::Stderr => {
            tracing_subscriber::registry()
                .with(filter(config))
                .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
                .try_init()
                .context("failed to install logger")?;
        }
        LogTarget::File => {
            fs::create_dir_all(&config.data_dir).context("failed to create data directory")?;
            let file = OpenOptions::new()
                .create(true)
                .append(true)
                .open(config.log_path())
                .context("failed to open log file")?;
            tracing_subscriber::registry()
                .with(filter(config))
                .with(
                    tracing_subscriber::fmt::layer()
                        .with_ansi(false)
                        .with_writer(Mutex::new(file)),
                )
                .try_init()
                .context("failed to install logger")?;
        }
    }
    Ok(())
}
