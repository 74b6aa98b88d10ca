use std::env;
use std::path::PathBuf;

use anyhow::{anyhow, Result};
use directories::BaseDirs;

/// Folder name used beneath the user's home directory for application data.
const DATA_DIR_NAME: &str = ".jasoseo-manager";
/// Environment variable overriding the data directory.
pub const DATA_DIR_ENV: &str = "JASOSEO_DATA_DIR";
/// Log file written inside the data directory while the TUI owns the terminal.
const LOG_FILE_NAME: &str = "jasoseo-manager.log";
/// Filter used when neither `RUST_LOG` nor `--log-level` is given.
const DEFAULT_LOG_LEVEL: &str = "info";

/// Runtime settings resolved from the command line, the environment and the
/// user's home directory, in that order.
#[derive(Debug, Clone)]
pub struct Config {
    /// Default location for saved text files, SQLite exports and the log.
    pub data_dir: PathBuf,
    /// `tracing` filter directive used when `RUST_LOG` is unset.
    pub log_level: String,
}

impl Config {
    pub fn resolve(data_dir: Option<PathBuf>, log_level: Option<String>) -> Result<Self> {
        let data_dir = match data_dir {
            Some(dir) => dir,
            None => match env::var_os(DATA_DIR_ENV) {
                Some(dir) if !dir.is_empty() => PathBuf::from(dir),
                _ => default_data_dir()?,
            },
        };

        Ok(Config {
            data_dir,
            log_level: log_level.unwrap_or_else(|| DEFAULT_LOG_LEVEL.to_string()),
        })
    }

    pub fn log_path(&self) -> PathBuf {
        self.data_dir.join(LOG_FILE_NAME)
    }
}

/// Resolve `~/.jasoseo-manager`.
fn default_data_dir() -> Result<PathBuf> {
    let base_dirs = BaseDirs::new().ok_or_else(|| anyhow!("could not locate home directory"))?;
    Ok(base_dirs.home_dir().join(DATA_DIR_NAME))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn explicit_values_win() {
        let config = Config::resolve(Some(PathBuf::from("/tmp/essays")), Some("debug".into()))
            .unwrap();
        assert_eq!(config.data_dir, PathBuf::from("/tmp/essays"));
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.log_path(), PathBuf::from("/tmp/essays/jasoseo-manager.log"));
    }
}
