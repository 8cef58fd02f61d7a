//! Run configuration with optional TOML overrides.
//!
//! Defaults cover the common case; a `--config-path` file overrides them,
//! and CLI flags override the file. The loaded file's SHA-256 is carried
//! into the metadata trail so a run can be tied to the exact configuration
//! that produced it.

use std::fs;
use std::path::Path;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::Deserialize;
use sha2::{Digest, Sha256};

use crate::constants::STREAM_SUFFIX;
use crate::error::{Result, RiffCarveError};
use crate::segment::LengthMode;

/// Extraction run configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Identifier for this run; names the output subdirectory
    pub run_id: String,
    /// How each candidate stream's length is determined
    pub length_mode: LengthMode,
    /// Whether to search segments for labels to name output files
    pub scan_labels: bool,
    /// Suffix for dumped stream files
    pub suffix: String,
    /// Worker threads for the per-file parallel pass
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            run_id: default_run_id(),
            // Heuristic matches what the signature scan can actually
            // promise on corrupt size fields; declared mode is opt-in.
            length_mode: LengthMode::Heuristic,
            scan_labels: true,
            suffix: STREAM_SUFFIX.to_string(),
            workers: num_cpus::get(),
        }
    }
}

/// A loaded configuration plus the hash tying it to its source file.
#[derive(Debug, Clone)]
pub struct LoadedConfig {
    pub config: Config,
    /// Hex SHA-256 of the config file bytes; empty when defaults were used
    pub config_hash: String,
}

/// Load configuration, from `path` when given, defaults otherwise.
pub fn load_config(path: Option<&Path>) -> Result<LoadedConfig> {
    let Some(path) = path else {
        return Ok(LoadedConfig {
            config: Config::default(),
            config_hash: String::new(),
        });
    };
    let bytes = fs::read(path)?;
    let text = std::str::from_utf8(&bytes)
        .map_err(|_| RiffCarveError::Config(format!("{} is not UTF-8", path.display())))?;
    let config: Config = toml::from_str(text)
        .map_err(|e| RiffCarveError::Config(format!("{}: {e}", path.display())))?;
    Ok(LoadedConfig {
        config,
        config_hash: hex::encode(Sha256::digest(&bytes)),
    })
}

fn default_run_id() -> String {
    let secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0);
    format!("run-{secs}")
}
