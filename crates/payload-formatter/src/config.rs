//! YAML configuration.
//!
//! ```yaml
//! log_level: info          # used when RUST_LOG is unset
//! output: json             # text | json
//! default_sequence: 1
//! default_direction: uplink
//! spaced_hex: false
//! ```
//!
//! Every key is optional. Command-line flags override the file.

use crate::error::{CliError, Result};
use lorawan_mac::Direction;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable naming the config file.
pub const CONFIG_ENV: &str = "LPF_CONFIG";

/// How results are printed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Human-readable lines.
    #[default]
    Text,
    /// Pretty-printed JSON.
    Json,
}

/// Tool configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    /// Filter directive when `RUST_LOG` is not set.
    pub log_level: String,
    /// Output format.
    pub output: OutputFormat,
    /// Sequence number when `--seq` is absent.
    pub default_sequence: u8,
    /// MAC direction when `--direction` is absent.
    pub default_direction: Direction,
    /// Space hex output every two characters.
    pub spaced_hex: bool,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            log_level: "warn".to_string(),
            output: OutputFormat::Text,
            default_sequence: 0,
            default_direction: Direction::Downlink,
            spaced_hex: true,
        }
    }
}

impl Config {
    /// Parse YAML text.
    pub fn from_yaml(text: &str, path: &Path) -> Result<Self> {
        // an empty file parses as null
        if text.trim().is_empty() {
            return Ok(Config::default());
        }
        serde_yaml::from_str(text).map_err(|source| CliError::Config {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Load a config file.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Config::from_yaml(&text, path)
    }

    /// Pick the config file: explicit path, then `LPF_CONFIG`, else defaults.
    pub fn resolve(explicit: Option<&Path>) -> Result<Self> {
        match config_path(explicit, std::env::var_os(CONFIG_ENV).map(PathBuf::from)) {
            Some(path) => Config::load(&path),
            None => Ok(Config::default()),
        }
    }
}

fn config_path(explicit: Option<&Path>, from_env: Option<PathBuf>) -> Option<PathBuf> {
    explicit.map(Path::to_path_buf).or(from_env)
}
