//! CLI error types.

use downlink_codec::CodecError;
use lorawan_mac::MacError;
use std::path::PathBuf;
use thiserror::Error;

/// Errors surfaced by the `lpf` tool.
#[derive(Debug, Error)]
pub enum CliError {
    /// Downlink encode or decode failed.
    #[error("downlink: {0}")]
    Codec(#[from] CodecError),

    /// MAC command encode failed.
    #[error("MAC: {0}")]
    Mac(#[from] MacError),

    /// Reading input or the config file failed.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Config file did not parse.
    #[error("config file {path}: {source}")]
    Config {
        /// File that was read.
        path: PathBuf,
        /// Underlying YAML error.
        #[source]
        source: serde_yaml::Error,
    },

    /// JSON output could not be produced.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Text output could not be written.
    #[error("format error: {0}")]
    Format(#[from] std::fmt::Error),

    /// Bad command-line value.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Create an invalid argument error.
    pub fn invalid(message: impl Into<String>) -> Self {
        CliError::InvalidArgument(message.into())
    }
}

/// Result type for the CLI.
pub type Result<T> = std::result::Result<T, CliError>;
