//! # payload-formatter
//!
//! Library behind the `lpf` command-line tool. It turns command-line text into
//! typed requests for [`downlink_codec`] and [`lorawan_mac`], and renders
//! their results as text or JSON.
//!
//! ```text
//! lpf downlink encode --type 0x0 --command 2 --channel 2 --seq 5
//! lpf downlink decode "80 05 04 02 01 02 00 BC"
//! lpf mac decode 0353030001 --direction down --json
//! ```

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod logging;
pub mod render;

pub use cli::{run, Cli, Commands, Output};
pub use config::{Config, OutputFormat, CONFIG_ENV};
pub use error::{CliError, Result};
pub use render::Renderer;
