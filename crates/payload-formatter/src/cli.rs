//! Command-line definition and dispatch.

use crate::config::{Config, OutputFormat};
use crate::error::{CliError, Result};
use crate::input::{self, TargetArgs, ValueArgs};
use crate::render::{self, Renderer};
use clap::{Args, Parser, Subcommand};
use downlink_codec::{CodecError, CommandKey, DownlinkCodec, DownlinkRequest, FunctionType};
use lorawan_mac::Direction;
use std::path::PathBuf;
use tracing::{debug, info};

#[derive(Debug, Parser)]
#[command(
    name = "lpf",
    author,
    version,
    about = "Build and read LoRa device downlinks and LoRaWAN MAC commands",
    long_about = None
)]
pub struct Cli {
    /// YAML configuration file (defaults to $LPF_CONFIG)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Print results as JSON
    #[arg(long, global = true)]
    pub json: bool,

    /// Log filter when RUST_LOG is unset, e.g. `debug`
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Vendor device downlink frames
    #[command(subcommand)]
    Downlink(DownlinkCommand),
    /// LoRaWAN MAC commands
    #[command(subcommand)]
    Mac(MacCommand),
}

#[derive(Debug, Subcommand)]
pub enum DownlinkCommand {
    /// Build a frame
    Encode(EncodeArgs),
    /// Read a frame
    Decode {
        /// Frame as hex; spaces allowed
        hex: String,
    },
    /// List the known commands
    List {
        /// Only this function type, e.g. `0x5_4` or `digital-input`
        #[arg(long = "type")]
        function_type: Option<FunctionType>,
    },
}

#[derive(Debug, Args)]
pub struct EncodeArgs {
    /// Function type, e.g. `0x0` or `sensor-accelerometer`
    #[arg(long = "type")]
    pub function_type: FunctionType,

    /// Command key, e.g. `2` or `1_3` for device-config
    #[arg(long)]
    pub command: CommandKey,

    /// Sequence number
    #[arg(long)]
    pub seq: Option<u8>,

    /// I/O channel (0-15)
    #[arg(long)]
    pub channel: Option<u8>,

    /// RS-485 port (0-1)
    #[arg(long)]
    pub port: Option<u8>,

    /// RS-485 channel (0-127)
    #[arg(long = "rs485-channel")]
    pub rs485_channel: Option<u8>,

    /// Accelerometer axes, e.g. `xyz`
    #[arg(long)]
    pub axes: Option<String>,

    /// Command value
    #[arg(long, allow_hyphen_values = true)]
    pub value: Option<String>,

    /// Composite part as id=value; repeatable
    #[arg(long = "part", value_parser = input::parse_key_value)]
    pub parts: Vec<(String, String)>,

    /// Schedule as mode=..,days=..,start=HH:MM,end=HH:MM,interval=..
    #[arg(long)]
    pub schedule: Option<String>,
}

#[derive(Debug, Subcommand)]
pub enum MacCommand {
    /// Build one command
    Encode {
        /// Command identifier, e.g. `0x03`
        #[arg(long, value_parser = parse_cid)]
        cid: u8,

        /// `up` or `down`
        #[arg(long)]
        direction: Option<Direction>,

        /// Parameter as name=value; repeatable
        #[arg(long = "param", value_parser = input::parse_key_value)]
        params: Vec<(String, String)>,
    },
    /// Read a sequence of commands
    Decode {
        /// Commands as hex; spaces allowed
        hex: String,

        /// `up` or `down`
        #[arg(long)]
        direction: Option<Direction>,
    },
}

fn parse_cid(s: &str) -> Result<u8> {
    let value = input::parse_int(s)?;
    u8::try_from(value).map_err(|_| CliError::invalid(format!("CID {} does not fit one byte", value)))
}

impl Cli {
    /// Apply command-line overrides to a loaded configuration.
    pub fn apply(&self, mut config: Config) -> Config {
        if self.json {
            config.output = OutputFormat::Json;
        }
        if let Some(level) = &self.log_level {
            config.log_level = level.clone();
        }
        config
    }
}

/// Result of one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Output {
    /// Text for stdout.
    pub text: String,
    /// False when a MAC scan stopped early.
    pub complete: bool,
}

impl Output {
    fn complete(text: String) -> Self {
        Output { text, complete: true }
    }
}

/// Run a parsed command.
pub fn run(command: &Commands, config: &Config) -> Result<Output> {
    let renderer = Renderer::from_config(config);
    match command {
        Commands::Downlink(cmd) => run_downlink(cmd, config, &renderer),
        Commands::Mac(cmd) => run_mac(cmd, config, &renderer),
    }
}

fn run_downlink(cmd: &DownlinkCommand, config: &Config, renderer: &Renderer) -> Result<Output> {
    let codec = DownlinkCodec::standard();
    match cmd {
        DownlinkCommand::Encode(args) => {
            let schema = codec
                .registry()
                .lookup(args.function_type, args.command)
                .ok_or_else(|| CodecError::InvalidConfiguration {
                    function_type: args.function_type.key().to_string(),
                    command: args.command.to_string(),
                })?;
            let value = input::build_value(
                schema,
                &ValueArgs {
                    value: args.value.clone(),
                    parts: args.parts.clone(),
                    schedule: args.schedule.clone(),
                },
            )?;
            let target = input::build_target(
                args.function_type,
                &TargetArgs {
                    channel: args.channel,
                    port: args.port,
                    rs485_channel: args.rs485_channel,
                    axes: args.axes.clone(),
                },
            )?;
            debug!(command = schema.name, ?target, ?value, "building downlink");

            let request = DownlinkRequest::new(args.function_type, args.command)
                .target(target)
                .sequence(args.seq.unwrap_or(config.default_sequence))
                .value(value);
            let frame = codec.encode(&request)?;
            info!(hex = %frame.hex, "encoded {}", schema.name);
            Ok(Output::complete(renderer.encoded(&frame)?))
        }
        DownlinkCommand::Decode { hex } => {
            let frame = codec.decode(hex)?;
            Ok(Output::complete(renderer.decoded(&frame)?))
        }
        DownlinkCommand::List { function_type } => {
            let entries = render::listing(codec.registry(), *function_type);
            Ok(Output::complete(renderer.listing(&entries)?))
        }
    }
}

fn run_mac(cmd: &MacCommand, config: &Config, renderer: &Renderer) -> Result<Output> {
    match cmd {
        MacCommand::Encode {
            cid,
            direction,
            params,
        } => {
            let direction = direction.unwrap_or(config.default_direction);
            let params = input::build_mac_params(params)?;
            let hex = lorawan_mac::encode(*cid, direction, &params)?;
            Ok(Output::complete(renderer.mac_hex(&hex)?))
        }
        MacCommand::Decode { hex, direction } => {
            let direction = direction.unwrap_or(config.default_direction);
            let result = lorawan_mac::decode(hex, direction);
            Ok(Output {
                text: renderer.mac_decoded(&result)?,
                complete: result.is_complete(),
            })
        }
    }
}
