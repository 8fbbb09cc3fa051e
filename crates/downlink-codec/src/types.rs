//! Common types used by the encoder, decoder and registry.

use crate::constants::*;
use crate::CodecError;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Function Types
// ============================================================================

/// Device subsystem a command targets.
///
/// The sensor family shares wire code `0x5` and is split by the range code in
/// the low nibble of the function byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum FunctionType {
    /// Digital input (`0x0`).
    DigitalInput,
    /// Digital output (`0x1`).
    DigitalOutput,
    /// Analog input (`0x3`).
    AnalogInput,
    /// Temperature/humidity sensor (`0x5`, range 0; any range but 4 on decode).
    SensorLowRange,
    /// Accelerometer sensor (`0x5`, range 4).
    SensorAccelerometer,
    /// Device configuration (`0x6`).
    DeviceConfig,
    /// RS-485 coil (`0x7`).
    Rs485Coil,
    /// RS-485 register (`0x8`).
    Rs485Register,
}

/// How a family fills the low nibble and the optional extra byte.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Low nibble is the channel; no extra byte.
    Io,
    /// Low nibble is the range; extra mask byte.
    Sensor,
    /// Low nibble is the sub-type; no extra byte.
    DeviceConfig,
    /// Low nibble is zero; extra port/channel byte.
    Rs485,
}

impl FunctionType {
    /// Every function type, in wire-code order.
    pub const ALL: [FunctionType; 8] = [
        FunctionType::DigitalInput,
        FunctionType::DigitalOutput,
        FunctionType::AnalogInput,
        FunctionType::SensorLowRange,
        FunctionType::SensorAccelerometer,
        FunctionType::DeviceConfig,
        FunctionType::Rs485Coil,
        FunctionType::Rs485Register,
    ];

    /// Wire code carried in the high nibble of the function byte.
    pub fn code(self) -> u8 {
        match self {
            FunctionType::DigitalInput => FUNC_DIGITAL_INPUT,
            FunctionType::DigitalOutput => FUNC_DIGITAL_OUTPUT,
            FunctionType::AnalogInput => FUNC_ANALOG_INPUT,
            FunctionType::SensorLowRange | FunctionType::SensorAccelerometer => FUNC_SENSOR,
            FunctionType::DeviceConfig => FUNC_DEVICE_CONFIG,
            FunctionType::Rs485Coil => FUNC_RS485_COIL,
            FunctionType::Rs485Register => FUNC_RS485_REGISTER,
        }
    }

    /// Wire-level family.
    pub fn family(self) -> Family {
        match self {
            FunctionType::DigitalInput | FunctionType::DigitalOutput | FunctionType::AnalogInput => {
                Family::Io
            }
            FunctionType::SensorLowRange | FunctionType::SensorAccelerometer => Family::Sensor,
            FunctionType::DeviceConfig => Family::DeviceConfig,
            FunctionType::Rs485Coil | FunctionType::Rs485Register => Family::Rs485,
        }
    }

    /// Short key, e.g. `0x5_4`.
    pub fn key(self) -> &'static str {
        match self {
            FunctionType::DigitalInput => "0x0",
            FunctionType::DigitalOutput => "0x1",
            FunctionType::AnalogInput => "0x3",
            FunctionType::SensorLowRange => "0x5_0",
            FunctionType::SensorAccelerometer => "0x5_4",
            FunctionType::DeviceConfig => "0x6",
            FunctionType::Rs485Coil => "0x7",
            FunctionType::Rs485Register => "0x8",
        }
    }

    /// Kebab-case name, e.g. `sensor-accelerometer`.
    pub fn name(self) -> &'static str {
        match self {
            FunctionType::DigitalInput => "digital-input",
            FunctionType::DigitalOutput => "digital-output",
            FunctionType::AnalogInput => "analog-input",
            FunctionType::SensorLowRange => "sensor-low-range",
            FunctionType::SensorAccelerometer => "sensor-accelerometer",
            FunctionType::DeviceConfig => "device-config",
            FunctionType::Rs485Coil => "rs485-coil",
            FunctionType::Rs485Register => "rs485-register",
        }
    }

    /// Resolve the real function type from a function byte.
    pub fn from_function_byte(byte: u8) -> Result<Self, CodecError> {
        let code = byte >> 4;
        let low = byte & 0x0F;
        match code {
            FUNC_DIGITAL_INPUT => Ok(FunctionType::DigitalInput),
            FUNC_DIGITAL_OUTPUT => Ok(FunctionType::DigitalOutput),
            FUNC_ANALOG_INPUT => Ok(FunctionType::AnalogInput),
            // any range other than the accelerometer's reads as low range
            FUNC_SENSOR if low == SENSOR_RANGE_ACCEL => Ok(FunctionType::SensorAccelerometer),
            FUNC_SENSOR => Ok(FunctionType::SensorLowRange),
            FUNC_DEVICE_CONFIG => Ok(FunctionType::DeviceConfig),
            FUNC_RS485_COIL => Ok(FunctionType::Rs485Coil),
            FUNC_RS485_REGISTER => Ok(FunctionType::Rs485Register),
            other => Err(CodecError::UnknownFunctionType(other)),
        }
    }
}

impl fmt::Display for FunctionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for FunctionType {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        FunctionType::ALL
            .into_iter()
            .find(|ft| ft.key() == wanted || ft.name() == wanted)
            .ok_or_else(|| CodecError::malformed(format!("unknown function type '{}'", s)))
    }
}

// ============================================================================
// Command Keys
// ============================================================================

/// Registry key of a command within a function type.
///
/// Written `5` for most families and `1_3` (sub-type 1, command 3) for the
/// device-config family, whose command ids repeat across sub-types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub struct CommandKey {
    /// Device-config sub-type.
    pub sub_type: Option<u8>,
    /// Command id byte.
    pub command_id: u8,
}

impl CommandKey {
    /// Key without a sub-type.
    pub const fn new(command_id: u8) -> Self {
        CommandKey {
            sub_type: None,
            command_id,
        }
    }

    /// Key qualified by a device-config sub-type.
    pub const fn with_sub_type(sub_type: u8, command_id: u8) -> Self {
        CommandKey {
            sub_type: Some(sub_type),
            command_id,
        }
    }
}

impl fmt::Display for CommandKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.sub_type {
            Some(sub) => write!(f, "{}_{}", sub, self.command_id),
            None => write!(f, "{}", self.command_id),
        }
    }
}

impl FromStr for CommandKey {
    type Err = CodecError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parse = |part: &str| {
            let part = part.trim();
            let parsed = match part.strip_prefix("0x").or_else(|| part.strip_prefix("0X")) {
                Some(hex) => u8::from_str_radix(hex, 16),
                None => part.parse::<u8>(),
            };
            parsed.map_err(|_| CodecError::malformed(format!("invalid command key '{}'", s)))
        };

        match s.split_once('_') {
            Some((sub, id)) => Ok(CommandKey::with_sub_type(parse(sub)?, parse(id)?)),
            None => Ok(CommandKey::new(parse(s)?)),
        }
    }
}

/// Structured registry key: function type plus command key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SchemaKey {
    /// Function type.
    pub function_type: FunctionType,
    /// Command within the function type.
    pub command: CommandKey,
}

// ============================================================================
// Targets
// ============================================================================

/// Accelerometer axis selection.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Axes {
    /// X axis (bit 5).
    pub x: bool,
    /// Y axis (bit 6).
    pub y: bool,
    /// Z axis (bit 7).
    pub z: bool,
}

impl Axes {
    /// All three axes.
    pub const ALL: Axes = Axes {
        x: true,
        y: true,
        z: true,
    };

    /// Mask byte with bit7=Z, bit6=Y, bit5=X.
    pub fn to_mask(self) -> u8 {
        let mut mask = 0;
        if self.z {
            mask |= AXIS_Z;
        }
        if self.y {
            mask |= AXIS_Y;
        }
        if self.x {
            mask |= AXIS_X;
        }
        mask
    }

    /// Read the axis bits of a mask byte; other bits are ignored.
    pub fn from_mask(mask: u8) -> Self {
        Axes {
            x: mask & AXIS_X != 0,
            y: mask & AXIS_Y != 0,
            z: mask & AXIS_Z != 0,
        }
    }
}

impl fmt::Display for Axes {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut names = Vec::with_capacity(3);
        if self.z {
            names.push("Z");
        }
        if self.y {
            names.push("Y");
        }
        if self.x {
            names.push("X");
        }
        if names.is_empty() {
            f.write_str("None")
        } else {
            f.write_str(&names.join(","))
        }
    }
}

/// What the function byte's low nibble and the extra byte address.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum Target {
    /// No addressing (device-config), or the family default.
    #[default]
    None,
    /// I/O channel index, 0..=15.
    Channel {
        /// Channel index.
        channel: u8,
    },
    /// RS-485 port and channel.
    Rs485 {
        /// Port, 0 or 1.
        port: u8,
        /// Channel, 0..=127.
        channel: u8,
    },
    /// Accelerometer axes.
    Axes(Axes),
    /// Low-range sensor mask byte. Always encoded as 0.
    SensorMask {
        /// Mask byte as received.
        mask: u8,
    },
}

impl fmt::Display for Target {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Target::None => f.write_str("None"),
            Target::Channel { channel } => write!(f, "Channel: {}", channel),
            Target::Rs485 { port, channel } => write!(f, "Port: {}, Channel: {}", port, channel),
            Target::Axes(axes) => write!(f, "Accel Axes: {}", axes),
            Target::SensorMask { mask } => write!(f, "Sensor Mask: {}", mask),
        }
    }
}

// ============================================================================
// Values
// ============================================================================

/// Schedule record (10 bytes on the wire).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct Schedule {
    /// 0 = basic, 1 = advanced.
    pub mode: u8,
    /// Bit 0 = Sunday .. bit 6 = Saturday.
    pub weekdays: u8,
    /// Start hour.
    pub start_hour: u8,
    /// Start minute.
    pub start_minute: u8,
    /// End hour.
    pub end_hour: u8,
    /// End minute.
    pub end_minute: u8,
    /// Reporting interval in seconds.
    pub interval_secs: u32,
}

impl Schedule {
    /// Bytes on the wire.
    pub const WIRE_LEN: usize = 10;

    /// Selected weekdays as letters, e.g. `M,T,W`.
    pub fn weekday_letters(&self) -> String {
        WEEKDAY_LETTERS
            .iter()
            .enumerate()
            .filter(|(bit, _)| self.weekdays & (1 << bit) != 0)
            .map(|(_, letter)| *letter)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Typed value of a command's data bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "kebab-case")]
pub enum FieldValue {
    /// No caller input (fixed and fixed-hex commands).
    None,
    /// Raw option code of a selectable enum.
    Code(u8),
    /// Unscaled value of a scaled number.
    Scaled(f64),
    /// Plain integer.
    Number(i64),
    /// ASCII text.
    Text(String),
    /// Seconds since the Unix epoch.
    Timestamp(u32),
    /// Bit set of a bitmask command.
    Bitmask(u16),
    /// Composite record keyed by part id.
    Record(BTreeMap<String, u32>),
    /// Schedule record.
    Schedule(Schedule),
}

impl FieldValue {
    /// Name of the variant, for error messages.
    pub fn kind_name(&self) -> &'static str {
        match self {
            FieldValue::None => "none",
            FieldValue::Code(_) => "code",
            FieldValue::Scaled(_) => "scaled",
            FieldValue::Number(_) => "number",
            FieldValue::Text(_) => "text",
            FieldValue::Timestamp(_) => "timestamp",
            FieldValue::Bitmask(_) => "bitmask",
            FieldValue::Record(_) => "record",
            FieldValue::Schedule(_) => "schedule",
        }
    }

    /// Build a composite record from `(part id, value)` pairs.
    pub fn record<'a>(parts: impl IntoIterator<Item = (&'a str, u32)>) -> Self {
        FieldValue::Record(parts.into_iter().map(|(k, v)| (k.to_string(), v)).collect())
    }
}
