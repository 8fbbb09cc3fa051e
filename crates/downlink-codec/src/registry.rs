//! Command schema registry.
//!
//! The registry maps `(function type, command key)` to a [`CommandSchema`].
//! It is built once and only read afterwards; share it behind an `Arc`.

use crate::schema::*;
use crate::types::{CommandKey, FunctionType, SchemaKey};
use std::collections::BTreeMap;

// ============================================================================
// Option Tables
// ============================================================================

const START_STOP: &[SelectOption] = &[
    SelectOption { code: 1, label: "Start" },
    SelectOption { code: 0, label: "Stop" },
];

const HIGH_LOW: &[SelectOption] = &[
    SelectOption { code: 1, label: "High" },
    SelectOption { code: 0, label: "Low" },
];

const ENABLE_DISABLE: &[SelectOption] = &[
    SelectOption { code: 1, label: "Enable" },
    SelectOption { code: 0, label: "Disable" },
];

const LORAWAN_CLASS: &[SelectOption] = &[
    SelectOption { code: 1, label: "Class A" },
    SelectOption { code: 3, label: "Class C" },
];

const ON_OFF: &[SelectOption] = &[
    SelectOption { code: 1, label: "ON" },
    SelectOption { code: 0, label: "OFF" },
];

const ACCEL_FEATURES: &[BitOption] = &[
    BitOption { bit: 4, label: "Displacement" },
    BitOption { bit: 3, label: "Standard Deviation" },
    BitOption { bit: 2, label: "Skewness" },
    BitOption { bit: 1, label: "Crest Factor" },
    BitOption { bit: 0, label: "Kurtosis" },
];

const READ_LOG_PART: &[Part] = &[
    Part::number("idx", "Idx", 4),
    Part::number("n", "N (Bytes)", 2),
    Part::number("k", "K", 2),
];

const LOG_BY_UTC: &[Part] = &[Part::number("idx", "Idx", 4), Part::timestamp("utc", "UTC")];

const FEATURE_DATA: &[Part] = &[
    Part::number("idx", "Idx", 4),
    Part::number("tmp", "Send Temp (1=Yes)", 1),
];

const SCAN_INTERVAL: &[Part] = &[
    Part::number("mask", "Rule Mask (4 Bytes)", 4),
    Part::number("int", "Interval (sec)", 4),
];

// ============================================================================
// Schema Shorthands
// ============================================================================

fn fixed(name: &'static str, command_id: u8, value: u8) -> CommandSchema {
    CommandSchema::new(name, command_id, FieldKind::Fixed { value, len: 1 })
}

fn select(name: &'static str, command_id: u8, options: &'static [SelectOption]) -> CommandSchema {
    CommandSchema::new(name, command_id, FieldKind::Select { options })
}

fn number(name: &'static str, command_id: u8, len: usize, unit: Option<&'static str>) -> CommandSchema {
    CommandSchema::new(name, command_id, FieldKind::Number { len, unit })
}

fn scaled(name: &'static str, command_id: u8, scale: f64) -> CommandSchema {
    CommandSchema::new(name, command_id, FieldKind::Scaled { scale, len: 4 })
}

fn composite(name: &'static str, command_id: u8, parts: &'static [Part]) -> CommandSchema {
    CommandSchema::new(name, command_id, FieldKind::Composite { parts })
}

// ============================================================================
// Registry
// ============================================================================

/// Immutable lookup table of command schemas.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    schemas: BTreeMap<SchemaKey, CommandSchema>,
}

impl Registry {
    /// Build a registry from `(function type, schema)` pairs.
    ///
    /// A later schema with the same key replaces an earlier one.
    pub fn from_schemas(schemas: impl IntoIterator<Item = (FunctionType, CommandSchema)>) -> Self {
        let schemas = schemas
            .into_iter()
            .map(|(function_type, schema)| {
                let key = SchemaKey {
                    function_type,
                    command: schema.key(),
                };
                (key, schema)
            })
            .collect();
        Registry { schemas }
    }

    /// The command set of the device family.
    pub fn standard() -> Self {
        use FunctionType::*;

        Registry::from_schemas([
            // Digital input
            (DigitalInput, select("Start/Stop Counter", 1, START_STOP).describe("Control the counter operation")),
            (DigitalInput, fixed("Clear Overflow", 2, 0).describe("Clear Overflow Status (No params)")),
            (DigitalInput, fixed("Clear Counter", 3, 1).describe("Reset Counter Value to 0")),
            (DigitalInput, fixed("Clear L2H Latch", 4, 0).describe("Clear Latch Status")),
            (DigitalInput, fixed("Clear H2L Latch", 5, 0).describe("Clear Latch Status")),
            (
                DigitalInput,
                number("Set Conv. Interval", 6, 4, Some("sec"))
                    .max(86400.0)
                    .describe("Update Interval in seconds (e.g. 60 = 1 min)"),
            ),
            // Digital output
            (DigitalOutput, select("Set Signal Logic", 1, HIGH_LOW)),
            (DigitalOutput, select("Set Pulse Mode", 2, ENABLE_DISABLE)),
            (DigitalOutput, fixed("Stop Pulse", 3, 1)),
            // Analog input
            (AnalogInput, fixed("Clear High Alarm", 1, 0)),
            (AnalogInput, fixed("Clear Low Alarm", 2, 0)),
            (AnalogInput, fixed("Clear Max Value", 3, 1)),
            (AnalogInput, fixed("Clear Min Value", 4, 1)),
            (AnalogInput, number("Set Conv. Interval", 5, 4, Some("sec"))),
            // Temperature / humidity
            (SensorLowRange, fixed("Clear High Alarm", 1, 0)),
            (SensorLowRange, fixed("Clear Low Alarm", 2, 0)),
            (SensorLowRange, fixed("Clear Max Val", 3, 1)),
            (SensorLowRange, fixed("Clear Min Val", 4, 1)),
            (SensorLowRange, scaled("Set High Alarm", 5, 1000.0).max(2147483.647).describe("Value * 1000")),
            (SensorLowRange, scaled("Set Low Alarm", 6, 1000.0).max(2147483.647).describe("Value * 1000")),
            (SensorLowRange, scaled("Set Offset", 7, 1000.0).max(2147483.647).describe("Value * 1000")),
            // Accelerometer
            (SensorAccelerometer, fixed("Clear Vel. RMS Alarm", 1, 0)),
            (
                SensorAccelerometer,
                scaled("Set Vel. RMS Limit", 5, 100.0)
                    .max(42949672.95)
                    .describe("Value * 100 (Unit: 0.01 mm/s)"),
            ),
            (
                SensorAccelerometer,
                number("Get Log (Msve Data)", 9, 4, None).describe("Log Index (0xFFFFFFFF = Latest)"),
            ),
            (SensorAccelerometer, composite("Read Log Part", 10, READ_LOG_PART)),
            (SensorAccelerometer, composite("Get Log (UTC)", 11, LOG_BY_UTC)),
            (
                SensorAccelerometer,
                CommandSchema::new(
                    "Enable Features",
                    12,
                    FieldKind::Bitmask {
                        len: 2,
                        options: ACCEL_FEATURES,
                    },
                )
                .max(65535.0)
                .describe("Enable specific features (Bit 4-0)"),
            ),
            (
                SensorAccelerometer,
                CommandSchema::new("Trigger Spec Cmd", 14, FieldKind::Fixed { value: 0, len: 0 }),
            ),
            (SensorAccelerometer, composite("Get Feature Data", 15, FEATURE_DATA)),
            // Device configuration, sub-type 1: clock and system
            (
                DeviceConfig,
                CommandSchema::new("Adjust RTC (UTC)", 1, FieldKind::Timestamp)
                    .sub_type(1)
                    .describe("Config Type 1"),
            ),
            (
                DeviceConfig,
                CommandSchema::new("Adjust RTC (ISO)", 2, FieldKind::Ascii { len: 20 })
                    .sub_type(1)
                    .describe("YYYY-MM-DDThh:mm:ssZ"),
            ),
            (
                DeviceConfig,
                CommandSchema::new("Restart System", 3, FieldKind::FixedHex { bytes: b"RST" })
                    .sub_type(1)
                    .describe("String 'RST'"),
            ),
            (
                DeviceConfig,
                number("Adjust RTC Offset", 4, 4, Some("sec"))
                    .sub_type(1)
                    .max(2147483647.0)
                    .describe("Signed Int (+/- Seconds)"),
            ),
            (DeviceConfig, fixed("Query FW Ver", 5, 0).sub_type(1)),
            // Device configuration, sub-type 2: reporting
            (
                DeviceConfig,
                number("Update Interval", 1, 4, Some("sec"))
                    .sub_type(2)
                    .max(2592000.0)
                    .describe("Config Type 2 (1~2592000)"),
            ),
            (DeviceConfig, CommandSchema::new("Schedule", 2, FieldKind::Schedule).sub_type(2)),
            // Device configuration, sub-type 3: LoRaWAN
            (DeviceConfig, select("Set Class", 1, LORAWAN_CLASS).sub_type(3).describe("Config Type 3")),
            (DeviceConfig, select("Message ACK", 2, ENABLE_DISABLE).sub_type(3)),
            (DeviceConfig, number("Retry Counts", 3, 1, None).sub_type(3).max(255.0)),
            // RS-485
            (Rs485Register, number("Set Register Value", 1, 2, None).max(65535.0).describe("Value (0~65535)")),
            (Rs485Register, composite("Config Scan Interval", 0x80, SCAN_INTERVAL)),
            (Rs485Coil, select("Write Coil", 1, ON_OFF)),
            (Rs485Coil, composite("Config Scan Interval", 0x80, SCAN_INTERVAL)),
        ])
    }

    /// Look up a command by its key.
    pub fn lookup(&self, function_type: FunctionType, command: CommandKey) -> Option<&CommandSchema> {
        self.schemas.get(&SchemaKey {
            function_type,
            command,
        })
    }

    /// Look up a command from wire values.
    ///
    /// For device-config the low nibble of the function byte is the sub-type
    /// and must match too; elsewhere it is ignored.
    pub fn lookup_wire(&self, function_type: FunctionType, low_nibble: u8, command_id: u8) -> Option<&CommandSchema> {
        let command = match function_type {
            FunctionType::DeviceConfig => CommandKey::with_sub_type(low_nibble, command_id),
            _ => CommandKey::new(command_id),
        };
        self.lookup(function_type, command)
    }

    /// Commands of one function type, in key order.
    pub fn commands(&self, function_type: FunctionType) -> impl Iterator<Item = &CommandSchema> {
        self.schemas
            .iter()
            .filter(move |(key, _)| key.function_type == function_type)
            .map(|(_, schema)| schema)
    }

    /// Every `(function type, schema)` pair, in key order.
    pub fn iter(&self) -> impl Iterator<Item = (FunctionType, &CommandSchema)> {
        self.schemas.iter().map(|(key, schema)| (key.function_type, schema))
    }

    /// Number of registered commands.
    pub fn len(&self) -> usize {
        self.schemas.len()
    }

    /// Whether no commands are registered.
    pub fn is_empty(&self) -> bool {
        self.schemas.is_empty()
    }
}
