//! Frame constants
//!
//! Byte values and sizes of the downlink frame layout:
//!
//! ```text
//! +--------+-----+-----+----------+-------------+---------+--------+--------+-----+
//! | 0x80   | seq | len | function | [mask/chan] | seg_len | cmd_id | data.. | crc |
//! +--------+-----+-----+----------+-------------+---------+--------+--------+-----+
//!  \___ header ___/     \_______________ payload (len bytes) ______________/
//! ```

// ============================================================================
// Frame Layout
// ============================================================================

/// First byte of every downlink frame (first segment, version 0, address 0).
pub const START_MARKER: u8 = 0x80;
/// Start marker, sequence and payload length.
pub const HEADER_LEN: usize = 3;
/// Trailing CRC-8.
pub const CHECKSUM_LEN: usize = 1;
/// Shortest hex input accepted by the decoder, in bytes.
pub const MIN_FRAME_LEN: usize = 4;
/// Largest payload the one-byte length field can describe.
pub const MAX_PAYLOAD_LEN: usize = u8::MAX as usize;

// ============================================================================
// Function Codes (high nibble of the function byte)
// ============================================================================

/// Digital input.
pub const FUNC_DIGITAL_INPUT: u8 = 0x0;
/// Digital output.
pub const FUNC_DIGITAL_OUTPUT: u8 = 0x1;
/// Analog input.
pub const FUNC_ANALOG_INPUT: u8 = 0x3;
/// Sensor; the low nibble selects the range.
pub const FUNC_SENSOR: u8 = 0x5;
/// Device configuration; the low nibble carries the sub-type.
pub const FUNC_DEVICE_CONFIG: u8 = 0x6;
/// RS-485 coil.
pub const FUNC_RS485_COIL: u8 = 0x7;
/// RS-485 register.
pub const FUNC_RS485_REGISTER: u8 = 0x8;

/// Sensor range code for temperature/humidity.
pub const SENSOR_RANGE_LOW: u8 = 0;
/// Sensor range code for the accelerometer.
pub const SENSOR_RANGE_ACCEL: u8 = 4;

// ============================================================================
// Extra Byte Layouts
// ============================================================================

/// Accelerometer mask bit for the Z axis.
pub const AXIS_Z: u8 = 0x80;
/// Accelerometer mask bit for the Y axis.
pub const AXIS_Y: u8 = 0x40;
/// Accelerometer mask bit for the X axis.
pub const AXIS_X: u8 = 0x20;

/// Highest I/O channel index (low nibble).
pub const MAX_IO_CHANNEL: u8 = 0x0F;
/// Highest RS-485 port number (bit 7 of the channel byte).
pub const MAX_RS485_PORT: u8 = 1;
/// Highest RS-485 channel index (bits 6..0 of the channel byte).
pub const MAX_RS485_CHANNEL: u8 = 0x7F;

// ============================================================================
// Command Data
// ============================================================================

/// Literal sent by "Restart System".
pub const RESTART_LITERAL: &[u8] = b"RST";
/// Name reported for command ids the registry does not know.
pub const UNKNOWN_COMMAND: &str = "Unknown Command";
/// Weekday letters for schedule mask bits 0..6, Sunday first.
pub const WEEKDAY_LETTERS: [&str; 7] = ["S", "M", "T", "W", "T", "F", "S"];
