//! Frame encoding.
//!
//! ## Frame Format
//!
//! | Field          | Size (bytes) | Description                                           |
//! |----------------|--------------|-------------------------------------------------------|
//! | start marker   | 1            | Always `0x80`                                         |
//! | sequence       | 1            | Caller-chosen sequence number                         |
//! | payload length | 1            | Bytes from the function byte to the end of the data   |
//! | function byte  | 1            | Function code (high nibble) + channel/range/sub-type  |
//! | extra byte     | 0 or 1       | Sensor mask or RS-485 port/channel                    |
//! | segment length | 1            | 1 + data length                                       |
//! | command id     | 1            | Command within the function type                      |
//! | data           | N            | Laid out per the command's [`FieldKind`]              |
//! | checksum       | 1            | CRC-8 over the payload only                           |

use crate::checksum::checksum;
use crate::constants::*;
use crate::hexstr::to_hex;
use crate::registry::Registry;
use crate::schema::{CommandSchema, FieldKind};
use crate::types::*;
use crate::CodecError;
use bytes::{BufMut, BytesMut};
use serde::Serialize;
use tracing::debug;

/// Everything needed to build one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct DownlinkRequest {
    /// Function type (sensor range already resolved).
    pub function_type: FunctionType,
    /// Command key within the function type.
    pub command: CommandKey,
    /// Channel, port or axis addressing.
    pub target: Target,
    /// Sequence number for the header.
    pub sequence: u8,
    /// Command data.
    pub value: FieldValue,
}

impl DownlinkRequest {
    /// Request with no target, sequence 0 and no value.
    pub fn new(function_type: FunctionType, command: CommandKey) -> Self {
        DownlinkRequest {
            function_type,
            command,
            target: Target::None,
            sequence: 0,
            value: FieldValue::None,
        }
    }

    /// Set the target.
    pub fn target(mut self, target: Target) -> Self {
        self.target = target;
        self
    }

    /// Set the sequence number.
    pub fn sequence(mut self, sequence: u8) -> Self {
        self.sequence = sequence;
        self
    }

    /// Set the command data.
    pub fn value(mut self, value: FieldValue) -> Self {
        self.value = value;
        self
    }
}

/// Named byte ranges of an encoded frame, as hex, for display.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FrameBreakdown {
    /// Start marker, sequence and payload length.
    pub header: String,
    /// Start marker.
    pub start_marker: String,
    /// Sequence number.
    pub sequence: String,
    /// Payload length.
    pub payload_length: String,
    /// Function byte.
    pub function_byte: String,
    /// Sensor mask or RS-485 channel byte, when the family has one.
    pub extra_byte: Option<String>,
    /// Segment length.
    pub segment_length: String,
    /// Command id.
    pub command_id: String,
    /// Data bytes.
    pub data: String,
    /// Checksum.
    pub checksum: String,
}

/// An encoded frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EncodedFrame {
    /// Uppercase hex of the whole frame.
    pub hex: String,
    /// Raw frame bytes.
    #[serde(skip)]
    pub bytes: Vec<u8>,
    /// Display breakdown.
    pub breakdown: FrameBreakdown,
}

impl EncodedFrame {
    /// Payload length field (byte 2).
    pub fn payload_length(&self) -> usize {
        self.bytes.len() - HEADER_LEN - CHECKSUM_LEN
    }
}

/// Encode a request against a registry.
pub(crate) fn encode_frame(registry: &Registry, request: &DownlinkRequest) -> Result<EncodedFrame, CodecError> {
    let schema = registry
        .lookup(request.function_type, request.command)
        .ok_or_else(|| CodecError::InvalidConfiguration {
            function_type: request.function_type.key().to_string(),
            command: request.command.to_string(),
        })?;

    let data = encode_data(schema, &request.value)?;
    let (function_byte, extra_byte) = function_bytes(request.function_type, schema, &request.target)?;

    let payload_len = 1 + usize::from(extra_byte.is_some()) + 2 + data.len();
    if payload_len > MAX_PAYLOAD_LEN {
        return Err(CodecError::PayloadTooLarge {
            size: payload_len,
            max: MAX_PAYLOAD_LEN,
        });
    }
    let segment_length = (1 + data.len()) as u8;

    let mut payload = BytesMut::with_capacity(payload_len);
    payload.put_u8(function_byte);
    if let Some(extra) = extra_byte {
        payload.put_u8(extra);
    }
    payload.put_u8(segment_length);
    payload.put_u8(schema.command_id);
    payload.put_slice(&data);

    let crc = checksum(&payload);

    let mut frame = BytesMut::with_capacity(HEADER_LEN + payload_len + CHECKSUM_LEN);
    frame.put_u8(START_MARKER);
    frame.put_u8(request.sequence);
    frame.put_u8(payload_len as u8);
    frame.put_slice(&payload);
    frame.put_u8(crc);

    debug!(
        function_type = %request.function_type,
        command = %request.command,
        payload_len,
        "encoded {}",
        schema.name
    );

    let bytes = frame.to_vec();
    let breakdown = FrameBreakdown {
        header: to_hex(&bytes[..HEADER_LEN]),
        start_marker: to_hex(&[START_MARKER]),
        sequence: to_hex(&[request.sequence]),
        payload_length: to_hex(&[payload_len as u8]),
        function_byte: to_hex(&[function_byte]),
        extra_byte: extra_byte.map(|b| to_hex(&[b])),
        segment_length: to_hex(&[segment_length]),
        command_id: to_hex(&[schema.command_id]),
        data: to_hex(&data),
        checksum: to_hex(&[crc]),
    };

    Ok(EncodedFrame {
        hex: to_hex(&bytes),
        bytes,
        breakdown,
    })
}

/// Build the function byte and the family's optional extra byte.
fn function_bytes(
    function_type: FunctionType,
    schema: &CommandSchema,
    target: &Target,
) -> Result<(u8, Option<u8>), CodecError> {
    let high = function_type.code() << 4;
    let wrong_target = || CodecError::InvalidTarget {
        function_type: function_type.key().to_string(),
        reason: format!("{:?} does not apply", target),
    };

    match function_type.family() {
        Family::Io => {
            let channel = match target {
                Target::Channel { channel } => *channel,
                Target::None => 0,
                _ => return Err(wrong_target()),
            };
            if channel > MAX_IO_CHANNEL {
                return Err(CodecError::out_of_range("channel", channel, 0, MAX_IO_CHANNEL.into()));
            }
            Ok((high | channel, None))
        }
        Family::Sensor => {
            let (range, mask) = match (function_type, target) {
                (FunctionType::SensorAccelerometer, Target::Axes(axes)) => (SENSOR_RANGE_ACCEL, axes.to_mask()),
                (FunctionType::SensorAccelerometer, Target::None) => (SENSOR_RANGE_ACCEL, 0),
                (FunctionType::SensorLowRange, Target::None | Target::SensorMask { .. }) => (SENSOR_RANGE_LOW, 0),
                _ => return Err(wrong_target()),
            };
            Ok((high | range, Some(mask)))
        }
        Family::DeviceConfig => {
            if *target != Target::None {
                return Err(wrong_target());
            }
            Ok((high | (schema.sub_type.unwrap_or(0) & 0x0F), None))
        }
        Family::Rs485 => {
            let (port, channel) = match target {
                Target::Rs485 { port, channel } => (*port, *channel),
                Target::None => (0, 0),
                _ => return Err(wrong_target()),
            };
            if port > MAX_RS485_PORT {
                return Err(CodecError::out_of_range("port", port, 0, MAX_RS485_PORT.into()));
            }
            if channel > MAX_RS485_CHANNEL {
                return Err(CodecError::out_of_range("channel", channel, 0, MAX_RS485_CHANNEL.into()));
            }
            Ok((high, Some((port << 7) | channel)))
        }
    }
}

/// Serialize a value per the schema's kind.
pub(crate) fn encode_data(schema: &CommandSchema, value: &FieldValue) -> Result<Vec<u8>, CodecError> {
    let mut buf = BytesMut::with_capacity(schema.kind.len());

    match (&schema.kind, value) {
        (FieldKind::Fixed { value, len }, _) => {
            if *len > 0 {
                buf.put_u8(*value);
            }
        }
        (FieldKind::FixedHex { bytes }, _) => buf.put_slice(bytes),
        (FieldKind::Select { .. }, FieldValue::Code(code)) => buf.put_u8(*code),
        (FieldKind::Scaled { scale, len }, FieldValue::Scaled(v)) => {
            let raw = (v * scale).round();
            let (min, max) = wire_range(*len)?;
            if !raw.is_finite() || raw < min as f64 || raw > max as f64 {
                return Err(CodecError::out_of_range(schema.name, v, min, max));
            }
            put_wrapped(&mut buf, raw as i64, *len, schema.name)?;
        }
        (FieldKind::Number { len, .. }, FieldValue::Number(v)) => {
            put_wrapped(&mut buf, *v, *len, schema.name)?;
        }
        (FieldKind::Bitmask { len, .. }, FieldValue::Bitmask(mask)) => {
            put_unsigned(&mut buf, u64::from(*mask), *len, schema.name)?;
        }
        (FieldKind::Composite { parts }, FieldValue::Record(values)) => {
            for part in parts.iter() {
                let v = values
                    .get(part.id)
                    .ok_or_else(|| CodecError::MissingField(part.id.to_string()))?;
                put_unsigned(&mut buf, u64::from(*v), part.len, part.id)?;
            }
        }
        (FieldKind::Schedule, FieldValue::Schedule(s)) => {
            buf.put_u8(s.mode);
            buf.put_u8(s.weekdays);
            buf.put_u8(s.start_hour);
            buf.put_u8(s.start_minute);
            buf.put_u8(s.end_hour);
            buf.put_u8(s.end_minute);
            buf.put_u32_le(s.interval_secs);
        }
        (FieldKind::Ascii { .. }, FieldValue::Text(text)) => {
            if !text.is_ascii() {
                return Err(CodecError::NotAscii(text.clone()));
            }
            buf.put_slice(text.as_bytes());
        }
        (FieldKind::Timestamp, FieldValue::Timestamp(secs)) => buf.put_u32_le(*secs),
        (kind, value) => {
            return Err(CodecError::ValueKindMismatch {
                expected: kind.tag(),
                actual: value.kind_name(),
            })
        }
    }

    Ok(buf.to_vec())
}

/// Accepted range of an N-byte number: signed minimum to unsigned maximum.
fn wire_range(len: usize) -> Result<(i64, i64), CodecError> {
    match len {
        1 => Ok((i8::MIN.into(), u8::MAX.into())),
        2 => Ok((i16::MIN.into(), u16::MAX.into())),
        4 => Ok((i32::MIN.into(), u32::MAX.into())),
        other => Err(CodecError::malformed(format!("unsupported field width {}", other))),
    }
}

/// Write a two's-complement little-endian integer.
fn put_wrapped(buf: &mut BytesMut, v: i64, len: usize, field: &str) -> Result<(), CodecError> {
    let (min, max) = wire_range(len)?;
    if v < min || v > max {
        return Err(CodecError::out_of_range(field, v, min, max));
    }
    match len {
        1 => buf.put_u8(v as u8),
        2 => buf.put_u16_le(v as u16),
        _ => buf.put_u32_le(v as u32),
    }
    Ok(())
}

/// Write an unsigned little-endian integer.
fn put_unsigned(buf: &mut BytesMut, v: u64, len: usize, field: &str) -> Result<(), CodecError> {
    let (_, max) = wire_range(len)?;
    if v > max as u64 {
        return Err(CodecError::out_of_range(field, v, 0, max));
    }
    put_wrapped(buf, v as i64, len, field)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn encode(request: &DownlinkRequest) -> Result<EncodedFrame, CodecError> {
        encode_frame(&Registry::standard(), request)
    }

    #[test]
    fn test_io_channel_in_low_nibble() {
        let frame = encode(
            &DownlinkRequest::new(FunctionType::DigitalOutput, CommandKey::new(1))
                .target(Target::Channel { channel: 7 })
                .value(FieldValue::Code(1)),
        )
        .unwrap();
        assert_eq!(frame.breakdown.function_byte, "17");
        assert_eq!(frame.breakdown.extra_byte, None);
        assert_eq!(frame.breakdown.data, "01");
    }

    #[test]
    fn test_rs485_channel_byte() {
        let frame = encode(
            &DownlinkRequest::new(FunctionType::Rs485Coil, CommandKey::new(1))
                .target(Target::Rs485 { port: 1, channel: 5 })
                .value(FieldValue::Code(0)),
        )
        .unwrap();
        assert_eq!(frame.breakdown.function_byte, "70");
        assert_eq!(frame.breakdown.extra_byte.as_deref(), Some("85"));
    }

    #[test]
    fn test_accelerometer_axes_mask() {
        let frame = encode(
            &DownlinkRequest::new(FunctionType::SensorAccelerometer, CommandKey::new(1)).target(
                Target::Axes(Axes {
                    x: true,
                    y: true,
                    z: false,
                }),
            ),
        )
        .unwrap();
        assert_eq!(frame.breakdown.function_byte, "54");
        assert_eq!(frame.breakdown.extra_byte.as_deref(), Some("60"));
    }

    #[test]
    fn test_device_config_sub_type_nibble() {
        let frame = encode(&DownlinkRequest::new(
            FunctionType::DeviceConfig,
            CommandKey::with_sub_type(1, 3),
        ))
        .unwrap();
        assert_eq!(frame.breakdown.function_byte, "61");
        assert_eq!(frame.breakdown.data, "525354");
        assert_eq!(frame.breakdown.segment_length, "04");
    }

    #[test]
    fn test_fixed_ignores_input() {
        let frame = encode(
            &DownlinkRequest::new(FunctionType::DigitalInput, CommandKey::new(3)).value(FieldValue::Number(99)),
        )
        .unwrap();
        assert_eq!(frame.breakdown.data, "01");
    }

    #[test]
    fn test_zero_length_fixed() {
        let frame = encode(&DownlinkRequest::new(
            FunctionType::SensorAccelerometer,
            CommandKey::new(14),
        ))
        .unwrap();
        assert_eq!(frame.breakdown.data, "");
        assert_eq!(frame.breakdown.segment_length, "01");
    }

    #[test]
    fn test_negative_number_twos_complement() {
        let frame = encode(
            &DownlinkRequest::new(FunctionType::DeviceConfig, CommandKey::with_sub_type(1, 4))
                .value(FieldValue::Number(-2)),
        )
        .unwrap();
        assert_eq!(frame.breakdown.data, "FEFFFFFF");
    }

    #[test]
    fn test_number_out_of_range() {
        let err = encode(
            &DownlinkRequest::new(FunctionType::DeviceConfig, CommandKey::with_sub_type(3, 3))
                .value(FieldValue::Number(256)),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::ValueOutOfRange { max: 255, .. }));
    }

    #[test]
    fn test_unknown_command_is_invalid_configuration() {
        let err = encode(&DownlinkRequest::new(FunctionType::DigitalOutput, CommandKey::new(9))).unwrap_err();
        assert_eq!(
            err,
            CodecError::InvalidConfiguration {
                function_type: "0x1".to_string(),
                command: "9".to_string(),
            }
        );
    }

    #[test]
    fn test_wrong_value_kind() {
        let err = encode(
            &DownlinkRequest::new(FunctionType::SensorLowRange, CommandKey::new(5)).value(FieldValue::Number(1)),
        )
        .unwrap_err();
        assert_eq!(
            err,
            CodecError::ValueKindMismatch {
                expected: "scaled",
                actual: "number",
            }
        );
    }

    #[test]
    fn test_wrong_target() {
        let err = encode(
            &DownlinkRequest::new(FunctionType::DeviceConfig, CommandKey::with_sub_type(1, 5))
                .target(Target::Channel { channel: 1 }),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::InvalidTarget { .. }));

        let err = encode(
            &DownlinkRequest::new(FunctionType::DigitalInput, CommandKey::new(2))
                .target(Target::Channel { channel: 16 }),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::ValueOutOfRange { .. }));
    }

    #[test]
    fn test_composite_missing_part() {
        let err = encode(
            &DownlinkRequest::new(FunctionType::Rs485Register, CommandKey::new(0x80))
                .value(FieldValue::record([("mask", 1)])),
        )
        .unwrap_err();
        assert_eq!(err, CodecError::MissingField("int".to_string()));
    }

    #[test]
    fn test_non_ascii_text() {
        let err = encode(
            &DownlinkRequest::new(FunctionType::DeviceConfig, CommandKey::with_sub_type(1, 2))
                .value(FieldValue::Text("2024-01-01T00:00:00Ω".to_string())),
        )
        .unwrap_err();
        assert!(matches!(err, CodecError::NotAscii(_)));
    }

    #[test]
    fn test_payload_too_large() {
        let err = encode(
            &DownlinkRequest::new(FunctionType::DeviceConfig, CommandKey::with_sub_type(1, 2))
                .value(FieldValue::Text("x".repeat(253))),
        )
        .unwrap_err();
        assert_eq!(err, CodecError::PayloadTooLarge { size: 256, max: 255 });
    }
}
