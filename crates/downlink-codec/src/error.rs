//! Error types for downlink-codec.

use thiserror::Error;

/// Errors that can occur while encoding or decoding a downlink frame.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CodecError {
    /// Input is not a usable hex string (bad characters, odd length, too short).
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// The header's payload length does not match the bytes received.
    #[error("length mismatch: header says {declared} bytes of payload, but found {actual}")]
    LengthMismatch {
        /// Payload length declared in byte 2.
        declared: u8,
        /// Payload bytes actually present.
        actual: usize,
    },

    /// The trailing checksum byte does not match the recomputed one.
    #[error("checksum mismatch: expected 0x{expected:02X}, found 0x{actual:02X}")]
    ChecksumMismatch {
        /// Checksum computed over the payload.
        expected: u8,
        /// Checksum carried by the frame.
        actual: u8,
    },

    /// High nibble of the function byte names no known device family.
    #[error("unknown function type code: 0x{0:X}")]
    UnknownFunctionType(u8),

    /// Payload ended before a required header field.
    #[error("truncated payload: missing {field} (needed {needed} bytes, has {available})")]
    TruncatedPayload {
        /// Name of the missing field.
        field: &'static str,
        /// Bytes required.
        needed: usize,
        /// Bytes left.
        available: usize,
    },

    /// Encode requested for a command the registry does not define.
    #[error("invalid command configuration: no command '{command}' for function type {function_type}")]
    InvalidConfiguration {
        /// Function type key, e.g. `0x5_0`.
        function_type: String,
        /// Command key, e.g. `5` or `1_3`.
        command: String,
    },

    /// The channel/port/axis target does not fit the function type.
    #[error("invalid target for {function_type}: {reason}")]
    InvalidTarget {
        /// Function type key.
        function_type: String,
        /// What was wrong.
        reason: String,
    },

    /// The supplied value has the wrong shape for the command's schema.
    #[error("value kind mismatch: command expects {expected}, got {actual}")]
    ValueKindMismatch {
        /// Schema kind.
        expected: &'static str,
        /// Supplied value kind.
        actual: &'static str,
    },

    /// A composite record is missing one of its parts.
    #[error("missing field: {0}")]
    MissingField(String),

    /// A number does not fit its wire width.
    #[error("{field} out of range: {value} (allowed {min}..={max})")]
    ValueOutOfRange {
        /// Field name.
        field: String,
        /// Offending value.
        value: String,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },

    /// Text fields travel one byte per character.
    #[error("text contains non-ASCII characters: {0:?}")]
    NotAscii(String),

    /// The payload no longer fits the one-byte length field.
    #[error("payload too large: {size} bytes (max {max})")]
    PayloadTooLarge {
        /// Actual payload size.
        size: usize,
        /// Largest payload the header can describe.
        max: usize,
    },
}

impl CodecError {
    /// Create a malformed input error.
    pub fn malformed(message: impl Into<String>) -> Self {
        CodecError::MalformedInput(message.into())
    }

    pub(crate) fn out_of_range(field: impl Into<String>, value: impl ToString, min: i64, max: i64) -> Self {
        CodecError::ValueOutOfRange {
            field: field.into(),
            value: value.to_string(),
            min,
            max,
        }
    }
}

/// Failure decoding the data bytes of an identified command.
///
/// Never returned from [`crate::DownlinkCodec::decode`]; it is attached to the
/// decoded frame as an `Error` field instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FieldError {
    /// Fewer data bytes than the schema needs.
    #[error("needed {needed} bytes, has {available}")]
    Truncated {
        /// Bytes required.
        needed: usize,
        /// Bytes left.
        available: usize,
    },

    /// Text data contains bytes above 0x7F.
    #[error("text contains non-ASCII bytes")]
    NotAscii,

    /// Schema declares a width the wire rules do not cover.
    #[error("unsupported field width: {0} bytes")]
    UnsupportedWidth(usize),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CodecError::ChecksumMismatch {
            expected: 0xBC,
            actual: 0x00,
        };
        assert_eq!(err.to_string(), "checksum mismatch: expected 0xBC, found 0x00");

        let err = CodecError::LengthMismatch {
            declared: 5,
            actual: 3,
        };
        assert!(err.to_string().contains("header says 5 bytes"));
        assert!(err.to_string().contains("found 3"));
    }

    #[test]
    fn test_field_error_display() {
        let err = FieldError::Truncated {
            needed: 4,
            available: 1,
        };
        assert_eq!(err.to_string(), "needed 4 bytes, has 1");
    }
}
