//! MAC codec error types.

use crate::types::Direction;
use thiserror::Error;

/// Errors that can occur when encoding or decoding MAC commands.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MacError {
    /// Input is empty or not valid hex.
    #[error("malformed input: {0}")]
    MalformedInput(String),

    /// Identifier below 0x80 that the table does not know.
    #[error("unknown CID 0x{cid:02X} at byte {offset}")]
    UnknownCommandId {
        /// Command identifier.
        cid: u8,
        /// Position of the identifier in the input.
        offset: usize,
    },

    /// Fewer bytes left than the command needs in this direction.
    #[error("truncated payload for {name}: needed {needed}, has {available}")]
    TruncatedPayload {
        /// Command name from the table.
        name: &'static str,
        /// Payload bytes the command needs.
        needed: usize,
        /// Payload bytes left.
        available: usize,
    },

    /// Command cannot travel in the requested direction.
    #[error("{name} is not sent {direction}")]
    UnsupportedDirection {
        /// Command name.
        name: &'static str,
        /// Requested direction.
        direction: Direction,
    },

    /// A required parameter was not supplied.
    #[error("missing parameter: {0}")]
    MissingParameter(String),

    /// A parameter does not fit its bit field.
    #[error("{name} out of range: {value} (allowed {min}..={max})")]
    ParameterOutOfRange {
        /// Parameter name.
        name: String,
        /// Supplied value.
        value: i64,
        /// Smallest accepted value.
        min: i64,
        /// Largest accepted value.
        max: i64,
    },
}

impl MacError {
    /// Create a malformed input error.
    pub fn malformed(message: impl Into<String>) -> Self {
        MacError::MalformedInput(message.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_truncated_display() {
        let err = MacError::TruncatedPayload {
            name: "RXParamSetup",
            needed: 4,
            available: 0,
        };
        assert_eq!(err.to_string(), "truncated payload for RXParamSetup: needed 4, has 0");
    }

    #[test]
    fn test_unknown_cid_display() {
        let err = MacError::UnknownCommandId { cid: 0x0B, offset: 3 };
        assert_eq!(err.to_string(), "unknown CID 0x0B at byte 3");
    }
}
