//! Command schemas.
//!
//! A [`CommandSchema`] describes how one command's data bytes are laid out.
//! The layout itself is a [`FieldKind`]; encoder and decoder both match on it
//! exhaustively, so a new kind has to be handled on both sides.

use crate::types::CommandKey;
use serde::Serialize;

/// Labelled option of a selectable enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct SelectOption {
    /// Raw code written to the wire.
    pub code: u8,
    /// Display label.
    pub label: &'static str,
}

/// Labelled bit of a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct BitOption {
    /// Bit position.
    pub bit: u8,
    /// Display label.
    pub label: &'static str,
}

/// Interpretation of a composite part.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum PartKind {
    /// Unsigned integer.
    Number,
    /// Unsigned seconds since the epoch.
    Timestamp,
}

/// One sub-field of a composite record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Part {
    /// Key in [`crate::FieldValue::Record`].
    pub id: &'static str,
    /// Display label.
    pub label: &'static str,
    /// Width in bytes (1, 2 or 4).
    pub len: usize,
    /// Interpretation.
    pub kind: PartKind,
}

impl Part {
    /// Unsigned number part.
    pub const fn number(id: &'static str, label: &'static str, len: usize) -> Self {
        Part {
            id,
            label,
            len,
            kind: PartKind::Number,
        }
    }

    /// Four-byte timestamp part.
    pub const fn timestamp(id: &'static str, label: &'static str) -> Self {
        Part {
            id,
            label,
            len: 4,
            kind: PartKind::Timestamp,
        }
    }
}

/// Wire layout of a command's data bytes.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "kebab-case")]
pub enum FieldKind {
    /// Constant byte (or nothing when `len` is 0), whatever the caller passes.
    Fixed { value: u8, len: usize },
    /// Constant byte string.
    FixedHex { bytes: &'static [u8] },
    /// One caller-chosen code byte.
    Select { options: &'static [SelectOption] },
    /// `round(value * scale)` as a signed little-endian integer.
    Scaled { scale: f64, len: usize },
    /// Signed little-endian integer (1-byte values read back unsigned).
    Number { len: usize, unit: Option<&'static str> },
    /// Unsigned little-endian bit set.
    Bitmask {
        len: usize,
        options: &'static [BitOption],
    },
    /// Concatenated unsigned parts.
    Composite { parts: &'static [Part] },
    /// Fixed 10-byte schedule record.
    Schedule,
    /// One byte per character, no terminator. `len` is the nominal size.
    Ascii { len: usize },
    /// Four-byte unsigned epoch seconds.
    Timestamp,
}

impl FieldKind {
    /// Short name used in errors and listings.
    pub fn tag(&self) -> &'static str {
        match self {
            FieldKind::Fixed { .. } => "fixed",
            FieldKind::FixedHex { .. } => "fixed-hex",
            FieldKind::Select { .. } => "select",
            FieldKind::Scaled { .. } => "scaled",
            FieldKind::Number { .. } => "number",
            FieldKind::Bitmask { .. } => "bitmask",
            FieldKind::Composite { .. } => "composite",
            FieldKind::Schedule => "schedule",
            FieldKind::Ascii { .. } => "ascii",
            FieldKind::Timestamp => "timestamp",
        }
    }

    /// Declared data length in bytes.
    pub fn len(&self) -> usize {
        match self {
            FieldKind::Fixed { len, .. } => *len,
            FieldKind::FixedHex { bytes } => bytes.len(),
            FieldKind::Select { .. } => 1,
            FieldKind::Scaled { len, .. } => *len,
            FieldKind::Number { len, .. } => *len,
            FieldKind::Bitmask { len, .. } => *len,
            FieldKind::Composite { parts } => parts.iter().map(|p| p.len).sum(),
            FieldKind::Schedule => crate::Schedule::WIRE_LEN,
            FieldKind::Ascii { len } => *len,
            FieldKind::Timestamp => 4,
        }
    }

    /// Whether the kind carries no data bytes.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Description of one command.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CommandSchema {
    /// Display name.
    pub name: &'static str,
    /// Command id byte.
    pub command_id: u8,
    /// Device-config sub-type.
    pub sub_type: Option<u8>,
    /// Data layout.
    pub kind: FieldKind,
    /// Upper bound for caller-side input validation; not enforced here.
    pub max: Option<f64>,
    /// Help text.
    pub description: Option<&'static str>,
}

impl CommandSchema {
    /// Create a schema without sub-type, bound or description.
    pub fn new(name: &'static str, command_id: u8, kind: FieldKind) -> Self {
        CommandSchema {
            name,
            command_id,
            sub_type: None,
            kind,
            max: None,
            description: None,
        }
    }

    /// Set the device-config sub-type.
    pub fn sub_type(mut self, sub_type: u8) -> Self {
        self.sub_type = Some(sub_type);
        self
    }

    /// Set the input upper bound.
    pub fn max(mut self, max: f64) -> Self {
        self.max = Some(max);
        self
    }

    /// Set the help text.
    pub fn describe(mut self, description: &'static str) -> Self {
        self.description = Some(description);
        self
    }

    /// Registry key of this command.
    pub fn key(&self) -> CommandKey {
        CommandKey {
            sub_type: self.sub_type,
            command_id: self.command_id,
        }
    }
}
