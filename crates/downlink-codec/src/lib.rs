//! # downlink-codec
//!
//! Encoder and decoder for the vendor downlink frames of a LoRa-connected I/O
//! device family.
//!
//! A frame addresses one command of one function type (digital/analog I/O,
//! sensor, device configuration, RS-485). The command's data layout comes
//! from a [`Registry`] of [`CommandSchema`]s, and the payload is protected by
//! a CRC-8 (see [`checksum`]).
//!
//! ## Example
//!
//! ```
//! use downlink_codec::{CommandKey, DownlinkCodec, DownlinkRequest, FunctionType, Target};
//!
//! let codec = DownlinkCodec::standard();
//! let frame = codec
//!     .encode(
//!         &DownlinkRequest::new(FunctionType::DigitalInput, CommandKey::new(2))
//!             .target(Target::Channel { channel: 2 })
//!             .sequence(5),
//!     )
//!     .unwrap();
//! assert_eq!(frame.hex, "80050402010200BC");
//!
//! let decoded = codec.decode(&frame.hex).unwrap();
//! assert_eq!(decoded.command_name, "Clear Overflow");
//! ```

pub mod checksum;
pub mod codec;
pub mod constants;
pub mod decode;
pub mod encode;
pub mod error;
pub mod hexstr;
pub mod registry;
pub mod schema;
pub mod types;

pub use checksum::checksum;
pub use codec::DownlinkCodec;
pub use decode::{DecodedField, DecodedFrame, FrameHeader};
pub use encode::{DownlinkRequest, EncodedFrame, FrameBreakdown};
pub use error::{CodecError, FieldError};
pub use hexstr::{parse_hex, spaced, to_hex};
pub use registry::Registry;
pub use schema::{BitOption, CommandSchema, FieldKind, Part, PartKind, SelectOption};
pub use types::{Axes, CommandKey, Family, FieldValue, FunctionType, Schedule, SchemaKey, Target};

/// Result type for codec operations.
pub type Result<T> = std::result::Result<T, CodecError>;
