//! LoRaWAN MAC Command Codec
//!
//! Encodes and decodes the LoRaWAN 1.0.4 MAC commands listed in [`table`].
//! Direction is not carried in the bytes, so every call takes a
//! [`Direction`]; it selects both the payload length and the meaning of the
//! fields.
//!
//! # Example
//!
//! ```
//! use lorawan_mac::{decode, encode, Direction, MacParams};
//!
//! let params = MacParams::new()
//!     .with("data_rate", 5)
//!     .with("tx_power", 3)
//!     .with("channel_mask", 0x0003)
//!     .with("channel_mask_control", 0)
//!     .with("nb_trans", 1);
//! let hex = encode(0x03, Direction::Downlink, &params).unwrap();
//! assert_eq!(hex, "0353030001");
//!
//! let result = decode(&hex, Direction::Downlink);
//! assert_eq!(result.records[0].name, "LinkADRReq");
//! ```

pub mod codec;
pub mod command;
pub mod error;
pub mod table;
pub mod types;

pub use codec::{decode, decode_bytes, encode, encode_commands, MacDecodeResult, MacRecord};
pub use command::{MacCommand, MAX_FREQUENCY_HZ};
pub use error::MacError;
pub use table::{lookup, MacCommandDef, MAC_COMMANDS};
pub use types::{Direction, MacParams};

/// Result type for MAC codec operations.
pub type Result<T> = std::result::Result<T, MacError>;
