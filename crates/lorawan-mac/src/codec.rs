//! Hex-level encode and the linear decode scan.

use crate::command::MacCommand;
use crate::table::{lookup, CID_PROPRIETARY_MIN, PROPRIETARY_NAME};
use crate::types::{Direction, MacParams};
use crate::{MacError, Result};
use serde::{Serialize, Serializer};
use tracing::{debug, trace};

/// One decoded command.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacRecord {
    /// Command identifier.
    pub cid: u8,
    /// Full command name, or `Proprietary/Unknown`.
    pub name: &'static str,
    /// Payload bytes consumed after the CID.
    pub len: usize,
    /// Typed command; `None` for proprietary records.
    pub command: Option<MacCommand>,
    /// Fields as `(name, display value)` pairs.
    pub params: Vec<(&'static str, String)>,
    /// Bytes of this record, CID included.
    #[serde(serialize_with = "serialize_hex")]
    pub raw: Vec<u8>,
}

/// Records parsed before the scan finished or stopped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MacDecodeResult {
    /// Records in input order.
    pub records: Vec<MacRecord>,
    /// Why the scan stopped early.
    #[serde(serialize_with = "serialize_error")]
    pub error: Option<MacError>,
}

impl MacDecodeResult {
    fn failed(error: MacError) -> Self {
        MacDecodeResult {
            records: Vec::new(),
            error: Some(error),
        }
    }

    /// Whether every byte was consumed without error.
    pub fn is_complete(&self) -> bool {
        self.error.is_none()
    }
}

fn serialize_hex<S: Serializer>(bytes: &[u8], serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_str(&hex::encode_upper(bytes))
}

fn serialize_error<S: Serializer>(
    error: &Option<MacError>,
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    match error {
        Some(e) => serializer.serialize_some(&e.to_string()),
        None => serializer.serialize_none(),
    }
}

/// Build one command from named parameters and return it as hex.
pub fn encode(cid: u8, direction: Direction, params: &MacParams) -> Result<String> {
    let command = MacCommand::from_params(cid, direction, params)?;
    encode_commands(&[command], direction)
}

/// Concatenate commands travelling in one direction and return them as hex.
pub fn encode_commands(commands: &[MacCommand], direction: Direction) -> Result<String> {
    let mut bytes = Vec::new();
    for command in commands {
        if command.direction() != direction {
            return Err(MacError::UnsupportedDirection {
                name: command.name(),
                direction,
            });
        }
        bytes.extend(command.encode()?);
    }
    debug!(count = commands.len(), len = bytes.len(), %direction, "encoded MAC commands");
    Ok(hex::encode_upper(bytes))
}

/// Decode a hex string. Whitespace is ignored.
pub fn decode(input: &str, direction: Direction) -> MacDecodeResult {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();
    if cleaned.is_empty() {
        return MacDecodeResult::failed(MacError::malformed("empty input"));
    }
    match hex::decode(&cleaned) {
        Ok(bytes) => decode_bytes(&bytes, direction),
        Err(e) => MacDecodeResult::failed(MacError::malformed(e.to_string())),
    }
}

/// Scan concatenated commands.
///
/// Stops at the first unknown CID below 0x80, at a truncated command, or
/// after a proprietary command (its length cannot be known). Records parsed
/// before the stop are kept.
pub fn decode_bytes(bytes: &[u8], direction: Direction) -> MacDecodeResult {
    if bytes.is_empty() {
        return MacDecodeResult::failed(MacError::malformed("empty input"));
    }

    let mut records = Vec::new();
    let mut error = None;
    let mut offset = 0;

    while offset < bytes.len() {
        let cid = bytes[offset];
        let rest = &bytes[offset + 1..];

        let Some(def) = lookup(cid) else {
            if cid >= CID_PROPRIETARY_MIN {
                trace!(cid, len = rest.len(), "proprietary command ends scan");
                records.push(MacRecord {
                    cid,
                    name: PROPRIETARY_NAME,
                    len: rest.len(),
                    command: None,
                    params: Vec::new(),
                    raw: bytes[offset..].to_vec(),
                });
            } else {
                error = Some(MacError::UnknownCommandId { cid, offset });
            }
            break;
        };

        let len = def.payload_len(direction);
        let command = match MacCommand::decode(cid, direction, rest) {
            Ok(command) => command,
            Err(e) => {
                error = Some(e);
                break;
            }
        };
        trace!(cid, name = command.name(), len, offset, "MAC command");

        records.push(MacRecord {
            cid,
            name: command.name(),
            len,
            params: command.params(),
            command: Some(command),
            raw: bytes[offset..offset + 1 + len].to_vec(),
        });
        offset += 1 + len;
    }

    debug!(records = records.len(), stopped = error.is_some(), %direction, "decoded MAC commands");
    MacDecodeResult { records, error }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input() {
        let result = decode("  ", Direction::Uplink);
        assert_eq!(result.error, Some(MacError::malformed("empty input")));
        assert!(result.records.is_empty());
    }

    #[test]
    fn test_bad_hex() {
        let result = decode("0G", Direction::Uplink);
        assert!(matches!(result.error, Some(MacError::MalformedInput(_))));
    }

    #[test]
    fn test_unknown_cid_keeps_earlier_records() {
        // LinkCheckReq, DeviceTimeReq, then 0x0B
        let result = decode("020D0B", Direction::Uplink);
        assert_eq!(result.records.len(), 2);
        assert_eq!(result.records[0].name, "LinkCheckReq");
        assert_eq!(result.records[1].name, "DeviceTimeReq");
        assert_eq!(result.error, Some(MacError::UnknownCommandId { cid: 0x0B, offset: 2 }));
    }

    #[test]
    fn test_proprietary_takes_rest() {
        let result = decode("06FF1F80AABB", Direction::Uplink);
        assert!(result.is_complete());
        assert_eq!(result.records.len(), 2);
        let prop = &result.records[1];
        assert_eq!(prop.name, "Proprietary/Unknown");
        assert_eq!(prop.raw, vec![0x80, 0xAA, 0xBB]);
        assert_eq!(prop.len, 2);
        assert_eq!(prop.command, None);
    }

    #[test]
    fn test_direction_mismatch() {
        let err = encode_commands(&[MacCommand::DevStatusReq], Direction::Uplink).unwrap_err();
        assert_eq!(
            err,
            MacError::UnsupportedDirection {
                name: "DevStatusReq",
                direction: Direction::Uplink,
            }
        );
        assert_eq!(err.to_string(), "DevStatusReq is not sent uplink");
    }

    #[test]
    fn test_encode_unknown_cid() {
        assert_eq!(
            encode(0x0B, Direction::Downlink, &MacParams::new()),
            Err(MacError::UnknownCommandId { cid: 0x0B, offset: 0 })
        );
    }
}
