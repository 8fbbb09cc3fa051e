//! Hex string helpers.
//!
//! Hex is the only representation exchanged with callers: input may contain
//! whitespace and either case, output is uppercase without separators.

use crate::CodecError;

/// Parse a hex string, ignoring whitespace.
pub fn parse_hex(input: &str) -> Result<Vec<u8>, CodecError> {
    let cleaned: String = input.chars().filter(|c| !c.is_whitespace()).collect();

    if cleaned.is_empty() {
        return Err(CodecError::malformed("empty hex string"));
    }
    if let Some(bad) = cleaned.chars().find(|c| !c.is_ascii_hexdigit()) {
        return Err(CodecError::malformed(format!("invalid hex character '{}'", bad)));
    }
    if cleaned.len() % 2 != 0 {
        return Err(CodecError::malformed(format!(
            "odd number of hex characters ({})",
            cleaned.len()
        )));
    }

    hex::decode(&cleaned).map_err(|e| CodecError::malformed(e.to_string()))
}

/// Encode bytes as uppercase hex.
pub fn to_hex(bytes: &[u8]) -> String {
    hex::encode_upper(bytes)
}

/// Insert a space after every byte of a hex string, for display.
pub fn spaced(hex: &str) -> String {
    hex.as_bytes()
        .chunks(2)
        .map(|pair| String::from_utf8_lossy(pair).into_owned())
        .collect::<Vec<_>>()
        .join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_ignores_whitespace_and_case() {
        assert_eq!(parse_hex("80 05 0a\n").unwrap(), vec![0x80, 0x05, 0x0A]);
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(matches!(parse_hex(""), Err(CodecError::MalformedInput(_))));
        assert!(matches!(parse_hex("   "), Err(CodecError::MalformedInput(_))));
        assert!(matches!(parse_hex("80G0"), Err(CodecError::MalformedInput(_))));
        assert!(matches!(parse_hex("800"), Err(CodecError::MalformedInput(_))));
    }

    #[test]
    fn test_to_hex_uppercase() {
        assert_eq!(to_hex(&[0xab, 0x01]), "AB01");
    }

    #[test]
    fn test_spaced() {
        assert_eq!(spaced("80050A"), "80 05 0A");
        assert_eq!(spaced(""), "");
    }
}
