//! CRC-8 over the frame payload.
//!
//! Polynomial 0x07, initial value 0xFF, no reflection, no final XOR. The
//! header is not covered; only the bytes between the length field and the
//! checksum itself.

use crc::{Algorithm, Crc};

/// CRC parameters used by the downlink frame.
pub const CRC_8_DOWNLINK: Algorithm<u8> = Algorithm {
    width: 8,
    poly: 0x07,
    init: 0xff,
    refin: false,
    refout: false,
    xorout: 0x00,
    check: 0xfb,
    residue: 0x00,
};

const CRC: Crc<u8> = Crc::<u8>::new(&CRC_8_DOWNLINK);

/// Compute the checksum byte for a payload.
pub fn checksum(bytes: &[u8]) -> u8 {
    CRC.checksum(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Bitwise reference of the same algorithm.
    fn reference(bytes: &[u8]) -> u8 {
        let mut crc: u8 = 0xFF;
        for &b in bytes {
            crc ^= b;
            for _ in 0..8 {
                crc = if crc & 0x80 != 0 {
                    (crc << 1) ^ 0x07
                } else {
                    crc << 1
                };
            }
        }
        crc
    }

    #[test]
    fn test_empty_is_init() {
        assert_eq!(checksum(&[]), 0xFF);
    }

    #[test]
    fn test_check_value() {
        assert_eq!(checksum(b"123456789"), 0xFB);
    }

    #[test]
    fn test_matches_bitwise_reference() {
        let samples: [&[u8]; 4] = [
            &[0x02, 0x01, 0x02, 0x00],
            &[0x50, 0x00, 0x05, 0x05, 0x39, 0x30, 0x00, 0x00],
            &[0xFF; 16],
            &[0x00],
        ];
        for sample in samples {
            assert_eq!(checksum(sample), reference(sample), "sample {:02X?}", sample);
        }
        assert_eq!(checksum(&[0x02, 0x01, 0x02, 0x00]), 0xBC);
    }

    #[test]
    fn test_deterministic() {
        let data = [0x61, 0x01, 0x05, 0x01, 0x00, 0x00, 0x00];
        assert_eq!(checksum(&data), checksum(&data));
    }
}
