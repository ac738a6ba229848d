//! Variable-width integers as used by the Topaz block container.
//!
//! Big-endian 7-bit groups. A clear high bit terminates the sequence;
//! the terminating byte still contributes its low 7 bits. At most four
//! bytes are ever consumed, so a missing terminator on malformed input
//! cannot run away.

/// Format ceiling: no encoded value spans more than four bytes.
pub const MAX_VWI_BYTES: usize = 4;

/// Decode a variable-width integer from the front of `bytes`.
///
/// Returns the value and the number of bytes consumed. If no
/// terminator appears within the four-byte ceiling, returns whatever
/// accumulated so far rather than erroring.
pub fn decode_vwi(bytes: &[u8]) -> (u32, usize) {
    let mut value: u32 = 0;
    let mut pos = 0;
    while pos < bytes.len() && pos < MAX_VWI_BYTES {
        let b = bytes[pos];
        pos += 1;
        value = (value << 7) | (b & 0x7F) as u32;
        if b & 0x80 == 0 {
            break;
        }
    }
    (value, pos)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn encode_vwi(mut value: u32) -> Vec<u8> {
        let mut out = vec![(value & 0x7F) as u8];
        value >>= 7;
        while value != 0 {
            out.push((value & 0x7F) as u8 | 0x80);
            value >>= 7;
        }
        out.reverse();
        out
    }

    #[test]
    fn test_single_byte_values() {
        assert_eq!(decode_vwi(&[0x00]), (0, 1));
        assert_eq!(decode_vwi(&[0x7F]), (127, 1));
        // Trailing bytes are not consumed.
        assert_eq!(decode_vwi(&[0x05, 0xFF, 0xFF]), (5, 1));
    }

    #[test]
    fn test_multi_byte_values() {
        assert_eq!(decode_vwi(&[0x81, 0x00]), (128, 2));
        assert_eq!(decode_vwi(&[0xFF, 0x7F]), (0x3FFF, 2));
        assert_eq!(decode_vwi(&[0xFF, 0xFF, 0xFF, 0x7F]), (0x0FFF_FFFF, 4));
    }

    #[test]
    fn test_missing_terminator_stops_at_ceiling() {
        // High bit set on every byte: decoding stops after four bytes
        // with whatever accumulated.
        let (value, consumed) = decode_vwi(&[0x80, 0x80, 0x80, 0x80, 0x01]);
        assert_eq!(consumed, MAX_VWI_BYTES);
        assert_eq!(value, 0);
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(decode_vwi(&[]), (0, 0));
    }

    proptest! {
        #[test]
        fn prop_round_trip(value in 0u32..=0x0FFF_FFFF) {
            let encoded = encode_vwi(value);
            prop_assert!(encoded.len() <= MAX_VWI_BYTES);
            let (decoded, consumed) = decode_vwi(&encoded);
            prop_assert_eq!(decoded, value);
            prop_assert_eq!(consumed, encoded.len());
        }
    }
}
