use data_encoding::BASE32_NOPAD;

use crate::error::{Result, SecretError};

const ALPHABET: &[u8; 32] = b"ABCDEFGHIJKLMNOPQRSTUVWXYZ234567";

/// Map an upper-cased base32 character to its 5-bit value.
fn value_of(c: char) -> Option<u8> {
    if !c.is_ascii() {
        return None;
    }
    ALPHABET.iter().position(|&a| a == c as u8).map(|i| i as u8)
}

/// Decode a base32 shared secret as typed or scanned by a user.
///
/// Whitespace is ignored anywhere, letters are accepted in either case and
/// trailing `=` padding is tolerated but not required. The 5-bit groups are
/// packed most significant bit first; leftover bits that do not fill a
/// whole byte are dropped, so `n` characters yield `5 * n / 8` bytes.
///
/// An empty (or all-whitespace) input decodes to an empty key. Rejecting
/// that is left to the generator.
pub fn decode(input: &str) -> Result<Vec<u8>> {
    let mut out = Vec::with_capacity(input.len() / 8 * 5 + 5);
    let mut buffer: u32 = 0;
    let mut bits = 0;
    let mut padded = false;

    for (position, c) in input.chars().enumerate() {
        if c.is_whitespace() {
            continue;
        }
        if c == '=' {
            padded = true;
            continue;
        }

        let v = match value_of(c.to_ascii_uppercase()) {
            // Data after padding means the string was spliced together.
            Some(v) if !padded => v,
            _ => {
                return Err(SecretError::InvalidCharacter {
                    character: c,
                    position,
                }
                .into())
            }
        };

        buffer = (buffer << 5) | v as u32;
        bits += 5;
        if bits >= 8 {
            bits -= 8;
            out.push((buffer >> bits) as u8);
            buffer &= (1 << bits) - 1;
        }
    }

    Ok(out)
}

/// Encode raw key bytes as unpadded, upper-case base32.
pub fn encode(bytes: &[u8]) -> String {
    BASE32_NOPAD.encode(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use data_encoding::BASE32;

    #[test]
    fn decode_rfc_test_secret() {
        let key = decode("GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ").unwrap();
        assert_eq!(key, b"12345678901234567890");
    }

    #[test]
    fn decode_is_case_insensitive() {
        assert_eq!(
            decode("jbswy3dpehpk3pxp").unwrap(),
            decode("JBSWY3DPEHPK3PXP").unwrap()
        );
        assert_eq!(decode("MzXw6").unwrap(), b"foo");
    }

    #[test]
    fn decode_strips_whitespace() {
        let spaced = "JBSW Y3DP\tEHPK\n3PXP ";
        assert_eq!(decode(spaced).unwrap(), decode("JBSWY3DPEHPK3PXP").unwrap());
    }

    #[test]
    fn decode_tolerates_padding() {
        assert_eq!(decode("MZXW6===").unwrap(), b"foo");
        assert_eq!(decode("MZXW6").unwrap(), b"foo");
        assert_eq!(decode("MZXW6YQ=").unwrap(), b"foob");
    }

    #[test]
    fn decode_drops_trailing_partial_byte() {
        // 1 char = 5 bits, not a full byte.
        assert_eq!(decode("M").unwrap(), Vec::<u8>::new());
        // 3 chars = 15 bits, one byte.
        assert_eq!(decode("MZX").unwrap(), vec![0x66]);
        for n in 0..=16 {
            let s: String = "A".repeat(n);
            assert_eq!(decode(&s).unwrap().len(), 5 * n / 8);
        }
    }

    #[test]
    fn decode_long_input() {
        let s = "MZXW6YTB".repeat(1000);
        let key = decode(&s).unwrap();
        assert_eq!(key.len(), 5000);
        assert_eq!(key, b"fooba".repeat(1000));
    }

    #[test]
    fn decode_empty() {
        assert_eq!(decode("").unwrap(), Vec::<u8>::new());
        assert_eq!(decode("  \n").unwrap(), Vec::<u8>::new());
    }

    #[test]
    fn decode_rejects_non_alphabet() {
        match decode("12345!!!") {
            Err(Error::InvalidSecret(SecretError::InvalidCharacter {
                character,
                position,
            })) => {
                assert_eq!(character, '1');
                assert_eq!(position, 0);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn decode_reports_position_in_original_input() {
        match decode("ab cd 8") {
            Err(Error::InvalidSecret(SecretError::InvalidCharacter {
                character,
                position,
            })) => {
                assert_eq!(character, '8');
                assert_eq!(position, 6);
            }
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn decode_rejects_data_after_padding() {
        assert!(matches!(
            decode("MZ==XW6"),
            Err(Error::InvalidSecret(SecretError::InvalidCharacter {
                character: 'X',
                position: 4
            }))
        ));
    }

    #[test]
    fn decode_matches_standard_encoder() {
        let data: Vec<u8> = (0u8..=255).map(|b| b.wrapping_mul(37) ^ 0x5a).collect();
        for len in &[5, 10, 15, 20, 40] {
            let bytes = &data[..*len];
            let padded = BASE32.encode(bytes);
            assert_eq!(decode(&padded).unwrap(), bytes);
            assert_eq!(decode(&encode(bytes)).unwrap(), bytes);
        }
    }

    #[test]
    fn value_of_alphabet() {
        assert_eq!(value_of('A'), Some(0));
        assert_eq!(value_of('7'), Some(31));
        assert_eq!(value_of('a'), None);
        assert_eq!(value_of('1'), None);
        assert_eq!(value_of('\u{e9}'), None);
    }

    #[test]
    fn encode_is_unpadded() {
        assert_eq!(encode(b"foo"), "MZXW6");
        assert_eq!(encode(b"12345678901234567890"), "GEZDGNBVGY3TQOJQGEZDGNBVGY3TQOJQ");
    }
}
