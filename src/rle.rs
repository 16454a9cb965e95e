//! Run-length encoding, repeat-marker form.
//!
//! Every input byte is copied to the output verbatim. Whenever two equal
//! bytes appear back to back, a count byte follows them giving how many
//! *additional* repetitions (0–255) were consumed from the input. The scheme
//! never expands a stream by more than one count byte per run and costs one
//! byte on every two-byte run, which is the classic trade of this family.
//!
//! A maximum-length run deliberately forgets its final byte, so a
//! continuation is re-encoded from scratch rather than silently extended.

use std::io::{Read, Write};

use crate::bitio::next_byte;
use crate::error::Result;

/// Compresses `input` into `output`.
pub fn encode<R: Read, W: Write>(mut input: R, mut output: W) -> Result<()> {
    let mut pending: Option<u8> = None;
    let mut prev: Option<u8> = None;

    loop {
        let current = match pending.take() {
            Some(byte) => byte,
            None => match next_byte(&mut input)? {
                Some(byte) => byte,
                None => break,
            },
        };
        output.write_all(&[current])?;

        if prev == Some(current) {
            // Two equal bytes are on the wire; count further repetitions.
            let mut count: u8 = 0;
            let mut breaker: Option<u8> = None;
            while count < u8::MAX {
                match next_byte(&mut input)? {
                    Some(byte) if byte == current => count += 1,
                    other => {
                        breaker = other;
                        break;
                    }
                }
            }
            output.write_all(&[count])?;

            // The breaker (if any) starts fresh; after a maximum-length run
            // the next byte must not be treated as a continuation.
            pending = breaker;
            prev = None;
        } else {
            prev = Some(current);
        }
    }
    Ok(())
}

/// Expands `input` into `output`.
pub fn decode<R: Read, W: Write>(mut input: R, mut output: W) -> Result<()> {
    let mut prev: Option<u8> = None;

    while let Some(current) = next_byte(&mut input)? {
        output.write_all(&[current])?;

        if prev == Some(current) {
            match next_byte(&mut input)? {
                Some(count) => {
                    for _ in 0..count {
                        output.write_all(&[current])?;
                    }
                }
                None => {
                    log::warn!("run is missing its count byte");
                    break;
                }
            }
            prev = None;
        } else {
            prev = Some(current);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(data: &[u8]) -> Vec<u8> {
        let mut encoded = Vec::new();
        encode(data, &mut encoded).unwrap();
        let mut decoded = Vec::new();
        decode(&encoded[..], &mut decoded).unwrap();
        assert_eq!(decoded, data);
        encoded
    }

    #[test]
    fn test_empty_input() {
        assert!(roundtrip(&[]).is_empty());
    }

    #[test]
    fn test_run_of_300_zeros() {
        let data = vec![0u8; 300];
        let encoded = roundtrip(&data);
        // First pair plus 255 extra covers 257 bytes; the 43-byte tail is a
        // pair plus 41 extra.
        assert_eq!(encoded, vec![0x00, 0x00, 0xFF, 0x00, 0x00, 0x29]);
    }

    #[test]
    fn test_alternating_bytes_pass_through() {
        let data = [0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x55];
        let encoded = roundtrip(&data);
        assert_eq!(encoded, data);
    }

    #[test]
    fn test_two_byte_run_costs_a_zero_count() {
        let encoded = roundtrip(&[0x41, 0x41, 0x42]);
        assert_eq!(encoded, vec![0x41, 0x41, 0x00, 0x42]);
    }

    #[test]
    fn test_truncated_run_decodes_prefix() {
        // A pair with no count byte: the pair itself is still recovered.
        let mut decoded = Vec::new();
        decode(&[0x07u8, 0x07][..], &mut decoded).unwrap();
        assert_eq!(decoded, vec![0x07, 0x07]);
    }
}
