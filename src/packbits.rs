//! Run-length encoding, PackBits-style.
//!
//! The output is a sequence of blocks, each introduced by a signed count
//! byte. A count `n` in `0..=127` announces a copy block of `n + 1` literal
//! bytes; a count in `-128..=-1` announces a run block of one byte repeated
//! `MIN_RUN - 1 - n` times. Runs shorter than [`MIN_RUN`] are never encoded,
//! so literals cost at most one header byte per 128 and a worst-case stream
//! expands by under 1%.

use std::io::{Read, Write};

use crate::bitio::next_byte;
use crate::error::Result;

/// Shortest run worth a run block.
pub const MIN_RUN: usize = 3;

/// Longest run a single run block can carry.
pub const MAX_RUN: usize = 128 + MIN_RUN - 1;

/// Most literal bytes a single copy block can carry.
pub const MAX_COPY: usize = 128;

/// Most bytes buffered before a copy block must be written.
const MAX_READ: usize = MAX_COPY + MIN_RUN - 1;

/// Compresses `input` into `output`.
pub fn encode<R: Read, W: Write>(mut input: R, mut output: W) -> Result<()> {
    let mut buf = [0u8; MAX_READ];
    let mut count = 0usize;

    while let Some(current) = next_byte(&mut input)? {
        buf[count] = current;
        count += 1;

        if count >= MIN_RUN {
            // Check whether the last MIN_RUN buffered bytes are one run.
            let mut run = true;
            for i in 2..=MIN_RUN {
                if buf[count - i] != current {
                    run = false;
                    break;
                }
            }

            if run {
                if count > MIN_RUN {
                    // Flush the literals sitting in front of the run.
                    output.write_all(&[(count - MIN_RUN - 1) as u8])?;
                    output.write_all(&buf[..count - MIN_RUN])?;
                }

                // Extend the run as far as the input allows.
                let mut run_len = MIN_RUN;
                let mut breaker: Option<u8> = None;
                loop {
                    match next_byte(&mut input)? {
                        Some(byte) if byte == current => {
                            run_len += 1;
                            if run_len == MAX_RUN {
                                break;
                            }
                        }
                        other => {
                            breaker = other;
                            break;
                        }
                    }
                }

                let header = (MIN_RUN as i32 - 1 - run_len as i32) as i8;
                output.write_all(&[header as u8, current])?;

                match breaker {
                    Some(byte) if run_len != MAX_RUN => {
                        // The run breaker opens the next buffer.
                        buf[0] = byte;
                        count = 1;
                    }
                    _ => count = 0,
                }
            }
        }

        if count == MAX_READ {
            output.write_all(&[(MAX_COPY - 1) as u8])?;
            output.write_all(&buf[..MAX_COPY])?;

            // Slide the excess to the front of the buffer.
            buf.copy_within(MAX_COPY..MAX_READ, 0);
            count = MAX_READ - MAX_COPY;
        }
    }

    if count > 0 {
        if count <= MAX_COPY {
            output.write_all(&[(count - 1) as u8])?;
            output.write_all(&buf[..count])?;
        } else {
            output.write_all(&[(MAX_COPY - 1) as u8])?;
            output.write_all(&buf[..MAX_COPY])?;

            output.write_all(&[(count - MAX_COPY - 1) as u8])?;
            output.write_all(&buf[MAX_COPY..count])?;
        }
    }
    Ok(())
}

/// Expands `input` into `output`.
pub fn decode<R: Read, W: Write>(mut input: R, mut output: W) -> Result<()> {
    while let Some(header) = next_byte(&mut input)? {
        let header = header as i8; // sign extension decides the block kind

        if header < 0 {
            let reps = MIN_RUN as i32 - 1 - i32::from(header);
            match next_byte(&mut input)? {
                Some(byte) => {
                    for _ in 0..reps {
                        output.write_all(&[byte])?;
                    }
                }
                None => log::warn!("run block is too short"),
            }
        } else {
            for _ in 0..=header {
                match next_byte(&mut input)? {
                    Some(byte) => output.write_all(&[byte])?,
                    None => {
                        log::warn!("copy block is too short");
                        break;
                    }
                }
            }
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
        // Two full 130-byte run blocks, then one 40-byte run block.
        assert_eq!(encoded, vec![0x80, 0x00, 0x80, 0x00, 0xDA, 0x00]);
    }

    #[test]
    fn test_literals_form_copy_blocks() {
        let data: Vec<u8> = (0u8..=255).collect();
        let encoded = roundtrip(&data);
        assert_eq!(encoded[0], 127); // first copy block carries 128 literals
        assert_eq!(encoded.len(), 256 + 2);
    }

    #[test]
    fn test_short_runs_stay_literal() {
        // Runs of two never pay for a run block.
        let encoded = roundtrip(&[0x41, 0x41, 0x42, 0x42]);
        assert_eq!(encoded, vec![0x03, 0x41, 0x41, 0x42, 0x42]);
    }

    #[test]
    fn test_run_after_literals() {
        let encoded = roundtrip(&[0x01, 0x02, 0x07, 0x07, 0x07, 0x07]);
        assert_eq!(encoded, vec![0x01, 0x01, 0x02, 0xFE, 0x07]);
    }

    #[test]
    fn test_max_run_then_more() {
        let mut data = vec![0x11u8; MAX_RUN];
        data.push(0x11); // one byte past the longest run block
        let encoded = roundtrip(&data);
        assert_eq!(encoded, vec![0x80, 0x11, 0x00, 0x11]);
    }

    #[test]
    fn test_truncated_copy_block_decodes_prefix() {
        // Header promises four literals, stream carries two.
        let mut decoded = Vec::new();
        decode(&[0x03u8, 0x0A, 0x0B][..], &mut decoded).unwrap();
        assert_eq!(decoded, vec![0x0A, 0x0B]);
    }
}
