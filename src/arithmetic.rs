//! Arithmetic coding.
//!
//! An order-0 interval coder with 16-bit fixed-precision bounds. Each symbol
//! narrows the live interval `[lower, upper]` in proportion to its slice of
//! the cumulative frequency table; bits leave the window whenever the top
//! bits of both bounds agree, and midpoint straddles are deferred as
//! underflow bits resolved by the next definite bit. Keeping the total
//! frequency two bits below the precision guarantees the interval never
//! collapses.
//!
//! Two models drive the table. The *static* model counts the input up front
//! and ships the (rescaled) histogram in a header; the *adaptive* model
//! starts uniform and bumps the coded symbol after every step, encoder and
//! decoder updating in lockstep so no header is needed.

use std::io::{Read, Seek, SeekFrom, Write};

use crate::bitio::{next_byte, BitReader, BitWriter};
use crate::error::{Error, Result};

/// Index of the end-of-stream symbol.
const EOF_SYMBOL: usize = 256;

/// Symbol count: 256 byte values plus the end-of-stream symbol.
const NUM_SYMBOLS: usize = EOF_SYMBOL + 1;

/// Width of the interval bounds, in bits.
const PRECISION: u32 = 16;

/// Ceiling on the cumulative frequency total; two bits of headroom below
/// the precision keep `upper - lower >= cumulative_prob` at all times.
const MAX_PROBABILITY: u16 = 1 << (PRECISION - 2);

/// Top bit of a bound.
const MASK_TOP: u16 = 1 << (PRECISION - 1);

/// Second-from-top bit of a bound.
const MASK_SECOND: u16 = 1 << (PRECISION - 2);

/// Which symbol model drives the coder.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Model {
    /// Histogram counted up front and carried in a stream header.
    Static,
    /// Uniform start, updated after every coded symbol.
    Adaptive,
}

/// Interval-coder state: the cumulative table and the live bounds.
///
/// `ranges[s]` counts all symbols below `s`; `ranges[NUM_SYMBOLS]` is the
/// total. One spare slot keeps the decoder's symbol probe in bounds.
struct Coder {
    ranges: [u16; NUM_SYMBOLS + 2],
    cumulative_prob: u16,
    lower: u16,
    upper: u16,
    code: u16,
    underflow_bits: u32,
    adaptive: bool,
}

impl Coder {
    fn new(model: Model) -> Self {
        let mut coder = Self {
            ranges: [0; NUM_SYMBOLS + 2],
            cumulative_prob: 0,
            lower: 0,
            upper: u16::MAX,
            code: 0,
            underflow_bits: 0,
            adaptive: model == Model::Adaptive,
        };
        if coder.adaptive {
            coder.initialize_uniform();
        }
        coder
    }

    /// Every symbol equally likely with count 1, end-of-stream included.
    fn initialize_uniform(&mut self) {
        self.ranges[0] = 0;
        for i in 1..=NUM_SYMBOLS {
            self.ranges[i] = self.ranges[i - 1] + 1;
        }
        self.cumulative_prob = NUM_SYMBOLS as u16;
    }

    /// Turns per-symbol counts sitting in `ranges[1..]` into the cumulative
    /// form, seeding the end-of-stream symbol with count 1.
    fn finalize_ranges(&mut self) {
        self.ranges[0] = 0;
        self.ranges[NUM_SYMBOLS] = 1;
        self.cumulative_prob += 1;

        for i in 1..=NUM_SYMBOLS {
            self.ranges[i] += self.ranges[i - 1];
        }
    }

    /// First pass of the static model: count every byte, then rescale so the
    /// total honours the headroom bound.
    fn build_range_list<R: Read>(&mut self, input: &mut R) -> Result<()> {
        let mut counts = [0u32; 256];
        let mut total: u32 = 0;

        while let Some(byte) = next_byte(input)? {
            if total == u32::MAX {
                return Err(Error::InputTooLarge);
            }
            counts[byte as usize] += 1;
            total += 1;
        }

        if total >= u32::from(MAX_PROBABILITY) {
            // Rare symbols floor at count 1, so one division pass can leave
            // the total a hair over the bound; retry until it fits with the
            // end-of-stream symbol's extra count.
            let mut rescale = total / u32::from(MAX_PROBABILITY) + 1;
            loop {
                let mut scaled = counts;
                for count in &mut scaled {
                    if *count > rescale {
                        *count /= rescale;
                    } else if *count != 0 {
                        *count = 1;
                    }
                }
                if scaled.iter().sum::<u32>() < u32::from(MAX_PROBABILITY) {
                    counts = scaled;
                    break;
                }
                rescale += 1;
            }
        }

        self.ranges[0] = 0;
        self.cumulative_prob = 0;
        for (symbol, &count) in counts.iter().enumerate() {
            self.ranges[symbol + 1] = count as u16;
            self.cumulative_prob += count as u16;
        }
        self.finalize_ranges();
        Ok(())
    }

    /// Writes the static model: `(symbol, 14-bit count)` for every byte value
    /// present, terminated by a zero record.
    fn write_header<W: Write>(&self, writer: &mut BitWriter<W>) -> Result<()> {
        let mut previous: u16 = 0;
        for symbol in 0..EOF_SYMBOL {
            if self.ranges[symbol + 1] > previous {
                let count = self.ranges[symbol + 1] - previous;
                writer.write_byte(symbol as u8)?;
                writer.write_int(u32::from(count), PRECISION - 2)?;
                previous = self.ranges[symbol + 1];
            }
        }

        writer.write_byte(0)?;
        writer.write_int(0, PRECISION - 2)?;
        Ok(())
    }

    /// Restores the static model from the header. Terminates on the zero
    /// count record, after both of its fields have been read.
    fn read_header<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        self.cumulative_prob = 0;
        self.ranges = [0; NUM_SYMBOLS + 2];

        loop {
            let symbol = reader.read_byte()?.ok_or(Error::MalformedHeader)?;
            let count = reader.read_int(PRECISION - 2)? as u16;
            if count == 0 {
                if symbol != 0 {
                    return Err(Error::MalformedHeader);
                }
                break;
            }

            // No valid encoder emits a model past the headroom bound.
            let sum = u32::from(self.cumulative_prob) + u32::from(count);
            if sum >= u32::from(MAX_PROBABILITY) {
                return Err(Error::MalformedHeader);
            }
            self.ranges[symbol as usize + 1] = count;
            self.cumulative_prob = sum as u16;
        }
        self.finalize_ranges();
        Ok(())
    }

    /// Narrows the interval to `symbol`'s slice of the cumulative table,
    /// then (adaptive model only) bumps the symbol's frequency.
    ///
    /// The bound updates truncate to 16 bits on purpose: a slice reaching the
    /// very top of the range wraps to exactly `upper`.
    fn apply_symbol_range(&mut self, symbol: usize) {
        let range = u32::from(self.upper - self.lower) + 1;

        let rescaled = u32::from(self.ranges[symbol + 1]) * range / u32::from(self.cumulative_prob);
        self.upper = self.lower.wrapping_add(rescaled as u16).wrapping_sub(1);

        let rescaled = u32::from(self.ranges[symbol]) * range / u32::from(self.cumulative_prob);
        self.lower = self.lower.wrapping_add(rescaled as u16);

        if self.adaptive {
            self.update_model(symbol);
        }
    }

    /// Adds one occurrence of `symbol`; once the total hits the headroom
    /// bound, halves every per-symbol delta (flooring at 1 so every symbol
    /// stays reachable) and rebuilds the cumulative table in place.
    fn update_model(&mut self, symbol: usize) {
        self.cumulative_prob += 1;
        for i in (symbol + 1)..=NUM_SYMBOLS {
            self.ranges[i] += 1;
        }

        if self.cumulative_prob >= MAX_PROBABILITY {
            self.cumulative_prob = 0;
            let mut original = 0u16;

            for i in 1..=NUM_SYMBOLS {
                let delta = self.ranges[i] - original;
                original = self.ranges[i];

                self.ranges[i] = if delta <= 2 {
                    self.ranges[i - 1] + 1
                } else {
                    self.ranges[i - 1] + delta / 2
                };
                self.cumulative_prob += self.ranges[i] - self.ranges[i - 1];
            }
        }
    }

    /// Emits every bit the narrowed interval has settled: matching top bits
    /// leave directly (with any deferred underflow bits as their
    /// complement), midpoint straddles defer one more bit.
    fn write_encoded_bits<W: Write>(&mut self, writer: &mut BitWriter<W>) -> Result<()> {
        loop {
            if (self.upper & MASK_TOP) == (self.lower & MASK_TOP) {
                writer.write_bit(u8::from(self.upper & MASK_TOP != 0))?;

                while self.underflow_bits > 0 {
                    writer.write_bit(u8::from(self.upper & MASK_TOP == 0))?;
                    self.underflow_bits -= 1;
                }
            } else if (self.lower & MASK_SECOND != 0) && (self.upper & MASK_SECOND == 0) {
                self.underflow_bits += 1;
                self.lower &= !(MASK_TOP | MASK_SECOND);
                self.upper |= MASK_SECOND;
            } else {
                return Ok(());
            }

            self.lower <<= 1;
            self.upper <<= 1;
            self.upper |= 1;
        }
    }

    /// Settles the interval after the end-of-stream symbol: one definite bit
    /// plus enough complements to pin the decoder inside the interval.
    fn write_remaining<W: Write>(&mut self, writer: &mut BitWriter<W>) -> Result<()> {
        writer.write_bit(u8::from(self.lower & MASK_SECOND != 0))?;

        self.underflow_bits += 1;
        while self.underflow_bits > 0 {
            writer.write_bit(u8::from(self.lower & MASK_SECOND == 0))?;
            self.underflow_bits -= 1;
        }
        Ok(())
    }

    /// Primes the decode window with the first 16 bits. A stream with no
    /// bits at all is an error; a stream shorter than the window (tiny
    /// inputs whose flush padding was trimmed by byte alignment) zero-fills,
    /// exactly as the encoder's padding would.
    fn initialize_code<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        self.code = 0;
        for i in 0..PRECISION {
            self.code <<= 1;
            match reader.read_bit()? {
                Some(bit) => self.code |= u16::from(bit),
                None if i == 0 => return Err(Error::UnexpectedEof),
                None => {}
            }
        }

        self.lower = 0;
        self.upper = u16::MAX;
        Ok(())
    }

    /// Scales the code window back into the cumulative-frequency domain.
    fn unscaled_code(&self) -> u16 {
        let range = u32::from(self.upper - self.lower) + 1;
        let unscaled =
            (u32::from(self.code.wrapping_sub(self.lower)) + 1) * u32::from(self.cumulative_prob)
                - 1;
        (unscaled / range) as u16
    }

    /// Binary-searches the cumulative table for the symbol whose slice
    /// covers `probability`.
    fn symbol_from_probability(&self, probability: u16) -> Result<usize> {
        let mut first: i32 = 0;
        let mut last: i32 = NUM_SYMBOLS as i32;
        let mut middle: i32 = last / 2;

        while last >= first {
            if probability < self.ranges[middle as usize] {
                last = middle - 1;
                middle = first + (last - first) / 2;
                continue;
            }
            if probability >= self.ranges[middle as usize + 1] {
                first = middle + 1;
                middle = first + (last - first) / 2;
                continue;
            }
            return Ok(middle as usize);
        }

        Err(Error::UnknownSymbol(probability))
    }

    /// Mirror of [`Coder::write_encoded_bits`]: shifts settled bits out of
    /// the window, pulling fresh stream bits (or zero padding) in at the
    /// bottom and flipping the straddle bit on underflow.
    fn read_encoded_bits<R: Read>(&mut self, reader: &mut BitReader<R>) -> Result<()> {
        loop {
            if (self.upper & MASK_TOP) == (self.lower & MASK_TOP) {
                // settled bit; it falls off the window below
            } else if (self.lower & MASK_SECOND != 0) && (self.upper & MASK_SECOND == 0) {
                self.lower &= !(MASK_TOP | MASK_SECOND);
                self.upper |= MASK_SECOND;
                self.code ^= MASK_SECOND;
            } else {
                return Ok(());
            }

            self.lower <<= 1;
            self.upper <<= 1;
            self.upper |= 1;
            self.code <<= 1;

            if let Some(bit) = reader.read_bit()? {
                self.code |= u16::from(bit);
            }
        }
    }
}

/// Compresses `input` into `output` under the chosen model.
///
/// The static model reads the input twice (histogram, then coding), so the
/// input must be seekable; it is rewound to its starting position between
/// the passes.
pub fn encode<R: Read + Seek, W: Write>(mut input: R, output: W, model: Model) -> Result<()> {
    let mut coder = Coder::new(model);
    let mut writer = BitWriter::new(output);

    if model == Model::Static {
        let start = input.stream_position()?;
        coder.build_range_list(&mut input)?;
        coder.write_header(&mut writer)?;
        input.seek(SeekFrom::Start(start))?;
    }

    while let Some(byte) = next_byte(&mut input)? {
        coder.apply_symbol_range(byte as usize);
        coder.write_encoded_bits(&mut writer)?;
    }

    coder.apply_symbol_range(EOF_SYMBOL);
    coder.write_encoded_bits(&mut writer)?;
    coder.write_remaining(&mut writer)?;

    writer.into_inner()?;
    Ok(())
}

/// Expands `input` into `output`. `model` must match the encoder's choice.
pub fn decode<R: Read, W: Write>(input: R, mut output: W, model: Model) -> Result<()> {
    let mut coder = Coder::new(model);
    let mut reader = BitReader::new(input);

    if model == Model::Static {
        coder.read_header(&mut reader)?;
    }
    coder.initialize_code(&mut reader)?;

    loop {
        let unscaled = coder.unscaled_code();
        let symbol = coder.symbol_from_probability(unscaled)?;
        if symbol == EOF_SYMBOL {
            break;
        }

        output.write_all(&[symbol as u8])?;
        coder.apply_symbol_range(symbol);
        coder.read_encoded_bits(&mut reader)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn roundtrip(data: &[u8], model: Model) -> Vec<u8> {
        let mut encoded = Vec::new();
        encode(Cursor::new(data), &mut encoded, model).unwrap();
        let mut decoded = Vec::new();
        decode(&encoded[..], &mut decoded, model).unwrap();
        assert_eq!(decoded, data, "model {model:?}");
        encoded
    }

    /// Deterministic pseudo-random bytes for stress inputs.
    fn noise(len: usize, mut seed: u32) -> Vec<u8> {
        (0..len)
            .map(|_| {
                seed = seed.wrapping_mul(1_664_525).wrapping_add(1_013_904_223);
                (seed >> 24) as u8
            })
            .collect()
    }

    #[test]
    fn test_empty_input_is_one_eof_symbol() {
        let encoded = roundtrip(&[], Model::Adaptive);
        // Eight settled ones, the closing bit pair, zero padding.
        assert_eq!(encoded, vec![0xFF, 0x40]);
    }

    #[test]
    fn test_empty_input_static() {
        let encoded = roundtrip(&[], Model::Static);
        // Header terminator (22 zero bits), then the closing bit pair.
        assert_eq!(encoded, vec![0x00, 0x00, 0x01]);
    }

    #[test]
    fn test_single_byte_adaptive() {
        roundtrip(&[0x41], Model::Adaptive);
    }

    #[test]
    fn test_single_byte_static() {
        roundtrip(&[0x41], Model::Static);
    }

    #[test]
    fn test_text_both_models() {
        let data = b"the quick brown fox jumps over the lazy dog";
        roundtrip(data, Model::Adaptive);
        roundtrip(data, Model::Static);
    }

    #[test]
    fn test_skewed_input_compresses() {
        let mut data = vec![0xAAu8; 4000];
        data.extend_from_slice(&[0x01, 0x02, 0x03]);
        let encoded = roundtrip(&data, Model::Adaptive);
        assert!(encoded.len() < data.len() / 4);
    }

    #[test]
    fn test_noise_roundtrip_both_models() {
        let data = noise(1024, 0xBEEF);
        roundtrip(&data, Model::Adaptive);
        roundtrip(&data, Model::Static);
    }

    #[test]
    fn test_input_past_model_rescale() {
        // Enough symbols to force the adaptive halving and the static
        // first-pass rescale more than once.
        let data = noise(40_000, 7);
        roundtrip(&data, Model::Adaptive);
        roundtrip(&data, Model::Static);
    }

    #[test]
    fn test_decode_of_empty_stream_is_rejected() {
        let result = decode(&[][..], Vec::new(), Model::Adaptive);
        assert!(matches!(result, Err(Error::UnexpectedEof)));
    }

    #[test]
    fn test_interval_never_collapses() {
        let mut coder = Coder::new(Model::Adaptive);
        let mut sink = BitWriter::new(Vec::new());

        for &byte in noise(4096, 42).iter() {
            coder.apply_symbol_range(byte as usize);
            assert!(coder.lower <= coder.upper);
            coder.write_encoded_bits(&mut sink).unwrap();
            assert!(coder.lower <= coder.upper);
            assert!(coder.upper - coder.lower >= coder.cumulative_prob - 1);
        }
    }

    #[test]
    fn test_adaptive_model_updates_in_lockstep() {
        // The decoder replays the update sequence the encoder performed;
        // after every symbol both sides must hold identical tables.
        let mut encoder_side = Coder::new(Model::Adaptive);
        let mut decoder_side = Coder::new(Model::Adaptive);
        let mut sink = BitWriter::new(Vec::new());

        for &byte in b"mississippi river runs, mississippi river rises" {
            encoder_side.apply_symbol_range(byte as usize);
            encoder_side.write_encoded_bits(&mut sink).unwrap();

            decoder_side.update_model(byte as usize);
            assert_eq!(encoder_side.ranges, decoder_side.ranges);
            assert_eq!(encoder_side.cumulative_prob, decoder_side.cumulative_prob);
        }
    }
}
