//! # Lossless byte-stream codecs
//!
//! *Three classic entropy coders over one shared bit-stream layer.*
//!
//! ## Intuition First
//!
//! Compression is betting. A coder that expects some bytes more than others
//! can pay fewer bits for the likely ones and more for the rare ones; if its
//! expectations match the data, the stream shrinks. The three families here
//! take that bet in different ways:
//!
//! - **Run-length coding** bets the next byte repeats the last one, and pays
//!   a count byte instead of the repetitions.
//! - **Huffman coding** bets on a whole histogram, assigning each byte a
//!   prefix-free code whose length is roughly its negative log-probability,
//!   rounded to whole bits.
//! - **Arithmetic coding** drops the rounding: the entire message becomes one
//!   number inside an interval that narrows with every symbol, spending
//!   fractional bits per symbol and approaching the entropy limit.
//!
//! ## Historical Context
//!
//! ```text
//! 1948  Shannon     Entropy as the fundamental limit
//! 1952  Huffman     Optimal whole-bit prefix codes
//! 1963  Abramson    Run-length coding in print
//! 1976  Rissanen    Arithmetic coding reaches the fractional-bit rate
//! 1987  Witten et al.  The practical fixed-precision arithmetic coder
//! ```
//!
//! The arithmetic coder here is the Witten–Neal–Cleary design: 16-bit
//! interval bounds, two bits of headroom, and deferred underflow bits for
//! midpoint straddles.
//!
//! ## Mathematical Formulation
//!
//! For a symbol $s$ with cumulative range $[lo_s, hi_s)$ out of a total $T$,
//! the live interval $[L, U]$ narrows to
//!
//! ```text
//! U' = L + floor((U - L + 1) * hi_s / T) - 1
//! L' = L + floor((U - L + 1) * lo_s / T)
//! ```
//!
//! and every bit on which $L'$ and $U'$ agree is settled output.
//!
//! ## Complexity Analysis
//!
//! - **Time**: $O(1)$ per symbol for RLE and Huffman encode; $O(\log N)$ per
//!   symbol for arithmetic decode (cumulative-table search), $O(N)$ for an
//!   adaptive model update over the tail of the table.
//! - **Space**: $O(N)$ tables, where $N = 257$ symbols.
//!
//! ## Failure Modes
//!
//! 1. **Model mismatch**: decoding with the wrong arithmetic model produces
//!    garbage without any structural error; the model choice is part of the
//!    stream's contract.
//! 2. **Incompressible input**: random bytes cost slightly more than they
//!    did uncompressed (headers, the end-of-stream symbol, padding).
//!
//! ## Implementation Notes
//!
//! Every codec exposes `encode`/`decode` over `std::io` sources and sinks
//! and round-trips bit-for-bit. The two-pass coders (Huffman, arithmetic
//! with the static model) need a seekable input. Multi-bit numeric fields
//! are written in network order, so streams are portable across hosts.
//!
//! ## References
//!
//! - Huffman, D. (1952). "A Method for the Construction of
//!   Minimum-Redundancy Codes."
//! - Witten, I., Neal, R., Cleary, J. (1987). "Arithmetic Coding for Data
//!   Compression." *Communications of the ACM* 30(6).

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod arithmetic;
pub mod bitio;
pub mod error;
pub mod huffman;
pub mod packbits;
pub mod rle;

pub use arithmetic::Model;
pub use bitio::{BitReader, BitWriter};
pub use error::Error;
