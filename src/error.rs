//! Error types shared by every codec in the crate.

use thiserror::Error;

/// Error variants for encode and decode operations.
#[derive(Debug, Error)]
pub enum Error {
    /// The underlying byte source or sink reported a failure.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// The stream ended inside a structural field (a count field or the
    /// initial code window) that must be present in full.
    #[error("unexpected end of stream")]
    UnexpectedEof,

    /// A compressed-stream header ended before its terminator record, or the
    /// header describes a code tree the payload cannot walk.
    #[error("malformed stream header")]
    MalformedHeader,

    /// A decoded probability falls outside every entry of the cumulative
    /// frequency table.
    #[error("no symbol covers probability {0}")]
    UnknownSymbol(u16),

    /// A byte value occurs too many times for its frequency counter.
    #[error("symbol 0x{0:02X} occurs too many times to count")]
    CountOverflow(u8),

    /// The input is too large for the model's total frequency counter.
    #[error("input too large to model")]
    InputTooLarge,
}

/// A specialized Result type for codec operations.
pub type Result<T> = std::result::Result<T, Error>;
