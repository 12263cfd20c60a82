use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failures encountered while loading the compression dictionary.
///
/// Any of these is fatal at daemon startup: the service cannot serve
/// compression-capable peers without a usable dictionary.
#[derive(Debug, Error)]
pub enum DictionaryError {
    /// The dictionary resource could not be read at all.
    #[error("compression dictionary {path} is unavailable: {source}")]
    Unreadable {
        /// Path of the missing or unreadable resource.
        path: PathBuf,
        /// Underlying I/O failure.
        source: io::Error,
    },
    /// The bit stream ended before all 256 symbols were described.
    #[error("compression dictionary truncated while reading symbol {symbol}")]
    Truncated {
        /// Symbol whose entry was cut short.
        symbol: usize,
    },
    /// A symbol declared a code longer than the 32-bit pattern limit.
    #[error("code for symbol {symbol} spans {bits} bits, exceeding the 32-bit limit")]
    CodeTooLong {
        /// Symbol carrying the over-long code.
        symbol: usize,
        /// Declared length in bits.
        bits: u8,
    },
}

/// Failures encountered while decompressing a payload.
///
/// All of these mark the payload as unrecoverable for the current request;
/// the daemon answers with the generic error frame and keeps the
/// connection open.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum DecodeError {
    /// The payload was empty: even a zero-bit stream carries its trailer.
    #[error("compressed payload is empty: missing the padding trailer byte")]
    MissingTrailer,
    /// The trailer declared a padding count the bitstream cannot hold.
    #[error("padding trailer declares {0} bits; padding is always below 8")]
    InvalidPadding(u8),
    /// A bit path descended to an edge no dictionary code continues down.
    #[error("no dictionary code follows the bit path at bit offset {bit_offset}")]
    DeadEnd {
        /// Offset of the offending bit within the bitstream.
        bit_offset: usize,
    },
    /// The bitstream ended in the middle of a code.
    #[error("compressed bitstream ends {bits} bits into an unfinished code")]
    DanglingBits {
        /// Bits consumed since the last completed code.
        bits: usize,
    },
}
