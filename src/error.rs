//! Error types for LZW-GC.

use std::collections::TryReserveError;

use thiserror::Error;

/// Error variants for dictionary, codec and framing operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Dictionary capacity is not a power of two in `[2^8, 2^24]`.
    #[error("invalid dictionary capacity {0}: must be a power of two in [256, 16777216]")]
    InvalidCapacity(u32),

    /// Code width outside `8..=24` bits.
    #[error("invalid code width {0}: must be between 8 and 24 bits")]
    InvalidCodeBits(u32),

    /// A chunked run was configured with zero workers.
    #[error("worker count must be at least 1")]
    InvalidWorkers,

    /// The decompressor received a token that is out of range or names an
    /// empty entry. The stream must be abandoned.
    #[error("invalid token {token} for dictionary capacity {capacity}")]
    InvalidToken {
        /// The offending token.
        token: u32,
        /// Capacity of the dictionary that rejected it.
        capacity: u32,
    },

    /// The decompressor already rejected a token and refuses further input.
    #[error("decode stream aborted after an invalid token")]
    Aborted,

    /// A framed stream ended in the middle of a token.
    #[error("truncated token stream: {trailing} trailing bytes, token width is {width}")]
    TruncatedStream {
        /// Number of bytes left over after the last whole token.
        trailing: usize,
        /// Token width in octets.
        width: usize,
    },

    /// Memory for a table, index or buffer could not be reserved.
    #[error("allocation failed: {0}")]
    Allocation(#[from] TryReserveError),

    /// An I/O error occurred during encoding or decoding.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

/// A specialized Result type for LZW-GC operations.
pub type Result<T> = std::result::Result<T, Error>;
