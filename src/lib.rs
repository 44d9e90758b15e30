//! # LZW-GC
//!
//! *LZW whose dictionary never freezes: stale phrases are garbage-collected
//! and replaced as the input moves on.*
//!
//! ## Intuition First
//!
//! LZW learns a phrase book while it reads. Each time it sees a phrase it
//! already knows followed by a new byte, it writes the phrase's number and
//! files "phrase + byte" under the next free number. The reader rebuilds the
//! same book from the numbers alone.
//!
//! The book has a fixed number of pages. Classic LZW either stops learning
//! when it fills up or throws the whole book away and starts over. LZW-GC
//! keeps learning forever: every new phrase takes the page of some phrase
//! that has not been useful lately.
//!
//! ## The Problem
//!
//! - **Freezing** the dictionary works until the data drifts, after which the
//!   frozen phrases describe input that no longer occurs.
//! - **Resetting** forgets everything at once, including phrases that were
//!   still paying for themselves.
//! - Classic LZW decoders are also one step behind their encoders and need a
//!   special case for a code used in the very step that creates it.
//!
//! ## Historical Context
//!
//! ```text
//! 1977  Ziv, Lempel   LZ77: sliding-window back-references
//! 1978  Ziv, Lempel   LZ78: explicit phrase dictionary
//! 1984  Welch         LZW: LZ78 with an implicit next byte
//! 1985  Thomas et al. compress(1): LZW with dictionary reset on ratio drop
//! ```
//!
//! ## Algorithm
//!
//! Both directions call one update rule with the token stream
//! `t_1, t_2, ...` (emitted by the compressor, read by the decompressor):
//!
//! ```text
//! update(t_k):
//!   credit every entry on the prefix chain of t_k
//!   sweep from the cursor, halving counts, until an entry has count 0
//!   entry := phrase(t_{k-1}) ++ first_byte(phrase(t_k))
//! ```
//!
//! Because the new entry depends only on tokens both sides have already
//! seen, the decoder never meets an unknown code.
//!
//! ## Complexity Analysis
//!
//! - **Time**: amortized O(phrase length) per token. Sweep visits are bounded
//!   by the total credit handed out plus one per update, since every visit
//!   that does not reclaim halves a nonzero count.
//! - **Space**: O(capacity): one record per entry, plus a lookup index of
//!   `2 * capacity` slots on the compressor side only.
//!
//! ## Failure Modes
//!
//! 1. **Untrusted tokens**: a corrupt stream can name an empty entry or a
//!    chain that loops. The decompressor rejects both and aborts the stream.
//! 2. **Small tables**: with few entries the sweep recycles phrases before
//!    they grow long, and the ratio approaches that of literal coding.
//!
//! ## Implementation Notes
//!
//! This crate provides:
//! - [`Dictionary`]: the shared table, lookup index and update rule.
//! - [`Compressor`] / [`Decompressor`]: one-symbol-at-a-time state machines.
//! - [`framing`]: big-endian token words with chunk boundary markers.
//! - [`chunked`]: parallel chunking and buffered streaming drivers.
//!
//! ## References
//!
//! - Welch, T. A. (1984). "A Technique for High-Performance Data Compression."
//! - Ziv, J., Lempel, A. (1978). "Compression of Individual Sequences via
//!   Variable-Rate Coding."

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod chunked;
pub mod compress;
pub mod config;
pub mod decompress;
pub mod dict;
pub mod error;
pub mod framing;
mod index;

/// A literal byte (`0..256`) or a dictionary entry (`256..capacity`).
pub type Token = u32;

/// Number of literal tokens; entry tokens start here.
pub const LITERAL_COUNT: Token = 256;

pub use chunked::{compress_chunks, decompress_chunks, StreamStats};
pub use compress::{compress, Compressor};
pub use config::{Capacity, Config};
pub use decompress::{decompress, Decompressor};
pub use dict::{Dictionary, DictionaryStats, Extension};
pub use error::{Error, Result};
pub use framing::{Frame, TokenFormat};
