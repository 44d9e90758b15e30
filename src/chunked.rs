//! Chunked and streaming drivers around the incremental codecs.
//!
//! A large input can be split into contiguous byte ranges, each compressed
//! by its own [`Compressor`] on a rayon worker. The framed outputs are
//! concatenated in range order with a boundary marker after every chunk, so
//! the result is a single stream that any decoder can read back sequentially
//! or split at the markers and decode in parallel.
//!
//! Chunks share nothing. Splitting costs some ratio (every chunk starts with
//! an empty dictionary) and buys linear speedup.

use std::io::{BufReader, BufWriter, Read, Write};
use std::ops::Range;

use rayon::prelude::*;
use tracing::debug;

use crate::compress::{compress, Compressor};
use crate::config::{Capacity, Config};
use crate::decompress::{decompress, Decompressor};
use crate::error::Result;
use crate::framing::{Frame, TokenFormat};
use crate::Token;

/// Read buffer size for the streaming drivers.
const IO_BUFFER: usize = 64 * 1024;

/// Totals reported by a streaming run.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StreamStats {
    /// Bytes consumed from the reader.
    pub bytes_in: u64,
    /// Bytes written to the writer.
    pub bytes_out: u64,
    /// Tokens written or read, boundary markers excluded.
    pub tokens: u64,
    /// Chunks written or read.
    pub chunks: u64,
}

/// Split `len` bytes into `workers` contiguous ranges.
///
/// Every range gets `len / workers` bytes; the last also takes the remainder.
pub fn partition(len: usize, workers: usize) -> Vec<Range<usize>> {
    let workers = workers.max(1);
    let step = len / workers;
    (0..workers)
        .map(|i| {
            let start = i * step;
            let end = if i + 1 == workers { len } else { start + step };
            start..end
        })
        .collect()
}

/// Compress `input` as `config.workers` independent chunks.
pub fn compress_chunks(input: &[u8], config: &Config) -> Result<Vec<u8>> {
    config.validate()?;
    let capacity = config.capacity.get();
    let format = TokenFormat::new(config.capacity);

    let chunks: Vec<Vec<Token>> = partition(input.len(), config.workers)
        .into_par_iter()
        .enumerate()
        .map(|(worker, range)| -> Result<Vec<Token>> {
            let len = range.len();
            let tokens = compress(capacity, &input[range])?;
            debug!(worker, bytes = len, tokens = tokens.len(), "compressed chunk");
            Ok(tokens)
        })
        .collect::<Result<_>>()?;

    let mut out = Vec::new();
    for tokens in &chunks {
        format.encode_chunk(tokens, &mut out)?;
    }
    Ok(out)
}

/// Decompress a framed stream, decoding its chunks in parallel.
///
/// # Errors
/// Fails on a truncated stream or on the first chunk containing an invalid
/// token.
pub fn decompress_chunks(stream: &[u8], config: &Config) -> Result<Vec<u8>> {
    config.validate()?;
    let capacity = config.capacity.get();
    let format = TokenFormat::new(config.capacity);
    let chunks = format.split_chunks(stream)?;

    let parts: Vec<Vec<u8>> = chunks
        .into_par_iter()
        .enumerate()
        .map(|(chunk, words)| -> Result<Vec<u8>> {
            let tokens: Vec<Token> = format.tokens(words).collect();
            let bytes = decompress(capacity, &tokens)?;
            debug!(
                chunk,
                tokens = tokens.len(),
                bytes = bytes.len(),
                "decompressed chunk"
            );
            Ok(bytes)
        })
        .collect::<Result<_>>()?;

    Ok(parts.concat())
}

/// Compress everything `reader` yields as a single chunk.
pub fn compress_stream<R: Read, W: Write>(
    reader: R,
    writer: W,
    capacity: Capacity,
) -> Result<StreamStats> {
    let format = TokenFormat::new(capacity);
    let mut reader = BufReader::with_capacity(IO_BUFFER, reader);
    let mut writer = BufWriter::with_capacity(IO_BUFFER, writer);
    let mut compressor = Compressor::new(capacity.get())?;
    let mut stats = StreamStats::default();
    let mut buf = vec![0u8; IO_BUFFER];

    loop {
        let n = match reader.read(&mut buf) {
            Ok(0) => break,
            Ok(n) => n,
            Err(err) if err.kind() == std::io::ErrorKind::Interrupted => continue,
            Err(err) => return Err(err.into()),
        };
        stats.bytes_in += n as u64;
        for &byte in &buf[..n] {
            if let Some(token) = compressor.receive(byte)? {
                format.write_token(&mut writer, token)?;
                stats.tokens += 1;
            }
        }
    }
    if let Some(token) = compressor.finish() {
        format.write_token(&mut writer, token)?;
        stats.tokens += 1;
    }
    format.write_boundary(&mut writer)?;
    writer.flush()?;

    stats.chunks = 1;
    stats.bytes_out = (stats.tokens + stats.chunks) * format.width() as u64;
    Ok(stats)
}

/// Decompress a framed stream sequentially, starting a fresh dictionary
/// after every boundary marker.
pub fn decompress_stream<R: Read, W: Write>(
    reader: R,
    writer: W,
    capacity: Capacity,
) -> Result<StreamStats> {
    let format = TokenFormat::new(capacity);
    let mut reader = BufReader::with_capacity(IO_BUFFER, reader);
    let mut writer = BufWriter::with_capacity(IO_BUFFER, writer);
    let mut decompressor = Decompressor::new(capacity.get())?;
    let mut stats = StreamStats::default();
    let mut in_chunk = false;

    while let Some(frame) = format.read_frame(&mut reader)? {
        stats.bytes_in += format.width() as u64;
        match frame {
            Frame::Token(token) => {
                let bytes = decompressor.receive(token)?;
                writer.write_all(bytes)?;
                stats.bytes_out += bytes.len() as u64;
                stats.tokens += 1;
                in_chunk = true;
            }
            Frame::Boundary => {
                decompressor.finish();
                decompressor = Decompressor::new(capacity.get())?;
                stats.chunks += 1;
                in_chunk = false;
            }
        }
    }
    if in_chunk {
        stats.chunks += 1;
    }
    writer.flush()?;
    Ok(stats)
}
