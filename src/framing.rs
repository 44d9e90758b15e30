//! Fixed-width big-endian token framing.
//!
//! Tokens are written as unsigned big-endian words. The word is wide enough
//! to hold the capacity value itself, so the all-ones word never collides
//! with a token and serves as the chunk boundary marker:
//!
//! ```text
//! capacity        width   boundary
//! 2^8  ..= 2^15   2       0xFFFF
//! 2^16 ..= 2^23   3       0xFF_FFFF
//! 2^24            4       0xFFFF_FFFF
//! ```
//!
//! There is no header. Both ends must agree on the capacity.

use std::io::{ErrorKind, Read, Write};

use crate::config::Capacity;
use crate::error::{Error, Result};
use crate::Token;

/// One framed word.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Frame {
    /// A token of the current chunk.
    Token(Token),
    /// End of the current chunk; the next token starts a fresh dictionary.
    Boundary,
}

/// Word layout for a given dictionary capacity.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TokenFormat {
    capacity: Capacity,
    width: usize,
}

impl TokenFormat {
    /// Format for tokens of a dictionary with `capacity`.
    pub fn new(capacity: Capacity) -> Self {
        let bits = u32::BITS - capacity.get().leading_zeros();
        let width = (bits as usize).div_ceil(8).max(2);
        Self { capacity, width }
    }

    /// Octets per word.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Capacity this format was built for.
    pub fn capacity(&self) -> Capacity {
        self.capacity
    }

    /// The all-ones word marking a chunk boundary.
    pub fn boundary(&self) -> u32 {
        u32::MAX >> (32 - 8 * self.width as u32)
    }

    fn write_word<W: Write>(&self, writer: &mut W, value: u32) -> Result<()> {
        let bytes = value.to_be_bytes();
        writer.write_all(&bytes[4 - self.width..])?;
        Ok(())
    }

    /// Value of one word's bytes.
    fn parse(&self, bytes: &[u8]) -> Frame {
        let value = bytes.iter().fold(0u32, |acc, &b| (acc << 8) | u32::from(b));
        if value == self.boundary() {
            Frame::Boundary
        } else {
            Frame::Token(value)
        }
    }

    /// Write one token.
    ///
    /// # Errors
    /// Returns `Error::InvalidToken` for a token outside the capacity.
    pub fn write_token<W: Write>(&self, writer: &mut W, token: Token) -> Result<()> {
        if token >= self.capacity.get() {
            return Err(Error::InvalidToken {
                token,
                capacity: self.capacity.get(),
            });
        }
        self.write_word(writer, token)
    }

    /// Write the boundary marker.
    pub fn write_boundary<W: Write>(&self, writer: &mut W) -> Result<()> {
        self.write_word(writer, self.boundary())
    }

    /// Append `tokens` followed by a boundary marker to `out`.
    pub fn encode_chunk(&self, tokens: &[Token], out: &mut Vec<u8>) -> Result<()> {
        out.reserve((tokens.len() + 1) * self.width);
        for &token in tokens {
            self.write_token(out, token)?;
        }
        self.write_boundary(out)
    }

    /// Read the next word, or `None` at a clean end of input.
    ///
    /// # Errors
    /// Returns `Error::TruncatedStream` if input ends inside a word.
    pub fn read_frame<R: Read>(&self, reader: &mut R) -> Result<Option<Frame>> {
        let mut buf = [0u8; 4];
        let buf = &mut buf[..self.width];
        let mut filled = 0;
        while filled < buf.len() {
            match reader.read(&mut buf[filled..]) {
                Ok(0) => break,
                Ok(n) => filled += n,
                Err(err) if err.kind() == ErrorKind::Interrupted => continue,
                Err(err) => return Err(err.into()),
            }
        }
        match filled {
            0 => Ok(None),
            n if n < buf.len() => Err(Error::TruncatedStream {
                trailing: n,
                width: self.width,
            }),
            _ => Ok(Some(self.parse(buf))),
        }
    }

    /// Split a framed stream into per-chunk token words.
    ///
    /// Each returned slice holds whole words without the boundary marker. A
    /// final run of words with no trailing marker is returned as a chunk too.
    pub fn split_chunks<'a>(&self, stream: &'a [u8]) -> Result<Vec<&'a [u8]>> {
        let trailing = stream.len() % self.width;
        if trailing != 0 {
            return Err(Error::TruncatedStream {
                trailing,
                width: self.width,
            });
        }
        let mut chunks = Vec::new();
        let mut start = 0;
        for (i, word) in stream.chunks_exact(self.width).enumerate() {
            if self.parse(word) == Frame::Boundary {
                let end = i * self.width;
                chunks.push(&stream[start..end]);
                start = end + self.width;
            }
        }
        if start < stream.len() {
            chunks.push(&stream[start..]);
        }
        Ok(chunks)
    }

    /// Tokens of a chunk returned by [`split_chunks`](Self::split_chunks).
    pub fn tokens<'a>(&'a self, chunk: &'a [u8]) -> impl Iterator<Item = Token> + 'a {
        chunk
            .chunks_exact(self.width)
            .map(move |word| match self.parse(word) {
                Frame::Token(token) => token,
                Frame::Boundary => self.boundary(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    fn format(bits: u32) -> TokenFormat {
        TokenFormat::new(Capacity::from_code_bits(bits).unwrap())
    }

    #[test]
    fn test_width_rules() {
        assert_eq!(format(8).width(), 2);
        assert_eq!(format(15).width(), 2);
        assert_eq!(format(16).width(), 3);
        assert_eq!(format(23).width(), 3);
        assert_eq!(format(24).width(), 4);
        assert_eq!(format(9).boundary(), 0xFFFF);
        assert_eq!(format(16).boundary(), 0xFF_FFFF);
        assert_eq!(format(24).boundary(), 0xFFFF_FFFF);
        for bits in 8..=24 {
            let f = format(bits);
            assert!(f.boundary() >= f.capacity().get());
        }
    }

    #[test]
    fn test_big_endian_layout() {
        let f = format(16);
        let mut out = Vec::new();
        f.write_token(&mut out, 0x0203).unwrap();
        f.write_boundary(&mut out).unwrap();
        assert_eq!(out, vec![0x00, 0x02, 0x03, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_rejects_out_of_range_token() {
        let f = format(9);
        let mut out = Vec::new();
        assert!(matches!(
            f.write_token(&mut out, 512),
            Err(Error::InvalidToken { token: 512, .. })
        ));
    }

    #[test]
    fn test_read_frames() {
        let f = format(12);
        let mut out = Vec::new();
        f.encode_chunk(&[65, 4095, 300], &mut out).unwrap();
        let mut reader = Cursor::new(out);
        assert_eq!(f.read_frame(&mut reader).unwrap(), Some(Frame::Token(65)));
        assert_eq!(f.read_frame(&mut reader).unwrap(), Some(Frame::Token(4095)));
        assert_eq!(f.read_frame(&mut reader).unwrap(), Some(Frame::Token(300)));
        assert_eq!(f.read_frame(&mut reader).unwrap(), Some(Frame::Boundary));
        assert_eq!(f.read_frame(&mut reader).unwrap(), None);
    }

    #[test]
    fn test_read_truncated() {
        let f = format(20);
        let mut reader = Cursor::new(vec![0x00, 0x01, 0x00, 0x7F]);
        assert_eq!(f.read_frame(&mut reader).unwrap(), Some(Frame::Token(256)));
        assert!(matches!(
            f.read_frame(&mut reader),
            Err(Error::TruncatedStream {
                trailing: 1,
                width: 3
            })
        ));
    }

    #[test]
    fn test_split_chunks() {
        let f = format(10);
        let mut out = Vec::new();
        f.encode_chunk(&[1, 2], &mut out).unwrap();
        f.encode_chunk(&[], &mut out).unwrap();
        f.encode_chunk(&[3], &mut out).unwrap();
        f.write_token(&mut out, 4).unwrap();

        let chunks = f.split_chunks(&out).unwrap();
        let tokens: Vec<Vec<Token>> = chunks.iter().map(|c| f.tokens(c).collect()).collect();
        assert_eq!(tokens, vec![vec![1, 2], vec![], vec![3], vec![4]]);

        assert!(matches!(
            f.split_chunks(&out[..out.len() - 1]),
            Err(Error::TruncatedStream { trailing: 1, .. })
        ));
    }
}
