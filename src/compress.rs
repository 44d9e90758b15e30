//! Incremental LZW-GC compressor.
//!
//! Bytes go in one at a time; at most one token comes out per byte. The
//! compressor holds the longest dictionary phrase matched so far and only
//! emits it when the next byte fails to extend it.

use crate::dict::Dictionary;
use crate::error::Result;
use crate::Token;

/// Byte-at-a-time compressor owning a private dictionary.
#[derive(Debug)]
pub struct Compressor {
    dict: Dictionary,
    matched: Option<Token>,
}

impl Compressor {
    /// Create a compressor with a fresh dictionary of `capacity` tokens.
    ///
    /// # Errors
    /// Returns `Error::InvalidCapacity` for a capacity that is not a power of
    /// two in `[2^8, 2^24]`.
    pub fn new(capacity: u32) -> Result<Self> {
        Ok(Self::with_dictionary(Dictionary::new(capacity)?))
    }

    /// Create a compressor around an existing, unused dictionary.
    pub fn with_dictionary(dict: Dictionary) -> Self {
        Self {
            dict,
            matched: None,
        }
    }

    /// Feed one byte. Returns the token completed by this byte, if any.
    ///
    /// A completed token has already been applied to the dictionary when
    /// this returns.
    pub fn receive(&mut self, byte: u8) -> Result<Option<Token>> {
        let Some(matched) = self.matched else {
            self.matched = Some(Token::from(byte));
            return Ok(None);
        };

        if let Some(extended) = self.dict.lookup(matched, byte)? {
            self.matched = Some(extended);
            return Ok(None);
        }

        self.dict.update(matched)?;
        self.matched = Some(Token::from(byte));
        Ok(Some(matched))
    }

    /// The phrase token currently being extended, if any.
    pub fn pending(&self) -> Option<Token> {
        self.matched
    }

    /// Read access to the dictionary.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Flush the pending match and release the dictionary.
    ///
    /// Returns `None` only if no byte was ever received.
    pub fn finish(self) -> Option<Token> {
        self.matched
    }
}

/// Compress `input` with a fresh dictionary of `capacity` tokens.
pub fn compress(capacity: u32, input: &[u8]) -> Result<Vec<Token>> {
    let mut compressor = Compressor::new(capacity)?;
    let mut tokens = Vec::new();
    for &byte in input {
        if let Some(token) = compressor.receive(byte)? {
            tokens.push(token);
        }
    }
    tokens.extend(compressor.finish());
    Ok(tokens)
}
