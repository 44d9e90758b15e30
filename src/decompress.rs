//! Incremental LZW-GC decompressor.
//!
//! Tokens go in one at a time; each valid token expands to one or more
//! bytes. Token streams are untrusted: anything out of range, naming an
//! empty entry, or whose prefix chain does not reach a literal aborts the
//! stream instead of decoding stale table contents.

use tracing::warn;

use crate::dict::Dictionary;
use crate::error::{Error, Result};
use crate::Token;

/// Token-at-a-time decompressor owning a private dictionary.
#[derive(Debug)]
pub struct Decompressor {
    dict: Dictionary,
    /// Phrase bytes, last byte first. One longer than the longest possible
    /// phrase so a chain that never terminates fills it completely.
    scratch: Vec<u8>,
    output: Vec<u8>,
    aborted: bool,
}

impl Decompressor {
    /// Create a decompressor with a fresh dictionary of `capacity` tokens.
    ///
    /// # Errors
    /// Returns `Error::InvalidCapacity` for a bad capacity and
    /// `Error::Allocation` if the decode buffers cannot be reserved.
    pub fn new(capacity: u32) -> Result<Self> {
        Self::with_dictionary(Dictionary::new(capacity)?)
    }

    /// Create a decompressor around an existing, unused dictionary.
    pub fn with_dictionary(dict: Dictionary) -> Result<Self> {
        // Longest phrase: every entry on one chain plus the literal root.
        let scratch_len = dict.slot_count() + 2;
        let mut scratch = Vec::new();
        scratch.try_reserve_exact(scratch_len)?;
        scratch.resize(scratch_len, 0);
        Ok(Self {
            dict,
            scratch,
            output: Vec::new(),
            aborted: false,
        })
    }

    /// Feed one token and return the bytes it expands to.
    ///
    /// The returned slice is only valid until the next call.
    ///
    /// # Errors
    /// Returns `Error::InvalidToken` for a token the dictionary cannot decode;
    /// every later call then fails with `Error::Aborted`.
    pub fn receive(&mut self, token: Token) -> Result<&[u8]> {
        if self.aborted {
            return Err(Error::Aborted);
        }
        if let Err(err) = self.decode(token) {
            self.aborted = true;
            self.output.clear();
            warn!(
                token,
                capacity = self.dict.capacity(),
                "rejected token, aborting stream"
            );
            return Err(err);
        }
        Ok(self.output.as_slice())
    }

    fn decode(&mut self, token: Token) -> Result<()> {
        let count = self.dict.read_reversed(token, &mut self.scratch)?;
        if count == self.scratch.len() {
            // The chain did not end within the table: it loops.
            return Err(Error::InvalidToken {
                token,
                capacity: self.dict.capacity(),
            });
        }
        self.output.clear();
        self.output.extend(self.scratch[..count].iter().rev().copied());
        self.dict.update(token)
    }

    /// True once a token has been rejected.
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Read access to the dictionary.
    pub fn dictionary(&self) -> &Dictionary {
        &self.dict
    }

    /// Release the dictionary and buffers. Never produces output.
    pub fn finish(self) {}
}

/// Decompress `tokens` with a fresh dictionary of `capacity` tokens.
pub fn decompress(capacity: u32, tokens: &[Token]) -> Result<Vec<u8>> {
    let mut decompressor = Decompressor::new(capacity)?;
    let mut output = Vec::new();
    for &token in tokens {
        output.extend_from_slice(decompressor.receive(token)?);
    }
    decompressor.finish();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compress::compress;
    use proptest::prelude::*;

    #[test]
    fn test_decode_alternating_pattern() {
        let mut decompressor = Decompressor::new(512).unwrap();
        let expected: [&[u8]; 6] = [b"A", b"B", b"AB", b"AB", b"ABA", b"B"];
        for (token, bytes) in [65, 66, 256, 256, 258, 66].into_iter().zip(expected) {
            assert_eq!(decompressor.receive(token).unwrap(), bytes);
        }
    }

    #[test]
    fn test_rejects_out_of_range() {
        let mut decompressor = Decompressor::new(512).unwrap();
        assert!(matches!(
            decompressor.receive(512),
            Err(Error::InvalidToken {
                token: 512,
                capacity: 512
            })
        ));
        assert!(decompressor.is_aborted());
        assert!(matches!(decompressor.receive(65), Err(Error::Aborted)));
    }

    #[test]
    fn test_rejects_unassigned_entry() {
        let mut decompressor = Decompressor::new(512).unwrap();
        decompressor.receive(65).unwrap();
        decompressor.receive(66).unwrap();
        // Only 256 exists so far.
        assert!(matches!(
            decompressor.receive(257),
            Err(Error::InvalidToken { token: 257, .. })
        ));
    }

    #[test]
    fn test_first_token_must_be_literal() {
        let mut decompressor = Decompressor::new(1 << 16).unwrap();
        assert!(decompressor.receive(256).is_err());
    }

    #[test]
    fn test_one_shot_roundtrip() {
        let input = b"TOBEORNOTTOBEORTOBEORNOT#";
        let tokens = compress(512, input).unwrap();
        assert_eq!(decompress(512, &tokens).unwrap(), input.to_vec());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(100))]

        #[test]
        fn prop_roundtrip_small_tables(
            input in prop::collection::vec(0u8..6, 0..3000),
            bits in 8u32..11,
        ) {
            // Small alphabets and tables force heavy eviction.
            let capacity = 1u32 << bits;
            let tokens = compress(capacity, &input).unwrap();
            let output = decompress(capacity, &tokens).unwrap();
            prop_assert_eq!(input, output);
        }

        #[test]
        fn prop_arbitrary_tokens_never_panic(
            tokens in prop::collection::vec(0u32..600, 0..200),
        ) {
            let mut decompressor = Decompressor::new(512).unwrap();
            for token in tokens {
                if decompressor.receive(token).is_err() {
                    break;
                }
            }
        }
    }
}
