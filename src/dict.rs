//! The garbage-collected token dictionary.
//!
//! Every non-literal token names one entry: a prefix token plus the byte
//! appended to it. The table has a fixed number of entries; instead of
//! freezing or resetting when it fills, each update reclaims one entry
//! chosen by an aging sweep and reuses it for the newest phrase.
//!
//! Compression and decompression call [`Dictionary::update`] with the same
//! token sequence, so both sides hold identical tables at every step.
//!
//! # Aging
//!
//! Using a token adds one to the match count of every entry on its prefix
//! chain. The sweep walks the table circularly from the last allocation,
//! halving every count it passes, and takes the first entry whose count is
//! already zero. Frequently used phrases survive several passes; stale ones
//! are reclaimed on the next.

use tracing::{debug, trace};

use crate::config::Capacity;
use crate::error::{Error, Result};
use crate::index::LookupIndex;
use crate::{Token, LITERAL_COUNT};

/// The phrase an entry denotes: `prefix`'s phrase followed by `byte`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct Extension {
    /// Token being extended.
    pub prefix: Token,
    /// Byte appended to the prefix phrase.
    pub byte: u8,
}

#[derive(Clone, Copy, Debug, Default)]
struct Entry {
    match_count: u32,
    /// `None` while the entry holds no phrase.
    extension: Option<Extension>,
}

/// Counters describing the work a dictionary has done.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DictionaryStats {
    /// Updates past the bootstrap step.
    pub updates: u64,
    /// Match-count increments applied along prefix chains.
    pub chain_bumps: u64,
    /// Entries visited by eviction sweeps, including the one selected.
    pub sweep_visits: u64,
    /// Sweeps that reclaimed an entry which still held a phrase.
    pub reclaimed: u64,
    /// Times the lookup index was rebuilt to shed tombstones.
    pub index_rebuilds: u64,
}

fn slot_of(token: Token) -> usize {
    (token - LITERAL_COUNT) as usize
}

fn token_of(slot: usize) -> Token {
    LITERAL_COUNT + slot as Token
}

fn extension_in(entries: &[Entry], token: Token) -> Option<Extension> {
    if token < LITERAL_COUNT {
        return None;
    }
    entries.get(slot_of(token)).and_then(|entry| entry.extension)
}

fn fill_index(index: &mut LookupIndex, entries: &[Entry]) {
    index.clear();
    for (slot, entry) in entries.iter().enumerate() {
        if let Some(extension) = entry.extension {
            index.insert(extension, token_of(slot));
        }
    }
}

/// Fixed-capacity phrase table shared in shape by compressor and decompressor.
#[derive(Debug)]
pub struct Dictionary {
    capacity: Capacity,
    entries: Vec<Entry>,
    history: Option<Token>,
    cursor: usize,
    /// Built by the first lookup; the decompressor never needs one.
    index: Option<LookupIndex>,
    stats: DictionaryStats,
}

impl Dictionary {
    /// Create an empty dictionary.
    ///
    /// # Errors
    /// Returns `Error::InvalidCapacity` if `capacity` is not a power of two in
    /// `[2^8, 2^24]`, or `Error::Allocation` if the table cannot be allocated.
    pub fn new(capacity: u32) -> Result<Self> {
        Self::with_capacity(Capacity::new(capacity)?)
    }

    /// Create an empty dictionary from an already validated capacity.
    pub fn with_capacity(capacity: Capacity) -> Result<Self> {
        let slots = capacity.slot_count();
        let mut entries = Vec::new();
        entries.try_reserve_exact(slots)?;
        entries.resize(slots, Entry::default());
        Ok(Self {
            capacity,
            entries,
            history: None,
            // Allocation starts at slot 0.
            cursor: slots.saturating_sub(1),
            index: None,
            stats: DictionaryStats::default(),
        })
    }

    /// Total token range, literals included.
    pub fn capacity(&self) -> u32 {
        self.capacity.get()
    }

    /// Number of non-literal entries.
    pub fn slot_count(&self) -> usize {
        self.entries.len()
    }

    /// The last token passed to [`update`](Self::update), if any.
    pub fn history(&self) -> Option<Token> {
        self.history
    }

    /// Work counters accumulated so far.
    pub fn stats(&self) -> DictionaryStats {
        self.stats
    }

    /// The extension stored for `token`, or `None` for literals, out-of-range
    /// tokens and empty entries.
    pub fn extension(&self, token: Token) -> Option<Extension> {
        extension_in(&self.entries, token)
    }

    /// Current match count of an entry token.
    pub fn match_count(&self, token: Token) -> Option<u32> {
        if token < LITERAL_COUNT {
            return None;
        }
        self.entries.get(slot_of(token)).map(|entry| entry.match_count)
    }

    /// True if `token` is a literal or names an entry holding a phrase.
    pub fn is_valid(&self, token: Token) -> bool {
        token < LITERAL_COUNT || self.extension(token).is_some()
    }

    fn invalid(&self, token: Token) -> Error {
        Error::InvalidToken {
            token,
            capacity: self.capacity.get(),
        }
    }

    /// Find the token extending `prefix` by `byte`.
    ///
    /// The lookup index is built on the first call.
    pub fn lookup(&mut self, prefix: Token, byte: u8) -> Result<Option<Token>> {
        if self.index.is_none() {
            let mut index = LookupIndex::new(self.capacity)?;
            fill_index(&mut index, &self.entries);
            debug!(
                slots = index.len(),
                live = index.saturation(),
                "built lookup index"
            );
            self.index = Some(index);
        }
        let entries = &self.entries;
        let key = Extension { prefix, byte };
        Ok(self
            .index
            .as_ref()
            .and_then(|index| index.find(key, |token| extension_in(entries, token))))
    }

    /// Advance the dictionary by one token of the update stream.
    ///
    /// The first call only records history. Every later call credits the
    /// token's prefix chain, reclaims one entry and stores in it the previous
    /// token extended by the first byte of this one.
    ///
    /// # Errors
    /// Returns `Error::InvalidToken` if `token` is not valid or its prefix
    /// chain does not reach a literal. The dictionary must be discarded
    /// after such an error.
    pub fn update(&mut self, token: Token) -> Result<()> {
        if !self.is_valid(token) {
            return Err(self.invalid(token));
        }
        let Some(history) = self.history else {
            self.history = Some(token);
            return Ok(());
        };

        let first = self.credit_chain(token)?;
        self.stats.updates += 1;

        if !self.entries.is_empty() {
            let slot = self.sweep();
            self.reassign(
                slot,
                Extension {
                    prefix: history,
                    byte: first,
                },
            );
        }

        self.history = Some(token);
        self.rebuild_if_saturated();
        Ok(())
    }

    /// Bump every entry on `token`'s chain and return the phrase's first byte.
    fn credit_chain(&mut self, token: Token) -> Result<u8> {
        let capacity = self.capacity.get();
        let broken = || Error::InvalidToken { token, capacity };
        let limit = self.entries.len();
        let mut current = token;
        let mut steps = 0usize;
        while current >= LITERAL_COUNT {
            if steps == limit {
                return Err(broken());
            }
            let Some(entry) = self.entries.get_mut(slot_of(current)) else {
                return Err(broken());
            };
            let Some(extension) = entry.extension else {
                return Err(broken());
            };
            entry.match_count = entry.match_count.saturating_add(1);
            steps += 1;
            current = extension.prefix;
        }
        self.stats.chain_bumps += steps as u64;
        Ok(current as u8)
    }

    /// Age entries from just past the cursor until one has a zero count.
    fn sweep(&mut self) -> usize {
        let len = self.entries.len();
        let mut slot = self.cursor;
        loop {
            slot = (slot + 1) % len;
            self.stats.sweep_visits += 1;
            let entry = &mut self.entries[slot];
            if entry.match_count == 0 {
                break;
            }
            entry.match_count /= 2;
        }
        self.cursor = slot;
        slot
    }

    fn reassign(&mut self, slot: usize, extension: Extension) {
        let token = token_of(slot);
        let entry = &mut self.entries[slot];
        if let Some(old) = entry.extension.take() {
            self.stats.reclaimed += 1;
            if let Some(index) = self.index.as_mut() {
                index.remove(old, token);
            }
        }
        // The reclaimed entry was the history token itself; storing it would
        // make the entry its own prefix, so it stays empty.
        if extension.prefix == token {
            trace!(token, "reclaimed history entry left empty");
            return;
        }
        entry.extension = Some(extension);
        if let Some(index) = self.index.as_mut() {
            index.insert(extension, token);
        }
    }

    fn rebuild_if_saturated(&mut self) {
        let Some(index) = self.index.as_mut() else {
            return;
        };
        if !index.is_saturated() {
            return;
        }
        let before = index.saturation();
        fill_index(index, &self.entries);
        self.stats.index_rebuilds += 1;
        debug!(before, after = index.saturation(), "rebuilt lookup index");
    }

    /// Write the phrase of `token` into `out`, last byte first.
    ///
    /// Stops when `out` is full; the literal root is written last only if
    /// there is room. Returns the number of bytes written.
    ///
    /// # Errors
    /// Returns `Error::InvalidToken` if `token` is out of range, names an
    /// empty entry, or its chain runs into an empty entry.
    pub fn read_reversed(&self, token: Token, out: &mut [u8]) -> Result<usize> {
        if !self.is_valid(token) {
            return Err(self.invalid(token));
        }
        let mut current = token;
        let mut count = 0;
        while current >= LITERAL_COUNT && count < out.len() {
            let extension = self.extension(current).ok_or_else(|| self.invalid(token))?;
            out[count] = extension.byte;
            count += 1;
            current = extension.prefix;
        }
        if current < LITERAL_COUNT && count < out.len() {
            out[count] = current as u8;
            count += 1;
        }
        Ok(count)
    }
}
