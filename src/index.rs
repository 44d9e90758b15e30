//! Open-addressed lookup index over dictionary extensions.
//!
//! Maps `(prefix, byte)` to the token whose entry stores that extension.
//! Slots hold only tokens; the key of a live slot is read back from the
//! dictionary through a resolver closure, so the index never duplicates
//! entry data and never disagrees with it about what a token means.
//!
//! Deletion leaves a tombstone so later probes keep walking past it. The
//! index counts live and tombstoned slots together as its saturation; once
//! that passes 4/5 of the table the owner rebuilds it from scratch, which is
//! the only way tombstones are reclaimed.

use crate::config::Capacity;
use crate::error::Result;
use crate::{Extension, Token};

/// Odd multiplier used to spread `(prefix, byte)` across the probe sequence.
const HASH_MULTIPLIER: u32 = 16_180_319;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Slot {
    Empty,
    Tombstone,
    Live(Token),
}

/// Hash of an extension key. Deterministic across runs and instances.
pub(crate) fn hash(prefix: Token, byte: u8) -> u32 {
    let c = u32::from(byte);
    (c << 23)
        .wrapping_add(prefix << 11)
        .wrapping_add(c << 7)
        .wrapping_add(prefix)
        .wrapping_mul(HASH_MULTIPLIER)
}

/// Linear-probing hash table of `2 * capacity` slots.
#[derive(Debug)]
pub(crate) struct LookupIndex {
    slots: Vec<Slot>,
    /// Live plus tombstoned slots.
    saturation: usize,
}

impl LookupIndex {
    /// Allocate an empty index sized for `capacity`.
    pub(crate) fn new(capacity: Capacity) -> Result<Self> {
        let len = 2 * capacity.get() as usize;
        let mut slots = Vec::new();
        slots.try_reserve_exact(len)?;
        slots.resize(len, Slot::Empty);
        Ok(Self {
            slots,
            saturation: 0,
        })
    }

    fn start(&self, key: Extension) -> usize {
        hash(key.prefix, key.byte) as usize % self.slots.len()
    }

    fn next(&self, ix: usize) -> usize {
        let ix = ix + 1;
        if ix == self.slots.len() {
            0
        } else {
            ix
        }
    }

    /// Find the first live token whose current extension equals `key`.
    pub(crate) fn find<F>(&self, key: Extension, resolve: F) -> Option<Token>
    where
        F: Fn(Token) -> Option<Extension>,
    {
        let mut ix = self.start(key);
        loop {
            match self.slots[ix] {
                Slot::Empty => return None,
                Slot::Tombstone => {}
                Slot::Live(token) => {
                    if resolve(token) == Some(key) {
                        return Some(token);
                    }
                }
            }
            ix = self.next(ix);
        }
    }

    /// Record that `key` is stored as `token`.
    ///
    /// Reuses the first tombstone or empty slot on the probe path; only an
    /// empty slot adds to saturation.
    pub(crate) fn insert(&mut self, key: Extension, token: Token) {
        let mut ix = self.start(key);
        loop {
            match self.slots[ix] {
                Slot::Empty => {
                    self.slots[ix] = Slot::Live(token);
                    self.saturation += 1;
                    return;
                }
                Slot::Tombstone => {
                    self.slots[ix] = Slot::Live(token);
                    return;
                }
                Slot::Live(_) => ix = self.next(ix),
            }
        }
    }

    /// Tombstone the slot holding `token` on the probe path of `key`.
    ///
    /// A no-op when the token is not present.
    pub(crate) fn remove(&mut self, key: Extension, token: Token) {
        let mut ix = self.start(key);
        loop {
            match self.slots[ix] {
                Slot::Empty => return,
                Slot::Live(t) if t == token => {
                    self.slots[ix] = Slot::Tombstone;
                    return;
                }
                _ => ix = self.next(ix),
            }
        }
    }

    /// True once live plus tombstoned slots exceed 4/5 of the table.
    pub(crate) fn is_saturated(&self) -> bool {
        5 * self.saturation > 4 * self.slots.len()
    }

    /// Drop every mapping and tombstone.
    pub(crate) fn clear(&mut self) {
        self.slots.fill(Slot::Empty);
        self.saturation = 0;
    }

    /// Live plus tombstoned slots.
    pub(crate) fn saturation(&self) -> usize {
        self.saturation
    }

    /// Total number of slots.
    pub(crate) fn len(&self) -> usize {
        self.slots.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn ext(prefix: Token, byte: u8) -> Extension {
        Extension { prefix, byte }
    }

    #[test]
    fn test_hash_is_stable() {
        assert_eq!(hash(65, b'B'), hash(65, b'B'));
        assert_ne!(hash(65, b'B'), hash(66, b'A'));
        // Pinned so index layout stays reproducible across releases.
        let expected = ((66u32 << 23) + (65 << 11) + (66 << 7) + 65).wrapping_mul(HASH_MULTIPLIER);
        assert_eq!(hash(65, b'B'), expected);
    }

    #[test]
    fn test_insert_find_remove() {
        let mut index = LookupIndex::new(Capacity::new(512).unwrap()).unwrap();
        let mut table = HashMap::new();
        table.insert(256, ext(65, b'B'));
        table.insert(257, ext(66, b'A'));
        let resolve = |t: Token| table.get(&t).copied();

        assert_eq!(index.find(ext(65, b'B'), resolve), None);
        index.insert(ext(65, b'B'), 256);
        index.insert(ext(66, b'A'), 257);
        assert_eq!(index.find(ext(65, b'B'), resolve), Some(256));
        assert_eq!(index.find(ext(66, b'A'), resolve), Some(257));
        assert_eq!(index.saturation(), 2);

        index.remove(ext(65, b'B'), 256);
        assert_eq!(index.find(ext(65, b'B'), resolve), None);
        assert_eq!(index.find(ext(66, b'A'), resolve), Some(257));
        // Tombstones still count until a rebuild.
        assert_eq!(index.saturation(), 2);
    }

    #[test]
    fn test_probe_walks_past_tombstones() {
        let mut index = LookupIndex::new(Capacity::new(256).unwrap()).unwrap();
        // Same key stored three times forces a shared probe path.
        let key = ext(300, b'x');
        let mut table = HashMap::new();
        for token in [256, 257, 258] {
            table.insert(token, key);
            index.insert(key, token);
        }
        index.remove(key, 256);
        index.remove(key, 257);
        assert_eq!(index.find(key, |t| table.get(&t).copied()), Some(258));

        // A stale slot whose entry changed meaning is skipped, not returned.
        table.insert(258, ext(1, b'y'));
        assert_eq!(index.find(key, |t| table.get(&t).copied()), None);

        // Reinsertion fills a tombstone without growing saturation.
        index.insert(key, 259);
        assert_eq!(index.saturation(), 3);
    }

    #[test]
    fn test_saturation_threshold() {
        let mut index = LookupIndex::new(Capacity::new(256).unwrap()).unwrap();
        assert_eq!(index.len(), 512);
        for i in 0..409u32 {
            index.insert(ext(i, (i % 251) as u8), 256 + i);
        }
        assert!(!index.is_saturated());
        index.insert(ext(1000, 0), 1000);
        assert!(index.is_saturated());
        index.clear();
        assert_eq!(index.saturation(), 0);
        assert!(!index.is_saturated());
    }

    #[test]
    fn test_remove_missing_is_noop() {
        let mut index = LookupIndex::new(Capacity::new(256).unwrap()).unwrap();
        index.insert(ext(65, b'A'), 256);
        index.remove(ext(65, b'A'), 999);
        assert_eq!(index.find(ext(65, b'A'), |_| Some(ext(65, b'A'))), Some(256));
    }
}
