//! Dictionary capacity and run configuration.

use crate::error::{Error, Result};
use crate::LITERAL_COUNT;

/// Smallest supported code width in bits.
pub const MIN_CODE_BITS: u32 = 8;

/// Largest supported code width in bits.
pub const MAX_CODE_BITS: u32 = 24;

/// Code width used when nothing else is configured.
///
/// 15 bits keeps framed tokens at two octets with room for the boundary marker.
pub const DEFAULT_CODE_BITS: u32 = 15;

/// A validated dictionary capacity: a power of two in `[2^8, 2^24]`.
///
/// Tokens `0..capacity` are addressable; tokens `0..256` are literal bytes
/// and the remaining `capacity - 256` name dictionary entries.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Capacity(u32);

impl Capacity {
    /// Validate a raw capacity.
    ///
    /// # Errors
    /// Returns `Error::InvalidCapacity` if `capacity` is not a power of two
    /// between `2^8` and `2^24` inclusive.
    pub fn new(capacity: u32) -> Result<Self> {
        let in_range = ((1 << MIN_CODE_BITS)..=(1 << MAX_CODE_BITS)).contains(&capacity);
        if !in_range || !capacity.is_power_of_two() {
            return Err(Error::InvalidCapacity(capacity));
        }
        Ok(Self(capacity))
    }

    /// Capacity for a code width of `bits`, i.e. `1 << bits`.
    pub fn from_code_bits(bits: u32) -> Result<Self> {
        if !(MIN_CODE_BITS..=MAX_CODE_BITS).contains(&bits) {
            return Err(Error::InvalidCodeBits(bits));
        }
        Ok(Self(1 << bits))
    }

    /// Raw capacity value.
    pub fn get(self) -> u32 {
        self.0
    }

    /// Bits needed to represent `capacity - 1`, the largest token.
    pub fn code_bits(self) -> u32 {
        self.0.trailing_zeros()
    }

    /// Number of dictionary entries (`capacity - 256`).
    pub fn slot_count(self) -> usize {
        (self.0 - LITERAL_COUNT) as usize
    }
}

impl Default for Capacity {
    fn default() -> Self {
        Self(1 << DEFAULT_CODE_BITS)
    }
}

impl TryFrom<u32> for Capacity {
    type Error = Error;

    fn try_from(capacity: u32) -> Result<Self> {
        Self::new(capacity)
    }
}

/// Configuration for chunked compression and decompression.
///
/// Both sides of a stream must agree on `capacity`; nothing about it is
/// stored in the framed output.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Config {
    /// Dictionary capacity used by every chunk.
    pub capacity: Capacity,
    /// Number of independent chunks (and parallel workers) to split input into.
    pub workers: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            capacity: Capacity::default(),
            workers: 1,
        }
    }
}

impl Config {
    /// Creates a configuration with the given capacity and one worker.
    pub fn new(capacity: Capacity) -> Self {
        Self {
            capacity,
            ..Default::default()
        }
    }

    /// Sets the dictionary capacity.
    pub fn with_capacity(mut self, capacity: Capacity) -> Self {
        self.capacity = capacity;
        self
    }

    /// Sets the worker count.
    pub fn with_workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Checks the configuration before a run.
    pub fn validate(&self) -> Result<()> {
        if self.workers == 0 {
            return Err(Error::InvalidWorkers);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_capacity_bounds() {
        assert!(Capacity::new(256).is_ok());
        assert!(Capacity::new(1 << 24).is_ok());
        assert!(matches!(Capacity::new(128), Err(Error::InvalidCapacity(128))));
        assert!(matches!(
            Capacity::new((1 << 24) * 2),
            Err(Error::InvalidCapacity(_))
        ));
        assert!(matches!(
            Capacity::new(65535),
            Err(Error::InvalidCapacity(65535))
        ));
        assert!(matches!(Capacity::new(0), Err(Error::InvalidCapacity(0))));
    }

    #[test]
    fn test_capacity_code_bits() {
        let cap = Capacity::from_code_bits(9).unwrap();
        assert_eq!(cap.get(), 512);
        assert_eq!(cap.code_bits(), 9);
        assert_eq!(cap.slot_count(), 256);
        assert!(matches!(
            Capacity::from_code_bits(25),
            Err(Error::InvalidCodeBits(25))
        ));
        assert!(matches!(
            Capacity::from_code_bits(7),
            Err(Error::InvalidCodeBits(7))
        ));
    }

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.capacity.get(), 1 << 15);
        assert_eq!(config.workers, 1);
        assert!(config.validate().is_ok());
        assert!(matches!(
            config.with_workers(0).validate(),
            Err(Error::InvalidWorkers)
        ));
    }
}
