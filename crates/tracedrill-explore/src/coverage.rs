//! Read-only view of the fuzzer's coverage bitmap.
//!
//! The fuzzer publishes its *virgin* map: every byte starts at `0xFF` and has
//! bits cleared as the corresponding transitions are observed. A slot that is
//! still `0xFF` therefore says nothing new can be learned there; any other
//! value marks a transition worth satisfying.

use crate::edge::{Edge, EdgeIndexer};
use crate::error::{ConfigError, LoadError};
use std::path::Path;
use std::sync::Arc;

/// Default bitmap size (64 KB, same as AFL).
pub const MAP_SIZE: usize = 65536;

/// Byte value of a slot the fuzzer considers fully observed.
pub const UNINTERESTING: u8 = 0xFF;

/// Shared, immutable coverage bitmap of power-of-two length.
///
/// Cloning is cheap; independent filters can hold the same map.
#[derive(Clone, Debug)]
pub struct FuzzBitmap {
    map: Arc<[u8]>,
    indexer: EdgeIndexer,
}

impl FuzzBitmap {
    /// Wrap raw bitmap bytes.
    ///
    /// Fails if the buffer is empty or its length is not a power of two.
    pub fn new(map: impl Into<Arc<[u8]>>) -> Result<Self, ConfigError> {
        let map = map.into();
        if map.is_empty() {
            return Err(ConfigError::EmptyBitmap);
        }
        if !map.len().is_power_of_two() {
            return Err(ConfigError::BitmapNotPowerOfTwo { len: map.len() });
        }
        let indexer = EdgeIndexer::new(map.len());
        Ok(Self { map, indexer })
    }

    /// A [`MAP_SIZE`] bitmap with every slot set to [`UNINTERESTING`].
    ///
    /// Used when no real bitmap is supplied. Nothing passes the bitmap gate,
    /// so novelty detection is inert.
    pub fn inert() -> Self {
        Self {
            map: vec![UNINTERESTING; MAP_SIZE].into(),
            indexer: EdgeIndexer::new(MAP_SIZE),
        }
    }

    /// Read a raw bitmap file (AFL `fuzz_bitmap` layout).
    pub fn load(path: impl AsRef<Path>) -> Result<Self, LoadError> {
        let bytes = std::fs::read(path)?;
        Ok(Self::new(bytes)?)
    }

    /// Whether the fuzzer still has something to learn about `edge`.
    pub fn is_interesting(&self, edge: Edge) -> bool {
        self.is_interesting_slot(self.indexer.slot(edge))
    }

    /// Whether a precomputed slot is still interesting.
    pub fn is_interesting_slot(&self, slot: usize) -> bool {
        self.map[slot] != UNINTERESTING
    }

    /// Raw byte at the slot for `edge`.
    pub fn slot_value(&self, edge: Edge) -> u8 {
        self.map[self.indexer.slot(edge)]
    }

    pub fn indexer(&self) -> &EdgeIndexer {
        &self.indexer
    }

    /// Number of slots not marked [`UNINTERESTING`].
    pub fn interesting_slots(&self) -> usize {
        self.map.iter().filter(|&&b| b != UNINTERESTING).count()
    }

    /// True when no slot can ever pass the bitmap gate.
    pub fn is_inert(&self) -> bool {
        self.interesting_slots() == 0
    }

    pub fn len(&self) -> usize {
        self.map.len()
    }

    pub fn is_empty(&self) -> bool {
        self.map.is_empty()
    }

    pub fn as_slice(&self) -> &[u8] {
        &self.map
    }
}

impl Default for FuzzBitmap {
    fn default() -> Self {
        Self::inert()
    }
}
