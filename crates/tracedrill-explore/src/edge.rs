//! Control-flow edges and AFL-compatible bitmap indexing.
//!
//! The fuzzer instruments each basic block with
//! `cur = (addr >> 4) ^ (addr << 8)` masked to the map size, and records the
//! transition at `map[cur ^ prev]` before setting `prev = cur >> 1`. The
//! functions here reproduce that scheme bit-for-bit so that a slot looked up
//! on the symbolic side is the slot the fuzzer would have bumped.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A control-flow transition between two basic-block addresses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct Edge {
    /// Address of the block the transition leaves.
    pub prev: u64,
    /// Address of the block the transition enters.
    pub cur: u64,
}

impl Edge {
    pub fn new(prev: u64, cur: u64) -> Self {
        Self { prev, cur }
    }
}

impl From<(u64, u64)> for Edge {
    fn from((prev, cur): (u64, u64)) -> Self {
        Self { prev, cur }
    }
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#x} -> {:#x}", self.prev, self.cur)
    }
}

/// Scramble a block address into a bitmap index.
///
/// `map_size` must be a power of two; other sizes silently produce wrong
/// indices. [`FuzzBitmap`](crate::coverage::FuzzBitmap) rejects such sizes
/// at construction.
#[inline]
pub fn encode(addr: u64, map_size: usize) -> usize {
    let v = (addr >> 4) ^ (addr << 8);
    (v & (map_size as u64 - 1)) as usize
}

/// Computes bitmap slots for transitions over a map of fixed size.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EdgeIndexer {
    map_size: usize,
}

impl EdgeIndexer {
    /// `map_size` must be a power of two.
    pub fn new(map_size: usize) -> Self {
        debug_assert!(map_size.is_power_of_two());
        Self { map_size }
    }

    pub fn map_size(&self) -> usize {
        self.map_size
    }

    /// Index contributed by the block a transition leaves (shifted by one,
    /// like the fuzzer's `prev_loc`).
    #[inline]
    pub fn prev_index(&self, addr: u64) -> usize {
        encode(addr, self.map_size) >> 1
    }

    /// Index contributed by the block a transition enters.
    #[inline]
    pub fn cur_index(&self, addr: u64) -> usize {
        encode(addr, self.map_size)
    }

    /// Bitmap slot for a transition.
    #[inline]
    pub fn slot(&self, edge: Edge) -> usize {
        self.prev_index(edge.prev) ^ self.cur_index(edge.cur)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAP: usize = 65536;

    #[test]
    fn test_encode_known_values() {
        // 0x1000: (0x100) ^ (0x100000) = 0x100100, masked to 0x0100
        assert_eq!(encode(0x1000, MAP), 0x0100);
        // 0x2000: (0x200) ^ (0x200000) = 0x200200, masked to 0x0200
        assert_eq!(encode(0x2000, MAP), 0x0200);
        // 0x1234: (0x123) ^ (0x123400) = 0x123523, masked to 0x3523
        assert_eq!(encode(0x1234, MAP), 0x3523);
    }

    #[test]
    fn test_encode_high_bits_shift_out() {
        // Bits shifted past 64 never survive the mask anyway.
        let addr = 0xffff_ffff_ffff_fff0u64;
        let wide = ((addr as u128 >> 4) ^ ((addr as u128) << 8)) & (MAP as u128 - 1);
        assert_eq!(encode(addr, MAP), wide as usize);
    }

    #[test]
    fn test_encode_respects_small_maps() {
        for addr in [0u64, 0x10, 0x4005d0, 0xdead_beef] {
            assert!(encode(addr, 256) < 256);
        }
    }

    #[test]
    fn test_prev_index_is_shifted() {
        let indexer = EdgeIndexer::new(MAP);
        assert_eq!(indexer.prev_index(0x1000), 0x0080);
        assert_eq!(indexer.cur_index(0x1000), 0x0100);
    }

    #[test]
    fn test_slot_is_asymmetric() {
        let indexer = EdgeIndexer::new(MAP);
        let forward = indexer.slot(Edge::new(0x1000, 0x2000));
        let backward = indexer.slot(Edge::new(0x2000, 0x1000));
        assert_eq!(forward, 0x0080 ^ 0x0200);
        assert_eq!(backward, 0x0100 ^ 0x0100);
        assert_ne!(forward, backward);
    }

    #[test]
    fn test_edge_display_and_order() {
        let a = Edge::new(0x1000, 0x1004);
        let b: Edge = (0x1000, 0x2000).into();
        assert_eq!(a.to_string(), "0x1000 -> 0x1004");
        assert!(a < b);
        assert_eq!(b, Edge::new(0x1000, 0x2000));
    }
}
