use bitvec::prelude::*;
use std::fmt;

use crate::spatial::tiles::PatternId;

/// Fixed-size bitset over pattern ids
///
/// Backs cell domains in the wave and compatibility rows in the adjacency
/// index. Provides O(1) membership testing and efficient set operations.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PatternBitset {
    bits: BitVec,
}

impl PatternBitset {
    /// Create a bitset with no patterns present
    pub fn new(pattern_count: usize) -> Self {
        Self {
            bits: bitvec![0; pattern_count],
        }
    }

    /// Create a bitset containing every pattern
    pub fn all(pattern_count: usize) -> Self {
        Self {
            bits: bitvec![1; pattern_count],
        }
    }

    /// Number of pattern ids this set can hold
    pub fn capacity(&self) -> usize {
        self.bits.len()
    }

    /// Insert a pattern id, returning whether it was newly added
    ///
    /// Out of range ids are ignored.
    pub fn insert(&mut self, pattern: PatternId) -> bool {
        if pattern < self.bits.len() && !self.contains(pattern) {
            self.bits.set(pattern, true);
            true
        } else {
            false
        }
    }

    /// Remove a pattern id, returning whether it was present
    pub fn remove(&mut self, pattern: PatternId) -> bool {
        if self.contains(pattern) {
            self.bits.set(pattern, false);
            true
        } else {
            false
        }
    }

    /// Test pattern membership
    pub fn contains(&self, pattern: PatternId) -> bool {
        self.bits.get(pattern).as_deref() == Some(&true)
    }

    /// Test if no patterns are present
    pub fn is_empty(&self) -> bool {
        self.bits.not_any()
    }

    /// Count patterns in the set
    pub fn count(&self) -> usize {
        self.bits.count_ones()
    }

    /// Lowest pattern id in the set
    pub fn first(&self) -> Option<PatternId> {
        self.bits.first_one()
    }

    /// Iterate over present pattern ids in ascending order
    pub fn iter(&self) -> impl Iterator<Item = PatternId> + '_ {
        self.bits.iter_ones()
    }

    /// Extract all pattern ids as a vector
    pub fn to_vec(&self) -> Vec<PatternId> {
        self.iter().collect()
    }

    /// Build a bitset from a list of ids
    pub fn from_ids(ids: &[PatternId], pattern_count: usize) -> Self {
        let mut bitset = Self::new(pattern_count);
        for &id in ids {
            bitset.insert(id);
        }
        bitset
    }
}

impl fmt::Display for PatternBitset {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PatternBitset({} patterns: {:?})", self.count(), self.to_vec())
    }
}
