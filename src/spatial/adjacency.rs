//! Precomputed pattern compatibility per direction
//!
//! Two patterns are compatible in a direction when the region where they
//! overlap, once the second is shifted one cell that way, holds identical
//! tiles. The table is computed once per catalog and only read afterwards.

use ndarray::Array2;

use crate::algorithm::bitset::PatternBitset;
use crate::io::error::{Result, invalid_config};
use crate::spatial::direction::{DIRECTION_COUNT, Direction};
use crate::spatial::tiles::{PatternCatalog, PatternId, TileValue};

/// Compatible neighbours of one pattern, indexed by `Direction::index`
pub type CompatibilityRow = [Vec<PatternId>; DIRECTION_COUNT];

/// Compatibility lookup for every `(pattern, direction)` pair
///
/// Lists are kept for iteration during propagation and bitsets for O(1)
/// membership queries. Symmetric by construction: `b` is compatible with
/// `a` towards `d` exactly when `a` is compatible with `b` towards
/// `d.opposite()`.
#[derive(Debug, Clone)]
pub struct AdjacencyIndex {
    compatible: Vec<CompatibilityRow>,
    lookup: Vec<[PatternBitset; DIRECTION_COUNT]>,
}

impl AdjacencyIndex {
    /// Derive the compatibility table from a pattern catalog
    pub fn build<T: TileValue>(catalog: &PatternCatalog<T>) -> Self {
        let patterns = catalog.patterns();
        let compatible: Vec<CompatibilityRow> = patterns
            .iter()
            .map(|first| {
                Direction::ALL.map(|direction| {
                    patterns
                        .iter()
                        .enumerate()
                        .filter(|(_, second)| agrees(first, second, direction))
                        .map(|(id, _)| id)
                        .collect()
                })
            })
            .collect();

        Self::from_rows(compatible)
    }

    /// Build an index from an explicit compatibility table
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the table names a pattern id outside
    /// `0..table.len()` or is not symmetric.
    pub fn from_table(table: Vec<CompatibilityRow>) -> Result<Self> {
        let pattern_count = table.len();
        for (pattern, row) in table.iter().enumerate() {
            for neighbours in row {
                if let Some(&bad) = neighbours.iter().find(|&&id| id >= pattern_count) {
                    return Err(invalid_config(
                        "compatibility",
                        &bad,
                        &format!("pattern {pattern} lists an id outside 0..{pattern_count}"),
                    ));
                }
            }
        }

        let index = Self::from_rows(
            table
                .into_iter()
                .map(|row| {
                    row.map(|mut neighbours| {
                        neighbours.sort_unstable();
                        neighbours.dedup();
                        neighbours
                    })
                })
                .collect(),
        );

        if let Some((a, direction, b)) = index.first_asymmetry() {
            return Err(invalid_config(
                "compatibility",
                &format!("{a} -> {b} ({direction:?})"),
                &"table is not symmetric under opposite directions",
            ));
        }
        Ok(index)
    }

    fn from_rows(compatible: Vec<CompatibilityRow>) -> Self {
        let pattern_count = compatible.len();
        let lookup = compatible
            .iter()
            .map(|row| {
                row.each_ref()
                    .map(|ids| PatternBitset::from_ids(ids, pattern_count))
            })
            .collect();

        Self { compatible, lookup }
    }

    /// Number of patterns covered by the table
    pub fn pattern_count(&self) -> usize {
        self.compatible.len()
    }

    /// Patterns that may sit next to `pattern` in `direction`
    pub fn compatible(&self, pattern: PatternId, direction: Direction) -> &[PatternId] {
        self.compatible
            .get(pattern)
            .and_then(|row| row.get(direction.index()))
            .map(Vec::as_slice)
            .unwrap_or_default()
    }

    /// O(1) test whether `neighbour` may sit next to `pattern` in `direction`
    pub fn is_compatible(
        &self,
        pattern: PatternId,
        direction: Direction,
        neighbour: PatternId,
    ) -> bool {
        self.lookup
            .get(pattern)
            .and_then(|row| row.get(direction.index()))
            .is_some_and(|set| set.contains(neighbour))
    }

    /// Every `(pattern, direction)` pair with no compatible neighbour
    ///
    /// Such a catalog is still valid, but any cell that would need that
    /// neighbour is pruned during initialization.
    pub fn degenerate_pairs(&self) -> Vec<(PatternId, Direction)> {
        let mut pairs = Vec::new();
        for (pattern, row) in self.compatible.iter().enumerate() {
            for direction in Direction::ALL {
                if row.get(direction.index()).is_none_or(Vec::is_empty) {
                    pairs.push((pattern, direction));
                }
            }
        }
        pairs
    }

    /// Whether `b ∈ compat(a, d) ⇔ a ∈ compat(b, opposite(d))` holds everywhere
    pub fn is_symmetric(&self) -> bool {
        self.first_asymmetry().is_none()
    }

    fn first_asymmetry(&self) -> Option<(PatternId, Direction, PatternId)> {
        for pattern in 0..self.pattern_count() {
            for direction in Direction::ALL {
                for &neighbour in self.compatible(pattern, direction) {
                    if !self.is_compatible(neighbour, direction.opposite(), pattern) {
                        return Some((pattern, direction, neighbour));
                    }
                }
            }
        }
        None
    }
}

/// Whether `second`, shifted one cell towards `direction`, overlaps `first` consistently
///
/// Compares the `(N - |dy|) × (N - |dx|)` region where the two patterns
/// cover the same tiles: `first[y][x]` against `second[y - dy][x - dx]`.
pub fn agrees<T: PartialEq>(first: &Array2<T>, second: &Array2<T>, direction: Direction) -> bool {
    let (dy, dx) = direction.offset();
    let (rows, cols) = first.dim();
    let (rows, cols) = (rows as isize, cols as isize);

    for y in dy.max(0)..(rows + dy).min(rows) {
        for x in dx.max(0)..(cols + dx).min(cols) {
            let here = first.get((y as usize, x as usize));
            let there = second.get(((y - dy) as usize, (x - dx) as usize));
            if here.is_none() || here != there {
                return false;
            }
        }
    }
    true
}
