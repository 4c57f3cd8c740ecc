//! Wave state: per-cell candidate domains with memoized entropy
//!
//! Cells live in a flat row-major arena and are addressed by integer index.
//! Each cell keeps the running sums needed to update its Shannon entropy in
//! O(1) when a candidate is removed. Domains never grow.

use ndarray::Array2;
use std::sync::Arc;

use crate::algorithm::bitset::PatternBitset;
use crate::io::error::{Result, invalid_config};
use crate::math::probability::{entropy_from_sums, plogp};
use crate::spatial::direction::Direction;
use crate::spatial::tiles::PatternId;

/// Flat row-major index of a wave cell
pub type CellIndex = usize;

/// Running sums over the candidates still present in a cell
#[derive(Debug, Clone, Copy)]
struct CellMemo {
    weight_sum: f64,
    plogp_sum: f64,
    candidates: usize,
}

/// Superposition state of every output cell
#[derive(Debug, Clone)]
pub struct WaveGrid {
    rows: usize,
    cols: usize,
    periodic: bool,
    weights: Arc<[f64]>,
    plogp_weights: Vec<f64>,
    domains: Vec<PatternBitset>,
    memo: Vec<CellMemo>,
    entropy: Array2<f64>,
    contradiction: bool,
}

impl WaveGrid {
    /// Create a wave where every cell may hold every pattern
    ///
    /// With `periodic` the wave is a torus and neighbours wrap around the
    /// edges; otherwise border cells simply have fewer neighbours.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if either dimension is zero, the weight table
    /// is empty, or any weight is not a positive finite number.
    pub fn new(rows: usize, cols: usize, weights: Arc<[f64]>, periodic: bool) -> Result<Self> {
        if rows == 0 || cols == 0 {
            return Err(invalid_config(
                "wave",
                &format!("{rows}x{cols}"),
                &"wave must contain at least one cell",
            ));
        }
        if weights.is_empty() {
            return Err(invalid_config(
                "weights",
                &0,
                &"at least one pattern is required",
            ));
        }
        if let Some(bad) = weights.iter().find(|w| !w.is_finite() || **w <= 0.0) {
            return Err(invalid_config(
                "weights",
                bad,
                &"pattern weights must be positive and finite",
            ));
        }

        let pattern_count = weights.len();
        let plogp_weights: Vec<f64> = weights.iter().map(|&w| plogp(w)).collect();
        let initial = CellMemo {
            weight_sum: weights.iter().sum(),
            plogp_sum: plogp_weights.iter().sum(),
            candidates: pattern_count,
        };
        let initial_entropy = if pattern_count > 1 {
            entropy_from_sums(initial.weight_sum, initial.plogp_sum)
        } else {
            0.0
        };

        Ok(Self {
            rows,
            cols,
            periodic,
            weights,
            plogp_weights,
            domains: vec![PatternBitset::all(pattern_count); rows * cols],
            memo: vec![initial; rows * cols],
            entropy: Array2::from_elem((rows, cols), initial_entropy),
            contradiction: false,
        })
    }

    /// Number of rows
    pub const fn rows(&self) -> usize {
        self.rows
    }

    /// Number of columns
    pub const fn cols(&self) -> usize {
        self.cols
    }

    /// Total number of cells
    pub const fn cell_count(&self) -> usize {
        self.rows * self.cols
    }

    /// Number of patterns each domain ranges over
    pub fn pattern_count(&self) -> usize {
        self.weights.len()
    }

    /// Whether neighbours wrap around the edges
    pub const fn is_periodic(&self) -> bool {
        self.periodic
    }

    /// Pattern weights shared with the catalog
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Flat index of a `[row, col]` position
    pub const fn index_of(&self, position: [usize; 2]) -> Option<CellIndex> {
        if position[0] < self.rows && position[1] < self.cols {
            Some(position[0] * self.cols + position[1])
        } else {
            None
        }
    }

    /// `[row, col]` position of a flat index
    pub const fn position(&self, cell: CellIndex) -> [usize; 2] {
        [cell / self.cols, cell % self.cols]
    }

    /// Neighbouring cell in a direction, wrapping when periodic
    pub fn neighbor(&self, cell: CellIndex, direction: Direction) -> Option<CellIndex> {
        if cell >= self.cell_count() {
            return None;
        }
        let [row, col] = self.position(cell);
        let (dy, dx) = direction.offset();
        let row = self.shift(row, dy, self.rows)?;
        let col = self.shift(col, dx, self.cols)?;
        Some(row * self.cols + col)
    }

    const fn shift(&self, value: usize, delta: isize, extent: usize) -> Option<usize> {
        let target = value as isize + delta;
        if self.periodic {
            Some(target.rem_euclid(extent as isize) as usize)
        } else if target >= 0 && target < extent as isize {
            Some(target as usize)
        } else {
            None
        }
    }

    /// Candidate patterns still possible in a cell
    pub fn candidates(&self, cell: CellIndex) -> Option<&PatternBitset> {
        self.domains.get(cell)
    }

    /// Number of candidates still possible in a cell
    pub fn domain_size(&self, cell: CellIndex) -> usize {
        self.memo.get(cell).map_or(0, |memo| memo.candidates)
    }

    /// Domain size of every cell in index order
    pub fn domain_sizes(&self) -> Vec<usize> {
        self.memo.iter().map(|memo| memo.candidates).collect()
    }

    /// Shannon entropy over the weights of a cell's candidates
    ///
    /// Zero for resolved and contradicted cells.
    pub fn entropy(&self, cell: CellIndex) -> f64 {
        self.entropy
            .get(self.position(cell))
            .copied()
            .unwrap_or(0.0)
    }

    /// Remove one candidate from a cell
    ///
    /// Returns whether the domain changed. Emptying a domain raises the
    /// contradiction flag.
    pub fn restrict(&mut self, cell: CellIndex, pattern: PatternId) -> bool {
        let removed = self
            .domains
            .get_mut(cell)
            .is_some_and(|domain| domain.remove(pattern));
        if !removed {
            return false;
        }

        let weight = self.weights.get(pattern).copied().unwrap_or(0.0);
        let weight_plogp = self.plogp_weights.get(pattern).copied().unwrap_or(0.0);
        let Some(memo) = self.memo.get_mut(cell) else {
            return true;
        };
        memo.weight_sum -= weight;
        memo.plogp_sum -= weight_plogp;
        memo.candidates -= 1;

        let memo = *memo;
        let entropy = if memo.candidates > 1 {
            entropy_from_sums(memo.weight_sum, memo.plogp_sum)
        } else {
            0.0
        };
        let position = self.position(cell);
        if let Some(value) = self.entropy.get_mut(position) {
            *value = entropy;
        }

        if memo.candidates == 0 {
            self.contradiction = true;
        }
        true
    }

    /// Reduce a cell's domain to a single pattern
    ///
    /// Returns every pattern that was removed. Collapsing onto a pattern that
    /// is no longer a candidate empties the cell.
    pub fn collapse(&mut self, cell: CellIndex, pattern: PatternId) -> Vec<PatternId> {
        let others: Vec<PatternId> = self
            .domains
            .get(cell)
            .map(|domain| domain.iter().filter(|&id| id != pattern).collect())
            .unwrap_or_default();

        for &other in &others {
            self.restrict(cell, other);
        }
        others
    }

    /// The single remaining pattern of a resolved cell
    pub fn resolved_pattern(&self, cell: CellIndex) -> Option<PatternId> {
        if self.domain_size(cell) == 1 {
            self.domains.get(cell).and_then(PatternBitset::first)
        } else {
            None
        }
    }

    /// Whether some cell has no candidate left
    pub const fn has_contradiction(&self) -> bool {
        self.contradiction
    }

    /// Whether every cell holds exactly one candidate
    pub fn is_resolved(&self) -> bool {
        !self.contradiction && self.memo.iter().all(|memo| memo.candidates == 1)
    }

    /// Resolved pattern id of every cell, or `None` while any cell is open
    pub fn to_pattern_grid(&self) -> Option<Array2<PatternId>> {
        if !self.is_resolved() {
            return None;
        }
        let ids = (0..self.cell_count())
            .map(|cell| self.resolved_pattern(cell))
            .collect::<Option<Vec<_>>>()?;
        Array2::from_shape_vec((self.rows, self.cols), ids).ok()
    }
}
