use rand::{Rng, SeedableRng, rngs::StdRng};

use crate::io::configuration::ENTROPY_TIE_EPSILON;
use crate::spatial::grid::{CellIndex, WaveGrid};
use crate::spatial::tiles::PatternId;

/// How to choose between cells of equal minimum entropy
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TieBreak {
    /// Lowest row-major index wins
    #[default]
    RowMajor,
    /// Uniform seeded choice among the tied cells
    Random,
}

/// Seeded random selector for reproducible stochastic choices
#[derive(Debug, Clone)]
pub struct RandomSelector {
    rng: StdRng,
}

impl RandomSelector {
    /// Create a deterministic random selector
    pub fn new(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }

    /// Generic weighted random selection
    ///
    /// Returns index into weights array using cumulative distribution
    pub fn weighted_choice(&mut self, weights: &[f64]) -> usize {
        let total: f64 = weights.iter().sum();
        if total <= 0.0 {
            return 0;
        }

        let mut rand_val = self.rng.random::<f64>() * total;
        for (i, &weight) in weights.iter().enumerate() {
            rand_val -= weight;
            if rand_val <= 0.0 {
                return i;
            }
        }
        weights.len().saturating_sub(1)
    }

    /// Uniform index in `0..len`, or 0 for an empty range
    pub fn uniform_index(&mut self, len: usize) -> usize {
        if len == 0 {
            0
        } else {
            self.rng.random_range(0..len)
        }
    }
}

/// Pick the unresolved cell with the lowest positive entropy
///
/// Resolved cells (one candidate) and emptied cells are skipped. Returns
/// `None` once no cell is left to collapse.
pub fn select_min_entropy(
    grid: &WaveGrid,
    tie_break: TieBreak,
    selector: &mut RandomSelector,
) -> Option<CellIndex> {
    let mut best = f64::INFINITY;
    let mut tied: Vec<CellIndex> = Vec::new();

    for cell in 0..grid.cell_count() {
        if grid.domain_size(cell) <= 1 {
            continue;
        }
        let entropy = grid.entropy(cell);
        if entropy < best - ENTROPY_TIE_EPSILON {
            best = entropy;
            tied.clear();
            tied.push(cell);
        } else if entropy <= best + ENTROPY_TIE_EPSILON {
            tied.push(cell);
        }
    }

    match tie_break {
        TieBreak::RowMajor => tied.first().copied(),
        TieBreak::Random => {
            let choice = selector.uniform_index(tied.len());
            tied.get(choice).copied()
        }
    }
}

/// Sample one candidate of a cell in proportion to its pattern weight
pub fn choose_pattern(
    grid: &WaveGrid,
    cell: CellIndex,
    selector: &mut RandomSelector,
) -> Option<PatternId> {
    let candidates = grid.candidates(cell)?.to_vec();
    let weights: Vec<f64> = candidates
        .iter()
        .map(|&id| grid.weights().get(id).copied().unwrap_or(0.0))
        .collect();
    let index = selector.weighted_choice(&weights);
    candidates.get(index).copied()
}
