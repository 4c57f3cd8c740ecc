use ndarray::Array2;
use std::collections::VecDeque;

use crate::io::error::{Result, SynthesisError};
use crate::spatial::adjacency::AdjacencyIndex;
use crate::spatial::direction::{DIRECTION_COUNT, Direction};
use crate::spatial::grid::{CellIndex, WaveGrid};
use crate::spatial::tiles::PatternId;

/// Constraint propagation over a wave using per-direction support counts
///
/// `support[(cell, q)][d]` counts the candidates of the neighbour at
/// `cell - d` that allow `q` at `cell`. When a pattern leaves a cell, its
/// compatible neighbours lose one supporter; a candidate whose count hits
/// zero in any direction is removed in turn. Removals are processed from a
/// FIFO worklist, so propagation is breadth-first and never recurses.
#[derive(Debug, Clone)]
pub struct Propagator {
    support: Array2<[u32; DIRECTION_COUNT]>,
    worklist: VecDeque<(CellIndex, PatternId)>,
}

impl Propagator {
    /// Seed support counts for a fresh wave and prune unsupported candidates
    ///
    /// A pattern whose compatibility list is empty towards an existing
    /// neighbour can never be placed, so it is removed from that cell right
    /// away and the removal is propagated.
    ///
    /// # Errors
    ///
    /// Returns `Contradiction` if the initial pruning empties a cell.
    pub fn new(grid: &mut WaveGrid, adjacency: &AdjacencyIndex) -> Result<Self> {
        let cells = grid.cell_count();
        let patterns = adjacency.pattern_count();

        let mut initial = Vec::with_capacity(patterns);
        for pattern in 0..patterns {
            initial.push(Direction::ALL.map(|direction| {
                // Supporters of `pattern` from `direction` sit on the opposite side
                u32::try_from(adjacency.compatible(pattern, direction.opposite()).len())
                    .unwrap_or(u32::MAX)
            }));
        }

        let support = Array2::from_shape_fn((cells, patterns), |(_, pattern)| {
            initial.get(pattern).copied().unwrap_or([0; DIRECTION_COUNT])
        });

        let mut propagator = Self {
            support,
            worklist: VecDeque::new(),
        };

        for cell in 0..cells {
            for pattern in 0..patterns {
                let unsupported = Direction::ALL.into_iter().any(|direction| {
                    grid.neighbor(cell, direction.opposite()).is_some()
                        && propagator.support_count(cell, pattern, direction) == 0
                });
                if unsupported {
                    propagator.ban(grid, cell, pattern);
                }
            }
        }

        propagator.propagate(grid, adjacency)?;
        Ok(propagator)
    }

    /// Remaining supporters of `pattern` at `cell` from `direction`
    pub fn support_count(&self, cell: CellIndex, pattern: PatternId, direction: Direction) -> u32 {
        self.support
            .get((cell, pattern))
            .and_then(|counts| counts.get(direction.index()))
            .copied()
            .unwrap_or(0)
    }

    /// Number of removals waiting to be propagated
    pub fn pending(&self) -> usize {
        self.worklist.len()
    }

    /// Remove a candidate from a cell and queue the removal
    ///
    /// Returns whether the domain changed.
    pub fn ban(&mut self, grid: &mut WaveGrid, cell: CellIndex, pattern: PatternId) -> bool {
        if !grid.restrict(cell, pattern) {
            return false;
        }
        self.enqueue_removed(cell, &[pattern]);
        true
    }

    /// Queue patterns that were already removed from a cell
    ///
    /// Used after `WaveGrid::collapse`, which removes candidates directly.
    pub fn enqueue_removed(&mut self, cell: CellIndex, removed: &[PatternId]) {
        for &pattern in removed {
            if let Some(counts) = self.support.get_mut((cell, pattern)) {
                *counts = [0; DIRECTION_COUNT];
            }
            self.worklist.push_back((cell, pattern));
        }
    }

    /// Collapse a cell onto one pattern and queue every removed candidate
    pub fn collapse(&mut self, grid: &mut WaveGrid, cell: CellIndex, pattern: PatternId) {
        let removed = grid.collapse(cell, pattern);
        self.enqueue_removed(cell, &removed);
    }

    /// Drain the worklist until no further candidate can be removed
    ///
    /// Running it again on a stable wave changes nothing.
    ///
    /// # Errors
    ///
    /// Returns `Contradiction` with the emptied cell as soon as a domain
    /// becomes empty. The wave is left mid-propagation and must be discarded.
    pub fn propagate(&mut self, grid: &mut WaveGrid, adjacency: &AdjacencyIndex) -> Result<()> {
        if let Some(cell) = first_empty_cell(grid) {
            self.worklist.clear();
            return Err(SynthesisError::Contradiction { cell });
        }

        while let Some((cell, pattern)) = self.worklist.pop_front() {
            for direction in Direction::ALL {
                let Some(neighbour) = grid.neighbor(cell, direction) else {
                    continue;
                };

                for &candidate in adjacency.compatible(pattern, direction) {
                    let exhausted = self
                        .support
                        .get_mut((neighbour, candidate))
                        .and_then(|counts| counts.get_mut(direction.index()))
                        .is_some_and(|count| {
                            if *count == 0 {
                                return false;
                            }
                            *count -= 1;
                            *count == 0
                        });

                    if exhausted
                        && self.ban(grid, neighbour, candidate)
                        && grid.domain_size(neighbour) == 0
                    {
                        self.worklist.clear();
                        return Err(SynthesisError::Contradiction { cell: neighbour });
                    }
                }
            }
        }
        Ok(())
    }
}

fn first_empty_cell(grid: &WaveGrid) -> Option<CellIndex> {
    if !grid.has_contradiction() {
        return None;
    }
    (0..grid.cell_count()).find(|&cell| grid.domain_size(cell) == 0)
}
