use ndarray::Array2;
use rayon::prelude::*;
use std::sync::Arc;

use crate::{
    algorithm::propagation::Propagator,
    algorithm::selection::{RandomSelector, TieBreak, choose_pattern, select_min_entropy},
    io::configuration::{
        DEFAULT_MAX_RETRIES, DEFAULT_OUTPUT_SIZE, DEFAULT_PATTERN_SIZE, DEFAULT_SEED,
        DEFAULT_SYMMETRY, DEFAULT_VARIANT_COUNT, MAX_GRID_DIMENSION, MAX_SYMMETRY,
        VARIANT_SEED_STRIDE,
    },
    io::error::{Result, SynthesisError, invalid_config},
    spatial::adjacency::AdjacencyIndex,
    spatial::grid::{CellIndex, WaveGrid},
    spatial::tiles::{PatternCatalog, PatternId, TileValue},
};

/// Parameters of a synthesis run
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SynthesisConfig {
    /// Output height in tiles
    pub output_height: usize,
    /// Output width in tiles
    pub output_width: usize,
    /// Side length N of extracted patterns
    pub pattern_size: usize,
    /// Number of symmetry variants per window, in `1..=8`
    pub symmetry: usize,
    /// Number of independent outputs to generate
    pub variant_count: usize,
    /// Base seed; variants and retries derive their seeds from it
    pub seed: u64,
    /// Contradictions tolerated before a variant fails
    pub max_retries: usize,
    /// Treat the sample as a torus when extracting patterns
    pub periodic_input: bool,
    /// Make the output tile seamlessly by wrapping the wave
    pub periodic_output: bool,
    /// Rule for choosing between equal-entropy cells
    pub tie_break: TieBreak,
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            output_height: DEFAULT_OUTPUT_SIZE,
            output_width: DEFAULT_OUTPUT_SIZE,
            pattern_size: DEFAULT_PATTERN_SIZE,
            symmetry: DEFAULT_SYMMETRY,
            variant_count: DEFAULT_VARIANT_COUNT,
            seed: DEFAULT_SEED,
            max_retries: DEFAULT_MAX_RETRIES,
            periodic_input: true,
            periodic_output: false,
            tie_break: TieBreak::RowMajor,
        }
    }
}

impl SynthesisConfig {
    /// Check the configuration against a sample of the given `(rows, cols)`
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` for empty or oversized outputs, outputs smaller
    /// than a pattern, a symmetry count outside `1..=8`, a pattern size that
    /// is zero or not smaller than the sample, or zero variants.
    pub fn validate(&self, sample_dims: (usize, usize)) -> Result<()> {
        for (parameter, value) in [
            ("output_height", self.output_height),
            ("output_width", self.output_width),
        ] {
            if value == 0 {
                return Err(invalid_config(parameter, &value, &"must be positive"));
            }
            if value > MAX_GRID_DIMENSION {
                return Err(invalid_config(
                    parameter,
                    &value,
                    &format!("exceeds the maximum of {MAX_GRID_DIMENSION}"),
                ));
            }
            if value < self.pattern_size {
                return Err(invalid_config(
                    parameter,
                    &value,
                    &format!("must be at least the pattern size {}", self.pattern_size),
                ));
            }
        }

        if !(1..=MAX_SYMMETRY).contains(&self.symmetry) {
            return Err(invalid_config(
                "symmetry",
                &self.symmetry,
                &format!("must be between 1 and {MAX_SYMMETRY}"),
            ));
        }

        let (rows, cols) = sample_dims;
        if self.pattern_size == 0 || self.pattern_size >= rows.min(cols) {
            return Err(invalid_config(
                "pattern_size",
                &self.pattern_size,
                &format!("must be positive and smaller than the {rows}x{cols} sample"),
            ));
        }

        if self.variant_count == 0 {
            return Err(invalid_config(
                "variant_count",
                &self.variant_count,
                &"at least one output is required",
            ));
        }
        Ok(())
    }

    /// Wave dimensions `(rows, cols)` for this output
    ///
    /// A non-periodic output of height H needs `H - N + 1` rows of patterns
    /// to cover it; a periodic one has one pattern per output tile.
    pub const fn wave_dims(&self) -> (usize, usize) {
        if self.periodic_output {
            (self.output_height, self.output_width)
        } else {
            (
                self.output_height.saturating_sub(self.pattern_size) + 1,
                self.output_width.saturating_sub(self.pattern_size) + 1,
            )
        }
    }

    /// Base seed of an output variant
    pub const fn variant_seed(&self, variant: usize) -> u64 {
        self.seed
            .wrapping_add((variant as u64).wrapping_mul(VARIANT_SEED_STRIDE))
    }

    /// Solver options for one output variant
    pub const fn solver_options(&self, variant: usize) -> SolverOptions {
        let (wave_rows, wave_cols) = self.wave_dims();
        SolverOptions {
            wave_rows,
            wave_cols,
            periodic: self.periodic_output,
            seed: self.variant_seed(variant),
            max_retries: self.max_retries,
            tie_break: self.tie_break,
        }
    }
}

/// Per-run parameters of a single solver
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SolverOptions {
    /// Wave rows
    pub wave_rows: usize,
    /// Wave columns
    pub wave_cols: usize,
    /// Wrap neighbours around the wave edges
    pub periodic: bool,
    /// Seed of the first attempt; attempt `k` uses `seed + k`
    pub seed: u64,
    /// Contradictions tolerated before failing
    pub max_retries: usize,
    /// Rule for choosing between equal-entropy cells
    pub tie_break: TieBreak,
}

/// Observe/propagate state machine
///
/// `Resolved` and `Failed` are terminal. Every contradiction passes through
/// `Contradicted`, which either restarts from `Initializing` or gives up.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SolverState {
    /// Building a fresh wave for the next attempt
    Initializing,
    /// Looking for the open cell of lowest entropy
    Selecting,
    /// About to commit the selected cell to one pattern
    Collapsing(CellIndex),
    /// Removing candidates made impossible by the last collapse
    Propagating,
    /// Every cell holds exactly one pattern
    Resolved,
    /// The current attempt emptied a cell
    Contradicted,
    /// Retries are exhausted
    Failed,
}

impl SolverState {
    /// Whether the solver has stopped
    pub const fn is_terminal(self) -> bool {
        matches!(self, Self::Resolved | Self::Failed)
    }
}

/// Wave, propagator and RNG owned by one attempt
#[derive(Debug, Clone)]
struct Attempt {
    grid: WaveGrid,
    propagator: Propagator,
    selector: RandomSelector,
}

/// Single-threaded solver for one output variant
///
/// Shares the pattern weights and adjacency index read-only and exclusively
/// owns the wave of its current attempt. Termination is guaranteed: each
/// attempt collapses at least one cell per cycle, and attempts are bounded
/// by `max_retries`.
#[derive(Debug, Clone)]
pub struct Solver {
    weights: Arc<[f64]>,
    adjacency: Arc<AdjacencyIndex>,
    options: SolverOptions,
    state: SolverState,
    attempt: Option<Attempt>,
    attempts: usize,
    contradictions: usize,
    last_contradiction: Option<CellIndex>,
    resolved: Option<Array2<PatternId>>,
}

impl Solver {
    /// Create a solver in the `Initializing` state
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the weight table and the adjacency index
    /// disagree on the number of patterns, or the wave would be empty.
    pub fn new(
        weights: Arc<[f64]>,
        adjacency: Arc<AdjacencyIndex>,
        options: SolverOptions,
    ) -> Result<Self> {
        if weights.len() != adjacency.pattern_count() {
            return Err(invalid_config(
                "adjacency",
                &adjacency.pattern_count(),
                &format!("expected {} patterns to match the weights", weights.len()),
            ));
        }
        if options.wave_rows == 0 || options.wave_cols == 0 {
            return Err(invalid_config(
                "wave",
                &format!("{}x{}", options.wave_rows, options.wave_cols),
                &"wave must contain at least one cell",
            ));
        }

        Ok(Self {
            weights,
            adjacency,
            options,
            state: SolverState::Initializing,
            attempt: None,
            attempts: 0,
            contradictions: 0,
            last_contradiction: None,
            resolved: None,
        })
    }

    /// Current state
    pub const fn state(&self) -> SolverState {
        self.state
    }

    /// Options this solver was created with
    pub const fn options(&self) -> &SolverOptions {
        &self.options
    }

    /// Number of attempts started so far
    pub const fn attempts(&self) -> usize {
        self.attempts
    }

    /// Number of contradictions observed so far
    pub const fn contradictions(&self) -> usize {
        self.contradictions
    }

    /// Cell that emptied in the most recent contradiction
    pub const fn last_contradiction(&self) -> Option<CellIndex> {
        self.last_contradiction
    }

    /// Seed of the current (or next) attempt
    pub const fn current_seed(&self) -> u64 {
        self.options.seed.wrapping_add(self.contradictions as u64)
    }

    /// Wave of the current attempt, if one has started
    pub fn grid(&self) -> Option<&WaveGrid> {
        self.attempt.as_ref().map(|attempt| &attempt.grid)
    }

    /// Resolved pattern ids once the solver reached `Resolved`
    pub const fn resolved(&self) -> Option<&Array2<PatternId>> {
        self.resolved.as_ref()
    }

    /// Perform exactly one state transition and return the new state
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` only if a fresh wave cannot be built, which
    /// `Solver::new` already rules out.
    pub fn step(&mut self) -> Result<SolverState> {
        self.state = match self.state {
            SolverState::Initializing => self.initialize()?,
            SolverState::Selecting => self.select(),
            SolverState::Collapsing(cell) => self.collapse(cell),
            SolverState::Propagating => self.propagate(),
            SolverState::Contradicted => {
                self.contradictions += 1;
                if self.contradictions < self.options.max_retries {
                    SolverState::Initializing
                } else {
                    SolverState::Failed
                }
            }
            terminal @ (SolverState::Resolved | SolverState::Failed) => terminal,
        };
        Ok(self.state)
    }

    /// Step until a terminal state is reached
    ///
    /// # Errors
    ///
    /// Returns `SynthesisFailed` with the contradiction count, number of
    /// attempts and the seed of the last attempt once retries are exhausted.
    pub fn run(&mut self) -> Result<Array2<PatternId>> {
        while !self.step()?.is_terminal() {}

        match (self.state, self.resolved.as_ref()) {
            (SolverState::Resolved, Some(resolved)) => Ok(resolved.clone()),
            _ => Err(SynthesisError::SynthesisFailed {
                contradictions: self.contradictions,
                attempts: self.attempts,
                last_seed: self
                    .options
                    .seed
                    .wrapping_add(self.attempts.saturating_sub(1) as u64),
            }),
        }
    }

    fn initialize(&mut self) -> Result<SolverState> {
        let seed = self.current_seed();
        self.attempts += 1;
        self.resolved = None;

        let mut grid = WaveGrid::new(
            self.options.wave_rows,
            self.options.wave_cols,
            Arc::clone(&self.weights),
            self.options.periodic,
        )?;

        let next = match Propagator::new(&mut grid, &self.adjacency) {
            Ok(propagator) => {
                self.attempt = Some(Attempt {
                    grid,
                    propagator,
                    selector: RandomSelector::new(seed),
                });
                SolverState::Selecting
            }
            Err(error) => {
                self.record_contradiction(&error);
                self.attempt = None;
                SolverState::Contradicted
            }
        };
        Ok(next)
    }

    fn select(&mut self) -> SolverState {
        let Some(attempt) = self.attempt.as_mut() else {
            return SolverState::Initializing;
        };

        match select_min_entropy(&attempt.grid, self.options.tie_break, &mut attempt.selector) {
            Some(cell) => SolverState::Collapsing(cell),
            None => match attempt.grid.to_pattern_grid() {
                Some(resolved) => {
                    self.resolved = Some(resolved);
                    SolverState::Resolved
                }
                None => SolverState::Contradicted,
            },
        }
    }

    fn collapse(&mut self, cell: CellIndex) -> SolverState {
        let Some(attempt) = self.attempt.as_mut() else {
            return SolverState::Initializing;
        };

        match choose_pattern(&attempt.grid, cell, &mut attempt.selector) {
            Some(pattern) => {
                attempt
                    .propagator
                    .collapse(&mut attempt.grid, cell, pattern);
                SolverState::Propagating
            }
            None => SolverState::Contradicted,
        }
    }

    fn propagate(&mut self) -> SolverState {
        let Some(attempt) = self.attempt.as_mut() else {
            return SolverState::Initializing;
        };

        match attempt
            .propagator
            .propagate(&mut attempt.grid, &self.adjacency)
        {
            Ok(()) => SolverState::Selecting,
            Err(error) => {
                self.record_contradiction(&error);
                SolverState::Contradicted
            }
        }
    }

    fn record_contradiction(&mut self, error: &SynthesisError) {
        if let SynthesisError::Contradiction { cell } = error {
            self.last_contradiction = Some(*cell);
        }
    }
}

/// Catalog and adjacency index of one sample, shared by every solver
///
/// Built once and never mutated, so any number of solvers may run against
/// it concurrently.
#[derive(Debug, Clone)]
pub struct SynthesisModel<T> {
    /// Distinct patterns of the sample with their weights
    pub catalog: Arc<PatternCatalog<T>>,
    /// Compatibility table derived from the catalog
    pub adjacency: Arc<AdjacencyIndex>,
}

impl<T: TileValue> SynthesisModel<T> {
    /// Extract patterns and compatibilities from a sample
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the configuration is invalid for the sample.
    pub fn build(sample: &Array2<T>, config: &SynthesisConfig) -> Result<Self> {
        config.validate(sample.dim())?;
        let catalog = PatternCatalog::extract(
            sample,
            config.pattern_size,
            config.symmetry,
            config.periodic_input,
        )?;
        let adjacency = AdjacencyIndex::build(&catalog);

        Ok(Self {
            catalog: Arc::new(catalog),
            adjacency: Arc::new(adjacency),
        })
    }

    /// Create a solver for one output variant
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the wave would be empty.
    pub fn solver(&self, config: &SynthesisConfig, variant: usize) -> Result<Solver> {
        Solver::new(
            self.catalog.shared_weights(),
            Arc::clone(&self.adjacency),
            config.solver_options(variant),
        )
    }

    /// Solve one output variant and render it to tile values
    ///
    /// # Errors
    ///
    /// Returns `SynthesisFailed` when every attempt contradicts.
    pub fn run_variant(&self, config: &SynthesisConfig, variant: usize) -> Result<Array2<T>> {
        let wave = self.solver(config, variant)?.run()?;
        self.catalog.render(
            &wave,
            config.output_height,
            config.output_width,
            config.periodic_output,
        )
    }
}

/// Synthesize one output that is locally similar to the sample
///
/// Runs variant 0, whose seed is `config.seed`.
///
/// # Errors
///
/// Returns `InvalidConfig` for an unusable configuration and
/// `SynthesisFailed` when retries are exhausted.
pub fn synthesize<T: TileValue>(sample: &Array2<T>, config: &SynthesisConfig) -> Result<Array2<T>> {
    SynthesisModel::build(sample, config)?.run_variant(config, 0)
}

/// Synthesize `config.variant_count` outputs in parallel
///
/// The catalog and adjacency index are built once; each variant runs its own
/// solver with its own seed. Results come back in variant order, each either
/// a grid or that variant's `SynthesisFailed`.
///
/// # Errors
///
/// Returns `InvalidConfig` for an unusable configuration.
pub fn synthesize_variants<T: TileValue>(
    sample: &Array2<T>,
    config: &SynthesisConfig,
) -> Result<Vec<Result<Array2<T>>>> {
    let model = SynthesisModel::build(sample, config)?;
    Ok((0..config.variant_count)
        .into_par_iter()
        .map(|variant| model.run_variant(config, variant))
        .collect())
}
