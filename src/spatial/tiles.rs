//! Pattern extraction and output reconstruction
//!
//! Slides an N×N window over the sample and catalogs every distinct window,
//! optionally adding rotated and reflected variants. The catalog also owns
//! the rule that turns a resolved wave of pattern ids back into tile values.

use ndarray::{Array2, Axis};
use std::collections::HashMap;
use std::fmt::Debug;
use std::hash::Hash;
use std::sync::Arc;

use crate::io::configuration::MAX_SYMMETRY;
use crate::io::error::{Result, SynthesisError, invalid_config};

/// Dense, 0-based identifier of a cataloged pattern
pub type PatternId = usize;

/// A discrete tile symbol such as a quantized color label
pub trait TileValue: Copy + Eq + Hash + Send + Sync + Debug {}

impl<T> TileValue for T where T: Copy + Eq + Hash + Send + Sync + Debug {}

/// Immutable catalog of the distinct N×N patterns of a sample
///
/// Pattern ids are assigned in first-seen order (row-major window anchor,
/// then symmetry index), so extraction is deterministic for a given sample.
#[derive(Debug, Clone)]
pub struct PatternCatalog<T> {
    pattern_size: usize,
    patterns: Vec<Array2<T>>,
    weights: Arc<[f64]>,
    ids: HashMap<Array2<T>, PatternId>,
}

impl<T: TileValue> PatternCatalog<T> {
    /// Extract every distinct pattern of the sample
    ///
    /// With `periodic_input` the sample is treated as a torus: a window is
    /// anchored at each of its `rows × cols` cells and reads across the
    /// right and bottom edges back to the opposite side. Without it only the
    /// `(rows - N + 1) × (cols - N + 1)` windows that fit entirely are used.
    ///
    /// Each of the first `symmetry` variants of a window (identity, reflection,
    /// then the rotations with their reflections) counts as one occurrence of
    /// its own pattern.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the sample is empty, `pattern_size` is zero
    /// or not smaller than both sample dimensions, or `symmetry` is outside
    /// `1..=8`.
    pub fn extract(
        sample: &Array2<T>,
        pattern_size: usize,
        symmetry: usize,
        periodic_input: bool,
    ) -> Result<Self> {
        let (rows, cols) = sample.dim();
        if rows == 0 || cols == 0 {
            return Err(invalid_config(
                "sample",
                &format!("{rows}x{cols}"),
                &"sample grid is empty",
            ));
        }
        if pattern_size == 0 {
            return Err(invalid_config(
                "pattern_size",
                &pattern_size,
                &"pattern size must be positive",
            ));
        }
        if pattern_size >= rows.min(cols) {
            return Err(invalid_config(
                "pattern_size",
                &pattern_size,
                &format!("must be smaller than the {rows}x{cols} sample"),
            ));
        }
        if !(1..=MAX_SYMMETRY).contains(&symmetry) {
            return Err(invalid_config(
                "symmetry",
                &symmetry,
                &format!("must be between 1 and {MAX_SYMMETRY}"),
            ));
        }

        let (anchor_rows, anchor_cols) = if periodic_input {
            (rows, cols)
        } else {
            (rows - pattern_size + 1, cols - pattern_size + 1)
        };

        let mut patterns = Vec::new();
        let mut weights: Vec<f64> = Vec::new();
        let mut ids = HashMap::new();

        for row in 0..anchor_rows {
            for col in 0..anchor_cols {
                let window = window_at(sample, row, col, pattern_size).ok_or_else(|| {
                    SynthesisError::InvalidSourceData {
                        reason: format!("window at ({row}, {col}) falls outside the sample"),
                    }
                })?;

                for variant in symmetry_variants(window, symmetry) {
                    if let Some(&id) = ids.get(&variant) {
                        if let Some(weight) = weights.get_mut(id) {
                            *weight += 1.0;
                        }
                    } else {
                        ids.insert(variant.clone(), patterns.len());
                        patterns.push(variant);
                        weights.push(1.0);
                    }
                }
            }
        }

        Ok(Self {
            pattern_size,
            patterns,
            weights: weights.into(),
            ids,
        })
    }

    /// Reconstruct tile values from a resolved wave of pattern ids
    ///
    /// Each output pixel `(y, x)` is read from a single cell: the cell
    /// `(min(y, wave_rows - 1), min(x, wave_cols - 1))`, at the pixel's offset
    /// inside that cell's pattern. Interior pixels take the top-left value of
    /// their own cell and the trailing `N - 1` rows and columns come from the
    /// last wave row and column. A resolved wave agrees at every overlap, so
    /// the choice of cell never hides a conflict.
    ///
    /// With `periodic_output` the wave has the output's dimensions and every
    /// pixel takes the top-left value of its own cell.
    ///
    /// # Errors
    ///
    /// Returns `InvalidConfig` if the wave dimensions don't match the output
    /// dimensions, and `InvalidSourceData` if the wave names an unknown pattern.
    pub fn render(
        &self,
        wave: &Array2<PatternId>,
        output_height: usize,
        output_width: usize,
        periodic_output: bool,
    ) -> Result<Array2<T>> {
        let (wave_rows, wave_cols) = wave.dim();
        let margin = if periodic_output {
            0
        } else {
            self.pattern_size - 1
        };
        if wave_rows == 0
            || wave_cols == 0
            || wave_rows + margin != output_height
            || wave_cols + margin != output_width
        {
            return Err(invalid_config(
                "wave",
                &format!("{wave_rows}x{wave_cols}"),
                &format!("does not cover a {output_height}x{output_width} output"),
            ));
        }

        let mut values = Vec::with_capacity(output_height * output_width);
        for y in 0..output_height {
            let cell_row = y.min(wave_rows - 1);
            for x in 0..output_width {
                let cell_col = x.min(wave_cols - 1);
                let id = wave.get((cell_row, cell_col)).copied().unwrap_or(usize::MAX);
                let value = self
                    .patterns
                    .get(id)
                    .and_then(|pattern| pattern.get((y - cell_row, x - cell_col)))
                    .copied()
                    .ok_or_else(|| SynthesisError::InvalidSourceData {
                        reason: format!("pattern id {id} is not in the catalog"),
                    })?;
                values.push(value);
            }
        }

        Array2::from_shape_vec((output_height, output_width), values).map_err(|e| {
            SynthesisError::InvalidSourceData {
                reason: e.to_string(),
            }
        })
    }

    /// Look up the id of an exact pattern matrix
    pub fn id_of(&self, pattern: &Array2<T>) -> Option<PatternId> {
        self.ids.get(pattern).copied()
    }
}

impl<T> PatternCatalog<T> {
    /// Side length N of every pattern
    pub const fn pattern_size(&self) -> usize {
        self.pattern_size
    }

    /// Number of distinct patterns
    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    /// Whether the catalog holds no patterns
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Pattern matrix for an id
    pub fn pattern(&self, id: PatternId) -> Option<&Array2<T>> {
        self.patterns.get(id)
    }

    /// All patterns indexed by id
    pub fn patterns(&self) -> &[Array2<T>] {
        &self.patterns
    }

    /// Occurrence weight of every pattern, indexed by id
    pub fn weights(&self) -> &[f64] {
        &self.weights
    }

    /// Shared handle to the weight table for solver instances
    pub fn shared_weights(&self) -> Arc<[f64]> {
        Arc::clone(&self.weights)
    }

    /// Sum of all pattern weights
    pub fn total_weight(&self) -> f64 {
        self.weights.iter().sum()
    }
}

// Rows and columns wrap, which is a no-op when the window fits inside the sample
fn window_at<T: Copy>(
    sample: &Array2<T>,
    row: usize,
    col: usize,
    size: usize,
) -> Option<Array2<T>> {
    let (rows, cols) = sample.dim();
    let mut values = Vec::with_capacity(size * size);
    for dy in 0..size {
        for dx in 0..size {
            values.push(*sample.get(((row + dy) % rows, (col + dx) % cols))?);
        }
    }
    Array2::from_shape_vec((size, size), values).ok()
}

/// The first `symmetry` dihedral variants of a pattern
///
/// Order: identity, reflected, rotated 90°, rotated 90° reflected, rotated
/// 180°, rotated 180° reflected, rotated 270°, rotated 270° reflected.
pub fn symmetry_variants<T: Clone>(pattern: Array2<T>, symmetry: usize) -> Vec<Array2<T>> {
    let mut variants = Vec::with_capacity(MAX_SYMMETRY);
    let mut rotation = pattern;
    for _ in 0..MAX_SYMMETRY / 2 {
        let reflected = reflect(&rotation);
        let next = rotate_90(&rotation);
        variants.push(rotation);
        variants.push(reflected);
        rotation = next;
    }
    variants.truncate(symmetry);
    variants
}

/// Rotate a pattern 90° clockwise
pub fn rotate_90<T: Clone>(pattern: &Array2<T>) -> Array2<T> {
    let mut rotated = pattern.t().to_owned();
    rotated.invert_axis(Axis(1));
    rotated
}

/// Mirror a pattern left to right
pub fn reflect<T: Clone>(pattern: &Array2<T>) -> Array2<T> {
    let mut mirrored = pattern.to_owned();
    mirrored.invert_axis(Axis(1));
    mirrored
}
