//! Overlapping-model wave function collapse for discrete tile grids
//!
//! A sample grid is cut into N×N patterns with their occurrence weights, a
//! compatibility table is derived from how those patterns overlap, and a
//! constraint-propagation solver fills an output grid whose every local
//! neighbourhood appears in the sample.

#![forbid(unsafe_code)]

/// Solver state machine, propagation and cell selection
pub mod algorithm;
/// Input/output operations and error handling
pub mod io;
/// Entropy helpers
pub mod math;
/// Pattern catalog, adjacency index and wave grid
pub mod spatial;

pub use algorithm::executor::{
    Solver, SolverState, SynthesisConfig, SynthesisModel, synthesize, synthesize_variants,
};
pub use io::error::{Result, SynthesisError};
