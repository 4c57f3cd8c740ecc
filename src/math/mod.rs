//! Mathematical utilities for the solver

/// Entropy and weight helpers
pub mod probability;
