//! Spatial data structures
//!
//! This module contains spatial-related functionality including:
//! - Pattern extraction and output reconstruction
//! - Directional compatibility between patterns
//! - Wave state over the output grid

/// Pattern compatibility per neighbour direction
pub mod adjacency;
/// Neighbour directions
pub mod direction;
/// Wave state management
pub mod grid;
/// Pattern extraction and reconstruction
pub mod tiles;

pub use adjacency::AdjacencyIndex;
pub use direction::Direction;
pub use grid::WaveGrid;
pub use tiles::{PatternCatalog, PatternId};
