//! Command line, image I/O, progress display and error types

/// Command-line interface and batch processing
pub mod cli;
/// Constants and configuration defaults
pub mod configuration;
/// Error types
pub mod error;
/// PNG sample loading and export
pub mod image;
/// Progress bars
pub mod progress;
