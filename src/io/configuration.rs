//! Synthesis constants and runtime configuration defaults

/// Default side length of extracted patterns
pub const DEFAULT_PATTERN_SIZE: usize = 3;

/// Default number of symmetry variants per window (full dihedral group)
pub const DEFAULT_SYMMETRY: usize = 8;

/// Largest meaningful symmetry count (4 rotations x 2 reflections)
pub const MAX_SYMMETRY: usize = 8;

/// Default output width and height in tiles
pub const DEFAULT_OUTPUT_SIZE: usize = 48;

/// Default number of output variants per sample
pub const DEFAULT_VARIANT_COUNT: usize = 1;

/// Fixed seed for reproducible generation
pub const DEFAULT_SEED: u64 = 42;

/// Default number of contradictions tolerated before giving up
pub const DEFAULT_MAX_RETRIES: usize = 10;

// Safety limit to prevent excessive memory allocation
/// Maximum allowed output dimension
pub const MAX_GRID_DIMENSION: usize = 10_000;

// Golden-ratio increment keeps variant seed sequences far apart
/// Seed distance between consecutive output variants
pub const VARIANT_SEED_STRIDE: u64 = 0x9E37_79B9_7F4A_7C15;

/// Entropies closer than this are treated as tied during selection
pub const ENTROPY_TIE_EPSILON: f64 = 1e-12;

// Progress bar display settings
/// Threshold for switching to batch progress mode
pub const MAX_INDIVIDUAL_PROGRESS_BARS: usize = 5;

// Output settings
/// Suffix added to output filenames
pub const OUTPUT_SUFFIX: &str = "_result";
