/// Bitsets over pattern ids for domains and compatibility rows
pub mod bitset;
/// Solver state machine and synthesis entry points
pub mod executor;
/// Support-count constraint propagation
pub mod propagation;
/// Minimum-entropy cell selection and weighted pattern sampling
pub mod selection;
