pub mod pool;
pub mod scoring;
pub mod update;

// Re-export commonly used types
pub use pool::update_all;
pub use scoring::{ScoringMatrix, BLOSUM62};
pub use update::{validate_residues, StatisticsUpdater};
