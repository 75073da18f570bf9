//! Alignment-to-statistics engine behind HSSP reports
//!
//! Rows of a multiple sequence alignment are rescanned against the reference
//! row, filtered and ranked into hits, and aggregated per reference residue
//! into the profile, entropy and conservation columns of an HSSP file.

pub mod alignment;
pub mod alphabet;
pub mod convert;
pub mod formats;
pub mod hits;
pub mod profile;
pub mod sequence;
pub mod structure;

// Re-export commonly used types
pub use alignment::{update_all, ScoringMatrix, StatisticsUpdater, BLOSUM62};
pub use convert::{convert, prepare, ConversionOptions, PreparedConversion};
pub use formats::{AlignmentFormat, AlignmentSet, ChainAlignment, HsspReport};
pub use hits::{AcceptAllResolver, AccessionListResolver, Hit, HitTable, IdentityResolver};
pub use profile::{ResidueAggregator, ResidueInfo, ResidueProfile};
pub use sequence::{AlignmentRecord, AlignmentStats, Insertion, SequenceBuffer};
pub use structure::{ChainLayout, StructureArena, StructureEvent, StructuralResidue};
