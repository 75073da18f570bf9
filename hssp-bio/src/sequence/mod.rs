pub mod annotation;
pub mod buffer;
pub mod record;

// Re-export commonly used types
pub use annotation::{HsspAnnotation, RecordTag};
pub use buffer::{SequenceBuffer, BLOCK_SIZE};
pub use record::{AlignmentRecord, AlignmentStats, Insertion, RecordMetadata};
