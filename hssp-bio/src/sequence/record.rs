use super::annotation::{HsspAnnotation, RecordTag};
use super::buffer::SequenceBuffer;
use crate::alphabet::is_gap;
use hssp_core::HsspResult;
use serde::{Deserialize, Serialize};

/// Identity fields of one alignment row
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordMetadata {
    pub accession: String,
    pub id: String,
    pub pdb: String,
    pub description: String,
}

/// Statistics derived by rescanning a row against the reference row.
///
/// Positions are 1-based: `query_*` in reference numbering, `hit_*` in the
/// numbering of the hit sequence itself. `active_begin..active_end` is the
/// column range between the first and last aligned column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct AlignmentStats {
    pub identical: u32,
    pub similar: u32,
    pub query_first: u32,
    pub query_last: u32,
    pub hit_first: u32,
    pub hit_last: u32,
    pub gap_events: u32,
    pub gap_residues: u32,
    pub aligned_length: u32,
    pub active_begin: usize,
    pub active_end: usize,
    pub score: f64,
}

impl AlignmentStats {
    /// Fraction of identical residues over the aligned length
    pub fn identity(&self) -> f64 {
        self.score
    }

    /// Fraction of similar residues over the aligned length
    pub fn similarity(&self) -> f64 {
        if self.aligned_length == 0 {
            0.0
        } else {
            self.similar as f64 / self.aligned_length as f64
        }
    }

    pub fn has_alignment(&self) -> bool {
        self.query_first > 0
    }
}

/// A run of hit residues aligned against gaps in the reference.
///
/// `text` holds the lower-cased flanking residue on each side around the
/// inserted residues, so its length is the insertion length plus two.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Insertion {
    pub query_pos: u32,
    pub hit_pos: u32,
    pub text: String,
}

impl Insertion {
    /// Number of inserted residues, flanks excluded
    pub fn len(&self) -> usize {
        self.text.len().saturating_sub(2)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// One row of a multiple sequence alignment.
///
/// `aligned` keeps the text as ingested and is never modified by an update;
/// `sequence` is the display copy that an update trims and marks.
#[derive(Debug, Clone, Default)]
pub struct AlignmentRecord {
    pub metadata: RecordMetadata,
    aligned: SequenceBuffer,
    sequence: SequenceBuffer,
    pub(crate) stats: AlignmentStats,
    pub(crate) insertions: Vec<Insertion>,
    pub(crate) hit_origin: u32,
    pub(crate) sequence_length: usize,
    annotation: Option<HsspAnnotation>,
}

impl AlignmentRecord {
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        Self {
            metadata: RecordMetadata {
                accession: id.clone(),
                id,
                ..Default::default()
            },
            ..Default::default()
        }
    }

    pub fn with_sequence(mut self, aligned: &[u8]) -> Self {
        self.aligned = SequenceBuffer::from_bytes(aligned);
        self.sequence = self.aligned.clone();
        self
    }

    pub fn with_accession(mut self, accession: impl Into<String>) -> Self {
        self.metadata.accession = accession.into();
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.metadata.description = description.into();
        self
    }

    /// First residue number of the hit sequence covered by this row
    pub fn with_hit_origin(mut self, origin: u32) -> Self {
        self.hit_origin = origin;
        self
    }

    pub fn id(&self) -> &str {
        &self.metadata.id
    }

    pub fn accession(&self) -> &str {
        &self.metadata.accession
    }

    /// Display text: the ingested row until updated, then trimmed with
    /// insertion flanks lower-cased and deletions marked
    pub fn sequence(&self) -> &SequenceBuffer {
        &self.sequence
    }

    /// Aligned text as ingested
    pub fn aligned(&self) -> &SequenceBuffer {
        &self.aligned
    }

    /// Ingested text together with a fresh display copy of it
    pub(crate) fn scan_buffers(&mut self) -> (&[u8], &mut SequenceBuffer) {
        self.sequence = self.aligned.clone();
        (self.aligned.as_bytes(), &mut self.sequence)
    }

    /// Append a fragment of aligned text
    pub fn append(&mut self, fragment: &[u8]) {
        self.aligned.append(fragment);
        self.sequence.append(fragment);
    }

    pub fn len(&self) -> usize {
        self.aligned.len()
    }

    pub fn is_empty(&self) -> bool {
        self.aligned.is_empty()
    }

    pub fn stats(&self) -> &AlignmentStats {
        &self.stats
    }

    pub fn insertions(&self) -> &[Insertion] {
        &self.insertions
    }

    pub fn hit_origin(&self) -> u32 {
        self.hit_origin
    }

    /// Full length of the hit sequence (LSEQ2)
    pub fn sequence_length(&self) -> usize {
        self.sequence_length
    }

    pub fn set_sequence_length(&mut self, length: usize) {
        self.sequence_length = length;
    }

    /// Derive the hit sequence length from the aligned text when no
    /// annotation supplied one.
    pub fn ensure_sequence_length(&mut self) {
        if self.sequence_length == 0 {
            let origin = self.hit_origin.max(1) as usize;
            self.sequence_length = origin - 1 + self.aligned.residue_count();
        }
    }

    /// True when at least one column has residues in both rows
    pub fn has_aligned_column(&self, reference: &AlignmentRecord) -> bool {
        self.aligned
            .as_bytes()
            .iter()
            .zip(reference.aligned.as_bytes())
            .any(|(&s, &q)| !is_gap(s) && !is_gap(q))
    }

    /// Apply one tagged metadata value
    pub fn apply_tag(&mut self, tag: RecordTag, value: &str) -> HsspResult<()> {
        match tag {
            RecordTag::Id => self.metadata.id = value.to_string(),
            RecordTag::Description => self.metadata.description = value.to_string(),
            RecordTag::Accession => self.metadata.accession = value.to_string(),
            RecordTag::Pdb => self.metadata.pdb = value.to_string(),
            RecordTag::Hssp => self.apply_annotation(&HsspAnnotation::parse(value)?),
        }
        Ok(())
    }

    /// Seed numbering from a precomputed HSSP annotation. The statistics
    /// themselves are always recomputed by the updater; the recorded figures
    /// are kept for comparison.
    pub fn apply_annotation(&mut self, annotation: &HsspAnnotation) {
        if let Some((first, _)) = annotation.hit_range {
            self.hit_origin = first;
        }
        if let Some(length) = annotation.sequence_length {
            self.sequence_length = length as usize;
        }
        self.annotation = Some(annotation.clone());
    }

    /// HSSP figures recorded by the input, if any
    pub fn annotation(&self) -> Option<&HsspAnnotation> {
        self.annotation.as_ref()
    }

    /// Recorded figures that the last update did not reproduce
    pub fn annotation_drift(&self) -> Vec<String> {
        self.annotation
            .as_ref()
            .map(|recorded| recorded.discrepancies(&self.stats))
            .unwrap_or_default()
    }
}
