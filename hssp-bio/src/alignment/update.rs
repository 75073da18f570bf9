use super::scoring::ScoringMatrix;
use crate::alphabet::{is_gap, is_valid, same_residue};
use crate::sequence::{AlignmentRecord, AlignmentStats, Insertion};
use hssp_core::{HsspError, HsspResult};

/// Recomputes the derived statistics of alignment rows against a fixed
/// reference row.
///
/// The reference is borrowed immutably for the lifetime of the updater, so
/// one updater can be shared by every worker of the row pool.
pub struct StatisticsUpdater<'a> {
    reference: &'a AlignmentRecord,
    matrix: &'a dyn ScoringMatrix,
}

/// An insertion run waiting for the column that resumes alignment
struct OpenInsertion {
    flank_column: usize,
    insertion: Insertion,
}

impl<'a> StatisticsUpdater<'a> {
    pub fn new(reference: &'a AlignmentRecord, matrix: &'a dyn ScoringMatrix) -> HsspResult<Self> {
        validate_residues(reference)?;
        Ok(Self { reference, matrix })
    }

    pub fn reference(&self) -> &AlignmentRecord {
        self.reference
    }

    /// Rescan `record` against the reference in one column-synchronous pass.
    ///
    /// The scan reads the ingested text and rebuilds the display copy, so
    /// nothing from an earlier run against any reference carries over. Fails with `InvalidResidue` on
    /// an alphabet violation, `MalformedInput` on a length mismatch and
    /// `DegenerateAlignment` when no column aligns.
    pub fn update(&self, record: &mut AlignmentRecord) -> HsspResult<()> {
        let query = self.reference.aligned().as_bytes();
        if record.len() != query.len() {
            return Err(HsspError::MalformedInput(format!(
                "row {} has length {}, reference has {}",
                record.id(),
                record.len(),
                query.len()
            )));
        }
        validate_residues(record)?;

        let mut stats = AlignmentStats::default();
        let mut insertions = Vec::new();
        let mut open: Option<OpenInsertion> = None;

        let mut query_pos = 1u32;
        let mut hit_pos = record.hit_origin().max(1);
        let mut hit_gap_run = false;
        let mut query_gap_run = false;
        let mut run_residues = 0u32;
        let mut run_events = 0u32;
        let mut length = 0u32;
        let mut active: Option<(usize, usize)> = None;

        let (source, hit) = record.scan_buffers();

        for (column, &q) in query.iter().enumerate() {
            let s = source[column];
            let query_gap = is_gap(q);
            let hit_gap = is_gap(s);

            if query_gap && hit_gap {
                continue;
            }

            if length > 0 {
                length += 1;
            }

            if hit_gap {
                if !(hit_gap_run || query_gap_run) {
                    run_events += 1;
                }
                hit_gap_run = true;
                run_residues += 1;
                query_pos += 1;
            } else if query_gap {
                // insertions only count once the alignment has started
                if active.is_some() {
                    if !query_gap_run {
                        let flank_column = (0..column).rev().find(|&c| !is_gap(source[c]));
                        open = flank_column.map(|flank_column| OpenInsertion {
                            flank_column,
                            insertion: Insertion {
                                query_pos,
                                hit_pos,
                                text: String::from(source[flank_column].to_ascii_lowercase() as char),
                            },
                        });
                    }
                    if let Some(run) = open.as_mut() {
                        run.insertion.text.push(s as char);
                    }
                }

                if !(hit_gap_run || query_gap_run) {
                    run_events += 1;
                }
                query_gap_run = true;
                run_residues += 1;
                hit_pos += 1;
            } else {
                if let Some(mut run) = open.take() {
                    hit.lower_case_at(run.flank_column);
                    let closing = hit.lower_case_at(column);
                    run.insertion.text.push(closing as char);
                    insertions.push(run.insertion);
                }

                hit_gap_run = false;
                query_gap_run = false;

                stats.query_last = query_pos;
                stats.hit_last = hit_pos;
                if stats.query_first == 0 {
                    stats.query_first = query_pos;
                    stats.hit_first = hit_pos;
                    length = 1;
                } else {
                    stats.gap_residues += run_residues;
                    stats.gap_events += run_events;
                }
                stats.aligned_length = length;
                run_residues = 0;
                run_events = 0;

                if same_residue(q, s) {
                    stats.identical += 1;
                }
                if self.matrix.score(q, s) >= 0 {
                    stats.similar += 1;
                }

                let begin = active.map_or(column, |(begin, _)| begin);
                active = Some((begin, column + 1));

                query_pos += 1;
                hit_pos += 1;
            }
        }

        let Some((begin, end)) = active else {
            record.stats = stats;
            record.insertions.clear();
            return Err(HsspError::DegenerateAlignment(format!(
                "row {} has no aligned column",
                record.id()
            )));
        };

        hit.trim_to(begin, end);

        stats.active_begin = begin;
        stats.active_end = end;
        stats.score = stats.identical as f64 / stats.aligned_length as f64;

        record.stats = stats;
        record.insertions = insertions;
        Ok(())
    }
}

/// Reject any character outside the residue alphabet and gap symbols
pub fn validate_residues(record: &AlignmentRecord) -> HsspResult<()> {
    let text = record.aligned().as_bytes();
    match text.iter().position(|&c| !is_valid(c)) {
        Some(column) => Err(HsspError::InvalidResidue {
            row: record.id().to_string(),
            residue: text[column] as char,
            column,
        }),
        None => Ok(()),
    }
}
