//! Conversion pipeline from an alignment set to an HSSP report
//!
//! Per chain: rows without any aligned column are excluded, the rest are
//! updated against the reference on the worker pool, filtered by the HSSP
//! threshold and resolved into hits. Hits of all chains are then ranked and
//! truncated together before residue aggregation.

use crate::alignment::{update_all, validate_residues, StatisticsUpdater, BLOSUM62};
use crate::formats::hssp::{HsspReport, ReportHeader};
use crate::formats::{AlignmentSet, ChainAlignment};
use crate::hits::{passes_threshold, HitTable, IdentityResolver};
use crate::profile::{ResidueAggregator, ResidueInfo};
use crate::sequence::AlignmentRecord;
use crate::structure::{
    lay_out_chain, ChainLayout, SequenceOnlyAnnotation, StructuralAnnotationSource,
    StructureArena,
};
use chrono::NaiveDate;
use hssp_core::{Config, Diagnostics, HsspResult};
use tracing::{debug, info, warn};

#[derive(Debug, Clone, PartialEq)]
pub struct ConversionOptions {
    /// Hits kept after ranking (0 = all)
    pub max_hits: usize,
    /// Offset added to the HSSP curve, as a fraction
    pub threshold: f64,
    pub min_alignment_length: u32,
    pub threads: usize,
    pub seqbase_name: String,
    pub seqbase_version: String,
    pub date: NaiveDate,
}

impl Default for ConversionOptions {
    fn default() -> Self {
        Self::from_config(&Config::default())
    }
}

impl ConversionOptions {
    pub fn from_config(config: &Config) -> Self {
        Self {
            max_hits: config.conversion.max_hits,
            threshold: config.conversion.threshold,
            min_alignment_length: config.conversion.min_alignment_length,
            threads: config.performance.resolved_threads(),
            seqbase_name: config.output.seqbase_name.clone(),
            seqbase_version: config.output.seqbase_version.clone(),
            date: chrono::Local::now().date_naive(),
        }
    }

    pub fn with_max_hits(mut self, max_hits: usize) -> Self {
        self.max_hits = max_hits;
        self
    }

    pub fn with_threshold(mut self, threshold: f64) -> Self {
        self.threshold = threshold;
        self
    }

    pub fn with_threads(mut self, threads: usize) -> Self {
        self.threads = threads.max(1);
        self
    }

    /// Fix the DATE line, for reproducible output
    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = date;
        self
    }
}

/// Ranked hits and laid out residues, before aggregation
#[derive(Debug)]
pub struct PreparedConversion {
    pub protein_id: String,
    pub header_lines: Vec<String>,
    /// Chains in the input, used or not
    pub nchain: usize,
    pub table: HitTable,
    pub residues: Vec<ResidueInfo>,
    pub arena: StructureArena,
    pub layouts: Vec<ChainLayout>,
}

impl PreparedConversion {
    /// Aggregate residue profiles over the selected hits
    pub fn into_report(mut self, options: &ConversionOptions) -> HsspReport {
        let hits = self.table.into_hits();
        let matrix = BLOSUM62::new();
        ResidueAggregator::new(&hits, &matrix).aggregate(&mut self.residues);

        let header = ReportHeader {
            protein_id: self.protein_id,
            date: options.date,
            seqbase_name: options.seqbase_name.clone(),
            seqbase_version: options.seqbase_version.clone(),
            threshold: options.threshold,
            header_lines: self.header_lines,
            seq_length: self.residues.iter().filter(|r| !r.is_break()).count(),
            nchain: self.nchain,
            used_chains: self.layouts.iter().map(|l| l.chain_id).collect(),
        };

        HsspReport {
            header,
            hits,
            residues: self.residues,
            arena: self.arena,
            layouts: self.layouts,
        }
    }
}

/// Everything up to and including hit ranking and truncation.
///
/// Fails on the first invalid residue, on malformed structure annotation
/// and with `NoHits` when no hit survives.
pub fn prepare(
    set: AlignmentSet,
    options: &ConversionOptions,
    resolver: &dyn IdentityResolver,
    diag: &Diagnostics,
) -> HsspResult<PreparedConversion> {
    let matrix = BLOSUM62::new();
    let nchain = set.chains.len();
    let mut table = HitTable::new();
    let mut arena = StructureArena::new();
    let mut residues = Vec::new();
    let mut layouts = Vec::new();

    for (chain_index, chain) in set.chains.into_iter().enumerate() {
        let ChainAlignment {
            chain_id,
            mut rows,
            structure,
        } = chain;

        if rows.is_empty() {
            warn!("Chain {} has no rows, skipping", chain_id);
            continue;
        }
        let reference = rows.remove(0);
        if reference.sequence().residue_count() == 0 {
            warn!("Reference of chain {} has no residues, skipping", chain_id);
            continue;
        }

        let updater = StatisticsUpdater::new(&reference, &matrix)?;
        let candidates = aligned_rows(&reference, rows)?;
        let updated = update_all(&updater, candidates, options.threads, diag)?;
        for row in &updated {
            let drift = row.annotation_drift();
            if !drift.is_empty() {
                debug!(
                    "Row {}: recorded HSSP figures differ from recomputed ({})",
                    row.id(),
                    drift.join(", ")
                );
            }
        }

        let total = updated.len();
        let kept: Vec<AlignmentRecord> = updated
            .into_iter()
            .filter(|row| {
                passes_threshold(row.stats(), options.threshold, options.min_alignment_length)
            })
            .collect();
        info!(
            "Chain {}: {} of {} rows above the HSSP threshold",
            chain_id,
            kept.len(),
            total
        );

        let events = match &structure {
            Some(recorded) => recorded.annotate(&reference)?,
            None => SequenceOnlyAnnotation { chain: chain_id }.annotate(&reference)?,
        };
        let layout = lay_out_chain(
            chain_index,
            chain_id,
            &reference,
            events,
            &mut arena,
            &mut residues,
        )?;

        table.build(kept, &layout, resolver)?;
        layouts.push(layout);
    }

    table.rank();
    table.truncate(options.max_hits)?;

    Ok(PreparedConversion {
        protein_id: set.protein_id,
        header_lines: set.header,
        nchain,
        table,
        residues,
        arena,
        layouts,
    })
}

/// Drop rows that share no aligned column with the reference. Dropped
/// rows are still checked against the alphabet.
fn aligned_rows(
    reference: &AlignmentRecord,
    rows: Vec<AlignmentRecord>,
) -> HsspResult<Vec<AlignmentRecord>> {
    let mut kept = Vec::with_capacity(rows.len());
    for row in rows {
        if row.has_aligned_column(reference) {
            kept.push(row);
        } else {
            validate_residues(&row)?;
            debug!("Row {} has no aligned column, dropping", row.id());
        }
    }
    Ok(kept)
}

/// Run the whole pipeline
pub fn convert(
    set: AlignmentSet,
    options: &ConversionOptions,
    resolver: &dyn IdentityResolver,
    diag: &Diagnostics,
) -> HsspResult<HsspReport> {
    Ok(prepare(set, options, resolver, diag)?.into_report(options))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hits::{AcceptAllResolver, AccessionListResolver};
    use hssp_core::HsspError;

    fn options() -> ConversionOptions {
        ConversionOptions::default()
            .with_threshold(-1.0)
            .with_threads(1)
            .with_date(NaiveDate::from_ymd_opt(2024, 1, 2).unwrap())
    }

    fn set(rows: &[(&str, &str)]) -> AlignmentSet {
        let rows = rows
            .iter()
            .map(|(id, text)| AlignmentRecord::new(*id).with_sequence(text.as_bytes()))
            .collect();
        AlignmentSet::new(vec![ChainAlignment::new('A', rows)])
    }

    #[test]
    fn test_rows_without_aligned_column_are_dropped() {
        let prepared = prepare(
            set(&[("q", "ACDE--"), ("h1", "ACDE--"), ("h2", "----WW")]),
            &options(),
            &AcceptAllResolver,
            &Diagnostics::quiet(),
        )
        .unwrap();

        assert_eq!(prepared.table.len(), 1);
        assert_eq!(prepared.table.hits()[0].record.id(), "h1");
    }

    #[test]
    fn test_invalid_residue_in_dropped_row_still_fails() {
        let result = prepare(
            set(&[("q", "ACDE--"), ("h1", "ACDE--"), ("h2", "----J1")]),
            &options(),
            &AcceptAllResolver,
            &Diagnostics::quiet(),
        );
        assert!(matches!(result, Err(HsspError::InvalidResidue { .. })));
    }

    #[test]
    fn test_threshold_filter() {
        // 8 of 10 identical sits below t(10) + 5, about 84.5%
        let rows = [
            ("q", "ACDEFGHIKL"),
            ("same", "ACDEFGHIKL"),
            ("close", "ACDEFGHIWW"),
        ];
        let prepared = prepare(
            set(&rows),
            &options().with_threshold(0.05),
            &AcceptAllResolver,
            &Diagnostics::quiet(),
        )
        .unwrap();

        let ids: Vec<&str> = prepared.table.hits().iter().map(|h| h.record.id()).collect();
        assert_eq!(ids, vec!["same"]);
    }

    #[test]
    fn test_all_unresolved_is_no_hits() {
        let resolver = AccessionListResolver::parse("P99999\n");
        let result = prepare(
            set(&[("q", "ACDE"), ("h1", "ACDE")]),
            &options(),
            &resolver,
            &Diagnostics::quiet(),
        );
        assert!(matches!(result, Err(HsspError::NoHits)));
    }

    #[test]
    fn test_report_header_from_set() {
        let mut input = set(&[("q", "ACDE"), ("h1", "ACDE"), ("h2", "AC-E")]);
        input.protein_id = "1ABC".to_string();
        input.chains.push(ChainAlignment::new('B', Vec::new()));

        let report = convert(input, &options(), &AcceptAllResolver, &Diagnostics::quiet()).unwrap();
        assert_eq!(report.header.protein_id, "1ABC");
        assert_eq!(report.header.seq_length, 4);
        assert_eq!(report.header.nchain, 2);
        assert_eq!(report.header.used_chains, vec!['A']);
        assert_eq!(report.hits.len(), 2);
        assert_eq!(report.hits[0].nr, 1);
        assert_eq!(report.residues[0].profile.nocc, 3);
    }
}
