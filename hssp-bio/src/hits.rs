//! Hit selection: identity resolution, HSSP threshold, ranking and
//! truncation

use crate::sequence::{AlignmentRecord, AlignmentStats};
use crate::structure::ChainLayout;
use hssp_core::{HsspError, HsspResult};
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fs;
use std::path::Path;
use tracing::{debug, info, warn};

/// Handle of a sequence in the external sequence database
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DocumentId(pub u32);

/// Maps hit accessions to known database entries
pub trait IdentityResolver: Send + Sync {
    /// `UnresolvedAccession` drops the row; any other error aborts the run
    fn resolve(&self, accession: &str) -> HsspResult<DocumentId>;
}

/// Resolver for runs without a sequence database
#[derive(Debug, Clone, Copy, Default)]
pub struct AcceptAllResolver;

impl IdentityResolver for AcceptAllResolver {
    fn resolve(&self, _accession: &str) -> HsspResult<DocumentId> {
        Ok(DocumentId(0))
    }
}

/// Resolver backed by a list of known accessions, one per line.
/// Blank lines and lines starting with `#` are skipped.
#[derive(Debug, Clone, Default)]
pub struct AccessionListResolver {
    index: HashMap<String, DocumentId>,
}

impl AccessionListResolver {
    pub fn from_file<P: AsRef<Path>>(path: P) -> HsspResult<Self> {
        let content = fs::read_to_string(path)?;
        Ok(Self::parse(&content))
    }

    pub fn parse(content: &str) -> Self {
        let mut resolver = Self::default();
        for line in content.lines() {
            let line = line.trim();
            if line.is_empty() || line.starts_with('#') {
                continue;
            }
            let next = DocumentId(resolver.index.len() as u32);
            resolver.index.entry(line.to_string()).or_insert(next);
        }
        resolver
    }

    pub fn len(&self) -> usize {
        self.index.len()
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }
}

impl IdentityResolver for AccessionListResolver {
    fn resolve(&self, accession: &str) -> HsspResult<DocumentId> {
        self.index
            .get(accession)
            .copied()
            .ok_or_else(|| HsspError::UnresolvedAccession(accession.to_string()))
    }
}

/// Identity cutoff of the HSSP curve in percent,
/// `t(L) = min(100, 290.15 L^-0.562) + 100 threshold`
pub fn hssp_threshold(aligned_length: u32, threshold: f64) -> f64 {
    let curve = if aligned_length == 0 {
        100.0
    } else {
        (290.15 * (aligned_length as f64).powf(-0.562)).min(100.0)
    };
    curve + 100.0 * threshold
}

/// Whether an updated row lies on or above the HSSP curve
pub fn passes_threshold(stats: &AlignmentStats, threshold: f64, min_alignment_length: u32) -> bool {
    stats.aligned_length > 0
        && stats.aligned_length >= min_alignment_length
        && 100.0 * stats.identity() >= hssp_threshold(stats.aligned_length, threshold)
}

/// A selected alignment row
#[derive(Debug, Clone)]
pub struct Hit {
    pub record: AlignmentRecord,
    pub document: DocumentId,
    /// Chain alignment whose reference row this hit was scored against
    pub chain_index: usize,
    pub chain_id: char,
    /// Report numbering of the chain's first residue minus one
    pub offset: u32,
    /// IFIR and ILAS in report numbering
    pub first_residue: u32,
    pub last_residue: u32,
    /// Rank, assigned after truncation
    pub nr: u32,
}

impl Hit {
    pub fn new(
        record: AlignmentRecord,
        document: DocumentId,
        chain_index: usize,
        chain_id: char,
        offset: u32,
    ) -> Self {
        let stats = *record.stats();
        Self {
            record,
            document,
            chain_index,
            chain_id,
            offset,
            first_residue: stats.query_first + offset,
            last_residue: stats.query_last + offset,
            nr: 0,
        }
    }

    fn placed(record: AlignmentRecord, document: DocumentId, layout: &ChainLayout) -> Self {
        let mut hit = Self::new(
            record,
            document,
            layout.chain_index,
            layout.chain_id,
            layout.offset(),
        );
        let stats = *hit.record.stats();
        hit.first_residue = layout.seq_number(stats.query_first);
        hit.last_residue = layout.seq_number(stats.query_last);
        hit
    }

    pub fn identity(&self) -> f64 {
        self.record.stats().identity()
    }

    pub fn similarity(&self) -> f64 {
        self.record.stats().similarity()
    }

    /// Whether the hit spans report residue `seq_nr`
    pub fn covers(&self, seq_nr: u32) -> bool {
        seq_nr >= self.first_residue && seq_nr <= self.last_residue
    }

    pub fn summary(&self) -> HitSummary {
        let stats = self.record.stats();
        let meta = &self.record.metadata;
        HitSummary {
            nr: self.nr,
            id: meta.id.clone(),
            accession: meta.accession.clone(),
            pdb: meta.pdb.clone(),
            chain: self.chain_id,
            identity: stats.identity(),
            similarity: stats.similarity(),
            ifir: self.first_residue,
            ilas: self.last_residue,
            jfir: stats.hit_first,
            jlas: stats.hit_last,
            lali: stats.aligned_length,
            ngap: stats.gap_events,
            lgap: stats.gap_residues,
            lseq2: self.record.sequence_length(),
            insertions: self.record.insertions().len(),
            description: meta.description.clone(),
        }
    }
}

/// Ranking order: identity, then aligned length, then accession, all
/// descending
fn compare_hits(a: &Hit, b: &Hit) -> Ordering {
    let (sa, sb) = (a.record.stats(), b.record.stats());
    sb.score
        .total_cmp(&sa.score)
        .then_with(|| sb.aligned_length.cmp(&sa.aligned_length))
        .then_with(|| b.record.accession().cmp(a.record.accession()))
}

/// PROTEINS table entry, serialisable for `hssp hits --json`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HitSummary {
    pub nr: u32,
    pub id: String,
    pub accession: String,
    pub pdb: String,
    pub chain: char,
    pub identity: f64,
    pub similarity: f64,
    pub ifir: u32,
    pub ilas: u32,
    pub jfir: u32,
    pub jlas: u32,
    pub lali: u32,
    pub ngap: u32,
    pub lgap: u32,
    pub lseq2: usize,
    pub insertions: usize,
    pub description: String,
}

#[derive(Debug, Default)]
pub struct HitTable {
    hits: Vec<Hit>,
}

impl HitTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Resolve the updated rows of one chain and add the survivors.
    /// Unresolved rows are logged and dropped. Returns the number added.
    pub fn build(
        &mut self,
        rows: Vec<AlignmentRecord>,
        layout: &ChainLayout,
        resolver: &dyn IdentityResolver,
    ) -> HsspResult<usize> {
        let before = self.hits.len();

        for record in rows {
            match resolver.resolve(record.accession()) {
                Ok(document) => self.hits.push(Hit::placed(record, document, layout)),
                Err(err) if !err.is_fatal() => {
                    debug!("Dropping row {}: {}", record.id(), err);
                }
                Err(err) => return Err(err),
            }
        }

        let added = self.hits.len() - before;
        info!("Chain {}: continuing with {} hits", layout.chain_id, added);
        Ok(added)
    }

    /// Stable sort into ranking order
    pub fn rank(&mut self) {
        self.hits.sort_by(compare_hits);
    }

    /// Keep the first `max_hits` (all when zero) and number them from 1
    pub fn truncate(&mut self, max_hits: usize) -> HsspResult<()> {
        if max_hits > 0 && self.hits.len() > max_hits {
            warn!("Keeping {} of {} hits", max_hits, self.hits.len());
            self.hits.truncate(max_hits);
        }

        if self.hits.is_empty() {
            return Err(HsspError::NoHits);
        }

        for (nr, hit) in self.hits.iter_mut().enumerate() {
            hit.nr = nr as u32 + 1;
        }
        Ok(())
    }

    pub fn hits(&self) -> &[Hit] {
        &self.hits
    }

    pub fn into_hits(self) -> Vec<Hit> {
        self.hits
    }

    pub fn len(&self) -> usize {
        self.hits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hits.is_empty()
    }

    pub fn summaries(&self) -> Vec<HitSummary> {
        self.hits.iter().map(Hit::summary).collect()
    }
}

impl From<Vec<Hit>> for HitTable {
    fn from(hits: Vec<Hit>) -> Self {
        Self { hits }
    }
}
