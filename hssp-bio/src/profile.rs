//! Per-residue profile, entropy and conservation over the selected hits

use crate::alignment::ScoringMatrix;
use crate::alphabet::{is_gap, profile_contributions};
use crate::hits::Hit;
use crate::structure::StructureRef;
use rayon::prelude::*;
use std::collections::HashMap;
use tracing::debug;

/// Reference residue behind one profile row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResidueSite {
    pub chain_index: usize,
    /// 1-based position in the chain's reference sequence
    pub query_pos: u32,
    /// Column of the residue in the chain's alignment rows
    pub column: usize,
    pub letter: u8,
    pub structure: StructureRef,
}

/// Aggregated statistics of one reference position
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResidueProfile {
    /// Relative frequencies in profile order, summing to 1 when any residue
    /// was observed
    pub frequencies: [f64; 20],
    pub nocc: u32,
    pub ndel: u32,
    pub nins: u32,
    pub entropy: f64,
    pub weight: f64,
}

impl Default for ResidueProfile {
    fn default() -> Self {
        Self {
            frequencies: [0.0; 20],
            nocc: 0,
            ndel: 0,
            nins: 0,
            entropy: 0.0,
            weight: 1.0,
        }
    }
}

impl ResidueProfile {
    /// Entropy as a percentage of the maximum, ln(20)
    pub fn relative_entropy(&self) -> u32 {
        (100.0 * self.entropy / 20f64.ln()).round() as u32
    }

    /// Variability on a 0-100 scale
    pub fn variability(&self) -> u32 {
        (100.0 * (1.0 - self.weight)).round() as u32
    }

    /// Frequencies as rounded percentages
    pub fn percentages(&self) -> [u32; 20] {
        self.frequencies.map(|f| (100.0 * f).round() as u32)
    }
}

/// One entry of the residue list: a reference residue or a chain-break
/// placeholder
#[derive(Debug, Clone, PartialEq)]
pub struct ResidueInfo {
    pub seq_nr: u32,
    pub site: Option<ResidueSite>,
    pub profile: ResidueProfile,
}

impl ResidueInfo {
    pub fn residue(seq_nr: u32, site: ResidueSite) -> Self {
        Self {
            seq_nr,
            site: Some(site),
            profile: ResidueProfile::default(),
        }
    }

    pub fn chain_break(seq_nr: u32) -> Self {
        Self {
            seq_nr,
            site: None,
            profile: ResidueProfile::default(),
        }
    }

    pub fn is_break(&self) -> bool {
        self.site.is_none()
    }
}

/// Walks reference positions against the hit set. Positions are
/// independent, so the residue list is sharded over the rayon pool.
pub struct ResidueAggregator<'a> {
    by_chain: HashMap<usize, Vec<&'a Hit>>,
    matrix: &'a dyn ScoringMatrix,
}

impl<'a> ResidueAggregator<'a> {
    pub fn new(hits: &'a [Hit], matrix: &'a dyn ScoringMatrix) -> Self {
        let mut by_chain: HashMap<usize, Vec<&'a Hit>> = HashMap::new();
        for hit in hits {
            by_chain.entry(hit.chain_index).or_default().push(hit);
        }
        Self { by_chain, matrix }
    }

    pub fn aggregate(&self, residues: &mut [ResidueInfo]) {
        let chunk_size = chunk_size_for_parallelism(residues.len(), rayon::current_num_threads());
        debug!(
            "Aggregating {} residues in chunks of {}",
            residues.len(),
            chunk_size
        );

        residues.par_chunks_mut(chunk_size).for_each(|chunk| {
            for residue in chunk {
                if let Some(site) = residue.site {
                    residue.profile = self.profile_at(&site);
                }
            }
        });
    }

    /// Profile of one reference position. The reference residue itself is
    /// part of the distribution and of NOCC.
    pub fn profile_at(&self, site: &ResidueSite) -> ResidueProfile {
        let mut counts = [0.0f64; 20];
        let mut profile = ResidueProfile {
            nocc: 1,
            ..Default::default()
        };
        add_residue(&mut counts, site.letter);

        let mut distance_sum = 0.0;
        let mut weighted_similarity = 0.0;

        let hits = self
            .by_chain
            .get(&site.chain_index)
            .map(Vec::as_slice)
            .unwrap_or_default();

        for hit in hits {
            let stats = hit.record.stats();
            if site.query_pos < stats.query_first || site.query_pos > stats.query_last {
                continue;
            }

            let c = hit.record.sequence()[site.column];
            profile.nocc += 1;

            let similarity = if is_gap(c) {
                profile.ndel += 1;
                0.0
            } else {
                add_residue(&mut counts, c);
                self.matrix.normalized_similarity(site.letter, c)
            };

            let distance = 1.0 - stats.identity();
            distance_sum += distance;
            weighted_similarity += distance * similarity;

            if has_insertion_after(hit, site.query_pos) {
                profile.nins += 1;
            }
        }

        let total: f64 = counts.iter().sum();
        if total > 0.0 {
            for (f, count) in profile.frequencies.iter_mut().zip(counts) {
                *f = count / total;
            }
        }

        profile.entropy = entropy(&profile.frequencies);
        profile.weight = if distance_sum > 0.0 {
            (weighted_similarity / distance_sum).clamp(0.0, 1.0)
        } else {
            1.0
        };

        profile
    }
}

fn add_residue(counts: &mut [f64; 20], c: u8) {
    for (ix, w) in profile_contributions(c) {
        counts[ix] += w;
    }
}

/// Insertion positions name the reference residue after the inserted run
fn has_insertion_after(hit: &Hit, query_pos: u32) -> bool {
    hit.record
        .insertions()
        .binary_search_by_key(&(query_pos + 1), |ins| ins.query_pos)
        .is_ok()
}

/// Shannon entropy, 0 ln 0 taken as 0
pub fn entropy(frequencies: &[f64; 20]) -> f64 {
    -frequencies
        .iter()
        .filter(|&&f| f > 0.0)
        .map(|&f| f * f.ln())
        .sum::<f64>()
}

/// Aim for at least 10 items per thread, but not more than 1000 per chunk
fn chunk_size_for_parallelism(total_items: usize, threads: usize) -> usize {
    let ideal_chunk = total_items / (threads.max(1) * 10);
    ideal_chunk.clamp(10, 1000)
}
