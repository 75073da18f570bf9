//! HSSP report writer
//!
//! The report is rendered into memory in full and written in one go, so a
//! failed run never leaves a partial file behind.

use super::write_output;
use crate::hits::Hit;
use crate::profile::ResidueInfo;
use crate::sequence::Insertion;
use crate::structure::{ChainLayout, StructureArena};
use chrono::NaiveDate;
use hssp_core::HsspResult;
use std::fmt::Write;
use std::path::Path;
use tracing::debug;

/// Hits per `## ALIGNMENTS` block
pub const ALIGNMENT_BLOCK: usize = 70;

/// Characters of insertion text per line
pub const INSERTION_LINE: usize = 100;

const TITLE: &str =
    "HSSP       HOMOLOGY DERIVED SECONDARY STRUCTURE OF PROTEINS , VERSION 2.0 2011";

const REFERENCE: &str = "REFERENCE  Sander C., Schneider R. : Database of homology-derived protein structures. Proteins, 9:56-68 (1991).";

const NOTATION: [&str; 26] = [
    "ID: EMBL/SWISSPROT identifier of the aligned (homologous) protein",
    "STRID: if the 3-D structure of the aligned protein is known, then STRID is the Protein Data Bank identifier as taken",
    "from the database reference or DR-line of the EMBL/SWISSPROT entry",
    "%IDE: percentage of residue identity of the alignment",
    "%SIM (%WSIM):  (weighted) similarity of the alignment",
    "IFIR/ILAS: first and last residue of the alignment in the test sequence",
    "JFIR/JLAS: first and last residue of the alignment in the alignend protein",
    "LALI: length of the alignment excluding insertions and deletions",
    "NGAP: number of insertions and deletions in the alignment",
    "LGAP: total length of all insertions and deletions",
    "LSEQ2: length of the entire sequence of the aligned protein",
    "ACCNUM: SwissProt accession number",
    "PROTEIN: one-line description of aligned protein",
    "SeqNo,PDBNo,AA,STRUCTURE,BP1,BP2,ACC: sequential and PDB residue numbers, amino acid (lower case = Cys), secondary",
    "structure, bridge partners, solvent exposure as in DSSP (Kabsch and Sander, Biopolymers 22, 2577-2637(1983)",
    "VAR: sequence variability on a scale of 0-100 as derived from the NALIGN alignments",
    "pair of lower case characters (AvaK) in the alignend sequence bracket a point of insertion in this sequence",
    "dots (....) in the alignend sequence indicate points of deletion in this sequence",
    "SEQUENCE PROFILE: relative frequency of an amino acid type at each position. Asx and Glx are in their",
    "acid/amide form in proportion to their database frequencies",
    "NOCC: number of aligned sequences spanning this position (including the test sequence)",
    "NDEL: number of sequences with a deletion in the test protein at this position",
    "NINS: number of sequences with an insertion in the test protein at this position",
    "ENTROPY: entropy measure of sequence variability at this position",
    "RELENT: relative entropy, i.e.  entropy normalized to the range 0-100",
    "WEIGHT: conservation weight",
];

const PROTEINS_HEADER: &str = "  NR.    ID         STRID   %IDE %WSIM IFIR ILAS JFIR JLAS LALI NGAP LGAP LSEQ2 ACCNUM     PROTEIN";

const PROFILE_HEADER: &str = " SeqNo PDBNo   V   L   I   M   F   W   Y   G   A   P   S   T   C   H   R   K   Q   E   N   D  NOCC NDEL NINS ENTROPY RELENT WEIGHT";

const PROFILE_BREAK: &str = "          0   0   0   0   0   0   0   0   0   0   0   0   0   0   0   0   0   0   0   0     0    0    0   0.000      0  1.00";

const ALIGNMENT_BREAK: &str = "        !  !           0   0    0    0    0";

/// Key-value lines at the top of a report
#[derive(Debug, Clone, PartialEq)]
pub struct ReportHeader {
    pub protein_id: String,
    pub date: NaiveDate,
    pub seqbase_name: String,
    pub seqbase_version: String,
    /// Offset added to the HSSP curve, as a fraction
    pub threshold: f64,
    /// HEADER, COMPND, SOURCE and AUTHOR lines
    pub header_lines: Vec<String>,
    /// Reference residues over all used chains
    pub seq_length: usize,
    /// Chains in the input
    pub nchain: usize,
    pub used_chains: Vec<char>,
}

impl ReportHeader {
    pub fn kchain(&self) -> usize {
        self.used_chains.len()
    }
}

/// A complete HSSP report, ready to render
#[derive(Debug)]
pub struct HsspReport {
    pub header: ReportHeader,
    /// Selected hits in rank order
    pub hits: Vec<Hit>,
    pub residues: Vec<ResidueInfo>,
    pub arena: StructureArena,
    pub layouts: Vec<ChainLayout>,
}

impl HsspReport {
    pub fn render(&self) -> HsspResult<String> {
        let mut out = String::new();
        self.write_header(&mut out)?;
        self.write_proteins(&mut out)?;
        self.write_alignments(&mut out)?;
        self.write_profile(&mut out)?;
        self.write_insertions(&mut out)?;
        writeln!(out, "//")?;

        debug!(
            "Rendered report for {}: {} hits, {} residues",
            self.header.protein_id,
            self.hits.len(),
            self.residues.len()
        );
        Ok(out)
    }

    /// Render and write the report; gzip when asked for or when the path
    /// ends in `.gz`
    pub fn write_to<P: AsRef<Path>>(&self, path: P, compress: bool) -> HsspResult<()> {
        let text = self.render()?;
        write_output(path, text.as_bytes(), compress)
    }

    fn write_header(&self, out: &mut String) -> HsspResult<()> {
        let header = &self.header;

        writeln!(out, "{TITLE}")?;
        writeln!(out, "PDBID      {}", header.protein_id)?;
        writeln!(
            out,
            "DATE       file generated on {}",
            header.date.format("%Y-%m-%d")
        )?;
        writeln!(
            out,
            "SEQBASE    {} version {}",
            header.seqbase_name, header.seqbase_version
        )?;
        writeln!(
            out,
            "THRESHOLD  according to: t(L)=(290.15 * L ** -0.562) + {}",
            format_threshold(header.threshold)
        )?;
        writeln!(out, "{REFERENCE}")?;
        writeln!(
            out,
            "CONTACT    generated by hssp {}",
            env!("CARGO_PKG_VERSION")
        )?;
        for line in &header.header_lines {
            writeln!(out, "{line}")?;
        }

        writeln!(out, "SEQLENGTH {:05}", header.seq_length)?;
        writeln!(
            out,
            "NCHAIN     {:04} chain(s) in {} data set",
            header.nchain, header.protein_id
        )?;
        if header.kchain() != header.nchain {
            let chains: Vec<String> = header.used_chains.iter().map(char::to_string).collect();
            writeln!(
                out,
                "KCHAIN     {:04} chain(s) used here ; chains(s) : {}",
                header.kchain(),
                chains.join(",")
            )?;
        }
        writeln!(out, "NALIGN     {:04}", self.hits.len())?;

        for line in NOTATION {
            writeln!(out, "NOTATION : {line}")?;
        }
        writeln!(out)?;
        Ok(())
    }

    fn write_proteins(&self, out: &mut String) -> HsspResult<()> {
        writeln!(out, "## PROTEINS : identifier and alignment statistics")?;
        writeln!(out, "{PROTEINS_HEADER}")?;

        for hit in &self.hits {
            let stats = hit.record.stats();
            let meta = &hit.record.metadata;
            writeln!(
                out,
                "{:05} : {:<12.12}{:<4.4}    {:4.2}  {:4.2}{:05}{:05}{:05}{:05}{:05}{:05}{:05}{:05}  {:<10.10} {}",
                hit.nr,
                meta.id,
                meta.pdb,
                stats.identity(),
                stats.similarity(),
                hit.first_residue,
                hit.last_residue,
                stats.hit_first,
                stats.hit_last,
                stats.aligned_length,
                stats.gap_events,
                stats.gap_residues,
                hit.record.sequence_length(),
                meta.accession,
                meta.description
            )?;
        }
        Ok(())
    }

    fn write_alignments(&self, out: &mut String) -> HsspResult<()> {
        for (block, hits) in self.hits.chunks(ALIGNMENT_BLOCK).enumerate() {
            let first = block * ALIGNMENT_BLOCK;
            writeln!(
                out,
                "## ALIGNMENTS {:04} - {:04}",
                first + 1,
                first + hits.len()
            )?;
            writeln!(
                out,
                " SeqNo  PDBNo AA STRUCTURE BP1 BP2  ACC NOCC  VAR  {}",
                ruler(first)
            )?;

            for residue in &self.residues {
                let Some(site) = residue.site else {
                    writeln!(out, " {:05}{ALIGNMENT_BREAK}", residue.seq_nr)?;
                    continue;
                };

                let aligned: String = hits
                    .iter()
                    .map(|hit| {
                        if hit.covers(residue.seq_nr) {
                            hit.record.sequence().get(site.column).map_or(' ', char::from)
                        } else {
                            ' '
                        }
                    })
                    .collect();

                writeln!(
                    out,
                    " {:05}{}{:04} {:04}  {}",
                    residue.seq_nr,
                    self.arena.get(site.structure).formatted(),
                    residue.profile.nocc,
                    residue.profile.variability(),
                    aligned
                )?;
            }
        }
        Ok(())
    }

    fn write_profile(&self, out: &mut String) -> HsspResult<()> {
        writeln!(out, "## SEQUENCE PROFILE AND ENTROPY")?;
        writeln!(out, "{PROFILE_HEADER}")?;

        for residue in &self.residues {
            let Some(site) = residue.site else {
                writeln!(out, "{:05}{PROFILE_BREAK}", residue.seq_nr)?;
                continue;
            };

            let structure = self.arena.get(site.structure);
            let profile = &residue.profile;

            write!(
                out,
                "{:05}{:05} {}",
                residue.seq_nr, structure.number, structure.chain
            )?;
            for percentage in profile.percentages() {
                write!(out, "{percentage:04}")?;
            }
            writeln!(
                out,
                "  {:04} {:04} {:04}   {:5.3}   {:04}  {:4.2}",
                profile.nocc,
                profile.ndel,
                profile.nins,
                profile.entropy,
                profile.relative_entropy(),
                profile.weight
            )?;
        }
        Ok(())
    }

    fn write_insertions(&self, out: &mut String) -> HsspResult<()> {
        writeln!(out, "## INSERTION LIST")?;
        writeln!(out, " AliNo  IPOS  JPOS   Len Sequence")?;

        for hit in &self.hits {
            for insertion in hit.record.insertions() {
                let mut lines = insertion.text.as_bytes().chunks(INSERTION_LINE);
                let first = lines.next().unwrap_or_default();

                writeln!(
                    out,
                    " {:05} {:05} {:05} {:05} {}",
                    hit.nr,
                    self.insertion_position(hit, insertion),
                    insertion.hit_pos,
                    insertion.len(),
                    String::from_utf8_lossy(first)
                )?;
                for line in lines {
                    writeln!(out, "     +                   {}", String::from_utf8_lossy(line))?;
                }
            }
        }
        Ok(())
    }

    /// IPOS in report numbering
    fn insertion_position(&self, hit: &Hit, insertion: &Insertion) -> u32 {
        self.layouts
            .iter()
            .find(|layout| layout.chain_index == hit.chain_index)
            .map(|layout| layout.seq_number(insertion.query_pos))
            .filter(|&seq_nr| seq_nr > 0)
            .unwrap_or(insertion.query_pos + hit.offset)
    }
}

/// Ten-column ruler of an alignment block starting at hit index `first`
fn ruler(first: usize) -> String {
    (0..ALIGNMENT_BLOCK / 10)
        .map(|j| format!("....:....{}", ((first + 10 * j) / 10 + 1) % 10))
        .collect()
}

/// `100 * threshold` without trailing zeros
fn format_threshold(threshold: f64) -> String {
    let text = format!("{:.4}", 100.0 * threshold);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
