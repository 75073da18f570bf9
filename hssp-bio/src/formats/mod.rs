pub mod fasta;
pub mod hssp;
pub mod stockholm;

use crate::sequence::AlignmentRecord;
use crate::structure::RecordedAnnotation;
use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use flate2::Compression;
use hssp_core::{HsspError, HsspResult};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::str::FromStr;

// Re-export commonly used types
pub use fasta::FastaSource;
pub use hssp::{HsspReport, ReportHeader};
pub use stockholm::StockholmSource;

/// Protein ID used when the input names none
pub const UNDEFINED_PROTEIN: &str = "UNDF";

/// The aligned rows of one chain; row 0 is the reference
#[derive(Debug, Clone)]
pub struct ChainAlignment {
    pub chain_id: char,
    pub rows: Vec<AlignmentRecord>,
    /// Structural annotation from the input, if it carried any
    pub structure: Option<RecordedAnnotation>,
}

impl ChainAlignment {
    pub fn new(chain_id: char, rows: Vec<AlignmentRecord>) -> Self {
        Self {
            chain_id,
            rows,
            structure: None,
        }
    }

    pub fn reference(&self) -> Option<&AlignmentRecord> {
        self.rows.first()
    }

    pub fn hit_count(&self) -> usize {
        self.rows.len().saturating_sub(1)
    }
}

/// Everything read from one alignment input
#[derive(Debug, Clone)]
pub struct AlignmentSet {
    pub protein_id: String,
    /// HEADER, COMPND, SOURCE and AUTHOR lines, already laid out
    pub header: Vec<String>,
    pub chains: Vec<ChainAlignment>,
}

impl AlignmentSet {
    pub fn new(chains: Vec<ChainAlignment>) -> Self {
        Self {
            protein_id: UNDEFINED_PROTEIN.to_string(),
            header: Vec::new(),
            chains,
        }
    }
}

/// Reads raw aligned rows, reference first
pub trait AlignmentSource {
    /// `max_rows` limits the number of hit rows per chain; zero keeps all
    fn read_alignment(
        &self,
        reader: &mut dyn BufRead,
        reference_hint: Option<&str>,
        max_rows: usize,
    ) -> HsspResult<AlignmentSet>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlignmentFormat {
    Fasta,
    Stockholm,
}

impl AlignmentFormat {
    /// Guess the format from the first non-blank text
    pub fn detect(content: &[u8]) -> Self {
        let start = content
            .iter()
            .position(|c| !c.is_ascii_whitespace())
            .unwrap_or(content.len());

        if content[start..].starts_with(b"# STOCKHOLM") {
            AlignmentFormat::Stockholm
        } else {
            AlignmentFormat::Fasta
        }
    }

    pub fn source(&self) -> Box<dyn AlignmentSource> {
        match self {
            AlignmentFormat::Fasta => Box::new(FastaSource),
            AlignmentFormat::Stockholm => Box::new(StockholmSource),
        }
    }
}

impl FromStr for AlignmentFormat {
    type Err = HsspError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "fasta" | "fa" | "fas" => Ok(AlignmentFormat::Fasta),
            "stockholm" | "sto" | "sth" => Ok(AlignmentFormat::Stockholm),
            other => Err(HsspError::Configuration(format!(
                "unknown alignment format '{other}'"
            ))),
        }
    }
}

/// Compression of an input or output file, by extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Codec {
    Plain,
    Gzip,
    Bzip2,
}

impl Codec {
    fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|s| s.to_str()) {
            Some("gz") => Codec::Gzip,
            Some("bz2") => Codec::Bzip2,
            _ => Codec::Plain,
        }
    }
}

/// Read a whole input file, decompressing `.gz` and `.bz2` files
pub fn read_input<P: AsRef<Path>>(path: P) -> HsspResult<Vec<u8>> {
    let path = path.as_ref();
    let file = File::open(path)?;
    let mut buffer = Vec::new();

    match Codec::from_path(path) {
        Codec::Gzip => {
            GzDecoder::new(BufReader::new(file)).read_to_end(&mut buffer)?;
        }
        Codec::Bzip2 => {
            BzDecoder::new(BufReader::new(file)).read_to_end(&mut buffer)?;
        }
        Codec::Plain => {
            BufReader::new(file).read_to_end(&mut buffer)?;
        }
    }

    Ok(buffer)
}

/// Read and parse an alignment file, detecting the format unless given
pub fn read_alignment_file<P: AsRef<Path>>(
    path: P,
    format: Option<AlignmentFormat>,
    reference_hint: Option<&str>,
    max_rows: usize,
) -> HsspResult<AlignmentSet> {
    let content = read_input(path)?;
    let format = format.unwrap_or_else(|| AlignmentFormat::detect(&content));
    format
        .source()
        .read_alignment(&mut content.as_slice(), reference_hint, max_rows)
}

/// Write finished output in one go. `.gz` and `.bz2` paths are compressed
/// accordingly; `compress` gzips any other path.
pub fn write_output<P: AsRef<Path>>(path: P, content: &[u8], compress: bool) -> HsspResult<()> {
    let path = path.as_ref();
    let codec = match Codec::from_path(path) {
        Codec::Plain if compress => Codec::Gzip,
        codec => codec,
    };
    let file = File::create(path)?;

    match codec {
        Codec::Gzip => {
            let mut writer = BufWriter::new(GzEncoder::new(file, Compression::default()));
            writer.write_all(content)?;
            writer
                .into_inner()
                .map_err(|e| HsspError::Io(e.into_error()))?
                .finish()?;
        }
        Codec::Bzip2 => {
            let mut writer = BufWriter::new(BzEncoder::new(file, bzip2::Compression::default()));
            writer.write_all(content)?;
            writer
                .into_inner()
                .map_err(|e| HsspError::Io(e.into_error()))?
                .finish()?;
        }
        Codec::Plain => {
            let mut writer = BufWriter::new(file);
            writer.write_all(content)?;
            writer.flush()?;
        }
    }

    Ok(())
}

/// Every row of an alignment must have the reference's length
pub(crate) fn check_row_lengths(rows: &[AlignmentRecord]) -> HsspResult<()> {
    let Some(reference) = rows.first() else {
        return Ok(());
    };

    match rows.iter().find(|r| r.len() != reference.len()) {
        Some(row) => Err(HsspError::MalformedInput(format!(
            "row {} has length {}, reference {} has {}",
            row.id(),
            row.len(),
            reference.id(),
            reference.len()
        ))),
        None => Ok(()),
    }
}

/// Keep the reference and at most `max_rows` hits
pub(crate) fn limit_rows(rows: &mut Vec<AlignmentRecord>, max_rows: usize) {
    if max_rows > 0 && rows.len() > max_rows + 1 {
        rows.truncate(max_rows + 1);
    }
}
