//! Structural annotation of reference residues
//!
//! Residue records live in a [`StructureArena`]; per-position entries refer
//! to them through a [`StructureRef`] index. Secondary structure and the
//! other DSSP columns are opaque text supplied by the input.

use crate::alphabet::is_gap;
use crate::profile::{ResidueInfo, ResidueSite};
use crate::sequence::AlignmentRecord;
use hssp_core::{HsspError, HsspResult};
use std::ops::Range;

/// One residue of the structure the reference sequence was taken from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuralResidue {
    pub number: i32,
    pub insertion_code: char,
    pub chain: char,
    pub letter: u8,
    /// Pre-formatted STRUCTURE, BP1, BP2 and ACC columns
    pub description: String,
}

impl StructuralResidue {
    pub fn new(number: i32, chain: char, letter: u8) -> Self {
        Self {
            number,
            insertion_code: ' ',
            chain,
            letter,
            description: String::new(),
        }
    }

    pub fn with_insertion_code(mut self, code: char) -> Self {
        self.insertion_code = code;
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// The 34 column `PDBNo AA STRUCTURE BP1 BP2  ACC` field of an alignment row
    pub fn formatted(&self) -> String {
        format!(
            "{:>5}{}{} {}  {:<23.23}",
            self.number, self.insertion_code, self.chain, self.letter as char, self.description
        )
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureEvent {
    Residue(StructuralResidue),
    /// Numbering is discontinuous at this point
    ChainBreak,
}

/// Supplies structural annotation for the residues of a reference row
pub trait StructuralAnnotationSource {
    /// Events in reference order, one `Residue` per non-gap reference column
    fn annotate(&self, reference: &AlignmentRecord) -> HsspResult<Vec<StructureEvent>>;
}

/// Annotation for a bare sequence: residues numbered from 1 on one chain
#[derive(Debug, Clone, Copy)]
pub struct SequenceOnlyAnnotation {
    pub chain: char,
}

impl Default for SequenceOnlyAnnotation {
    fn default() -> Self {
        Self { chain: 'A' }
    }
}

impl StructuralAnnotationSource for SequenceOnlyAnnotation {
    fn annotate(&self, reference: &AlignmentRecord) -> HsspResult<Vec<StructureEvent>> {
        Ok(reference
            .sequence()
            .as_bytes()
            .iter()
            .filter(|&&c| !is_gap(c))
            .enumerate()
            .map(|(i, &c)| {
                StructureEvent::Residue(StructuralResidue::new(
                    i as i32 + 1,
                    self.chain,
                    c.to_ascii_uppercase(),
                ))
            })
            .collect())
    }
}

/// Annotation read from the input file
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordedAnnotation {
    pub events: Vec<StructureEvent>,
}

impl StructuralAnnotationSource for RecordedAnnotation {
    fn annotate(&self, reference: &AlignmentRecord) -> HsspResult<Vec<StructureEvent>> {
        let recorded = self
            .events
            .iter()
            .filter(|e| matches!(e, StructureEvent::Residue(_)))
            .count();
        let expected = reference.sequence().residue_count();

        if recorded != expected {
            return Err(HsspError::MalformedInput(format!(
                "{} residue annotations for {} residues in {}",
                recorded,
                expected,
                reference.id()
            )));
        }

        Ok(self.events.clone())
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct StructureRef(usize);

#[derive(Debug, Default)]
pub struct StructureArena {
    residues: Vec<StructuralResidue>,
}

impl StructureArena {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, residue: StructuralResidue) -> StructureRef {
        self.residues.push(residue);
        StructureRef(self.residues.len() - 1)
    }

    pub fn get(&self, handle: StructureRef) -> &StructuralResidue {
        &self.residues[handle.0]
    }

    pub fn len(&self) -> usize {
        self.residues.len()
    }

    pub fn is_empty(&self) -> bool {
        self.residues.is_empty()
    }
}

/// Where one chain's reference residues ended up in the report numbering
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChainLayout {
    pub chain_index: usize,
    pub chain_id: char,
    /// Index range of the chain's entries in the residue list
    pub residues: Range<usize>,
    /// Report sequence number of each reference position, 1-based positions
    seq_numbers: Vec<u32>,
}

impl ChainLayout {
    /// Report sequence number of reference position `query_pos`
    pub fn seq_number(&self, query_pos: u32) -> u32 {
        match query_pos {
            0 => 0,
            p => self
                .seq_numbers
                .get(p as usize - 1)
                .copied()
                .unwrap_or_default(),
        }
    }

    /// Offset between reference positions and report numbering at the
    /// start of the chain
    pub fn offset(&self) -> u32 {
        self.seq_numbers.first().map_or(0, |&first| first - 1)
    }

    pub fn residue_count(&self) -> usize {
        self.seq_numbers.len()
    }
}

/// Append one chain's reference residues to `residues`.
///
/// A chain-break placeholder separates consecutive chains and marks every
/// explicit break or numbering jump inside a chain; placeholders never
/// follow each other.
pub fn lay_out_chain(
    chain_index: usize,
    chain_id: char,
    reference: &AlignmentRecord,
    events: Vec<StructureEvent>,
    arena: &mut StructureArena,
    residues: &mut Vec<ResidueInfo>,
) -> HsspResult<ChainLayout> {
    if !residues.is_empty() {
        push_break(residues);
    }

    let start = residues.len();
    let mut seq_numbers = Vec::new();
    let mut events = events.into_iter();
    let mut previous: Option<i32> = None;
    let mut query_pos = 0u32;

    for (column, &letter) in reference.sequence().as_bytes().iter().enumerate() {
        if is_gap(letter) {
            continue;
        }
        query_pos += 1;

        let mut pending_break = false;
        let residue = loop {
            match events.next() {
                Some(StructureEvent::ChainBreak) => pending_break = true,
                Some(StructureEvent::Residue(residue)) => break residue,
                None => {
                    return Err(HsspError::MalformedInput(format!(
                        "structure annotation of {} ends at residue {}",
                        reference.id(),
                        query_pos
                    )))
                }
            }
        };

        if previous.is_some_and(|number| residue.number > number + 1) {
            pending_break = true;
        }
        if pending_break && previous.is_some() {
            push_break(residues);
        }
        previous = Some(residue.number);

        let seq_nr = residues.len() as u32 + 1;
        let structure = arena.push(residue);
        residues.push(ResidueInfo::residue(
            seq_nr,
            ResidueSite {
                chain_index,
                query_pos,
                column,
                letter: letter.to_ascii_uppercase(),
                structure,
            },
        ));
        seq_numbers.push(seq_nr);
    }

    Ok(ChainLayout {
        chain_index,
        chain_id,
        residues: start..residues.len(),
        seq_numbers,
    })
}

fn push_break(residues: &mut Vec<ResidueInfo>) {
    if residues.last().is_some_and(|r| !r.is_break()) {
        let seq_nr = residues.len() as u32 + 1;
        residues.push(ResidueInfo::chain_break(seq_nr));
    }
}
