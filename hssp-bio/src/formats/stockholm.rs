//! HSSP-flavoured Stockholm input
//!
//! One `# STOCKHOLM 1.0` ... `//` block per chain. `#=GF ID` names the
//! reference row, `#=GS` lines declare and annotate hit rows, and `#=RI`
//! lines carry the structural annotation of the reference residues:
//!
//! ```text
//! #=RI <seqnr> <pdbnr>[icode] <chain> <aa> <structure text>
//! ```
//!
//! A `pdbnr` and `aa` of `!` mark a chain break. The structure text
//! follows the two spaces after `aa`, as in a DSSP residue line.

use super::{check_row_lengths, limit_rows, AlignmentSet, AlignmentSource, ChainAlignment};
use crate::sequence::{AlignmentRecord, RecordTag};
use crate::structure::{RecordedAnnotation, StructureEvent, StructuralResidue};
use hssp_core::{HsspError, HsspResult};
use nom::{
    branch::alt,
    bytes::complete::tag,
    character::complete::{anychar, char, digit1, satisfy, space1},
    combinator::{map, map_res, opt, recognize, rest},
    sequence::pair,
    IResult,
};
use std::collections::HashMap;
use std::io::BufRead;
use tracing::{debug, warn};

#[derive(Debug, Clone, Copy, Default)]
pub struct StockholmSource;

const HEADER_KEYS: [&str; 4] = ["HEADER", "COMPND", "SOURCE", "AUTHOR"];

/// Rows and annotation collected for one block
#[derive(Default)]
struct Block {
    reference: Option<String>,
    rows: Vec<AlignmentRecord>,
    index: HashMap<String, usize>,
    events: Vec<StructureEvent>,
}

impl Block {
    fn set_reference(&mut self, name: &str) -> HsspResult<()> {
        if self.reference.is_some() {
            return Err(HsspError::MalformedInput(format!(
                "second #=GF ID line ({name}) in one block"
            )));
        }

        let row = match self.index.get(name).copied() {
            Some(ix) => {
                for other in self.index.values_mut() {
                    if *other < ix {
                        *other += 1;
                    }
                }
                self.rows.remove(ix)
            }
            None => {
                for other in self.index.values_mut() {
                    *other += 1;
                }
                AlignmentRecord::new(name)
            }
        };

        self.rows.insert(0, row);
        self.index.insert(name.to_string(), 0);
        self.reference = Some(name.to_string());
        Ok(())
    }

    fn declare(&mut self, name: &str) -> &mut AlignmentRecord {
        let ix = match self.index.get(name) {
            Some(&ix) => ix,
            None => {
                self.rows.push(AlignmentRecord::new(name));
                self.index.insert(name.to_string(), self.rows.len() - 1);
                self.rows.len() - 1
            }
        };
        &mut self.rows[ix]
    }

    fn finish(self, block_nr: usize, max_rows: usize) -> HsspResult<ChainAlignment> {
        if self.reference.is_none() {
            return Err(HsspError::MalformedInput(format!(
                "Stockholm block {} has no #=GF ID line",
                block_nr + 1
            )));
        }

        let mut rows = self.rows;
        limit_rows(&mut rows, max_rows);
        check_row_lengths(&rows)?;
        for row in rows.iter_mut() {
            row.ensure_sequence_length();
        }

        let chain_id = self
            .events
            .iter()
            .find_map(|e| match e {
                StructureEvent::Residue(r) => Some(r.chain),
                StructureEvent::ChainBreak => None,
            })
            .unwrap_or((b'A' + (block_nr % 26) as u8) as char);

        let mut chain = ChainAlignment::new(chain_id, rows);
        if !self.events.is_empty() {
            chain.structure = Some(RecordedAnnotation {
                events: self.events,
            });
        }
        Ok(chain)
    }
}

fn residue_number(input: &str) -> IResult<&str, i32> {
    map_res(recognize(pair(opt(char('-')), digit1)), str::parse)(input)
}

/// PDB number with optional insertion code, or `!` on a break line
fn pdb_field(input: &str) -> IResult<&str, Option<(i32, Option<char>)>> {
    alt((
        map(char('!'), |_| None),
        map(
            pair(residue_number, opt(satisfy(|c| c.is_ascii_alphabetic()))),
            Some,
        ),
    ))(input)
}

/// Parse one `#=RI` line
fn parse_residue_line(input: &str) -> IResult<&str, StructureEvent> {
    let (input, _) = tag("#=RI")(input)?;
    let (input, _) = space1(input)?;
    let (input, _seq_nr) = digit1(input)?;
    let (input, _) = space1(input)?;
    let (input, pdb) = pdb_field(input)?;
    let (input, _) = space1(input)?;
    let (input, chain) = anychar(input)?;
    let (input, _) = space1(input)?;
    let (input, letter) = anychar(input)?;
    let (input, structure) = rest(input)?;

    let Some((number, insertion_code)) = pdb.filter(|_| letter != '!') else {
        return Ok((input, StructureEvent::ChainBreak));
    };

    let description = structure
        .strip_prefix("  ")
        .or_else(|| structure.strip_prefix(' '))
        .unwrap_or(structure);
    Ok((
        input,
        StructureEvent::Residue(
            StructuralResidue::new(number, chain, letter as u8)
                .with_insertion_code(insertion_code.unwrap_or(' '))
                .with_description(description.trim_end()),
        ),
    ))
}

fn malformed(line_nr: usize, what: &str) -> HsspError {
    HsspError::MalformedInput(format!("{what} at line {line_nr}"))
}

impl AlignmentSource for StockholmSource {
    fn read_alignment(
        &self,
        reader: &mut dyn BufRead,
        reference_hint: Option<&str>,
        max_rows: usize,
    ) -> HsspResult<AlignmentSet> {
        if reference_hint.is_some() {
            warn!("Stockholm input names its reference with #=GF ID; ignoring reference hint");
        }

        let mut set = AlignmentSet::new(Vec::new());
        let mut protein_id: Option<String> = None;
        let mut block: Option<Block> = None;
        let mut line = String::new();
        let mut line_nr = 0usize;

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_nr += 1;

            let text = line.trim_end_matches(['\n', '\r']);
            if text.trim().is_empty() {
                continue;
            }

            let Some(current) = block.as_mut() else {
                if text.starts_with("# STOCKHOLM") {
                    block = Some(Block::default());
                    continue;
                }
                return Err(malformed(line_nr, "expected '# STOCKHOLM 1.0'"));
            };

            if text == "//" {
                if let Some(done) = block.take() {
                    set.chains.push(done.finish(set.chains.len(), max_rows)?);
                }
                continue;
            }

            if let Some(name) = text.strip_prefix("#=GF ID ") {
                current.set_reference(name.trim())?;
            } else if let Some(id) = text.strip_prefix("#=GF CC PDBID ") {
                protein_id.get_or_insert_with(|| id.trim().to_string());
            } else if let Some(cc) = text.strip_prefix("#=GF CC ") {
                if let Some((key, value)) = cc.split_once(char::is_whitespace) {
                    let entry = format!("{:<11}{}", key, value.trim());
                    if HEADER_KEYS.contains(&key) && !set.header.contains(&entry) {
                        set.header.push(entry);
                    }
                }
            } else if let Some(gs) = text.strip_prefix("#=GS ") {
                let Some((name, annotation)) = gs.trim_start().split_once(char::is_whitespace)
                else {
                    return Err(malformed(line_nr, "incomplete #=GS line"));
                };
                let annotation = annotation.trim_start();
                let (tag, value) = annotation
                    .split_once(char::is_whitespace)
                    .unwrap_or((annotation, ""));
                let value = value.trim();

                let row = current.declare(name);
                match RecordTag::from_tag(tag) {
                    Some(tag) => row.apply_tag(tag, value)?,
                    None => debug!("Ignoring #=GS tag {} for {}", tag, name),
                }
            } else if text.starts_with("#=RI") {
                let (_, event) =
                    parse_residue_line(text).map_err(|_| malformed(line_nr, "invalid #=RI line"))?;
                current.events.push(event);
            } else if text.starts_with('#') {
                continue;
            } else {
                let Some((name, aligned)) = text.trim_start().split_once(char::is_whitespace)
                else {
                    return Err(malformed(line_nr, "sequence line without sequence"));
                };

                let Some(&ix) = current.index.get(name) else {
                    return Err(malformed(line_nr, &format!("undeclared row '{name}'")));
                };

                let fragment: Vec<u8> = aligned
                    .bytes()
                    .filter(|c| !c.is_ascii_whitespace())
                    .collect();
                current.rows[ix].append(&fragment);
            }
        }

        if block.is_some() {
            return Err(HsspError::MalformedInput(
                "Stockholm file is truncated or incomplete".to_string(),
            ));
        }
        if set.chains.is_empty() {
            return Err(HsspError::MalformedInput(
                "no Stockholm alignment blocks".to_string(),
            ));
        }

        if let Some(id) = protein_id {
            set.protein_id = id;
        }

        debug!(
            "Read {} Stockholm chains for {}",
            set.chains.len(),
            set.protein_id
        );
        Ok(set)
    }
}
