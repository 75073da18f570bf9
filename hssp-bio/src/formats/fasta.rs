use super::{check_row_lengths, limit_rows, AlignmentSet, AlignmentSource, ChainAlignment};
use crate::sequence::AlignmentRecord;
use hssp_core::{HsspError, HsspResult};
use nom::{
    bytes::complete::{tag, take_till1},
    character::complete::{char, space0, space1},
    combinator::{opt, rest},
    sequence::preceded,
    IResult,
};
use std::io::BufRead;
use tracing::debug;

/// Aligned FastA: every record holds one gapped row of the alignment
#[derive(Debug, Clone, Copy, Default)]
pub struct FastaSource;

/// Identifier fields of a header line
#[derive(Debug, Clone, PartialEq, Eq)]
struct Header<'a> {
    accession: &'a str,
    id: &'a str,
    description: &'a str,
}

/// Parse a header line without its trailing newline
fn parse_header(input: &str) -> IResult<&str, Header<'_>> {
    let (input, _) = tag(">")(input)?;
    let (input, _) = space0(input)?;
    let (input, name) = take_till1(|c: char| c.is_whitespace())(input)?;
    let (input, description) = opt(preceded(space1, rest))(input)?;

    let (accession, id) = split_database_name(name);
    Ok((
        input,
        Header {
            accession,
            id,
            description: description.unwrap_or("").trim_end(),
        },
    ))
}

/// `db|ACCESSION|ENTRY_NAME` names carry both identifiers
fn split_database_name(name: &str) -> (&str, &str) {
    fn fields(input: &str) -> IResult<&str, (&str, &str)> {
        let (input, _) = take_till1(|c: char| c == '|')(input)?;
        let (input, accession) = preceded(char('|'), take_till1(|c: char| c == '|'))(input)?;
        let (input, id) = preceded(char('|'), rest)(input)?;
        Ok((input, (accession, id)))
    }

    match fields(name) {
        Ok((_, (accession, id))) if !id.is_empty() => (accession, id),
        _ => (name, name),
    }
}

impl AlignmentSource for FastaSource {
    fn read_alignment(
        &self,
        reader: &mut dyn BufRead,
        reference_hint: Option<&str>,
        max_rows: usize,
    ) -> HsspResult<AlignmentSet> {
        let mut rows: Vec<AlignmentRecord> = Vec::new();
        let mut line = String::new();
        let mut line_nr = 0usize;

        loop {
            line.clear();
            if reader.read_line(&mut line)? == 0 {
                break;
            }
            line_nr += 1;

            let text = line.trim_end();
            if text.is_empty() {
                continue;
            }

            if text.starts_with('>') {
                let (_, header) = parse_header(text).map_err(|_| {
                    HsspError::Parse(format!("invalid FastA header at line {line_nr}"))
                })?;

                rows.push(
                    AlignmentRecord::new(header.id)
                        .with_accession(header.accession)
                        .with_description(header.description),
                );
                continue;
            }

            let Some(row) = rows.last_mut() else {
                return Err(HsspError::MalformedInput(format!(
                    "sequence data before the first FastA header at line {line_nr}"
                )));
            };

            let fragment: Vec<u8> = text.bytes().filter(|c| !c.is_ascii_whitespace()).collect();
            row.append(&fragment);
        }

        if rows.is_empty() {
            return Err(HsspError::MalformedInput("no sequences in FastA input".to_string()));
        }

        if let Some(hint) = reference_hint {
            let ix = rows
                .iter()
                .position(|r| r.id() == hint || r.accession() == hint)
                .ok_or_else(|| {
                    HsspError::MalformedInput(format!("reference sequence {hint} not found"))
                })?;
            let reference = rows.remove(ix);
            rows.insert(0, reference);
        }

        limit_rows(&mut rows, max_rows);
        check_row_lengths(&rows)?;
        for row in rows.iter_mut() {
            row.ensure_sequence_length();
        }

        debug!("Read {} FastA rows", rows.len());
        Ok(AlignmentSet::new(vec![ChainAlignment::new('A', rows)]))
    }
}
