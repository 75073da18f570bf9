//! Tagged-line grammar for per-row metadata
//!
//! Stockholm `#=GS <name> <TAG> <value>` lines carry row metadata. Each
//! recognised tag maps to one field setter on [`AlignmentRecord`]; the `HSSP`
//! tag value is itself a list of `key=value` tokens:
//!
//! ```text
//! score=0.98/1.00 aligned=1-46/1-46 length=46 ngaps=0 gaplen=0 seqlen=46
//! ```
//!
//! [`AlignmentRecord`]: super::AlignmentRecord

use super::record::AlignmentStats;
use hssp_core::{HsspError, HsspResult};
use std::str::FromStr;

/// Recognised `#=GS` tags
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecordTag {
    Id,
    Description,
    Accession,
    Pdb,
    Hssp,
}

impl RecordTag {
    pub fn from_tag(tag: &str) -> Option<Self> {
        match tag {
            "ID" => Some(RecordTag::Id),
            "DE" => Some(RecordTag::Description),
            "AC" => Some(RecordTag::Accession),
            "PDB" => Some(RecordTag::Pdb),
            "HSSP" => Some(RecordTag::Hssp),
            _ => None,
        }
    }
}

/// Precomputed alignment figures attached to a row by an earlier search
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HsspAnnotation {
    pub identity: Option<f64>,
    pub similarity: Option<f64>,
    pub query_range: Option<(u32, u32)>,
    pub hit_range: Option<(u32, u32)>,
    pub aligned_length: Option<u32>,
    pub gap_count: Option<u32>,
    pub gap_length: Option<u32>,
    pub sequence_length: Option<u32>,
}

impl HsspAnnotation {
    /// Parse the token list. Unknown keys are skipped; a known key with a
    /// malformed value is an error.
    pub fn parse(value: &str) -> HsspResult<Self> {
        let mut annotation = Self::default();

        for token in value.split_whitespace() {
            let Some((key, raw)) = token.split_once('=') else {
                continue;
            };

            match key {
                "score" => {
                    let (ide, sim) = split_pair(raw, '/', token)?;
                    annotation.identity = Some(number(ide, token)?);
                    annotation.similarity = Some(number(sim, token)?);
                }
                "aligned" => {
                    let (query, hit) = split_pair(raw, '/', token)?;
                    annotation.query_range = Some(range(query, token)?);
                    annotation.hit_range = Some(range(hit, token)?);
                }
                "length" => annotation.aligned_length = Some(number(raw, token)?),
                "ngaps" => annotation.gap_count = Some(number(raw, token)?),
                "gaplen" => annotation.gap_length = Some(number(raw, token)?),
                "seqlen" => annotation.sequence_length = Some(number(raw, token)?),
                _ => {}
            }
        }

        Ok(annotation)
    }

    /// Recorded figures that disagree with freshly computed statistics,
    /// as `key recorded->computed` strings. Fractions compare at two decimals,
    /// the precision they are written with.
    pub fn discrepancies(&self, stats: &AlignmentStats) -> Vec<String> {
        let mut drift = Vec::new();

        let fractions = [
            ("identity", self.identity, stats.identity()),
            ("similarity", self.similarity, stats.similarity()),
        ];
        for (key, recorded, computed) in fractions {
            if let Some(recorded) = recorded {
                if (recorded - computed).abs() > 0.005 {
                    drift.push(format!("{key} {recorded:.2}->{computed:.2}"));
                }
            }
        }

        let ranges = [
            ("query", self.query_range, (stats.query_first, stats.query_last)),
            ("hit", self.hit_range, (stats.hit_first, stats.hit_last)),
        ];
        for (key, recorded, computed) in ranges {
            if let Some(recorded) = recorded {
                if recorded != computed {
                    drift.push(format!(
                        "{key} {}-{}->{}-{}",
                        recorded.0, recorded.1, computed.0, computed.1
                    ));
                }
            }
        }

        let counts = [
            ("length", self.aligned_length, stats.aligned_length),
            ("ngaps", self.gap_count, stats.gap_events),
            ("gaplen", self.gap_length, stats.gap_residues),
        ];
        for (key, recorded, computed) in counts {
            if let Some(recorded) = recorded {
                if recorded != computed {
                    drift.push(format!("{key} {recorded}->{computed}"));
                }
            }
        }

        drift
    }
}

fn split_pair<'a>(raw: &'a str, separator: char, token: &str) -> HsspResult<(&'a str, &'a str)> {
    raw.split_once(separator)
        .ok_or_else(|| HsspError::MalformedInput(format!("bad HSSP annotation token '{token}'")))
}

fn range(raw: &str, token: &str) -> HsspResult<(u32, u32)> {
    let (first, last) = split_pair(raw, '-', token)?;
    Ok((number(first, token)?, number(last, token)?))
}

fn number<T: FromStr>(raw: &str, token: &str) -> HsspResult<T> {
    raw.parse()
        .map_err(|_| HsspError::MalformedInput(format!("bad HSSP annotation token '{token}'")))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_full_annotation() {
        let annotation = HsspAnnotation::parse(
            "score=0.98/1.00 aligned=1-46/3-48 length=46 ngaps=1 gaplen=2 seqlen=52",
        )
        .unwrap();

        assert_eq!(annotation.identity, Some(0.98));
        assert_eq!(annotation.similarity, Some(1.0));
        assert_eq!(annotation.query_range, Some((1, 46)));
        assert_eq!(annotation.hit_range, Some((3, 48)));
        assert_eq!(annotation.aligned_length, Some(46));
        assert_eq!(annotation.gap_count, Some(1));
        assert_eq!(annotation.gap_length, Some(2));
        assert_eq!(annotation.sequence_length, Some(52));
    }

    #[test]
    fn test_unknown_keys_and_bare_words_are_ignored() {
        let annotation = HsspAnnotation::parse("evalue=1e-5 seqlen=10 extra").unwrap();
        assert_eq!(annotation.sequence_length, Some(10));
        assert_eq!(annotation.hit_range, None);
    }

    #[test]
    fn test_malformed_known_key() {
        let err = HsspAnnotation::parse("aligned=1-46").unwrap_err();
        assert!(matches!(err, HsspError::MalformedInput(_)));

        let err = HsspAnnotation::parse("seqlen=abc").unwrap_err();
        assert!(matches!(err, HsspError::MalformedInput(_)));
    }

    #[test]
    fn test_discrepancies_against_computed_stats() {
        let annotation = HsspAnnotation::parse(
            "score=0.80/0.90 aligned=1-10/3-12 length=10 ngaps=1 gaplen=2 seqlen=20",
        )
        .unwrap();

        let mut stats = AlignmentStats {
            identical: 8,
            similar: 9,
            query_first: 1,
            query_last: 10,
            hit_first: 3,
            hit_last: 12,
            gap_events: 1,
            gap_residues: 2,
            aligned_length: 10,
            score: 0.8,
            ..Default::default()
        };
        assert!(annotation.discrepancies(&stats).is_empty());

        stats.hit_first = 1;
        stats.gap_residues = 3;
        stats.score = 0.7;
        assert_eq!(
            annotation.discrepancies(&stats),
            vec!["identity 0.80->0.70", "hit 3-12->1-12", "gaplen 2->3"]
        );

        // absent keys are never reported
        assert!(HsspAnnotation::default().discrepancies(&stats).is_empty());
    }

    #[test]
    fn test_tags() {
        assert_eq!(RecordTag::from_tag("DE"), Some(RecordTag::Description));
        assert_eq!(RecordTag::from_tag("HSSP"), Some(RecordTag::Hssp));
        assert_eq!(RecordTag::from_tag("OS"), None);
    }
}
