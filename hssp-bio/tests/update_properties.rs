//! Property tests for the row statistics update and hit ranking
use hssp_bio::hits::DocumentId;
use hssp_bio::{AlignmentRecord, Hit, HitTable, StatisticsUpdater, BLOSUM62};
use hssp_core::HsspError;
use proptest::prelude::*;

const COLUMN_ALPHABET: &[u8] = b"ACDEFGHIKLMNPQRSTVWYBZX--";

fn column() -> impl Strategy<Value = (u8, u8)> {
    (
        prop::sample::select(COLUMN_ALPHABET),
        prop::sample::select(COLUMN_ALPHABET),
    )
}

fn alignment_pair() -> impl Strategy<Value = (Vec<u8>, Vec<u8>)> {
    prop::collection::vec(column(), 1..160).prop_map(|columns| columns.into_iter().unzip())
}

proptest! {
    #[test]
    fn active_range_and_positions_are_ordered((query, hit) in alignment_pair()) {
        let matrix = BLOSUM62::new();
        let reference = AlignmentRecord::new("query").with_sequence(&query);
        let updater = StatisticsUpdater::new(&reference, &matrix).unwrap();
        let mut record = AlignmentRecord::new("hit").with_sequence(&hit);
        let aligned = record.has_aligned_column(&reference);

        match updater.update(&mut record) {
            Ok(()) => {
                let stats = record.stats();
                prop_assert!(aligned);
                prop_assert!(stats.active_begin <= stats.active_end);
                prop_assert!(stats.active_end <= record.len());
                prop_assert!(stats.query_first <= stats.query_last);
                prop_assert!(stats.hit_first <= stats.hit_last);
                prop_assert!(stats.identical <= stats.aligned_length);

                let positions: Vec<u32> =
                    record.insertions().iter().map(|i| i.query_pos).collect();
                prop_assert!(positions.windows(2).all(|w| w[0] <= w[1]));
            }
            Err(HsspError::DegenerateAlignment(_)) => prop_assert!(!aligned),
            Err(other) => prop_assert!(false, "unexpected error {}", other),
        }
    }

    #[test]
    fn update_is_idempotent((query, hit) in alignment_pair()) {
        let matrix = BLOSUM62::new();
        let reference = AlignmentRecord::new("query").with_sequence(&query);
        let updater = StatisticsUpdater::new(&reference, &matrix).unwrap();
        let mut record = AlignmentRecord::new("hit").with_sequence(&hit);

        if updater.update(&mut record).is_ok() {
            let stats = *record.stats();
            let insertions = record.insertions().to_vec();
            let text = record.sequence().as_bytes().to_vec();

            updater.update(&mut record).unwrap();
            prop_assert_eq!(*record.stats(), stats);
            prop_assert_eq!(record.insertions(), insertions.as_slice());
            prop_assert_eq!(record.sequence().as_bytes(), text.as_slice());
        }
    }

    #[test]
    fn truncation_keeps_ranked_prefix(
        scores in prop::collection::vec((1u32..50, 50u32..100), 1..40),
        max_hits in 0usize..50,
    ) {
        let matrix = BLOSUM62::new();
        let hits: Vec<Hit> = scores
            .iter()
            .enumerate()
            .map(|(i, &(identical, length))| {
                let query = vec![b'A'; length as usize];
                let mut text = vec![b'A'; identical as usize];
                text.resize(length as usize, b'W');

                let reference = AlignmentRecord::new("query").with_sequence(&query);
                let updater = StatisticsUpdater::new(&reference, &matrix).unwrap();
                let mut record = AlignmentRecord::new(format!("hit{i:03}")).with_sequence(&text);
                updater.update(&mut record).unwrap();
                Hit::new(record, DocumentId(i as u32), 0, 'A', 0)
            })
            .collect();

        let total = hits.len();
        let mut table = HitTable::from(hits);
        table.rank();
        let ranked: Vec<String> =
            table.hits().iter().map(|h| h.record.id().to_string()).collect();
        table.truncate(max_hits).unwrap();

        let expected = if max_hits == 0 { total } else { max_hits.min(total) };
        prop_assert_eq!(table.len(), expected);
        for (i, hit) in table.hits().iter().enumerate() {
            prop_assert_eq!(hit.nr as usize, i + 1);
            prop_assert_eq!(hit.record.id(), ranked[i].as_str());
        }
        prop_assert!(table
            .hits()
            .windows(2)
            .all(|w| w[0].identity() >= w[1].identity()));
    }
}

#[test]
fn ranking_tie_break_example() {
    // scores [0.9, 0.9, 0.5] with lengths [100, 80, 100] keep their order
    let matrix = BLOSUM62::new();
    let make = |name: &str, identical: usize, length: usize| {
        let query = vec![b'A'; length];
        let mut text = vec![b'A'; identical];
        text.resize(length, b'W');
        let reference = AlignmentRecord::new("query").with_sequence(&query);
        let updater = StatisticsUpdater::new(&reference, &matrix).unwrap();
        let mut record = AlignmentRecord::new(name).with_sequence(&text);
        updater.update(&mut record).unwrap();
        Hit::new(record, DocumentId(0), 0, 'A', 0)
    };

    let mut table = HitTable::from(vec![make("c", 50, 100), make("b", 72, 80), make("a", 90, 100)]);
    table.rank();
    let order: Vec<&str> = table.hits().iter().map(|h| h.record.id()).collect();
    assert_eq!(order, vec!["a", "b", "c"]);
}
