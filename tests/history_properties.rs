// ClipGuardian - Proprietes de l'historique
//
// Sequences aleatoires d'insertions, suppressions et epinglages : les
// invariants du store doivent tenir apres chaque operation.

use clipguardian::history::{EntryFormat, Fingerprint, HistoryStore};
use proptest::prelude::*;
use std::collections::HashSet;

#[derive(Debug, Clone)]
enum Op {
    Insert { text: u8, at: i64 },
    Remove(usize),
    Pin(usize),
}

fn op() -> impl Strategy<Value = Op> {
    prop_oneof![
        6 => (0u8..12, 0i64..50).prop_map(|(text, at)| Op::Insert { text, at }),
        1 => (0usize..16).prop_map(Op::Remove),
        1 => (0usize..16).prop_map(Op::Pin),
    ]
}

fn apply(store: &mut HistoryStore, op: &Op) {
    match *op {
        Op::Insert { text, at } => {
            store.insert_at(EntryFormat::Text, format!("item-{}", text).into_bytes(), at);
        }
        Op::Remove(i) => {
            if let Some(id) = store.get(i).map(|e| e.id()) {
                store.remove(id);
            }
        }
        Op::Pin(i) => {
            if let Some(id) = store.get(i).map(|e| e.id()) {
                store.toggle_pin(id);
            }
        }
    }
}

fn check_invariants(store: &HistoryStore) -> Result<(), TestCaseError> {
    prop_assert!(store.len() <= store.capacity());

    let fingerprints: HashSet<Fingerprint> = store.iter().map(|e| e.fingerprint()).collect();
    prop_assert_eq!(fingerprints.len(), store.len());

    let stamps: Vec<i64> = store.iter().map(|e| e.last_seen_at()).collect();
    for pair in stamps.windows(2) {
        prop_assert!(pair[0] > pair[1], "not strictly ordered: {:?}", stamps);
    }
    Ok(())
}

proptest! {
    #[test]
    fn invariants_hold_after_every_operation(
        capacity in 1usize..8,
        ops in proptest::collection::vec(op(), 1..60),
    ) {
        let mut store = HistoryStore::new(capacity).unwrap();
        for op in &ops {
            apply(&mut store, op);
            check_invariants(&store)?;
        }
    }

    #[test]
    fn last_insert_is_always_at_front(
        capacity in 1usize..6,
        texts in proptest::collection::vec(0u8..10, 1..40),
    ) {
        let mut store = HistoryStore::new(capacity).unwrap();
        for (i, text) in texts.iter().enumerate() {
            let content = format!("item-{}", text).into_bytes();
            let id = store.insert_at(EntryFormat::Text, content.clone(), i as i64);
            let front = store.get(0).unwrap();
            prop_assert_eq!(front.id(), id);
            prop_assert_eq!(front.content(), &content[..]);
        }
    }

    #[test]
    fn duplicate_insert_never_grows(
        texts in proptest::collection::vec(0u8..5, 1..30),
    ) {
        let mut store = HistoryStore::new(100).unwrap();
        let mut distinct = HashSet::new();
        for text in &texts {
            store.insert(EntryFormat::Text, vec![*text]);
            distinct.insert(*text);
            prop_assert_eq!(store.len(), distinct.len());
        }
    }
}

#[test]
fn stamps_stay_strict_when_clock_goes_back() {
    let mut store = HistoryStore::new(10).unwrap();
    store.insert_at(EntryFormat::Text, b"a".to_vec(), 1000);
    store.insert_at(EntryFormat::Text, b"b".to_vec(), 1000);
    store.insert_at(EntryFormat::Text, b"c".to_vec(), 10);
    let stamps: Vec<i64> = store.iter().map(|e| e.last_seen_at()).collect();
    assert_eq!(stamps, vec![1002, 1001, 1000]);
}

#[test]
fn same_bytes_in_different_formats_are_distinct() {
    let mut store = HistoryStore::new(10).unwrap();
    store.insert(EntryFormat::Text, b"<b>x</b>".to_vec());
    store.insert(EntryFormat::Html, b"<b>x</b>".to_vec());
    assert_eq!(store.len(), 2);
}
