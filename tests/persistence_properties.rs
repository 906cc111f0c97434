// ClipGuardian - Proprietes de la persistance
//
// load(save(store)) == store, pour des stores vides ou pleins, tous
// formats confondus, avec des entrees epinglees.

use clipguardian::history::{EntryFormat, HistoryStore};
use clipguardian::storage::Vault;
use proptest::prelude::*;

fn format() -> impl Strategy<Value = EntryFormat> {
    (0u8..7).prop_map(|v| EntryFormat::from_u8(v).unwrap())
}

fn copies() -> impl Strategy<Value = Vec<(EntryFormat, Vec<u8>, bool)>> {
    proptest::collection::vec(
        (format(), proptest::collection::vec(any::<u8>(), 1..48), any::<bool>()),
        1..24,
    )
}

fn roundtrip(store: &HistoryStore) -> HistoryStore {
    let dir = tempfile::tempdir().unwrap();
    let vault = Vault::new(dir.path());
    vault.save_store(store).unwrap();
    Vault::new(dir.path()).load(store.capacity()).unwrap()
}

proptest! {
    #![proptest_config(ProptestConfig::with_cases(64))]

    #[test]
    fn saved_store_reloads_identically(capacity in 1usize..6, copies in copies()) {
        let mut store = HistoryStore::new(capacity).unwrap();
        for (format, content, pin) in copies {
            let id = store.insert(format, content);
            if pin {
                store.toggle_pin(id);
            }
        }
        prop_assert_eq!(roundtrip(&store), store);
    }
}

#[test]
fn empty_store_reloads_empty() {
    let store = HistoryStore::new(7).unwrap();
    let reloaded = roundtrip(&store);
    assert!(reloaded.is_empty());
    assert_eq!(reloaded, store);
}

#[test]
fn full_store_with_every_format_reloads_identically() {
    let mut store = HistoryStore::new(7).unwrap();
    for v in 0u8..7 {
        let format = EntryFormat::from_u8(v).unwrap();
        let id = store.insert(format, vec![v; 16 + v as usize]);
        if v % 2 == 0 {
            store.toggle_pin(id);
        }
    }
    assert_eq!(store.len(), store.capacity());
    assert_eq!(roundtrip(&store), store);
}
