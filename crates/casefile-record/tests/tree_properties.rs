use casefile_record::{CollectionPath, FieldPath, RecordShape, SubRecord};
use proptest::prelude::*;
use std::sync::Arc;

fn scn_shape() -> Arc<RecordShape> {
    let amount = RecordShape::builder("amount")
        .required_text("amount_type")
        .amount("amount", true)
        .text("description")
        .build();
    let noticee = RecordShape::builder("noticee")
        .required_text("name_of_noticee")
        .text("address")
        .collection("amounts", amount)
        .build();
    RecordShape::builder("scn")
        .required_text("scn_number")
        .collection("noticees", noticee)
        .build()
}

/// Tree with `amount_counts.len()` noticees, each with the given number of amounts
fn build_tree(amount_counts: &[usize]) -> SubRecord {
    let noticees = CollectionPath::root("noticees");
    let mut root = SubRecord::default_for(&scn_shape());
    for _ in 1..amount_counts.len() {
        root = root.insert_default(&noticees).unwrap();
    }
    for (n, count) in amount_counts.iter().enumerate() {
        let amounts = noticees.nested(n, "amounts");
        for _ in 1..*count {
            root = root.insert_default(&amounts).unwrap();
        }
        for a in 0..*count {
            root = root
                .update(&amounts, a, "amount", format!("{n}{a}"))
                .unwrap();
        }
    }
    root
}

fn leaf_values(root: &SubRecord) -> Vec<(FieldPath, String)> {
    root.leaves()
        .into_iter()
        .map(|leaf| (leaf.path, leaf.value.to_string()))
        .collect()
}

#[test]
fn default_is_deterministic() {
    let shape = scn_shape();
    assert_eq!(SubRecord::default_for(&shape), SubRecord::default_for(&shape));
    assert_eq!(
        SubRecord::default_for(&shape).to_json(),
        SubRecord::default_for(&scn_shape()).to_json()
    );
}

proptest! {
    #[test]
    fn prop_update_touches_only_the_addressed_leaf(
        counts in proptest::collection::vec(1..4usize, 1..5),
        pick in any::<prop::sample::Index>(),
        value in "[0-9]{1,6}(\\.[0-9]{2})?",
    ) {
        let root = build_tree(&counts);
        let before = leaf_values(&root);
        let (target, _) = before[pick.index(before.len())].clone();

        let edited = root.set(&target, value.clone()).unwrap();
        prop_assert_eq!(edited.read(&target).unwrap(), value.as_str());

        for ((path, old), (same_path, new)) in before.iter().zip(leaf_values(&edited)) {
            prop_assert_eq!(path, &same_path);
            if *path != target {
                prop_assert_eq!(old, &new);
            }
        }
    }

    #[test]
    fn prop_insert_then_remove_restores_state(
        counts in proptest::collection::vec(1..4usize, 1..5),
        pick in any::<prop::sample::Index>(),
    ) {
        let root = build_tree(&counts);
        let noticee = pick.index(counts.len());
        let amounts = CollectionPath::root("noticees").nested(noticee, "amounts");

        let grown = root.insert_default(&amounts).unwrap();
        let new_index = grown.collection_at(&amounts).unwrap().len() - 1;
        prop_assert_eq!(new_index, counts[noticee]);

        let restored = grown.remove_at(&amounts, new_index).unwrap();
        prop_assert_eq!(restored, root);
    }

    #[test]
    fn prop_collections_never_empty(
        counts in proptest::collection::vec(1..4usize, 1..5),
        removals in proptest::collection::vec(0..4usize, 0..12),
    ) {
        let noticees = CollectionPath::root("noticees");
        let mut root = build_tree(&counts);
        for index in removals {
            let len = root.collection_at(&noticees).unwrap().len();
            root = root.remove_at(&noticees, index % len).unwrap();
        }
        prop_assert!(root.collection_at(&noticees).unwrap().len() >= 1);
    }
}

#[test]
fn remove_on_singleton_is_noop() {
    let root = build_tree(&[1]);
    let amounts = CollectionPath::root("noticees").nested(0, "amounts");
    assert_eq!(root.remove_at(&amounts, 0).unwrap(), root);
    assert_eq!(
        root.remove_at(&CollectionPath::root("noticees"), 0).unwrap(),
        root
    );
}
