//! Aggregate form scenarios over realistic server records

use casefile_forms::prelude::*;
use casefile_forms::{calculate_total_for_scn, nested_amount_total, scn, summons};
use casefile_test_utils::{scn_record, summons_record};
use pretty_assertions::assert_eq;
use rust_decimal::Decimal;
use serde_json::json;
use std::sync::Arc;

#[test]
fn removing_first_statement_keeps_second_with_documents() {
    let state = FormState::<SummonedPerson>::load_from(&summons_record(1), "id").unwrap();
    let statements = summons::statements(0);
    let second_before = Arc::clone(
        state
            .root()
            .collection_at(&statements)
            .unwrap()
            .get_shared(1)
            .unwrap(),
    );

    let state = state.remove_at(&statements, 0).unwrap();
    let remaining = state.root().collection_at(&statements).unwrap();
    assert_eq!(remaining.len(), 1);
    assert!(Arc::ptr_eq(remaining.get_shared(0).unwrap(), &second_before));
    assert_eq!(
        state
            .read(&summons::documents(0, 0).field(0, "document_name"))
            .unwrap(),
        "Bank statement"
    );
}

#[test]
fn removing_last_element_is_a_noop() {
    let state = FormState::<SummonedPerson>::load_from(&summons_record(1), "id").unwrap();
    let documents = summons::documents(0, 1);
    assert_eq!(state.remove_at(&documents, 0).unwrap(), state);
}

#[test]
fn server_record_round_trips_through_payload() {
    let record = scn_record(3);
    let state = FormState::<Scn>::load_from(&record, "id").unwrap();
    assert_eq!(state.record_id(), Some("3"));

    let payload = state.to_payload();
    // identity and server-computed fields are not part of the form
    assert_eq!(payload.get("id"), None);
    assert_eq!(payload["noticees"][0].get("total_amount"), None);
    assert_eq!(payload["noticees"][0]["amounts"], record["noticees"][0]["amounts"]);
    assert!(state.validate().is_empty());
}

#[test]
fn update_leaves_siblings_pointer_equal() {
    let state = FormState::<Scn>::load_from(&scn_record(3), "id").unwrap();
    let amounts = scn::amounts(0);
    let edited = state.update(&amounts, 1, "amount", "60000.00").unwrap();

    let before = state.root().collection_at(&amounts).unwrap();
    let after = edited.root().collection_at(&amounts).unwrap();
    assert!(Arc::ptr_eq(before.get_shared(0).unwrap(), after.get_shared(0).unwrap()));
    assert!(!Arc::ptr_eq(before.get_shared(1).unwrap(), after.get_shared(1).unwrap()));
    assert_eq!(
        edited.read(&amounts.field(1, "amount")).unwrap(),
        "60000.00"
    );
}

#[test]
fn batch_edits_are_all_or_nothing() {
    let state = FormState::<Scn>::create_default();
    let edits = vec![
        Edit::insert(scn::noticees()),
        Edit::set(scn::noticees().field(1, "name_of_noticee"), "B"),
        Edit::remove(scn::amounts(4), 0),
    ];
    assert!(state.apply_all(&edits).is_err());

    let applied = state.apply_all(&edits[..2]).unwrap();
    assert_eq!(
        applied.read(&scn::noticees().field(1, "name_of_noticee")).unwrap(),
        "B"
    );
}

#[test]
fn totals_over_server_records() {
    let record = scn_record(1);
    assert_eq!(calculate_total_for_scn(&record).unwrap(), Decimal::new(25_000_000, 2));
    assert_eq!(nested_amount_total(&record).unwrap(), Decimal::new(25_000_000, 2));

    let payload = FormState::<Scn>::load_from(&record, "id").unwrap().to_payload();
    assert_eq!(calculate_total_for_scn(&payload).unwrap(), Decimal::ZERO);
    assert_eq!(nested_amount_total(&payload).unwrap(), Decimal::new(25_000_000, 2));
    assert_eq!(calculate_total_for_scn(&json!({})).unwrap(), Decimal::ZERO);
}
