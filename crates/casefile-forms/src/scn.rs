//! Show-cause notice (SCN) aggregate
//!
//! SCN → noticees → amounts. Amounts stay text exactly as entered.

use crate::aggregate::Aggregate;
use crate::config::Endpoints;
use casefile_record::{CollectionPath, RecordShape, SubRecord};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;

static AMOUNT: Lazy<Arc<RecordShape>> = Lazy::new(|| {
    RecordShape::builder("amount")
        .required_text("amount_type")
        .amount("amount", true)
        .text("description")
        .build()
});

static NOTICEE: Lazy<Arc<RecordShape>> = Lazy::new(|| {
    RecordShape::builder("noticee")
        .required_text("name_of_noticee")
        .text("address")
        .collection("amounts", amount_shape())
        .build()
});

static SCN: Lazy<Arc<RecordShape>> = Lazy::new(|| {
    RecordShape::builder("scn")
        .required_text("scn_number")
        .date("date_of_issue", true)
        .text("section_invoked")
        .text("status")
        .collection("noticees", noticee_shape())
        .build()
});

/// Shape of one demanded amount
#[must_use]
pub fn amount_shape() -> Arc<RecordShape> {
    Arc::clone(&AMOUNT)
}

/// Shape of one noticee
#[must_use]
pub fn noticee_shape() -> Arc<RecordShape> {
    Arc::clone(&NOTICEE)
}

/// Fresh empty amount row
#[must_use]
pub fn empty_amount() -> SubRecord {
    SubRecord::default_for(&AMOUNT)
}

/// Fresh empty noticee with one empty amount row
#[must_use]
pub fn empty_noticee() -> SubRecord {
    SubRecord::default_for(&NOTICEE)
}

/// Path of the noticee list
#[must_use]
pub fn noticees() -> CollectionPath {
    CollectionPath::root("noticees")
}

/// Path of the amounts of noticee `noticee`
#[must_use]
pub fn amounts(noticee: usize) -> CollectionPath {
    noticees().nested(noticee, "amounts")
}

/// Show-cause notice
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Scn;

impl Aggregate for Scn {
    const KIND: &'static str = "scn";
    const LABEL: &'static str = "SCN";

    fn shape() -> Arc<RecordShape> {
        Arc::clone(&SCN)
    }

    fn endpoints() -> Endpoints {
        Endpoints::new("/investigations/{investigation_id}/scns", "/scns/{id}")
    }

    fn describe(record: &Value, _id_key: &str) -> String {
        match record.get("scn_number").and_then(Value::as_str) {
            Some(number) if !number.is_empty() => format!("SCN {number}"),
            _ => Self::LABEL.to_string(),
        }
    }
}
