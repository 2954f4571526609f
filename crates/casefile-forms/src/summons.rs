//! Summoned-person aggregate
//!
//! Person → summons → statements → documents.

use crate::aggregate::Aggregate;
use crate::config::Endpoints;
use casefile_record::{CollectionPath, RecordShape, SubRecord};
use once_cell::sync::Lazy;
use serde_json::Value;
use std::sync::Arc;

static DOCUMENT: Lazy<Arc<RecordShape>> = Lazy::new(|| {
    RecordShape::builder("document")
        .required_text("document_name")
        .text("document_description")
        .build()
});

static STATEMENT: Lazy<Arc<RecordShape>> = Lazy::new(|| {
    RecordShape::builder("statement")
        .date("date_of_statement", true)
        .text("statement_summary")
        .collection("documents", document_shape())
        .build()
});

static SUMMONS: Lazy<Arc<RecordShape>> = Lazy::new(|| {
    RecordShape::builder("summons")
        .required_text("summons_number")
        .date("date_of_issue", true)
        .date("date_of_appearance", false)
        .text("purpose")
        .collection("statements", statement_shape())
        .build()
});

static PERSON: Lazy<Arc<RecordShape>> = Lazy::new(|| {
    RecordShape::builder("summoned_person")
        .required_text("name_of_person")
        .text("designation")
        .text("contact_number")
        .text("address")
        .collection("summons", summons_shape())
        .build()
});

/// Shape of one produced document
#[must_use]
pub fn document_shape() -> Arc<RecordShape> {
    Arc::clone(&DOCUMENT)
}

/// Shape of one recorded statement
#[must_use]
pub fn statement_shape() -> Arc<RecordShape> {
    Arc::clone(&STATEMENT)
}

/// Shape of one summons
#[must_use]
pub fn summons_shape() -> Arc<RecordShape> {
    Arc::clone(&SUMMONS)
}

/// Fresh empty document row
#[must_use]
pub fn empty_document() -> SubRecord {
    SubRecord::default_for(&DOCUMENT)
}

/// Fresh empty statement with one empty document
#[must_use]
pub fn empty_statement() -> SubRecord {
    SubRecord::default_for(&STATEMENT)
}

/// Fresh empty summons with one empty statement
#[must_use]
pub fn empty_summons() -> SubRecord {
    SubRecord::default_for(&SUMMONS)
}

/// Path of the summons list
#[must_use]
pub fn summons_list() -> CollectionPath {
    CollectionPath::root("summons")
}

/// Path of the statements of summons `summons`
#[must_use]
pub fn statements(summons: usize) -> CollectionPath {
    summons_list().nested(summons, "statements")
}

/// Path of the documents of one statement
#[must_use]
pub fn documents(summons: usize, statement: usize) -> CollectionPath {
    statements(summons).nested(statement, "documents")
}

/// Person summoned in an investigation, with their summons history
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SummonedPerson;

impl Aggregate for SummonedPerson {
    const KIND: &'static str = "summons";
    const LABEL: &'static str = "Summons";

    fn shape() -> Arc<RecordShape> {
        Arc::clone(&PERSON)
    }

    fn endpoints() -> Endpoints {
        Endpoints::new(
            "/investigations/{investigation_id}/summons",
            "/summons/{id}",
        )
    }

    fn describe(record: &Value, _id_key: &str) -> String {
        match record.get("name_of_person").and_then(Value::as_str) {
            Some(name) if !name.is_empty() => name.to_string(),
            _ => Self::LABEL.to_string(),
        }
    }
}
