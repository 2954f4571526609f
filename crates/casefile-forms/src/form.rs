//! Aggregate form state
//!
//! [`FormState`] is the whole editable tree of one aggregate plus the server
//! identity it was loaded from. Values are immutable; every edit returns a
//! new state and leaves the old one usable as a snapshot.

use crate::aggregate::{record_id, Aggregate};
use crate::error::FormError;
use crate::validation::{self, FieldIssue};
use casefile_record::{CollectionPath, Edit, FieldPath, RecordError, SubRecord};
use serde_json::Value;
use std::marker::PhantomData;

/// Editable tree of one aggregate
#[derive(Debug)]
pub struct FormState<A: Aggregate> {
    root: SubRecord,
    record_id: Option<String>,
    _kind: PhantomData<A>,
}

impl<A: Aggregate> Clone for FormState<A> {
    fn clone(&self) -> Self {
        Self {
            root: self.root.clone(),
            record_id: self.record_id.clone(),
            _kind: PhantomData,
        }
    }
}

impl<A: Aggregate> PartialEq for FormState<A> {
    fn eq(&self, other: &Self) -> bool {
        self.root == other.root && self.record_id == other.record_id
    }
}

impl<A: Aggregate> Default for FormState<A> {
    fn default() -> Self {
        Self::create_default()
    }
}

impl<A: Aggregate> FormState<A> {
    /// Fresh skeleton: empty scalars, one empty element per collection
    #[must_use]
    pub fn create_default() -> Self {
        Self {
            root: SubRecord::default_for(&A::shape()),
            record_id: None,
            _kind: PhantomData,
        }
    }

    /// Replace everything with a server record
    ///
    /// Missing branches fall back to their defaults. The identity under
    /// `id_key` is kept for later updates.
    ///
    /// # Errors
    /// `Load` if the record's structure cannot fit the aggregate shape.
    pub fn load_from(record: &Value, id_key: &str) -> Result<Self, FormError> {
        let root = SubRecord::from_json(&A::shape(), record)?;
        Ok(Self {
            root,
            record_id: record_id(record, id_key),
            _kind: PhantomData,
        })
    }

    /// Payload for the submission endpoint
    #[must_use]
    pub fn to_payload(&self) -> Value {
        self.root.to_json()
    }

    /// Root record
    #[inline]
    #[must_use]
    pub fn root(&self) -> &SubRecord {
        &self.root
    }

    /// Server identity, when editing an existing record
    #[inline]
    #[must_use]
    pub fn record_id(&self) -> Option<&str> {
        self.record_id.as_deref()
    }

    /// Read a scalar
    ///
    /// # Errors
    /// Structural errors for paths outside the tree.
    pub fn read(&self, path: &FieldPath) -> Result<&str, RecordError> {
        self.root.read(path)
    }

    /// Replace a scalar anywhere in the tree
    ///
    /// # Errors
    /// Structural errors for paths outside the tree.
    pub fn set(&self, path: &FieldPath, value: impl Into<String>) -> Result<Self, RecordError> {
        Ok(self.with_root(self.root.set(path, value)?))
    }

    /// Replace `field` of element `index` of the collection at `path`
    ///
    /// # Errors
    /// Structural errors for paths outside the tree.
    pub fn update(
        &self,
        path: &CollectionPath,
        index: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<Self, RecordError> {
        Ok(self.with_root(self.root.update(path, index, field, value)?))
    }

    /// Append a fresh default element
    ///
    /// # Errors
    /// Structural errors for paths outside the tree.
    pub fn insert(&self, path: &CollectionPath) -> Result<Self, RecordError> {
        Ok(self.with_root(self.root.insert_default(path)?))
    }

    /// Append a prepared element
    ///
    /// # Errors
    /// `ShapeMismatch` plus the structural errors of [`FormState::insert`].
    pub fn insert_record(&self, path: &CollectionPath, record: SubRecord) -> Result<Self, RecordError> {
        Ok(self.with_root(self.root.insert(path, record)?))
    }

    /// Remove an element; the last element of a collection is kept
    ///
    /// # Errors
    /// Structural errors for paths outside the tree.
    pub fn remove_at(&self, path: &CollectionPath, index: usize) -> Result<Self, RecordError> {
        Ok(self.with_root(self.root.remove_at(path, index)?))
    }

    /// Apply one edit
    ///
    /// # Errors
    /// Structural errors for paths outside the tree.
    pub fn apply(&self, edit: &Edit) -> Result<Self, RecordError> {
        Ok(self.with_root(edit.apply(&self.root)?))
    }

    /// Apply edits in order; on failure nothing is applied
    ///
    /// # Errors
    /// The first structural error.
    pub fn apply_all<'a, I>(&self, edits: I) -> Result<Self, RecordError>
    where
        I: IntoIterator<Item = &'a Edit>,
    {
        Ok(self.with_root(casefile_record::apply_all(&self.root, edits)?))
    }

    /// Field checks before submit
    #[must_use]
    pub fn validate(&self) -> Vec<FieldIssue> {
        validation::validate(&self.root)
    }

    fn with_root(&self, root: SubRecord) -> Self {
        Self {
            root,
            record_id: self.record_id.clone(),
            _kind: PhantomData,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scn::{self, Scn};
    use crate::summons::{self, SummonedPerson};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn default_scn_payload() {
        let state = FormState::<Scn>::create_default();
        assert_eq!(
            state.to_payload(),
            json!({
                "scn_number": "",
                "date_of_issue": "",
                "section_invoked": "",
                "status": "",
                "noticees": [{
                    "name_of_noticee": "",
                    "address": "",
                    "amounts": [{ "amount_type": "", "amount": "", "description": "" }]
                }]
            })
        );
    }

    #[test]
    fn create_default_is_deterministic() {
        assert_eq!(
            FormState::<SummonedPerson>::create_default(),
            FormState::<SummonedPerson>::create_default()
        );
        assert_eq!(FormState::<Scn>::default(), FormState::<Scn>::create_default());
    }

    #[test]
    fn amounts_keep_entered_text() {
        let state = FormState::<Scn>::create_default()
            .update(&scn::amounts(0), 0, "amount", "001500.50")
            .unwrap();
        assert_eq!(
            state.to_payload()["noticees"][0]["amounts"][0]["amount"],
            json!("001500.50")
        );
    }

    #[test]
    fn load_keeps_identity_and_fills_missing_branches() {
        let record = json!({
            "id": 31,
            "name_of_person": "R. Mehta",
            "summons": [
                { "summons_number": "S-1" },
                { "summons_number": "S-2", "statements": [] }
            ]
        });
        let state = FormState::<SummonedPerson>::load_from(&record, "id").unwrap();
        assert_eq!(state.record_id(), Some("31"));
        for i in 0..2 {
            let statements = state.root().collection_at(&summons::statements(i)).unwrap();
            assert_eq!(statements.len(), 1);
            assert_eq!(statements.get(0).unwrap(), &summons::empty_statement());
        }
        assert_eq!(state.read(&FieldPath::root("designation")).unwrap(), "");
    }

    #[test]
    fn load_rejects_non_object() {
        assert!(matches!(
            FormState::<Scn>::load_from(&json!("scn"), "id"),
            Err(FormError::Load(_))
        ));
    }

    #[test]
    fn edits_keep_identity() {
        let state = FormState::<Scn>::load_from(&json!({ "id": "abc" }), "id")
            .unwrap()
            .insert(&scn::noticees())
            .unwrap()
            .apply(&Edit::set(scn::noticees().field(1, "address"), "Mumbai"))
            .unwrap();
        assert_eq!(state.record_id(), Some("abc"));
        assert_eq!(state.read(&scn::noticees().field(1, "address")).unwrap(), "Mumbai");
    }

    #[test]
    fn insert_record_uses_named_factory() {
        let state = FormState::<Scn>::create_default()
            .insert_record(&scn::noticees(), scn::empty_noticee())
            .unwrap();
        assert_eq!(state.root().collection_at(&scn::noticees()).unwrap().len(), 2);

        let err = state
            .insert_record(&scn::noticees(), scn::empty_amount())
            .unwrap_err();
        assert!(matches!(err, RecordError::ShapeMismatch { .. }));
    }
}
