//! Sub-records and nested collections
//!
//! [`SubRecord`] and [`Collection`] form an immutable tree. Every edit returns a
//! new tree that rebuilds only the branch along the edited path; siblings stay
//! pointer-equal to the previous version.

use crate::path::{CollectionPath, FieldPath, PathStep};
use crate::shape::{FieldKind, FieldSpec, RecordShape};
use im::Vector;
use std::fmt::Display;
use std::sync::Arc;

/// Value held by one field of a sub-record
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Scalar text, kept exactly as entered
    Scalar(String),
    /// Nested collection
    Collection(Collection),
}

impl FieldValue {
    /// Scalar text, if this is a scalar
    #[inline]
    #[must_use]
    pub fn as_scalar(&self) -> Option<&str> {
        match self {
            Self::Scalar(s) => Some(s),
            Self::Collection(_) => None,
        }
    }

    /// Collection, if this is one
    #[inline]
    #[must_use]
    pub fn as_collection(&self) -> Option<&Collection> {
        match self {
            Self::Collection(c) => Some(c),
            Self::Scalar(_) => None,
        }
    }
}

/// One element of a nested collection (or the aggregate root itself)
///
/// # Invariants
/// - `values` is aligned with `shape.fields()`
/// - collection fields hold a [`Collection`] of the declared nested shape
#[derive(Debug, Clone, PartialEq)]
pub struct SubRecord {
    shape: Arc<RecordShape>,
    values: Vec<FieldValue>,
}

/// A scalar leaf found while walking a record tree
#[derive(Debug, Clone, PartialEq)]
pub struct Leaf<'a> {
    /// Path of the leaf from the walked root
    pub path: FieldPath,
    /// Field declaration
    pub spec: &'a FieldSpec,
    /// Current text
    pub value: &'a str,
}

impl SubRecord {
    /// Fresh default record: empty scalars and one default element per collection
    #[must_use]
    pub fn default_for(shape: &Arc<RecordShape>) -> Self {
        let values = shape
            .fields()
            .iter()
            .map(|spec| match spec.kind() {
                FieldKind::Collection(nested) => {
                    FieldValue::Collection(Collection::with_default(nested))
                }
                _ => FieldValue::Scalar(String::new()),
            })
            .collect();
        Self {
            shape: Arc::clone(shape),
            values,
        }
    }

    pub(crate) fn from_parts(shape: &Arc<RecordShape>, values: Vec<FieldValue>) -> Self {
        debug_assert_eq!(shape.fields().len(), values.len());
        Self {
            shape: Arc::clone(shape),
            values,
        }
    }

    /// Shape of this record
    #[inline]
    #[must_use]
    pub fn shape(&self) -> &Arc<RecordShape> {
        &self.shape
    }

    /// Field value by name
    #[inline]
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&FieldValue> {
        self.shape.position(name).map(|pos| &self.values[pos])
    }

    /// Scalar field by name
    #[inline]
    #[must_use]
    pub fn scalar(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(FieldValue::as_scalar)
    }

    /// Collection field by name
    #[inline]
    #[must_use]
    pub fn collection(&self, name: &str) -> Option<&Collection> {
        self.get(name).and_then(FieldValue::as_collection)
    }

    /// Fields in shape order
    pub fn fields(&self) -> impl Iterator<Item = (&str, &FieldValue)> {
        self.shape
            .fields()
            .iter()
            .map(FieldSpec::name)
            .zip(self.values.iter())
    }

    /// Read the scalar at `path`
    ///
    /// # Errors
    /// `InvalidPath` for out-of-range indices, `UnknownField` for names the
    /// shape does not declare.
    pub fn read(&self, path: &FieldPath) -> Result<&str, RecordError> {
        let owner = self.walk(path.parents(), path)?;
        let pos = owner.position_of(path.field(), path)?;
        match &owner.values[pos] {
            FieldValue::Scalar(s) => Ok(s),
            FieldValue::Collection(_) => Err(RecordError::NotAScalar {
                path: path.to_string(),
                field: path.field().to_string(),
            }),
        }
    }

    /// Collection at `path`
    ///
    /// # Errors
    /// Structural errors as for [`SubRecord::read`].
    pub fn collection_at(&self, path: &CollectionPath) -> Result<&Collection, RecordError> {
        self.walk(path.parents(), path)?
            .collection_field(path.name(), path)
    }

    /// Replace the scalar at `path`
    ///
    /// # Errors
    /// Structural errors as for [`SubRecord::read`].
    pub fn set(&self, path: &FieldPath, value: impl Into<String>) -> Result<Self, RecordError> {
        let value = value.into();
        self.rebuild(path.parents(), path, |owner| {
            let pos = owner.position_of(path.field(), path)?;
            match &owner.values[pos] {
                FieldValue::Scalar(_) => Ok(owner.with_value(pos, FieldValue::Scalar(value))),
                FieldValue::Collection(_) => Err(RecordError::NotAScalar {
                    path: path.to_string(),
                    field: path.field().to_string(),
                }),
            }
        })
    }

    /// Replace `field` of element `index` in the collection at `path`
    ///
    /// # Errors
    /// Structural errors as for [`SubRecord::read`].
    pub fn update(
        &self,
        path: &CollectionPath,
        index: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<Self, RecordError> {
        self.set(&path.field(index, field), value)
    }

    /// Append `record` to the collection at `path`
    ///
    /// # Errors
    /// `ShapeMismatch` if `record` is not of the collection's shape, plus the
    /// structural errors of [`SubRecord::read`].
    pub fn insert(&self, path: &CollectionPath, record: Self) -> Result<Self, RecordError> {
        self.modify_collection(path, |collection| collection.pushed(record, path))
    }

    /// Append a fresh default element to the collection at `path`
    ///
    /// # Errors
    /// Structural errors as for [`SubRecord::read`].
    pub fn insert_default(&self, path: &CollectionPath) -> Result<Self, RecordError> {
        self.modify_collection(path, |collection| {
            let record = SubRecord::default_for(collection.shape());
            collection.pushed(record, path)
        })
    }

    /// Remove element `index` from the collection at `path`
    ///
    /// Removing the only element returns the record unchanged.
    ///
    /// # Errors
    /// `InvalidPath` if `index` is out of range, plus the structural errors of
    /// [`SubRecord::read`].
    pub fn remove_at(&self, path: &CollectionPath, index: usize) -> Result<Self, RecordError> {
        let collection = self.collection_at(path)?;
        if index >= collection.len() {
            return Err(RecordError::InvalidPath {
                path: path.to_string(),
                index,
                len: collection.len(),
            });
        }
        if collection.len() == 1 {
            tracing::debug!(path = %path, "keeping last element of collection");
            return Ok(self.clone());
        }
        self.modify_collection(path, |collection| Ok(collection.without(index)))
    }

    /// All scalar leaves, depth-first in shape order
    #[must_use]
    pub fn leaves(&self) -> Vec<Leaf<'_>> {
        let mut out = Vec::new();
        self.collect_leaves(&mut Vec::new(), &mut out);
        out
    }

    fn collect_leaves<'a>(&'a self, trail: &mut Vec<PathStep>, out: &mut Vec<Leaf<'a>>) {
        for (spec, value) in self.shape.fields().iter().zip(&self.values) {
            match value {
                FieldValue::Scalar(text) => out.push(Leaf {
                    path: FieldPath::new(trail.clone(), spec.name()),
                    spec,
                    value: text,
                }),
                FieldValue::Collection(collection) => {
                    for (index, item) in collection.iter().enumerate() {
                        trail.push(PathStep::new(spec.name(), index));
                        item.collect_leaves(trail, out);
                        trail.pop();
                    }
                }
            }
        }
    }

    fn modify_collection<F>(&self, path: &CollectionPath, f: F) -> Result<Self, RecordError>
    where
        F: FnOnce(&Collection) -> Result<Collection, RecordError>,
    {
        self.rebuild(path.parents(), path, |owner| {
            let pos = owner.position_of(path.name(), path)?;
            match &owner.values[pos] {
                FieldValue::Collection(collection) => {
                    Ok(owner.with_value(pos, FieldValue::Collection(f(collection)?)))
                }
                FieldValue::Scalar(_) => Err(RecordError::NotACollection {
                    path: path.to_string(),
                    field: path.name().to_string(),
                }),
            }
        })
    }

    /// Rebuild the branch along `steps`, applying `f` to the record at its end
    fn rebuild<F>(&self, steps: &[PathStep], at: &dyn Display, f: F) -> Result<Self, RecordError>
    where
        F: FnOnce(&SubRecord) -> Result<SubRecord, RecordError>,
    {
        let Some((step, rest)) = steps.split_first() else {
            return f(self);
        };

        let pos = self.position_of(step.collection(), at)?;
        let collection = self.collection_field(step.collection(), at)?;
        let child = collection.element(step.index(), at)?;
        let rebuilt = child.rebuild(rest, at, f)?;
        Ok(self.with_value(
            pos,
            FieldValue::Collection(collection.replaced(step.index(), rebuilt)),
        ))
    }

    fn walk(&self, steps: &[PathStep], at: &dyn Display) -> Result<&SubRecord, RecordError> {
        let mut current = self;
        for step in steps {
            current = current
                .collection_field(step.collection(), at)?
                .element(step.index(), at)?;
        }
        Ok(current)
    }

    fn position_of(&self, name: &str, at: &dyn Display) -> Result<usize, RecordError> {
        self.shape
            .position(name)
            .ok_or_else(|| RecordError::UnknownField {
                path: at.to_string(),
                field: name.to_string(),
                shape: self.shape.name().to_string(),
            })
    }

    fn collection_field(&self, name: &str, at: &dyn Display) -> Result<&Collection, RecordError> {
        let pos = self.position_of(name, at)?;
        match &self.values[pos] {
            FieldValue::Collection(collection) => Ok(collection),
            FieldValue::Scalar(_) => Err(RecordError::NotACollection {
                path: at.to_string(),
                field: name.to_string(),
            }),
        }
    }

    fn with_value(&self, pos: usize, value: FieldValue) -> Self {
        let mut values = self.values.clone();
        values[pos] = value;
        Self {
            shape: Arc::clone(&self.shape),
            values,
        }
    }
}

/// Ordered, never-empty sequence of sub-records of one shape
///
/// Elements are held behind `Arc` in a persistent vector, so an edit to one
/// element leaves every other element pointer-equal.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    shape: Arc<RecordShape>,
    items: Vector<Arc<SubRecord>>,
}

impl Collection {
    /// Collection holding one fresh default element
    #[must_use]
    pub fn with_default(shape: &Arc<RecordShape>) -> Self {
        Self {
            shape: Arc::clone(shape),
            items: Vector::unit(Arc::new(SubRecord::default_for(shape))),
        }
    }

    /// Collection from records; an empty list yields the default collection
    ///
    /// # Errors
    /// `ShapeMismatch` if any record has a different shape.
    pub fn from_records(
        shape: &Arc<RecordShape>,
        records: Vec<SubRecord>,
    ) -> Result<Self, RecordError> {
        if records.is_empty() {
            return Ok(Self::with_default(shape));
        }
        for record in &records {
            check_shape(shape, record, &shape.name())?;
        }
        Ok(Self {
            shape: Arc::clone(shape),
            items: records.into_iter().map(Arc::new).collect(),
        })
    }

    /// Element shape
    #[inline]
    #[must_use]
    pub fn shape(&self) -> &Arc<RecordShape> {
        &self.shape
    }

    /// Number of elements (at least one)
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    /// Always false for collections built through this API
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Element by index
    #[inline]
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&SubRecord> {
        self.items.get(index).map(|record| &**record)
    }

    /// Shared handle to an element, for identity checks
    #[inline]
    #[must_use]
    pub fn get_shared(&self, index: usize) -> Option<&Arc<SubRecord>> {
        self.items.get(index)
    }

    /// Elements in order
    pub fn iter(&self) -> impl Iterator<Item = &SubRecord> {
        self.items.iter().map(|record| &**record)
    }

    fn element(&self, index: usize, at: &dyn Display) -> Result<&SubRecord, RecordError> {
        self.get(index).ok_or_else(|| RecordError::InvalidPath {
            path: at.to_string(),
            index,
            len: self.len(),
        })
    }

    fn replaced(&self, index: usize, record: SubRecord) -> Self {
        let mut items = self.items.clone();
        items.set(index, Arc::new(record));
        Self {
            shape: Arc::clone(&self.shape),
            items,
        }
    }

    fn pushed(&self, record: SubRecord, at: &dyn Display) -> Result<Self, RecordError> {
        check_shape(&self.shape, &record, at)?;
        let mut items = self.items.clone();
        items.push_back(Arc::new(record));
        Ok(Self {
            shape: Arc::clone(&self.shape),
            items,
        })
    }

    fn without(&self, index: usize) -> Self {
        let mut items = self.items.clone();
        items.remove(index);
        Self {
            shape: Arc::clone(&self.shape),
            items,
        }
    }
}

fn check_shape(
    expected: &Arc<RecordShape>,
    record: &SubRecord,
    at: &dyn Display,
) -> Result<(), RecordError> {
    if Arc::ptr_eq(expected, &record.shape) || **expected == *record.shape {
        Ok(())
    } else {
        Err(RecordError::ShapeMismatch {
            path: at.to_string(),
            expected: expected.name().to_string(),
            found: record.shape.name().to_string(),
        })
    }
}

/// Structural errors: a caller addressed something the tree does not have
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum RecordError {
    /// Index out of range somewhere along the path
    #[error("invalid path '{path}': index {index} out of range (len {len})")]
    InvalidPath {
        path: String,
        index: usize,
        len: usize,
    },

    /// Field name not declared by the shape
    #[error("unknown field '{field}' on '{shape}' at '{path}'")]
    UnknownField {
        path: String,
        field: String,
        shape: String,
    },

    /// Path descends through a scalar
    #[error("field '{field}' at '{path}' is not a collection")]
    NotACollection { path: String, field: String },

    /// Path ends on a collection where a scalar was expected
    #[error("field '{field}' at '{path}' is not a scalar")]
    NotAScalar { path: String, field: String },

    /// Inserted record has the wrong shape
    #[error("shape mismatch at '{path}': expected '{expected}', found '{found}'")]
    ShapeMismatch {
        path: String,
        expected: String,
        found: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

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

    fn noticees() -> CollectionPath {
        CollectionPath::root("noticees")
    }

    #[test]
    fn default_has_one_element_per_level() {
        let root = SubRecord::default_for(&scn_shape());
        let noticees = root.collection("noticees").unwrap();
        assert_eq!(noticees.len(), 1);
        let amounts = noticees.get(0).unwrap().collection("amounts").unwrap();
        assert_eq!(amounts.len(), 1);
        assert_eq!(amounts.get(0).unwrap().scalar("amount"), Some(""));
    }

    #[test]
    fn set_and_read_nested() {
        let root = SubRecord::default_for(&scn_shape());
        let path = noticees().nested(0, "amounts").field(0, "amount");
        let edited = root.set(&path, "1500.00").unwrap();
        assert_eq!(edited.read(&path).unwrap(), "1500.00");
        // original untouched
        assert_eq!(root.read(&path).unwrap(), "");
    }

    #[test]
    fn update_keeps_siblings_pointer_equal() {
        let root = SubRecord::default_for(&scn_shape())
            .insert_default(&noticees())
            .unwrap()
            .insert_default(&noticees())
            .unwrap();
        let edited = root.update(&noticees(), 1, "address", "Pune").unwrap();

        let before = root.collection("noticees").unwrap();
        let after = edited.collection("noticees").unwrap();
        assert!(Arc::ptr_eq(
            before.get_shared(0).unwrap(),
            after.get_shared(0).unwrap()
        ));
        assert!(Arc::ptr_eq(
            before.get_shared(2).unwrap(),
            after.get_shared(2).unwrap()
        ));
        assert!(!Arc::ptr_eq(
            before.get_shared(1).unwrap(),
            after.get_shared(1).unwrap()
        ));
        assert_eq!(after.get(1).unwrap().scalar("address"), Some("Pune"));
    }

    #[test]
    fn out_of_range_index_is_invalid_path() {
        let root = SubRecord::default_for(&scn_shape());
        let err = root
            .update(&noticees(), 3, "address", "x")
            .unwrap_err();
        assert_eq!(
            err,
            RecordError::InvalidPath {
                path: "noticees[3].address".into(),
                index: 3,
                len: 1,
            }
        );
    }

    #[test]
    fn unknown_field_is_reported() {
        let root = SubRecord::default_for(&scn_shape());
        let err = root.update(&noticees(), 0, "total_amount", "1").unwrap_err();
        assert!(matches!(err, RecordError::UnknownField { ref field, .. } if field == "total_amount"));

        let err = root
            .insert_default(&CollectionPath::root("witnesses"))
            .unwrap_err();
        assert!(matches!(err, RecordError::UnknownField { .. }));
    }

    #[test]
    fn kind_mismatches_are_reported() {
        let root = SubRecord::default_for(&scn_shape());
        let err = root.set(&FieldPath::root("noticees"), "x").unwrap_err();
        assert!(matches!(err, RecordError::NotAScalar { .. }));

        let err = root
            .insert_default(&CollectionPath::root("scn_number"))
            .unwrap_err();
        assert!(matches!(err, RecordError::NotACollection { .. }));
    }

    #[test]
    fn remove_last_element_is_noop() {
        let root = SubRecord::default_for(&scn_shape()).set(&FieldPath::root("scn_number"), "7").unwrap();
        let after = root.remove_at(&noticees(), 0).unwrap();
        assert_eq!(after, root);
    }

    #[test]
    fn remove_out_of_range_is_invalid_path() {
        let root = SubRecord::default_for(&scn_shape());
        assert!(matches!(
            root.remove_at(&noticees(), 1),
            Err(RecordError::InvalidPath { index: 1, len: 1, .. })
        ));
    }

    #[test]
    fn remove_preserves_relative_order() {
        let mut root = SubRecord::default_for(&scn_shape());
        for _ in 0..3 {
            root = root.insert_default(&noticees()).unwrap();
        }
        for (i, name) in ["a", "b", "c", "d"].iter().enumerate() {
            root = root.update(&noticees(), i, "name_of_noticee", *name).unwrap();
        }
        let after = root.remove_at(&noticees(), 1).unwrap();
        let names: Vec<_> = after
            .collection("noticees")
            .unwrap()
            .iter()
            .map(|n| n.scalar("name_of_noticee").unwrap())
            .collect();
        assert_eq!(names, vec!["a", "c", "d"]);
    }

    #[test]
    fn insert_rejects_foreign_shape() {
        let root = SubRecord::default_for(&scn_shape());
        let stranger = SubRecord::default_for(&RecordShape::builder("document").text("document_name").build());
        assert!(matches!(
            root.insert(&noticees(), stranger),
            Err(RecordError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn inserted_defaults_do_not_alias() {
        let root = SubRecord::default_for(&scn_shape())
            .insert_default(&noticees())
            .unwrap();
        let edited = root.update(&noticees(), 0, "address", "Delhi").unwrap();
        let list = edited.collection("noticees").unwrap();
        assert_eq!(list.get(0).unwrap().scalar("address"), Some("Delhi"));
        assert_eq!(list.get(1).unwrap().scalar("address"), Some(""));
    }

    #[test]
    fn leaves_walk_in_shape_order() {
        let root = SubRecord::default_for(&scn_shape());
        let paths: Vec<String> = root.leaves().iter().map(|l| l.path.to_string()).collect();
        assert_eq!(
            paths,
            vec![
                "scn_number",
                "noticees[0].name_of_noticee",
                "noticees[0].address",
                "noticees[0].amounts[0].amount_type",
                "noticees[0].amounts[0].amount",
                "noticees[0].amounts[0].description",
            ]
        );
    }

    #[test]
    fn from_records_empty_yields_default() {
        let shape = scn_shape();
        let noticee = shape.field("noticees").unwrap().nested_shape().unwrap().clone();
        let collection = Collection::from_records(&noticee, Vec::new()).unwrap();
        assert_eq!(collection, Collection::with_default(&noticee));
    }
}
