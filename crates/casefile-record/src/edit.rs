//! Edits as values
//!
//! Provides [`Edit`] so every mutation of a record tree can be logged, replayed
//! or batched. Applying an edit never mutates its input.

use crate::path::{CollectionPath, FieldPath};
use crate::record::{RecordError, SubRecord};
use std::fmt::{self, Display, Formatter};

/// One path-addressed mutation of a record tree
#[derive(Debug, Clone, PartialEq)]
pub enum Edit {
    /// Replace a scalar leaf
    Set {
        /// Leaf to replace
        path: FieldPath,
        /// New text
        value: String,
    },

    /// Append a fresh default element to a collection
    Insert {
        /// Target collection
        collection: CollectionPath,
    },

    /// Append a prepared element to a collection
    Append {
        /// Target collection
        collection: CollectionPath,
        /// Element to append; must match the collection's shape
        record: SubRecord,
    },

    /// Remove one element (no-op on the last element)
    Remove {
        /// Target collection
        collection: CollectionPath,
        /// Element index
        index: usize,
    },
}

impl Edit {
    /// Scalar replacement
    #[inline]
    #[must_use]
    pub fn set(path: FieldPath, value: impl Into<String>) -> Self {
        Self::Set {
            path,
            value: value.into(),
        }
    }

    /// Default-element insertion
    #[inline]
    #[must_use]
    pub fn insert(collection: CollectionPath) -> Self {
        Self::Insert { collection }
    }

    /// Element removal
    #[inline]
    #[must_use]
    pub fn remove(collection: CollectionPath, index: usize) -> Self {
        Self::Remove { collection, index }
    }

    /// Whether this edit can change a collection's length
    #[inline]
    #[must_use]
    pub fn changes_length(&self) -> bool {
        !matches!(self, Self::Set { .. })
    }

    /// Apply to `root`, returning the edited tree
    ///
    /// # Errors
    /// Structural errors from the addressed path.
    pub fn apply(&self, root: &SubRecord) -> Result<SubRecord, RecordError> {
        match self {
            Self::Set { path, value } => root.set(path, value.clone()),
            Self::Insert { collection } => root.insert_default(collection),
            Self::Append { collection, record } => root.insert(collection, record.clone()),
            Self::Remove { collection, index } => root.remove_at(collection, *index),
        }
    }
}

impl Display for Edit {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set { path, .. } => write!(f, "set {path}"),
            Self::Insert { collection } | Self::Append { collection, .. } => {
                write!(f, "insert into {collection}")
            }
            Self::Remove { collection, index } => write!(f, "remove {collection}[{index}]"),
        }
    }
}

/// Apply edits in order; the first failure aborts and `root` is left as is
///
/// # Errors
/// The first structural error encountered.
pub fn apply_all<'a, I>(root: &SubRecord, edits: I) -> Result<SubRecord, RecordError>
where
    I: IntoIterator<Item = &'a Edit>,
{
    edits
        .into_iter()
        .try_fold(root.clone(), |current, edit| edit.apply(&current))
}
