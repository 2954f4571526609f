//! Field and collection paths for addressing within record trees
//!
//! Provides [`FieldPath`] for addressing one scalar leaf and [`CollectionPath`]
//! for addressing one nested collection.

use std::fmt::{self, Display, Formatter};
use std::str::FromStr;

/// One hop into a nested collection: `name[index]`
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PathStep {
    collection: String,
    index: usize,
}

impl PathStep {
    /// Create new step
    #[inline]
    #[must_use]
    pub fn new(collection: impl Into<String>, index: usize) -> Self {
        Self {
            collection: collection.into(),
            index,
        }
    }

    /// Collection name
    #[inline]
    #[must_use]
    pub fn collection(&self) -> &str {
        &self.collection
    }

    /// Element index
    #[inline]
    #[must_use]
    pub fn index(&self) -> usize {
        self.index
    }
}

impl Display for PathStep {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        write!(f, "{}[{}]", self.collection, self.index)
    }
}

/// Path to a nested collection
///
/// # Examples
/// - `noticees` → the root record's noticee list
/// - `summons[1].statements` → statements of the second summons
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct CollectionPath {
    parents: Vec<PathStep>,
    name: String,
}

impl CollectionPath {
    /// Collection directly on the root record
    #[inline]
    #[must_use]
    pub fn root(name: impl Into<String>) -> Self {
        Self {
            parents: Vec::new(),
            name: name.into(),
        }
    }

    /// Create from parent steps and collection name
    #[inline]
    #[must_use]
    pub fn new(parents: Vec<PathStep>, name: impl Into<String>) -> Self {
        Self {
            parents,
            name: name.into(),
        }
    }

    /// Steps leading to the record that owns this collection
    #[inline]
    #[must_use]
    pub fn parents(&self) -> &[PathStep] {
        &self.parents
    }

    /// Collection name on the owning record
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Nesting depth (0 for root collections)
    #[inline]
    #[must_use]
    pub fn depth(&self) -> usize {
        self.parents.len()
    }

    /// Steps addressing element `index` of this collection
    #[must_use]
    pub fn element(&self, index: usize) -> Vec<PathStep> {
        let mut steps = self.parents.clone();
        steps.push(PathStep::new(self.name.clone(), index));
        steps
    }

    /// Scalar field of element `index`
    #[inline]
    #[must_use]
    pub fn field(&self, index: usize, field: impl Into<String>) -> FieldPath {
        FieldPath::new(self.element(index), field)
    }

    /// Collection nested inside element `index`
    #[inline]
    #[must_use]
    pub fn nested(&self, index: usize, name: impl Into<String>) -> CollectionPath {
        CollectionPath::new(self.element(index), name)
    }
}

impl Display for CollectionPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for step in &self.parents {
            write!(f, "{step}.")?;
        }
        f.write_str(&self.name)
    }
}

impl FromStr for CollectionPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (parents, name) = parse_segments(s)?;
        Ok(Self { parents, name })
    }
}

/// Path to a scalar leaf field
///
/// An ordered list of `(collection, index)` steps terminated by a field name,
/// e.g. `summons[1].statements[0].documents[2].document_name`.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FieldPath {
    parents: Vec<PathStep>,
    field: String,
}

impl FieldPath {
    /// Scalar field on the root record
    #[inline]
    #[must_use]
    pub fn root(field: impl Into<String>) -> Self {
        Self {
            parents: Vec::new(),
            field: field.into(),
        }
    }

    /// Create from steps and field name
    #[inline]
    #[must_use]
    pub fn new(parents: Vec<PathStep>, field: impl Into<String>) -> Self {
        Self {
            parents,
            field: field.into(),
        }
    }

    /// Steps leading to the record that owns the field
    #[inline]
    #[must_use]
    pub fn parents(&self) -> &[PathStep] {
        &self.parents
    }

    /// Field name
    #[inline]
    #[must_use]
    pub fn field(&self) -> &str {
        &self.field
    }

    /// Collection holding the owning record, if not the root
    #[must_use]
    pub fn collection(&self) -> Option<CollectionPath> {
        let (last, rest) = self.parents.split_last()?;
        Some(CollectionPath::new(rest.to_vec(), last.collection.clone()))
    }
}

impl Display for FieldPath {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        for step in &self.parents {
            write!(f, "{step}.")?;
        }
        f.write_str(&self.field)
    }
}

impl FromStr for FieldPath {
    type Err = PathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (parents, field) = parse_segments(s)?;
        Ok(Self { parents, field })
    }
}

/// Split `a[0].b[1].leaf` into indexed steps and a bare trailing name
fn parse_segments(s: &str) -> Result<(Vec<PathStep>, String), PathError> {
    if s.is_empty() {
        return Err(PathError::Empty);
    }

    let segments: Vec<&str> = s.split('.').collect();
    let (leaf, steps) = segments
        .split_last()
        .ok_or(PathError::Empty)?;

    let parents = steps
        .iter()
        .map(|seg| match parse_segment(seg)? {
            (name, Some(index)) => Ok(PathStep::new(name, index)),
            (_, None) => Err(PathError::MissingIndex((*seg).to_string())),
        })
        .collect::<Result<Vec<_>, _>>()?;

    match parse_segment(leaf)? {
        (name, None) => Ok((parents, name.to_string())),
        (_, Some(_)) => Err(PathError::UnexpectedIndex((*leaf).to_string())),
    }
}

fn parse_segment(seg: &str) -> Result<(&str, Option<usize>), PathError> {
    if seg.is_empty() {
        return Err(PathError::EmptySegment);
    }

    let (name, index) = match seg.split_once('[') {
        Some((name, rest)) => {
            let digits = rest
                .strip_suffix(']')
                .ok_or_else(|| PathError::InvalidSegment(seg.to_string()))?;
            // canonical decimal only, so parse and display round-trip
            let canonical = !digits.is_empty()
                && digits.bytes().all(|b| b.is_ascii_digit())
                && (digits == "0" || !digits.starts_with('0'));
            if !canonical {
                return Err(PathError::InvalidSegment(seg.to_string()));
            }
            let index = digits
                .parse::<usize>()
                .map_err(|_| PathError::InvalidSegment(seg.to_string()))?;
            (name, Some(index))
        }
        None => (seg, None),
    };

    if name.is_empty() || name.contains(|c: char| !c.is_alphanumeric() && c != '_') {
        return Err(PathError::InvalidSegment(seg.to_string()));
    }
    Ok((name, index))
}

/// Errors parsing textual paths
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PathError {
    /// Empty path string
    #[error("path is empty")]
    Empty,

    /// Empty segment in path
    #[error("path contains empty segment")]
    EmptySegment,

    /// Invalid segment characters or index
    #[error("invalid segment: {0} (expected name or name[index])")]
    InvalidSegment(String),

    /// Intermediate segment without an index
    #[error("segment '{0}' needs an index to descend into")]
    MissingIndex(String),

    /// Final segment carrying an index
    #[error("final segment '{0}' must not carry an index")]
    UnexpectedIndex(String),
}
