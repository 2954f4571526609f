//! Record shapes
//!
//! A [`RecordShape`] fixes the ordered set of fields every sub-record of one
//! collection type carries. Shapes are built once and shared behind `Arc`.

use std::sync::Arc;

/// Kind of value a field holds
#[derive(Debug, Clone, PartialEq)]
pub enum FieldKind {
    /// Free text
    Text,
    /// Decimal amount kept as entered text
    Amount,
    /// Calendar date as `YYYY-MM-DD` text
    Date,
    /// Nested collection of sub-records
    Collection(Arc<RecordShape>),
}

impl FieldKind {
    /// Whether this field holds a scalar
    #[inline]
    #[must_use]
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Self::Collection(_))
    }
}

/// One named field of a shape
#[derive(Debug, Clone, PartialEq)]
pub struct FieldSpec {
    name: String,
    kind: FieldKind,
    required: bool,
}

impl FieldSpec {
    /// Field name (wire contract)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Field kind
    #[inline]
    #[must_use]
    pub fn kind(&self) -> &FieldKind {
        &self.kind
    }

    /// Whether a blank value blocks submission
    #[inline]
    #[must_use]
    pub fn is_required(&self) -> bool {
        self.required
    }

    /// Nested shape, for collection fields
    #[inline]
    #[must_use]
    pub fn nested_shape(&self) -> Option<&Arc<RecordShape>> {
        match &self.kind {
            FieldKind::Collection(shape) => Some(shape),
            _ => None,
        }
    }
}

/// Fixed, ordered field layout of one sub-record type
#[derive(Debug, Clone, PartialEq)]
pub struct RecordShape {
    name: String,
    fields: Vec<FieldSpec>,
}

impl RecordShape {
    /// Start building a shape
    #[inline]
    #[must_use]
    pub fn builder(name: impl Into<String>) -> ShapeBuilder {
        ShapeBuilder {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Shape name (used in diagnostics)
    #[inline]
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Fields in declaration order
    #[inline]
    #[must_use]
    pub fn fields(&self) -> &[FieldSpec] {
        &self.fields
    }

    /// Position of a field by name
    #[inline]
    #[must_use]
    pub fn position(&self, name: &str) -> Option<usize> {
        self.fields.iter().position(|f| f.name == name)
    }

    /// Field spec by name
    #[inline]
    #[must_use]
    pub fn field(&self, name: &str) -> Option<&FieldSpec> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Names of nested collection fields
    pub fn collection_names(&self) -> impl Iterator<Item = &str> {
        self.fields
            .iter()
            .filter(|f| !f.kind.is_scalar())
            .map(|f| f.name.as_str())
    }
}

/// Builder for [`RecordShape`]
#[derive(Debug)]
pub struct ShapeBuilder {
    name: String,
    fields: Vec<FieldSpec>,
}

impl ShapeBuilder {
    fn push(mut self, name: impl Into<String>, kind: FieldKind, required: bool) -> Self {
        let name = name.into();
        debug_assert!(
            self.fields.iter().all(|f| f.name != name),
            "duplicate field '{name}' in shape '{}'",
            self.name
        );
        self.fields.push(FieldSpec {
            name,
            kind,
            required,
        });
        self
    }

    /// Optional text field
    #[must_use]
    pub fn text(self, name: impl Into<String>) -> Self {
        self.push(name, FieldKind::Text, false)
    }

    /// Required text field
    #[must_use]
    pub fn required_text(self, name: impl Into<String>) -> Self {
        self.push(name, FieldKind::Text, true)
    }

    /// Amount field
    #[must_use]
    pub fn amount(self, name: impl Into<String>, required: bool) -> Self {
        self.push(name, FieldKind::Amount, required)
    }

    /// Date field
    #[must_use]
    pub fn date(self, name: impl Into<String>, required: bool) -> Self {
        self.push(name, FieldKind::Date, required)
    }

    /// Nested collection field
    #[must_use]
    pub fn collection(self, name: impl Into<String>, shape: Arc<RecordShape>) -> Self {
        self.push(name, FieldKind::Collection(shape), false)
    }

    /// Finish the shape
    #[must_use]
    pub fn build(self) -> Arc<RecordShape> {
        Arc::new(RecordShape {
            name: self.name,
            fields: self.fields,
        })
    }
}
