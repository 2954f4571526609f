//! Casefile Record Trees
//!
//! Nested, path-addressed record trees with copy-on-write edits.
//!
//! # Core Concepts
//!
//! - [`RecordShape`]: Fixed field layout of one sub-record type
//! - [`SubRecord`]: One record; scalars plus nested [`Collection`]s
//! - [`FieldPath`] / [`CollectionPath`]: Addresses like `summons[1].statements[0].statement_summary`
//! - [`Edit`]: A mutation as a value
//!
//! # Example
//!
//! ```rust,ignore
//! use casefile_record::{CollectionPath, RecordShape, SubRecord};
//!
//! let amount = RecordShape::builder("amount").amount("amount", true).build();
//! let noticee = RecordShape::builder("noticee")
//!     .required_text("name_of_noticee")
//!     .collection("amounts", amount)
//!     .build();
//!
//! let root = SubRecord::default_for(&noticee);
//! let amounts = CollectionPath::root("amounts");
//! let edited = root.insert_default(&amounts)?.update(&amounts, 1, "amount", "500")?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod edit;
mod json;
mod path;
mod record;
mod shape;

pub use edit::{apply_all, Edit};
pub use json::LoadError;
pub use path::{CollectionPath, FieldPath, PathError, PathStep};
pub use record::{Collection, FieldValue, Leaf, RecordError, SubRecord};
pub use shape::{FieldKind, FieldSpec, RecordShape, ShapeBuilder};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod integration_tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn parsed_paths_drive_edits() {
        let document = RecordShape::builder("document").text("document_name").build();
        let statement = RecordShape::builder("statement")
            .collection("documents", document)
            .build();
        let root = SubRecord::default_for(&statement);

        let documents = CollectionPath::from_str("documents").unwrap();
        let edited = root.insert_default(&documents).unwrap();
        let path = FieldPath::from_str("documents[1].document_name").unwrap();
        let edited = Edit::set(path.clone(), "Bank statement").apply(&edited).unwrap();

        assert_eq!(edited.read(&path).unwrap(), "Bank statement");
        assert_eq!(edited.collection("documents").unwrap().len(), 2);
    }
}
