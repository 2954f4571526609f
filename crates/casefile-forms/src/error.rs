//! Error types for the editors
//!
//! Two families matter to callers:
//! - structural errors (bad path, unknown field, wrong shape) are caller bugs
//! - validation and remote errors are recoverable; the user keeps their input

use crate::api::ApiError;
use crate::config::ConfigError;
use crate::state_machine::TransitionError;
use crate::validation::FieldIssue;
use casefile_record::{LoadError, RecordError};

/// Main editor error type
#[derive(Debug, thiserror::Error)]
pub enum FormError {
    /// Path did not fit the record tree
    #[error("structural error: {0}")]
    Structure(#[from] RecordError),

    /// Server record could not be loaded into the editor
    #[error("could not load record: {0}")]
    Load(#[from] LoadError),

    /// Required or formatted fields failed their checks
    #[error("{} field(s) failed validation", .0.len())]
    Validation(Vec<FieldIssue>),

    /// API client rejected the request
    #[error("{0}")]
    Remote(#[from] ApiError),

    /// A submission or deletion is already in flight
    #[error("a request is already in flight")]
    Busy,

    /// Submit called while no add/edit form is open
    #[error("no form is open")]
    NotOpen,

    /// Confirm called with no delete candidate staged
    #[error("no record is staged for deletion")]
    NothingStaged,

    /// Server record carries no identifier under the configured key
    #[error("record has no '{0}' identifier")]
    MissingId(String),

    /// Endpoint or redirect template could not be rendered
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Submission phase machine refused a transition
    #[error("phase error: {0}")]
    Transition(#[from] TransitionError),
}

impl FormError {
    /// Caller bug: the request can never succeed as issued
    #[inline]
    #[must_use]
    pub fn is_structural(&self) -> bool {
        matches!(
            self,
            Self::Structure(_) | Self::Transition(_) | Self::Config(_)
        )
    }

    /// User can correct or retry without losing input
    #[inline]
    #[must_use]
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::Validation(_) | Self::Remote(_) | Self::Busy | Self::NothingStaged
        )
    }

    /// Offending fields, for highlighting
    #[inline]
    #[must_use]
    pub fn issues(&self) -> &[FieldIssue] {
        match self {
            Self::Validation(issues) => issues,
            _ => &[],
        }
    }
}
