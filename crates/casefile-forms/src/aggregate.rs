//! Aggregate kinds
//!
//! An [`Aggregate`] names one top-level record type the office submits as a
//! unit, together with its shape and default endpoints.

use crate::config::Endpoints;
use casefile_record::RecordShape;
use serde_json::Value;
use std::fmt::Debug;
use std::sync::Arc;

/// Top-level record type edited and submitted as one unit
pub trait Aggregate: Send + Sync + 'static + Debug {
    /// Stable identifier, also the key for endpoint overrides
    ///
    /// Lowercase alphanumeric with underscores.
    const KIND: &'static str;

    /// Name used in user-facing notices
    const LABEL: &'static str;

    /// Root shape (shared, built once)
    fn shape() -> Arc<RecordShape>;

    /// Default endpoint templates
    fn endpoints() -> Endpoints;

    /// Short description of a server record, for delete prompts
    ///
    /// Default implementation uses the record's identity under `id_key`.
    fn describe(record: &Value, id_key: &str) -> String {
        record_id(record, id_key).unwrap_or_else(|| Self::LABEL.to_string())
    }
}

/// Identity of a server record under `key`, in text form
#[must_use]
pub fn record_id(record: &Value, key: &str) -> Option<String> {
    match record.get(key)? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        _ => None,
    }
}
