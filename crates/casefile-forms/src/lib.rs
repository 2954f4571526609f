//! Casefile Forms
//!
//! Editors for the nested records of an investigation file: show-cause
//! notices (SCN → noticees → amounts) and summoned persons (person → summons
//! → statements → documents).
//!
//! # Core Concepts
//!
//! - [`Aggregate`]: One top-level record kind, its shape and endpoints
//! - [`FormState`]: Immutable editable tree of one aggregate
//! - [`RecordEditor`]: Open/edit/submit/delete pipeline with an in-flight guard
//! - [`ApiClient`], [`Router`], [`NotificationSink`]: Collaborator seams
//!
//! # Example
//!
//! ```rust,ignore
//! use casefile_forms::prelude::*;
//! use std::sync::Arc;
//!
//! let config = EditorConfig::from_file("casefile.toml")?;
//! init_tracing(&config.logging)?;
//!
//! let editor = RecordEditor::<Scn>::new(
//!     Arc::new(HttpApiClient::new(&config)?),
//!     Arc::new(MemoryRouter::new().with_param("investigation_id", "INV-3")),
//!     Arc::new(TracingSink),
//!     config,
//! );
//! editor.open_new()?;
//! editor.set(FieldPath::root("scn_number"), "7/2024")?;
//! editor.submit().await?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

pub mod aggregate;
pub mod api;
pub mod config;
pub mod editor;
pub mod error;
pub mod form;
pub mod http;
pub mod notify;
pub mod router;
pub mod scn;
pub mod state_machine;
pub mod summons;
pub mod telemetry;
pub mod totals;
pub mod validation;

pub use aggregate::{record_id, Aggregate};
pub use api::{ApiClient, ApiError, Method};
pub use config::{ConfigError, EditorConfig, EndpointTemplate, Endpoints, LogConfig};
pub use editor::{EditorMode, Outcome, RecordEditor, StagedDelete};
pub use error::FormError;
pub use form::FormState;
pub use http::HttpApiClient;
pub use notify::{NoticeKind, NotificationSink, TracingSink};
pub use router::{MemoryRouter, Router};
pub use scn::Scn;
pub use state_machine::{SubmitPhase, TransitionError};
pub use summons::SummonedPerson;
pub use telemetry::init_tracing;
pub use totals::{calculate_total_for_scn, list_total, nested_amount_total, TotalError};
pub use validation::{FieldIssue, Problem};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Prelude for common imports
pub mod prelude {
    pub use crate::{
        init_tracing, Aggregate, ApiClient, EditorConfig, EditorMode, FormError, FormState,
        HttpApiClient, MemoryRouter, NoticeKind, NotificationSink, RecordEditor, Router, Scn,
        SubmitPhase, SummonedPerson, TracingSink,
    };
    pub use casefile_record::{CollectionPath, Edit, FieldPath, SubRecord};
}
