//! Record editor and submission pipeline
//!
//! A [`RecordEditor`] owns one aggregate form, the list it belongs to, and the
//! request phase. Submissions and deletions share one in-flight guard: while
//! the phase is not [`SubmitPhase::Idle`] a second request returns
//! [`FormError::Busy`] without reaching the API client.
//!
//! State lives behind a mutex that is never held across an `.await`. A request
//! works on a snapshot taken when it starts, so edits made while it is in
//! flight cannot alter its payload.

use crate::aggregate::{record_id, Aggregate};
use crate::api::{ApiClient, ApiError, Method};
use crate::config::{EditorConfig, EndpointTemplate, Endpoints};
use crate::error::FormError;
use crate::form::FormState;
use crate::notify::{NoticeKind, NotificationSink};
use crate::router::Router;
use crate::state_machine::{validate_transition, SubmitPhase, TransitionError};
use crate::validation::FieldIssue;
use casefile_record::{CollectionPath, Edit, FieldPath};
use parking_lot::Mutex;
use serde_json::Value;
use std::fmt;
use std::sync::Arc;

/// Whether a form is open, and for what
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorMode {
    /// No form open
    Closed,
    /// Adding a new record
    Creating,
    /// Editing the server record with this id
    Editing { id: String },
}

/// Result of the last finished request
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Request succeeded
    Succeeded,
    /// Request failed with this message
    Failed(String),
}

/// Record waiting for delete confirmation
#[derive(Debug, Clone, PartialEq)]
pub struct StagedDelete {
    /// Server identity
    pub id: String,
    /// Short description for the confirmation prompt
    pub label: String,
    /// Record as listed
    pub record: Value,
}

struct EditorState<A: Aggregate> {
    form: FormState<A>,
    mode: EditorMode,
    phase: SubmitPhase,
    last_outcome: Option<Outcome>,
    issues: Vec<FieldIssue>,
    items: Vec<Value>,
    staged_delete: Option<StagedDelete>,
}

impl<A: Aggregate> EditorState<A> {
    fn new() -> Self {
        Self {
            form: FormState::create_default(),
            mode: EditorMode::Closed,
            phase: SubmitPhase::Idle,
            last_outcome: None,
            issues: Vec::new(),
            items: Vec::new(),
            staged_delete: None,
        }
    }

    fn transition(&mut self, to: SubmitPhase) -> Result<(), TransitionError> {
        validate_transition(self.phase, to)?;
        tracing::debug!(kind = A::KIND, from = %self.phase, to = %to, "phase transition");
        self.phase = to;
        Ok(())
    }

    fn reset(&mut self) {
        self.form = FormState::create_default();
        self.mode = EditorMode::Closed;
        self.issues.clear();
    }

    fn guard_idle(&self) -> Result<(), FormError> {
        if self.phase.is_busy() {
            tracing::debug!(kind = A::KIND, phase = %self.phase, "request refused while busy");
            return Err(FormError::Busy);
        }
        Ok(())
    }
}

/// Editor for one aggregate kind
pub struct RecordEditor<A: Aggregate> {
    api: Arc<dyn ApiClient>,
    router: Arc<dyn Router>,
    notices: Arc<dyn NotificationSink>,
    config: EditorConfig,
    endpoints: Endpoints,
    state: Mutex<EditorState<A>>,
}

impl<A: Aggregate> fmt::Debug for RecordEditor<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.lock();
        f.debug_struct("RecordEditor")
            .field("kind", &A::KIND)
            .field("endpoints", &self.endpoints)
            .field("mode", &state.mode)
            .field("phase", &state.phase)
            .finish_non_exhaustive()
    }
}

impl<A: Aggregate> RecordEditor<A> {
    /// Create an editor with a closed form and an empty list
    pub fn new(
        api: Arc<dyn ApiClient>,
        router: Arc<dyn Router>,
        notices: Arc<dyn NotificationSink>,
        config: EditorConfig,
    ) -> Self {
        let endpoints = config.endpoints_for::<A>();
        Self {
            api,
            router,
            notices,
            config,
            endpoints,
            state: Mutex::new(EditorState::new()),
        }
    }

    /// Configuration in use
    #[must_use]
    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Endpoint templates in use
    #[must_use]
    pub fn endpoints(&self) -> &Endpoints {
        &self.endpoints
    }

    /// Snapshot of the current form
    #[must_use]
    pub fn form(&self) -> FormState<A> {
        self.state.lock().form.clone()
    }

    #[must_use]
    pub fn mode(&self) -> EditorMode {
        self.state.lock().mode.clone()
    }

    #[must_use]
    pub fn is_open(&self) -> bool {
        self.state.lock().mode != EditorMode::Closed
    }

    #[must_use]
    pub fn phase(&self) -> SubmitPhase {
        self.state.lock().phase
    }

    #[must_use]
    pub fn last_outcome(&self) -> Option<Outcome> {
        self.state.lock().last_outcome.clone()
    }

    /// Fields flagged by the last rejected submit
    #[must_use]
    pub fn issues(&self) -> Vec<FieldIssue> {
        self.state.lock().issues.clone()
    }

    /// Records from the last list refresh
    #[must_use]
    pub fn items(&self) -> Vec<Value> {
        self.state.lock().items.clone()
    }

    #[must_use]
    pub fn staged_delete(&self) -> Option<StagedDelete> {
        self.state.lock().staged_delete.clone()
    }

    /// Open an empty form for a new record
    ///
    /// # Errors
    /// `Busy` while a request is in flight.
    pub fn open_new(&self) -> Result<(), FormError> {
        let mut state = self.state.lock();
        state.guard_idle()?;
        state.reset();
        state.mode = EditorMode::Creating;
        tracing::debug!(kind = A::KIND, "opened new form");
        Ok(())
    }

    /// Open a form loaded from a listed server record
    ///
    /// # Errors
    /// `Busy` while a request is in flight, `MissingId` if the record has no
    /// identity, `Load` if it does not fit the aggregate shape.
    pub fn open_edit(&self, record: &Value) -> Result<(), FormError> {
        let id_key = self.config.id_key.as_str();
        let id = record_id(record, id_key).ok_or_else(|| FormError::MissingId(id_key.to_string()))?;
        let form = FormState::load_from(record, id_key)?;

        let mut state = self.state.lock();
        state.guard_idle()?;
        state.form = form;
        state.issues.clear();
        tracing::debug!(kind = A::KIND, id = %id, "opened edit form");
        state.mode = EditorMode::Editing { id };
        Ok(())
    }

    /// Close the form and discard its contents
    ///
    /// # Errors
    /// `Busy` while a request is in flight.
    pub fn cancel(&self) -> Result<(), FormError> {
        let mut state = self.state.lock();
        state.guard_idle()?;
        state.reset();
        tracing::debug!(kind = A::KIND, "form cancelled");
        Ok(())
    }

    /// Apply one edit to the open form
    ///
    /// # Errors
    /// `NotOpen` without an open form, `Structure` for paths outside the tree.
    pub fn edit(&self, edit: &Edit) -> Result<(), FormError> {
        let mut state = self.state.lock();
        if state.mode == EditorMode::Closed {
            return Err(FormError::NotOpen);
        }
        state.form = state.form.apply(edit)?;
        tracing::debug!(kind = A::KIND, edit = %edit, "edit applied");
        Ok(())
    }

    /// Replace a scalar of the open form
    ///
    /// # Errors
    /// See [`RecordEditor::edit`].
    pub fn set(&self, path: FieldPath, value: impl Into<String>) -> Result<(), FormError> {
        self.edit(&Edit::set(path, value))
    }

    /// Replace `field` of element `index` of the collection at `path`
    ///
    /// # Errors
    /// See [`RecordEditor::edit`].
    pub fn update(
        &self,
        path: &CollectionPath,
        index: usize,
        field: &str,
        value: impl Into<String>,
    ) -> Result<(), FormError> {
        self.edit(&Edit::set(path.field(index, field), value))
    }

    /// Append a default element
    ///
    /// # Errors
    /// See [`RecordEditor::edit`].
    pub fn insert(&self, path: &CollectionPath) -> Result<(), FormError> {
        self.edit(&Edit::insert(path.clone()))
    }

    /// Remove an element; the last one of a collection stays
    ///
    /// # Errors
    /// See [`RecordEditor::edit`].
    pub fn remove_at(&self, path: &CollectionPath, index: usize) -> Result<(), FormError> {
        self.edit(&Edit::remove(path.clone(), index))
    }

    /// Validate and submit the open form
    ///
    /// New records are POSTed to the collection endpoint, existing ones PUT
    /// to their item endpoint. On success the form is reset and closed, the
    /// list refreshed and a success notice sent. On failure the form stays
    /// as it was and the API message is sent as an error notice.
    ///
    /// # Errors
    /// `Busy`, `NotOpen`, `Validation`, `Config` before any request is made;
    /// `Remote` when the API client rejects it.
    pub async fn submit(&self) -> Result<Value, FormError> {
        let (method, path, payload, editing) = {
            let mut state = self.state.lock();
            state.guard_idle()?;
            let editing = match &state.mode {
                EditorMode::Closed => return Err(FormError::NotOpen),
                EditorMode::Creating => None,
                EditorMode::Editing { id } => Some(id.clone()),
            };

            let issues = state.form.validate();
            if !issues.is_empty() {
                tracing::debug!(kind = A::KIND, count = issues.len(), "submit blocked by validation");
                state.issues.clone_from(&issues);
                return Err(FormError::Validation(issues));
            }
            state.issues.clear();

            let (method, path) = match editing.as_deref() {
                None => (Method::Post, self.render(&self.endpoints.collection, None)?),
                Some(id) => (Method::Put, self.render(&self.endpoints.item, Some(id))?),
            };
            state.transition(SubmitPhase::Submitting)?;
            (method, path, state.form.to_payload(), editing)
        };

        tracing::info!(kind = A::KIND, %method, path = %path, "submitting");
        match self.api.request(method, &path, Some(payload)).await {
            Ok(response) => {
                {
                    let mut state = self.state.lock();
                    state.transition(SubmitPhase::Succeeded)?;
                    state.last_outcome = Some(Outcome::Succeeded);
                    state.reset();
                }
                tracing::info!(kind = A::KIND, %method, path = %path, "submit succeeded");

                self.refresh_after_success().await;
                let verb = if editing.is_some() { "updated" } else { "created" };
                self.notices
                    .notify(NoticeKind::Success, &format!("{} {verb} successfully", A::LABEL));

                let id = record_id(&response, &self.config.id_key).or(editing);
                self.redirect(id.as_deref());

                self.state.lock().transition(SubmitPhase::Idle)?;
                Ok(response)
            }
            Err(err) => {
                self.fail(&err)?;
                Err(err.into())
            }
        }
    }

    /// Reload the list from the collection endpoint
    ///
    /// Returns the number of records listed. An empty (`null`) response is
    /// an empty list.
    ///
    /// # Errors
    /// `Config` if the endpoint cannot be rendered, `Remote` if the request
    /// fails or the response is not a list.
    pub async fn refresh(&self) -> Result<usize, FormError> {
        let path = self.render(&self.endpoints.collection, None)?;
        let items = match self.api.request(Method::Get, &path, None).await? {
            Value::Array(items) => items,
            Value::Null => Vec::new(),
            other => {
                return Err(ApiError::Decode(format!(
                    "expected a list from {path}, got {}",
                    json_kind(&other)
                ))
                .into())
            }
        };
        let count = items.len();
        tracing::debug!(kind = A::KIND, path = %path, count, "list refreshed");
        self.state.lock().items = items;
        Ok(count)
    }

    /// Stage a listed record for deletion
    ///
    /// Replaces any earlier candidate.
    ///
    /// # Errors
    /// `Busy` while a request is in flight, `MissingId` if the record has no
    /// identity.
    pub fn request_delete(&self, record: &Value) -> Result<(), FormError> {
        let id_key = self.config.id_key.as_str();
        let id = record_id(record, id_key).ok_or_else(|| FormError::MissingId(id_key.to_string()))?;
        let mut state = self.state.lock();
        state.guard_idle()?;
        tracing::debug!(kind = A::KIND, id = %id, "delete staged");
        state.staged_delete = Some(StagedDelete {
            id,
            label: A::describe(record, id_key),
            record: record.clone(),
        });
        Ok(())
    }

    /// Drop the delete candidate without side effects
    pub fn cancel_delete(&self) -> Option<StagedDelete> {
        let staged = self.state.lock().staged_delete.take();
        if let Some(staged) = &staged {
            tracing::debug!(kind = A::KIND, id = %staged.id, "delete cancelled");
        }
        staged
    }

    /// Delete the staged candidate
    ///
    /// On success the candidate is cleared, an edit form for the same record
    /// is closed, the list refreshed and a success notice sent. On failure the
    /// candidate stays staged.
    ///
    /// # Errors
    /// `Busy`, `NothingStaged`, `Config` before any request is made; `Remote`
    /// when the API client rejects it.
    pub async fn confirm_delete(&self) -> Result<(), FormError> {
        let (staged, path) = {
            let mut state = self.state.lock();
            state.guard_idle()?;
            let staged = state.staged_delete.clone().ok_or(FormError::NothingStaged)?;
            let path = self.render(&self.endpoints.item, Some(&staged.id))?;
            state.transition(SubmitPhase::Deleting)?;
            (staged, path)
        };

        tracing::info!(kind = A::KIND, id = %staged.id, path = %path, "deleting");
        match self.api.request(Method::Delete, &path, None).await {
            Ok(_) => {
                {
                    let mut state = self.state.lock();
                    state.transition(SubmitPhase::Succeeded)?;
                    state.last_outcome = Some(Outcome::Succeeded);
                    state.staged_delete = None;
                    if state.mode == (EditorMode::Editing { id: staged.id.clone() }) {
                        state.reset();
                    }
                }
                tracing::info!(kind = A::KIND, id = %staged.id, "delete succeeded");

                self.refresh_after_success().await;
                self.notices
                    .notify(NoticeKind::Success, &format!("{} deleted successfully", A::LABEL));

                self.state.lock().transition(SubmitPhase::Idle)?;
                Ok(())
            }
            Err(err) => {
                self.fail(&err)?;
                Err(err.into())
            }
        }
    }

    fn fail(&self, err: &ApiError) -> Result<(), TransitionError> {
        let message = err.to_string();
        {
            let mut state = self.state.lock();
            state.transition(SubmitPhase::Failed)?;
            state.last_outcome = Some(Outcome::Failed(message.clone()));
        }
        tracing::warn!(kind = A::KIND, status = ?err.status(), error = %message, "request failed");
        self.notices.notify(NoticeKind::Error, &message);
        self.state.lock().transition(SubmitPhase::Idle)
    }

    async fn refresh_after_success(&self) {
        if let Err(err) = self.refresh().await {
            tracing::warn!(kind = A::KIND, error = %err, "list refresh failed");
            self.notices.notify(NoticeKind::Error, &err.to_string());
        }
    }

    fn redirect(&self, id: Option<&str>) {
        let Some(template) = &self.config.redirect_after_submit else {
            return;
        };
        match self.render(template, id) {
            Ok(target) => self.router.navigate(&target),
            Err(err) => tracing::warn!(kind = A::KIND, error = %err, "redirect skipped"),
        }
    }

    fn render(&self, template: &EndpointTemplate, id: Option<&str>) -> Result<String, FormError> {
        let path = template.render(|name| match (name, id) {
            ("id", Some(id)) => Some(id.to_string()),
            _ => self.router.param(name),
        })?;
        Ok(path)
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "a list",
        Value::Object(_) => "an object",
    }
}
