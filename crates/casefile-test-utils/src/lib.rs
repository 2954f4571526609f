//! Testing utilities for the casefile workspace
//!
//! Scripted API client, recording notification sink, server-record fixtures
//! and an editor harness wiring them together.

#![allow(missing_docs)]

use async_trait::async_trait;
use casefile_forms::{
    Aggregate, ApiClient, ApiError, EditorConfig, FormError, MemoryRouter, Method, NoticeKind,
    NotificationSink, RecordEditor, Scn,
};
use casefile_record::FieldPath;
use parking_lot::Mutex;
use serde_json::{json, Value};
use std::collections::{HashMap, VecDeque};
use std::sync::Arc;
use tokio::sync::Semaphore;

/// One request seen by [`ScriptedApi`]
#[derive(Debug, Clone, PartialEq)]
pub struct RecordedCall {
    pub method: Method,
    pub path: String,
    pub body: Option<Value>,
}

/// API client answering from per-method queues
///
/// Unscripted GETs answer `[]`, everything else `{}`. A gated client holds
/// every request until [`ScriptedApi::release`] hands out a permit; the call
/// is recorded before it blocks.
#[derive(Debug, Default)]
pub struct ScriptedApi {
    responses: Mutex<HashMap<Method, VecDeque<Result<Value, ApiError>>>>,
    calls: Mutex<Vec<RecordedCall>>,
    gate: Option<Semaphore>,
}

impl ScriptedApi {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn gated() -> Self {
        Self {
            gate: Some(Semaphore::new(0)),
            ..Self::default()
        }
    }

    /// Queue the next answer for `method`
    pub fn respond(&self, method: Method, response: Result<Value, ApiError>) -> &Self {
        self.responses
            .lock()
            .entry(method)
            .or_default()
            .push_back(response);
        self
    }

    /// Queue a failure for `method`
    pub fn fail(&self, method: Method, message: &str) -> &Self {
        self.respond(method, Err(ApiError::Network(message.to_string())))
    }

    /// Let `n` gated requests through
    pub fn release(&self, n: usize) {
        if let Some(gate) = &self.gate {
            gate.add_permits(n);
        }
    }

    pub fn calls(&self) -> Vec<RecordedCall> {
        self.calls.lock().clone()
    }

    pub fn calls_with(&self, method: Method) -> Vec<RecordedCall> {
        self.calls
            .lock()
            .iter()
            .filter(|call| call.method == method)
            .cloned()
            .collect()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().len()
    }
}

#[async_trait]
impl ApiClient for ScriptedApi {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        self.calls.lock().push(RecordedCall {
            method,
            path: path.to_string(),
            body,
        });

        if let Some(gate) = &self.gate {
            gate.acquire()
                .await
                .map_err(|e| ApiError::Network(e.to_string()))?
                .forget();
        }

        let scripted = self
            .responses
            .lock()
            .get_mut(&method)
            .and_then(VecDeque::pop_front);
        scripted.unwrap_or_else(|| match method {
            Method::Get => Ok(json!([])),
            _ => Ok(json!({})),
        })
    }
}

/// Sink that remembers every notice
#[derive(Debug, Default)]
pub struct RecordingSink {
    notices: Mutex<Vec<(NoticeKind, String)>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notices(&self) -> Vec<(NoticeKind, String)> {
        self.notices.lock().clone()
    }

    pub fn last(&self) -> Option<(NoticeKind, String)> {
        self.notices.lock().last().cloned()
    }
}

impl NotificationSink for RecordingSink {
    fn notify(&self, kind: NoticeKind, message: &str) {
        self.notices.lock().push((kind, message.to_string()));
    }
}

/// Investigation every harness is scoped to
pub const INVESTIGATION_ID: &str = "INV-2024-017";

/// Editor plus handles on its collaborators
pub struct Harness<A: Aggregate> {
    pub api: Arc<ScriptedApi>,
    pub router: Arc<MemoryRouter>,
    pub sink: Arc<RecordingSink>,
    pub editor: RecordEditor<A>,
}

impl<A: Aggregate> Harness<A> {
    pub fn new(api: ScriptedApi) -> Self {
        Self::with_config(api, EditorConfig::new())
    }

    pub fn with_config(api: ScriptedApi, config: EditorConfig) -> Self {
        let api = Arc::new(api);
        let router = Arc::new(MemoryRouter::new().with_param("investigation_id", INVESTIGATION_ID));
        let sink = Arc::new(RecordingSink::new());
        let editor = RecordEditor::new(
            Arc::clone(&api) as Arc<dyn ApiClient>,
            Arc::clone(&router) as Arc<dyn casefile_forms::Router>,
            Arc::clone(&sink) as Arc<dyn NotificationSink>,
            config,
        );
        Self {
            api,
            router,
            sink,
            editor,
        }
    }
}

/// Fill the required fields of a new SCN form
pub fn fill_scn(editor: &RecordEditor<Scn>) -> Result<(), FormError> {
    let noticees = casefile_forms::scn::noticees();
    let amounts = casefile_forms::scn::amounts(0);
    editor.set(FieldPath::root("scn_number"), "17/2024")?;
    editor.set(FieldPath::root("date_of_issue"), "2024-03-15")?;
    editor.update(&noticees, 0, "name_of_noticee", "M/s Kiran Traders")?;
    editor.update(&amounts, 0, "amount_type", "Tax")?;
    editor.update(&amounts, 0, "amount", "150000.00")?;
    Ok(())
}

/// SCN as listed by the server
pub fn scn_record(id: u64) -> Value {
    json!({
        "id": id,
        "scn_number": format!("{id}/2024"),
        "date_of_issue": "2024-03-15",
        "section_invoked": "74(1)",
        "status": "Issued",
        "noticees": [
            {
                "name_of_noticee": "M/s Kiran Traders",
                "address": "Pune",
                "total_amount": "250000.00",
                "amounts": [
                    { "amount_type": "Tax", "amount": "200000.00", "description": "" },
                    { "amount_type": "Penalty", "amount": "50000.00", "description": "" }
                ]
            }
        ]
    })
}

/// Summoned person with one summons holding two statements
pub fn summons_record(id: u64) -> Value {
    json!({
        "id": id,
        "name_of_person": "R. Mehta",
        "designation": "Director",
        "contact_number": "9800000000",
        "address": "Mumbai",
        "summons": [
            {
                "summons_number": "S-1",
                "date_of_issue": "2024-01-10",
                "date_of_appearance": "2024-01-20",
                "purpose": "Statement recording",
                "statements": [
                    {
                        "date_of_statement": "2024-01-20",
                        "statement_summary": "First appearance",
                        "documents": [{ "document_name": "Ledger 2022", "document_description": "" }]
                    },
                    {
                        "date_of_statement": "2024-02-02",
                        "statement_summary": "Second appearance",
                        "documents": [{ "document_name": "Bank statement", "document_description": "HDFC" }]
                    }
                ]
            }
        ]
    })
}
