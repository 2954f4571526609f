//! Router seam
//!
//! Supplies path parameters that scope endpoints and accepts post-action
//! redirects.

use indexmap::IndexMap;
use parking_lot::Mutex;

/// Router collaborator
pub trait Router: Send + Sync {
    /// Current value of a path parameter, e.g. `investigation_id`
    fn param(&self, name: &str) -> Option<String>;

    /// Move to `path`
    fn navigate(&self, path: &str);
}

/// In-memory router with fixed parameters and a navigation history
#[derive(Debug, Default)]
pub struct MemoryRouter {
    params: IndexMap<String, String>,
    history: Mutex<Vec<String>>,
}

impl MemoryRouter {
    /// Router without parameters
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a path parameter
    #[inline]
    #[must_use]
    pub fn with_param(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Paths navigated to, oldest first
    #[must_use]
    pub fn history(&self) -> Vec<String> {
        self.history.lock().clone()
    }

    /// Most recent navigation
    #[must_use]
    pub fn current(&self) -> Option<String> {
        self.history.lock().last().cloned()
    }
}

impl Router for MemoryRouter {
    fn param(&self, name: &str) -> Option<String> {
        self.params.get(name).cloned()
    }

    fn navigate(&self, path: &str) {
        tracing::debug!(path, "navigate");
        self.history.lock().push(path.to_string());
    }
}
