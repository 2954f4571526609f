//! Editor configuration
//!
//! Loaded from TOML or built in code. Endpoint templates use `{param}`
//! placeholders filled from router parameters and the record id.

use crate::aggregate::Aggregate;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;

/// Path template such as `/investigations/{investigation_id}/scns`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EndpointTemplate(String);

impl EndpointTemplate {
    /// Create new template
    #[inline]
    #[must_use]
    pub fn new(template: impl Into<String>) -> Self {
        Self(template.into())
    }

    /// Raw template text
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Fill every `{name}` with `lookup(name)`
    ///
    /// # Errors
    /// `MissingParam` when `lookup` has no value, `MalformedTemplate` for an
    /// unterminated or empty placeholder.
    pub fn render<F>(&self, lookup: F) -> Result<String, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut out = String::with_capacity(self.0.len());
        let mut rest = self.0.as_str();

        while let Some(open) = rest.find('{') {
            out.push_str(&rest[..open]);
            let after = &rest[open + 1..];
            let close = after
                .find('}')
                .ok_or_else(|| ConfigError::MalformedTemplate(self.0.clone()))?;
            let name = &after[..close];
            if name.is_empty() {
                return Err(ConfigError::MalformedTemplate(self.0.clone()));
            }
            let value = lookup(name).ok_or_else(|| ConfigError::MissingParam {
                template: self.0.clone(),
                param: name.to_string(),
            })?;
            out.push_str(&value);
            rest = &after[close + 1..];
        }
        out.push_str(rest);
        Ok(out)
    }
}

/// Collection and item endpoints of one aggregate
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoints {
    /// List (GET) and create (POST)
    pub collection: EndpointTemplate,
    /// Update (PUT) and delete (DELETE); has an `{id}` placeholder
    pub item: EndpointTemplate,
}

impl Endpoints {
    /// Create from template strings
    #[inline]
    #[must_use]
    pub fn new(collection: impl Into<String>, item: impl Into<String>) -> Self {
        Self {
            collection: EndpointTemplate::new(collection),
            item: EndpointTemplate::new(item),
        }
    }
}

/// Logging setup
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    /// `EnvFilter` directive used when `RUST_LOG` is unset
    pub filter: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            filter: "info".to_string(),
            json: false,
        }
    }
}

/// Editor configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EditorConfig {
    /// Base URL the API client joins paths onto
    pub api_base_url: String,
    /// Per-request timeout in seconds
    pub request_timeout_secs: u64,
    /// Key holding the record identity in server records
    pub id_key: String,
    /// Where to navigate after a successful submit (may use `{id}`)
    pub redirect_after_submit: Option<EndpointTemplate>,
    /// Endpoint overrides keyed by aggregate kind
    pub endpoints: IndexMap<String, Endpoints>,
    /// Logging setup
    pub logging: LogConfig,
}

impl EditorConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With API base URL
    #[inline]
    #[must_use]
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.api_base_url = url.into();
        self
    }

    /// With request timeout
    #[inline]
    #[must_use]
    pub fn with_timeout_secs(mut self, secs: u64) -> Self {
        self.request_timeout_secs = secs;
        self
    }

    /// With identity key
    #[inline]
    #[must_use]
    pub fn with_id_key(mut self, key: impl Into<String>) -> Self {
        self.id_key = key.into();
        self
    }

    /// With post-submit redirect
    #[inline]
    #[must_use]
    pub fn with_redirect(mut self, template: impl Into<String>) -> Self {
        self.redirect_after_submit = Some(EndpointTemplate::new(template));
        self
    }

    /// With endpoint override for `kind`
    #[inline]
    #[must_use]
    pub fn with_endpoints(mut self, kind: impl Into<String>, endpoints: Endpoints) -> Self {
        self.endpoints.insert(kind.into(), endpoints);
        self
    }

    /// Request timeout
    #[inline]
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Endpoints for `A`: the override if configured, else the aggregate's own
    #[must_use]
    pub fn endpoints_for<A: Aggregate>(&self) -> Endpoints {
        self.endpoints
            .get(A::KIND)
            .cloned()
            .unwrap_or_else(A::endpoints)
    }

    /// Parse from TOML text
    ///
    /// # Errors
    /// Returns error on malformed TOML or mistyped keys.
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        Ok(toml::from_str(text)?)
    }

    /// Read and parse a TOML file
    ///
    /// # Errors
    /// Returns error if the file cannot be read or parsed.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let text = std::fs::read_to_string(path.as_ref())?;
        Self::from_toml_str(&text)
    }
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            api_base_url: "http://localhost:8000/api".to_string(),
            request_timeout_secs: 30,
            id_key: "id".to_string(),
            redirect_after_submit: None,
            endpoints: IndexMap::new(),
            logging: LogConfig::default(),
        }
    }
}

/// Configuration errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// Config file unreadable
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML did not parse into the config
    #[error("parse error: {0}")]
    Parse(#[from] toml::de::Error),

    /// Template references a parameter nobody supplied
    #[error("template '{template}' needs parameter '{param}'")]
    MissingParam { template: String, param: String },

    /// Unterminated or empty placeholder
    #[error("malformed template: {0}")]
    MalformedTemplate(String),

    /// HTTP client could not be built from the configuration
    #[error("http client setup failed: {0}")]
    HttpClient(String),
}
