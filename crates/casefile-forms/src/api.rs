//! API client seam
//!
//! The editors only ever talk to the backend through [`ApiClient`]. An HTTP
//! implementation lives in [`crate::http`]; tests substitute scripted ones.

use async_trait::async_trait;
use serde_json::Value;
use std::fmt::{self, Display, Formatter};

/// HTTP verb used by the editors
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    /// List or fetch
    Get,
    /// Create
    Post,
    /// Update
    Put,
    /// Delete
    Delete,
}

impl Method {
    /// Upper-case verb
    #[inline]
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl Display for Method {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rejection from the API client
///
/// `Display` is the human-readable message surfaced to the user.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ApiError {
    /// Server answered with a non-2xx status
    #[error("{message}")]
    Status { status: u16, message: String },

    /// Request never got a response
    #[error("{0}")]
    Network(String),

    /// Response body could not be understood
    #[error("{0}")]
    Decode(String),
}

impl ApiError {
    /// HTTP status, if the server answered
    #[inline]
    #[must_use]
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status, .. } => Some(*status),
            _ => None,
        }
    }
}

/// Backend collaborator: one JSON request, one JSON answer
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ApiClient: Send + Sync {
    /// Issue `method` against `path` with an optional JSON body
    ///
    /// # Errors
    /// Non-2xx responses and transport failures, carrying a readable message.
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn method_display() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Delete.as_str(), "DELETE");
    }

    #[test]
    fn error_messages_are_user_facing() {
        let err = ApiError::Status {
            status: 422,
            message: "SCN number already exists".into(),
        };
        assert_eq!(err.to_string(), "SCN number already exists");
        assert_eq!(err.status(), Some(422));
        assert_eq!(ApiError::Network("Network Error".into()).status(), None);
    }
}
