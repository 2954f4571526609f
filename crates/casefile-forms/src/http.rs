//! HTTP adapter for [`ApiClient`]

use crate::api::{ApiClient, ApiError, Method};
use crate::config::{ConfigError, EditorConfig};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde_json::Value;

/// Message used when no response arrived
pub const NETWORK_ERROR: &str = "Network Error";

/// [`ApiClient`] over `reqwest`, JSON in and out
#[derive(Debug, Clone)]
pub struct HttpApiClient {
    base_url: String,
    client: reqwest::Client,
}

impl HttpApiClient {
    /// Client for the configured base URL and timeout
    ///
    /// # Errors
    /// `HttpClient` if the underlying client cannot be built with the
    /// configured timeout and user agent.
    pub fn new(config: &EditorConfig) -> Result<Self, ConfigError> {
        let client = reqwest::Client::builder()
            .timeout(config.timeout())
            .user_agent(concat!("casefile/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                tracing::warn!(error = %e, "http client setup failed");
                ConfigError::HttpClient(e.to_string())
            })?;
        Ok(Self {
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
            client,
        })
    }

    /// Full URL for an API path
    #[must_use]
    pub fn url(&self, path: &str) -> String {
        if path.starts_with('/') {
            format!("{}{path}", self.base_url)
        } else {
            format!("{}/{path}", self.base_url)
        }
    }
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::Get => Self::GET,
            Method::Post => Self::POST,
            Method::Put => Self::PUT,
            Method::Delete => Self::DELETE,
        }
    }
}

#[async_trait]
impl ApiClient for HttpApiClient {
    async fn request(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ApiError> {
        let url = self.url(path);
        tracing::debug!(%method, url = %url, "http request");

        let mut request = self.client.request(method.into(), &url);
        if let Some(body) = &body {
            request = request.json(body);
        }
        let response = request.send().await.map_err(|e| transport_error(&e))?;

        let status = response.status();
        let text = response.text().await.map_err(|e| transport_error(&e))?;
        if !status.is_success() {
            tracing::debug!(%method, url = %url, status = status.as_u16(), "http error status");
            return Err(ApiError::Status {
                status: status.as_u16(),
                message: error_message(status, &text),
            });
        }

        if status == StatusCode::NO_CONTENT || text.trim().is_empty() {
            return Ok(Value::Null);
        }
        serde_json::from_str(&text).map_err(|e| ApiError::Decode(format!("invalid JSON from {url}: {e}")))
    }
}

/// User-facing message for a non-2xx response
///
/// Uses the body's `message`, `detail` or `error` string when present,
/// otherwise the status reason.
#[must_use]
pub fn error_message(status: StatusCode, body: &str) -> String {
    if let Ok(Value::Object(fields)) = serde_json::from_str::<Value>(body) {
        let found = ["message", "detail", "error"].iter().find_map(|key| {
            fields
                .get(*key)
                .and_then(Value::as_str)
                .filter(|s| !s.trim().is_empty())
        });
        if let Some(message) = found {
            return message.to_string();
        }
    }
    match status.canonical_reason() {
        Some(reason) => reason.to_string(),
        None => format!("Request failed with status code {}", status.as_u16()),
    }
}

fn transport_error(err: &reqwest::Error) -> ApiError {
    tracing::debug!(error = %err, "transport failure");
    if err.is_timeout() {
        ApiError::Network("Request timed out".to_string())
    } else {
        ApiError::Network(NETWORK_ERROR.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn url_joins_without_double_slash() {
        let client = HttpApiClient::new(&EditorConfig::new().with_base_url("http://cases.local/api/")).unwrap();
        assert_eq!(client.url("/scns/4"), "http://cases.local/api/scns/4");
        assert_eq!(client.url("scns"), "http://cases.local/api/scns");
    }

    #[test]
    fn error_message_prefers_body_fields() {
        assert_eq!(
            error_message(StatusCode::BAD_REQUEST, r#"{"message":"SCN number already exists"}"#),
            "SCN number already exists"
        );
        assert_eq!(
            error_message(StatusCode::NOT_FOUND, r#"{"detail":"Not found."}"#),
            "Not found."
        );
        assert_eq!(
            error_message(StatusCode::FORBIDDEN, r#"{"error":"forbidden","message":""}"#),
            "forbidden"
        );
    }

    #[test]
    fn error_message_falls_back_to_status() {
        assert_eq!(
            error_message(StatusCode::INTERNAL_SERVER_ERROR, "<html>oops</html>"),
            "Internal Server Error"
        );
        // validation detail lists are not messages
        assert_eq!(
            error_message(StatusCode::UNPROCESSABLE_ENTITY, r#"{"detail":[{"loc":["body"]}]}"#),
            "Unprocessable Entity"
        );
        assert_eq!(
            error_message(StatusCode::from_u16(599).unwrap(), ""),
            "Request failed with status code 599"
        );
    }

    #[test]
    fn methods_map_to_reqwest() {
        assert_eq!(reqwest::Method::from(Method::Put), reqwest::Method::PUT);
        assert_eq!(reqwest::Method::from(Method::Delete), reqwest::Method::DELETE);
    }
}
