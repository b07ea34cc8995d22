//! Saisei API models
//!
//! The appliance speaks free-form JSON, so responses are kept as raw text with
//! the HTTP status next to them. Decoding is opt-in through [`ApiResponse::json`]
//! and [`ApiResponse::json_as`].

use crate::error::SaiseiError;
use crate::request::RequestMethod;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::net::SocketAddr;
use std::time::Duration;

/// Body of the commit call that saves the running configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommitRequest {
    /// Partition the configuration is saved to
    pub save_partition: String,
    /// Whether the running configuration is persisted
    pub save_config: String,
}

impl Default for CommitRequest {
    fn default() -> Self {
        Self {
            save_partition: "current".to_string(),
            save_config: "true".to_string(),
        }
    }
}

/// Response of a single Saisei API call
///
/// Non-2xx statuses are not errors here; use [`ApiResponse::error_for_status`]
/// to treat them as such.
#[derive(Debug, Clone)]
pub struct ApiResponse {
    status: u16,
    body: String,
    diagnostics: Option<TransportDiagnostics>,
}

impl ApiResponse {
    /// Create a response from a status and raw body
    pub fn new(status: u16, body: impl Into<String>) -> Self {
        Self {
            status,
            body: body.into(),
            diagnostics: None,
        }
    }

    pub(crate) fn with_diagnostics(mut self, diagnostics: Option<TransportDiagnostics>) -> Self {
        self.diagnostics = diagnostics;
        self
    }

    /// HTTP status code
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Whether the status is 2xx
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Raw response body
    pub fn body(&self) -> &str {
        &self.body
    }

    /// Take the raw response body
    pub fn into_body(self) -> String {
        self.body
    }

    /// Transport diagnostics, captured only when debug is enabled
    pub fn diagnostics(&self) -> Option<&TransportDiagnostics> {
        self.diagnostics.as_ref()
    }

    /// Decode the body into a JSON value
    ///
    /// # Errors
    /// Returns [`SaiseiError::Serialization`] if the body is not valid JSON.
    pub fn json(&self) -> Result<serde_json::Value, SaiseiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Decode the body into `T`
    ///
    /// # Errors
    /// Returns [`SaiseiError::Serialization`] if the body does not match `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> Result<T, SaiseiError> {
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Turn a non-2xx response into [`SaiseiError::Api`]
    ///
    /// # Errors
    /// Returns [`SaiseiError::Api`] carrying the status and body when the
    /// status is outside 200..300.
    pub fn error_for_status(self) -> Result<Self, SaiseiError> {
        if self.is_success() {
            Ok(self)
        } else {
            Err(SaiseiError::Api {
                status: self.status,
                body: self.body,
            })
        }
    }
}

/// Transport metadata recorded for one call in debug mode
#[derive(Debug, Clone)]
pub struct TransportDiagnostics {
    /// Verb sent
    pub method: RequestMethod,
    /// Full URL including the query string
    pub url: String,
    /// When the request was sent
    pub started_at: DateTime<Utc>,
    /// Time from send until the body was fully read
    pub elapsed: Duration,
    /// HTTP status code
    pub status: u16,
    /// Peer address, when the transport reports it
    pub remote_addr: Option<SocketAddr>,
    /// `Content-Length` announced by the server
    pub content_length: Option<u64>,
    /// Response headers in received order
    pub response_headers: Vec<(String, String)>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_commit_request_wire_format() {
        let body = serde_json::to_string(&CommitRequest::default()).expect("serializable");
        assert_eq!(body, r#"{"save_partition":"current","save_config":"true"}"#);
    }

    #[test]
    fn test_json_decodes_once() {
        let response = ApiResponse::new(200, r#"{"collection":[{"name":"eth0"}]}"#);
        let value = response.json().expect("valid json");
        assert_eq!(value["collection"][0]["name"], json!("eth0"));
    }

    #[test]
    fn test_json_as_typed() {
        #[derive(Deserialize)]
        struct Collection {
            collection: Vec<serde_json::Value>,
        }
        let response = ApiResponse::new(200, r#"{"collection":[{},{}]}"#);
        let decoded: Collection = response.json_as().expect("valid json");
        assert_eq!(decoded.collection.len(), 2);
    }

    #[test]
    fn test_invalid_json_is_serialization_error() {
        let response = ApiResponse::new(200, "<html>oops</html>");
        assert!(matches!(response.json(), Err(SaiseiError::Serialization(_))));
    }

    #[test]
    fn test_error_for_status() {
        let ok = ApiResponse::new(201, "{}").error_for_status();
        assert!(matches!(ok, Ok(ref r) if r.status() == 201));

        match ApiResponse::new(404, r#"{"error":"no such user"}"#).error_for_status() {
            Err(SaiseiError::Api { status, body }) => {
                assert_eq!(status, 404);
                assert!(body.contains("no such user"));
            }
            other => panic!("expected Api error, got {other:?}"),
        }
    }
}
