//! Saisei client errors

use std::fmt;
use thiserror::Error;

/// Category of a failure reported by the network layer
///
/// Every kind maps to a stable, non-zero numeric code (see [`TransportErrorKind::code`]).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransportErrorKind {
    /// The request could not be built (malformed URL, bad client setup)
    Builder,
    /// Connection could not be established (DNS, refused, TLS handshake)
    Connect,
    /// The request or connection timed out
    Timeout,
    /// Redirect policy failure
    Redirect,
    /// Failure while sending the request
    Request,
    /// Failure while reading the request or response body
    Body,
    /// The response body could not be decoded
    Decode,
    /// Anything the transport did not classify
    Other,
}

impl TransportErrorKind {
    /// Numeric code for this kind; never zero
    #[must_use]
    pub fn code(self) -> u32 {
        match self {
            Self::Builder => 1,
            Self::Connect => 2,
            Self::Timeout => 3,
            Self::Redirect => 4,
            Self::Request => 5,
            Self::Body => 6,
            Self::Decode => 7,
            Self::Other => 99,
        }
    }

    /// Classify a reqwest error
    pub(crate) fn classify(err: &reqwest::Error) -> Self {
        // Timeouts also report as connect errors when they hit during connect
        if err.is_timeout() {
            Self::Timeout
        } else if err.is_builder() {
            Self::Builder
        } else if err.is_connect() {
            Self::Connect
        } else if err.is_redirect() {
            Self::Redirect
        } else if err.is_body() {
            Self::Body
        } else if err.is_decode() {
            Self::Decode
        } else if err.is_request() {
            Self::Request
        } else {
            Self::Other
        }
    }
}

impl fmt::Display for TransportErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Builder => "builder",
            Self::Connect => "connect",
            Self::Timeout => "timeout",
            Self::Redirect => "redirect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Other => "other",
        };
        f.write_str(name)
    }
}

/// Errors that can occur when interacting with the Saisei API
#[derive(Debug, Error)]
pub enum SaiseiError {
    /// HTTP verb outside GET/PUT/POST/DELETE
    #[error("Invalid HTTP method: {0}")]
    InvalidMethod(String),

    /// JSON serialization/deserialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The network layer failed before a response was received
    #[error("Transport error ({kind}, code {}): {message}", .kind.code())]
    Transport {
        /// Failure category
        kind: TransportErrorKind,
        /// Human-readable description from the transport
        message: String,
        /// Underlying transport error
        #[source]
        source: reqwest::Error,
    },

    /// Client configuration is missing or malformed
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Non-2xx response, produced only by [`crate::ApiResponse::error_for_status`]
    #[error("Saisei API error: {status} - {body}")]
    Api {
        /// HTTP status code
        status: u16,
        /// Raw response body
        body: String,
    },
}

impl SaiseiError {
    /// Transport error code, if this is a transport failure
    #[must_use]
    pub fn code(&self) -> Option<u32> {
        match self {
            Self::Transport { kind, .. } => Some(kind.code()),
            _ => None,
        }
    }

    /// Transport error kind, if this is a transport failure
    #[must_use]
    pub fn transport_kind(&self) -> Option<TransportErrorKind> {
        match self {
            Self::Transport { kind, .. } => Some(*kind),
            _ => None,
        }
    }
}

impl From<reqwest::Error> for SaiseiError {
    fn from(source: reqwest::Error) -> Self {
        Self::Transport {
            kind: TransportErrorKind::classify(&source),
            message: source.to_string(),
            source,
        }
    }
}
