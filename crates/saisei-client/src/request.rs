//! Single Saisei API request
//!
//! A [`SaiseiRequest`] describes exactly one HTTP exchange. It is built per
//! call, optionally given a JSON body and query parameters, and consumed by
//! [`SaiseiRequest::execute`].

use crate::common::query::encode_pair;
use crate::config::SaiseiConfig;
use crate::error::SaiseiError;
use crate::models::{ApiResponse, TransportDiagnostics};
use chrono::Utc;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use reqwest::Client;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use std::time::Instant;
use tracing::debug;

const CONTENT_TYPE_JSON: (&str, &str) = ("Content-Type", "application/json");

/// HTTP verbs accepted by the Saisei API
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RequestMethod {
    /// Read a resource or collection
    Get,
    /// Create or replace a resource
    Put,
    /// Invoke an action
    Post,
    /// Remove a resource
    Delete,
}

impl RequestMethod {
    /// Upper-case verb
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Put => "PUT",
            Self::Post => "POST",
            Self::Delete => "DELETE",
        }
    }
}

impl FromStr for RequestMethod {
    type Err = SaiseiError;

    /// Parse an upper-case verb; anything but GET, PUT, POST and DELETE is rejected
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "GET" => Ok(Self::Get),
            "PUT" => Ok(Self::Put),
            "POST" => Ok(Self::Post),
            "DELETE" => Ok(Self::Delete),
            other => Err(SaiseiError::InvalidMethod(other.to_string())),
        }
    }
}

impl fmt::Display for RequestMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<RequestMethod> for reqwest::Method {
    fn from(method: RequestMethod) -> Self {
        match method {
            RequestMethod::Get => reqwest::Method::GET,
            RequestMethod::Put => reqwest::Method::PUT,
            RequestMethod::Post => reqwest::Method::POST,
            RequestMethod::Delete => reqwest::Method::DELETE,
        }
    }
}

/// One HTTP call against a Saisei appliance
pub struct SaiseiRequest {
    http: Client,
    method: RequestMethod,
    host: String,
    port: u16,
    path: String,
    username: String,
    password: String,
    headers: Vec<(String, String)>,
    query: Vec<String>,
    payload: Option<String>,
    debug: bool,
}

impl fmt::Debug for SaiseiRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SaiseiRequest")
            .field("method", &self.method)
            .field("url", &self.url())
            .field("username", &self.username)
            .field("headers", &self.headers)
            .field("payload", &self.payload)
            .field("debug", &self.debug)
            .finish_non_exhaustive()
    }
}

impl SaiseiRequest {
    /// Create a request for `path` on the appliance described by `config`
    ///
    /// `http` is shared and cheap to clone; the request keeps its own handle.
    pub fn new(http: &Client, config: &SaiseiConfig, method: RequestMethod, path: impl Into<String>) -> Self {
        Self {
            http: http.clone(),
            method,
            host: config.host().to_string(),
            port: config.port(),
            path: path.into(),
            username: config.username().to_string(),
            password: config.password().to_string(),
            headers: vec![("Accept".to_string(), "application/json".to_string())],
            query: Vec::new(),
            payload: None,
            debug: config.debug(),
        }
    }

    /// Create a request from a verb name
    ///
    /// # Errors
    /// Returns [`SaiseiError::InvalidMethod`] for any verb other than GET, PUT,
    /// POST or DELETE.
    pub fn with_method_name(
        http: &Client,
        config: &SaiseiConfig,
        method: &str,
        path: impl Into<String>,
    ) -> Result<Self, SaiseiError> {
        let method = method.parse::<RequestMethod>()?;
        Ok(Self::new(http, config, method, path))
    }

    /// Attach a JSON body and mark the request as `application/json`
    ///
    /// # Errors
    /// Returns [`SaiseiError::Serialization`] if `value` cannot be represented as JSON.
    pub fn body<B: Serialize + ?Sized>(mut self, value: &B) -> Result<Self, SaiseiError> {
        self.payload = Some(serde_json::to_string(value)?);
        let (name, content_type) = CONTENT_TYPE_JSON;
        if !self.headers.iter().any(|(k, _)| k.eq_ignore_ascii_case(name)) {
            self.headers.push((name.to_string(), content_type.to_string()));
        }
        Ok(self)
    }

    /// Add an extra header
    #[must_use]
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Append one `name=value` query fragment
    #[must_use]
    pub fn query_param(mut self, name: &str, value: &str) -> Self {
        self.query.push(encode_pair(name, value));
        self
    }

    /// Append every pair, in order
    #[must_use]
    pub fn query_params(self, params: &[(&str, &str)]) -> Self {
        params
            .iter()
            .fold(self, |request, (name, value)| request.query_param(name, value))
    }

    /// HTTP verb
    pub fn method(&self) -> RequestMethod {
        self.method
    }

    /// Request path, without query string
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Headers that will be sent, besides authorization
    pub fn headers(&self) -> &[(String, String)] {
        &self.headers
    }

    /// Serialized JSON body, if one was attached
    pub fn payload(&self) -> Option<&str> {
        self.payload.as_deref()
    }

    /// `?a=1&b=2`, or empty when no parameters were added
    pub fn query_string(&self) -> String {
        if self.query.is_empty() {
            String::new()
        } else {
            format!("?{}", self.query.join("&"))
        }
    }

    /// Full target URL: `{host}:{port}{path}{query}`
    pub fn url(&self) -> String {
        format!("{}:{}{}{}", self.host, self.port, self.path, self.query_string())
    }

    fn header_map(&self) -> Result<HeaderMap, SaiseiError> {
        let mut map = HeaderMap::with_capacity(self.headers.len());
        for (name, value) in &self.headers {
            let header_name = HeaderName::from_bytes(name.as_bytes())
                .map_err(|e| SaiseiError::InvalidConfig(format!("invalid header name {name:?}: {e}")))?;
            let header_value = HeaderValue::from_str(value)
                .map_err(|e| SaiseiError::InvalidConfig(format!("invalid value for header {name}: {e}")))?;
            map.append(header_name, header_value);
        }
        Ok(map)
    }

    /// Send the request and read the whole response body
    ///
    /// HTTP error statuses are returned as ordinary responses.
    ///
    /// # Errors
    /// * [`SaiseiError::Transport`] - the network layer failed
    /// * [`SaiseiError::InvalidConfig`] - a header name or value is not valid
    pub async fn execute(self) -> Result<ApiResponse, SaiseiError> {
        let url = self.url();
        let headers = self.header_map()?;
        let Self {
            http,
            method,
            username,
            password,
            payload,
            debug,
            ..
        } = self;

        debug!("{} {}", method, url);
        if debug {
            debug!(
                method = %method,
                url = %url,
                headers = ?headers,
                payload = payload.as_deref().unwrap_or(""),
                "Saisei request"
            );
        }

        let mut builder = http
            .request(method.into(), url.as_str())
            .basic_auth(username, Some(password))
            .headers(headers);
        if let Some(payload) = payload {
            builder = builder.body(payload);
        }

        let started_at = Utc::now();
        let timer = Instant::now();

        let response = match builder.send().await {
            Ok(response) => response,
            Err(e) => {
                let err = SaiseiError::from(e);
                if debug {
                    debug!(
                        method = %method,
                        url = %url,
                        code = err.code().unwrap_or_default(),
                        elapsed = ?timer.elapsed(),
                        error = %err,
                        "Saisei request failed"
                    );
                }
                return Err(err);
            }
        };

        let status = response.status().as_u16();
        let mut diagnostics = debug.then(|| TransportDiagnostics {
            method,
            url: url.clone(),
            started_at,
            elapsed: timer.elapsed(),
            status,
            remote_addr: response.remote_addr(),
            content_length: response.content_length(),
            response_headers: response
                .headers()
                .iter()
                .map(|(k, v)| (k.to_string(), String::from_utf8_lossy(v.as_bytes()).into_owned()))
                .collect(),
        });

        let body = response.text().await?;

        if let Some(diagnostics) = diagnostics.as_mut() {
            diagnostics.elapsed = timer.elapsed();
            debug!(
                method = %method,
                url = %url,
                status,
                code = 0,
                elapsed = ?diagnostics.elapsed,
                remote_addr = ?diagnostics.remote_addr,
                content_length = ?diagnostics.content_length,
                response_headers = ?diagnostics.response_headers,
                "Saisei response"
            );
        }

        Ok(ApiResponse::new(status, body).with_diagnostics(diagnostics))
    }
}
