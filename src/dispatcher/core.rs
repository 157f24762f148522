use http::Method;
use serde::Serialize;
use serde_json::Value;
use smallvec::SmallVec;
use std::any::Any;
use std::collections::HashMap;
use std::sync::Arc;

use crate::router::ParamVec;

/// Maximum inline headers before heap allocation. Most responses carry well
/// under sixteen headers.
pub const MAX_INLINE_HEADERS: usize = 16;

/// Stack-allocated header storage.
///
/// Header names use `Arc<str>` because they are often repeated literals;
/// values remain `String` as per-request data.
pub type HeaderVec = SmallVec<[(Arc<str>, String); MAX_INLINE_HEADERS]>;

/// A terminal route handler.
///
/// Receives the request (with its parameter vector attached) and the
/// in-flight response to write into.
pub type Handler = Arc<dyn Fn(&HandlerRequest, &mut HandlerResponse) + Send + Sync>;

/// Payload of a fault caught during a single dispatch.
pub type FaultPayload = Box<dyn Any + Send>;

/// Optional per-router callback isolating uncaught handler/middleware faults.
///
/// Receives the in-flight request/response pair and the fault payload, and is
/// solely responsible for producing a response.
pub type FaultHandler = Arc<dyn Fn(&HandlerRequest, &mut HandlerResponse, FaultPayload) + Send + Sync>;

/// Request data handed to the routing core by the external transport.
///
/// The transport owns socket handling and header parsing; the core only needs
/// the method and path, and attaches the matched route's parameter vector for
/// the duration of handler execution.
#[derive(Debug, Clone)]
pub struct HandlerRequest {
    /// HTTP method (GET, POST, etc.).
    pub method: Method,
    /// Request path as received, e.g. `/users/123`.
    pub path: String,
    /// Parameters extracted by the matcher. Absent, not empty, when the
    /// matched route exposed no parameters.
    params: Option<ParamVec>,
}

impl HandlerRequest {
    /// Create a request value for dispatch. Parameters start absent and are
    /// attached by the router when a pattern route matches.
    #[must_use]
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            params: None,
        }
    }

    /// Get a path parameter by name.
    ///
    /// Uses "last write wins" semantics: with duplicate parameter names at
    /// different path depths, the deepest occurrence is returned.
    #[inline]
    #[must_use]
    pub fn param(&self, name: &str) -> Option<&str> {
        self.params
            .as_ref()?
            .iter()
            .rfind(|(k, _)| k.as_ref() == name)
            .map(|(_, v)| v.as_str())
    }

    /// All extracted parameters, absent when the matched route exposed none.
    #[inline]
    #[must_use]
    pub fn params(&self) -> Option<&ParamVec> {
        self.params.as_ref()
    }

    /// Convert the parameter vector to a `HashMap` for convenience.
    /// Note: this allocates - use [`HandlerRequest::param`] in hot paths.
    #[must_use]
    pub fn params_map(&self) -> Option<HashMap<String, String>> {
        self.params
            .as_ref()
            .map(|params| params.iter().map(|(k, v)| (k.to_string(), v.clone())).collect())
    }

    pub(crate) fn set_params(&mut self, params: Option<ParamVec>) {
        self.params = params;
    }
}

/// Response data written by handlers and returned to the external transport.
#[derive(Debug, Clone, Serialize)]
pub struct HandlerResponse {
    /// HTTP status code (200, 404, 500, etc.).
    pub status: u16,
    /// HTTP response headers (stack-allocated for ≤16 headers).
    #[serde(skip_serializing)]
    pub headers: HeaderVec,
    /// Response body as JSON.
    pub body: Value,
}

impl Default for HandlerResponse {
    fn default() -> Self {
        Self {
            status: 200,
            headers: HeaderVec::new(),
            body: Value::Null,
        }
    }
}

impl HandlerResponse {
    /// Create a new response with the given status, headers, and body.
    #[must_use]
    pub fn new(status: u16, headers: HeaderVec, body: Value) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a JSON response with a content-type header.
    #[must_use]
    pub fn json(status: u16, body: Value) -> Self {
        let mut headers = HeaderVec::new();
        headers.push((Arc::from("content-type"), "application/json".to_string()));
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create an error response.
    #[must_use]
    pub fn error(status: u16, message: &str) -> Self {
        Self::json(status, serde_json::json!({ "error": message }))
    }

    /// Get a header by name (case-insensitive).
    #[inline]
    #[must_use]
    pub fn get_header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Add or update a header.
    pub fn set_header(&mut self, name: &str, value: String) {
        self.headers.retain(|(k, _)| !k.eq_ignore_ascii_case(name));
        self.headers.push((Arc::from(name), value));
    }
}
