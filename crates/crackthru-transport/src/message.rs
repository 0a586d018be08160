//! Request and response values that travel through an [`HttpTransport`].
//!
//! These are deliberately plain data: a method, a path relative to the
//! API base URL, headers, and raw body bytes. Serialization happens one
//! layer up (the protocol crate's codec), so the transport never needs
//! to know what a login form looks like.
//!
//! [`HttpTransport`]: crate::HttpTransport

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Counter for generating unique request IDs.
static NEXT_REQUEST_ID: AtomicU64 = AtomicU64::new(1);

/// The content type every API call carries.
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Opaque identifier for a logical request.
///
/// A retried request keeps its ID, which makes the retry easy to spot
/// in the logs next to the original attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RequestId(u64);

impl RequestId {
    /// Allocates the next process-unique ID.
    pub fn next() -> Self {
        Self(NEXT_REQUEST_ID.fetch_add(1, Ordering::Relaxed))
    }

    /// Returns the underlying `u64` value.
    pub fn into_inner(self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "req-{}", self.0)
    }
}

/// HTTP methods used by the API.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Method {
    Get,
    Post,
    Put,
    Delete,
}

impl Method {
    /// The upper-case wire name (`"GET"`, `"POST"`, ...).
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
        }
    }
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// An outgoing request.
///
/// `Clone` matters: the authenticated request wrapper re-sends the
/// *identical* request after a session refresh.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    /// Log correlation ID.
    pub id: RequestId,
    pub method: Method,
    /// Path relative to the API base URL, e.g. `/auth/login`.
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<Vec<u8>>,
}

impl HttpRequest {
    /// Creates a request with the JSON content type already set.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            id: RequestId::next(),
            method,
            path: path.into(),
            headers: vec![(
                "Content-Type".to_string(),
                JSON_CONTENT_TYPE.to_string(),
            )],
            body: None,
        }
    }

    /// Shorthand for a `GET` request.
    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    /// Shorthand for a `POST` request.
    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    /// Adds a header.
    pub fn header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// Sets the request body (already encoded).
    pub fn body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }
}

/// A response as received from the server.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    /// Creates a response with no headers.
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            headers: Vec::new(),
            body: body.into(),
        }
    }

    /// Adds a header.
    pub fn with_header(
        mut self,
        name: impl Into<String>,
        value: impl Into<String>,
    ) -> Self {
        self.headers.push((name.into(), value.into()));
        self
    }

    /// `true` for any 2xx status.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Case-insensitive header lookup. Returns the first match.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_request_id_is_unique() {
        let a = RequestId::next();
        let b = RequestId::next();
        assert_ne!(a, b);
        assert!(b.into_inner() > a.into_inner());
    }

    #[test]
    fn test_request_id_display() {
        let id = RequestId(7);
        assert_eq!(id.to_string(), "req-7");
    }

    #[test]
    fn test_new_request_carries_json_content_type() {
        let req = HttpRequest::post("/auth/login");
        assert_eq!(req.method, Method::Post);
        assert!(req.headers.iter().any(|(k, v)| {
            k == "Content-Type" && v == JSON_CONTENT_TYPE
        }));
        assert!(req.body.is_none());
    }

    #[test]
    fn test_cloned_request_is_identical() {
        let req = HttpRequest::get("/auth/profile").header("X-Trace", "1");
        let retry = req.clone();
        assert_eq!(req, retry);
        assert_eq!(req.id, retry.id);
    }

    #[test]
    fn test_response_header_lookup_is_case_insensitive() {
        let res = HttpResponse::new(200, "ok")
            .with_header("Content-Type", "text/html");
        assert_eq!(res.header("content-type"), Some("text/html"));
        assert_eq!(res.header("x-missing"), None);
    }

    #[test]
    fn test_response_is_success_only_for_2xx() {
        assert!(HttpResponse::new(200, "").is_success());
        assert!(HttpResponse::new(204, "").is_success());
        assert!(!HttpResponse::new(301, "").is_success());
        assert!(!HttpResponse::new(401, "").is_success());
        assert!(!HttpResponse::new(500, "").is_success());
    }
}
