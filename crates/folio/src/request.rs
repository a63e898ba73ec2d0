// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Transport-independent request value.
//!
//! A [`Request`] is assembled once by the hosting transport (an HTTP server,
//! a test, a CLI probe) and then handed down through matching, middleware
//! and handlers by shared reference. Nothing in the router mutates it.

use std::collections::HashMap;

/// An incoming request as seen by the router.
///
/// # Example
///
/// ```rust
/// use folio::Request;
///
/// let request = Request::new("GET", "/blog/hello")
///     .with_query([("page".into(), "2".into())].into());
/// assert_eq!(request.method, "GET");
/// ```
#[derive(Debug, Clone)]
pub struct Request {
    /// The HTTP method, upper-cased (e.g., "GET", "POST")
    pub method: String,

    /// The request path as received (e.g., "/blog/hello")
    pub path: String,

    /// Query parameters
    pub query: HashMap<String, String>,

    /// HTTP headers (names lower-cased)
    pub headers: HashMap<String, String>,

    /// Request body, if any
    pub body: Option<Vec<u8>>,
}

impl Request {
    /// Creates a request with the given method and path.
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into().to_ascii_uppercase(),
            path: path.into(),
            query: HashMap::new(),
            headers: HashMap::new(),
            body: None,
        }
    }

    /// Sets the query parameters.
    pub fn with_query(mut self, query: HashMap<String, String>) -> Self {
        self.query = query;
        self
    }

    /// Sets the headers. Header names are stored lower-cased.
    pub fn with_headers(mut self, headers: HashMap<String, String>) -> Self {
        self.headers = headers
            .into_iter()
            .map(|(k, v)| (k.to_ascii_lowercase(), v))
            .collect();
        self
    }

    /// Sets the body.
    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = Some(body);
        self
    }

    /// Looks up a header case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .get(&name.to_ascii_lowercase())
            .map(|s| s.as_str())
    }

    /// Returns the body as a string, if present and valid UTF-8.
    pub fn body_str(&self) -> Option<&str> {
        self.body.as_ref().and_then(|b| std::str::from_utf8(b).ok())
    }

    /// Returns the body parsed as JSON, if present and valid.
    pub fn body_json(&self) -> Option<serde_json::Value> {
        self.body_str().and_then(|s| serde_json::from_str(s).ok())
    }
}

impl Default for Request {
    fn default() -> Self {
        Self::new("GET", "/")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_is_uppercased() {
        let req = Request::new("post", "/form");
        assert_eq!(req.method, "POST");
    }

    #[test]
    fn test_header_lookup_is_case_insensitive() {
        let req = Request::new("GET", "/")
            .with_headers([("Content-Type".into(), "text/html".into())].into());
        assert_eq!(req.header("content-type"), Some("text/html"));
        assert_eq!(req.header("CONTENT-TYPE"), Some("text/html"));
        assert_eq!(req.header("accept"), None);
    }

    #[test]
    fn test_body_json() {
        let req = Request::new("POST", "/api").with_body(br#"{"title": "Hello"}"#.to_vec());
        let json = req.body_json().unwrap();
        assert_eq!(json["title"], "Hello");
    }
}
