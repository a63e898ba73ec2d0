// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Handler responses and dispatch results.
//!
//! A handler produces a [`Response`]; the dispatcher wraps it in
//! [`Dispatch::Response`]. Routes that defer to the content layer produce
//! [`Dispatch::Content`] instead, leaving rendering to the caller.

use std::collections::HashMap;

use serde_json::Value as JsonValue;

use crate::pattern::Params;

/// A platform-agnostic response returned by a handler.
///
/// # Example
///
/// ```rust
/// use folio::Response;
///
/// let html = Response::html(200, "<h1>Hello</h1>");
/// let json = Response::json(200, serde_json::json!({"ok": true}));
/// let redirect = Response::redirect("/login");
/// assert!(redirect.is_redirect());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Response {
    /// HTML body
    Html {
        /// HTTP status code
        status: u16,
        /// HTTP headers
        headers: HashMap<String, String>,
        /// HTML body
        body: String,
    },

    /// JSON body
    Json {
        /// HTTP status code
        status: u16,
        /// HTTP headers
        headers: HashMap<String, String>,
        /// JSON body
        body: JsonValue,
    },

    /// Redirect
    Redirect {
        /// HTTP status code (301, 302, 303, 307, 308)
        status: u16,
        /// Redirect location
        location: String,
    },
}

impl Response {
    /// Creates an HTML response.
    pub fn html(status: u16, body: impl Into<String>) -> Self {
        Self::Html {
            status,
            headers: HashMap::new(),
            body: body.into(),
        }
    }

    /// Creates a JSON response.
    pub fn json(status: u16, body: JsonValue) -> Self {
        Self::Json {
            status,
            headers: HashMap::new(),
            body,
        }
    }

    /// Creates a redirect response (HTTP 302).
    pub fn redirect(location: impl Into<String>) -> Self {
        Self::Redirect {
            status: 302,
            location: location.into(),
        }
    }

    /// Returns the status code.
    pub fn status(&self) -> u16 {
        match self {
            Self::Html { status, .. } | Self::Json { status, .. } | Self::Redirect { status, .. } => {
                *status
            }
        }
    }

    /// Returns true if this is a redirect response (3xx).
    pub fn is_redirect(&self) -> bool {
        (300..400).contains(&self.status())
    }

    /// Adds a header (Html and Json variants only).
    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Self::Html { headers, .. } | Self::Json { headers, .. } = &mut self {
            headers.insert(key.into(), value.into());
        }
        self
    }

    /// Returns a header value (Html and Json variants only).
    pub fn header(&self, key: &str) -> Option<&str> {
        match self {
            Self::Html { headers, .. } | Self::Json { headers, .. } => {
                headers.get(key).map(|s| s.as_str())
            }
            Self::Redirect { .. } => None,
        }
    }
}

/// A content identifier handed to the renderer for a content-fallback match.
#[derive(Debug, Clone, PartialEq)]
pub struct ContentTarget {
    /// Content identifier (the path without its leading slash, or the home id).
    pub path: String,
    /// Parameters captured while matching.
    pub params: Params,
}

/// The outcome of dispatching a request.
#[derive(Debug, Clone, PartialEq)]
pub enum Dispatch {
    /// A resolved handler produced a response.
    Response(Response),
    /// The matched route defers to the content layer.
    Content(ContentTarget),
}

impl Dispatch {
    /// Returns the handler response, if this is one.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Response(response) => Some(response),
            Self::Content(_) => None,
        }
    }

    /// Returns the content target, if this is one.
    pub fn content(&self) -> Option<&ContentTarget> {
        match self {
            Self::Content(target) => Some(target),
            Self::Response(_) => None,
        }
    }
}

impl From<Response> for Dispatch {
    fn from(response: Response) -> Self {
        Self::Response(response)
    }
}
