// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Error types for the folio router.
//!
//! [`RouterError`] covers every failure the router propagates to its caller.
//! Each variant belongs to one of three classes that the hosting transport
//! translates into a status code via [`RouterError::status`]:
//!
//! - **Not found** (404): no route and no content fallback
//! - **Bad request** (400): a captured parameter failed its schema
//! - **Server error** (500): handler resolution, middleware lookup, storage
//!
//! Unsafe path sub-patterns are not errors: the compiler downgrades them to
//! the default segment pattern and logs a warning instead.

use thiserror::Error;

use crate::table::TableError;

/// The main error type for router operations.
#[derive(Error, Debug)]
pub enum RouterError {
    /// No registered route, implicit home, or content resource matched.
    #[error("Route not found: {method} {path}")]
    RouteNotFound {
        /// Request method.
        method: String,
        /// Normalized request path.
        path: String,
    },

    /// A captured path parameter failed its validation rule.
    #[error("Invalid parameter `{name}`: {reason}")]
    InvalidParameter {
        /// Parameter name.
        name: String,
        /// Which rule failed.
        reason: String,
    },

    /// A handler reference could not be turned into an invocation.
    #[error("Handler resolution error: {0}")]
    HandlerResolution(String),

    /// A route referenced a middleware alias that was never registered.
    #[error("Middleware not found: {0}")]
    MiddlewareNotFound(String),

    /// URL generation was asked for a name that is not in the index.
    #[error("Route not found: no route named `{0}`")]
    UnknownRouteName(String),

    /// URL generation left a placeholder without a value.
    #[error("Route not found: missing parameter `{param}` for route `{route}`")]
    MissingParameter {
        /// Route name.
        route: String,
        /// Placeholder that had no value.
        param: String,
    },

    /// `name()` was called before any route was registered.
    #[error("Cannot name a route: the registry is empty")]
    EmptyRegistry,

    /// A resolved handler returned an error of its own.
    #[error("Handler error: {0}")]
    Handler(String),

    /// The route table backing store failed.
    #[error("Storage error: {0}")]
    Storage(#[from] TableError),
}

impl RouterError {
    /// Returns the HTTP status class the transport should answer with.
    pub fn status(&self) -> u16 {
        match self {
            Self::RouteNotFound { .. } | Self::UnknownRouteName(_) | Self::MissingParameter { .. } => 404,
            Self::InvalidParameter { .. } => 400,
            Self::HandlerResolution(_)
            | Self::MiddlewareNotFound(_)
            | Self::EmptyRegistry
            | Self::Handler(_)
            | Self::Storage(_) => 500,
        }
    }

    /// Returns true for errors a client caused (4xx).
    pub fn is_client_error(&self) -> bool {
        (400..500).contains(&self.status())
    }
}

/// Convenience type alias for Results with [`RouterError`].
pub type Result<T> = std::result::Result<T, RouterError>;
