// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Persisted route table.
//!
//! Routes can be stored as rows of `(method, pattern, handler, options)`,
//! where `handler` is the persisted [`HandlerRef`](crate::HandlerRef) form
//! (`""` or `component@method`) and `options` is a JSON object decoded into
//! [`PersistedOptions`].
//!
//! The router only reads the table during dispatch. It writes to it when
//! reseeding defaults or when asked to save explicitly.

use std::collections::HashMap;
use std::fmt;
use std::sync::{PoisonError, RwLock};

use serde::{Deserialize, Serialize};

use crate::validate::ParamSchema;

/// Result type for table operations.
pub type TableResult<T> = Result<T, TableError>;

/// Error type for table operations.
#[derive(Debug)]
pub enum TableError {
    /// The table does not exist.
    Missing,
    /// Storage backend error.
    Storage(String),
}

impl fmt::Display for TableError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TableError::Missing => write!(f, "Route table does not exist"),
            TableError::Storage(msg) => write!(f, "Storage error: {}", msg),
        }
    }
}

impl std::error::Error for TableError {}

/// One persisted route.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteRow {
    /// HTTP method.
    pub method: String,
    /// Path template.
    pub pattern: String,
    /// `""` for content fallback, otherwise `component@method`.
    pub handler: String,
    /// JSON-encoded [`PersistedOptions`].
    pub options: String,
}

impl RouteRow {
    /// Creates a row.
    pub fn new(
        method: impl Into<String>,
        pattern: impl Into<String>,
        handler: impl Into<String>,
        options: impl Into<String>,
    ) -> Self {
        Self {
            method: method.into(),
            pattern: pattern.into(),
            handler: handler.into(),
            options: options.into(),
        }
    }
}

/// Decoded `options` column.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedOptions {
    /// Route name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Middleware aliases, outermost first.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub middleware: Vec<String>,
    /// Sub-pattern overrides.
    #[serde(rename = "where", skip_serializing_if = "HashMap::is_empty")]
    pub constraints: HashMap<String, String>,
    /// Parameter validation rules.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub schema: Option<ParamSchema>,
    /// Group prefix the route was registered under.
    #[serde(skip_serializing_if = "String::is_empty")]
    pub group: String,
}

impl PersistedOptions {
    /// Decodes the options column. Blank text is an empty object.
    pub fn decode(text: &str) -> serde_json::Result<Self> {
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_json::from_str(text)
    }

    /// Encodes to the options column.
    pub fn encode(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Backing store of persisted routes.
pub trait RouteTable: Send + Sync {
    /// Returns true if the table exists.
    fn exists(&self) -> TableResult<bool>;

    /// Loads every row in storage order.
    fn load(&self) -> TableResult<Vec<RouteRow>>;

    /// Drops and recreates the table, leaving it empty.
    fn reinitialize(&self) -> TableResult<()>;

    /// Replaces the table contents with `rows`.
    fn save(&self, rows: &[RouteRow]) -> TableResult<()>;
}

/// In-memory [`RouteTable`].
///
/// `None` stands for a table that does not exist yet.
#[derive(Debug)]
pub struct MemoryRouteTable {
    rows: RwLock<Option<Vec<RouteRow>>>,
}

impl Default for MemoryRouteTable {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryRouteTable {
    /// An existing, empty table.
    pub fn new() -> Self {
        Self::with_rows(Vec::new())
    }

    /// A table that has not been created.
    pub fn missing() -> Self {
        Self {
            rows: RwLock::new(None),
        }
    }

    /// A table holding `rows`.
    pub fn with_rows(rows: Vec<RouteRow>) -> Self {
        Self {
            rows: RwLock::new(Some(rows)),
        }
    }

    /// A copy of the current rows (`None` if the table is missing).
    pub fn rows(&self) -> Option<Vec<RouteRow>> {
        self.rows.read().unwrap_or_else(PoisonError::into_inner).clone()
    }
}

impl RouteTable for MemoryRouteTable {
    fn exists(&self) -> TableResult<bool> {
        Ok(self.rows.read().unwrap_or_else(PoisonError::into_inner).is_some())
    }

    fn load(&self) -> TableResult<Vec<RouteRow>> {
        self.rows
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
            .ok_or(TableError::Missing)
    }

    fn reinitialize(&self) -> TableResult<()> {
        *self.rows.write().unwrap_or_else(PoisonError::into_inner) = Some(Vec::new());
        Ok(())
    }

    fn save(&self, rows: &[RouteRow]) -> TableResult<()> {
        let mut guard = self.rows.write().unwrap_or_else(PoisonError::into_inner);
        match guard.as_mut() {
            Some(existing) => {
                *existing = rows.to_vec();
                Ok(())
            }
            None => Err(TableError::Missing),
        }
    }
}
