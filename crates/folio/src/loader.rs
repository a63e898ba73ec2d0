// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Route persistence loader.
//!
//! Reads rows from a [`RouteTable`] and decodes them into route
//! definitions. A missing, empty or unreadable table is reinitialized and
//! reseeded with [`default_rows`]. Rows that fail to decode are logged and
//! skipped.

use crate::route::HandlerRef;
use crate::table::{PersistedOptions, RouteRow, RouteTable};

/// Template of the synthesized root route.
pub const ROOT_PATTERN: &str = "/";

/// Template of the synthesized catch-all route.
pub const CATCH_ALL_PATTERN: &str = "/{path:.+}";

/// The root and catch-all rows, both content fallbacks.
pub fn default_rows() -> Vec<RouteRow> {
    vec![
        RouteRow::new("GET", ROOT_PATTERN, "", "{}"),
        RouteRow::new("GET", CATCH_ALL_PATTERN, "", "{}"),
    ]
}

/// A decoded row, ready for registration.
#[derive(Debug, Clone)]
pub struct RouteDefinition {
    /// Upper-cased HTTP method.
    pub method: String,
    /// Path template.
    pub pattern: String,
    /// Parsed handler reference.
    pub handler: HandlerRef,
    /// Decoded options.
    pub options: PersistedOptions,
}

/// Loads rows, reseeding the table when it is unusable.
pub fn load_rows(table: &dyn RouteTable) -> Vec<RouteRow> {
    let loaded = match table.exists() {
        Ok(true) => table.load(),
        Ok(false) => {
            tracing::warn!("route table does not exist; reseeding default routes");
            return reseed(table);
        }
        Err(e) => Err(e),
    };

    match loaded {
        Ok(rows) if rows.is_empty() => {
            tracing::warn!("route table is empty; reseeding default routes");
            reseed(table)
        }
        Ok(rows) => rows,
        Err(e) => {
            tracing::warn!("route table unreadable ({}); reseeding default routes", e);
            reseed(table)
        }
    }
}

fn reseed(table: &dyn RouteTable) -> Vec<RouteRow> {
    let rows = default_rows();
    if let Err(e) = table.reinitialize() {
        tracing::warn!("failed to reinitialize route table: {}", e);
    } else if let Err(e) = table.save(&rows) {
        tracing::warn!("failed to seed route table: {}", e);
    }
    rows
}

/// Decodes one row, or `None` (with a warning) if it is malformed.
pub fn decode_row(row: &RouteRow) -> Option<RouteDefinition> {
    let method = row.method.trim().to_uppercase();
    if method.is_empty() {
        tracing::warn!("skipping route {}: empty method", row.pattern);
        return None;
    }

    let options = match PersistedOptions::decode(&row.options) {
        Ok(options) => options,
        Err(e) => {
            tracing::warn!("skipping route {} {}: invalid options JSON: {}", method, row.pattern, e);
            return None;
        }
    };

    let handler = match row.handler.parse::<HandlerRef>() {
        Ok(handler) => handler,
        Err(e) => {
            tracing::warn!("skipping route {} {}: {}", method, row.pattern, e);
            return None;
        }
    };

    Some(RouteDefinition {
        method,
        pattern: row.pattern.clone(),
        handler,
        options,
    })
}
