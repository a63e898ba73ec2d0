// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

// Warn on missing documentation for public items
#![warn(missing_docs)]

//! folio CLI library.
//!
//! This crate hosts a [`folio::Router`] for a flat-file site: it loads
//! `folio.toml`, keeps persisted routes in SQLite, serves content files
//! from disk and exposes everything over HTTP with axum.
//!
//! # Usage
//!
//! This crate is primarily used through the `folio` binary:
//!
//! ```bash
//! folio init my-site          # Create a project
//! folio serve                 # Serve it
//! folio routes                # List routes and content
//! folio match GET /about      # Explain a match
//! ```

/// CLI commands (init, serve, routes, match).
pub mod commands;
/// Built-in components and seed routes.
pub mod components;
/// Project configuration from `folio.toml`.
pub mod config;
/// Filesystem content store.
pub mod content;
/// HTTP server.
pub mod server;
/// Route table with SQLite backend.
pub mod store;
