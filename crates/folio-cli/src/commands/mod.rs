// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! CLI command implementations.
//!
//! - `init`: Create a project and seed its route table
//! - `serve`: Serve the project over HTTP
//! - `routes`: Print the route table and content
//! - `match`: Show which route a request would hit

/// Project initialization command.
pub mod init;
/// Route matching command.
pub mod match_route;
/// Route listing command.
pub mod routes;
/// HTTP server command.
pub mod serve;
