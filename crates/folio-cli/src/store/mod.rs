// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! Persistent route storage.
//!
//! Routes live in a SQLite database at `<data_dir>/routes.db`.

mod sqlite;

pub use sqlite::SqliteRouteTable;
