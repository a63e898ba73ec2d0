// Copyright 2019-2026 Maravilla Labs, operated by SOLUTAS GmbH, Switzerland
// SPDX-License-Identifier: Apache-2.0
// SPDX-License-Identifier: MIT

//! SQLite-backed route table implementation.

use folio::{RouteRow, RouteTable, TableError, TableResult};
use rusqlite::{params, Connection};
use std::path::Path;
use std::sync::Mutex;

const CREATE_TABLE: &str = r#"
    CREATE TABLE routes (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        method TEXT NOT NULL,
        pattern TEXT NOT NULL,
        handler TEXT NOT NULL DEFAULT '',
        options TEXT NOT NULL DEFAULT '{}'
    )
"#;

/// SQLite-backed route table.
///
/// The table is not created on open: a fresh database reports a missing
/// table so the router reseeds it with its default routes.
pub struct SqliteRouteTable {
    conn: Mutex<Connection>,
}

impl SqliteRouteTable {
    /// Opens (or creates) `data_dir/routes.db`.
    pub fn open(data_dir: &Path) -> TableResult<Self> {
        std::fs::create_dir_all(data_dir)
            .map_err(|e| TableError::Storage(format!("Failed to create {}: {}", data_dir.display(), e)))?;

        let db_path = data_dir.join("routes.db");
        let conn = Connection::open(&db_path)
            .map_err(|e| TableError::Storage(format!("Failed to open database: {}", e)))?;

        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    /// Opens a private in-memory database.
    pub fn in_memory() -> TableResult<Self> {
        let conn = Connection::open_in_memory()
            .map_err(|e| TableError::Storage(format!("Failed to open database: {}", e)))?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> TableResult<std::sync::MutexGuard<'_, Connection>> {
        self.conn.lock().map_err(|e| TableError::Storage(e.to_string()))
    }
}

impl RouteTable for SqliteRouteTable {
    fn exists(&self) -> TableResult<bool> {
        let conn = self.lock()?;
        let count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master WHERE type = 'table' AND name = 'routes'",
                [],
                |row| row.get(0),
            )
            .map_err(|e| TableError::Storage(e.to_string()))?;
        Ok(count > 0)
    }

    fn load(&self) -> TableResult<Vec<RouteRow>> {
        let conn = self.lock()?;
        let mut stmt = conn
            .prepare("SELECT method, pattern, handler, options FROM routes ORDER BY id")
            .map_err(|e| match e {
                rusqlite::Error::SqliteFailure(_, Some(ref msg)) if msg.contains("no such table") => {
                    TableError::Missing
                }
                e => TableError::Storage(e.to_string()),
            })?;

        let rows = stmt
            .query_map([], |row| {
                Ok(RouteRow {
                    method: row.get(0)?,
                    pattern: row.get(1)?,
                    handler: row.get(2)?,
                    options: row.get(3)?,
                })
            })
            .map_err(|e| TableError::Storage(e.to_string()))?;

        rows.collect::<Result<Vec<_>, _>>()
            .map_err(|e| TableError::Storage(e.to_string()))
    }

    fn reinitialize(&self) -> TableResult<()> {
        let conn = self.lock()?;
        conn.execute("DROP TABLE IF EXISTS routes", [])
            .map_err(|e| TableError::Storage(format!("Failed to drop table: {}", e)))?;
        conn.execute(CREATE_TABLE, [])
            .map_err(|e| TableError::Storage(format!("Failed to create table: {}", e)))?;
        tracing::info!("route table reinitialized");
        Ok(())
    }

    fn save(&self, rows: &[RouteRow]) -> TableResult<()> {
        let mut conn = self.lock()?;
        let tx = conn
            .transaction()
            .map_err(|e| TableError::Storage(e.to_string()))?;

        tx.execute("DELETE FROM routes", []).map_err(|e| match e {
            rusqlite::Error::SqliteFailure(_, Some(ref msg)) if msg.contains("no such table") => {
                TableError::Missing
            }
            e => TableError::Storage(e.to_string()),
        })?;

        for row in rows {
            tx.execute(
                "INSERT INTO routes (method, pattern, handler, options) VALUES (?1, ?2, ?3, ?4)",
                params![row.method, row.pattern, row.handler, row.options],
            )
            .map_err(|e| TableError::Storage(e.to_string()))?;
        }

        tx.commit().map_err(|e| TableError::Storage(e.to_string()))
    }
}
