// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! SQLite-backed durable store for the pending-action queue.
//!
//! The [`Store`] owns a single `queue_v1` table. Ids are assigned by
//! SQLite with `AUTOINCREMENT`, which guarantees they ascend in insertion
//! order and are never reused even after the highest row is deleted.
//! Every completed operation is durable across process restarts.

use std::path::Path;

use rusqlite::{params, Connection};
use serde_json::Value;

use crate::error::{Error, Result};
use crate::record::QueueRecord;

/// Database filename within the daemon state directory.
pub const DB_NAME: &str = "ranger_sync.db";

/// SQL schema for the sync queue database.
pub const SCHEMA: &str = r#"
-- Pending actions, drained in id order by the sync worker
CREATE TABLE IF NOT EXISTS queue_v1 (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    payload TEXT NOT NULL,
    queued_at INTEGER NOT NULL
);
"#;

/// Durable queue store.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open (or create) the store at the given path.
    ///
    /// Safe to call repeatedly; the schema is applied idempotently.
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open(path)?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    /// Open an in-memory store. Used by tests that don't need durability.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        conn.execute_batch(SCHEMA)?;
        Ok(Store { conn })
    }

    /// Insert a record, returning the assigned id.
    pub fn insert(&self, payload: &Value, queued_at: i64) -> Result<i64> {
        let payload_text = serde_json::to_string(payload)?;
        self.conn.execute(
            "INSERT INTO queue_v1 (payload, queued_at) VALUES (?1, ?2)",
            params![payload_text, queued_at],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// List all records in ascending id order.
    pub fn list_all(&self) -> Result<Vec<QueueRecord>> {
        let mut stmt = self
            .conn
            .prepare("SELECT id, payload, queued_at FROM queue_v1 ORDER BY id ASC")?;

        let rows = stmt.query_map([], |row| {
            let id: i64 = row.get(0)?;
            let payload_text: String = row.get(1)?;
            let queued_at: i64 = row.get(2)?;
            let payload = parse_payload(&payload_text)?;
            Ok(QueueRecord {
                id,
                payload,
                queued_at,
            })
        })?;

        let mut records = Vec::new();
        for row in rows {
            records.push(row?);
        }
        Ok(records)
    }

    /// Delete the record with the given id.
    ///
    /// Removing an id that is not present is a no-op, not an error.
    pub fn remove_by_id(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM queue_v1 WHERE id = ?1", params![id])?;
        Ok(())
    }

    /// Number of records currently queued.
    pub fn count(&self) -> Result<usize> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM queue_v1", [], |row| row.get(0))?;
        Ok(count as usize)
    }
}

/// Parse a stored payload column, reporting corruption as a rusqlite error.
fn parse_payload(text: &str) -> std::result::Result<Value, rusqlite::Error> {
    serde_json::from_str(text).map_err(|_| {
        rusqlite::Error::FromSqlConversionFailure(
            1,
            rusqlite::types::Type::Text,
            Box::new(Error::CorruptedData(format!(
                "invalid payload JSON in column 'payload': '{text}'"
            ))),
        )
    })
}

#[cfg(test)]
#[path = "store_tests.rs"]
mod tests;
