// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The queued action record.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// A pending action waiting to be synchronized.
///
/// The payload is opaque caller-supplied JSON (a dose record, a symptom
/// entry) and is never inspected by the queue or the worker. On the wire
/// (IPC notifications and the sink POST body) the record serializes as
/// `{"id": .., "payload": .., "queuedAt": ..}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QueueRecord {
    /// Store-assigned identifier, ascending in insertion order, never reused.
    pub id: i64,
    /// Opaque action data.
    pub payload: Value,
    /// Milliseconds since epoch at enqueue time. Diagnostics only.
    pub queued_at: i64,
}

#[cfg(test)]
#[path = "record_tests.rs"]
mod tests;
