// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Thin operations layer over the durable store.
//!
//! The gateway stamps enqueue timestamps and preserves insertion order;
//! it carries no other business logic.

use chrono::Utc;
use serde_json::Value;

use crate::error::Result;
use crate::record::QueueRecord;
use crate::store::Store;

/// Gateway over the durable queue store.
pub struct QueueGateway {
    store: Store,
}

impl QueueGateway {
    /// Wrap an open store.
    pub fn new(store: Store) -> Self {
        QueueGateway { store }
    }

    /// Persist a new action, stamping the enqueue time.
    ///
    /// Returns the store-assigned id.
    pub fn enqueue(&self, payload: Value) -> Result<i64> {
        let queued_at = Utc::now().timestamp_millis();
        self.store.insert(&payload, queued_at)
    }

    /// All pending records in ascending id order.
    pub fn drain_candidates(&self) -> Result<Vec<QueueRecord>> {
        self.store.list_all()
    }

    /// Remove a record after the sink confirmed delivery.
    pub fn acknowledge(&self, id: i64) -> Result<()> {
        self.store.remove_by_id(id)
    }

    /// Number of records still waiting to sync.
    pub fn pending_count(&self) -> Result<usize> {
        self.store.count()
    }
}

#[cfg(test)]
#[path = "queue_tests.rs"]
mod tests;
