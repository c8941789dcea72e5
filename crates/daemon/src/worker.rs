// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! The sync worker: drains the queue against the configured sink.
//!
//! One worker instance exists per daemon process. It owns the queue
//! gateway, the sink, the configured sink address, and the single-flight
//! guard; trigger handlers call [`SyncWorker::drain`] and notifications
//! flow out through the event channel to the host bridge.

use std::time::Duration;

use serde_json::Value;
use tokio::sync::mpsc;

use rg_core::{QueueGateway, QueueRecord};

use crate::ipc::{DeliveryMode, Mode, WorkerMessage};
use crate::sink::{DeliveryStatus, Sink};

/// Interval between heartbeat-triggered drain passes.
pub const HEARTBEAT_INTERVAL_MS: u64 = 10_000;

/// Per-item latency window in simulated mode.
pub const SIMULATED_DELAY_MS: u64 = 800;

/// Default per-request sink timeout.
pub const DEFAULT_REQUEST_TIMEOUT_MS: u64 = 30_000;

/// Fixed tunables for the worker and its trigger surface.
///
/// None of these are settable through host messages; they are decided at
/// process start.
#[derive(Debug, Clone)]
pub struct WorkerConfig {
    /// Interval of the heartbeat retry timer.
    pub heartbeat_interval: Duration,
    /// Simulated-mode per-item delay.
    pub simulated_delay: Duration,
    /// Timeout applied to each sink request.
    pub request_timeout: Duration,
}

impl Default for WorkerConfig {
    fn default() -> Self {
        WorkerConfig {
            heartbeat_interval: Duration::from_millis(HEARTBEAT_INTERVAL_MS),
            simulated_delay: Duration::from_millis(SIMULATED_DELAY_MS),
            request_timeout: Duration::from_millis(DEFAULT_REQUEST_TIMEOUT_MS),
        }
    }
}

/// Single-flight queue drain worker.
pub struct SyncWorker<S: Sink> {
    /// Gateway over the durable queue store.
    queue: QueueGateway,
    /// Delivery mechanism for sink mode.
    sink: S,
    /// Configured sink address; absent selects simulated mode.
    sync_url: Option<String>,
    /// At most one drain pass runs at a time for the life of the process.
    is_syncing: bool,
    /// Simulated-mode per-item delay.
    simulated_delay: Duration,
    /// Outbound notifications toward attached hosts.
    events: mpsc::UnboundedSender<WorkerMessage>,
}

impl<S: Sink> SyncWorker<S> {
    /// Create a worker. No sink is configured initially (simulated mode).
    pub fn new(
        queue: QueueGateway,
        sink: S,
        config: &WorkerConfig,
        events: mpsc::UnboundedSender<WorkerMessage>,
    ) -> Self {
        SyncWorker {
            queue,
            sink,
            sync_url: None,
            is_syncing: false,
            simulated_delay: config.simulated_delay,
            events,
        }
    }

    /// The currently active mode.
    pub fn mode(&self) -> Mode {
        if self.sync_url.is_some() {
            Mode::Production
        } else {
            Mode::Simulation
        }
    }

    /// Set (or clear) the sink address, returning the resulting mode.
    pub fn configure(&mut self, sync_url: Option<String>) -> Mode {
        self.sync_url = sync_url;
        let mode = self.mode();
        tracing::info!("sink configured, mode={}", mode);
        mode
    }

    /// Persist a new action to the queue, returning its id.
    pub fn enqueue(&self, payload: Value) -> rg_core::Result<i64> {
        self.queue.enqueue(payload)
    }

    /// Number of actions still waiting to sync.
    pub fn pending_count(&self) -> rg_core::Result<usize> {
        self.queue.pending_count()
    }

    /// Send a notification toward attached hosts.
    ///
    /// Best-effort; a detached host bridge is not an error.
    pub fn emit(&self, message: WorkerMessage) {
        let _ = self.events.send(message);
    }

    /// Attempt to deliver every queued item, in id order.
    ///
    /// Returns immediately if a pass is already in flight; the next
    /// trigger re-attempts. The guard is released on every exit path, so
    /// a failed pass never wedges the worker.
    pub async fn drain(&mut self) {
        if self.is_syncing {
            tracing::debug!("drain already in progress, skipping trigger");
            return;
        }
        self.is_syncing = true;
        if let Err(e) = self.drain_pass().await {
            // Store faults on the drain path are logged and swallowed;
            // the queue is unchanged and the next trigger retries.
            tracing::warn!("drain pass aborted: {}", e);
        }
        self.is_syncing = false;
    }

    async fn drain_pass(&mut self) -> rg_core::Result<()> {
        let pending = self.queue.drain_candidates()?;
        if pending.is_empty() {
            return Ok(());
        }

        tracing::debug!(
            "draining {} pending item(s), mode={}",
            pending.len(),
            self.mode()
        );

        match self.sync_url.clone() {
            None => self.drain_simulated(pending).await,
            Some(url) => self.drain_to_sink(&url, pending).await,
        }
    }

    /// Simulated mode: every item succeeds after a fixed latency window.
    async fn drain_simulated(&mut self, pending: Vec<QueueRecord>) -> rg_core::Result<()> {
        for record in pending {
            tokio::time::sleep(self.simulated_delay).await;
            self.queue.acknowledge(record.id)?;
            self.emit(WorkerMessage::Synced {
                id: record.id,
                payload: record.payload,
                mode: DeliveryMode::Simulation,
            });
        }
        Ok(())
    }

    /// Sink mode: deliver in order, halting at the first failure.
    async fn drain_to_sink(&mut self, url: &str, pending: Vec<QueueRecord>) -> rg_core::Result<()> {
        for record in pending {
            match self.sink.deliver(url, &record).await {
                Ok(DeliveryStatus::Accepted) => {
                    self.queue.acknowledge(record.id)?;
                    self.emit(WorkerMessage::Synced {
                        id: record.id,
                        payload: record.payload,
                        mode: DeliveryMode::Production,
                    });
                }
                Ok(DeliveryStatus::Rejected { status }) => {
                    tracing::info!("sink rejected item {} with status {}", record.id, status);
                    self.emit(WorkerMessage::SyncFailed {
                        id: record.id,
                        status,
                    });
                    // A later item must not be delivered while an earlier
                    // one is unresolved.
                    break;
                }
                Err(e) => {
                    // Offline; the heartbeat will retry the whole tail.
                    tracing::debug!("sink unreachable, keeping queue intact: {}", e);
                    break;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
#[path = "worker_tests.rs"]
mod tests;
