// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared IPC protocol for host-daemon communication.
//!
//! This crate defines the message types and framing protocol used between
//! host applications and the `rangerd` daemon. Messages are serialized as
//! JSON with length-prefixed framing.
//!
//! The wire casing is fixed by the host protocol: inbound tags are
//! camelCase (`forceSync`), outbound tags are snake_case (`sync_failed`),
//! and field names are camelCase (`syncUrl`).

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Operating mode of the sync worker.
///
/// The worker runs in simulation mode until a sink address is configured.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Mode {
    /// A sink address is configured; deliveries go over the network.
    Production,
    /// No sink address; deliveries are simulated and always succeed.
    Simulation,
}

impl Mode {
    /// Returns the string representation used in status messages.
    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Production => "PRODUCTION",
            Mode::Simulation => "SIMULATION",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Delivery mode tag attached to `synced` notifications.
///
/// Same concept as [`Mode`] but lowercased on the wire, as the host
/// protocol requires for per-item notifications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DeliveryMode {
    /// Item was delivered to the configured sink.
    Production,
    /// Item completed a simulated delivery.
    Simulation,
}

impl DeliveryMode {
    /// Returns the string representation used in synced notifications.
    pub fn as_str(&self) -> &'static str {
        match self {
            DeliveryMode::Production => "production",
            DeliveryMode::Simulation => "simulation",
        }
    }
}

impl fmt::Display for DeliveryMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl From<Mode> for DeliveryMode {
    fn from(mode: Mode) -> Self {
        match mode {
            Mode::Production => DeliveryMode::Production,
            Mode::Simulation => DeliveryMode::Simulation,
        }
    }
}

impl From<DeliveryMode> for Mode {
    fn from(mode: DeliveryMode) -> Self {
        match mode {
            DeliveryMode::Production => Mode::Production,
            DeliveryMode::Simulation => Mode::Simulation,
        }
    }
}

/// Message sent from a host to the daemon.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum HostMessage {
    /// Set (or clear) the sink address. Absent `syncUrl` selects
    /// simulation mode. The daemon answers with a `status` notification.
    Config {
        #[serde(
            rename = "syncUrl",
            default,
            skip_serializing_if = "Option::is_none"
        )]
        sync_url: Option<String>,
    },
    /// Persist a new action and attempt an opportunistic drain.
    Enqueue { payload: Value },
    /// Trigger a drain pass without enqueuing anything.
    ForceSync,
}

/// Notification sent from the daemon to attached hosts.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WorkerMessage {
    /// The daemon is up and the channel is live.
    Ready,
    /// Reply to a `config` message, reporting the active mode.
    Status { status: String, mode: Mode },
    /// An action was persisted to the queue.
    Enqueued { id: i64, payload: Value },
    /// An action was delivered (or its delivery simulated) and removed.
    Synced {
        id: i64,
        payload: Value,
        mode: DeliveryMode,
    },
    /// The sink rejected an action; it stays queued and will be retried.
    SyncFailed { id: i64, status: u16 },
    /// The queue store failed while persisting an action.
    Error { error: String },
}

impl WorkerMessage {
    /// Build a `status` notification for the given mode.
    pub fn online_status(mode: Mode) -> Self {
        WorkerMessage::Status {
            status: "online".to_string(),
            mode,
        }
    }
}

/// IPC message framing.
///
/// Messages are framed as:
/// - 4 bytes: message length (big-endian u32)
/// - N bytes: JSON-encoded message
pub mod framing {
    use std::io::{Read, Write};

    use serde::de::DeserializeOwned;
    use serde::Serialize;

    /// Maximum message size (1MB) to prevent malformed messages from causing hangs.
    pub const MAX_MESSAGE_SIZE: usize = 1024 * 1024;

    /// Write a serializable message to the given writer.
    pub fn write_message<W: Write, T: Serialize>(
        writer: &mut W,
        message: &T,
    ) -> std::io::Result<()> {
        let json = serde_json::to_vec(message)
            .map_err(|e| std::io::Error::other(format!("serialize error: {}", e)))?;
        let len =
            u32::try_from(json.len()).map_err(|_| std::io::Error::other("message too large"))?;
        writer.write_all(&len.to_be_bytes())?;
        writer.write_all(&json)?;
        writer.flush()?;
        Ok(())
    }

    /// Read a deserializable message from the given reader.
    pub fn read_message<R: Read, T: DeserializeOwned>(reader: &mut R) -> std::io::Result<T> {
        let mut len_buf = [0u8; 4];
        reader.read_exact(&mut len_buf)?;
        let len = u32::from_be_bytes(len_buf) as usize;

        if len > MAX_MESSAGE_SIZE {
            return Err(std::io::Error::other(format!(
                "message too large: {} bytes (max {})",
                len, MAX_MESSAGE_SIZE
            )));
        }

        let mut buf = vec![0u8; len];
        reader.read_exact(&mut buf)?;

        serde_json::from_slice(&buf)
            .map_err(|e| std::io::Error::other(format!("deserialize error: {}", e)))
    }
}

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;
