// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for the daemon runner, driven over a real Unix socket.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde_json::json;
use tokio::net::UnixStream;
use tokio::task::JoinHandle;

use super::*;
use crate::ipc::{DeliveryMode, Mode};
use crate::test_helpers::MockSink;

const SINK_URL: &str = "https://x/sync";

fn test_config() -> WorkerConfig {
    WorkerConfig {
        heartbeat_interval: Duration::from_secs(60),
        simulated_delay: Duration::from_millis(5),
        ..WorkerConfig::default()
    }
}

fn spawn_daemon(state_dir: &Path, config: WorkerConfig, sink: MockSink) -> JoinHandle<()> {
    let dir: PathBuf = state_dir.to_path_buf();
    tokio::spawn(async move {
        let _ = run_with_sink(&dir, config, sink).await;
    })
}

async fn connect(state_dir: &Path) -> UnixStream {
    let socket_path = get_socket_path(state_dir);
    for _ in 0..500 {
        if let Ok(stream) = UnixStream::connect(&socket_path).await {
            return stream;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    UnixStream::connect(&socket_path)
        .await
        .expect("daemon did not come up")
}

async fn read_event(stream: &mut UnixStream) -> WorkerMessage {
    tokio::time::timeout(Duration::from_secs(5), framing_async::read_message(stream))
        .await
        .expect("timed out waiting for notification")
        .expect("failed to read notification")
}

async fn send(stream: &mut UnixStream, message: &HostMessage) {
    framing_async::write_message(stream, message)
        .await
        .expect("failed to send host message");
}

#[tokio::test]
async fn greets_each_host_with_ready() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = spawn_daemon(dir.path(), test_config(), MockSink::new());

    let mut first = connect(dir.path()).await;
    assert_eq!(read_event(&mut first).await, WorkerMessage::Ready);

    let mut second = connect(dir.path()).await;
    assert_eq!(read_event(&mut second).await, WorkerMessage::Ready);

    daemon.abort();
}

#[tokio::test]
async fn config_reports_active_mode() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = spawn_daemon(dir.path(), test_config(), MockSink::new());

    let mut host = connect(dir.path()).await;
    assert_eq!(read_event(&mut host).await, WorkerMessage::Ready);

    send(
        &mut host,
        &HostMessage::Config {
            sync_url: Some(SINK_URL.to_string()),
        },
    )
    .await;
    assert_eq!(
        read_event(&mut host).await,
        WorkerMessage::online_status(Mode::Production)
    );

    send(&mut host, &HostMessage::Config { sync_url: None }).await;
    assert_eq!(
        read_event(&mut host).await,
        WorkerMessage::online_status(Mode::Simulation)
    );

    daemon.abort();
}

#[tokio::test]
async fn enqueue_persists_then_syncs_in_simulation() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = spawn_daemon(dir.path(), test_config(), MockSink::new());

    let mut host = connect(dir.path()).await;
    assert_eq!(read_event(&mut host).await, WorkerMessage::Ready);

    let payload = json!({"kind": "dose", "medication": "aspirin"});
    send(
        &mut host,
        &HostMessage::Enqueue {
            payload: payload.clone(),
        },
    )
    .await;

    let enqueued = read_event(&mut host).await;
    let id = match &enqueued {
        WorkerMessage::Enqueued { id, payload: p } => {
            assert_eq!(p, &payload);
            *id
        }
        other => panic_event(other),
    };

    assert_eq!(
        read_event(&mut host).await,
        WorkerMessage::Synced {
            id,
            payload,
            mode: DeliveryMode::Simulation,
        }
    );

    daemon.abort();
}

#[tokio::test]
async fn force_sync_retries_after_transport_failure() {
    let sink = MockSink::new();
    sink.push_unreachable();

    let dir = tempfile::tempdir().unwrap();
    let daemon = spawn_daemon(dir.path(), test_config(), sink.clone());

    let mut host = connect(dir.path()).await;
    assert_eq!(read_event(&mut host).await, WorkerMessage::Ready);

    send(
        &mut host,
        &HostMessage::Config {
            sync_url: Some(SINK_URL.to_string()),
        },
    )
    .await;
    assert_eq!(
        read_event(&mut host).await,
        WorkerMessage::online_status(Mode::Production)
    );

    let payload = json!({"n": "a"});
    send(
        &mut host,
        &HostMessage::Enqueue {
            payload: payload.clone(),
        },
    )
    .await;

    // The opportunistic drain hits the offline sink; no failure
    // notification is expected, the item just stays queued.
    let enqueued = read_event(&mut host).await;
    let id = match &enqueued {
        WorkerMessage::Enqueued { id, .. } => *id,
        other => panic_event(other),
    };

    send(&mut host, &HostMessage::ForceSync).await;
    assert_eq!(
        read_event(&mut host).await,
        WorkerMessage::Synced {
            id,
            payload,
            mode: DeliveryMode::Production,
        }
    );

    daemon.abort();
}

#[tokio::test]
async fn heartbeat_retries_rejected_item() {
    let sink = MockSink::new();
    sink.push_rejected(500);

    let config = WorkerConfig {
        heartbeat_interval: Duration::from_millis(50),
        ..test_config()
    };

    let dir = tempfile::tempdir().unwrap();
    let daemon = spawn_daemon(dir.path(), config, sink);

    let mut host = connect(dir.path()).await;
    assert_eq!(read_event(&mut host).await, WorkerMessage::Ready);

    send(
        &mut host,
        &HostMessage::Config {
            sync_url: Some(SINK_URL.to_string()),
        },
    )
    .await;
    assert_eq!(
        read_event(&mut host).await,
        WorkerMessage::online_status(Mode::Production)
    );

    let payload = json!({"n": "a"});
    send(
        &mut host,
        &HostMessage::Enqueue {
            payload: payload.clone(),
        },
    )
    .await;

    let enqueued = read_event(&mut host).await;
    let id = match &enqueued {
        WorkerMessage::Enqueued { id, .. } => *id,
        other => panic_event(other),
    };

    // The opportunistic drain is rejected...
    assert_eq!(
        read_event(&mut host).await,
        WorkerMessage::SyncFailed { id, status: 500 }
    );

    // ...and the heartbeat retries without any host action.
    assert_eq!(
        read_event(&mut host).await,
        WorkerMessage::Synced {
            id,
            payload,
            mode: DeliveryMode::Production,
        }
    );

    daemon.abort();
}

#[tokio::test]
async fn notifications_reach_every_attached_host() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = spawn_daemon(dir.path(), test_config(), MockSink::new());

    let mut first = connect(dir.path()).await;
    assert_eq!(read_event(&mut first).await, WorkerMessage::Ready);
    let mut second = connect(dir.path()).await;
    assert_eq!(read_event(&mut second).await, WorkerMessage::Ready);

    let payload = json!({"n": "shared"});
    send(
        &mut first,
        &HostMessage::Enqueue {
            payload: payload.clone(),
        },
    )
    .await;

    for host in [&mut first, &mut second] {
        let enqueued = read_event(host).await;
        let id = match &enqueued {
            WorkerMessage::Enqueued { id, payload: p } => {
                assert_eq!(p, &payload);
                *id
            }
            other => panic_event(other),
        };
        assert_eq!(
            read_event(host).await,
            WorkerMessage::Synced {
                id,
                payload: payload.clone(),
                mode: DeliveryMode::Simulation,
            }
        );
    }

    daemon.abort();
}

#[tokio::test]
async fn second_daemon_in_same_state_dir_is_refused() {
    let dir = tempfile::tempdir().unwrap();
    let daemon = spawn_daemon(dir.path(), test_config(), MockSink::new());

    // Wait for the first instance to hold the lock.
    let host = connect(dir.path()).await;
    drop(host);

    let result = run_with_sink(dir.path(), test_config(), MockSink::new()).await;
    assert!(result.is_err());

    daemon.abort();
}

/// Fail a test with the unexpected notification it received.
fn panic_event(event: &WorkerMessage) -> ! {
    unreachable!("unexpected notification: {:?}", event)
}
