// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! End-to-end test: simulated sync over a real Unix socket.
//!
//! Drives the public daemon entry point the way a host application would:
//! attach, enqueue actions, and watch the notifications come back.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use std::path::Path;
use std::time::Duration;

use serde_json::json;
use tokio::net::UnixStream;

use rangerd::ipc::{framing_async, DeliveryMode, HostMessage, WorkerMessage};
use rangerd::lifecycle::get_socket_path;
use rangerd::WorkerConfig;

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
    tokio::time::timeout(Duration::from_secs(10), framing_async::read_message(stream))
        .await
        .expect("timed out waiting for notification")
        .expect("failed to read notification")
}

#[tokio::test]
async fn queued_actions_sync_in_order_and_empty_the_store() {
    let dir = tempfile::tempdir().unwrap();
    let state_dir = dir.path().to_path_buf();

    let config = WorkerConfig {
        heartbeat_interval: Duration::from_secs(60),
        simulated_delay: Duration::from_millis(10),
        ..WorkerConfig::default()
    };

    let daemon = {
        let state_dir = state_dir.clone();
        tokio::spawn(async move {
            let _ = rangerd::run(&state_dir, config).await;
        })
    };

    let mut host = connect(&state_dir).await;
    assert_eq!(read_event(&mut host).await, WorkerMessage::Ready);

    let payloads = [json!({"n": "a"}), json!({"n": "b"}), json!({"n": "c"})];
    for payload in &payloads {
        framing_async::write_message(
            &mut host,
            &HostMessage::Enqueue {
                payload: payload.clone(),
            },
        )
        .await
        .unwrap();
    }

    // Each action is acknowledged, then synced; collect until all three
    // simulated deliveries have been reported.
    let mut enqueued_ids = Vec::new();
    let mut synced = Vec::new();
    while synced.len() < payloads.len() {
        match read_event(&mut host).await {
            WorkerMessage::Enqueued { id, .. } => enqueued_ids.push(id),
            WorkerMessage::Synced { id, payload, mode } => {
                assert_eq!(mode, DeliveryMode::Simulation);
                synced.push((id, payload));
            }
            other => unreachable!("unexpected notification: {:?}", other),
        }
    }

    // Sync order matches enqueue order, payloads intact.
    assert_eq!(enqueued_ids.len(), payloads.len());
    for ((synced_id, synced_payload), (enqueued_id, payload)) in
        synced.iter().zip(enqueued_ids.iter().zip(payloads.iter()))
    {
        assert_eq!(synced_id, enqueued_id);
        assert_eq!(synced_payload, payload);
    }

    daemon.abort();

    // Every delivered action was removed from the durable store.
    let store = rg_core::Store::open(&state_dir.join(rg_core::store::DB_NAME)).unwrap();
    assert_eq!(store.count().unwrap(), 0);
}
