// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Daemon runner: main event loop and trigger surface.
//!
//! The daemon:
//! 1. Acquires flock for single instance
//! 2. Creates Unix socket for host IPC
//! 3. Opens the durable queue store
//! 4. Runs one worker on a single logical thread of control
//!
//! Drain passes are triggered by new enqueues, explicit `forceSync`
//! requests, and a fixed-interval heartbeat; all three collapse into the
//! worker's single-flight `drain()`.

use std::fs;
use std::io::Write;
use std::path::Path;

use tokio::net::unix::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::UnixListener;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio::time::MissedTickBehavior;

use rg_core::store::DB_NAME;
use rg_core::{QueueGateway, Store};

use crate::error::Result;
use crate::ipc::{framing_async, HostMessage, WorkerMessage};
use crate::lifecycle::{acquire_lock, get_lock_path, get_pid_path, get_socket_path};
use crate::sink::{HttpSink, Sink};
use crate::worker::{SyncWorker, WorkerConfig};

/// Run the daemon for the given state directory.
///
/// Blocks until an interrupt or termination signal arrives.
pub async fn run(state_dir: &Path, config: WorkerConfig) -> Result<()> {
    let sink = HttpSink::new(config.request_timeout)
        .map_err(|e| crate::error::Error::HttpClient(e.to_string()))?;
    run_with_sink(state_dir, config, sink).await
}

/// Run the daemon with a caller-supplied sink.
///
/// Split out from [`run`] so tests can inject a scripted sink.
pub async fn run_with_sink<S: Sink>(state_dir: &Path, config: WorkerConfig, sink: S) -> Result<()> {
    fs::create_dir_all(state_dir)?;

    let lock_file = acquire_lock(&get_lock_path(state_dir))?;

    let pid_path = get_pid_path(state_dir);
    fs::write(&pid_path, std::process::id().to_string())?;

    // Clean up any stale socket
    let socket_path = get_socket_path(state_dir);
    let _ = fs::remove_file(&socket_path);
    let listener = UnixListener::bind(&socket_path)?;

    // Signal readiness to supervising processes
    println!("READY");
    let _ = std::io::stdout().flush();

    let store = Store::open(&state_dir.join(DB_NAME))?;
    let queue = QueueGateway::new(store);

    match queue.pending_count() {
        Ok(n) if n > 0 => tracing::info!("{} item(s) pending from a previous run", n),
        Ok(_) => {}
        Err(e) => tracing::warn!("could not read queue depth: {}", e),
    }

    // Notifications flow worker -> broadcaster -> every attached host, so
    // a slow host never blocks a drain pass.
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let (host_tx, host_rx) = mpsc::unbounded_channel();
    spawn_broadcaster(event_rx, host_rx);

    let mut worker = SyncWorker::new(queue, sink, &config, event_tx);

    let (request_tx, mut request_rx) = mpsc::channel::<HostMessage>(64);

    let mut heartbeat = tokio::time::interval(config.heartbeat_interval);
    heartbeat.set_missed_tick_behavior(MissedTickBehavior::Delay);

    let mut sigterm = signal(SignalKind::terminate())?;

    tracing::info!("rangerd listening on {}", socket_path.display());

    loop {
        tokio::select! {
            result = listener.accept() => {
                match result {
                    Ok((stream, _)) => {
                        let (read_half, write_half) = stream.into_split();
                        spawn_host_reader(read_half, request_tx.clone());
                        if host_tx.send(write_half).is_err() {
                            tracing::error!("broadcaster task is gone, shutting down");
                            break;
                        }
                    }
                    Err(e) => tracing::warn!("failed to accept connection: {}", e),
                }
            }

            Some(request) = request_rx.recv() => {
                handle_request(&mut worker, request).await;
            }

            // First tick fires immediately, draining anything left over
            // from a previous run without waiting a full interval.
            _ = heartbeat.tick() => {
                worker.drain().await;
            }

            _ = tokio::signal::ctrl_c() => {
                tracing::info!("interrupt received, shutting down");
                break;
            }

            _ = sigterm.recv() => {
                tracing::info!("termination requested, shutting down");
                break;
            }
        }
    }

    // Cleanup
    let _ = fs::remove_file(&socket_path);
    let _ = fs::remove_file(&pid_path);
    drop(lock_file);
    tracing::info!("rangerd stopped");

    Ok(())
}

/// Handle one inbound host message.
async fn handle_request<S: Sink>(worker: &mut SyncWorker<S>, request: HostMessage) {
    match request {
        HostMessage::Config { sync_url } => {
            let mode = worker.configure(sync_url);
            worker.emit(WorkerMessage::online_status(mode));
        }
        HostMessage::Enqueue { payload } => match worker.enqueue(payload.clone()) {
            Ok(id) => {
                worker.emit(WorkerMessage::Enqueued { id, payload });
                // Opportunistic drain right after persisting.
                worker.drain().await;
            }
            Err(e) => {
                tracing::error!("enqueue failed: {}", e);
                worker.emit(WorkerMessage::Error {
                    error: e.to_string(),
                });
            }
        },
        HostMessage::ForceSync => {
            worker.drain().await;
        }
    }
}

/// Read host messages off one connection into the shared request channel.
fn spawn_host_reader(mut stream: OwnedReadHalf, requests: mpsc::Sender<HostMessage>) {
    tokio::spawn(async move {
        loop {
            match framing_async::read_message::<_, HostMessage>(&mut stream).await {
                Ok(message) => {
                    if requests.send(message).await.is_err() {
                        break;
                    }
                }
                Err(e) if e.kind() == std::io::ErrorKind::UnexpectedEof => break,
                Err(e) => {
                    tracing::warn!("failed to read host message: {}", e);
                    break;
                }
            }
        }
    });
}

/// Fan notifications out to every attached host.
///
/// New hosts are greeted with `ready`; a host whose socket errors is
/// dropped. Each event is written at most once per host.
fn spawn_broadcaster(
    mut events: mpsc::UnboundedReceiver<WorkerMessage>,
    mut hosts: mpsc::UnboundedReceiver<OwnedWriteHalf>,
) {
    tokio::spawn(async move {
        let mut attached: Vec<OwnedWriteHalf> = Vec::new();
        loop {
            tokio::select! {
                Some(mut host) = hosts.recv() => {
                    match framing_async::write_message(&mut host, &WorkerMessage::Ready).await {
                        Ok(()) => attached.push(host),
                        Err(e) => tracing::debug!("host detached before ready: {}", e),
                    }
                }
                Some(event) = events.recv() => {
                    let mut alive = Vec::with_capacity(attached.len());
                    for mut host in attached.drain(..) {
                        match framing_async::write_message(&mut host, &event).await {
                            Ok(()) => alive.push(host),
                            Err(e) => tracing::debug!("dropping detached host: {}", e),
                        }
                    }
                    attached = alive;
                }
                else => break,
            }
        }
    });
}

#[cfg(test)]
#[path = "runner_tests.rs"]
mod tests;
