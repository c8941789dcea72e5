// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! rangerd - The Ranger sync daemon.
//!
//! Maintains a durable queue of pending actions at `~/.local/state/ranger/`
//! and synchronizes it against a configured sink. Listens on a Unix socket
//! for host IPC.
//!
//! Usage:
//!   rangerd --state-dir <path>

use std::fs;
use std::path::{Path, PathBuf};

use rangerd::{env, runner, WorkerConfig};

fn main() {
    // Parse args
    let args: Vec<String> = std::env::args().collect();
    let state_dir = parse_state_dir(&args);

    // The state directory must exist before the log file can open in it
    if let Err(e) = fs::create_dir_all(&state_dir) {
        eprintln!("failed to create state dir {}: {}", state_dir.display(), e);
        std::process::exit(1);
    }

    let log_path = state_dir.join("daemon.log");
    setup_logging(&log_path);

    tracing::info!("rangerd starting, state_dir={}", state_dir.display());

    let rt = match tokio::runtime::Runtime::new() {
        Ok(rt) => rt,
        Err(e) => {
            tracing::error!("failed to create runtime: {}", e);
            std::process::exit(1);
        }
    };

    if let Err(e) = rt.block_on(runner::run(&state_dir, WorkerConfig::default())) {
        tracing::error!("daemon exited with error: {}", e);
        std::process::exit(1);
    }
}

fn parse_state_dir(args: &[String]) -> PathBuf {
    for i in 0..args.len() {
        if args[i] == "--state-dir" {
            if let Some(dir) = args.get(i + 1) {
                return PathBuf::from(dir);
            }
        }
    }
    // Default to XDG state directory
    if let Some(dir) = env::state_dir() {
        return dir;
    }
    if let Some(dir) = env::xdg_state_home() {
        return dir.join("ranger");
    }
    dirs::home_dir()
        .map(|h| h.join(".local/state/ranger"))
        .unwrap_or_else(|| PathBuf::from(".local/state/ranger"))
}

fn setup_logging(log_path: &Path) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    // Try to open log file, fall back to stderr
    if let Ok(file) = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
    {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(file)
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }
}
