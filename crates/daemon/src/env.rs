// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Environment variable lookups for the daemon.

use std::path::PathBuf;

/// Generated constants for environment variable names.
pub mod names {
    include!(concat!(env!("OUT_DIR"), "/env_names.rs"));
}

/// Explicit state directory override, if set.
pub fn state_dir() -> Option<PathBuf> {
    std::env::var(names::RANGER_STATE_DIR)
        .ok()
        .map(PathBuf::from)
}

/// XDG state base directory, if set.
pub fn xdg_state_home() -> Option<PathBuf> {
    std::env::var(names::XDG_STATE_HOME).ok().map(PathBuf::from)
}

#[cfg(test)]
#[path = "env_tests.rs"]
mod tests;
