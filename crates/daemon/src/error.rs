// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Error types for the rangerd daemon.

use thiserror::Error;

/// All possible errors that can occur in the daemon.
#[derive(Debug, Error)]
pub enum Error {
    #[error("{0}")]
    Core(#[from] rg_core::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("http client error: {0}")]
    HttpClient(String),
}

/// A specialized Result type for daemon operations.
pub type Result<T> = std::result::Result<T, Error>;
