// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Sink abstraction for delivering queued records.
//!
//! Provides a trait-based delivery layer that enables:
//! - Real HTTP POST delivery for production
//! - Mock sinks for unit testing

use std::future::Future;
use std::pin::Pin;
use std::time::Duration;

use rg_core::QueueRecord;

/// Error type for sink operations.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    /// The sink did not respond (offline, DNS failure, timeout).
    #[error("sink unreachable: {0}")]
    Unreachable(String),

    /// The HTTP client could not be constructed.
    #[error("http client error: {0}")]
    Client(String),
}

/// Result type for sink operations.
pub type SinkResult<T> = Result<T, SinkError>;

/// Outcome of a delivery attempt that reached the sink.
///
/// A sink that cannot be reached at all is reported through [`SinkError`],
/// not through this type; the distinction drives the worker's halt
/// behavior (notify on rejection, stay silent on transport failure).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DeliveryStatus {
    /// The sink accepted the record (2xx).
    Accepted,
    /// The sink rejected the record (non-2xx status).
    Rejected { status: u16 },
}

/// Sink trait for record delivery.
///
/// This trait abstracts over the actual delivery mechanism, allowing
/// for easy testing with mock implementations.
pub trait Sink: Send {
    /// Attempt to deliver one record to the sink at `url`.
    fn deliver<'a>(
        &'a self,
        url: &'a str,
        record: &'a QueueRecord,
    ) -> Pin<Box<dyn Future<Output = SinkResult<DeliveryStatus>> + Send + 'a>>;
}

/// HTTP sink implementation using reqwest.
///
/// Records are POSTed as JSON (`{id, payload, queuedAt}`). Any 2xx status
/// counts as acceptance; every other status is a rejection.
pub struct HttpSink {
    client: reqwest::Client,
}

impl HttpSink {
    /// Create an HTTP sink with an explicit per-request timeout.
    ///
    /// A timed-out request surfaces as [`SinkError::Unreachable`], so the
    /// worker treats it like any other transport failure.
    pub fn new(timeout: Duration) -> SinkResult<Self> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SinkError::Client(e.to_string()))?;
        Ok(HttpSink { client })
    }
}

impl Sink for HttpSink {
    fn deliver<'a>(
        &'a self,
        url: &'a str,
        record: &'a QueueRecord,
    ) -> Pin<Box<dyn Future<Output = SinkResult<DeliveryStatus>> + Send + 'a>> {
        Box::pin(async move {
            let response = self
                .client
                .post(url)
                .json(record)
                .send()
                .await
                .map_err(|e| SinkError::Unreachable(e.to_string()))?;

            let status = response.status();
            if status.is_success() {
                Ok(DeliveryStatus::Accepted)
            } else {
                Ok(DeliveryStatus::Rejected {
                    status: status.as_u16(),
                })
            }
        })
    }
}

#[cfg(test)]
#[path = "sink_tests.rs"]
mod tests;
