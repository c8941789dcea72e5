// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for daemon tests.

#![allow(clippy::unwrap_used)]

use std::collections::VecDeque;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use rg_core::QueueRecord;

use crate::sink::{DeliveryStatus, Sink, SinkError, SinkResult};

/// Scripted sink for driving the worker without a network.
///
/// Outcomes are consumed in FIFO order, one per delivery attempt; once the
/// script is exhausted every further attempt is accepted. Clones share the
/// same script and delivery log.
#[derive(Clone)]
pub struct MockSink {
    outcomes: Arc<Mutex<VecDeque<SinkResult<DeliveryStatus>>>>,
    delivered: Arc<Mutex<Vec<QueueRecord>>>,
}

impl MockSink {
    pub fn new() -> Self {
        MockSink {
            outcomes: Arc::new(Mutex::new(VecDeque::new())),
            delivered: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Script the next delivery attempt to be accepted.
    pub fn push_accepted(&self) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(DeliveryStatus::Accepted));
    }

    /// Script the next delivery attempt to be rejected with `status`.
    pub fn push_rejected(&self, status: u16) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Ok(DeliveryStatus::Rejected { status }));
    }

    /// Script the next delivery attempt to fail at the transport level.
    pub fn push_unreachable(&self) {
        self.outcomes
            .lock()
            .unwrap()
            .push_back(Err(SinkError::Unreachable("mock offline".to_string())));
    }

    /// All records that reached the sink, in attempt order.
    pub fn delivered(&self) -> Vec<QueueRecord> {
        self.delivered.lock().unwrap().clone()
    }

    /// Number of delivery attempts seen so far.
    pub fn delivery_count(&self) -> usize {
        self.delivered.lock().unwrap().len()
    }
}

impl Sink for MockSink {
    fn deliver<'a>(
        &'a self,
        _url: &'a str,
        record: &'a QueueRecord,
    ) -> Pin<Box<dyn Future<Output = SinkResult<DeliveryStatus>> + Send + 'a>> {
        let outcomes = Arc::clone(&self.outcomes);
        let delivered = Arc::clone(&self.delivered);
        let record = record.clone();
        Box::pin(async move {
            delivered.lock().unwrap().push(record);
            outcomes
                .lock()
                .unwrap()
                .pop_front()
                .unwrap_or(Ok(DeliveryStatus::Accepted))
        })
    }
}
