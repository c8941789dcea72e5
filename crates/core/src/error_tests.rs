// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Tests for rg-core error types.

#![allow(clippy::unwrap_used)]

use super::*;

#[test]
fn storage_error_display() {
    let err = Error::Storage(rusqlite::Error::InvalidQuery);
    assert!(err.to_string().starts_with("storage error:"));
}

#[test]
fn io_error_conversion() {
    let io = std::io::Error::other("disk gone");
    let err: Error = io.into();
    assert!(matches!(err, Error::Io(_)));
    assert_eq!(err.to_string(), "io error: disk gone");
}

#[test]
fn json_error_conversion() {
    let json = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err: Error = json.into();
    assert!(matches!(err, Error::Json(_)));
}

#[test]
fn corrupted_data_display() {
    let err = Error::CorruptedData("bad payload in row 3".to_string());
    assert_eq!(err.to_string(), "corrupted data: bad payload in row 3");
}
