// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Client-side error taxonomy.
//!
//! Every failure surfaced to the operator falls into one of these
//! categories; user-triggered actions report them through a single
//! toast notification and never crash the session.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ApiError {
    /// The request never completed (connection refused, timeout, ...).
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// The response arrived but was not in the expected structured format.
    #[error("unexpected response from server: {0}")]
    Decode(String),

    /// Invalid local input (empty label, duplicate name, missing file, ...).
    #[error("{0}")]
    Validation(String),

    /// The server reported a failure status for a targeted operation.
    #[error("{0}")]
    NotFound(String),

    /// The video device or stream is unavailable.
    #[error("{0}")]
    Device(String),
}
