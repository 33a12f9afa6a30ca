// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Backend HTTP API: typed client, error taxonomy and stream reader.

pub mod client;
pub mod error;
pub mod stream;
