// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Live analysis: polling loop, alert evaluation and chart history.

pub mod alerts;
pub mod history;
pub mod poller;
