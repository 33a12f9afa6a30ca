// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Core data model: feeds, zones, live counts and thresholds.

pub mod feed;
pub mod thresholds;
pub mod zone;
