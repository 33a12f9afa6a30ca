// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! UI components for the CrowdSight application.

pub mod canvas;
pub mod charts;
pub mod sidebar;
pub mod toasts;
