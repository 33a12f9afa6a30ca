// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone editing: the store reconciling local edits with the server, and
//! the drawing state machine that produces zone geometry.

pub mod editor;
pub mod store;
