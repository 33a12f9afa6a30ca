// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Bounded time-series history backing the charts.
//!
//! A fixed-size sliding window over the most recent samples: oldest
//! evicted first. Rebuilt fresh each time a polling session starts.

use std::collections::BTreeMap;

/// Number of samples retained per series.
pub const HISTORY_CAPACITY: usize = 20;

#[derive(Debug, Clone, Default)]
pub struct TimeSeriesHistory {
    timestamps: Vec<String>,
    totals: Vec<u32>,
    per_zone: BTreeMap<String, Vec<u32>>,
}

impl TimeSeriesHistory {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn clear(&mut self) {
        self.timestamps.clear();
        self.totals.clear();
        self.per_zone.clear();
    }

    pub fn len(&self) -> usize {
        self.timestamps.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timestamps.is_empty()
    }

    pub fn timestamps(&self) -> &[String] {
        &self.timestamps
    }

    pub fn totals(&self) -> &[u32] {
        &self.totals
    }

    pub fn per_zone(&self) -> &BTreeMap<String, Vec<u32>> {
        &self.per_zone
    }

    /// Append one sample, evicting the oldest entry of any series that
    /// grows past [`HISTORY_CAPACITY`]. A zone that first appears
    /// mid-session starts its own shorter series.
    pub fn push(&mut self, timestamp: String, total: u32, zones: &BTreeMap<String, u32>) {
        self.timestamps.push(timestamp);
        self.totals.push(total);
        if self.timestamps.len() > HISTORY_CAPACITY {
            self.timestamps.remove(0);
            self.totals.remove(0);
        }

        for (zone, count) in zones {
            let series = self.per_zone.entry(zone.clone()).or_default();
            series.push(*count);
            if series.len() > HISTORY_CAPACITY {
                series.remove(0);
            }
        }
    }
}
