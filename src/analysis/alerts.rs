// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Occupancy alert evaluation.
//!
//! A pure function over the latest counts; alerts are recomputed from
//! scratch every tick and fully replace the previous rendering. No
//! de-duplication or hysteresis.

use crate::models::thresholds::Thresholds;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertLevel {
    Warning,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlertMessage {
    pub level: AlertLevel,
    pub text: String,
}

/// Emit one high-occupancy message when the frame total exceeds its
/// threshold, plus one message per zone whose count exceeds the per-zone
/// threshold, in map iteration order.
pub fn evaluate(
    total: u32,
    zone_counts: &BTreeMap<String, u32>,
    thresholds: &Thresholds,
) -> Vec<AlertMessage> {
    let mut alerts = Vec::new();

    if total > thresholds.total {
        alerts.push(AlertMessage {
            level: AlertLevel::Warning,
            text: "High occupancy detected in frame!".to_string(),
        });
    }

    for (zone, count) in zone_counts {
        if *count > thresholds.per_zone {
            alerts.push(AlertMessage {
                level: AlertLevel::Danger,
                text: format!("Zone {zone} exceeded threshold!"),
            });
        }
    }

    alerts
}
