// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Alert threshold configuration.
//!
//! Two process-wide limits, loaded once at startup from eframe's
//! persistent storage and written back when the settings form is saved.

use serde::{Deserialize, Serialize};

/// Storage key for the whole-frame occupancy limit.
pub const TOTAL_THRESHOLD_KEY: &str = "total_threshold";
/// Storage key for the per-zone occupancy limit.
pub const ZONE_THRESHOLD_KEY: &str = "zone_threshold";

/// Occupancy limits past which alerts are raised.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Thresholds {
    pub total: u32,
    pub per_zone: u32,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            total: 10,
            per_zone: 6,
        }
    }
}

impl Thresholds {
    /// Load saved thresholds, falling back to defaults for missing keys.
    pub fn load(storage: Option<&dyn eframe::Storage>) -> Self {
        let defaults = Self::default();
        let Some(storage) = storage else {
            return defaults;
        };
        Self {
            total: eframe::get_value(storage, TOTAL_THRESHOLD_KEY).unwrap_or(defaults.total),
            per_zone: eframe::get_value(storage, ZONE_THRESHOLD_KEY).unwrap_or(defaults.per_zone),
        }
    }

    /// Persist both thresholds under their fixed keys.
    pub fn save(&self, storage: &mut dyn eframe::Storage) {
        eframe::set_value(storage, TOTAL_THRESHOLD_KEY, &self.total);
        eframe::set_value(storage, ZONE_THRESHOLD_KEY, &self.per_zone);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let t = Thresholds::default();
        assert_eq!(t.total, 10);
        assert_eq!(t.per_zone, 6);
    }

    #[test]
    fn test_load_without_storage_uses_defaults() {
        assert_eq!(Thresholds::load(None), Thresholds::default());
    }
}
