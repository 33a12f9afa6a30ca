// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone geometry and live count data structures.
//!
//! Zones are labeled axis-aligned rectangles in canvas pixel space,
//! stored with four named corner points to match the backend schema.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A 2D point in canvas pixel coordinates.
///
/// Serialized as a two-element array (`[x, y]`) on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f32; 2]", into = "[f32; 2]")]
pub struct Point {
    pub x: f32,
    pub y: f32,
}

impl Point {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

impl From<[f32; 2]> for Point {
    fn from(v: [f32; 2]) -> Self {
        Self { x: v[0], y: v[1] }
    }
}

impl From<Point> for [f32; 2] {
    fn from(p: Point) -> Self {
        [p.x, p.y]
    }
}

/// The four named corners of a zone rectangle.
///
/// Always normalized: `topleft.x <= topright.x` and
/// `topleft.y <= bottomleft.y`, regardless of drag direction.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct RectCoords {
    pub topleft: Point,
    pub topright: Point,
    pub bottomright: Point,
    pub bottomleft: Point,
}

impl RectCoords {
    /// Build normalized corner points from any two opposite drag corners.
    pub fn from_corners(a: Point, b: Point) -> Self {
        let left = a.x.min(b.x);
        let right = a.x.max(b.x);
        let top = a.y.min(b.y);
        let bottom = a.y.max(b.y);
        Self {
            topleft: Point::new(left, top),
            topright: Point::new(right, top),
            bottomright: Point::new(right, bottom),
            bottomleft: Point::new(left, bottom),
        }
    }

    pub fn width(&self) -> f32 {
        self.topright.x - self.topleft.x
    }

    pub fn height(&self) -> f32 {
        self.bottomleft.y - self.topleft.y
    }

    /// Center of the rectangle, used to anchor heatmap discs.
    pub fn center(&self) -> Point {
        Point::new(
            (self.topleft.x + self.bottomright.x) / 2.0,
            (self.topleft.y + self.bottomright.y) / 2.0,
        )
    }
}

/// A labeled region of interest tied to one feed.
///
/// `id` is assigned by the backend on save; a zone drawn locally but not
/// yet persisted has no id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<i64>,
    pub label: String,
    pub coordinates: RectCoords,
}

impl Zone {
    /// Create a new, not-yet-persisted zone.
    pub fn new(label: String, coordinates: RectCoords) -> Self {
        Self {
            id: None,
            label,
            coordinates,
        }
    }
}

/// The most recent occupancy counts reported by the backend.
///
/// Replaced wholesale on every poll tick, never merged.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct LiveCounts {
    #[serde(default)]
    pub total: u32,
    #[serde(default)]
    pub zones: BTreeMap<String, u32>,
}

impl LiveCounts {
    /// True once the backend has reported at least one person anywhere.
    pub fn has_activity(&self) -> bool {
        self.total > 0 || self.zones.values().any(|c| *c > 0)
    }
}

/// A single detection box reported by the backend, in its processing
/// resolution (640x360).
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Detection {
    pub bbox: [f32; 4],
    pub label: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rect_normalized_from_any_drag_direction() {
        let a = Point::new(100.0, 50.0);
        let b = Point::new(20.0, 200.0);

        // All four start/end corner pairings must produce the same rectangle.
        for (start, end) in [
            (a, b),
            (b, a),
            (Point::new(a.x, b.y), Point::new(b.x, a.y)),
            (Point::new(b.x, a.y), Point::new(a.x, b.y)),
        ] {
            let rect = RectCoords::from_corners(start, end);
            assert_eq!(rect.topleft, Point::new(20.0, 50.0));
            assert_eq!(rect.topright, Point::new(100.0, 50.0));
            assert_eq!(rect.bottomright, Point::new(100.0, 200.0));
            assert_eq!(rect.bottomleft, Point::new(20.0, 200.0));

            assert!(rect.topleft.x <= rect.topright.x);
            assert_eq!(rect.topright.x, rect.bottomright.x);
            assert_eq!(rect.topleft.y, rect.topright.y);
            assert!(rect.topright.y <= rect.bottomleft.y);
        }
    }

    #[test]
    fn test_rect_dimensions_and_center() {
        let rect = RectCoords::from_corners(Point::new(10.0, 10.0), Point::new(110.0, 60.0));
        assert_eq!(rect.width(), 100.0);
        assert_eq!(rect.height(), 50.0);
        assert_eq!(rect.center(), Point::new(60.0, 35.0));
    }

    #[test]
    fn test_zone_wire_format() {
        let zone = Zone::new(
            "entrance".to_string(),
            RectCoords::from_corners(Point::new(0.0, 0.0), Point::new(10.0, 20.0)),
        );
        let json = serde_json::to_value(&zone).unwrap();

        // Unsaved zones omit the id; corner points are [x, y] arrays.
        assert!(json.get("id").is_none());
        assert_eq!(json["coordinates"]["topleft"], serde_json::json!([0.0, 0.0]));
        assert_eq!(
            json["coordinates"]["bottomright"],
            serde_json::json!([10.0, 20.0])
        );

        let parsed: Zone = serde_json::from_value(json).unwrap();
        assert_eq!(parsed, zone);
    }

    #[test]
    fn test_live_counts_activity() {
        let mut counts = LiveCounts::default();
        assert!(!counts.has_activity());

        counts.zones.insert("hall".to_string(), 0);
        assert!(!counts.has_activity());

        counts.zones.insert("hall".to_string(), 2);
        assert!(counts.has_activity());

        let totals_only = LiveCounts {
            total: 1,
            zones: BTreeMap::new(),
        };
        assert!(totals_only.has_activity());
    }
}
