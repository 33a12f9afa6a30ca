// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Interactive rectangle-drawing state machine.
//!
//! The UI layer reduces pointer events to named commands (`arm`,
//! `pointer_down`, `pointer_move`, `pointer_up`, `cancel`); all gesture
//! state lives here so the machine can be tested without a UI.
//!
//! States: `Idle` (drawing disabled), `Armed` (enabled, no gesture in
//! progress), `Dragging` (pointer down, tracking a rectangle). Editing
//! an existing zone re-uses the same gesture states; the slot being
//! replaced is tracked by the zone store's editing pointer.

use crate::api::error::ApiError;
use crate::models::zone::{Point, RectCoords, Zone};
use crate::zones::store::ZoneStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EditorState {
    Idle,
    Armed,
    Dragging,
}

pub struct ZoneEditor {
    state: EditorState,
    drag_start: Option<Point>,
    drag_end: Option<Point>,
}

impl Default for ZoneEditor {
    fn default() -> Self {
        Self::new()
    }
}

impl ZoneEditor {
    pub fn new() -> Self {
        Self {
            state: EditorState::Idle,
            drag_start: None,
            drag_end: None,
        }
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Whether the drawable surface should capture pointer input.
    pub fn is_armed(&self) -> bool {
        matches!(self.state, EditorState::Armed | EditorState::Dragging)
    }

    /// Enable drawing. No-op while a gesture is already in progress.
    pub fn arm(&mut self) {
        if self.state == EditorState::Idle {
            self.state = EditorState::Armed;
            self.drag_start = None;
            self.drag_end = None;
        }
    }

    /// Discard any in-progress geometry and disable drawing.
    pub fn cancel(&mut self) {
        self.state = EditorState::Idle;
        self.drag_start = None;
        self.drag_end = None;
    }

    /// Record one rectangle corner and start tracking the opposite one.
    pub fn pointer_down(&mut self, pos: Point) {
        if self.state == EditorState::Armed {
            self.drag_start = Some(pos);
            self.drag_end = None;
            self.state = EditorState::Dragging;
        }
    }

    /// Recompute the opposite corner; the temporary rectangle is
    /// repainted on every move, not buffered.
    pub fn pointer_move(&mut self, pos: Point) {
        if self.state == EditorState::Dragging {
            self.drag_end = Some(pos);
        }
    }

    /// The unsaved rectangle to paint while dragging.
    pub fn preview_rect(&self) -> Option<RectCoords> {
        match (self.drag_start, self.drag_end) {
            (Some(a), Some(b)) => Some(RectCoords::from_corners(a, b)),
            _ => None,
        }
    }

    /// Finish the gesture. The label is validated now, at commit time:
    /// with an empty label the geometry is discarded and an error
    /// returned. Otherwise the normalized rectangle either replaces the
    /// zone being edited (same slot, id kept) or is upserted by label.
    pub fn pointer_up(&mut self, label: &str, store: &mut ZoneStore) -> Result<(), ApiError> {
        if self.state != EditorState::Dragging {
            return Ok(());
        }
        let (Some(start), Some(end)) = (self.drag_start, self.drag_end) else {
            // Click without movement: keep waiting for a real drag.
            self.state = EditorState::Armed;
            self.drag_start = None;
            return Ok(());
        };

        self.state = EditorState::Armed;
        self.drag_start = None;
        self.drag_end = None;

        let label = label.trim();
        if label.is_empty() {
            return Err(ApiError::Validation(
                "Please enter a zone label before drawing.".to_string(),
            ));
        }

        let rect = RectCoords::from_corners(start, end);
        match store.editing() {
            Some(slot) => store.update_slot(slot, label.to_string(), rect),
            None => {
                // A label collision on a fresh draw silently overwrites
                // the same-labelled zone.
                store.upsert_local(Zone::new(label.to_string(), rect));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn p(x: f32, y: f32) -> Point {
        Point::new(x, y)
    }

    #[test]
    fn test_arm_and_cancel_transitions() {
        let mut editor = ZoneEditor::new();
        assert_eq!(editor.state(), EditorState::Idle);

        editor.arm();
        assert_eq!(editor.state(), EditorState::Armed);

        editor.pointer_down(p(5.0, 5.0));
        assert_eq!(editor.state(), EditorState::Dragging);

        editor.cancel();
        assert_eq!(editor.state(), EditorState::Idle);
        assert!(editor.preview_rect().is_none());
    }

    #[test]
    fn test_pointer_events_ignored_when_idle() {
        let mut editor = ZoneEditor::new();
        let mut store = ZoneStore::new();

        editor.pointer_down(p(5.0, 5.0));
        editor.pointer_move(p(50.0, 50.0));
        assert_eq!(editor.state(), EditorState::Idle);
        editor.pointer_up("a", &mut store).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn test_commit_creates_normalized_zone() {
        let mut editor = ZoneEditor::new();
        let mut store = ZoneStore::new();

        editor.arm();
        // Drag from bottom-right to top-left.
        editor.pointer_down(p(100.0, 80.0));
        editor.pointer_move(p(20.0, 10.0));
        editor.pointer_up("entrance", &mut store).unwrap();

        assert_eq!(store.len(), 1);
        let zone = &store.zones()[0];
        assert_eq!(zone.label, "entrance");
        assert_eq!(zone.coordinates.topleft, p(20.0, 10.0));
        assert_eq!(zone.coordinates.bottomright, p(100.0, 80.0));
        assert!(zone.id.is_none());

        // Back to armed, ready for the next gesture.
        assert_eq!(editor.state(), EditorState::Armed);
    }

    #[test]
    fn test_empty_label_discards_gesture() {
        let mut editor = ZoneEditor::new();
        let mut store = ZoneStore::new();

        editor.arm();
        editor.pointer_down(p(0.0, 0.0));
        editor.pointer_move(p(10.0, 10.0));

        let err = editor.pointer_up("  ", &mut store).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
        assert!(store.is_empty());
        assert!(editor.preview_rect().is_none());
    }

    #[test]
    fn test_click_without_drag_keeps_armed() {
        let mut editor = ZoneEditor::new();
        let mut store = ZoneStore::new();

        editor.arm();
        editor.pointer_down(p(5.0, 5.0));
        editor.pointer_up("a", &mut store).unwrap();

        assert!(store.is_empty());
        assert_eq!(editor.state(), EditorState::Armed);
    }

    #[test]
    fn test_commit_into_editing_slot_keeps_id() {
        let mut editor = ZoneEditor::new();
        let mut store = ZoneStore::new();
        store.upsert_local(Zone {
            id: Some(7),
            label: "old".to_string(),
            coordinates: RectCoords::from_corners(p(0.0, 0.0), p(5.0, 5.0)),
        });
        store.upsert_local(Zone::new(
            "other".to_string(),
            RectCoords::from_corners(p(50.0, 0.0), p(60.0, 5.0)),
        ));

        // Mark slot 0 as being edited via a backend echoing it back.
        struct Echo(Zone);
        impl crate::api::client::ZoneBackend for Echo {
            fn fetch_zones(&self, _: i64) -> Result<Vec<Zone>, ApiError> {
                Ok(vec![self.0.clone()])
            }
            fn save_zones(&self, _: i64, _: &[Zone]) -> Result<(), ApiError> {
                Ok(())
            }
            fn delete_zone(&self, _: i64, _: i64) -> Result<(), ApiError> {
                Ok(())
            }
        }
        let echo = Echo(store.zones()[0].clone());
        store.refresh_for_edit(&echo, 1, 0).unwrap();

        editor.arm();
        editor.pointer_down(p(10.0, 10.0));
        editor.pointer_move(p(40.0, 30.0));
        editor.pointer_up("renamed", &mut store).unwrap();

        // Same slot replaced, id preserved, neighbor untouched.
        assert_eq!(store.len(), 2);
        assert_eq!(store.zones()[0].id, Some(7));
        assert_eq!(store.zones()[0].label, "renamed");
        assert_eq!(store.zones()[0].coordinates.topleft, p(10.0, 10.0));
        assert_eq!(store.zones()[1].label, "other");
    }
}
