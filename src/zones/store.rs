// Copyright (c) 2025, Jason Jenkins
// SPDX-License-Identifier: BSD-3-Clause

//! Zone list ownership and server reconciliation.
//!
//! The store exclusively owns the in-memory zone list for the selected
//! feed. The local list is optimistic and mutable; the server is
//! authoritative on save. Label uniqueness is enforced by upsert
//! semantics: saving a zone whose label matches an existing one replaces
//! it in place, keeping its position stable (the zone dropdown is built
//! from list order).

use crate::api::client::ZoneBackend;
use crate::api::error::ApiError;
use crate::models::zone::{RectCoords, Zone};

#[derive(Default)]
pub struct ZoneStore {
    zones: Vec<Zone>,
    /// Index of the zone currently being re-drawn, if any.
    editing: Option<usize>,
}

impl ZoneStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }

    pub fn len(&self) -> usize {
        self.zones.len()
    }

    pub fn is_empty(&self) -> bool {
        self.zones.is_empty()
    }

    pub fn editing(&self) -> Option<usize> {
        self.editing
    }

    pub fn clear_editing(&mut self) {
        self.editing = None;
    }

    /// Discard all local state; called when the selected feed changes.
    pub fn clear(&mut self) {
        self.zones.clear();
        self.editing = None;
    }

    /// Replace the whole list with freshly fetched server state.
    pub fn replace(&mut self, zones: Vec<Zone>) {
        self.zones = zones;
        self.editing = None;
    }

    /// Fetch the zone list for a feed, replacing local state.
    pub fn load(&mut self, backend: &dyn ZoneBackend, feed_id: i64) -> Result<(), ApiError> {
        let zones = backend.fetch_zones(feed_id)?;
        self.replace(zones);
        Ok(())
    }

    /// Insert a zone, or replace the existing zone with the same label at
    /// its current position. Returns the index of the affected slot.
    pub fn upsert_local(&mut self, zone: Zone) -> usize {
        match self.zones.iter().position(|z| z.label == zone.label) {
            Some(i) => {
                self.zones[i] = zone;
                i
            }
            None => {
                self.zones.push(zone);
                self.zones.len() - 1
            }
        }
    }

    /// Overwrite one slot's label and geometry, keeping its id. Used when
    /// an existing zone is re-drawn.
    pub fn update_slot(&mut self, index: usize, label: String, coordinates: RectCoords) {
        if let Some(zone) = self.zones.get_mut(index) {
            zone.label = label;
            zone.coordinates = coordinates;
        }
    }

    /// Persist the full local list in one call, then reload from the
    /// server so that server-assigned ids are captured.
    pub fn save_all(&mut self, backend: &dyn ZoneBackend, feed_id: i64) -> Result<(), ApiError> {
        backend.save_zones(feed_id, &self.zones)?;
        self.load(backend, feed_id)
    }

    /// Delete the zone at `index`. A zone that was never persisted is
    /// removed locally without a network call; a persisted zone issues
    /// exactly one delete request and is only removed on success.
    pub fn delete_one(
        &mut self,
        backend: &dyn ZoneBackend,
        feed_id: i64,
        index: usize,
    ) -> Result<Zone, ApiError> {
        let zone = self
            .zones
            .get(index)
            .ok_or_else(|| ApiError::Validation("Select a zone to delete".to_string()))?;
        if let Some(id) = zone.id {
            backend.delete_zone(feed_id, id)?;
        }
        match self.editing {
            Some(e) if e == index => self.editing = None,
            Some(e) if e > index => self.editing = Some(e - 1),
            _ => {}
        }
        Ok(self.zones.remove(index))
    }

    pub fn resolve_by_label(&self, label: &str) -> Option<&Zone> {
        self.zones.iter().find(|z| z.label == label)
    }

    /// Prepare the zone at `index` for editing: fetch its authoritative
    /// current version from the server by id and load it into the same
    /// slot, so concurrent external changes are not overwritten. A zone
    /// that was never persisted is edited as-is. Returns the label to
    /// prefill the label field with.
    pub fn refresh_for_edit(
        &mut self,
        backend: &dyn ZoneBackend,
        feed_id: i64,
        index: usize,
    ) -> Result<String, ApiError> {
        let zone = self
            .zones
            .get(index)
            .ok_or_else(|| ApiError::Validation("Select a zone to modify".to_string()))?;

        if let Some(id) = zone.id {
            let current = backend
                .fetch_zones(feed_id)?
                .into_iter()
                .find(|z| z.id == Some(id))
                .ok_or_else(|| ApiError::NotFound("Zone not found on server".to_string()))?;
            self.zones[index] = current;
        }
        self.editing = Some(index);
        Ok(self.zones[index].label.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::zone::Point;
    use std::cell::{Cell, RefCell};

    fn rect(x: f32, y: f32) -> RectCoords {
        RectCoords::from_corners(Point::new(x, y), Point::new(x + 50.0, y + 30.0))
    }

    /// In-memory backend that mimics the server: save replaces the whole
    /// set and assigns ids, fetch returns the stored set.
    #[derive(Default)]
    struct StubBackend {
        stored: RefCell<Vec<Zone>>,
        delete_calls: Cell<usize>,
        fail_delete: bool,
    }

    impl ZoneBackend for StubBackend {
        fn fetch_zones(&self, _feed_id: i64) -> Result<Vec<Zone>, ApiError> {
            Ok(self.stored.borrow().clone())
        }

        fn save_zones(&self, _feed_id: i64, zones: &[Zone]) -> Result<(), ApiError> {
            let mut stored: Vec<Zone> = zones.to_vec();
            for (i, z) in stored.iter_mut().enumerate() {
                z.id = Some(i as i64 + 1);
            }
            *self.stored.borrow_mut() = stored;
            Ok(())
        }

        fn delete_zone(&self, _feed_id: i64, zone_id: i64) -> Result<(), ApiError> {
            self.delete_calls.set(self.delete_calls.get() + 1);
            if self.fail_delete {
                return Err(ApiError::NotFound("Zone not found".to_string()));
            }
            self.stored.borrow_mut().retain(|z| z.id != Some(zone_id));
            Ok(())
        }
    }

    #[test]
    fn test_upsert_appends_new_label() {
        let mut store = ZoneStore::new();
        let i = store.upsert_local(Zone::new("a".to_string(), rect(0.0, 0.0)));
        assert_eq!(i, 0);
        let i = store.upsert_local(Zone::new("b".to_string(), rect(10.0, 0.0)));
        assert_eq!(i, 1);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_upsert_replaces_in_place() {
        let mut store = ZoneStore::new();
        store.upsert_local(Zone::new("a".to_string(), rect(0.0, 0.0)));
        store.upsert_local(Zone::new("b".to_string(), rect(10.0, 0.0)));
        store.upsert_local(Zone::new("c".to_string(), rect(20.0, 0.0)));

        let replacement = Zone::new("b".to_string(), rect(99.0, 99.0));
        let i = store.upsert_local(replacement.clone());

        // Length unchanged, slot preserved, neighbors untouched.
        assert_eq!(i, 1);
        assert_eq!(store.len(), 3);
        assert_eq!(store.zones()[0].label, "a");
        assert_eq!(store.zones()[1], replacement);
        assert_eq!(store.zones()[2].label, "c");
    }

    #[test]
    fn test_save_all_captures_server_ids() {
        let backend = StubBackend::default();
        let mut store = ZoneStore::new();
        store.upsert_local(Zone::new("a".to_string(), rect(0.0, 0.0)));
        store.upsert_local(Zone::new("b".to_string(), rect(10.0, 0.0)));

        store.save_all(&backend, 1).unwrap();

        assert!(store.zones().iter().all(|z| z.id.is_some()));
        // Reloading immediately after a save is idempotent in labels and
        // geometry.
        let before: Vec<_> = store
            .zones()
            .iter()
            .map(|z| (z.label.clone(), z.coordinates))
            .collect();
        store.load(&backend, 1).unwrap();
        let after: Vec<_> = store
            .zones()
            .iter()
            .map(|z| (z.label.clone(), z.coordinates))
            .collect();
        assert_eq!(before, after);
    }

    #[test]
    fn test_delete_unsaved_is_local_only() {
        let backend = StubBackend::default();
        let mut store = ZoneStore::new();
        store.upsert_local(Zone::new("a".to_string(), rect(0.0, 0.0)));

        store.delete_one(&backend, 1, 0).unwrap();
        assert_eq!(backend.delete_calls.get(), 0);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_saved_issues_exactly_one_call() {
        let backend = StubBackend::default();
        let mut store = ZoneStore::new();
        store.upsert_local(Zone::new("a".to_string(), rect(0.0, 0.0)));
        store.save_all(&backend, 1).unwrap();

        store.delete_one(&backend, 1, 0).unwrap();
        assert_eq!(backend.delete_calls.get(), 1);
        assert!(store.is_empty());
    }

    #[test]
    fn test_delete_failure_keeps_zone() {
        let backend = StubBackend {
            fail_delete: true,
            ..Default::default()
        };
        let mut store = ZoneStore::new();
        store.upsert_local(Zone::new("a".to_string(), rect(0.0, 0.0)));
        store.save_all(&backend, 1).unwrap();

        assert!(store.delete_one(&backend, 1, 0).is_err());
        assert_eq!(store.len(), 1);
    }

    #[test]
    fn test_refresh_for_edit_takes_server_version() {
        let backend = StubBackend::default();
        let mut store = ZoneStore::new();
        store.upsert_local(Zone::new("a".to_string(), rect(0.0, 0.0)));
        store.save_all(&backend, 1).unwrap();

        // Another client moved the zone on the server.
        backend.stored.borrow_mut()[0].coordinates = rect(77.0, 77.0);

        let label = store.refresh_for_edit(&backend, 1, 0).unwrap();
        assert_eq!(label, "a");
        assert_eq!(store.editing(), Some(0));
        // The server value wins over the stale local copy.
        assert_eq!(store.zones()[0].coordinates, rect(77.0, 77.0));
    }

    #[test]
    fn test_load_clears_editing_pointer() {
        let backend = StubBackend::default();
        let mut store = ZoneStore::new();
        store.upsert_local(Zone::new("a".to_string(), rect(0.0, 0.0)));
        store.save_all(&backend, 1).unwrap();
        store.refresh_for_edit(&backend, 1, 0).unwrap();
        assert!(store.editing().is_some());

        store.load(&backend, 1).unwrap();
        assert!(store.editing().is_none());
    }

    #[test]
    fn test_resolve_by_label() {
        let mut store = ZoneStore::new();
        store.upsert_local(Zone::new("hall".to_string(), rect(0.0, 0.0)));
        assert!(store.resolve_by_label("hall").is_some());
        assert!(store.resolve_by_label("absent").is_none());
    }
}
