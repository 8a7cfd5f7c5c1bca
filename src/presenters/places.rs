use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::error::EditError;
use crate::events::EventSink;
use crate::presenters::{CreateOutcome, Registry};
use crate::records::PlaceRecord;
use crate::slots::SlotHandle;
use crate::store::JsonStore;
use crate::util::file_key;

/// Where the places of the trip named `trip_name` are saved.
pub fn places_path(places_dir: &Path, trip_name: &str) -> PathBuf {
    places_dir.join(format!("{}.json", file_key(trip_name)))
}

/// The places list of one open trip. Each trip has its own file.
pub struct PlacesPresenter {
    trip_name: String,
    registry: Registry<PlaceRecord>,
}

impl PlacesPresenter {
    pub fn new(places_dir: &Path, trip_name: &str, capacity: usize, events: Arc<dyn EventSink>) -> Self {
        let store = JsonStore::new(places_path(places_dir, trip_name));
        Self {
            trip_name: trip_name.to_string(),
            registry: Registry::new(capacity, store, events),
        }
    }

    pub fn trip_name(&self) -> &str {
        &self.trip_name
    }

    pub fn start(&mut self) -> usize {
        self.registry.start()
    }

    pub fn add(&mut self, place: PlaceRecord) -> CreateOutcome {
        self.registry.create(place)
    }

    pub fn remove(&mut self, handle: SlotHandle) -> Option<PlaceRecord> {
        self.registry.delete(handle)
    }

    pub fn edit(&mut self, handle: SlotHandle, place: PlaceRecord) -> Result<(), EditError> {
        self.registry.edit(handle, place)
    }

    pub fn add_image(&mut self, handle: SlotHandle, path: impl Into<String>) -> Result<(), EditError> {
        let path = path.into();
        self.registry.update(handle, move |p| p.images.push(path))
    }

    /// Detaches the photo at `index`. Returns its path, or `None` if there was none.
    pub fn remove_image(&mut self, handle: SlotHandle, index: usize) -> Result<Option<String>, EditError> {
        let count = self
            .registry
            .get(handle)
            .ok_or(EditError::SlotNotBound(handle.index()))?
            .images
            .len();
        if index >= count {
            return Ok(None);
        }
        self.registry.update(handle, |p| Some(p.images.remove(index)))
    }

    pub fn get(&self, handle: SlotHandle) -> Option<&PlaceRecord> {
        self.registry.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &PlaceRecord)> {
        self.registry.iter()
    }

    pub fn records(&self) -> Vec<PlaceRecord> {
        self.registry.records()
    }

    pub fn registry(&self) -> &Registry<PlaceRecord> {
        &self.registry
    }

    pub fn close(&mut self) {
        self.registry.close();
    }
}
