use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{error, info};

use crate::error::{EditError, ValidationError};
use crate::events::{EventSink, JournalEvent};
use crate::presenters::places::{places_path, PlacesPresenter};
use crate::presenters::{CreateOutcome, Registry};
use crate::records::{Collection, PlaceRecord, Record, TripRecord};
use crate::slots::SlotHandle;
use crate::store::JsonStore;
use crate::util::file_key;

pub const TRIPS_FILE_NAME: &str = "SavedTripsData.json";
pub const PLACES_DIR_NAME: &str = "places";

/// The trip history on the main screen.
///
/// Trips are saved to one file; each trip's places go to their own file under
/// `places/`, named after the trip. Deleting a trip deletes its places file and
/// renaming a trip moves it.
pub struct TripsPresenter {
    registry: Registry<TripRecord>,
    places_dir: PathBuf,
    place_slots: usize,
}

impl TripsPresenter {
    pub fn new(data_dir: &Path, capacity: usize, place_slots: usize, events: Arc<dyn EventSink>) -> Self {
        let store = JsonStore::new(data_dir.join(TRIPS_FILE_NAME));
        Self {
            registry: Registry::new(capacity, store, events),
            places_dir: data_dir.join(PLACES_DIR_NAME),
            place_slots,
        }
    }

    /// Loads the trips, then every trip's places.
    pub fn start(&mut self) -> usize {
        let loaded = self.registry.start();
        let handles: Vec<SlotHandle> = self.registry.iter().map(|(h, _)| h).collect();
        for handle in handles {
            let places = match self.registry.get(handle) {
                Some(trip) => self.load_places(&trip.name),
                None => continue,
            };
            if let Some(trip) = self.registry.get_unsaved_mut(handle) {
                trip.places = places;
            }
        }
        loaded
    }

    fn places_store(&self, trip_name: &str) -> JsonStore<PlaceRecord> {
        JsonStore::new(places_path(&self.places_dir, trip_name))
    }

    fn load_places(&self, trip_name: &str) -> Vec<PlaceRecord> {
        match self.places_store(trip_name).load_all() {
            Ok(places) => places.unwrap_or_default(),
            Err(e) => {
                error!(trip = trip_name, "failed to load places: {e}");
                self.registry.events().emit(JournalEvent::LoadFailed {
                    collection: Collection::Places,
                    message: e.to_string(),
                });
                Vec::new()
            }
        }
    }

    /// Another trip already uses this name's places file.
    fn key_taken(&self, name: &str, except: Option<SlotHandle>) -> bool {
        let key = file_key(name);
        self.registry
            .iter()
            .any(|(h, t)| Some(h) != except && file_key(&t.name) == key)
    }

    pub fn create(&mut self, mut trip: TripRecord) -> CreateOutcome {
        if let Err(e) = trip.validate() {
            return CreateOutcome::Rejected(e);
        }
        if self.key_taken(&trip.name, None) {
            return CreateOutcome::Rejected(ValidationError::DuplicateName(trip.name));
        }
        if self.registry.is_full() {
            return CreateOutcome::PoolFull;
        }

        // A leftover file from a deleted trip of the same name must not resurface
        if let Err(e) = self.places_store(&trip.name).delete_all() {
            error!(trip = %trip.name, "failed to clear stale places: {e}");
        }
        trip.places.clear();
        let outcome = self.registry.create(trip);
        if let CreateOutcome::Created(h) = &outcome {
            info!(index = h.index(), "trip created");
        }
        outcome
    }

    /// Removes the trip and its places file.
    pub fn delete(&mut self, handle: SlotHandle) -> Option<TripRecord> {
        let trip = self.registry.delete(handle)?;
        if let Err(e) = self.places_store(&trip.name).delete_all() {
            error!(trip = %trip.name, "failed to delete places: {e}");
        }
        Some(trip)
    }

    /// Updates name, description and date. Places are kept and follow a rename;
    /// if they can't be moved the edit is refused.
    pub fn edit(&mut self, handle: SlotHandle, mut trip: TripRecord) -> Result<(), EditError> {
        let current = self
            .registry
            .get(handle)
            .ok_or(EditError::SlotNotBound(handle.index()))?;
        trip.validate()?;
        let old_name = current.name.clone();
        trip.places = current.places.clone();

        let renamed = file_key(&old_name) != file_key(&trip.name);
        if renamed && self.key_taken(&trip.name, Some(handle)) {
            return Err(ValidationError::DuplicateName(trip.name).into());
        }

        if renamed {
            self.move_places(&old_name, &trip.name)?;
        }
        self.registry.edit(handle, trip)
    }

    /// Moves the places file to the new name's key. A leftover file under the
    /// new key belongs to no bound trip and is cleared first.
    fn move_places(&self, old_name: &str, new_name: &str) -> Result<(), EditError> {
        let moved = self
            .places_store(new_name)
            .delete_all()
            .and_then(|()| self.places_store(old_name).rename_to(places_path(&self.places_dir, new_name)));
        moved.map_err(|e| {
            error!(from = old_name, to = new_name, "failed to move places: {e}");
            self.registry.events().emit(JournalEvent::SaveFailed {
                collection: Collection::Places,
                message: e.to_string(),
            });
            EditError::Storage(e.to_string())
        })
    }

    /// Opens the places list of a trip. `None` if the slot is free.
    pub fn open_trip(&self, handle: SlotHandle) -> Option<PlacesPresenter> {
        let trip = self.registry.get(handle)?;
        let mut places = PlacesPresenter::new(
            &self.places_dir,
            &trip.name,
            self.place_slots,
            self.registry.events(),
        );
        places.start();
        Some(places)
    }

    /// Copies the open trip's places back into the trip and closes the list.
    pub fn close_trip(&mut self, handle: SlotHandle, mut places: PlacesPresenter) {
        let records = places.records();
        places.close();
        match self.registry.get_unsaved_mut(handle) {
            Some(trip) if trip.name == places.trip_name() => trip.places = records,
            _ => error!(index = handle.index(), "closed places list does not belong to this trip"),
        }
    }

    pub fn get(&self, handle: SlotHandle) -> Option<&TripRecord> {
        self.registry.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &TripRecord)> {
        self.registry.iter()
    }

    pub fn registry(&self) -> &Registry<TripRecord> {
        &self.registry
    }

    pub fn places_dir(&self) -> &Path {
        &self.places_dir
    }

    pub fn close(&mut self) {
        self.registry.close();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::testing::Recorder;
    use serde_json::{json, Value};
    use tempfile::tempdir;

    fn read_json(path: &Path) -> Value {
        serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap()
    }

    #[test]
    fn test_paris_example() {
        let dir = tempdir().unwrap();
        let rec = Recorder::default();
        let mut trips = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        trips.start();
        assert!(rec.take().contains(&JournalEvent::EmptyState {
            collection: Collection::Trips,
            shown: true
        }));

        trips.create(TripRecord::new("Paris", "Vacation", "01.01.2025"));
        assert_eq!(
            read_json(&dir.path().join(TRIPS_FILE_NAME)),
            json!({"Trips": [{"Name": "Paris", "Description": "Vacation", "Date": "01.01.2025"}]})
        );
        trips.close();

        let mut reloaded = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        reloaded.start();
        rec.take();
        let slot0 = reloaded.registry().handle(0).unwrap();
        assert_eq!(
            reloaded.get(slot0),
            Some(&TripRecord::new("Paris", "Vacation", "01.01.2025"))
        );

        reloaded.delete(slot0);
        assert_eq!(read_json(&dir.path().join(TRIPS_FILE_NAME)), json!({"Trips": []}));
        assert!(rec.take().contains(&JournalEvent::EmptyState {
            collection: Collection::Trips,
            shown: true
        }));
    }

    #[test]
    fn test_duplicate_trip_name_rejected() {
        let dir = tempdir().unwrap();
        let rec = Recorder::default();
        let mut trips = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        trips.start();
        trips.create(TripRecord::new("Paris", "Vacation", "01.01.2025"));
        assert_eq!(
            trips.create(TripRecord::new("Paris", "Again", "02.01.2025")),
            CreateOutcome::Rejected(ValidationError::DuplicateName("Paris".into()))
        );
        assert_eq!(trips.registry().len(), 1);
    }

    #[test]
    fn test_places_follow_trip_lifecycle() {
        let dir = tempdir().unwrap();
        let rec = Recorder::default();
        let mut trips = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        trips.start();
        let h = trips
            .create(TripRecord::new("Paris", "Vacation", "01.01.2025"))
            .handle()
            .unwrap();

        let mut places = trips.open_trip(h).unwrap();
        places.add(PlaceRecord::new("Louvre", "Museum", "02.01.2025"));
        trips.close_trip(h, places);
        assert_eq!(trips.get(h).unwrap().places.len(), 1);
        let paris_places = trips.places_dir().join("Paris.json");
        assert!(paris_places.exists());

        // Rename moves the places file and keeps the places
        trips
            .edit(h, TripRecord::new("Lyon", "Vacation", "01.01.2025"))
            .unwrap();
        assert!(!paris_places.exists());
        let lyon_places = trips.places_dir().join("Lyon.json");
        assert!(lyon_places.exists());
        assert_eq!(trips.get(h).unwrap().places.len(), 1);
        assert_eq!(
            read_json(&dir.path().join(TRIPS_FILE_NAME)),
            json!({"Trips": [{"Name": "Lyon", "Description": "Vacation", "Date": "01.01.2025"}]})
        );

        // Reload picks the places up from the trip's file
        trips.close();
        let mut reloaded = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        reloaded.start();
        assert_eq!(reloaded.get(h).unwrap().places[0].name, "Louvre");

        reloaded.delete(h);
        assert!(!lyon_places.exists());
    }

    #[test]
    fn test_new_trip_does_not_inherit_stale_places() {
        let dir = tempdir().unwrap();
        let rec = Recorder::default();
        let stale = JsonStore::new(dir.path().join(PLACES_DIR_NAME).join("Paris.json"));
        stale
            .save_all(&[PlaceRecord::new("Old", "Leftover", "01.01.2020")])
            .unwrap();

        let mut trips = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        trips.start();
        let h = trips
            .create(TripRecord::new("Paris", "Vacation", "01.01.2025"))
            .handle()
            .unwrap();
        let places = trips.open_trip(h).unwrap();
        assert!(places.records().is_empty());
    }

    #[test]
    fn test_rename_onto_existing_trip_rejected() {
        let dir = tempdir().unwrap();
        let rec = Recorder::default();
        let mut trips = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        trips.start();
        trips.create(TripRecord::new("Paris", "Vacation", "01.01.2025"));
        let rome = trips
            .create(TripRecord::new("Rome", "Work", "03.02.2025"))
            .handle()
            .unwrap();

        assert_eq!(
            trips.edit(rome, TripRecord::new("Paris", "Work", "03.02.2025")),
            Err(EditError::Invalid(ValidationError::DuplicateName("Paris".into())))
        );
        // Same name, new description is fine
        trips
            .edit(rome, TripRecord::new("Rome", "Conference", "03.02.2025"))
            .unwrap();
        assert_eq!(trips.get(rome).unwrap().description, "Conference");
    }

    #[test]
    fn test_rename_onto_leftover_places_file() {
        let dir = tempdir().unwrap();
        let rec = Recorder::default();
        let leftover = JsonStore::new(dir.path().join(PLACES_DIR_NAME).join("Lyon.json"));
        leftover
            .save_all(&[PlaceRecord::new("Old", "Leftover", "01.01.2020")])
            .unwrap();

        let mut trips = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        trips.start();
        let h = trips
            .create(TripRecord::new("Paris", "Vacation", "01.01.2025"))
            .handle()
            .unwrap();
        let mut places = trips.open_trip(h).unwrap();
        places.add(PlaceRecord::new("Louvre", "Museum", "02.01.2025"));
        trips.close_trip(h, places);

        trips
            .edit(h, TripRecord::new("Lyon", "Vacation", "01.01.2025"))
            .unwrap();
        assert!(!trips.places_dir().join("Paris.json").exists());
        let names: Vec<String> = trips
            .open_trip(h)
            .unwrap()
            .records()
            .into_iter()
            .map(|p| p.name)
            .collect();
        assert_eq!(names, vec!["Louvre".to_string()]);
        assert!(!rec
            .take()
            .iter()
            .any(|e| matches!(e, JournalEvent::SaveFailed { .. })));
    }

    #[test]
    fn test_malformed_places_file_at_start() {
        let dir = tempdir().unwrap();
        let rec = Recorder::default();
        let mut trips = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        trips.start();
        trips.create(TripRecord::new("Paris", "Vacation", "01.01.2025"));
        trips.close();

        let paris_places = dir.path().join(PLACES_DIR_NAME).join("Paris.json");
        std::fs::create_dir_all(paris_places.parent().unwrap()).unwrap();
        std::fs::write(&paris_places, "{not json").unwrap();

        let mut reloaded = TripsPresenter::new(dir.path(), 3, 5, rec.sink());
        assert_eq!(reloaded.start(), 1);
        assert!(rec.take().iter().any(|e| matches!(
            e,
            JournalEvent::LoadFailed { collection: Collection::Places, .. }
        )));
        let h = reloaded.registry().handle(0).unwrap();
        let trip = reloaded.get(h).unwrap();
        assert_eq!(trip.name, "Paris");
        assert!(trip.places.is_empty());
        // Loading alone leaves the file where it is
        assert!(paris_places.exists());

        let places = reloaded.open_trip(h).unwrap();
        assert!(places.records().is_empty());
        assert!(!paris_places.exists());
        let moved_aside = std::fs::read_dir(reloaded.places_dir())
            .unwrap()
            .filter_map(|e| e.ok())
            .map(|e| e.file_name().to_string_lossy().to_string())
            .filter(|n| n.starts_with("Paris.corrupt-"))
            .count();
        assert_eq!(moved_aside, 1);
    }

    #[test]
    fn test_open_free_slot_is_none() {
        let dir = tempdir().unwrap();
        let rec = Recorder::default();
        let trips = TripsPresenter::new(dir.path(), 2, 5, rec.sink());
        let h = trips.registry().handle(1).unwrap();
        assert!(trips.open_trip(h).is_none());
    }
}
