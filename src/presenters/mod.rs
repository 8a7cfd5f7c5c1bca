use std::sync::Arc;

use tracing::{debug, error, info, warn};

use crate::error::{EditError, ValidationError};
use crate::events::{Discard, EventSink, JournalEvent};
use crate::records::Record;
use crate::slots::{SlotHandle, SlotPool};
use crate::store::JsonStore;
use crate::util::is_journal_date;

pub mod notes;
pub mod places;
pub mod trips;

/// Result of a "create" event.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CreateOutcome {
    Created(SlotHandle),
    /// A required field was missing; nothing was acquired or saved.
    Rejected(ValidationError),
    /// No free slot left.
    PoolFull,
}

impl CreateOutcome {
    pub fn handle(&self) -> Option<SlotHandle> {
        match self {
            CreateOutcome::Created(h) => Some(*h),
            _ => None,
        }
    }
}

/// Keeps the bound slots of one collection in step with its file on disk.
///
/// Every mutation rewrites the whole collection. Save failures are logged and
/// reported as [`JournalEvent::SaveFailed`], never returned.
pub struct Registry<R: Record> {
    pool: SlotPool<R>,
    store: JsonStore<R>,
    events: Arc<dyn EventSink>,
    // Last published placeholder / add-button state
    empty_shown: Option<bool>,
    full_shown: Option<bool>,
}

impl<R: Record> Registry<R> {
    pub fn new(capacity: usize, store: JsonStore<R>, events: Arc<dyn EventSink>) -> Self {
        Self {
            pool: SlotPool::new(capacity),
            store,
            events,
            empty_shown: None,
            full_shown: None,
        }
    }

    /// Frees every slot (reporting the ones that were bound), then binds the saved records to slots `0..k` in file order.
    /// Returns how many records were bound.
    pub fn start(&mut self) -> usize {
        for (handle, _) in self.pool.iter() {
            self.events.emit(JournalEvent::SlotCleared {
                collection: R::COLLECTION,
                index: handle.index(),
            });
        }
        self.pool.reset();
        self.empty_shown = None;
        self.full_shown = None;

        let records = match self.store.load_all() {
            Ok(Some(records)) => records,
            Ok(None) => {
                debug!(collection = %R::COLLECTION, path = %self.store.path().display(), "no saved data");
                Vec::new()
            }
            Err(e) => {
                self.recover_unreadable(e.to_string());
                Vec::new()
            }
        };

        let total = records.len();
        let mut bound = 0;
        for record in records {
            if self.pool.insert(record).is_err() {
                break;
            }
            bound += 1;
        }
        if bound < total {
            warn!(
                collection = %R::COLLECTION,
                dropped = total - bound,
                capacity = self.pool.capacity(),
                "more saved records than slots"
            );
        }
        for (handle, _) in self.pool.iter() {
            self.events.emit(JournalEvent::SlotBound {
                collection: R::COLLECTION,
                index: handle.index(),
            });
        }

        info!(collection = %R::COLLECTION, loaded = bound, "collection loaded");
        self.publish_state();
        bound
    }

    /// The file exists but can't be used. Move it aside so the next save
    /// does not silently replace it.
    fn recover_unreadable(&mut self, message: String) {
        error!(
            collection = %R::COLLECTION,
            path = %self.store.path().display(),
            "failed to load saved data: {message}"
        );
        match self.store.quarantine() {
            Ok(moved) => warn!(collection = %R::COLLECTION, to = %moved.display(), "unreadable file moved aside"),
            Err(e) => error!(collection = %R::COLLECTION, "failed to move unreadable file: {e}"),
        }
        self.events.emit(JournalEvent::LoadFailed {
            collection: R::COLLECTION,
            message,
        });
    }

    /// Validates `record`, binds it to the lowest free slot and saves.
    pub fn create(&mut self, record: R) -> CreateOutcome {
        if let Err(e) = record.validate() {
            debug!(collection = %R::COLLECTION, "create rejected: {e}");
            return CreateOutcome::Rejected(e);
        }
        if !is_journal_date(record.date()) {
            debug!(collection = %R::COLLECTION, date = record.date(), "date is not dd.MM.yyyy");
        }

        let handle = match self.pool.insert(record) {
            Ok(h) => h,
            Err(_) => {
                debug!(collection = %R::COLLECTION, "create rejected: no free slot");
                return CreateOutcome::PoolFull;
            }
        };
        self.events.emit(JournalEvent::SlotBound {
            collection: R::COLLECTION,
            index: handle.index(),
        });
        self.persist();
        self.publish_state();
        CreateOutcome::Created(handle)
    }

    /// Frees the slot and saves. Deleting a free slot does nothing.
    pub fn delete(&mut self, handle: SlotHandle) -> Option<R> {
        let record = self.pool.release(handle)?;
        self.events.emit(JournalEvent::SlotCleared {
            collection: R::COLLECTION,
            index: handle.index(),
        });
        self.persist();
        self.publish_state();
        Some(record)
    }

    /// Replaces the record in place (same slot) and saves.
    pub fn edit(&mut self, handle: SlotHandle, record: R) -> Result<(), EditError> {
        self.update(handle, move |r| *r = record)
    }

    /// Applies `f` to a copy of the bound record; if the result is still valid
    /// it replaces the original and the collection is saved.
    pub fn update<T>(&mut self, handle: SlotHandle, f: impl FnOnce(&mut R) -> T) -> Result<T, EditError> {
        let current = self
            .pool
            .get(handle)
            .ok_or(EditError::SlotNotBound(handle.index()))?;
        let mut next = current.clone();
        let out = f(&mut next);
        next.validate()?;

        if let Some(slot) = self.pool.get_mut(handle) {
            *slot = next;
        }
        self.persist();
        Ok(out)
    }

    /// Writes every bound record. Returns false if the write failed.
    pub fn persist(&self) -> bool {
        match self.store.save_all(&self.pool.records()) {
            Ok(()) => true,
            Err(e) => {
                error!(
                    collection = %R::COLLECTION,
                    path = %self.store.path().display(),
                    "failed to save: {e}"
                );
                self.events.emit(JournalEvent::SaveFailed {
                    collection: R::COLLECTION,
                    message: e.to_string(),
                });
                false
            }
        }
    }

    /// Emits placeholder and add-button signals when their state changed.
    fn publish_state(&mut self) {
        let empty = self.pool.is_empty();
        if self.empty_shown != Some(empty) {
            self.empty_shown = Some(empty);
            self.events.emit(JournalEvent::EmptyState {
                collection: R::COLLECTION,
                shown: empty,
            });
        }
        let full = self.pool.is_full();
        if self.full_shown != Some(full) {
            self.full_shown = Some(full);
            self.events.emit(JournalEvent::PoolFull {
                collection: R::COLLECTION,
                full,
            });
        }
    }

    /// Stops delivering events. Data is already on disk after every mutation.
    pub fn close(&mut self) {
        debug!(collection = %R::COLLECTION, "presenter closed");
        self.events = Arc::new(Discard);
    }

    pub fn get(&self, handle: SlotHandle) -> Option<&R> {
        self.pool.get(handle)
    }

    /// Mutates a record without saving. For fields that are not part of the
    /// collection's document.
    pub(crate) fn get_unsaved_mut(&mut self, handle: SlotHandle) -> Option<&mut R> {
        self.pool.get_mut(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &R)> {
        self.pool.iter()
    }

    pub fn records(&self) -> Vec<R> {
        self.pool.records()
    }

    pub fn handle(&self, index: usize) -> Option<SlotHandle> {
        self.pool.handle(index)
    }

    pub fn len(&self) -> usize {
        self.pool.occupied_count()
    }

    pub fn is_empty(&self) -> bool {
        self.pool.is_empty()
    }

    pub fn is_full(&self) -> bool {
        self.pool.is_full()
    }

    pub fn pool(&self) -> &SlotPool<R> {
        &self.pool
    }

    pub fn store(&self) -> &JsonStore<R> {
        &self.store
    }

    pub(crate) fn events(&self) -> Arc<dyn EventSink> {
        self.events.clone()
    }
}
