use std::path::Path;
use std::sync::Arc;

use crate::error::EditError;
use crate::events::EventSink;
use crate::presenters::{CreateOutcome, Registry};
use crate::records::NoteRecord;
use crate::slots::SlotHandle;
use crate::store::JsonStore;

pub const NOTES_FILE_NAME: &str = "NotesData.json";

/// The notes list on the main screen.
pub struct NotesPresenter {
    registry: Registry<NoteRecord>,
}

impl NotesPresenter {
    pub fn new(data_dir: &Path, capacity: usize, events: Arc<dyn EventSink>) -> Self {
        let store = JsonStore::new(data_dir.join(NOTES_FILE_NAME));
        Self {
            registry: Registry::new(capacity, store, events),
        }
    }

    pub fn start(&mut self) -> usize {
        self.registry.start()
    }

    pub fn create(&mut self, note: NoteRecord) -> CreateOutcome {
        self.registry.create(note)
    }

    pub fn delete(&mut self, handle: SlotHandle) -> Option<NoteRecord> {
        self.registry.delete(handle)
    }

    pub fn edit(&mut self, handle: SlotHandle, note: NoteRecord) -> Result<(), EditError> {
        self.registry.edit(handle, note)
    }

    pub fn get(&self, handle: SlotHandle) -> Option<&NoteRecord> {
        self.registry.get(handle)
    }

    pub fn iter(&self) -> impl Iterator<Item = (SlotHandle, &NoteRecord)> {
        self.registry.iter()
    }

    pub fn registry(&self) -> &Registry<NoteRecord> {
        &self.registry
    }

    pub fn close(&mut self) {
        self.registry.close();
    }
}
