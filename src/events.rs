use serde::Serialize;

use crate::records::Collection;

/// Signals pushed to the host UI.
#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase", tag = "event", content = "data")]
pub enum JournalEvent {
    /// Show or hide the "nothing here yet" placeholder.
    EmptyState { collection: Collection, shown: bool },
    /// Disable or re-enable the "add" affordance.
    PoolFull { collection: Collection, full: bool },
    SlotBound { collection: Collection, index: usize },
    SlotCleared { collection: Collection, index: usize },
    SaveFailed { collection: Collection, message: String },
    LoadFailed { collection: Collection, message: String },
}

/// Receives [`JournalEvent`]s. Any `Fn(JournalEvent) + Send + Sync` closure is a sink.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: JournalEvent);
}

impl<F> EventSink for F
where
    F: Fn(JournalEvent) + Send + Sync,
{
    fn emit(&self, event: JournalEvent) {
        self(event)
    }
}

/// Sink that drops everything. Used after a presenter is closed.
pub struct Discard;

impl EventSink for Discard {
    fn emit(&self, _event: JournalEvent) {}
}
