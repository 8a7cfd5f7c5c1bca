use serde::Serialize;

/// All errors that can occur while reading or writing journal data.
#[derive(Debug, thiserror::Error)]
pub enum JournalError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("{0}")]
    Custom(String),
}

// Hosts receive errors over IPC as plain strings.
impl Serialize for JournalError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        serializer.serialize_str(&self.to_string())
    }
}

pub type Result<T> = std::result::Result<T, JournalError>;

/// A record was rejected before touching the pool or the disk.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    #[error("{0} must not be empty")]
    MissingField(&'static str),

    #[error("a trip named \"{0}\" already exists")]
    DuplicateName(String),
}

/// Why an in-place edit did not happen.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum EditError {
    #[error("slot {0} holds no record")]
    SlotNotBound(usize),

    #[error(transparent)]
    Invalid(#[from] ValidationError),

    /// Files that must follow the record could not be moved; nothing changed.
    #[error("could not move stored data: {0}")]
    Storage(String),
}
