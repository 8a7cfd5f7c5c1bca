use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::util::today;

/// Which collection a record, file or event belongs to.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Collection {
    Trips,
    Notes,
    Places,
}

impl std::fmt::Display for Collection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Collection::Trips => "trips",
            Collection::Notes => "notes",
            Collection::Places => "places",
        })
    }
}

/// A user-entered journal entry that can sit in a slot and be saved to disk.
pub trait Record: Clone + std::fmt::Debug + Serialize + DeserializeOwned {
    const COLLECTION: Collection;

    /// Top-level key of the array in the collection's JSON document.
    const KEY: &'static str;

    /// Checks the fields a user must fill in before the record is accepted.
    fn validate(&self) -> Result<(), ValidationError>;

    fn date(&self) -> &str;
}

fn require(value: &str, field: &'static str) -> Result<(), ValidationError> {
    if value.is_empty() {
        Err(ValidationError::MissingField(field))
    } else {
        Ok(())
    }
}

/// A trip. Its places live in a separate file keyed by the trip name,
/// so they are never written into the trips document.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TripRecord {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub date: String,
    #[serde(skip)]
    pub places: Vec<PlaceRecord>,
}

impl TripRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            date: date.into(),
            places: Vec::new(),
        }
    }

    /// A trip dated today, as the create screen pre-fills it.
    pub fn dated_today(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, today())
    }
}

impl Record for TripRecord {
    const COLLECTION: Collection = Collection::Trips;
    const KEY: &'static str = "Trips";

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        require(&self.description, "description")?;
        require(&self.date, "date")
    }

    fn date(&self) -> &str {
        &self.date
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NoteRecord {
    #[serde(rename = "Note", default)]
    pub note: String,
    #[serde(rename = "Date", default)]
    pub date: String,
}

impl NoteRecord {
    pub fn new(note: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            date: date.into(),
        }
    }

    pub fn dated_today(note: impl Into<String>) -> Self {
        Self::new(note, today())
    }
}

impl Record for NoteRecord {
    const COLLECTION: Collection = Collection::Notes;
    const KEY: &'static str = "NoteDataList";

    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.note, "note")?;
        require(&self.date, "date")
    }

    fn date(&self) -> &str {
        &self.date
    }
}

/// A place visited on a trip, with the paths of its attached photos.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceRecord {
    #[serde(rename = "PlaceName", default)]
    pub name: String,
    #[serde(rename = "PlaceDescription", default)]
    pub description: String,
    #[serde(rename = "ImagesPath", default)]
    pub images: Vec<String>,
    #[serde(rename = "Date", default)]
    pub date: String,
}

impl PlaceRecord {
    pub fn new(name: impl Into<String>, description: impl Into<String>, date: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            images: Vec::new(),
            date: date.into(),
        }
    }

    pub fn dated_today(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self::new(name, description, today())
    }

    pub fn with_images(mut self, images: Vec<String>) -> Self {
        self.images = images;
        self
    }
}

impl Record for PlaceRecord {
    const COLLECTION: Collection = Collection::Places;
    const KEY: &'static str = "Places";

    // Photos are optional.
    fn validate(&self) -> Result<(), ValidationError> {
        require(&self.name, "name")?;
        require(&self.description, "description")?;
        require(&self.date, "date")
    }

    fn date(&self) -> &str {
        &self.date
    }
}
