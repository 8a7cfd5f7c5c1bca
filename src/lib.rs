use std::sync::Arc;

use tracing::info;

pub mod config;
pub mod error;
pub mod events;
pub mod logging;
pub mod presenters;
pub mod records;
pub mod slots;
pub mod store;
pub mod util;

pub use config::{JournalConfig, Settings, StartScreen};
pub use error::{EditError, JournalError, Result, ValidationError};
pub use events::{EventSink, JournalEvent};
pub use presenters::notes::NotesPresenter;
pub use presenters::places::PlacesPresenter;
pub use presenters::trips::TripsPresenter;
pub use presenters::{CreateOutcome, Registry};
pub use records::{Collection, NoteRecord, PlaceRecord, Record, TripRecord};
pub use slots::{SlotHandle, SlotPool};

/// Everything the host shell talks to, built once at startup.
pub struct Journal {
    config: JournalConfig,
    settings: Settings,
    trips: TripsPresenter,
    notes: NotesPresenter,
}

impl Journal {
    /// Installs logging from `config.log` (a no-op if the host already did),
    /// creates the data directory, loads settings and both main-screen lists.
    pub fn open(config: JournalConfig, events: Arc<dyn EventSink>) -> Result<Self> {
        logging::init_tracing(&config.log);
        config.validate()?;
        std::fs::create_dir_all(&config.data_dir)?;

        let settings = Settings::load(&config.data_dir);
        let mut trips = TripsPresenter::new(
            &config.data_dir,
            config.trip_slots,
            config.place_slots,
            events.clone(),
        );
        let mut notes = NotesPresenter::new(&config.data_dir, config.note_slots, events);
        let trip_count = trips.start();
        let note_count = notes.start();

        info!(
            data_dir = %config.data_dir.display(),
            trips = trip_count,
            notes = note_count,
            "journal opened"
        );

        Ok(Self {
            config,
            settings,
            trips,
            notes,
        })
    }

    pub fn config(&self) -> &JournalConfig {
        &self.config
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn trips(&self) -> &TripsPresenter {
        &self.trips
    }

    pub fn trips_mut(&mut self) -> &mut TripsPresenter {
        &mut self.trips
    }

    pub fn notes(&self) -> &NotesPresenter {
        &self.notes
    }

    pub fn notes_mut(&mut self) -> &mut NotesPresenter {
        &mut self.notes
    }

    pub fn initial_screen(&self) -> StartScreen {
        self.settings.start_screen()
    }

    pub fn complete_onboarding(&mut self) -> Result<()> {
        self.settings.onboarding_completed = true;
        self.settings.save(&self.config.data_dir)
    }

    /// Stores what the remote config said. An absent link keeps the old one.
    pub fn set_remote_config(&mut self, privacy_link: Option<String>, use_privacy: bool) -> Result<()> {
        if privacy_link.is_some() {
            self.settings.privacy_link = privacy_link;
        }
        self.settings.use_privacy = use_privacy;
        self.settings.save(&self.config.data_dir)
    }

    /// Detaches every presenter from the event sink.
    pub fn close(mut self) {
        self.trips.close();
        self.notes.close();
        info!("journal closed");
    }
}
