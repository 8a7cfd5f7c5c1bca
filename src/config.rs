use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{JournalError, Result};
use crate::logging::LogConfig;
use crate::util::default_data_dir;

pub const SETTINGS_FILE_NAME: &str = "settings.json";

const DEFAULT_SLOTS: usize = 10;

/// Startup configuration, resolved once and handed to [`crate::Journal::open`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct JournalConfig {
    pub data_dir: PathBuf,
    pub trip_slots: usize,
    pub note_slots: usize,
    pub place_slots: usize,
    pub log: LogConfig,
}

impl JournalConfig {
    /// Default capacities with every file under `data_dir`.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            trip_slots: DEFAULT_SLOTS,
            note_slots: DEFAULT_SLOTS,
            place_slots: DEFAULT_SLOTS,
            log: LogConfig::default(),
        }
    }

    pub fn from_env() -> Result<Self> {
        let data_dir = match env::var("TRIP_JOURNAL_DATA_DIR") {
            Ok(dir) if !dir.trim().is_empty() => PathBuf::from(dir),
            _ => default_data_dir()
                .ok_or_else(|| JournalError::Custom("Cannot find data directory".into()))?,
        };

        let config = Self {
            data_dir,
            trip_slots: env_or_parse("TRIP_JOURNAL_TRIP_SLOTS", DEFAULT_SLOTS),
            note_slots: env_or_parse("TRIP_JOURNAL_NOTE_SLOTS", DEFAULT_SLOTS),
            place_slots: env_or_parse("TRIP_JOURNAL_PLACE_SLOTS", DEFAULT_SLOTS),
            log: LogConfig {
                log_level: env_or("TRIP_JOURNAL_LOG_LEVEL", "info"),
                log_dir: env::var("TRIP_JOURNAL_LOG_DIR").ok().map(PathBuf::from),
            },
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        for (name, slots) in [
            ("trip_slots", self.trip_slots),
            ("note_slots", self.note_slots),
            ("place_slots", self.place_slots),
        ] {
            if slots == 0 {
                return Err(JournalError::Custom(format!("{name} must be at least 1")));
            }
        }
        Ok(())
    }
}

pub fn env_or(key: &str, default: &str) -> String {
    env::var(key).unwrap_or_else(|_| default.to_string())
}

pub fn env_or_parse<T>(key: &str, default: T) -> T
where
    T: FromStr + Copy,
{
    match env::var(key) {
        Ok(raw) => match raw.trim().parse::<T>() {
            Ok(v) => v,
            Err(_) => {
                tracing::warn!(key, value = %raw, "Failed to parse env var, using default");
                default
            }
        },
        Err(_) => default,
    }
}

/// Which screen the host should show first.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum StartScreen {
    Onboarding,
    Main,
    /// Remote config turned the journal off; show the policy page instead.
    PrivacyPolicy,
}

/// Small persisted flags that survive restarts.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Settings {
    pub version: u32,
    #[serde(default)]
    pub onboarding_completed: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub privacy_link: Option<String>,
    #[serde(default = "default_true")]
    pub use_privacy: bool,
}

fn default_true() -> bool {
    true
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            version: 1,
            onboarding_completed: false,
            privacy_link: None,
            use_privacy: true,
        }
    }
}

impl Settings {
    pub fn path(data_dir: &Path) -> PathBuf {
        data_dir.join(SETTINGS_FILE_NAME)
    }

    /// Defaults when the file is missing or unreadable.
    pub fn load(data_dir: &Path) -> Self {
        let path = Self::path(data_dir);
        let Ok(content) = std::fs::read_to_string(&path) else {
            return Self::default();
        };
        serde_json::from_str(&content).unwrap_or_else(|e| {
            tracing::warn!(path = %path.display(), "ignoring unreadable settings: {e}");
            Self::default()
        })
    }

    pub fn save(&self, data_dir: &Path) -> Result<()> {
        let path = Self::path(data_dir);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(self)?;
        std::fs::write(&path, json)?;
        Ok(())
    }

    pub fn start_screen(&self) -> StartScreen {
        if !self.use_privacy {
            StartScreen::PrivacyPolicy
        } else if self.onboarding_completed {
            StartScreen::Main
        } else {
            StartScreen::Onboarding
        }
    }
}
