use std::path::PathBuf;

/// Date format used for every record, e.g. "01.01.2025".
pub const DATE_FORMAT: &str = "%d.%m.%Y";

/// Today's date on the local clock, formatted as `dd.MM.yyyy`.
pub fn today() -> String {
    chrono::Local::now().format(DATE_FORMAT).to_string()
}

/// True when `s` is a real calendar date in `dd.MM.yyyy` form.
pub fn is_journal_date(s: &str) -> bool {
    chrono::NaiveDate::parse_from_str(s, DATE_FORMAT).is_ok()
}

/// UTC timestamp safe to embed in a file name (e.g. "20250615T103000Z").
pub fn file_timestamp() -> String {
    chrono::Utc::now().format("%Y%m%dT%H%M%SZ").to_string()
}

/// Default storage directory for journal files.
/// - Linux: ~/.local/share/trip-journal
/// - macOS: ~/Library/Application Support/trip-journal
/// - Windows: %APPDATA%\trip-journal
pub fn default_data_dir() -> Option<PathBuf> {
    dirs::data_dir()
        .or_else(dirs::home_dir)
        .map(|d| d.join("trip-journal"))
}

/// Turns a trip name into a file stem.
/// Path separators and other characters that are unsafe in file names become `_`.
pub fn file_key(name: &str) -> String {
    let key: String = name
        .trim()
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            c => c,
        })
        .collect();
    // "." and ".." would resolve to directories
    if key.chars().all(|c| c == '.') {
        key.replace('.', "_")
    } else {
        key
    }
}
