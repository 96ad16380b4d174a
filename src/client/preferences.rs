use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use super::pipeline::{Filter, SortKey, SortOrder};

/// Per-installation view settings. Loaded once at startup and written back
/// through [`PreferencesStore::save`] after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Preferences {
    pub filter: Filter,
    pub search: String,
    pub sort_by: SortKey,
    pub sort_order: SortOrder,
    pub dark_mode: bool,
}

/// JSON file backing the preferences.
#[derive(Debug, Clone)]
pub struct PreferencesStore {
    path: PathBuf,
}

impl PreferencesStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// `<config dir>/todo-app/preferences.json`, or the working directory
    /// when the platform has no config dir.
    pub fn default_location() -> Self {
        let dir = dirs::config_dir()
            .map(|d| d.join("todo-app"))
            .unwrap_or_else(|| PathBuf::from("."));
        Self::new(dir.join("preferences.json"))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Missing or unreadable files yield the defaults.
    pub fn load(&self) -> Preferences {
        let raw = match std::fs::read_to_string(&self.path) {
            Ok(raw) => raw,
            Err(_) => return Preferences::default(),
        };

        serde_json::from_str(&raw).unwrap_or_else(|e| {
            tracing::warn!("Ignoring unparsable preferences at {}: {}", self.path.display(), e);
            Preferences::default()
        })
    }

    /// Write failures are logged and otherwise ignored; preferences are a
    /// convenience, not data.
    pub fn save(&self, preferences: &Preferences) {
        if let Err(e) = self.try_save(preferences) {
            tracing::warn!("Could not save preferences to {}: {}", self.path.display(), e);
        }
    }

    fn try_save(&self, preferences: &Preferences) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let json = serde_json::to_string_pretty(preferences)?;
        std::fs::write(&self.path, json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::new(dir.path().join("nope.json"));

        let prefs = store.load();
        assert_eq!(prefs, Preferences::default());
        assert_eq!(prefs.filter, Filter::All);
        assert_eq!(prefs.sort_by, SortKey::CreatedAt);
        assert_eq!(prefs.sort_order, SortOrder::Desc);
        assert!(!prefs.dark_mode);
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = PreferencesStore::new(dir.path().join("nested").join("prefs.json"));
        let prefs = Preferences {
            filter: Filter::Incomplete,
            search: "report".to_string(),
            sort_by: SortKey::Title,
            sort_order: SortOrder::Asc,
            dark_mode: true,
        };

        store.save(&prefs);

        assert_eq!(store.load(), prefs);
    }

    #[test]
    fn test_unparsable_file_gives_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, "{ filter: ").unwrap();

        assert_eq!(PreferencesStore::new(&path).load(), Preferences::default());
    }

    #[test]
    fn test_missing_fields_fall_back_individually() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("prefs.json");
        std::fs::write(&path, r#"{"filter": "completed", "dark_mode": true}"#).unwrap();

        let prefs = PreferencesStore::new(&path).load();
        assert_eq!(prefs.filter, Filter::Completed);
        assert!(prefs.dark_mode);
        assert_eq!(prefs.sort_by, SortKey::CreatedAt);
        assert_eq!(prefs.search, "");
    }
}
