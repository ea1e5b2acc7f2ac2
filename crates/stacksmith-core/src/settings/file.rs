//! File-based settings store.

use super::{Settings, SettingsError, SettingsResult, SettingsStore};
use std::fs;
use std::path::{Path, PathBuf};

/// Name of the settings file in the default location.
pub const SETTINGS_FILE_NAME: &str = "stacksmith_settings.json";

/// Settings stored as a JSON file.
pub struct FileSettingsStore {
    path: PathBuf,
}

impl FileSettingsStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    /// Settings file in the user's documents directory.
    ///
    /// Falls back to the home directory when there is no documents directory.
    pub fn default_location() -> SettingsResult<Self> {
        let base = dirs::document_dir()
            .or_else(dirs::home_dir)
            .ok_or_else(|| SettingsError::Io("Could not determine home directory".to_string()))?;
        Ok(Self::new(base.join(SETTINGS_FILE_NAME)))
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl SettingsStore for FileSettingsStore {
    fn load(&self) -> SettingsResult<Settings> {
        if !self.path.exists() {
            log::debug!("No settings at {}; using defaults", self.path.display());
            return Ok(Settings::default());
        }
        let json = fs::read_to_string(&self.path).map_err(|e| {
            SettingsError::Io(format!("Failed to read {}: {}", self.path.display(), e))
        })?;
        Settings::from_json(&json).map_err(|e| SettingsError::Serialization(e.to_string()))
    }

    fn save(&self, settings: &Settings) -> SettingsResult<()> {
        let json = settings
            .to_json()
            .map_err(|e| SettingsError::Serialization(e.to_string()))?;
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(|e| {
                    SettingsError::Io(format!("Failed to create {}: {}", parent.display(), e))
                })?;
            }
        }
        fs::write(&self.path, json).map_err(|e| {
            SettingsError::Io(format!("Failed to write {}: {}", self.path.display(), e))
        })?;
        log::debug!("Saved settings to {}", self.path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Background;

    #[test]
    fn test_missing_file_loads_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join(SETTINGS_FILE_NAME));
        assert_eq!(store.load().unwrap(), Settings::default());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileSettingsStore::new(dir.path().join("nested").join(SETTINGS_FILE_NAME));

        let settings = Settings {
            target_width: 1500,
            background: Background::Dark,
            ..Settings::default()
        };
        store.save(&settings).unwrap();
        assert!(store.path().exists());
        assert_eq!(store.load().unwrap(), settings);
    }

    #[test]
    fn test_corrupt_file_is_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(SETTINGS_FILE_NAME);
        fs::write(&path, "{ not json").unwrap();
        let store = FileSettingsStore::new(path);
        assert!(matches!(store.load(), Err(SettingsError::Serialization(_))));
    }

    #[test]
    fn test_default_location_file_name() {
        if let Ok(store) = FileSettingsStore::default_location() {
            assert_eq!(store.path().file_name().unwrap(), SETTINGS_FILE_NAME);
        }
    }
}
