//! In-memory settings store.

use super::{Settings, SettingsError, SettingsResult, SettingsStore};
use std::sync::RwLock;

/// In-memory settings for testing and ephemeral use.
#[derive(Default)]
pub struct MemorySettingsStore {
    settings: RwLock<Option<Settings>>,
}

impl MemorySettingsStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store pre-populated with settings.
    pub fn with_settings(settings: Settings) -> Self {
        Self {
            settings: RwLock::new(Some(settings)),
        }
    }
}

impl SettingsStore for MemorySettingsStore {
    fn load(&self) -> SettingsResult<Settings> {
        let settings = self
            .settings
            .read()
            .map_err(|e| SettingsError::Other(format!("Lock error: {}", e)))?;
        Ok(settings.clone().unwrap_or_default())
    }

    fn save(&self, settings: &Settings) -> SettingsResult<()> {
        let mut stored = self
            .settings
            .write()
            .map_err(|e| SettingsError::Other(format!("Lock error: {}", e)))?;
        *stored = Some(settings.clone());
        Ok(())
    }
}
