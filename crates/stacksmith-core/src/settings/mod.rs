//! Persisted user settings.

mod file;
mod memory;

pub use file::{FileSettingsStore, SETTINGS_FILE_NAME};
pub use memory::MemorySettingsStore;

use crate::logo::{DEFAULT_LOGO_SCALE, LogoLibrary, LogoOverlay};
use crate::params::{
    Background, DEFAULT_BOTTOM_MARGIN, DEFAULT_SPACING, DEFAULT_TARGET_WIDTH, LayoutParameters,
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Settings errors.
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("Serialization error: {0}")]
    Serialization(String),
    #[error("IO error: {0}")]
    Io(String),
    #[error("Settings error: {0}")]
    Other(String),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Trait for settings backends.
pub trait SettingsStore: Send + Sync {
    /// Load settings. A store with nothing saved yields the defaults.
    fn load(&self) -> SettingsResult<Settings>;

    /// Save settings, replacing any previous value.
    fn save(&self, settings: &Settings) -> SettingsResult<()>;
}

/// Key/value settings blob.
///
/// Missing keys take their default value, so older or partial files load.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub target_width: u32,
    pub spacing: u32,
    pub bottom_margin: u32,
    pub background: Background,
    pub logo_path: Option<PathBuf>,
    pub logo_scale: i32,
    pub logo_offset_x: i32,
    pub logo_offset_y: i32,
    pub logo_library: LogoLibrary,
    pub last_image_dir: Option<PathBuf>,
    pub last_export_dir: Option<PathBuf>,
    pub last_logo_dir: Option<PathBuf>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            target_width: DEFAULT_TARGET_WIDTH,
            spacing: DEFAULT_SPACING,
            bottom_margin: DEFAULT_BOTTOM_MARGIN,
            background: Background::default(),
            logo_path: None,
            logo_scale: DEFAULT_LOGO_SCALE,
            logo_offset_x: 0,
            logo_offset_y: 0,
            logo_library: LogoLibrary::default(),
            last_image_dir: None,
            last_export_dir: None,
            last_logo_dir: None,
        }
    }
}

impl Settings {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Layout parameters, with a zero width replaced by the default.
    pub fn layout_parameters(&self) -> LayoutParameters {
        let target_width = if self.target_width == 0 {
            log::warn!("Stored width is zero; using {DEFAULT_TARGET_WIDTH}");
            DEFAULT_TARGET_WIDTH
        } else {
            self.target_width
        };
        LayoutParameters::new(target_width, self.spacing, self.bottom_margin, self.background)
    }

    /// Logo overlay with its adjustments clamped to the allowed ranges.
    pub fn logo_overlay(&self) -> Option<LogoOverlay> {
        let path = self.logo_path.as_ref()?;
        Some(
            LogoOverlay::new(path.clone())
                .with_scale(self.logo_scale)
                .with_offset(self.logo_offset_x, self.logo_offset_y),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let settings = Settings::default();
        assert_eq!(settings.layout_parameters(), LayoutParameters::default());
        assert_eq!(settings.logo_scale, 20);
        assert!(settings.logo_overlay().is_none());
    }

    #[test]
    fn test_missing_keys_take_defaults() {
        let settings = Settings::from_json(r#"{"target_width": 1200, "background": "Black"}"#).unwrap();
        assert_eq!(settings.target_width, 1200);
        assert_eq!(settings.background, Background::Dark);
        assert_eq!(settings.spacing, 20);
        assert_eq!(settings.bottom_margin, 250);
        assert!(settings.logo_library.is_empty());
    }

    #[test]
    fn test_json_roundtrip() {
        let mut settings = Settings {
            logo_path: Some(PathBuf::from("/tmp/logo.png")),
            logo_scale: 35,
            logo_offset_y: -12,
            last_export_dir: Some(PathBuf::from("/tmp/out")),
            ..Settings::default()
        };
        settings.logo_library.remember("/tmp/logo.png");

        let json = settings.to_json().unwrap();
        assert_eq!(Settings::from_json(&json).unwrap(), settings);
    }

    #[test]
    fn test_logo_overlay_clamped() {
        let settings = Settings {
            logo_path: Some(PathBuf::from("l.png")),
            logo_scale: 400,
            logo_offset_x: -9000,
            ..Settings::default()
        };
        let logo = settings.logo_overlay().unwrap();
        assert_eq!(logo.scale_percent(), 80);
        assert_eq!(logo.offset_x(), -500);
    }

    #[test]
    fn test_zero_width_replaced() {
        let settings = Settings {
            target_width: 0,
            ..Settings::default()
        };
        assert_eq!(settings.layout_parameters().target_width, DEFAULT_TARGET_WIDTH);
    }
}
