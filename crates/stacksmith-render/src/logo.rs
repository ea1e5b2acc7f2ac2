//! Logo bitmap loading.

use image::RgbaImage;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors loading a logo file.
#[derive(Debug, Error)]
pub enum OverlayError {
    #[error("Logo file not found: {}", .0.display())]
    Missing(PathBuf),

    #[error("Failed to decode logo {}: {source}", .path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

/// Result type for logo loading.
pub type OverlayResult<T> = Result<T, OverlayError>;

/// Load a logo with its alpha channel.
pub fn load_logo(path: &Path) -> OverlayResult<RgbaImage> {
    if !path.is_file() {
        return Err(OverlayError::Missing(path.to_path_buf()));
    }
    let image = image::open(path).map_err(|source| OverlayError::Decode {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(image.to_rgba8())
}

/// Log a logo failure. A missing file is expected and silent.
pub(crate) fn report(error: &OverlayError) {
    match error {
        OverlayError::Missing(path) => log::debug!("Skipping logo: {} is missing", path.display()),
        OverlayError::Decode { .. } => log::warn!("Skipping logo: {error}"),
    }
}

/// Last successfully loaded logo.
///
/// Reloaded when the path changes. The file is checked on every lookup, so a
/// deleted logo stops being drawn.
#[derive(Debug, Default)]
pub struct LogoCache {
    loaded: Option<(PathBuf, RgbaImage)>,
}

impl LogoCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Logo bitmap for `path`, or `None` if it cannot be loaded.
    pub fn get(&mut self, path: &Path) -> Option<&RgbaImage> {
        if !path.is_file() {
            if self.loaded.take().is_some() {
                log::debug!("Logo {} disappeared", path.display());
            }
            return None;
        }
        let stale = self.loaded.as_ref().is_none_or(|(p, _)| p != path);
        if stale {
            self.loaded = match load_logo(path) {
                Ok(image) => Some((path.to_path_buf(), image)),
                Err(e) => {
                    report(&e);
                    None
                }
            };
        }
        self.loaded.as_ref().map(|(_, image)| image)
    }
}
