//! Logo overlay configuration and the recently used logo list.

use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::{Path, PathBuf};

/// Allowed logo width, as a percentage of the canvas width.
pub const LOGO_SCALE_RANGE: RangeInclusive<i32> = 5..=80;
/// Allowed logo offset from its anchor, in export pixels.
pub const LOGO_OFFSET_RANGE: RangeInclusive<i32> = -500..=500;
pub const DEFAULT_LOGO_SCALE: i32 = 20;
/// Number of logos remembered in the library.
pub const LOGO_LIBRARY_CAPACITY: usize = 6;

/// A logo placed in the bottom band of the composite.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogoOverlay {
    pub path: PathBuf,
    scale_percent: i32,
    offset_x: i32,
    offset_y: i32,
}

impl LogoOverlay {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            scale_percent: DEFAULT_LOGO_SCALE,
            offset_x: 0,
            offset_y: 0,
        }
    }

    pub fn with_scale(mut self, scale_percent: i32) -> Self {
        self.set_scale(scale_percent);
        self
    }

    pub fn with_offset(mut self, offset_x: i32, offset_y: i32) -> Self {
        self.set_offset(offset_x, offset_y);
        self
    }

    pub fn scale_percent(&self) -> i32 {
        self.scale_percent
    }

    pub fn offset_x(&self) -> i32 {
        self.offset_x
    }

    pub fn offset_y(&self) -> i32 {
        self.offset_y
    }

    /// Set the scale, clamped to [`LOGO_SCALE_RANGE`].
    pub fn set_scale(&mut self, scale_percent: i32) {
        self.scale_percent = scale_percent.clamp(*LOGO_SCALE_RANGE.start(), *LOGO_SCALE_RANGE.end());
    }

    /// Set the offset, each axis clamped to [`LOGO_OFFSET_RANGE`].
    pub fn set_offset(&mut self, offset_x: i32, offset_y: i32) {
        let (lo, hi) = (*LOGO_OFFSET_RANGE.start(), *LOGO_OFFSET_RANGE.end());
        self.offset_x = offset_x.clamp(lo, hi);
        self.offset_y = offset_y.clamp(lo, hi);
    }

    /// Restore the default scale and a centred position.
    pub fn reset_position(&mut self) {
        self.scale_percent = DEFAULT_LOGO_SCALE;
        self.offset_x = 0;
        self.offset_y = 0;
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }
}

/// Recently used logo files, oldest first.
///
/// Entries are unique; remembering an existing entry moves it to the end.
/// Only the most recent [`LOGO_LIBRARY_CAPACITY`] entries are kept.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "Vec<PathBuf>", into = "Vec<PathBuf>")]
pub struct LogoLibrary {
    paths: Vec<PathBuf>,
}

impl LogoLibrary {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a logo as most recently used.
    pub fn remember(&mut self, path: impl Into<PathBuf>) {
        let path = path.into();
        self.paths.retain(|p| *p != path);
        self.paths.push(path);
        if self.paths.len() > LOGO_LIBRARY_CAPACITY {
            let excess = self.paths.len() - LOGO_LIBRARY_CAPACITY;
            self.paths.drain(..excess);
        }
    }

    /// Drop a logo from the library.
    pub fn forget(&mut self, path: &Path) -> bool {
        let before = self.paths.len();
        self.paths.retain(|p| p != path);
        self.paths.len() != before
    }

    /// All remembered entries, oldest first.
    pub fn recent(&self) -> &[PathBuf] {
        &self.paths
    }

    /// Remembered entries that still exist on disk, most recent first.
    pub fn available(&self) -> Vec<&Path> {
        self.paths
            .iter()
            .rev()
            .filter(|p| p.is_file())
            .map(PathBuf::as_path)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.paths.len()
    }

    pub fn is_empty(&self) -> bool {
        self.paths.is_empty()
    }
}

impl From<Vec<PathBuf>> for LogoLibrary {
    fn from(paths: Vec<PathBuf>) -> Self {
        let mut library = LogoLibrary::new();
        for path in paths {
            library.remember(path);
        }
        library
    }
}

impl From<LogoLibrary> for Vec<PathBuf> {
    fn from(library: LogoLibrary) -> Self {
        library.paths
    }
}
