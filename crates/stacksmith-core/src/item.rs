//! Image items held by the stack.

use image::RgbImage;
use std::fmt;
use std::path::{Path, PathBuf};
use uuid::Uuid;

/// Unique identifier for an item in the stack.
pub type ItemId = Uuid;

/// File extensions accepted as stack sources (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png", "tif", "tiff", "bmp", "webp"];

/// Check whether a file extension is a supported source format.
pub fn is_supported_extension(ext: &str) -> bool {
    let ext = ext.to_lowercase();
    SUPPORTED_EXTENSIONS.contains(&ext.as_str())
}

/// Check whether a path has a supported source extension.
pub fn is_supported_path(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(is_supported_extension)
        .unwrap_or(false)
}

/// A decoded photograph in the stack.
///
/// Holds the aspect ratio of the full-resolution source and a reduced
/// resolution RGB bitmap used for on-screen previews. The full-resolution
/// pixels are never kept; export re-reads `source_path`.
pub struct ImageItem {
    id: ItemId,
    /// Height divided by width of the full-resolution source.
    aspect_ratio: f64,
    /// Original image width in pixels.
    source_width: u32,
    /// Original image height in pixels.
    source_height: u32,
    /// Reduced-resolution bitmap for previews.
    preview: RgbImage,
    source_path: PathBuf,
}

impl ImageItem {
    /// Create an item from a decoded source.
    ///
    /// Returns `None` if the source has no pixels, since such an image has
    /// no meaningful aspect ratio.
    pub fn new(
        source_path: PathBuf,
        source_width: u32,
        source_height: u32,
        preview: RgbImage,
    ) -> Option<Self> {
        if source_width == 0 || source_height == 0 {
            return None;
        }
        Some(Self {
            id: Uuid::new_v4(),
            aspect_ratio: source_height as f64 / source_width as f64,
            source_width,
            source_height,
            preview,
            source_path,
        })
    }

    pub fn id(&self) -> ItemId {
        self.id
    }

    pub fn aspect_ratio(&self) -> f64 {
        self.aspect_ratio
    }

    /// Full-resolution dimensions as `(width, height)`.
    pub fn source_size(&self) -> (u32, u32) {
        (self.source_width, self.source_height)
    }

    pub fn preview(&self) -> &RgbImage {
        &self.preview
    }

    pub fn source_path(&self) -> &Path {
        &self.source_path
    }

    /// File name for display purposes.
    pub fn display_name(&self) -> String {
        self.source_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_else(|| self.source_path.display().to_string())
    }
}

impl fmt::Debug for ImageItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageItem")
            .field("id", &self.id)
            .field("aspect_ratio", &self.aspect_ratio)
            .field("source_width", &self.source_width)
            .field("source_height", &self.source_height)
            .field("preview", &self.preview.dimensions())
            .field("source_path", &self.source_path)
            .finish()
    }
}
