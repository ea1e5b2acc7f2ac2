//! JPEG persistence of the export canvas.

use crate::compositor::compose_export;
use image::RgbImage;
use image::codecs::jpeg::{JpegEncoder, PixelDensity};
use stacksmith_core::{AppState, DecodeError, LayoutError};
use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// JPEG quality used for exports.
pub const JPEG_QUALITY: u8 = 95;
/// Resolution recorded in exported files.
pub const EXPORT_DPI: u16 = 300;

/// Export errors.
#[derive(Debug, Error)]
pub enum ExportError {
    #[error("Layout error: {0}")]
    Layout(#[from] LayoutError),

    #[error("Source image unavailable: {0}")]
    Source(#[from] DecodeError),

    #[error("Failed to write {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("JPEG encoding failed: {0}")]
    Encode(#[from] image::ImageError),
}

/// Result type for export operations.
pub type ExportResult<T> = Result<T, ExportError>;

/// JPEG encoder settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExportOptions {
    pub quality: u8,
    pub dpi: u16,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            quality: JPEG_QUALITY,
            dpi: EXPORT_DPI,
        }
    }
}

/// Write a canvas as JPEG.
///
/// The file is written next to `path` under a temporary name and renamed
/// into place, so a failed export never leaves a truncated file behind.
pub fn save_jpeg(canvas: &RgbImage, path: &Path, options: &ExportOptions) -> ExportResult<()> {
    let partial = partial_path(path);
    let result = write_jpeg(canvas, &partial, options).and_then(|()| {
        fs::rename(&partial, path).map_err(|source| ExportError::Io {
            path: path.to_path_buf(),
            source,
        })
    });
    if result.is_err() && partial.exists() {
        if let Err(e) = fs::remove_file(&partial) {
            log::warn!("Failed to remove {}: {}", partial.display(), e);
        }
    }
    result
}

/// Compose the current state and save it. Returns false if there was nothing
/// to export.
pub fn export_composite(state: &AppState, path: &Path, options: &ExportOptions) -> ExportResult<bool> {
    let Some(canvas) = compose_export(state)? else {
        log::info!("Nothing to export");
        return Ok(false);
    };
    save_jpeg(&canvas, path, options)?;
    log::info!(
        "Exported {}x{} composite to {}",
        canvas.width(),
        canvas.height(),
        path.display()
    );
    Ok(true)
}

fn write_jpeg(canvas: &RgbImage, path: &Path, options: &ExportOptions) -> ExportResult<()> {
    let io_error = |source| ExportError::Io {
        path: path.to_path_buf(),
        source,
    };
    let file = File::create(path).map_err(io_error)?;
    let mut writer = BufWriter::new(file);
    {
        let mut encoder = JpegEncoder::new_with_quality(&mut writer, options.quality);
        encoder.set_pixel_density(PixelDensity::dpi(options.dpi));
        encoder.encode_image(canvas)?;
    }
    writer.flush().map_err(io_error)?;
    Ok(())
}

fn partial_path(path: &Path) -> PathBuf {
    let name = path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "export".to_string());
    path.with_file_name(format!(".{name}.partial"))
}
