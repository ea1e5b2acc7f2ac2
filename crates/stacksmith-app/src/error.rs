//! Application errors.

use stacksmith_core::{LayoutError, SettingsError};
use stacksmith_render::ExportError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Invalid layout parameters: {0}")]
    Layout(#[from] LayoutError),

    #[error("Export failed: {0}")]
    Export(#[from] ExportError),

    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    #[error("Failed to write preview {}: {source}", .path.display())]
    Preview {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Cannot move image {} to {}: {reason}", .from + 1, .to + 1)]
    Move {
        from: usize,
        to: usize,
        reason: &'static str,
    },
}

/// Result type for application operations.
pub type AppResult<T> = Result<T, AppError>;
