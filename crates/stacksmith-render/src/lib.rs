//! Stacksmith Render Library
//!
//! Software compositing for Stacksmith: the interactive preview frame, the
//! full-resolution export canvas and JPEG persistence.

mod blend;
mod cache;
mod compositor;
mod export;
mod logo;
mod renderer;

pub use blend::{Clip, fill_rect, overlay_rgba, stroke_rect};
pub use cache::PreviewCache;
pub use compositor::{Compositor, compose_export};
pub use export::{EXPORT_DPI, ExportError, ExportOptions, ExportResult, JPEG_QUALITY, export_composite, save_jpeg};
pub use logo::{LogoCache, OverlayError, OverlayResult, load_logo};
pub use renderer::{HIGHLIGHT_WIDTH, RenderContext, SELECTION_COLOR, STAGE_COLOR, TILE_INSET};
