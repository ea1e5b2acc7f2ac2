//! Per-frame preview render context.

use image::Rgb;
use stacksmith_core::AppState;

/// Color around the composite in the preview.
pub const STAGE_COLOR: Rgb<u8> = Rgb([0, 0, 0]);
/// Selection highlight color.
pub const SELECTION_COLOR: Rgb<u8> = Rgb([0x0A, 0x84, 0xFF]);
/// Selection highlight thickness, in viewport pixels.
pub const HIGHLIGHT_WIDTH: u32 = 2;
/// Gap between a tile's slot and its bitmap, in viewport pixels.
pub const TILE_INSET: u32 = 2;

/// Context for a single preview frame.
pub struct RenderContext<'a> {
    /// The state to render.
    pub state: &'a AppState,
    /// Color outside the composite.
    pub stage_color: Rgb<u8>,
    /// Selection highlight color.
    pub selection_color: Rgb<u8>,
    pub highlight_width: u32,
    pub tile_inset: u32,
}

impl<'a> RenderContext<'a> {
    /// Create a new render context.
    pub fn new(state: &'a AppState) -> Self {
        Self {
            state,
            stage_color: STAGE_COLOR,
            selection_color: SELECTION_COLOR,
            highlight_width: HIGHLIGHT_WIDTH,
            tile_inset: TILE_INSET,
        }
    }
}
