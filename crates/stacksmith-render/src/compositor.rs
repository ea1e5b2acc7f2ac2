//! Compositing of the preview frame and the export canvas.
//!
//! Both modes draw the same layout: the background fills the canvas, each
//! image is scaled to its slot, and the logo is blended into the bottom band.
//! Preview draws from the per-item preview bitmaps at viewport scale; export
//! re-reads every source at full resolution.

use crate::blend::{Clip, fill_rect, overlay_rgba, stroke_rect};
use crate::cache::PreviewCache;
use crate::export::ExportResult;
use crate::logo::{LogoCache, load_logo, report};
use crate::renderer::RenderContext;
use image::imageops::{self, FilterType};
use image::{Rgb, RgbImage, RgbaImage};
use stacksmith_core::decode::open_source;
use stacksmith_core::{AppState, ImageItem, LayoutError, LogoOverlay, PixelRect, StackLayout, place_logo};

/// Preview compositor. Owns the tile cache and the loaded logo.
#[derive(Debug, Default)]
pub struct Compositor {
    cache: PreviewCache,
    logo: LogoCache,
}

impl Compositor {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cache(&self) -> &PreviewCache {
        &self.cache
    }

    /// Render the preview at viewport size.
    ///
    /// Returns `None` when there is no preview layout (no viewport, or an
    /// empty sequence). While a drag is in progress the dragged image is drawn
    /// last, at its live position, from a fresh scale that is never cached.
    pub fn render_preview(&mut self, ctx: &RenderContext) -> Option<RgbImage> {
        let state = ctx.state;
        let preview = state.preview_layout()?;
        let viewport = state.viewport()?;

        let frame_w = viewport.size.width.round().max(1.0) as u32;
        let frame_h = viewport.size.height.round().max(1.0) as u32;
        let mut frame = RgbImage::from_pixel(frame_w, frame_h, ctx.stage_color);

        let stack = &preview.stack;
        let ox = preview.origin.x.round() as i64;
        let oy = preview.origin.y.round() as i64;
        let background = Rgb(state.params().background.rgb());
        fill_rect(&mut frame, ox, oy, stack.width, stack.height, background);

        self.cache.sync_width(stack.width);
        self.cache.retain_items(state.sequence());

        let display_tops = state.display_tops();
        let dragged = state.drag().dragged_id();
        let selected = state.selection();
        let inset = ctx.tile_inset;
        let mut floating = None;

        for (i, (item, rect)) in state.sequence().iter().zip(&stack.items).enumerate() {
            let top = display_tops
                .as_ref()
                .and_then(|tops| tops.get(i))
                .map(|y| y.round() as i64)
                .unwrap_or(oy + rect.y);
            if dragged == Some(item.id()) {
                floating = Some((item, rect, top));
                continue;
            }

            let size = tile_size(rect, inset);
            if size.0 > 0 && size.1 > 0 {
                let tile = self
                    .cache
                    .get_or_insert_with(item.id(), size, || scale_tile(item, size));
                imageops::replace(&mut frame, tile, ox + rect.x + inset as i64, top + inset as i64);
            }
            if selected == Some(item.id()) {
                highlight(&mut frame, ctx, ox + rect.x, top, rect);
            }
        }

        if let Some((item, rect, top)) = floating {
            let size = tile_size(rect, inset);
            if size.0 > 0 && size.1 > 0 {
                let tile = scale_tile(item, size);
                imageops::replace(&mut frame, &tile, ox + rect.x + inset as i64, top + inset as i64);
            }
            if selected == Some(item.id()) {
                highlight(&mut frame, ctx, ox + rect.x, top, rect);
            }
        }

        if let Some(overlay) = state.logo() {
            if let Some(logo) = self.logo.get(&overlay.path) {
                let clip = Clip::new(ox, oy, stack.width, stack.height);
                draw_logo(&mut frame, stack, overlay, logo, preview.scale, (ox, oy), clip);
            }
        }

        Some(frame)
    }
}

/// Compose the full-resolution export canvas.
///
/// Returns `Ok(None)` for an empty sequence. Every source is re-read from
/// disk, resampled with Lanczos3 to its exact slot size and pasted opaquely.
pub fn compose_export(state: &AppState) -> ExportResult<Option<RgbImage>> {
    let layout = match state.export_layout() {
        Ok(layout) => layout,
        Err(LayoutError::Empty) => return Ok(None),
        Err(e) => return Err(e.into()),
    };

    let background = Rgb(state.params().background.rgb());
    let mut canvas = RgbImage::from_pixel(layout.width, layout.height, background);

    for (item, rect) in state.sequence().iter().zip(&layout.items) {
        let source = open_source(item.source_path())?.to_rgb8();
        let scaled = imageops::resize(&source, rect.width, rect.height, FilterType::Lanczos3);
        imageops::replace(&mut canvas, &scaled, rect.x, rect.y);
    }

    if let Some(overlay) = state.logo() {
        match load_logo(&overlay.path) {
            Ok(logo) => {
                let clip = Clip::of(&canvas);
                draw_logo(&mut canvas, &layout, overlay, &logo, 1.0, (0, 0), clip);
            }
            Err(e) => report(&e),
        }
    }

    log::debug!(
        "Composed {}x{} export from {} image(s)",
        layout.width,
        layout.height,
        layout.len()
    );
    Ok(Some(canvas))
}

fn tile_size(rect: &PixelRect, inset: u32) -> (u32, u32) {
    (
        rect.width.saturating_sub(2 * inset),
        rect.height.saturating_sub(2 * inset),
    )
}

fn scale_tile(item: &ImageItem, (width, height): (u32, u32)) -> RgbImage {
    imageops::resize(item.preview(), width, height, FilterType::CatmullRom)
}

fn highlight(frame: &mut RgbImage, ctx: &RenderContext, x: i64, y: i64, rect: &PixelRect) {
    stroke_rect(
        frame,
        x,
        y,
        rect.width,
        rect.height,
        ctx.highlight_width,
        ctx.selection_color,
    );
}

fn draw_logo(
    canvas: &mut RgbImage,
    layout: &StackLayout,
    overlay: &LogoOverlay,
    logo: &RgbaImage,
    offset_scale: f64,
    (ox, oy): (i64, i64),
    clip: Clip,
) {
    let Some(placement) = place_logo(layout, overlay, logo.dimensions(), offset_scale) else {
        return;
    };
    let scaled = imageops::resize(logo, placement.width, placement.height, FilterType::Lanczos3);
    overlay_rgba(canvas, &scaled, ox + placement.x, oy + placement.y, clip);
}
