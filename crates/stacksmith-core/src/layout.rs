//! Layout solver: canvas size and per-image placement for export and preview.
//!
//! Every image is scaled to the target width. Heights are rounded to whole
//! pixels per image and accumulated top to bottom with a fixed gap, followed
//! by a bottom band that hosts the optional logo. The preview layout is the
//! export layout scaled uniformly to fit a padded viewport.

use crate::logo::LogoOverlay;
use crate::params::LayoutParameters;
use kurbo::{Point, Rect, Size};
use thiserror::Error;

/// Smallest fitted extent along a padded viewport axis.
pub const MIN_FIT_EXTENT: f64 = 100.0;
/// Horizontal padding around the preview.
pub const DEFAULT_PADDING_X: f64 = 60.0;
/// Vertical padding around the preview.
pub const DEFAULT_PADDING_Y: f64 = 40.0;

/// Errors produced while computing a layout.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum LayoutError {
    #[error("Nothing to lay out")]
    Empty,

    #[error("Invalid {field}: {value:?} is not a whole number")]
    InvalidNumber { field: &'static str, value: String },

    #[error("Target width must be positive, got {0}")]
    InvalidWidth(i64),

    #[error("Spacing must not be negative, got {0}")]
    NegativeSpacing(i64),

    #[error("Bottom margin must not be negative, got {0}")]
    NegativeMargin(i64),

    #[error("Unknown background {0:?}")]
    UnknownBackground(String),

    #[error("Invalid aspect ratio {0}")]
    InvalidAspectRatio(f64),

    #[error("Viewport has no area")]
    EmptyViewport,
}

/// Result type for layout operations.
pub type LayoutResult<T> = Result<T, LayoutError>;

/// Integer pixel rectangle, relative to the canvas origin.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PixelRect {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

impl PixelRect {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self { x, y, width, height }
    }

    pub fn bottom(&self) -> i64 {
        self.y + self.height as i64
    }

    pub fn center_y(&self) -> f64 {
        self.y as f64 + self.height as f64 / 2.0
    }

    pub fn to_rect(&self) -> Rect {
        Rect::new(
            self.x as f64,
            self.y as f64,
            self.x as f64 + self.width as f64,
            self.bottom() as f64,
        )
    }
}

/// Drawing area the preview is fitted into.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub size: Size,
    /// Total padding per axis, split evenly on both sides.
    pub padding: Size,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            size: Size::new(width, height),
            padding: Size::ZERO,
        }
    }

    pub fn with_padding(mut self, x: f64, y: f64) -> Self {
        self.padding = Size::new(x, y);
        self
    }

    /// Viewport with the default preview padding.
    pub fn padded(width: f64, height: f64) -> Self {
        Self::new(width, height).with_padding(DEFAULT_PADDING_X, DEFAULT_PADDING_Y)
    }

    /// Area the composite must fit inside.
    ///
    /// A padded axis never shrinks below [`MIN_FIT_EXTENT`] (or the full
    /// viewport extent, when that is smaller).
    pub fn fit_size(&self) -> Size {
        let fit = |extent: f64, pad: f64| {
            if pad > 0.0 {
                (extent - pad).max(MIN_FIT_EXTENT.min(extent))
            } else {
                extent
            }
        };
        Size::new(
            fit(self.size.width, self.padding.width),
            fit(self.size.height, self.padding.height),
        )
    }

    pub fn is_empty(&self) -> bool {
        !(self.size.width > 0.0 && self.size.height > 0.0)
    }
}

/// Placement of every image on a canvas.
#[derive(Debug, Clone, PartialEq)]
pub struct StackLayout {
    /// Canvas width; also the width of every image.
    pub width: u32,
    /// Total canvas height including the bottom band.
    pub height: u32,
    pub spacing: u32,
    pub bottom_margin: u32,
    /// Image rectangles in sequence order.
    pub items: Vec<PixelRect>,
}

impl StackLayout {
    /// Top of the bottom band.
    pub fn band_top(&self) -> i64 {
        self.height as i64 - self.bottom_margin as i64
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

/// The export layout scaled and centred in a viewport.
#[derive(Debug, Clone, PartialEq)]
pub struct PreviewLayout {
    pub scale: f64,
    /// Top-left of the canvas within the viewport.
    pub origin: Point,
    /// Scaled layout, relative to `origin`.
    pub stack: StackLayout,
}

impl PreviewLayout {
    /// Canvas bounds in viewport coordinates.
    pub fn canvas_rect(&self) -> Rect {
        Rect::from_origin_size(
            self.origin,
            Size::new(self.stack.width as f64, self.stack.height as f64),
        )
    }

    /// Bounds of an image in viewport coordinates.
    pub fn item_rect(&self, index: usize) -> Option<Rect> {
        let rect = self.stack.items.get(index)?;
        Some(rect.to_rect() + self.origin.to_vec2())
    }

    /// Index of the image under a viewport point.
    pub fn hit_test(&self, point: Point) -> Option<usize> {
        (0..self.stack.items.len()).find(|&i| {
            self.item_rect(i)
                .map(|r| r.contains(point))
                .unwrap_or(false)
        })
    }
}

/// Export layout plus the preview derived from it.
#[derive(Debug, Clone, PartialEq)]
pub struct SolvedLayout {
    pub export: StackLayout,
    /// Present when a viewport was supplied.
    pub preview: Option<PreviewLayout>,
}

/// Compute the export layout and, if a viewport is given, the preview layout.
pub fn solve(
    aspect_ratios: &[f64],
    params: &LayoutParameters,
    viewport: Option<&Viewport>,
) -> LayoutResult<SolvedLayout> {
    let export = solve_export(aspect_ratios, params)?;
    let preview = viewport.map(|vp| solve_preview(&export, vp)).transpose()?;
    Ok(SolvedLayout { export, preview })
}

/// Compute the full-resolution layout.
pub fn solve_export(aspect_ratios: &[f64], params: &LayoutParameters) -> LayoutResult<StackLayout> {
    params.validate()?;
    if aspect_ratios.is_empty() {
        return Err(LayoutError::Empty);
    }

    let width = params.target_width;
    let mut items = Vec::with_capacity(aspect_ratios.len());
    let mut y: i64 = 0;
    for (i, &ratio) in aspect_ratios.iter().enumerate() {
        if !(ratio.is_finite() && ratio > 0.0) {
            return Err(LayoutError::InvalidAspectRatio(ratio));
        }
        if i > 0 {
            y += params.spacing as i64;
        }
        // Extremely wide sources still occupy one row.
        let height = round_px(width as f64 * ratio).max(1);
        items.push(PixelRect::new(0, y, width, height));
        y += height as i64;
    }
    let height = y + params.bottom_margin as i64;

    Ok(StackLayout {
        width,
        height: clamp_u32(height),
        spacing: params.spacing,
        bottom_margin: params.bottom_margin,
        items,
    })
}

/// Scale an export layout to fit a viewport.
///
/// Each preview height is the rounded, scaled export height of the same
/// image, and positions are re-accumulated from those heights so the
/// preview never drifts from the export order.
pub fn solve_preview(export: &StackLayout, viewport: &Viewport) -> LayoutResult<PreviewLayout> {
    if viewport.is_empty() {
        return Err(LayoutError::EmptyViewport);
    }
    if export.is_empty() {
        return Err(LayoutError::Empty);
    }

    let fit = viewport.fit_size();
    let scale = (fit.width / export.width as f64).min(fit.height / export.height as f64);

    let width = round_px(export.width as f64 * scale);
    let spacing = round_px(export.spacing as f64 * scale);
    let bottom_margin = round_px(export.bottom_margin as f64 * scale);

    let mut items = Vec::with_capacity(export.items.len());
    let mut y: i64 = 0;
    for (i, rect) in export.items.iter().enumerate() {
        if i > 0 {
            y += spacing as i64;
        }
        let height = round_px(rect.height as f64 * scale);
        items.push(PixelRect::new(0, y, width, height));
        y += height as i64;
    }
    let height = clamp_u32(y + bottom_margin as i64);

    let origin = Point::new(
        ((viewport.size.width - width as f64) / 2.0).floor(),
        ((viewport.size.height - height as f64) / 2.0).floor(),
    );

    Ok(PreviewLayout {
        scale,
        origin,
        stack: StackLayout {
            width,
            height,
            spacing,
            bottom_margin,
            items,
        },
    })
}

/// Where a logo lands on a canvas.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LogoPlacement {
    pub x: i64,
    pub y: i64,
    pub width: u32,
    pub height: u32,
}

/// Place a logo in the bottom band of a layout.
///
/// The logo is `scale_percent` of the canvas width wide, keeps its native
/// aspect ratio and is centred in the band before the offset is applied.
/// `offset_scale` converts the export-pixel offset into the layout's units
/// (1.0 for export, the preview scale for preview). The result may extend
/// outside the canvas; callers clip when drawing.
pub fn place_logo(
    layout: &StackLayout,
    logo: &LogoOverlay,
    native_size: (u32, u32),
    offset_scale: f64,
) -> Option<LogoPlacement> {
    let (native_w, native_h) = native_size;
    if native_w == 0 || native_h == 0 || layout.width == 0 {
        return None;
    }

    let width = round_px(layout.width as f64 * logo.scale_percent() as f64 / 100.0).max(1);
    let height = round_px(native_h as f64 * width as f64 / native_w as f64).max(1);

    let anchor_x = (layout.width as i64 - width as i64).div_euclid(2);
    let anchor_y =
        layout.band_top() + (layout.bottom_margin as i64 - height as i64).div_euclid(2);

    Some(LogoPlacement {
        x: anchor_x + (logo.offset_x() as f64 * offset_scale).round() as i64,
        y: anchor_y + (logo.offset_y() as f64 * offset_scale).round() as i64,
        width,
        height,
    })
}

fn round_px(value: f64) -> u32 {
    clamp_u32(value.round() as i64)
}

fn clamp_u32(value: i64) -> u32 {
    value.clamp(0, u32::MAX as i64) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::params::Background;

    fn params(width: u32, spacing: u32, bottom: u32) -> LayoutParameters {
        LayoutParameters::new(width, spacing, bottom, Background::Light)
    }

    #[test]
    fn test_export_layout_heights_and_positions() {
        let layout = solve_export(&[0.5, 0.6, 0.4], &params(1000, 20, 200)).unwrap();
        assert_eq!(layout.width, 1000);
        assert_eq!(layout.height, 1740);
        assert_eq!(layout.items[0], PixelRect::new(0, 0, 1000, 500));
        assert_eq!(layout.items[1], PixelRect::new(0, 520, 1000, 600));
        assert_eq!(layout.items[2], PixelRect::new(0, 1140, 1000, 400));
        assert_eq!(layout.band_top(), 1540);
    }

    #[test]
    fn test_export_layout_single_item() {
        let layout = solve_export(&[1.0], &params(2000, 20, 250)).unwrap();
        assert_eq!(layout.height, 2250);
        assert_eq!(layout.items.len(), 1);
    }

    #[test]
    fn test_export_layout_zero_spacing_and_margin() {
        let layout = solve_export(&[0.5, 0.5], &params(100, 0, 0)).unwrap();
        assert_eq!(layout.height, 100);
        assert_eq!(layout.items[1].y, 50);
    }

    #[test]
    fn test_export_heights_rounded_per_item() {
        // 333 * 0.75 = 249.75 -> 250 and 333 * (1/3) = 111.0
        let layout = solve_export(&[0.75, 1.0 / 3.0], &params(333, 10, 5)).unwrap();
        assert_eq!(layout.items[0].height, 250);
        assert_eq!(layout.items[1].height, 111);
        assert_eq!(layout.height, 250 + 10 + 111 + 5);
    }

    #[test]
    fn test_empty_sequence_is_error() {
        assert_eq!(solve_export(&[], &params(100, 0, 0)).unwrap_err(), LayoutError::Empty);
    }

    #[test]
    fn test_invalid_inputs() {
        assert_eq!(
            solve_export(&[1.0], &params(0, 0, 0)).unwrap_err(),
            LayoutError::InvalidWidth(0)
        );
        assert!(matches!(
            solve_export(&[0.0], &params(10, 0, 0)).unwrap_err(),
            LayoutError::InvalidAspectRatio(_)
        ));
        assert!(matches!(
            solve_export(&[f64::NAN], &params(10, 0, 0)).unwrap_err(),
            LayoutError::InvalidAspectRatio(_)
        ));
    }

    #[test]
    fn test_viewport_fit_size() {
        let vp = Viewport::new(400.0, 300.0);
        assert_eq!(vp.fit_size(), Size::new(400.0, 300.0));

        let vp = Viewport::padded(520.0, 1000.0);
        assert_eq!(vp.fit_size(), Size::new(460.0, 960.0));

        let vp = Viewport::padded(120.0, 90.0);
        assert_eq!(vp.fit_size(), Size::new(100.0, 90.0));
    }

    #[test]
    fn test_preview_scale_is_min_of_axes() {
        let export = solve_export(&[0.5, 0.6, 0.4], &params(1000, 20, 200)).unwrap();
        let vp = Viewport::new(500.0, 1740.0);
        let preview = solve_preview(&export, &vp).unwrap();
        assert!((preview.scale - 0.5).abs() < 1e-12);
        assert_eq!(preview.stack.width, 500);

        let vp = Viewport::new(2000.0, 870.0);
        let preview = solve_preview(&export, &vp).unwrap();
        assert!((preview.scale - 0.5).abs() < 1e-12);
        assert_eq!(preview.origin, Point::new(750.0, 0.0));
    }

    #[test]
    fn test_preview_heights_track_export_heights() {
        let ratios = [0.5, 0.6, 0.4, 1.37, 0.71, 0.9999];
        for &(tw, sp, bm) in &[(1000, 20, 200), (2000, 20, 250), (777, 13, 0), (3001, 0, 999)] {
            let export = solve_export(&ratios, &params(tw, sp, bm)).unwrap();
            for &(vw, vh) in &[(520.0, 1000.0), (300.0, 300.0), (1920.0, 1080.0), (37.0, 2000.0)] {
                let preview = solve_preview(&export, &Viewport::new(vw, vh)).unwrap();
                let scale = preview.scale;
                let expected_w = (tw as f64 * scale).round() as u32;
                assert_eq!(preview.stack.width, expected_w);

                let mut y = 0i64;
                for (i, (p, e)) in preview.stack.items.iter().zip(&export.items).enumerate() {
                    if i > 0 {
                        y += (sp as f64 * scale).round() as i64;
                    }
                    assert_eq!(p.height, (e.height as f64 * scale).round() as u32);
                    assert_eq!(p.y, y);
                    y += p.height as i64;
                }
                // Composite fits the viewport up to rounding.
                assert!(preview.stack.width as f64 <= vw + 1.0);
                assert!(preview.stack.height as f64 <= vh + ratios.len() as f64 + 2.0);
            }
        }
    }

    #[test]
    fn test_preview_is_centred() {
        let export = solve_export(&[1.0], &params(100, 0, 0)).unwrap();
        let preview = solve_preview(&export, &Viewport::padded(520.0, 400.0)).unwrap();
        // fit = 460 x 360, scale = 3.6
        assert_eq!(preview.stack.width, 360);
        assert_eq!(preview.origin, Point::new(80.0, 20.0));
        assert_eq!(preview.canvas_rect(), Rect::new(80.0, 20.0, 440.0, 380.0));
    }

    #[test]
    fn test_preview_rejects_empty_viewport() {
        let export = solve_export(&[1.0], &params(100, 0, 0)).unwrap();
        assert_eq!(
            solve_preview(&export, &Viewport::new(0.0, 100.0)).unwrap_err(),
            LayoutError::EmptyViewport
        );
    }

    #[test]
    fn test_hit_test() {
        let export = solve_export(&[0.5, 0.5], &params(100, 10, 20)).unwrap();
        let preview = solve_preview(&export, &Viewport::new(100.0, 130.0)).unwrap();
        assert_eq!(preview.scale, 1.0);
        assert_eq!(preview.hit_test(Point::new(50.0, 25.0)), Some(0));
        assert_eq!(preview.hit_test(Point::new(50.0, 55.0)), None);
        assert_eq!(preview.hit_test(Point::new(50.0, 70.0)), Some(1));
        assert_eq!(preview.hit_test(Point::new(50.0, 125.0)), None);
    }

    #[test]
    fn test_solve_with_and_without_viewport() {
        let p = params(1000, 20, 200);
        let solved = solve(&[0.5], &p, None).unwrap();
        assert!(solved.preview.is_none());

        // Export canvas is 1000 x 700.
        let solved = solve(&[0.5], &p, Some(&Viewport::new(500.0, 350.0))).unwrap();
        let preview = solved.preview.unwrap();
        assert!((preview.scale - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_logo_centred_in_band() {
        let layout = solve_export(&[0.5, 0.6, 0.4], &params(1000, 20, 200)).unwrap();
        let logo = LogoOverlay::new("logo.png");
        let placement = place_logo(&layout, &logo, (400, 100), 1.0).unwrap();
        // 20% of 1000 = 200 wide, 50 tall.
        assert_eq!(placement.width, 200);
        assert_eq!(placement.height, 50);
        assert_eq!(placement.x, 400);
        assert_eq!(placement.y, 1540 + 75);
    }

    #[test]
    fn test_logo_offset_scaled() {
        let layout = solve_export(&[1.0], &params(1000, 0, 200)).unwrap();
        let logo = LogoOverlay::new("logo.png").with_offset(100, -40);
        let full = place_logo(&layout, &logo, (100, 100), 1.0).unwrap();
        let half = place_logo(&layout, &logo, (100, 100), 0.5).unwrap();
        assert_eq!(full.x - half.x, 50);
        assert_eq!(full.y - half.y, -20);
    }

    #[test]
    fn test_logo_taller_than_band_floors_toward_top() {
        let layout = solve_export(&[1.0], &params(100, 0, 5)).unwrap();
        let logo = LogoOverlay::new("logo.png").with_scale(20);
        // 20 x 20 logo in a 5px band: (5 - 20) div 2 = -8
        let placement = place_logo(&layout, &logo, (10, 10), 1.0).unwrap();
        assert_eq!(placement.y, 100 - 8);
    }

    #[test]
    fn test_logo_zero_native_size() {
        let layout = solve_export(&[1.0], &params(100, 0, 5)).unwrap();
        assert!(place_logo(&layout, &LogoOverlay::new("l.png"), (0, 10), 1.0).is_none());
    }
}
