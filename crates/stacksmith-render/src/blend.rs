//! Pixel-level drawing onto RGB canvases with clipping.

use image::{Rgb, RgbImage, Rgba, RgbaImage};

/// Half-open clip rectangle in canvas pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Clip {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl Clip {
    pub fn new(x: i64, y: i64, width: u32, height: u32) -> Self {
        Self {
            x0: x,
            y0: y,
            x1: x + width as i64,
            y1: y + height as i64,
        }
    }

    /// The full extent of an image.
    pub fn of(image: &RgbImage) -> Self {
        Self::new(0, 0, image.width(), image.height())
    }

    pub fn intersect(&self, other: &Clip) -> Clip {
        Clip {
            x0: self.x0.max(other.x0),
            y0: self.y0.max(other.y0),
            x1: self.x1.min(other.x1),
            y1: self.y1.min(other.y1),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.x0 >= self.x1 || self.y0 >= self.y1
    }
}

/// Fill a rectangle with a solid color.
pub fn fill_rect(canvas: &mut RgbImage, x: i64, y: i64, width: u32, height: u32, color: Rgb<u8>) {
    let area = Clip::new(x, y, width, height).intersect(&Clip::of(canvas));
    if area.is_empty() {
        return;
    }
    for py in area.y0..area.y1 {
        for px in area.x0..area.x1 {
            canvas.put_pixel(px as u32, py as u32, color);
        }
    }
}

/// Draw a rectangle outline of `stroke` pixels, inside the rectangle bounds.
pub fn stroke_rect(
    canvas: &mut RgbImage,
    x: i64,
    y: i64,
    width: u32,
    height: u32,
    stroke: u32,
    color: Rgb<u8>,
) {
    let stroke = stroke.min(width).min(height);
    if stroke == 0 {
        return;
    }
    let (w, h, s) = (width as i64, height as i64, stroke as i64);
    fill_rect(canvas, x, y, width, stroke, color);
    fill_rect(canvas, x, y + h - s, width, stroke, color);
    fill_rect(canvas, x, y, stroke, height, color);
    fill_rect(canvas, x + w - s, y, stroke, height, color);
}

/// Alpha-composite `top` onto `base` at `(x, y)`, limited to `clip`.
///
/// Straight (non-premultiplied) alpha; the base stays opaque.
pub fn overlay_rgba(base: &mut RgbImage, top: &RgbaImage, x: i64, y: i64, clip: Clip) {
    let area = Clip::new(x, y, top.width(), top.height())
        .intersect(&clip)
        .intersect(&Clip::of(base));
    if area.is_empty() {
        return;
    }
    for py in area.y0..area.y1 {
        for px in area.x0..area.x1 {
            let fg = top.get_pixel((px - x) as u32, (py - y) as u32);
            let alpha = fg[3];
            if alpha == 0 {
                continue;
            }
            let target = base.get_pixel_mut(px as u32, py as u32);
            *target = if alpha == 255 {
                Rgb([fg[0], fg[1], fg[2]])
            } else {
                blend_pixel(target, fg)
            };
        }
    }
}

fn blend_pixel(bg: &Rgb<u8>, fg: &Rgba<u8>) -> Rgb<u8> {
    let alpha = fg[3] as f32 / 255.0;
    let inv = 1.0 - alpha;
    let mix = |f: u8, b: u8| (f as f32 * alpha + b as f32 * inv).round().clamp(0.0, 255.0) as u8;
    Rgb([mix(fg[0], bg[0]), mix(fg[1], bg[1]), mix(fg[2], bg[2])])
}
