//! Magnetic slots for drag reordering.
//!
//! When a drag begins, the vertical position of every slot in the preview is
//! captured. While dragging, the slot whose centre is nearest to the dragged
//! image's centre becomes the insertion candidate, and the remaining images
//! reflow into the other slots.

use crate::layout::PreviewLayout;

/// Slot geometry captured at drag start, in viewport coordinates.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MagneticSlots {
    tops: Vec<f64>,
    heights: Vec<f64>,
    centers: Vec<f64>,
}

impl MagneticSlots {
    /// Build slots from `(top, height)` pairs in stacking order.
    pub fn new(slots: impl IntoIterator<Item = (f64, f64)>) -> Self {
        let mut result = Self::default();
        for (top, height) in slots {
            result.tops.push(top);
            result.heights.push(height);
            result.centers.push(top + height / 2.0);
        }
        result
    }

    /// Capture the slots of a preview layout.
    pub fn from_preview(preview: &PreviewLayout) -> Self {
        let origin_y = preview.origin.y;
        Self::new(
            preview
                .stack
                .items
                .iter()
                .map(|r| (origin_y + r.y as f64, r.height as f64)),
        )
    }

    pub fn top(&self, index: usize) -> Option<f64> {
        self.tops.get(index).copied()
    }

    pub fn height(&self, index: usize) -> Option<f64> {
        self.heights.get(index).copied()
    }

    pub fn tops(&self) -> &[f64] {
        &self.tops
    }

    pub fn centers(&self) -> &[f64] {
        &self.centers
    }

    /// Slot whose centre is nearest to `y`.
    pub fn nearest(&self, y: f64) -> Option<usize> {
        nearest_slot(&self.centers, y)
    }

    pub fn len(&self) -> usize {
        self.tops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tops.is_empty()
    }
}

/// Index of the centre nearest to `y`.
///
/// Ties resolve to the lowest index.
pub fn nearest_slot(centers: &[f64], y: f64) -> Option<usize> {
    let mut best: Option<(usize, f64)> = None;
    for (i, &center) in centers.iter().enumerate() {
        let dist = (center - y).abs();
        match best {
            Some((_, best_dist)) if dist >= best_dist => {}
            _ => best = Some((i, dist)),
        }
    }
    best.map(|(i, _)| i)
}

/// Stack order with `dragged` removed and reinserted at `candidate`.
///
/// Returns original indices in display order.
pub fn preview_order(len: usize, dragged: usize, candidate: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..len).collect();
    if dragged < len && candidate < len {
        let item = order.remove(dragged);
        order.insert(candidate, item);
    }
    order
}
