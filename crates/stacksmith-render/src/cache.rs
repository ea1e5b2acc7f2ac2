//! Scaled preview tiles, keyed by item identity.

use image::RgbImage;
use stacksmith_core::{ItemId, Sequence};
use std::collections::HashMap;

/// Cache of preview tiles at the current preview width.
///
/// The whole cache is dropped when the preview width changes. A tile whose
/// size no longer matches the requested size is re-rendered on lookup.
#[derive(Debug, Default)]
pub struct PreviewCache {
    width: Option<u32>,
    tiles: HashMap<ItemId, RgbImage>,
}

impl PreviewCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preview width the cached tiles were rendered for.
    pub fn width(&self) -> Option<u32> {
        self.width
    }

    /// Record the current preview width. Returns true if the cache was cleared.
    pub fn sync_width(&mut self, width: u32) -> bool {
        if self.width == Some(width) {
            return false;
        }
        let cleared = !self.tiles.is_empty();
        if cleared {
            log::debug!("Preview width changed to {width}; dropping {} tile(s)", self.tiles.len());
        }
        self.tiles.clear();
        self.width = Some(width);
        cleared
    }

    /// Drop tiles for items no longer in the sequence.
    pub fn retain_items(&mut self, sequence: &Sequence) {
        self.tiles.retain(|id, _| sequence.contains(*id));
    }

    /// Cached tile of the given size, rendering it with `render` if needed.
    pub fn get_or_insert_with(
        &mut self,
        id: ItemId,
        size: (u32, u32),
        render: impl FnOnce() -> RgbImage,
    ) -> &RgbImage {
        let stale = self.tiles.get(&id).is_none_or(|tile| tile.dimensions() != size);
        if stale {
            self.tiles.insert(id, render());
        }
        &self.tiles[&id]
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.tiles.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.tiles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tiles.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stacksmith_core::ImageItem;
    use std::path::PathBuf;
    use uuid::Uuid;

    #[test]
    fn test_width_change_clears() {
        let mut cache = PreviewCache::new();
        assert!(!cache.sync_width(300));
        cache.get_or_insert_with(Uuid::new_v4(), (4, 4), || RgbImage::new(4, 4));
        assert_eq!(cache.len(), 1);

        // Same width: spacing or margin edits keep the tiles.
        assert!(!cache.sync_width(300));
        assert_eq!(cache.len(), 1);

        assert!(cache.sync_width(280));
        assert!(cache.is_empty());
        assert_eq!(cache.width(), Some(280));
    }

    #[test]
    fn test_get_or_insert_renders_once() {
        let mut cache = PreviewCache::new();
        let id = Uuid::new_v4();
        let mut calls = 0;
        cache.get_or_insert_with(id, (2, 2), || {
            calls += 1;
            RgbImage::new(2, 2)
        });
        cache.get_or_insert_with(id, (2, 2), || {
            calls += 1;
            RgbImage::new(2, 2)
        });
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_size_mismatch_rerenders() {
        let mut cache = PreviewCache::new();
        let id = Uuid::new_v4();
        cache.get_or_insert_with(id, (2, 2), || RgbImage::new(2, 2));
        let tile = cache.get_or_insert_with(id, (2, 3), || RgbImage::new(2, 3));
        assert_eq!(tile.dimensions(), (2, 3));
    }

    #[test]
    fn test_retain_items() {
        let mut sequence = Sequence::new();
        let item = ImageItem::new(PathBuf::from("a.png"), 2, 2, RgbImage::new(2, 2)).unwrap();
        let kept = item.id();
        sequence.push(item);

        let mut cache = PreviewCache::new();
        cache.get_or_insert_with(kept, (1, 1), || RgbImage::new(1, 1));
        let gone = Uuid::new_v4();
        cache.get_or_insert_with(gone, (1, 1), || RgbImage::new(1, 1));

        cache.retain_items(&sequence);
        assert!(cache.contains(kept));
        assert!(!cache.contains(gone));
    }
}
