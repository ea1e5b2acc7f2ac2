//! The ordered sequence of stacked images.

use crate::item::{ImageItem, ItemId};

/// Ordered collection of images, top of the stack first.
///
/// The order is the single source of truth for both preview and export.
/// Identities are unique within a sequence.
#[derive(Debug, Default)]
pub struct Sequence {
    items: Vec<ImageItem>,
}

impl Sequence {
    /// Create a new empty sequence.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an item at the bottom of the stack.
    /// Returns false (and drops the item) if its identity is already present.
    pub fn push(&mut self, item: ImageItem) -> bool {
        if self.contains(item.id()) {
            log::warn!("Ignoring duplicate item {}", item.id());
            return false;
        }
        self.items.push(item);
        true
    }

    /// Remove an item by identity.
    pub fn remove(&mut self, id: ItemId) -> Option<ImageItem> {
        let index = self.index_of(id)?;
        Some(self.items.remove(index))
    }

    /// Remove all items.
    pub fn clear(&mut self) {
        self.items.clear();
    }

    /// Move the item at `from` to `to` by popping it and reinserting it.
    ///
    /// `to` is interpreted after the pop, so no index correction is applied
    /// when moving an item further down the stack.
    /// Returns true if the order changed.
    pub fn move_item(&mut self, from: usize, to: usize) -> bool {
        if from >= self.items.len() || to >= self.items.len() || from == to {
            return false;
        }
        let item = self.items.remove(from);
        self.items.insert(to, item);
        true
    }

    /// Get an item by identity.
    pub fn get(&self, id: ItemId) -> Option<&ImageItem> {
        self.items.iter().find(|item| item.id() == id)
    }

    /// Get an item by position.
    pub fn get_at(&self, index: usize) -> Option<&ImageItem> {
        self.items.get(index)
    }

    /// Position of an item in the stack.
    pub fn index_of(&self, id: ItemId) -> Option<usize> {
        self.items.iter().position(|item| item.id() == id)
    }

    pub fn contains(&self, id: ItemId) -> bool {
        self.index_of(id).is_some()
    }

    /// Items in stacking order.
    pub fn iter(&self) -> std::slice::Iter<'_, ImageItem> {
        self.items.iter()
    }

    /// Identities in stacking order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.items.iter().map(ImageItem::id).collect()
    }

    /// Aspect ratios (height / width) in stacking order.
    pub fn aspect_ratios(&self) -> Vec<f64> {
        self.items.iter().map(ImageItem::aspect_ratio).collect()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }
}

impl<'a> IntoIterator for &'a Sequence {
    type Item = &'a ImageItem;
    type IntoIter = std::slice::Iter<'a, ImageItem>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::RgbImage;
    use std::path::PathBuf;

    fn item(w: u32, h: u32) -> ImageItem {
        ImageItem::new(PathBuf::from(format!("{w}x{h}.png")), w, h, RgbImage::new(1, 1)).unwrap()
    }

    fn sequence_of(n: usize) -> (Sequence, Vec<ItemId>) {
        let mut seq = Sequence::new();
        for i in 0..n {
            seq.push(item(100, 100 + i as u32));
        }
        let ids = seq.ids();
        (seq, ids)
    }

    #[test]
    fn test_push_preserves_insertion_order() {
        let (seq, ids) = sequence_of(3);
        assert_eq!(seq.len(), 3);
        assert_eq!(seq.get_at(0).unwrap().id(), ids[0]);
        assert_eq!(seq.get_at(2).unwrap().id(), ids[2]);
        assert_eq!(seq.index_of(ids[1]), Some(1));
    }

    #[test]
    fn test_remove() {
        let (mut seq, ids) = sequence_of(3);
        let removed = seq.remove(ids[1]).unwrap();
        assert_eq!(removed.id(), ids[1]);
        assert_eq!(seq.ids(), vec![ids[0], ids[2]]);
        assert!(seq.remove(ids[1]).is_none());
    }

    #[test]
    fn test_move_item_down() {
        let (mut seq, ids) = sequence_of(4);
        assert!(seq.move_item(0, 2));
        assert_eq!(seq.ids(), vec![ids[1], ids[2], ids[0], ids[3]]);
    }

    #[test]
    fn test_move_item_up() {
        let (mut seq, ids) = sequence_of(4);
        assert!(seq.move_item(3, 1));
        assert_eq!(seq.ids(), vec![ids[0], ids[3], ids[1], ids[2]]);
    }

    #[test]
    fn test_move_item_to_last() {
        let (mut seq, ids) = sequence_of(3);
        assert!(seq.move_item(0, 2));
        assert_eq!(seq.ids(), vec![ids[1], ids[2], ids[0]]);
    }

    #[test]
    fn test_move_item_noop_and_out_of_range() {
        let (mut seq, ids) = sequence_of(3);
        assert!(!seq.move_item(1, 1));
        assert!(!seq.move_item(3, 0));
        assert!(!seq.move_item(0, 3));
        assert_eq!(seq.ids(), ids);
    }

    #[test]
    fn test_aspect_ratios_follow_order() {
        let mut seq = Sequence::new();
        seq.push(item(100, 50));
        seq.push(item(100, 60));
        seq.push(item(100, 40));
        assert_eq!(seq.aspect_ratios(), vec![0.5, 0.6, 0.4]);

        seq.move_item(2, 0);
        assert_eq!(seq.aspect_ratios(), vec![0.4, 0.5, 0.6]);
    }

    #[test]
    fn test_clear() {
        let (mut seq, _) = sequence_of(2);
        seq.clear();
        assert!(seq.is_empty());
    }
}
