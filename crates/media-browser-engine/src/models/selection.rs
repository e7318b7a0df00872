use crate::models::GalleryItem;
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Multi-select state of a gallery.
///
/// A path mapped to `false` is the same as an absent path; only `true`
/// values count as selected.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct SelectionSet {
    marks: HashMap<PathBuf, bool>,
}

impl SelectionSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_selected(&self, path: &Path) -> bool {
        self.marks.get(path).copied().unwrap_or(false)
    }

    pub fn set(&mut self, path: impl Into<PathBuf>, selected: bool) {
        self.marks.insert(path.into(), selected);
    }

    /// Flip a path and return its new state
    pub fn toggle(&mut self, path: &Path) -> bool {
        let selected = !self.is_selected(path);
        self.marks.insert(path.to_path_buf(), selected);
        selected
    }

    pub fn count(&self) -> usize {
        self.marks.values().filter(|selected| **selected).count()
    }

    pub fn is_empty(&self) -> bool {
        self.count() == 0
    }

    pub fn clear(&mut self) {
        self.marks.clear();
    }

    /// Items of `items` that are selected, in gallery order
    pub fn selected_items(&self, items: &[GalleryItem]) -> Vec<GalleryItem> {
        items
            .iter()
            .filter(|item| self.is_selected(&item.path))
            .cloned()
            .collect()
    }
}

/// Selection mode plus the set of selected paths, with the gallery
/// interactions of the mobile UI: long-press to start selecting, tap to
/// toggle, select-all to flip between everything and nothing.
#[derive(Debug, Default, Clone)]
pub struct Selection {
    active: bool,
    set: SelectionSet,
}

/// What a tap on an item should do
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TapAction {
    /// Selection mode is off, open the item in its viewer
    Open(PathBuf),
    /// The item's selection was flipped to the given state
    Toggled(bool),
}

impl Selection {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    pub fn set(&self) -> &SelectionSet {
        &self.set
    }

    pub fn count(&self) -> usize {
        self.set.count()
    }

    pub fn long_press(&mut self, item: &GalleryItem) {
        self.active = true;
        self.set.set(item.path.clone(), true);
    }

    pub fn tap(&mut self, item: &GalleryItem) -> TapAction {
        if self.active {
            TapAction::Toggled(self.set.toggle(&item.path))
        } else {
            TapAction::Open(item.path.clone())
        }
    }

    /// Every item of `items` is selected. Marks for paths outside `items`
    /// do not count.
    pub fn all_selected(&self, items: &[GalleryItem]) -> bool {
        !items.is_empty() && items.iter().all(|item| self.set.is_selected(&item.path))
    }

    /// Select everything, or clear when everything is already selected
    pub fn toggle_all(&mut self, items: &[GalleryItem]) {
        if self.all_selected(items) {
            self.set.clear();
        } else {
            self.set.clear();
            for item in items {
                self.set.set(item.path.clone(), true);
            }
            self.active = true;
        }
    }

    /// Leave selection mode. Returns `false` when it was not active, so the
    /// caller knows the back action should go to the enclosing screen instead.
    pub fn cancel(&mut self) -> bool {
        let was_active = self.active;
        self.active = false;
        self.set.clear();
        was_active
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items() -> Vec<GalleryItem> {
        vec![
            GalleryItem::new("/p/a.jpg", "a.jpg"),
            GalleryItem::new("/p/b.jpg", "b.jpg"),
            GalleryItem::new("/p/c.jpg", "c.jpg"),
        ]
    }

    #[test]
    fn test_false_marks_do_not_count() {
        let mut set = SelectionSet::new();
        set.set("/p/a.jpg", true);
        set.set("/p/b.jpg", false);
        assert_eq!(set.count(), 1);
        assert!(!set.is_selected(Path::new("/p/b.jpg")));
        assert!(!set.is_selected(Path::new("/p/missing.jpg")));
    }

    #[test]
    fn test_toggle_twice_is_unselected() {
        let mut set = SelectionSet::new();
        assert!(set.toggle(Path::new("/p/a.jpg")));
        assert!(!set.toggle(Path::new("/p/a.jpg")));
        assert!(set.is_empty());
    }

    #[test]
    fn test_selected_items_keep_gallery_order() {
        let items = items();
        let mut set = SelectionSet::new();
        set.set("/p/c.jpg", true);
        set.set("/p/a.jpg", true);
        let selected = set.selected_items(&items);
        assert_eq!(selected, vec![items[0].clone(), items[2].clone()]);
    }

    #[test]
    fn test_tap_opens_until_long_press() {
        let items = items();
        let mut selection = Selection::new();
        assert_eq!(
            selection.tap(&items[0]),
            TapAction::Open(PathBuf::from("/p/a.jpg"))
        );

        selection.long_press(&items[1]);
        assert!(selection.is_active());
        assert_eq!(selection.count(), 1);

        assert_eq!(selection.tap(&items[0]), TapAction::Toggled(true));
        assert_eq!(selection.tap(&items[1]), TapAction::Toggled(false));
        assert_eq!(selection.count(), 1);
    }

    #[test]
    fn test_toggle_all_flips_between_all_and_none() {
        let items = items();
        let mut selection = Selection::new();
        selection.toggle_all(&items);
        assert!(selection.all_selected(&items));
        assert!(selection.is_active());

        selection.toggle_all(&items);
        assert_eq!(selection.count(), 0);
    }

    #[test]
    fn test_marks_outside_the_gallery_do_not_make_it_all_selected() {
        let items = items();
        let mut selection = Selection::new();
        selection.long_press(&GalleryItem::new("/p/gone.jpg", "gone.jpg"));
        selection.tap(&items[0]);
        selection.tap(&items[1]);
        assert_eq!(selection.count(), 3);
        assert!(!selection.all_selected(&items));

        selection.toggle_all(&items);
        assert!(selection.all_selected(&items));
        assert_eq!(selection.set().selected_items(&items), items);
        assert_eq!(selection.count(), 3);
    }

    #[test]
    fn test_toggle_all_on_empty_gallery_selects_nothing() {
        let mut selection = Selection::new();
        selection.toggle_all(&[]);
        assert!(!selection.all_selected(&[]));
        assert_eq!(selection.count(), 0);
    }

    #[test]
    fn test_cancel_clears_and_reports_previous_mode() {
        let items = items();
        let mut selection = Selection::new();
        assert!(!selection.cancel());

        selection.long_press(&items[0]);
        assert!(selection.cancel());
        assert!(!selection.is_active());
        assert_eq!(selection.count(), 0);
    }
}
