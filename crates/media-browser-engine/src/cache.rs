use crate::classify::Category;
use crate::models::GalleryItem;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// Last completed scan result per gallery category.
///
/// Created once per process and shared by reference. Writes replace a
/// category's slot wholesale; nothing expires on its own.
#[derive(Debug, Default)]
pub struct GalleryCache {
    slots: Mutex<HashMap<Category, Arc<[GalleryItem]>>>,
}

impl GalleryCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// The last result written for `category`, or empty
    pub fn read(&self, category: Category) -> Arc<[GalleryItem]> {
        // Recover from poisoned mutex (another thread panicked while holding lock)
        let slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        slots
            .get(&category)
            .cloned()
            .unwrap_or_else(|| Arc::from(Vec::<GalleryItem>::new()))
    }

    pub fn write(&self, category: Category, items: Vec<GalleryItem>) {
        let mut slots = self.slots.lock().unwrap_or_else(|e| e.into_inner());
        log::debug!("Caching {} {category} item(s)", items.len());
        slots.insert(category, Arc::from(items));
    }

    pub fn is_populated(&self, category: Category) -> bool {
        !self.read(category).is_empty()
    }
}
