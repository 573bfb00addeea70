use std::collections::HashMap;
use std::collections::hash_map::Entry;
use std::sync::Arc;

use log::{info, warn};

use crate::sprite::StyleImage;

/// Keyed collection of decoded sprites.
///
/// Values are shared, immutable images: an update swaps the `Arc` for a new
/// one and never edits pixels in place, so a reader holding an older `Arc`
/// keeps a consistent image.
#[derive(Debug, Default)]
pub struct ImageStore {
    entries: HashMap<String, Arc<StyleImage>>,
}

impl ImageStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace the image stored under `id`.
    ///
    /// Replacing is only allowed with an image of the same pixel dimensions,
    /// since packed atlas layouts depend on them. A mismatched replacement is
    /// dropped with a warning and the old entry kept.
    ///
    /// Returns the stored image, or `None` if nothing was stored.
    pub fn add(&mut self, id: &str, image: StyleImage) -> Option<Arc<StyleImage>> {
        match self.entries.entry(id.to_string()) {
            Entry::Vacant(slot) => Some(Arc::clone(slot.insert(Arc::new(image)))),
            Entry::Occupied(mut slot) => {
                if !slot.get().is_dimension_compatible(&image) {
                    warn!("Can't change sprite dimensions for '{}'", id);
                    return None;
                }
                let image = Arc::new(image);
                slot.insert(Arc::clone(&image));
                Some(image)
            }
        }
    }

    /// Returns true if an entry was actually removed
    pub fn remove(&mut self, id: &str) -> bool {
        self.entries.remove(id).is_some()
    }

    pub fn get(&self, id: &str) -> Option<&StyleImage> {
        self.lookup(id).map(Arc::as_ref)
    }

    /// Shared handle to an image, for readers that outlive the borrow
    pub fn get_shared(&self, id: &str) -> Option<Arc<StyleImage>> {
        self.lookup(id).cloned()
    }

    pub fn contains(&self, id: &str) -> bool {
        self.entries.contains_key(id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    fn lookup(&self, id: &str) -> Option<&Arc<StyleImage>> {
        let found = self.entries.get(id);
        // An empty store just means nothing is loaded yet
        if found.is_none() && !self.entries.is_empty() {
            info!("Can't find sprite named '{}'", id);
        }
        found
    }
}
