use std::collections::HashMap;
use std::sync::Arc;

use crate::error::SpriteError;
use crate::sprite::StyleImage;

/// Images that were actually merged into the store by one load
pub type Images = HashMap<String, Arc<StyleImage>>;

/// Receives the terminal outcome of each sprite load.
///
/// Both callbacks default to no-ops. For any single load at most one of
/// them fires, once, on the thread that drives the [`SpriteAtlas`](super::SpriteAtlas).
pub trait AtlasObserver {
    fn on_sprite_loaded(&self, _images: &Images) {}
    fn on_sprite_error(&self, _error: &SpriteError) {}
}

/// Observer used when none is registered
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl AtlasObserver for NullObserver {}
