use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Weak};
use std::time::Duration;

use log::{debug, info};

use super::observer::{AtlasObserver, Images, NullObserver};
use super::session::{AtlasEvent, LoadSession, SessionId, Transition};
use super::store::ImageStore;
use super::worker::DecodeWorker;
use crate::error::SpriteError;
use crate::sprite::{DecodedImages, SpriteSheetDecoder, StyleImage};
use crate::storage::FileSource;

/// Loads a sprite into an [`ImageStore`] and reports the outcome.
///
/// The atlas is driven by a single owning thread. Fetch callbacks and the
/// decode worker never touch it directly; they post [`AtlasEvent`]s to an
/// internal channel which the owner drains with [`poll`](Self::poll) or
/// [`wait`](Self::wait). Observer callbacks run inside those calls (or
/// inside `load` for an empty URL).
pub struct SpriteAtlas {
    pixel_ratio: f32,
    store: ImageStore,
    loaded: bool,
    observer: Option<Weak<dyn AtlasObserver>>,
    session: Option<LoadSession>,
    next_session: u64,
    worker: DecodeWorker,
    events: Sender<AtlasEvent>,
    inbox: Receiver<AtlasEvent>,
}

impl SpriteAtlas {
    /// Atlas decoding the standard JSON + PNG sprite format on rayon's
    /// global pool
    pub fn new(pixel_ratio: f32) -> Self {
        Self::with_worker(
            pixel_ratio,
            DecodeWorker::new(SpriteSheetDecoder::new(pixel_ratio)),
        )
    }

    pub fn with_worker(pixel_ratio: f32, worker: DecodeWorker) -> Self {
        let (events, inbox) = mpsc::channel();
        Self {
            pixel_ratio,
            store: ImageStore::new(),
            loaded: false,
            observer: None,
            session: None,
            next_session: 0,
            worker,
            events,
            inbox,
        }
    }

    /// Start loading the sprite at `url`, superseding any load in flight.
    ///
    /// Returns as soon as both requests are issued. An empty URL means the
    /// style has no sprite: the atlas is marked loaded and the observer is
    /// told so before this returns.
    pub fn load(&mut self, url: &str, file_source: &dyn FileSource) {
        self.retire_session();

        if url.is_empty() {
            self.mark_as_loaded();
            self.notify(|observer| observer.on_sprite_loaded(&Images::new()));
            return;
        }

        self.next_session += 1;
        let mut session = LoadSession::new(SessionId(self.next_session));
        session.start(url, self.pixel_ratio, file_source, &self.events);
        debug!("Loading sprite {} as session {}", url, session.id());
        self.session = Some(session);
    }

    /// Handle every event that has already arrived. Never blocks.
    pub fn poll(&mut self) -> usize {
        let mut handled = 0;
        while let Ok(event) = self.inbox.try_recv() {
            self.handle(event);
            handled += 1;
        }
        handled
    }

    /// Block up to `timeout` for the next event, then handle everything
    /// that is queued. Returns the number of events handled.
    pub fn wait(&mut self, timeout: Duration) -> usize {
        match self.inbox.recv_timeout(timeout) {
            Ok(event) => {
                self.handle(event);
                1 + self.poll()
            }
            Err(_) => 0,
        }
    }

    fn handle(&mut self, event: AtlasEvent) {
        let id = event.session();
        let Some(session) = self.session.as_mut().filter(|s| s.id() == id) else {
            debug!("Dropping stale event from session {}", id);
            return;
        };

        match event {
            AtlasEvent::Fetched { kind, response, .. } => match session.on_response(kind, response) {
                Transition::Wait => {}
                Transition::Decode { metadata, image } => {
                    self.worker
                        .dispatch(id, metadata, image, self.events.clone());
                }
                Transition::Fail(message) => {
                    self.session = None;
                    self.on_error(SpriteError::Transport(message));
                }
            },
            AtlasEvent::Decoded { result, .. } => {
                session.finish(result.is_ok());
                self.session = None;
                match result {
                    Ok(images) => self.on_parsed(images),
                    Err(e) => self.on_error(e.into()),
                }
            }
        }
    }

    fn on_parsed(&mut self, parsed: DecodedImages) {
        self.mark_as_loaded();

        let mut result = Images::with_capacity(parsed.len());
        for (id, image) in parsed {
            if let Some(added) = self.store.add(&id, image) {
                result.insert(id, added);
            }
        }

        self.notify(|observer| observer.on_sprite_loaded(&result));
    }

    fn on_error(&mut self, error: SpriteError) {
        self.notify(|observer| observer.on_sprite_error(&error));
    }

    fn notify(&self, f: impl FnOnce(&dyn AtlasObserver)) {
        match self.observer.as_ref().and_then(Weak::upgrade) {
            Some(observer) => f(observer.as_ref()),
            None => f(&NullObserver),
        }
    }

    fn retire_session(&mut self) {
        if let Some(mut session) = self.session.take() {
            debug!("Session {} superseded", session.id());
            session.cancel();
        }
    }

    /// Register the observer. Only a weak reference is kept, so a dropped
    /// observer is simply never called.
    pub fn set_observer<O: AtlasObserver + 'static>(&mut self, observer: &Arc<O>) {
        let observer: Weak<dyn AtlasObserver> = Arc::<O>::downgrade(observer);
        self.observer = Some(observer);
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn mark_as_loaded(&mut self) {
        self.loaded = true;
    }

    /// True once any load, including an empty one, has succeeded
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// True while a load is waiting on fetches or decode
    pub fn is_loading(&self) -> bool {
        self.session.is_some()
    }

    pub fn pixel_ratio(&self) -> f32 {
        self.pixel_ratio
    }

    /// Returns the image if it was actually stored
    pub fn add_image(&mut self, id: &str, image: StyleImage) -> Option<Arc<StyleImage>> {
        self.store.add(id, image)
    }

    /// Returns true if an image was actually removed
    pub fn remove_image(&mut self, id: &str) -> bool {
        self.store.remove(id)
    }

    pub fn get_image(&self, id: &str) -> Option<&StyleImage> {
        self.store.get(id)
    }

    pub fn get_shared(&self, id: &str) -> Option<Arc<StyleImage>> {
        self.store.get_shared(id)
    }

    pub fn store(&self) -> &ImageStore {
        &self.store
    }

    pub fn len(&self) -> usize {
        self.store.len()
    }

    pub fn is_empty(&self) -> bool {
        self.store.is_empty()
    }

    pub fn ids(&self) -> impl Iterator<Item = &str> {
        self.store.ids()
    }

    pub fn dump_debug_logs(&self) {
        info!("SpriteAtlas::loaded: {}", self.loaded);
        info!("SpriteAtlas::images: {}", self.store.len());
    }
}

impl Drop for SpriteAtlas {
    fn drop(&mut self) {
        self.retire_session();
    }
}
