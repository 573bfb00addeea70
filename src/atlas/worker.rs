use std::sync::Arc;
use std::sync::mpsc::Sender;

use log::debug;

use super::session::{AtlasEvent, SessionId};
use crate::error::SpriteError;
use crate::sprite::SpriteDecoder;

/// Runs the decoder off the owning thread.
///
/// Results are sent back as [`AtlasEvent::Decoded`] through the same channel
/// the fetch callbacks use, so only the owning thread ever touches the store.
pub struct DecodeWorker {
    decoder: Arc<dyn SpriteDecoder>,
    pool: Option<rayon::ThreadPool>,
}

impl DecodeWorker {
    /// Decode on rayon's global pool
    pub fn new(decoder: impl SpriteDecoder + 'static) -> Self {
        Self {
            decoder: Arc::new(decoder),
            pool: None,
        }
    }

    /// Decode on a dedicated pool of `threads` threads
    pub fn with_threads(
        decoder: impl SpriteDecoder + 'static,
        threads: usize,
    ) -> Result<Self, SpriteError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("sprite-decode-{}", i))
            .build()?;

        Ok(Self {
            decoder: Arc::new(decoder),
            pool: Some(pool),
        })
    }

    pub(crate) fn dispatch(
        &self,
        session: SessionId,
        metadata: Vec<u8>,
        image: Vec<u8>,
        reply: Sender<AtlasEvent>,
    ) {
        debug!(
            "Decoding session {} ({} + {} bytes)",
            session,
            metadata.len(),
            image.len()
        );

        let decoder = Arc::clone(&self.decoder);
        let job = move || {
            let result = decoder.decode(&metadata, &image);
            // The receiver is gone only if the atlas itself was dropped
            let _ = reply.send(AtlasEvent::Decoded { session, result });
        };

        match &self.pool {
            Some(pool) => pool.spawn(job),
            None => rayon::spawn(job),
        }
    }
}
