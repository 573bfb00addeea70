use std::fmt;
use std::mem;
use std::sync::mpsc::Sender;

use log::debug;

use crate::error::DecodeError;
use crate::sprite::DecodedImages;
use crate::storage::{FetchHandle, FileSource, Resource, ResourceKind, Response};

/// Identifies one call to `load()`; events from older sessions are stale
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SessionId(pub(crate) u64);

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Messages marshalled back onto the thread that owns the atlas
#[derive(Debug)]
pub(crate) enum AtlasEvent {
    Fetched {
        session: SessionId,
        kind: ResourceKind,
        response: Response,
    },
    Decoded {
        session: SessionId,
        result: Result<DecodedImages, DecodeError>,
    },
}

impl AtlasEvent {
    pub(crate) fn session(&self) -> SessionId {
        match self {
            AtlasEvent::Fetched { session, .. } | AtlasEvent::Decoded { session, .. } => *session,
        }
    }
}

/// One half of the join
#[derive(Debug)]
enum Branch {
    Pending(FetchHandle),
    Committed(Vec<u8>),
}

impl Branch {
    fn is_committed(&self) -> bool {
        matches!(self, Branch::Committed(_))
    }

    fn cancel(&self) {
        if let Branch::Pending(handle) = self {
            handle.cancel();
        }
    }
}

#[derive(Debug)]
enum SessionState {
    Idle,
    AwaitingBoth { metadata: Branch, image: Branch },
    Decoding,
    Done,
    Failed,
    Cancelled,
}

impl SessionState {
    fn name(&self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::AwaitingBoth { .. } => "awaiting",
            SessionState::Decoding => "decoding",
            SessionState::Done => "done",
            SessionState::Failed => "failed",
            SessionState::Cancelled => "cancelled",
        }
    }
}

/// What the owner has to do after feeding a response into the session
#[derive(Debug, PartialEq, Eq)]
pub(crate) enum Transition {
    Wait,
    /// Both halves are in. The buffers leave the session here, which can
    /// only happen once.
    Decode { metadata: Vec<u8>, image: Vec<u8> },
    /// A fetch failed; the sibling has been cancelled
    Fail(String),
}

/// Join barrier over the sprite index and sprite sheet fetches
#[derive(Debug)]
pub(crate) struct LoadSession {
    id: SessionId,
    state: SessionState,
}

impl LoadSession {
    pub(crate) fn new(id: SessionId) -> Self {
        Self {
            id,
            state: SessionState::Idle,
        }
    }

    pub(crate) fn id(&self) -> SessionId {
        self.id
    }

    pub(crate) fn is_terminal(&self) -> bool {
        matches!(
            self.state,
            SessionState::Done | SessionState::Failed | SessionState::Cancelled
        )
    }

    /// Issue both requests. Responses come back through `events`.
    pub(crate) fn start(
        &mut self,
        url: &str,
        pixel_ratio: f32,
        file_source: &dyn FileSource,
        events: &Sender<AtlasEvent>,
    ) {
        if !matches!(self.state, SessionState::Idle) {
            debug!("Session {} already started", self.id);
            return;
        }

        let metadata = request(
            self.id,
            Resource::sprite_json(url, pixel_ratio),
            file_source,
            events,
        );
        let image = request(
            self.id,
            Resource::sprite_image(url, pixel_ratio),
            file_source,
            events,
        );

        self.state = SessionState::AwaitingBoth {
            metadata: Branch::Pending(metadata),
            image: Branch::Pending(image),
        };
    }

    pub(crate) fn on_response(&mut self, kind: ResourceKind, response: Response) -> Transition {
        let SessionState::AwaitingBoth { metadata, image } = &mut self.state else {
            debug!(
                "Session {} ignoring {:?} response while {}",
                self.id,
                kind,
                self.state.name()
            );
            return Transition::Wait;
        };

        let branch = match kind {
            ResourceKind::SpriteJson => metadata,
            ResourceKind::SpriteImage => image,
        };
        if branch.is_committed() {
            debug!("Session {} ignoring repeated {:?} response", self.id, kind);
            return Transition::Wait;
        }

        let data = match response {
            Response::Error(message) => {
                self.cancel_fetches();
                self.state = SessionState::Failed;
                return Transition::Fail(message);
            }
            Response::NotModified => return Transition::Wait,
            Response::NoContent => Vec::new(),
            Response::Data(data) => data,
        };
        *branch = Branch::Committed(data);

        self.take_buffers()
    }

    /// Record the decode outcome
    pub(crate) fn finish(&mut self, success: bool) {
        if matches!(self.state, SessionState::Decoding) {
            self.state = if success {
                SessionState::Done
            } else {
                SessionState::Failed
            };
        }
    }

    /// Cancel whatever is still outstanding. No-op once terminal.
    pub(crate) fn cancel(&mut self) {
        if self.is_terminal() {
            return;
        }
        debug!("Cancelling session {} while {}", self.id, self.state.name());
        self.cancel_fetches();
        self.state = SessionState::Cancelled;
    }

    fn cancel_fetches(&self) {
        if let SessionState::AwaitingBoth { metadata, image } = &self.state {
            metadata.cancel();
            image.cancel();
        }
    }

    fn take_buffers(&mut self) -> Transition {
        match mem::replace(&mut self.state, SessionState::Decoding) {
            SessionState::AwaitingBoth {
                metadata: Branch::Committed(metadata),
                image: Branch::Committed(image),
            } => Transition::Decode { metadata, image },
            other => {
                self.state = other;
                Transition::Wait
            }
        }
    }
}

impl Drop for LoadSession {
    fn drop(&mut self) {
        self.cancel();
    }
}

fn request(
    session: SessionId,
    resource: Resource,
    file_source: &dyn FileSource,
    events: &Sender<AtlasEvent>,
) -> FetchHandle {
    let kind = resource.kind;
    let events = events.clone();
    file_source.request(
        resource,
        Box::new(move |response| {
            // The receiver is gone only if the atlas itself was dropped
            let _ = events.send(AtlasEvent::Fetched {
                session,
                kind,
                response,
            });
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::storage::stub::StubFileSource;
    use std::sync::mpsc;

    fn started(source: &StubFileSource) -> (LoadSession, mpsc::Receiver<AtlasEvent>) {
        let (tx, rx) = mpsc::channel();
        let mut session = LoadSession::new(SessionId(1));
        session.start("sprites/sprite", 1.0, source, &tx);
        (session, rx)
    }

    /// Feed every queued event back into the session
    fn pump(session: &mut LoadSession, rx: &mpsc::Receiver<AtlasEvent>) -> Vec<Transition> {
        rx.try_iter()
            .map(|event| match event {
                AtlasEvent::Fetched { kind, response, .. } => session.on_response(kind, response),
                AtlasEvent::Decoded { .. } => Transition::Wait,
            })
            .collect()
    }

    #[test]
    fn test_start_requests_both_resources() {
        let source = StubFileSource::new();
        let (_session, _rx) = started(&source);
        assert_eq!(
            source.requested_urls(),
            vec!["sprites/sprite.json", "sprites/sprite.png"]
        );
    }

    #[test]
    fn test_decode_after_both_in_either_order() {
        for first in [ResourceKind::SpriteJson, ResourceKind::SpriteImage] {
            let source = StubFileSource::new();
            let (mut session, rx) = started(&source);
            let second = match first {
                ResourceKind::SpriteJson => ResourceKind::SpriteImage,
                ResourceKind::SpriteImage => ResourceKind::SpriteJson,
            };

            source.respond(first, Response::Data(b"first".to_vec()));
            assert_eq!(pump(&mut session, &rx), vec![Transition::Wait]);

            source.respond(second, Response::Data(b"second".to_vec()));
            let transitions = pump(&mut session, &rx);
            assert_eq!(transitions.len(), 1);
            let Transition::Decode { metadata, image } = &transitions[0] else {
                panic!("expected decode, got {:?}", transitions[0]);
            };
            let (json, png): (&[u8], &[u8]) = match first {
                ResourceKind::SpriteJson => (b"first", b"second"),
                ResourceKind::SpriteImage => (b"second", b"first"),
            };
            assert_eq!(metadata.as_slice(), json);
            assert_eq!(image.as_slice(), png);
        }
    }

    #[test]
    fn test_repeated_response_never_redispatches() {
        let source = StubFileSource::new();
        let (mut session, rx) = started(&source);

        source.respond(ResourceKind::SpriteJson, Response::Data(b"{}".to_vec()));
        source.respond(ResourceKind::SpriteImage, Response::Data(b"png".to_vec()));
        source.force_respond_to(0, Response::Data(b"again".to_vec()));
        source.force_respond_to(1, Response::Data(b"again".to_vec()));

        let transitions = pump(&mut session, &rx);
        let decodes = transitions
            .iter()
            .filter(|t| matches!(t, Transition::Decode { .. }))
            .count();
        assert_eq!(decodes, 1);
    }

    #[test]
    fn test_not_modified_keeps_waiting() {
        let source = StubFileSource::new();
        let (mut session, rx) = started(&source);

        source.respond(ResourceKind::SpriteJson, Response::NotModified);
        source.respond(ResourceKind::SpriteImage, Response::Data(b"png".to_vec()));
        assert_eq!(
            pump(&mut session, &rx),
            vec![Transition::Wait, Transition::Wait]
        );
        assert!(!source.is_cancelled(ResourceKind::SpriteJson));

        source.respond(ResourceKind::SpriteJson, Response::Data(b"{}".to_vec()));
        assert_eq!(
            pump(&mut session, &rx),
            vec![Transition::Decode {
                metadata: b"{}".to_vec(),
                image: b"png".to_vec()
            }]
        );
    }

    #[test]
    fn test_no_content_commits_empty_buffers() {
        let source = StubFileSource::new();
        let (mut session, rx) = started(&source);

        source.respond(ResourceKind::SpriteJson, Response::NoContent);
        source.respond(ResourceKind::SpriteImage, Response::NoContent);

        assert_eq!(
            pump(&mut session, &rx),
            vec![
                Transition::Wait,
                Transition::Decode {
                    metadata: Vec::new(),
                    image: Vec::new()
                }
            ]
        );
    }

    #[test]
    fn test_error_cancels_sibling() {
        let source = StubFileSource::new();
        let (mut session, rx) = started(&source);

        source.respond(
            ResourceKind::SpriteJson,
            Response::Error("Failed by the test case".to_string()),
        );

        assert_eq!(
            pump(&mut session, &rx),
            vec![Transition::Fail("Failed by the test case".to_string())]
        );
        assert!(session.is_terminal());
        assert!(source.is_cancelled(ResourceKind::SpriteImage));
        assert!(!source.respond(ResourceKind::SpriteImage, Response::Data(b"png".to_vec())));
    }

    #[test]
    fn test_responses_after_failure_are_ignored() {
        let source = StubFileSource::new();
        let (mut session, rx) = started(&source);

        source.respond(ResourceKind::SpriteImage, Response::Error("boom".to_string()));
        source.force_respond_to(0, Response::Data(b"{}".to_vec()));

        assert_eq!(
            pump(&mut session, &rx),
            vec![Transition::Fail("boom".to_string()), Transition::Wait]
        );
    }

    #[test]
    fn test_drop_cancels_outstanding_fetches() {
        let source = StubFileSource::new();
        let (mut session, rx) = started(&source);

        source.respond(ResourceKind::SpriteJson, Response::Data(b"{}".to_vec()));
        pump(&mut session, &rx);
        drop(session);

        assert!(source.is_cancelled(ResourceKind::SpriteImage));
    }

    #[test]
    fn test_finish_after_decode() {
        let source = StubFileSource::new();
        let (mut session, rx) = started(&source);
        source.respond(ResourceKind::SpriteJson, Response::NoContent);
        source.respond(ResourceKind::SpriteImage, Response::NoContent);
        pump(&mut session, &rx);
        assert!(!session.is_terminal());

        session.finish(true);
        assert!(session.is_terminal());
    }
}
