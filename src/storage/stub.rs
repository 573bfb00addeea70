//! Scriptable transport: records every request and lets the test decide
//! when, in what order, and whether each one is answered.

use std::sync::Mutex;

use super::{CancelToken, FetchHandle, FileSource, Resource, ResourceKind, Response, ResponseCallback};

struct Request {
    resource: Resource,
    callback: ResponseCallback,
    token: CancelToken,
}

#[derive(Default)]
pub(crate) struct StubFileSource {
    requests: Mutex<Vec<Request>>,
}

impl StubFileSource {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    pub(crate) fn requested_urls(&self) -> Vec<String> {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .map(|r| r.resource.url.clone())
            .collect()
    }

    pub(crate) fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    /// Answer the most recent request of `kind`, honouring cancellation.
    /// Returns whether the callback ran.
    pub(crate) fn respond(&self, kind: ResourceKind, response: Response) -> bool {
        let index = self.latest(kind);
        self.respond_to(index, response)
    }

    /// Answer request number `index`, honouring cancellation
    pub(crate) fn respond_to(&self, index: usize, response: Response) -> bool {
        let requests = self.requests.lock().unwrap();
        let request = &requests[index];
        if request.token.is_cancelled() {
            return false;
        }
        (request.callback)(response);
        true
    }

    /// Answer request number `index` even if it was cancelled, as a
    /// transport would when the response was already on its way
    pub(crate) fn force_respond_to(&self, index: usize, response: Response) {
        let requests = self.requests.lock().unwrap();
        (requests[index].callback)(response);
    }

    pub(crate) fn is_cancelled(&self, kind: ResourceKind) -> bool {
        let index = self.latest(kind);
        self.requests.lock().unwrap()[index].token.is_cancelled()
    }

    pub(crate) fn is_cancelled_at(&self, index: usize) -> bool {
        self.requests.lock().unwrap()[index].token.is_cancelled()
    }

    fn latest(&self, kind: ResourceKind) -> usize {
        self.requests
            .lock()
            .unwrap()
            .iter()
            .rposition(|r| r.resource.kind == kind)
            .unwrap()
    }
}

impl FileSource for StubFileSource {
    fn request(&self, resource: Resource, callback: ResponseCallback) -> FetchHandle {
        let handle = FetchHandle::new();
        self.requests.lock().unwrap().push(Request {
            resource,
            callback,
            token: handle.token(),
        });
        handle
    }
}
