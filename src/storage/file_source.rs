use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::{Resource, Response};

/// Receives the outcome of a request.
///
/// A transport delivers one final outcome per request. Revalidating
/// transports may deliver [`Response::NotModified`] before it, which is
/// why this is `Fn` rather than `FnOnce`.
pub type ResponseCallback = Box<dyn Fn(Response) + Send + 'static>;

/// Resolves sprite resources into bytes
pub trait FileSource {
    /// Start fetching `resource`. The callback may run on any thread and
    /// must not be invoked once the returned handle is cancelled.
    fn request(&self, resource: Resource, callback: ResponseCallback) -> FetchHandle;
}

/// Owner's side of an in-flight request. Dropping it cancels the request.
#[derive(Debug, Default)]
pub struct FetchHandle {
    cancelled: Arc<AtomicBool>,
}

impl FetchHandle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Token the transport checks before delivering
    pub fn token(&self) -> CancelToken {
        CancelToken(Arc::clone(&self.cancelled))
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.cancelled.load(Ordering::Relaxed)
    }
}

impl Drop for FetchHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

/// Transport's side of an in-flight request
#[derive(Debug, Clone)]
pub struct CancelToken(Arc<AtomicBool>);

impl CancelToken {
    pub fn is_cancelled(&self) -> bool {
        self.0.load(Ordering::Relaxed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cancel_reaches_token() {
        let handle = FetchHandle::new();
        let token = handle.token();
        assert!(!token.is_cancelled());

        handle.cancel();
        assert!(token.is_cancelled());
        assert!(handle.is_cancelled());
    }

    #[test]
    fn test_drop_cancels() {
        let handle = FetchHandle::new();
        let token = handle.token();
        drop(handle);
        assert!(token.is_cancelled());
    }
}
