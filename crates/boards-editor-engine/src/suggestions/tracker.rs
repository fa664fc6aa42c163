use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

/// Generation tag carried by one search request
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestToken(pub u64);

/// Monotonic request counter shared between a pipeline and its in-flight tasks
///
/// A result may be applied only while its token is the latest one issued.
/// Clones observe the same counter, so a spawned search can also notice that it
/// has been superseded before doing any work.
#[derive(Debug, Clone, Default)]
pub struct RequestTracker {
    latest: Arc<AtomicU64>,
}

impl RequestTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start a new request, superseding every earlier one
    pub fn issue(&self) -> RequestToken {
        RequestToken(self.latest.fetch_add(1, Ordering::SeqCst) + 1)
    }

    /// Supersede every outstanding request without starting a new one
    pub fn invalidate(&self) {
        self.latest.fetch_add(1, Ordering::SeqCst);
    }

    pub fn is_current(&self, token: RequestToken) -> bool {
        self.latest.load(Ordering::SeqCst) == token.0
    }

    pub fn latest(&self) -> RequestToken {
        RequestToken(self.latest.load(Ordering::SeqCst))
    }
}
