use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc::UnboundedSender;

use crate::suggestions::{
    ActiveQuery, Candidate, RequestToken, RequestTracker, SuggestionKind, SuggestionSource,
};

/// A finished search, on its way back to the editor
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionEvent {
    pub kind: SuggestionKind,
    pub token: RequestToken,
    pub term: String,
    pub candidates: Vec<Candidate>,
}

/// Debounced, last-request-wins search for one suggestion kind
///
/// `request` never blocks: it tags the query with a fresh token and spawns the
/// search. The spawned task first sleeps the debounce window and gives up if a
/// newer request arrived meanwhile. Whatever it finds is sent back over the
/// event channel, and `apply` drops it unless its token is still current.
/// Once a current answer has arrived the popover is open, even when that
/// answer is empty. In-flight searches are never cancelled; a superseded one simply finishes
/// into the void.
pub struct SuggestionPipeline {
    kind: SuggestionKind,
    source: Arc<dyn SuggestionSource>,
    tracker: RequestTracker,
    debounce: Duration,
    runtime: Handle,
    events: UnboundedSender<SuggestionEvent>,
    /// Query the newest request was issued for
    query: Option<ActiveQuery>,
    candidates: Vec<Candidate>,
    /// A current search has answered since the popover was last closed
    answered: bool,
    highlighted: usize,
}

impl SuggestionPipeline {
    pub fn new(
        kind: SuggestionKind,
        source: Arc<dyn SuggestionSource>,
        debounce: Duration,
        runtime: Handle,
        events: UnboundedSender<SuggestionEvent>,
    ) -> Self {
        Self {
            kind,
            source,
            tracker: RequestTracker::new(),
            debounce,
            runtime,
            events,
            query: None,
            candidates: Vec::new(),
            answered: false,
            highlighted: 0,
        }
    }

    pub fn kind(&self) -> SuggestionKind {
        self.kind
    }

    /// Search for `query`, superseding any outstanding request
    ///
    /// Asking again for the term already outstanding keeps the existing request.
    pub fn request(&mut self, query: ActiveQuery) -> RequestToken {
        if self.query.as_ref() == Some(&query) {
            return self.tracker.latest();
        }

        let token = self.tracker.issue();
        let term = query.term.clone();
        self.query = Some(query);

        let kind = self.kind;
        let tracker = self.tracker.clone();
        let source = Arc::clone(&self.source);
        let events = self.events.clone();
        let debounce = self.debounce;

        self.runtime.spawn(async move {
            tokio::time::sleep(debounce).await;
            if !tracker.is_current(token) {
                return;
            }

            let candidates = match source.search(&term).await {
                Ok(candidates) => candidates,
                Err(e) => {
                    log::warn!("{kind:?} search for {term:?} failed: {e}");
                    Vec::new()
                }
            };

            // The receiver is gone once the editor has been dropped
            let _ = events.send(SuggestionEvent {
                kind,
                token,
                term,
                candidates,
            });
        });

        token
    }

    /// Apply a finished search, returning whether it was current
    pub fn apply(&mut self, event: SuggestionEvent) -> bool {
        if event.kind != self.kind || !self.tracker.is_current(event.token) {
            log::debug!(
                "dropping stale {:?} results for {:?} (token {:?})",
                event.kind,
                event.term,
                event.token
            );
            return false;
        }
        self.candidates = event.candidates;
        self.answered = true;
        self.highlighted = 0;
        true
    }

    /// Hide the popover and drop whatever is still in flight
    pub fn close(&mut self) {
        self.tracker.invalidate();
        self.query = None;
        self.candidates.clear();
        self.answered = false;
        self.highlighted = 0;
    }

    pub fn query(&self) -> Option<&ActiveQuery> {
        self.query.as_ref()
    }

    pub fn candidates(&self) -> &[Candidate] {
        &self.candidates
    }

    /// Showing results, or the empty state when nothing matched
    pub fn is_open(&self) -> bool {
        self.query.is_some() && self.answered
    }

    pub fn highlighted_index(&self) -> usize {
        self.highlighted
    }

    pub fn highlighted(&self) -> Option<&Candidate> {
        self.candidates.get(self.highlighted)
    }

    pub fn move_down(&mut self) {
        if !self.candidates.is_empty() {
            self.highlighted = (self.highlighted + 1) % self.candidates.len();
        }
    }

    pub fn move_up(&mut self) {
        if !self.candidates.is_empty() {
            self.highlighted = self
                .highlighted
                .checked_sub(1)
                .unwrap_or(self.candidates.len() - 1);
        }
    }
}
