use std::sync::Arc;

use tokio::runtime::Handle;
use tokio::sync::mpsc::{UnboundedReceiver, unbounded_channel};

use crate::editing::{BlockKey, Document, Selection};
use crate::suggestions::{
    ActiveQuery, Candidate, SuggestionEvent, SuggestionKind, SuggestionPipeline,
    SuggestionSettings, SuggestionSource, active_query,
};

/// Both suggestion pipelines plus the channel their results come back on
pub struct SuggestionHub {
    mentions: SuggestionPipeline,
    emoji: SuggestionPipeline,
    events: UnboundedReceiver<SuggestionEvent>,
    /// Trigger the user closed with Escape; stays closed until the caret
    /// leaves that query
    dismissed: Option<(BlockKey, usize)>,
}

impl SuggestionHub {
    pub fn new(
        runtime: Handle,
        mention_source: Arc<dyn SuggestionSource>,
        emoji_source: Arc<dyn SuggestionSource>,
        settings: &SuggestionSettings,
    ) -> Self {
        let (tx, rx) = unbounded_channel();
        Self {
            mentions: SuggestionPipeline::new(
                SuggestionKind::Mention,
                mention_source,
                settings.debounce,
                runtime.clone(),
                tx.clone(),
            ),
            emoji: SuggestionPipeline::new(
                SuggestionKind::Emoji,
                emoji_source,
                settings.debounce,
                runtime,
                tx,
            ),
            events: rx,
            dismissed: None,
        }
    }

    pub fn pipeline(&self, kind: SuggestionKind) -> &SuggestionPipeline {
        match kind {
            SuggestionKind::Mention => &self.mentions,
            SuggestionKind::Emoji => &self.emoji,
        }
    }

    pub fn pipeline_mut(&mut self, kind: SuggestionKind) -> &mut SuggestionPipeline {
        match kind {
            SuggestionKind::Mention => &mut self.mentions,
            SuggestionKind::Emoji => &mut self.emoji,
        }
    }

    /// Re-run query detection after the document or caret changed
    pub fn refresh(&mut self, doc: &Document, sel: &Selection) {
        let queries = SuggestionKind::ALL.map(|kind| (kind, active_query(doc, sel, kind)));

        // forget a dismissal once the caret has left that trigger
        if !queries
            .iter()
            .filter_map(|(_, query)| query.as_ref())
            .any(|query| self.is_dismissed(query))
        {
            self.dismissed = None;
        }

        for (kind, query) in queries {
            match query {
                Some(query) if !self.is_dismissed(&query) => {
                    self.pipeline_mut(kind).request(query);
                }
                Some(_) => {}
                None => self.pipeline_mut(kind).close(),
            }
        }
    }

    fn is_dismissed(&self, query: &ActiveQuery) -> bool {
        self.dismissed == Some((query.key, query.start))
    }

    /// Apply every finished search, returning whether any result was current
    pub fn drain(&mut self) -> bool {
        let mut applied = false;
        while let Ok(event) = self.events.try_recv() {
            applied |= self.pipeline_mut(event.kind).apply(event);
        }
        applied
    }

    /// The popover currently showing, if any
    pub fn open_kind(&self) -> Option<SuggestionKind> {
        SuggestionKind::ALL
            .into_iter()
            .find(|kind| self.pipeline(*kind).is_open())
    }

    /// Close the open popover until the caret moves to a different trigger
    pub fn dismiss(&mut self) {
        if let Some(kind) = self.open_kind()
            && let Some(query) = self.pipeline(kind).query()
        {
            self.dismissed = Some((query.key, query.start));
        }
        self.close_all();
    }

    pub fn close_all(&mut self) {
        self.mentions.close();
        self.emoji.close();
    }

    /// The highlighted candidate of the open popover and the query it replaces
    pub fn highlighted(&self) -> Option<(ActiveQuery, Candidate)> {
        let pipeline = self.pipeline(self.open_kind()?);
        Some((pipeline.query()?.clone(), pipeline.highlighted()?.clone()))
    }
}
