//! Typeahead suggestions for mentions (`@`) and emoji (`:`).
//!
//! Two pipelines of the same shape run side by side. Each document change
//! looks for an [`ActiveQuery`] before the caret and hands its term to the
//! pipeline, which waits out a debounce window on the tokio runtime, searches
//! its [`SuggestionSource`] and sends the result back as a
//! [`SuggestionEvent`]. Results are applied only if their [`RequestToken`] is
//! still the newest one, so a slow early search can never overwrite the
//! results of a later keystroke.

use std::time::Duration;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::collaborators::{NameDisplay, SearchError};

pub mod emoji;
pub mod hub;
pub mod mention;
pub mod pipeline;
pub mod query;
pub mod tracker;

pub use emoji::{EMOJI_CATALOG, EmojiSource};
pub use hub::SuggestionHub;
pub use mention::MentionSource;
pub use pipeline::{SuggestionEvent, SuggestionPipeline};
pub use query::{ActiveQuery, active_query};
pub use tracker::{RequestToken, RequestTracker};

/// Quiet period before a search is sent
pub const DEFAULT_DEBOUNCE: Duration = Duration::from_millis(200);
/// Cap on locally filtered member results
pub const DEFAULT_MEMBER_LIMIT: usize = 10;
pub const DEFAULT_EMOJI_LIMIT: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SuggestionKind {
    Mention,
    Emoji,
}

impl SuggestionKind {
    pub const ALL: [SuggestionKind; 2] = [SuggestionKind::Mention, SuggestionKind::Emoji];

    /// Character that opens this kind of popover
    pub fn trigger(&self) -> char {
        match self {
            SuggestionKind::Mention => '@',
            SuggestionKind::Emoji => ':',
        }
    }
}

/// One entry in a suggestion popover
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Candidate {
    pub id: String,
    pub display_name: String,
    pub avatar_ref: String,
    /// Text inserted when picked: the username for mentions, the glyph for emoji
    pub value: String,
    pub kind: SuggestionKind,
    pub is_bot: bool,
    pub is_guest: bool,
    pub is_board_member: bool,
}

impl Candidate {
    /// Text that replaces the trigger and term
    pub fn insertion(&self) -> String {
        match self.kind {
            SuggestionKind::Mention => format!("@{} ", self.value),
            SuggestionKind::Emoji => format!("{} ", self.value),
        }
    }
}

/// Something that can answer a suggestion query
#[async_trait]
pub trait SuggestionSource: Send + Sync {
    async fn search(&self, term: &str) -> Result<Vec<Candidate>, SearchError>;
}

/// Tuning shared by the hub (debounce) and the built-in sources (caps, names)
///
/// See [`MentionSource::with_settings`] and [`EmojiSource::from_settings`].
#[derive(Debug, Clone, PartialEq)]
pub struct SuggestionSettings {
    pub debounce: Duration,
    pub member_limit: usize,
    pub emoji_limit: usize,
    pub name_display: NameDisplay,
}

impl Default for SuggestionSettings {
    fn default() -> Self {
        Self {
            debounce: DEFAULT_DEBOUNCE,
            member_limit: DEFAULT_MEMBER_LIMIT,
            emoji_limit: DEFAULT_EMOJI_LIMIT,
            name_display: NameDisplay::default(),
        }
    }
}
