use async_trait::async_trait;

use crate::collaborators::SearchError;
use crate::suggestions::{
    Candidate, DEFAULT_EMOJI_LIMIT, SuggestionKind, SuggestionSettings, SuggestionSource,
};

/// Built-in emoji shortcodes, most used first: (shortcode, glyph, keywords)
pub static EMOJI_CATALOG: &[(&str, &str, &[&str])] = &[
    ("+1", "👍", &["thumbsup", "yes", "agree"]),
    ("smile", "😄", &["happy", "joy"]),
    ("heart", "❤️", &["love"]),
    ("tada", "🎉", &["party", "celebrate", "hooray"]),
    ("white_check_mark", "✅", &["done", "check", "complete"]),
    ("eyes", "👀", &["look", "watching"]),
    ("rocket", "🚀", &["ship", "launch"]),
    ("fire", "🔥", &["hot", "lit"]),
    ("thinking", "🤔", &["hmm", "consider"]),
    ("-1", "👎", &["thumbsdown", "no", "disagree"]),
    ("joy", "😂", &["laugh", "tears"]),
    ("slightly_smiling_face", "🙂", &["smile"]),
    ("wink", "😉", &["flirt"]),
    ("sweat_smile", "😅", &["relief", "phew"]),
    ("pray", "🙏", &["please", "thanks"]),
    ("clap", "👏", &["applause", "bravo"]),
    ("muscle", "💪", &["strong", "flex"]),
    ("wave", "👋", &["hello", "bye"]),
    ("ok_hand", "👌", &["perfect", "okay"]),
    ("raised_hands", "🙌", &["hooray", "praise"]),
    ("warning", "⚠️", &["caution", "alert"]),
    ("x", "❌", &["cross", "wrong"]),
    ("bug", "🐛", &["defect", "insect"]),
    ("memo", "📝", &["note", "write"]),
    ("calendar", "📅", &["date", "schedule"]),
    ("pushpin", "📌", &["pin", "important"]),
    ("bulb", "💡", &["idea", "light"]),
    ("star", "⭐", &["favourite", "favorite"]),
    ("sparkles", "✨", &["shiny", "new"]),
    ("hourglass", "⌛", &["time", "wait"]),
    ("lock", "🔒", &["secure", "private"]),
    ("construction", "🚧", &["wip", "progress"]),
    ("zap", "⚡", &["lightning", "fast"]),
    ("coffee", "☕", &["break", "cafe"]),
    ("sob", "😭", &["cry", "sad"]),
    ("confused", "😕", &["unsure"]),
    ("rotating_light", "🚨", &["alarm", "urgent"]),
    ("100", "💯", &["perfect", "score"]),
    ("crab", "🦀", &["rust", "ferris"]),
    ("sunny", "☀️", &["weather", "sun"]),
];

/// Emoji search over [`EMOJI_CATALOG`]
///
/// Shortcodes starting with the term come first, then shortcodes or keywords
/// containing it. Catalog order breaks ties.
#[derive(Debug, Clone)]
pub struct EmojiSource {
    limit: usize,
}

impl EmojiSource {
    pub fn new() -> Self {
        Self {
            limit: DEFAULT_EMOJI_LIMIT,
        }
    }

    pub fn with_limit(limit: usize) -> Self {
        Self { limit }
    }

    pub fn from_settings(settings: &SuggestionSettings) -> Self {
        Self::with_limit(settings.emoji_limit)
    }

    pub fn matches(&self, term: &str) -> Vec<Candidate> {
        let term = term.to_lowercase();
        let contains = |shortcode: &str, keywords: &[&str]| {
            shortcode.contains(&term) || keywords.iter().any(|keyword| keyword.contains(&term))
        };

        let prefixed = EMOJI_CATALOG
            .iter()
            .filter(|(shortcode, _, _)| shortcode.starts_with(&term));
        let related = EMOJI_CATALOG.iter().filter(|(shortcode, _, keywords)| {
            !shortcode.starts_with(&term) && contains(shortcode, keywords)
        });

        prefixed
            .chain(related)
            .take(self.limit)
            .map(|(shortcode, glyph, _)| candidate(shortcode, glyph))
            .collect()
    }
}

impl Default for EmojiSource {
    fn default() -> Self {
        Self::new()
    }
}

fn candidate(shortcode: &str, glyph: &str) -> Candidate {
    Candidate {
        id: shortcode.to_string(),
        display_name: format!(":{shortcode}:"),
        avatar_ref: glyph.to_string(),
        value: glyph.to_string(),
        kind: SuggestionKind::Emoji,
        is_bot: false,
        is_guest: false,
        is_board_member: false,
    }
}

#[async_trait]
impl SuggestionSource for EmojiSource {
    async fn search(&self, term: &str) -> Result<Vec<Candidate>, SearchError> {
        Ok(self.matches(term))
    }
}
