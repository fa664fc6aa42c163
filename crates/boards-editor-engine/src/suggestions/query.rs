use crate::editing::document::{char_len, char_slice};
use crate::editing::{BlockKey, Document, Selection};
use crate::suggestions::SuggestionKind;

/// A trigger-prefixed fragment before the caret, e.g. `@ad` or `:smi`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActiveQuery {
    pub kind: SuggestionKind,
    pub key: BlockKey,
    /// Char offset of the trigger character
    pub start: usize,
    /// Char offset of the caret
    pub end: usize,
    /// Text between trigger and caret; empty means "top results"
    pub term: String,
}

impl ActiveQuery {
    /// Selection over trigger and term, replaced when a candidate is picked
    pub fn selection(&self) -> Selection {
        Selection::new(self.key, self.start, self.key, self.end)
    }

    /// Trigger followed by the term, as typed
    pub fn typed(&self) -> String {
        format!("{}{}", self.kind.trigger(), self.term)
    }

    /// Find this query again in a document that may have been edited since
    ///
    /// The original range wins if it still holds the typed text. Otherwise the
    /// typed text must occur exactly once in the same block. `None` when the
    /// block is gone or the text is missing or ambiguous.
    pub fn relocate(&self, doc: &Document) -> Option<ActiveQuery> {
        let block = doc.block(&self.key)?;
        let typed = self.typed();
        if self.end <= block.len() && char_slice(&block.text, self.start, self.end) == typed {
            return Some(self.clone());
        }

        let mut found = block
            .text
            .match_indices(typed.as_str())
            .map(|(byte, _)| char_len(&block.text[..byte]));
        let start = found.next()?;
        if found.next().is_some() {
            return None;
        }
        Some(ActiveQuery {
            start,
            end: start + char_len(&typed),
            ..self.clone()
        })
    }
}

/// Find the query for `kind` that the caret is currently typing
///
/// The trigger must start the block or follow whitespace, and nothing between
/// trigger and caret may be whitespace. Non-collapsed selections never query.
pub fn active_query(doc: &Document, sel: &Selection, kind: SuggestionKind) -> Option<ActiveQuery> {
    if !sel.is_collapsed() || !sel.is_valid_in(doc) {
        return None;
    }
    let block = doc.block(&sel.focus_key)?;
    let before: Vec<char> = char_slice(&block.text, 0, sel.focus_offset).chars().collect();
    let trigger = kind.trigger();

    let start = before.iter().rposition(|c| *c == trigger || c.is_whitespace())?;
    if before[start] != trigger {
        return None;
    }
    if start > 0 && !before[start - 1].is_whitespace() {
        return None;
    }

    Some(ActiveQuery {
        kind,
        key: block.key,
        start,
        end: sel.focus_offset,
        term: before[start + 1..].iter().collect(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn query_at_end(text: &str, kind: SuggestionKind) -> Option<String> {
        let doc = Document::from_text(text);
        active_query(&doc, &doc.end_selection(), kind).map(|q| q.term)
    }

    #[rstest]
    #[case("@", Some(""))]
    #[case("@ad", Some("ad"))]
    #[case("hello @ad", Some("ad"))]
    #[case("hello @ad ", None)]
    #[case("mail@ad", None)]
    #[case("no trigger", None)]
    #[case("@first @second", Some("second"))]
    fn test_mention_query(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(
            query_at_end(text, SuggestionKind::Mention).as_deref(),
            expected
        );
    }

    #[rstest]
    #[case(":smi", Some("smi"))]
    #[case("Note: ", None)]
    #[case("time 10:30", None)]
    #[case("great :+1", Some("+1"))]
    fn test_emoji_query(#[case] text: &str, #[case] expected: Option<&str>) {
        assert_eq!(query_at_end(text, SuggestionKind::Emoji).as_deref(), expected);
    }

    #[test]
    fn test_query_uses_caret_block_and_offsets() {
        let doc = Document::from_text("first\nping @bo and more");
        let key = doc.last().key;

        let caret = Selection::caret(key, 8);

        let query = active_query(&doc, &caret, SuggestionKind::Mention).unwrap();

        assert_eq!(query.term, "bo");
        assert_eq!((query.start, query.end), (5, 8));
        assert_eq!(query.selection(), Selection::new(key, 5, key, 8));
    }

    #[test]
    fn test_range_selection_has_no_query() {
        let doc = Document::from_text("@ada");
        let key = doc.first().key;

        let range = Selection::new(key, 0, key, 4);

        assert!(active_query(&doc, &range, SuggestionKind::Mention).is_none());
    }

    fn mention_at_end(doc: &Document) -> ActiveQuery {
        active_query(doc, &doc.end_selection(), SuggestionKind::Mention).unwrap()
    }

    #[test]
    fn test_relocate_keeps_untouched_range() {
        let doc = Document::from_text("hi @al");
        let query = mention_at_end(&doc);

        assert_eq!(query.relocate(&doc), Some(query));
    }

    #[test]
    fn test_relocate_follows_shifted_text() {
        let doc = Document::from_text("@al");
        let query = mention_at_end(&doc);
        let edited = doc.with_block_text(&query.key, "xy@al").unwrap();

        let moved = query.relocate(&edited).unwrap();

        assert_eq!((moved.start, moved.end), (2, 5));
        assert_eq!(moved.term, "al");
    }

    #[rstest]
    #[case("all gone")]
    #[case("@al and @al")]
    fn test_relocate_gives_up_when_missing_or_ambiguous(#[case] text: &str) {
        let doc = Document::from_text("@al");
        let query = mention_at_end(&doc);
        let edited = doc.with_block_text(&query.key, text).unwrap();

        assert_eq!(query.relocate(&edited), None);
    }

    #[test]
    fn test_relocate_needs_the_same_block() {
        let doc = Document::from_text("@al");
        let query = mention_at_end(&doc);

        assert_eq!(query.relocate(&Document::from_text("@al")), None);
    }
}
