use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

use crate::editing::Selection;

/// Stable identifier for a block that survives edits to its text
#[derive(Copy, Clone, Eq, PartialEq, Hash, Debug, Serialize, Deserialize)]
pub struct BlockKey(pub Uuid);

impl BlockKey {
    /// Generate a fresh key for a newly created block
    pub fn generate() -> Self {
        Self(Uuid::new_v4())
    }
}

impl std::fmt::Display for BlockKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One addressable line of text in the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Block {
    pub key: BlockKey,
    pub text: String,
}

impl Block {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            key: BlockKey::generate(),
            text: text.into(),
        }
    }

    /// Length of the block text in chars (the unit selection offsets use)
    pub fn len(&self) -> usize {
        char_len(&self.text)
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Ordered sequence of text blocks
///
/// A `Document` is a value: every edit produces a new `Document` and the old
/// one stays valid, which is what the undo history relies on. Blocks are kept
/// in a flat list and referenced by [`BlockKey`] rather than by position, so a
/// [`Selection`] stays meaningful while neighbouring blocks change.
///
/// The list is never empty; an empty document is a single empty block.
/// Deserializing goes through [`Document::from_blocks`], so a stored document
/// that breaks this is rejected rather than loaded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "StoredDocument")]
pub struct Document {
    blocks: Vec<Block>,
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    #[error("a document needs at least one block")]
    NoBlocks,

    #[error("block key {0} is used more than once")]
    DuplicateKey(BlockKey),
}

/// Wire shape of a [`Document`], checked before it becomes one
#[derive(Deserialize)]
struct StoredDocument {
    blocks: Vec<Block>,
}

impl TryFrom<StoredDocument> for Document {
    type Error = DocumentError;

    fn try_from(stored: StoredDocument) -> Result<Self, Self::Error> {
        Document::from_blocks(stored.blocks)
    }
}

impl Document {
    /// Create a document from plain text, one block per line
    pub fn from_text(text: &str) -> Self {
        let blocks = text.split('\n').map(Block::new).collect();
        Self { blocks }
    }

    /// Create a document from prebuilt blocks
    ///
    /// Fails for an empty list or when two blocks share a key.
    pub fn from_blocks(blocks: Vec<Block>) -> Result<Self, DocumentError> {
        if blocks.is_empty() {
            return Err(DocumentError::NoBlocks);
        }
        let mut seen = std::collections::HashSet::new();
        if let Some(block) = blocks.iter().find(|block| !seen.insert(block.key)) {
            return Err(DocumentError::DuplicateKey(block.key));
        }
        Ok(Self { blocks })
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn block(&self, key: &BlockKey) -> Option<&Block> {
        self.blocks.iter().find(|block| block.key == *key)
    }

    /// Position of a block in reading order
    pub fn index_of(&self, key: &BlockKey) -> Option<usize> {
        self.blocks.iter().position(|block| block.key == *key)
    }

    pub fn first(&self) -> &Block {
        &self.blocks[0]
    }

    pub fn last(&self) -> &Block {
        &self.blocks[self.blocks.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.blocks.len()
    }

    /// True for a single empty block; a blank line still counts as text
    pub fn is_empty(&self) -> bool {
        self.blocks.len() == 1 && self.blocks[0].is_empty()
    }

    /// The document as plain text with embedded markdown, lines joined by `\n`
    pub fn plain_text(&self) -> String {
        self.blocks
            .iter()
            .map(|block| block.text.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }

    /// Collapsed selection at the very end of the document
    pub fn end_selection(&self) -> Selection {
        let last = self.last();
        Selection::caret(last.key, last.len())
    }

    /// Collapsed selection at the very start of the document
    pub fn start_selection(&self) -> Selection {
        Selection::caret(self.first().key, 0)
    }

    /// Copy of the document with one block's text replaced, key unchanged
    pub fn with_block_text(&self, key: &BlockKey, text: impl Into<String>) -> Option<Document> {
        let index = self.index_of(key)?;
        let mut blocks = self.blocks.clone();
        blocks[index].text = text.into();
        Some(Document { blocks })
    }

    /// Copy of the document with `range` of blocks swapped for `replacement`
    pub(crate) fn splice(
        &self,
        range: std::ops::RangeInclusive<usize>,
        replacement: Vec<Block>,
    ) -> Document {
        let mut blocks = self.blocks.clone();
        blocks.splice(range, replacement);
        Document { blocks }
    }
}

impl Default for Document {
    fn default() -> Self {
        Self::from_text("")
    }
}

/// Number of chars in `text`
pub(crate) fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Byte index of the char at `char_offset`, clamped to the end of `text`
pub(crate) fn byte_offset(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(index, _)| index)
        .unwrap_or(text.len())
}

/// Substring between two char offsets
pub(crate) fn char_slice(text: &str, start: usize, end: usize) -> &str {
    let start = byte_offset(text, start);
    let end = byte_offset(text, end).max(start);
    &text[start..end]
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_from_text_splits_lines_into_blocks() {
        let doc = Document::from_text("one\ntwo\nthree");

        let texts: Vec<&str> = doc.blocks().iter().map(|b| b.text.as_str()).collect();
        assert_eq!(texts, vec!["one", "two", "three"]);
        assert_eq!(doc.plain_text(), "one\ntwo\nthree");
    }

    #[test]
    fn test_empty_text_is_single_empty_block() {
        let doc = Document::from_text("");

        assert_eq!(doc.len(), 1);
        assert!(doc.is_empty());
        assert_eq!(doc.plain_text(), "");
    }

    #[test]
    fn test_document_of_blank_lines_is_not_empty() {
        let doc = Document::from_text("\n");

        assert_eq!(doc.len(), 2);
        assert!(!doc.is_empty());
        assert_eq!(doc.plain_text(), "\n");
    }

    #[test]
    fn test_blocks_get_distinct_keys() {
        let doc = Document::from_text("a\nb\nc");
        let keys: std::collections::HashSet<_> = doc.blocks().iter().map(|b| b.key).collect();

        assert_eq!(keys.len(), 3);
    }

    #[test]
    fn test_with_block_text_keeps_key_and_original() {
        let doc = Document::from_text("Hello\nWorld");
        let key = doc.blocks()[1].key;

        let edited = doc.with_block_text(&key, "There").unwrap();

        assert_eq!(edited.plain_text(), "Hello\nThere");
        assert_eq!(edited.blocks()[1].key, key);
        // original value is untouched
        assert_eq!(doc.plain_text(), "Hello\nWorld");
    }

    #[test]
    fn test_with_block_text_unknown_key() {
        let doc = Document::from_text("Hello");

        assert!(doc.with_block_text(&BlockKey::generate(), "x").is_none());
    }

    #[test]
    fn test_from_blocks_rejects_duplicates_and_empty() {
        let block = Block::new("a");

        assert_eq!(Document::from_blocks(vec![]), Err(DocumentError::NoBlocks));
        assert_eq!(
            Document::from_blocks(vec![block.clone(), block.clone()]),
            Err(DocumentError::DuplicateKey(block.key))
        );
        assert!(Document::from_blocks(vec![block]).is_ok());
    }

    #[test]
    fn test_serde_keeps_blocks_and_keys() {
        let doc = Document::from_text("one\ntwo");

        let json = serde_json::to_string(&doc).unwrap();
        let back: Document = serde_json::from_str(&json).unwrap();

        assert_eq!(back, doc);
    }

    #[test]
    fn test_deserialize_rejects_empty_block_list() {
        let err = serde_json::from_str::<Document>(r#"{"blocks":[]}"#).unwrap_err();

        assert!(err.to_string().contains("at least one block"));
    }

    #[test]
    fn test_block_len_counts_chars_not_bytes() {
        let block = Block::new("héllo 🦀");

        assert_eq!(block.len(), 7);
        assert_eq!(char_slice(&block.text, 1, 5), "éllo");
        assert_eq!(byte_offset(&block.text, 100), block.text.len());
    }

    #[test]
    fn test_end_selection_points_past_last_char() {
        let doc = Document::from_text("one\nthree");
        let sel = doc.end_selection();

        assert_eq!(sel.focus_key, doc.last().key);
        assert_eq!(sel.focus_offset, 5);
        assert!(sel.is_collapsed());
    }
}
