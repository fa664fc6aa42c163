use serde::{Deserialize, Serialize};

use crate::editing::{Block, BlockKey, Document};

/// One end of a selection: a block and a char offset into its text
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Position {
    pub key: BlockKey,
    pub offset: usize,
}

/// Directional selection over the document
///
/// `anchor` is where the selection started and `focus` is the end that moves.
/// The two may sit in different blocks and the focus may come before the
/// anchor in reading order (a backward selection). Anything that rewrites text
/// must work on [`Selection::normalized`], which is always forward and has been
/// checked against the document it is applied to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Selection {
    pub anchor_key: BlockKey,
    pub anchor_offset: usize,
    pub focus_key: BlockKey,
    pub focus_offset: usize,
}

impl Selection {
    pub fn new(
        anchor_key: BlockKey,
        anchor_offset: usize,
        focus_key: BlockKey,
        focus_offset: usize,
    ) -> Self {
        Self {
            anchor_key,
            anchor_offset,
            focus_key,
            focus_offset,
        }
    }

    /// Collapsed selection (a caret) at `offset` in block `key`
    pub fn caret(key: BlockKey, offset: usize) -> Self {
        Self::new(key, offset, key, offset)
    }

    /// Forward selection over the whole text of `block`
    pub fn covering(block: &Block) -> Self {
        Self::new(block.key, 0, block.key, block.len())
    }

    pub fn anchor(&self) -> Position {
        Position {
            key: self.anchor_key,
            offset: self.anchor_offset,
        }
    }

    pub fn focus(&self) -> Position {
        Position {
            key: self.focus_key,
            offset: self.focus_offset,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor_key == self.focus_key && self.anchor_offset == self.focus_offset
    }

    /// Both ends reference existing blocks at offsets within their text
    pub fn is_valid_in(&self, doc: &Document) -> bool {
        let in_range = |key: &BlockKey, offset: usize| {
            doc.block(key).is_some_and(|block| offset <= block.len())
        };
        in_range(&self.anchor_key, self.anchor_offset)
            && in_range(&self.focus_key, self.focus_offset)
    }

    /// Whether the focus precedes the anchor in reading order
    ///
    /// `None` when the selection does not fit `doc`.
    pub fn is_backward(&self, doc: &Document) -> Option<bool> {
        if !self.is_valid_in(doc) {
            return None;
        }
        let anchor = (doc.index_of(&self.anchor_key)?, self.anchor_offset);
        let focus = (doc.index_of(&self.focus_key)?, self.focus_offset);
        Some(focus < anchor)
    }

    /// Forward copy of this selection, or `None` when it does not fit `doc`
    pub fn normalized(&self, doc: &Document) -> Option<Selection> {
        if self.is_backward(doc)? {
            Some(Self::new(
                self.focus_key,
                self.focus_offset,
                self.anchor_key,
                self.anchor_offset,
            ))
        } else {
            Some(*self)
        }
    }

    /// Start of a forward selection
    pub fn start(&self) -> Position {
        self.anchor()
    }

    /// End of a forward selection
    pub fn end(&self) -> Position {
        self.focus()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn doc() -> Document {
        Document::from_text("Hello\nWorld")
    }

    #[test]
    fn test_caret_is_collapsed() {
        let doc = doc();
        let sel = Selection::caret(doc.first().key, 3);

        assert!(sel.is_collapsed());
        assert_eq!(sel.is_backward(&doc), Some(false));
    }

    #[test]
    fn test_backward_selection_across_blocks_is_normalized() {
        let doc = doc();
        let hello = doc.blocks()[0].key;
        let world = doc.blocks()[1].key;
        let sel = Selection::new(world, 3, hello, 2);

        assert_eq!(sel.is_backward(&doc), Some(true));
        let forward = sel.normalized(&doc).unwrap();
        assert_eq!(forward, Selection::new(hello, 2, world, 3));
        assert_eq!(forward.is_backward(&doc), Some(false));
    }

    #[test]
    fn test_backward_selection_within_block() {
        let doc = doc();
        let key = doc.first().key;
        let sel = Selection::new(key, 4, key, 1);

        assert_eq!(sel.normalized(&doc).unwrap(), Selection::new(key, 1, key, 4));
    }

    #[test]
    fn test_offset_past_end_is_invalid() {
        let doc = doc();
        let sel = Selection::caret(doc.first().key, 6);

        assert!(!sel.is_valid_in(&doc));
        assert_eq!(sel.normalized(&doc), None);
    }

    #[test]
    fn test_stale_key_is_invalid() {
        let doc = doc();
        let other = Document::from_text("Hello\nWorld");
        let sel = Selection::caret(other.first().key, 0);

        assert!(!sel.is_valid_in(&doc));
        assert_eq!(sel.is_backward(&doc), None);
    }

    #[test]
    fn test_covering_spans_whole_block() {
        let doc = doc();
        let sel = Selection::covering(doc.last());

        assert_eq!(sel.start().offset, 0);
        assert_eq!(sel.end().offset, 5);
        assert!(!sel.is_collapsed());
    }
}
