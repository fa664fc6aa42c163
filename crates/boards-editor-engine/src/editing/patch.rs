use crate::editing::{BlockKey, Document, Selection};

/// Result of applying an edit
#[derive(Debug, Clone, PartialEq)]
pub struct Patch {
    pub document: Document,
    pub selection: Selection,
    /// Blocks whose text changed, plus blocks that were added or merged away
    pub changed: Vec<BlockKey>,
}

impl Patch {
    /// A patch that leaves document and selection as they were
    pub fn unchanged(document: &Document, selection: &Selection) -> Self {
        Self {
            document: document.clone(),
            selection: *selection,
            changed: Vec::new(),
        }
    }

    pub fn is_noop(&self) -> bool {
        self.changed.is_empty()
    }
}
