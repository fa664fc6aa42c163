use crate::editing::{Document, Selection};

/// Default number of undo steps kept
pub const DEFAULT_HISTORY_LIMIT: usize = 100;

/// A recorded editor state
#[derive(Debug, Clone, PartialEq)]
pub struct HistoryEntry {
    pub document: Document,
    pub selection: Selection,
}

impl HistoryEntry {
    pub fn new(document: Document, selection: Selection) -> Self {
        Self {
            document,
            selection,
        }
    }
}

/// Linear undo/redo over document snapshots
///
/// `initial` is the state the editor was mounted with (or the oldest state
/// still reachable once the limit has been hit); `undo` holds every committed
/// state after it, newest last. Only text changes are recorded: committing a
/// state whose document equals the current one is ignored, so selection-only
/// moves never show up as undo steps.
#[derive(Debug, Clone)]
pub struct History {
    initial: HistoryEntry,
    undo: Vec<HistoryEntry>,
    redo: Vec<HistoryEntry>,
    limit: usize,
}

impl History {
    pub fn new(document: Document, selection: Selection) -> Self {
        Self::with_limit(document, selection, DEFAULT_HISTORY_LIMIT)
    }

    pub fn with_limit(document: Document, selection: Selection, limit: usize) -> Self {
        Self {
            initial: HistoryEntry::new(document, selection),
            undo: Vec::new(),
            redo: Vec::new(),
            limit: limit.max(1),
        }
    }

    /// The state undo/redo currently sit on
    pub fn current(&self) -> &HistoryEntry {
        self.undo.last().unwrap_or(&self.initial)
    }

    /// Record a committed edit
    ///
    /// Returns false (and leaves the redo stack alone) when the document is
    /// unchanged from the current entry.
    pub fn commit(&mut self, document: &Document, selection: &Selection) -> bool {
        if self.current().document == *document {
            return false;
        }
        let entry = HistoryEntry::new(document.clone(), *selection);
        self.undo.push(entry);
        self.redo.clear();

        if self.undo.len() > self.limit {
            self.initial = self.undo.remove(0);
        }
        true
    }

    /// Step back one edit, returning the state to restore
    ///
    /// `None` when there is nothing left to undo.
    pub fn undo(&mut self) -> Option<&HistoryEntry> {
        let Some(entry) = self.undo.pop() else {
            log::debug!("undo requested with empty history");
            return None;
        };
        self.redo.push(entry);
        Some(self.current())
    }

    /// Re-apply the most recently undone edit
    pub fn redo(&mut self) -> Option<&HistoryEntry> {
        let entry = self.redo.pop()?;
        self.undo.push(entry);
        Some(self.current())
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::editing::replace_text;
    use pretty_assertions::assert_eq;

    fn type_text(doc: &Document, sel: &Selection, text: &str) -> (Document, Selection) {
        let patch = replace_text(doc, sel, text).unwrap();
        (patch.document, patch.selection)
    }

    #[test]
    fn test_commit_ignores_unchanged_document() {
        let doc = Document::from_text("Hello");
        let mut history = History::new(doc.clone(), doc.end_selection());

        assert!(!history.commit(&doc, &doc.start_selection()));
        assert_eq!(history.undo_depth(), 0);
    }

    #[test]
    fn test_undo_redo_symmetry() {
        let doc = Document::from_text("");
        let mut sel = doc.end_selection();
        let mut history = History::new(doc.clone(), sel);

        let mut states = vec![doc.clone()];
        let mut current = doc;
        for word in ["a", "b", "c", "d"] {
            (current, sel) = type_text(&current, &sel, word);
            assert!(history.commit(&current, &sel));
            states.push(current.clone());
        }

        for expected in states.iter().rev().skip(1) {
            assert_eq!(history.undo().unwrap().document, *expected);
        }
        assert!(history.undo().is_none());

        for expected in states.iter().skip(1) {
            assert_eq!(history.redo().unwrap().document, *expected);
        }
        assert!(history.redo().is_none());
        assert_eq!(history.current().document, current);
    }

    #[test]
    fn test_commit_after_undo_clears_redo() {
        let doc = Document::from_text("x");
        let sel = doc.end_selection();
        let mut history = History::new(doc.clone(), sel);

        let (one, sel_one) = type_text(&doc, &sel, "1");
        history.commit(&one, &sel_one);
        history.undo();
        assert!(history.can_redo());

        let (two, sel_two) = type_text(&doc, &sel, "2");
        history.commit(&two, &sel_two);

        assert!(!history.can_redo());
        assert_eq!(history.current().document.plain_text(), "x2");
    }

    #[test]
    fn test_limit_drops_oldest_entries() {
        let doc = Document::from_text("");
        let mut sel = doc.end_selection();
        let mut history = History::with_limit(doc.clone(), sel, 2);

        let mut current = doc;
        for word in ["a", "b", "c"] {
            (current, sel) = type_text(&current, &sel, word);
            history.commit(&current, &sel);
        }

        assert_eq!(history.undo_depth(), 2);
        assert_eq!(history.undo().unwrap().document.plain_text(), "ab");
        assert_eq!(history.undo().unwrap().document.plain_text(), "a");
        assert!(history.undo().is_none());
    }
}
