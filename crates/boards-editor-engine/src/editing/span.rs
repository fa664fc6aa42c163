//! Span resolution and the text mutation primitives.
//!
//! [`replace_text`] is the only function that rewrites block text; every
//! formatting command and default edit is expressed through it.
//! [`split_block`] is the one structural edit that creates a block.

use crate::editing::document::{char_len, char_slice};
use crate::editing::{Block, BlockKey, Document, Patch, Selection};

/// Where a block sits relative to a selection span
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpanRole {
    Before,
    /// Block holding the start of the span (also the end for single-block spans)
    First,
    Middle,
    Last,
    After,
}

/// The part of one block covered by a span, as char offsets
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SpanPart {
    pub key: BlockKey,
    pub role: SpanRole,
    pub start: usize,
    pub end: usize,
}

/// Classify every block of `doc` relative to `sel`
pub fn classify_blocks(doc: &Document, sel: &Selection) -> Option<Vec<(BlockKey, SpanRole)>> {
    let sel = sel.normalized(doc)?;
    let start = doc.index_of(&sel.anchor_key)?;
    let end = doc.index_of(&sel.focus_key)?;

    let roles = doc
        .blocks()
        .iter()
        .enumerate()
        .map(|(index, block)| {
            let role = if index < start {
                SpanRole::Before
            } else if index == start {
                SpanRole::First
            } else if index < end {
                SpanRole::Middle
            } else if index == end {
                SpanRole::Last
            } else {
                SpanRole::After
            };
            (block.key, role)
        })
        .collect();
    Some(roles)
}

/// The blocks covered by `sel` in reading order, with the covered char range of each
pub fn resolve_span(doc: &Document, sel: &Selection) -> Option<Vec<SpanPart>> {
    let sel = sel.normalized(doc)?;
    let roles = classify_blocks(doc, &sel)?;

    let parts = doc
        .blocks()
        .iter()
        .zip(roles)
        .filter_map(|(block, (key, role))| {
            let (start, end) = match role {
                SpanRole::Before | SpanRole::After => return None,
                SpanRole::First if sel.anchor_key == sel.focus_key => {
                    (sel.anchor_offset, sel.focus_offset)
                }
                SpanRole::First => (sel.anchor_offset, block.len()),
                SpanRole::Middle => (0, block.len()),
                SpanRole::Last => (0, sel.focus_offset),
            };
            Some(SpanPart {
                key,
                role,
                start,
                end,
            })
        })
        .collect();
    Some(parts)
}

/// Text covered by `sel`, one line per spanned block
pub fn selected_text(doc: &Document, sel: &Selection) -> Option<String> {
    let parts = resolve_span(doc, sel)?;
    let lines: Vec<&str> = parts
        .iter()
        .filter_map(|part| {
            doc.block(&part.key)
                .map(|block| char_slice(&block.text, part.start, part.end))
        })
        .collect();
    Some(lines.join("\n"))
}

/// Replace the span of `sel` with `new_text`
///
/// The span is normalized first. When it covers several blocks they are
/// merged into the start block, which keeps its key. The returned selection is
/// a caret just after the inserted text. `None` when `sel` does not fit `doc`.
pub fn replace_text(doc: &Document, sel: &Selection, new_text: &str) -> Option<Patch> {
    let sel = sel.normalized(doc)?;
    let start = doc.index_of(&sel.anchor_key)?;
    let end = doc.index_of(&sel.focus_key)?;
    let start_block = &doc.blocks()[start];
    let end_block = &doc.blocks()[end];

    let head = char_slice(&start_block.text, 0, sel.anchor_offset);
    let tail = char_slice(&end_block.text, sel.focus_offset, end_block.len());
    let caret = char_len(head) + char_len(new_text);
    let merged = Block {
        key: start_block.key,
        text: format!("{head}{new_text}{tail}"),
    };

    let mut changed = Vec::new();
    if merged.text != start_block.text || end > start {
        changed.push(start_block.key);
        changed.extend(doc.blocks()[start + 1..=end].iter().map(|block| block.key));
    }

    let key = merged.key;
    Some(Patch {
        document: doc.splice(start..=end, vec![merged]),
        selection: Selection::caret(key, caret),
        changed,
    })
}

/// Delete the selected text, then split the caret's block in two
///
/// The text after the caret moves into a new block with a fresh key and the
/// caret lands at its start.
pub fn split_block(doc: &Document, sel: &Selection) -> Option<Patch> {
    let cleared = replace_text(doc, sel, "")?;
    let caret = cleared.selection;
    let index = cleared.document.index_of(&caret.focus_key)?;
    let block = &cleared.document.blocks()[index];

    let head = Block {
        key: block.key,
        text: char_slice(&block.text, 0, caret.focus_offset).to_string(),
    };
    let tail = Block::new(char_slice(&block.text, caret.focus_offset, block.len()));

    let mut changed = cleared.changed;
    if !changed.contains(&head.key) {
        changed.push(head.key);
    }
    changed.push(tail.key);

    let selection = Selection::caret(tail.key, 0);
    Some(Patch {
        document: cleared.document.splice(index..=index, vec![head, tail]),
        selection,
        changed,
    })
}

/// Type `text` over the selection, one block per line
///
/// Text without a newline is a plain [`replace_text`]. Every `\n` splits the
/// block at the caret, so pasted lines keep the one-line-per-block shape and
/// the caret ends after the last line.
pub fn insert_lines(doc: &Document, sel: &Selection, text: &str) -> Option<Patch> {
    let mut lines = text.split('\n');
    let mut patch = replace_text(doc, sel, lines.next().unwrap_or_default())?;

    for line in lines {
        let split = split_block(&patch.document, &patch.selection)?;
        let typed = replace_text(&split.document, &split.selection, line)?;
        for key in split.changed.into_iter().chain(typed.changed) {
            if !patch.changed.contains(&key) {
                patch.changed.push(key);
            }
        }
        patch.document = typed.document;
        patch.selection = typed.selection;
    }
    Some(patch)
}

/// Default Backspace: delete the selection, or the char before the caret
///
/// At the start of a block the block is joined onto the previous one. At the
/// start of the document nothing changes.
pub fn delete_backward(doc: &Document, sel: &Selection) -> Option<Patch> {
    if !sel.is_valid_in(doc) {
        return None;
    }
    if !sel.is_collapsed() {
        return replace_text(doc, sel, "");
    }

    let caret = sel.focus();
    let range = if caret.offset > 0 {
        Selection::new(caret.key, caret.offset - 1, caret.key, caret.offset)
    } else {
        let index = doc.index_of(&caret.key)?;
        if index == 0 {
            return Some(Patch::unchanged(doc, sel));
        }
        let previous = &doc.blocks()[index - 1];
        Selection::new(previous.key, previous.len(), caret.key, 0)
    };
    replace_text(doc, &range, "")
}

/// Default Delete: delete the selection, or the char after the caret
pub fn delete_forward(doc: &Document, sel: &Selection) -> Option<Patch> {
    if !sel.is_valid_in(doc) {
        return None;
    }
    if !sel.is_collapsed() {
        return replace_text(doc, sel, "");
    }

    let caret = sel.focus();
    let block = doc.block(&caret.key)?;
    let range = if caret.offset < block.len() {
        Selection::new(caret.key, caret.offset, caret.key, caret.offset + 1)
    } else {
        let index = doc.index_of(&caret.key)?;
        let Some(next) = doc.blocks().get(index + 1) else {
            return Some(Patch::unchanged(doc, sel));
        };
        Selection::new(caret.key, caret.offset, next.key, 0)
    };
    replace_text(doc, &range, "")
}
