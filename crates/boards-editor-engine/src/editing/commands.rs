use std::collections::HashMap;
use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::editing::document::char_len;
use crate::editing::{
    BlockKey, Document, Patch, Selection, replace_text, resolve_span, selected_text,
};

/// Abstract editing actions, decoupled from the key or button that triggered them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Command {
    Bold,
    Italic,
    Strikethrough,
    Code,
    Link,
    BulletList,
    NumberList,
    Quote,
    Undo,
    Redo,
    Blur,
    Backspace,
}

impl Command {
    /// Commands handled by [`apply`] rather than by history or the controller
    pub fn is_format(&self) -> bool {
        inline_style(*self).is_some() || self.is_block_prefix()
    }

    pub fn is_block_prefix(&self) -> bool {
        matches!(
            self,
            Command::BulletList | Command::NumberList | Command::Quote
        )
    }
}

/// Marker pair and placeholder for an inline command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct InlineStyle {
    pub open: &'static str,
    pub close: &'static str,
    /// Text wrapped when the selection is collapsed
    pub placeholder: &'static str,
}

pub(crate) fn inline_style(command: Command) -> Option<InlineStyle> {
    let (open, close, placeholder) = match command {
        Command::Bold => ("**", "**", "bold text"),
        Command::Italic => ("*", "*", "italic text"),
        Command::Strikethrough => ("~~", "~~", "strikethrough text"),
        Command::Code => ("`", "`", "code"),
        Command::Link => ("[", "](url)", "link text"),
        _ => return None,
    };
    Some(InlineStyle {
        open,
        close,
        placeholder,
    })
}

/// List marker kinds found at the start of a block
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    /// `* `, `- ` or `+ `
    Bullet,
    /// `1. `, `2. `, ...
    Numbered,
}

static LIST_PREFIX: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(?P<indent>[ \t]*)(?:(?P<bullet>[-*+]) |(?P<number>\d+)\. )?")
        .expect("list prefix pattern is valid")
});

/// Leading indentation and list marker of a line
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinePrefix<'a> {
    pub indent: &'a str,
    pub kind: Option<ListKind>,
    /// The marker including its trailing space, empty when there is none
    pub marker: &'a str,
    pub rest: &'a str,
}

/// Extract indentation and list marker from a line
pub fn line_prefix(line: &str) -> LinePrefix<'_> {
    let empty = LinePrefix {
        indent: "",
        kind: None,
        marker: "",
        rest: line,
    };
    let Some(caps) = LIST_PREFIX.captures(line) else {
        return empty;
    };
    let indent = caps.name("indent").map_or("", |m| m.as_str());
    let kind = if caps.name("bullet").is_some() {
        Some(ListKind::Bullet)
    } else if caps.name("number").is_some() {
        Some(ListKind::Numbered)
    } else {
        None
    };
    let whole = caps.get(0).map_or(0, |m| m.end());
    LinePrefix {
        indent,
        kind,
        marker: &line[indent.len()..whole],
        rest: &line[whole..],
    }
}

/// New text for one block under a block-prefix command, `None` when unchanged
///
/// `number` is the 1-based position of the block within the command's span.
pub(crate) fn prefixed_line(line: &str, command: Command, number: usize) -> Option<String> {
    let prefix = line_prefix(line);
    let (wanted, marker) = match command {
        Command::BulletList => (ListKind::Bullet, "* ".to_string()),
        Command::NumberList => (ListKind::Numbered, format!("{number}. ")),
        Command::Quote => {
            let body = &line[prefix.indent.len()..];
            if body.starts_with('>') {
                return None;
            }
            return Some(format!("{}> {}", prefix.indent, body));
        }
        _ => return None,
    };

    // An existing marker of the other list kind is swapped out, never stacked
    match prefix.kind {
        Some(kind) if kind == wanted => None,
        _ => Some(format!("{}{}{}", prefix.indent, marker, prefix.rest)),
    }
}

/// Apply a command to the document
///
/// Total over [`Command`]: invalid selections and commands that are not
/// formatting commands return the input unchanged.
pub fn apply(command: Command, doc: &Document, sel: &Selection) -> Patch {
    if !sel.is_valid_in(doc) {
        log::debug!("ignoring {command:?} for selection outside the document");
        return Patch::unchanged(doc, sel);
    }
    if let Some(style) = inline_style(command) {
        return apply_inline(style, doc, sel);
    }
    if command.is_block_prefix() {
        return apply_block_prefix(command, doc, sel);
    }
    Patch::unchanged(doc, sel)
}

fn apply_inline(style: InlineStyle, doc: &Document, sel: &Selection) -> Patch {
    let text = if sel.is_collapsed() {
        Some(style.placeholder.to_string())
    } else {
        selected_text(doc, sel)
    };
    text.and_then(|text| {
        let wrapped = format!("{}{}{}", style.open, text, style.close);
        replace_text(doc, sel, &wrapped)
    })
    .unwrap_or_else(|| Patch::unchanged(doc, sel))
}

fn apply_block_prefix(command: Command, doc: &Document, sel: &Selection) -> Patch {
    let Some(parts) = resolve_span(doc, sel) else {
        return Patch::unchanged(doc, sel);
    };

    let mut document = doc.clone();
    let mut changed = Vec::new();
    let mut shifts: HashMap<BlockKey, isize> = HashMap::new();

    for (index, part) in parts.iter().enumerate() {
        let Some(block) = document.block(&part.key) else {
            continue;
        };
        let Some(text) = prefixed_line(&block.text, command, index + 1) else {
            continue;
        };
        // Each block gets its own forward selection over its full text; the
        // original multi-block offsets are stale once an earlier block changes.
        let shift = char_len(&text) as isize - block.len() as isize;
        let local = Selection::covering(block);
        if let Some(patch) = replace_text(&document, &local, &text) {
            document = patch.document;
            changed.extend(patch.changed);
            shifts.insert(part.key, shift);
        }
    }

    let moved = |key: BlockKey, offset: usize| {
        let shift = shifts.get(&key).copied().unwrap_or(0);
        let len = document.block(&key).map_or(0, |block| block.len());
        offset.saturating_add_signed(shift).min(len)
    };
    let selection = Selection::new(
        sel.anchor_key,
        moved(sel.anchor_key, sel.anchor_offset),
        sel.focus_key,
        moved(sel.focus_key, sel.focus_offset),
    );

    Patch {
        document,
        selection,
        changed,
    }
}
