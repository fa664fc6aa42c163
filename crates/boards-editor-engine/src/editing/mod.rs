/*!
 * # Editing Core Module
 *
 * The value types and pure functions behind every card text field.
 *
 * ## Architecture Overview
 *
 * ### 1. Immutable Document Model
 * - A **`Document`** is an ordered, never-empty list of **`Block`**s (one per line)
 * - Blocks are addressed by opaque **`BlockKey`**s, never by reference, so the
 *   model is a flat arena with no parent/child links
 * - Every edit produces a new `Document`; the old value stays valid, which makes
 *   undo/redo a matter of keeping snapshots
 *
 * ### 2. Directional Selection
 * - A **`Selection`** is an anchor/focus pair of (block key, char offset)
 * - Selections may run backwards and may span several blocks
 * - Anything that rewrites text works on the **normalized** (forward) form, and
 *   a selection that no longer fits the document turns the edit into a no-op
 *
 * ### 3. One Text Mutator
 * - **`replace_text`** swaps the span of a selection for new text, merging the
 *   spanned blocks into the start block
 * - Formatting commands, default typing and deletion are all built on it;
 *   `split_block` is the only edit that creates a block
 * - **`insert_lines`** types multi-line text by alternating the two, so pasted
 *   lines still get a block each
 *
 * ### 4. Command-Based Formatting
 * - **`Command`** values compile to a **`Patch`** (new document + selection +
 *   changed block keys) through **`commands::apply`**
 * - Inline commands wrap the selection in markers; block-prefix commands
 *   rewrite every spanned block's list/quote prefix
 *
 * ### 5. Snapshot History
 * - **`History`** keeps `(Document, Selection)` entries for linear undo/redo
 *
 * ## Module Structure
 *
 * - **`document`**: `Document`, `Block`, `BlockKey`
 * - **`selection`**: `Selection` and normalization
 * - **`span`**: span resolution, `selected_text`, `replace_text`, `insert_lines`
 *   and default edits
 * - **`commands`**: `Command` enum and the format command engine
 * - **`history`**: undo/redo stacks
 * - **`patch`**: edit result
 *
 * ## Usage Pattern
 *
 * ```rust
 * use boards_editor_engine::editing::*;
 *
 * let doc = Document::from_text("one\ntwo\nthree");
 * let all = Selection::new(doc.first().key, 0, doc.last().key, doc.last().len());
 *
 * let patch = commands::apply(Command::NumberList, &doc, &all);
 *
 * assert_eq!(patch.document.plain_text(), "1. one\n2. two\n3. three");
 * ```
 */

pub mod commands;
pub mod document;
pub mod history;
pub mod patch;
pub mod selection;
pub mod span;

pub use commands::{Command, LinePrefix, ListKind, line_prefix};
pub use document::{Block, BlockKey, Document, DocumentError};
pub use history::{DEFAULT_HISTORY_LIMIT, History, HistoryEntry};
pub use patch::Patch;
pub use selection::{Position, Selection};
pub use span::{
    SpanPart, SpanRole, classify_blocks, delete_backward, delete_forward, insert_lines,
    replace_text, resolve_span, selected_text, split_block,
};
