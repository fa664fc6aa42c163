use std::sync::Arc;

use crate::collaborators::BoardMembership;
use crate::editing::{
    Command, DEFAULT_HISTORY_LIMIT, Document, History, Patch, Selection, commands, delete_backward,
    delete_forward, insert_lines, replace_text, split_block,
};
use crate::input::{
    Dispatch, DispatchContext, Dispatcher, InputMode, KeyEvent, Keymap, Platform, PopoverKey,
};
use crate::suggestions::{
    ActiveQuery, Candidate, SuggestionHub, SuggestionKind, SuggestionPipeline,
};

/// How a text field is mounted
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorConfig {
    pub initial_text: String,
    /// Start focused instead of in preview
    pub is_editing: bool,
    /// Plain Enter commits the field; Shift+Enter still adds a line
    pub save_on_enter: bool,
    pub show_toolbar: bool,
    pub id: String,
    pub platform: Platform,
    pub history_limit: usize,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            initial_text: String::new(),
            is_editing: false,
            save_on_enter: false,
            show_toolbar: true,
            id: String::new(),
            platform: Platform::current(),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }
}

pub type TextCallback = Box<dyn FnMut(&str)>;
pub type Callback = Box<dyn FnMut()>;

/// Host hooks, all optional
#[derive(Default)]
pub struct EditorCallbacks {
    /// Every document change, with the full plain text
    pub on_change: Option<TextCallback>,
    pub on_focus: Option<Callback>,
    /// Leaving edit mode, with the text to persist
    pub on_blur: Option<TextCallback>,
    /// Backspace in an empty field
    pub on_editor_cancel: Option<Callback>,
}

impl EditorCallbacks {
    pub fn on_change(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_change = Some(Box::new(f));
        self
    }

    pub fn on_focus(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_focus = Some(Box::new(f));
        self
    }

    pub fn on_blur(mut self, f: impl FnMut(&str) + 'static) -> Self {
        self.on_blur = Some(Box::new(f));
        self
    }

    pub fn on_editor_cancel(mut self, f: impl FnMut() + 'static) -> Self {
        self.on_editor_cancel = Some(Box::new(f));
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EditorState {
    /// Showing the rendered preview; keys are ignored
    Idle,
    Editing(InputMode),
}

/// Toolbar buttons; each runs the same command as its shortcut
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ToolbarAction {
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
}

impl ToolbarAction {
    pub const ALL: [ToolbarAction; 10] = [
        ToolbarAction::Bold,
        ToolbarAction::Italic,
        ToolbarAction::Strikethrough,
        ToolbarAction::Code,
        ToolbarAction::Link,
        ToolbarAction::BulletList,
        ToolbarAction::NumberList,
        ToolbarAction::Quote,
        ToolbarAction::Undo,
        ToolbarAction::Redo,
    ];

    pub fn command(&self) -> Command {
        match self {
            ToolbarAction::Bold => Command::Bold,
            ToolbarAction::Italic => Command::Italic,
            ToolbarAction::Strikethrough => Command::Strikethrough,
            ToolbarAction::Code => Command::Code,
            ToolbarAction::Link => Command::Link,
            ToolbarAction::BulletList => Command::BulletList,
            ToolbarAction::NumberList => Command::NumberList,
            ToolbarAction::Quote => Command::Quote,
            ToolbarAction::Undo => Command::Undo,
            ToolbarAction::Redo => Command::Redo,
        }
    }
}

/// Mention picked for someone outside the board, waiting on the host's answer
struct MemberProposal {
    query: ActiveQuery,
    candidate: Candidate,
}

/// One editable text field
///
/// Owns the document, selection and history outright; the host feeds it key
/// events, toolbar clicks and caret moves, and hears back through
/// [`EditorCallbacks`]. Suggestion results arrive asynchronously and are
/// picked up by [`EditorController::drain_suggestions`].
pub struct EditorController {
    config: EditorConfig,
    callbacks: EditorCallbacks,
    document: Document,
    selection: Selection,
    history: History,
    dispatcher: Dispatcher,
    suggestions: SuggestionHub,
    membership: Option<Arc<dyn BoardMembership>>,
    proposal: Option<MemberProposal>,
    state: EditorState,
    /// Text last handed to `on_blur` (or loaded from outside)
    flushed: String,
}

impl EditorController {
    pub fn new(
        config: EditorConfig,
        suggestions: SuggestionHub,
        callbacks: EditorCallbacks,
    ) -> Self {
        let document = Document::from_text(&config.initial_text);
        let selection = document.end_selection();
        let history = History::with_limit(document.clone(), selection, config.history_limit);
        let state = if config.is_editing {
            EditorState::Editing(InputMode::Composing)
        } else {
            EditorState::Idle
        };

        Self {
            dispatcher: Dispatcher::new(config.platform),
            flushed: config.initial_text.clone(),
            config,
            callbacks,
            document,
            selection,
            history,
            suggestions,
            membership: None,
            proposal: None,
            state,
        }
    }

    /// Route mentions of non-members through the host's invite flow
    pub fn with_membership(mut self, membership: Arc<dyn BoardMembership>) -> Self {
        self.membership = Some(membership);
        self
    }

    pub fn with_keymap(mut self, keymap: Keymap) -> Self {
        self.dispatcher = Dispatcher::with_keymap(keymap);
        self
    }

    // ============ Accessors ============

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    pub fn text(&self) -> String {
        self.document.plain_text()
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    pub fn state(&self) -> EditorState {
        self.state
    }

    /// Input mode while editing; `None` in preview
    pub fn mode(&self) -> Option<InputMode> {
        match self.state {
            EditorState::Idle => None,
            EditorState::Editing(mode) => Some(mode),
        }
    }

    pub fn is_editing(&self) -> bool {
        matches!(self.state, EditorState::Editing(_))
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn suggestions(&self, kind: SuggestionKind) -> &[Candidate] {
        self.suggestions.pipeline(kind).candidates()
    }

    /// The pipeline whose popover is showing
    pub fn popover(&self) -> Option<&SuggestionPipeline> {
        let kind = self.suggestions.open_kind()?;
        Some(self.suggestions.pipeline(kind))
    }

    pub fn has_pending_proposal(&self) -> bool {
        self.proposal.is_some()
    }

    // ============ Focus ============

    pub fn focus(&mut self) -> bool {
        if self.is_editing() {
            return false;
        }
        self.state = EditorState::Editing(InputMode::Composing);
        self.refresh_suggestions();
        if let Some(on_focus) = self.callbacks.on_focus.as_mut() {
            on_focus();
        }
        true
    }

    /// Leave edit mode, handing the text to `on_blur`
    pub fn blur(&mut self) -> bool {
        if !self.is_editing() {
            return false;
        }
        self.leave_editing();
        self.flush();
        true
    }

    fn leave_editing(&mut self) {
        self.suggestions.close_all();
        self.state = EditorState::Idle;
    }

    fn flush(&mut self) {
        let text = self.text();
        if let Some(on_blur) = self.callbacks.on_blur.as_mut() {
            on_blur(&text);
        }
        self.flushed = text;
    }

    // ============ Input ============

    /// Resolve and run one key press, returning what it was taken to mean
    ///
    /// [`Dispatch::Ignored`] tells the host to apply its own default, e.g.
    /// caret movement followed by [`EditorController::set_selection`].
    pub fn handle_key(&mut self, event: &KeyEvent) -> Dispatch {
        let EditorState::Editing(mode) = self.state else {
            return Dispatch::Ignored;
        };
        let ctx = DispatchContext {
            mode,
            save_on_enter: self.config.save_on_enter,
            document_empty: self.document.is_empty(),
        };
        let dispatch = self.dispatcher.dispatch(event, &ctx);
        log::trace!("{} {event:?} -> {dispatch:?}", self.config.id);

        // an empty popover has nothing to move through or pick, so the key
        // closes it and does its ordinary job
        if let Dispatch::Popover(key) = &dispatch
            && *key != PopoverKey::Dismiss
            && self.suggestions.highlighted().is_none()
        {
            self.suggestions.dismiss();
            self.sync_mode();
            return self.handle_key(event);
        }

        match &dispatch {
            Dispatch::Command(command) => {
                self.execute(*command);
            }
            Dispatch::Popover(key) => self.popover_key(mode, *key),
            Dispatch::InsertText(text) => {
                self.insert_text(text);
            }
            Dispatch::SplitBlock => {
                self.edit(split_block);
            }
            Dispatch::DeleteBackward => {
                self.edit(delete_backward);
            }
            Dispatch::DeleteForward => {
                self.edit(delete_forward);
            }
            Dispatch::Ignored => {}
        }
        dispatch
    }

    fn popover_key(&mut self, mode: InputMode, key: PopoverKey) {
        let InputMode::Suggesting(kind) = mode else {
            return;
        };
        match key {
            PopoverKey::Up => self.suggestions.pipeline_mut(kind).move_up(),
            PopoverKey::Down => self.suggestions.pipeline_mut(kind).move_down(),
            PopoverKey::Accept => {
                self.select_suggestion();
            }
            PopoverKey::Dismiss => {
                self.suggestions.dismiss();
                self.sync_mode();
            }
        }
    }

    /// Run a command from any source; returns whether anything happened
    pub fn execute(&mut self, command: Command) -> bool {
        if !self.is_editing() {
            return false;
        }
        match command {
            Command::Undo => self.undo(),
            Command::Redo => self.redo(),
            Command::Blur => self.blur(),
            Command::Backspace => self.cancel(),
            _ => {
                let patch = commands::apply(command, &self.document, &self.selection);
                self.apply_patch(patch)
            }
        }
    }

    /// Toolbar entry point; shares [`EditorController::execute`] with the shortcuts
    pub fn toolbar(&mut self, action: ToolbarAction) -> bool {
        if !self.config.show_toolbar {
            return false;
        }
        self.execute(action.command())
    }

    /// Type or paste `text` over the selection; each line gets its own block
    pub fn insert_text(&mut self, text: &str) -> bool {
        if !self.is_editing() {
            return false;
        }
        self.edit(|doc, sel| insert_lines(doc, sel, text))
    }

    /// Move the caret or selection; not recorded in history
    pub fn set_selection(&mut self, selection: Selection) -> bool {
        if !selection.is_valid_in(&self.document) {
            log::debug!("{}: rejecting selection outside the document", self.config.id);
            return false;
        }
        self.selection = selection;
        self.refresh_suggestions();
        true
    }

    /// Replace the whole text from outside, e.g. after a remote update
    ///
    /// Starts a fresh history and does not fire `on_change`.
    pub fn set_text(&mut self, text: &str) {
        self.document = Document::from_text(text);
        self.selection = self.document.end_selection();
        self.history =
            History::with_limit(self.document.clone(), self.selection, self.config.history_limit);
        self.proposal = None;
        self.flushed = text.to_string();
        self.suggestions.close_all();
        self.sync_mode();
    }

    fn edit(&mut self, f: impl FnOnce(&Document, &Selection) -> Option<Patch>) -> bool {
        match f(&self.document, &self.selection) {
            Some(patch) => self.apply_patch(patch),
            None => {
                log::debug!("{}: edit skipped for stale selection", self.config.id);
                false
            }
        }
    }

    fn apply_patch(&mut self, patch: Patch) -> bool {
        if patch.is_noop() {
            return false;
        }
        self.document = patch.document;
        self.selection = patch.selection;
        self.history.commit(&self.document, &self.selection);
        self.changed();
        true
    }

    fn changed(&mut self) {
        let text = self.text();
        if let Some(on_change) = self.callbacks.on_change.as_mut() {
            on_change(&text);
        }
        self.refresh_suggestions();
    }

    fn undo(&mut self) -> bool {
        let Some(entry) = self.history.undo() else {
            return false;
        };
        self.document = entry.document.clone();
        self.selection = entry.selection;
        self.changed();
        true
    }

    fn redo(&mut self) -> bool {
        let Some(entry) = self.history.redo() else {
            return false;
        };
        self.document = entry.document.clone();
        self.selection = entry.selection;
        self.changed();
        true
    }

    /// Backspace in an empty field: drop out of edit mode without saving
    fn cancel(&mut self) -> bool {
        if !self.document.is_empty() {
            return false;
        }
        self.leave_editing();
        self.flushed = self.text();
        if let Some(on_editor_cancel) = self.callbacks.on_editor_cancel.as_mut() {
            on_editor_cancel();
        }
        true
    }

    // ============ Suggestions ============

    fn refresh_suggestions(&mut self) {
        if self.is_editing() {
            self.suggestions.refresh(&self.document, &self.selection);
        }
        self.sync_mode();
    }

    fn sync_mode(&mut self) {
        if let EditorState::Editing(_) = self.state {
            self.state = EditorState::Editing(match self.suggestions.open_kind() {
                Some(kind) => InputMode::Suggesting(kind),
                None => InputMode::Composing,
            });
        }
    }

    /// Apply finished searches; returns whether any popover changed
    pub fn drain_suggestions(&mut self) -> bool {
        let applied = self.suggestions.drain();
        self.sync_mode();
        applied
    }

    /// Insert the highlighted candidate of the open popover
    ///
    /// Mentions of people outside the board go to
    /// [`BoardMembership::propose_member`] instead and wait for
    /// [`EditorController::resolve_member_proposal`].
    pub fn select_suggestion(&mut self) -> bool {
        let Some((query, candidate)) = self.suggestions.highlighted() else {
            return false;
        };
        self.suggestions.close_all();
        self.sync_mode();

        if candidate.kind == SuggestionKind::Mention
            && !candidate.is_board_member
            && let Some(membership) = self.membership.clone()
        {
            log::debug!("{}: proposing {} for the board", self.config.id, candidate.value);
            membership.propose_member(&candidate);
            self.proposal = Some(MemberProposal { query, candidate });
            return true;
        }

        self.insert_candidate(&query, &candidate)
    }

    /// Finish a parked member proposal
    ///
    /// The mention is inserted only when `accepted` and the typed query can
    /// still be found in its block; the text may have been edited while the
    /// host was asking. The caret ends up at the end of the text either way.
    pub fn resolve_member_proposal(&mut self, accepted: bool) -> bool {
        let Some(MemberProposal { query, candidate }) = self.proposal.take() else {
            return false;
        };
        if accepted {
            match query.relocate(&self.document) {
                Some(query) => {
                    self.insert_candidate(&query, &candidate);
                }
                None => log::debug!(
                    "{}: {} no longer in the text, not inserting the mention",
                    self.config.id,
                    query.typed()
                ),
            }
        }
        self.selection = self.document.end_selection();
        self.refresh_suggestions();
        true
    }

    fn insert_candidate(&mut self, query: &ActiveQuery, candidate: &Candidate) -> bool {
        let insertion = candidate.insertion();
        self.edit(|doc, _| replace_text(doc, &query.selection(), &insertion))
    }
}

impl Drop for EditorController {
    fn drop(&mut self) {
        if self.text() != self.flushed {
            self.flush();
        }
    }
}
