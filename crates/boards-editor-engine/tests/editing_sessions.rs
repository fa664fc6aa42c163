//! End-to-end editing sessions through the public controller API
//!
//! Each test drives an [`EditorController`] the way a host UI would: key
//! events, toolbar clicks and caret moves in, plain text out.

use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use insta::assert_snapshot;
use pretty_assertions::assert_eq;
use tokio::runtime::Handle;

use boards_editor_engine::collaborators::{
    BoardContext, BoardType, Member, MemberDirectory, NameDisplay, Permission, PermissionChecker,
    SearchError,
};
use boards_editor_engine::editing::Selection;
use boards_editor_engine::input::{InputMode, Key, KeyEvent, Platform};
use boards_editor_engine::suggestions::{
    EmojiSource, MentionSource, SuggestionHub, SuggestionKind, SuggestionSettings,
};
use boards_editor_engine::{
    EditorCallbacks, EditorConfig, EditorController, EditorState, ToolbarAction,
};

const PLATFORM: Platform = Platform::Other;

struct NoPermissions;

impl PermissionChecker for NoPermissions {
    fn has_permission(&self, _permission: Permission) -> bool {
        false
    }
}

/// Never reached on a private board without role management
struct UnusedDirectory;

#[async_trait]
impl MemberDirectory for UnusedDirectory {
    async fn search_members(&self, _term: &str) -> Result<Vec<Member>, SearchError> {
        Err(SearchError::Unavailable)
    }
}

fn private_board() -> BoardContext {
    let member = |id: &str, username: &str, first: &str, last: &str| Member {
        first_name: first.into(),
        last_name: last.into(),
        ..Member::new(id, username)
    };
    BoardContext {
        board_type: BoardType::Private,
        current_user_is_guest: false,
        members: vec![
            member("u1", "grace", "Grace", "Hopper"),
            member("u2", "alan", "Alan", "Turing"),
            member("u3", "ada", "Ada", "Lovelace"),
        ],
    }
}

fn hub() -> SuggestionHub {
    let settings = SuggestionSettings::default();
    let mentions = MentionSource::new(
        private_board(),
        Arc::new(NoPermissions),
        Arc::new(UnusedDirectory),
    )
    .with_name_display(NameDisplay::FullName);
    SuggestionHub::new(
        Handle::current(),
        Arc::new(mentions),
        Arc::new(EmojiSource::new()),
        &settings,
    )
}

fn editor(text: &str, callbacks: EditorCallbacks) -> EditorController {
    let config = EditorConfig {
        initial_text: text.into(),
        is_editing: true,
        id: "card-description".into(),
        platform: PLATFORM,
        ..EditorConfig::default()
    };
    EditorController::new(config, hub(), callbacks)
}

fn type_text(editor: &mut EditorController, text: &str) {
    for c in text.chars() {
        let event = if c == '\n' {
            KeyEvent::shift(Key::Enter)
        } else {
            KeyEvent::char(c)
        };
        editor.handle_key(&event);
    }
}

fn select_blocks(editor: &mut EditorController, from: usize, to: usize) {
    let blocks = editor.document().blocks();
    let selection = Selection::new(blocks[from].key, 0, blocks[to].key, blocks[to].len());
    assert!(editor.set_selection(selection));
}

#[tokio::test]
async fn test_shopping_list_session() {
    let mut editor = editor("Groceries\nmilk\neggs\nbread", EditorCallbacks::default());

    select_blocks(&mut editor, 1, 3);
    editor.toolbar(ToolbarAction::BulletList);
    editor.toolbar(ToolbarAction::NumberList);

    let end = editor.document().end_selection();
    editor.set_selection(end);
    type_text(&mut editor, "\nbutter");

    select_blocks(&mut editor, 0, 0);
    editor.handle_key(&KeyEvent::primary('b', PLATFORM));

    assert_snapshot!(editor.text(), @r"
    **Groceries**
    1. milk
    2. eggs
    3. bread
    butter
    ");

    editor.handle_key(&KeyEvent::primary('z', PLATFORM));
    editor.handle_key(&KeyEvent::primary('z', PLATFORM));
    assert_eq!(editor.text(), "Groceries\n1. milk\n2. eggs\n3. bread\nbutte");
}

#[tokio::test]
async fn test_quote_toggle_is_idempotent() {
    let mut editor = editor("Buy milk", EditorCallbacks::default());

    assert!(editor.toolbar(ToolbarAction::Quote));
    assert!(!editor.toolbar(ToolbarAction::Quote));

    assert_eq!(editor.text(), "> Buy milk");
    assert_eq!(editor.history().undo_depth(), 1);
}

#[tokio::test]
async fn test_collapsed_bold_then_type_over_placeholder() {
    let mut editor = editor("", EditorCallbacks::default());

    editor.handle_key(&KeyEvent::primary('b', PLATFORM));
    assert_eq!(editor.text(), "**bold text**");
    assert_eq!(editor.selection().focus_offset, 13);

    // select the placeholder and type over it
    let key = editor.document().first().key;
    editor.set_selection(Selection::new(key, 2, key, 11));
    type_text(&mut editor, "ship");

    assert_eq!(editor.text(), "**ship**");
}

#[tokio::test(start_paused = true)]
async fn test_comment_with_mention_and_emoji() {
    let saved = Rc::new(RefCell::new(Vec::new()));
    let sink = saved.clone();
    let callbacks =
        EditorCallbacks::default().on_blur(move |text| sink.borrow_mut().push(text.to_string()));
    let mut editor = editor("", callbacks);

    type_text(&mut editor, "thanks @LOVE");
    tokio::time::sleep(Duration::from_millis(300)).await;
    editor.drain_suggestions();

    assert_eq!(
        editor.mode(),
        Some(InputMode::Suggesting(SuggestionKind::Mention))
    );
    let names: Vec<String> = editor
        .suggestions(SuggestionKind::Mention)
        .iter()
        .map(|candidate| candidate.display_name.clone())
        .collect();
    assert_eq!(names, vec!["Ada Lovelace"]);
    editor.handle_key(&KeyEvent::new(Key::Enter));

    type_text(&mut editor, ":tad");
    tokio::time::sleep(Duration::from_millis(300)).await;
    editor.drain_suggestions();
    editor.handle_key(&KeyEvent::new(Key::Tab));

    editor.handle_key(&KeyEvent::new(Key::Escape));

    assert_eq!(editor.state(), EditorState::Idle);
    assert_eq!(saved.borrow().as_slice(), ["thanks @ada 🎉 "]);
}
