use anyhow::Result;
use async_trait::async_trait;
use boards_editor_config::{Config, NameDisplaySetting, PlatformSetting};
use boards_editor_engine::collaborators::{
    BoardContext, BoardMembership, BoardType, Member, MemberDirectory, NameDisplay, Permission,
    PermissionChecker, SearchError,
};
use boards_editor_engine::editing::{Document, Selection};
use boards_editor_engine::input::{Dispatch, InputMode, Key, KeyEvent, Modifiers, Platform};
use boards_editor_engine::suggestions::{
    Candidate, EmojiSource, MentionSource, SuggestionHub, SuggestionKind, SuggestionSettings,
};
use boards_editor_engine::{
    EditorCallbacks, EditorConfig, EditorController, EditorState, ToolbarAction,
};
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind, KeyModifiers},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::{
    Frame, Terminal,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout, Position},
    style::{Color, Modifier, Style},
    text::{Line, Span},
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph},
};
use std::cell::RefCell;
use std::io::{Stdout, stdout};
use std::rc::Rc;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use std::{env, process};

type Tui = Terminal<CrosstermBackend<Stdout>>;

/// How the editing session ended
#[derive(Debug, Clone, PartialEq)]
enum Outcome {
    Saved(String),
    Cancelled,
}

/// Everyone on the team; the first three are on the board
fn team() -> Vec<Member> {
    let member = |id: &str, username: &str, first: &str, last: &str, nickname: &str| Member {
        first_name: first.into(),
        last_name: last.into(),
        nickname: nickname.into(),
        ..Member::new(id, username)
    };
    vec![
        member("u1", "grace", "Grace", "Hopper", "amazing grace"),
        member("u2", "alan", "Alan", "Turing", ""),
        member("u3", "ada", "Ada", "Lovelace", "countess"),
        member("u4", "linus", "Linus", "Torvalds", ""),
        member("u5", "margaret", "Margaret", "Hamilton", "maggie"),
        Member {
            is_bot: true,
            ..member("b1", "deploybot", "", "", "")
        },
    ]
}

struct BoardAdmin;

impl PermissionChecker for BoardAdmin {
    fn has_permission(&self, permission: Permission) -> bool {
        matches!(permission, Permission::ManageBoardRoles)
    }
}

/// In-memory stand-in for the team search endpoint
struct TeamDirectory {
    team: Vec<Member>,
}

#[async_trait]
impl MemberDirectory for TeamDirectory {
    async fn search_members(&self, term: &str) -> Result<Vec<Member>, SearchError> {
        // something like a network round trip
        tokio::time::sleep(Duration::from_millis(80)).await;
        let term = term.to_lowercase();
        Ok(self
            .team
            .iter()
            .filter(|member| {
                member.username.contains(&term) || member.full_name().to_lowercase().contains(&term)
            })
            .cloned()
            .collect())
    }
}

/// Parks a proposed member until the user answers y/n
#[derive(Clone, Default)]
struct InvitePrompt(Arc<Mutex<Option<Candidate>>>);

impl InvitePrompt {
    fn pending(&self) -> Option<Candidate> {
        self.0.lock().ok().and_then(|slot| slot.clone())
    }

    fn clear(&self) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = None;
        }
    }
}

impl BoardMembership for InvitePrompt {
    fn propose_member(&self, candidate: &Candidate) {
        if let Ok(mut slot) = self.0.lock() {
            *slot = Some(candidate.clone());
        }
    }
}

struct App {
    editor: EditorController,
    invite: InvitePrompt,
    show_toolbar: bool,
}

impl App {
    fn new(
        config: &Config,
        initial_text: String,
        runtime: &tokio::runtime::Runtime,
        outcome: Rc<RefCell<Option<Outcome>>>,
    ) -> Self {
        let settings = suggestion_settings(config);
        let team = team();
        let board = BoardContext {
            board_type: BoardType::Private,
            current_user_is_guest: false,
            members: team[..3].to_vec(),
        };
        let mentions = MentionSource::new(
            board,
            Arc::new(BoardAdmin),
            Arc::new(TeamDirectory { team }),
        )
        .with_settings(&settings);
        let hub = SuggestionHub::new(
            runtime.handle().clone(),
            Arc::new(mentions),
            Arc::new(EmojiSource::from_settings(&settings)),
            &settings,
        );

        let editor_config = EditorConfig {
            initial_text,
            is_editing: true,
            save_on_enter: config.editor.save_on_enter,
            show_toolbar: config.editor.show_toolbar,
            id: "card-description".to_string(),
            platform: platform(config.editor.platform),
            history_limit: config.editor.history_limit,
        };
        let saved = outcome.clone();
        let callbacks = EditorCallbacks::default()
            .on_change(|text| log::debug!("text now {} chars", text.chars().count()))
            .on_blur(move |text| *saved.borrow_mut() = Some(Outcome::Saved(text.to_string())))
            .on_editor_cancel(move || *outcome.borrow_mut() = Some(Outcome::Cancelled));

        let invite = InvitePrompt::default();
        let editor = EditorController::new(editor_config, hub, callbacks)
            .with_membership(Arc::new(invite.clone()));

        Self {
            editor,
            invite,
            show_toolbar: config.editor.show_toolbar,
        }
    }

    fn handle_key(&mut self, key: event::KeyEvent) {
        if self.editor.has_pending_proposal() {
            match key.code {
                KeyCode::Char('y') => self.answer_invite(true),
                KeyCode::Char('n') | KeyCode::Esc => self.answer_invite(false),
                _ => {}
            }
            return;
        }

        if let KeyCode::F(n) = key.code {
            if self.show_toolbar
                && let Some(action) = (n as usize)
                    .checked_sub(1)
                    .and_then(|index| ToolbarAction::ALL.get(index))
            {
                self.editor.toolbar(*action);
            }
            return;
        }

        let Some(event) = engine_key(&key) else {
            return;
        };
        if self.editor.handle_key(&event) == Dispatch::Ignored
            && let Some(selection) = moved_caret(
                self.editor.document(),
                self.editor.selection(),
                event.key,
                event.modifiers.shift,
            )
        {
            self.editor.set_selection(selection);
        }
    }

    fn answer_invite(&mut self, accepted: bool) {
        if let Some(candidate) = self.invite.pending() {
            log::info!("invite for {} answered: {accepted}", candidate.value);
        }
        self.invite.clear();
        self.editor.resolve_member_proposal(accepted);
    }
}

fn platform(setting: PlatformSetting) -> Platform {
    match setting {
        PlatformSetting::Auto => Platform::current(),
        PlatformSetting::Mac => Platform::Mac,
        PlatformSetting::Other => Platform::Other,
    }
}

fn suggestion_settings(config: &Config) -> SuggestionSettings {
    SuggestionSettings {
        debounce: Duration::from_millis(config.suggestions.debounce_ms),
        member_limit: config.suggestions.member_limit,
        emoji_limit: config.suggestions.emoji_limit,
        name_display: match config.suggestions.name_display {
            NameDisplaySetting::Username => NameDisplay::Username,
            NameDisplaySetting::Nickname => NameDisplay::Nickname,
            NameDisplaySetting::FullName => NameDisplay::FullName,
        },
    }
}

fn engine_key(key: &event::KeyEvent) -> Option<KeyEvent> {
    let code = match key.code {
        KeyCode::Char(c) => Key::Char(c),
        KeyCode::Enter => Key::Enter,
        KeyCode::Tab => Key::Tab,
        KeyCode::Esc => Key::Escape,
        KeyCode::Backspace => Key::Backspace,
        KeyCode::Delete => Key::Delete,
        KeyCode::Up => Key::ArrowUp,
        KeyCode::Down => Key::ArrowDown,
        KeyCode::Left => Key::ArrowLeft,
        KeyCode::Right => Key::ArrowRight,
        KeyCode::Home => Key::Home,
        KeyCode::End => Key::End,
        _ => return None,
    };
    let modifiers = Modifiers {
        ctrl: key.modifiers.contains(KeyModifiers::CONTROL),
        alt: key.modifiers.contains(KeyModifiers::ALT),
        shift: key.modifiers.contains(KeyModifiers::SHIFT),
        meta: key.modifiers.intersects(KeyModifiers::SUPER | KeyModifiers::META),
    };
    Some(KeyEvent::with_modifiers(code, modifiers))
}

/// Caret movement the editor leaves to the host
fn moved_caret(doc: &Document, sel: &Selection, key: Key, extend: bool) -> Option<Selection> {
    let focus = sel.focus();
    let index = doc.index_of(&focus.key)?;
    let block = doc.block(&focus.key)?;
    let blocks = doc.blocks();
    let previous = || index.checked_sub(1).and_then(|i| blocks.get(i));
    let next = || blocks.get(index + 1);

    let (key, offset) = match key {
        Key::ArrowLeft if focus.offset > 0 => (focus.key, focus.offset - 1),
        Key::ArrowLeft => previous().map(|b| (b.key, b.len()))?,
        Key::ArrowRight if focus.offset < block.len() => (focus.key, focus.offset + 1),
        Key::ArrowRight => next().map(|b| (b.key, 0))?,
        Key::ArrowUp => previous().map(|b| (b.key, focus.offset.min(b.len())))?,
        Key::ArrowDown => next().map(|b| (b.key, focus.offset.min(b.len())))?,
        Key::Home => (focus.key, 0),
        Key::End => (focus.key, block.len()),
        _ => return None,
    };

    Some(if extend {
        Selection::new(sel.anchor_key, sel.anchor_offset, key, offset)
    } else {
        Selection::caret(key, offset)
    })
}

fn init_logging() {
    let mut builder = env_logger::Builder::new();
    builder
        .filter_level(log::LevelFilter::Info)
        .parse_default_env();

    // The terminal belongs to the editor, so logs go to a file
    let log_path = env::temp_dir().join("boards-editor-cli.log");
    match std::fs::File::create(&log_path) {
        Ok(file) => {
            builder.target(env_logger::Target::Pipe(Box::new(file)));
        }
        Err(_) => {
            builder.filter_level(log::LevelFilter::Off);
        }
    }
    builder.init();
}

fn main() -> Result<()> {
    init_logging();
    log::info!("boards-editor-cli starting up");

    let args: Vec<String> = env::args().collect();
    let initial_text = match args.len() {
        1 => String::new(),
        2 => args[1].replace("\\n", "\n"),
        _ => {
            eprintln!("Usage: {} [initial-text]", args[0]);
            process::exit(1);
        }
    };

    let config_path = Config::config_path();
    log::info!("Config path: {}", config_path.display());
    let config = match Config::load() {
        Ok(Some(config)) => config,
        Ok(None) => {
            log::info!("No config file, using defaults");
            Config::default()
        }
        Err(e) => {
            eprintln!("Error: Failed to load config file: {e}");
            process::exit(1);
        }
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .worker_threads(1)
        .enable_time()
        .build()?;
    let outcome = Rc::new(RefCell::new(None));

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(&config, initial_text, &runtime, outcome.clone());
    let res = run_app(&mut terminal, &mut app);
    // flushes on_blur if the loop bailed out with unsaved text
    drop(app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = res {
        println!("{err:?}");
    }

    match outcome.borrow().as_ref() {
        Some(Outcome::Saved(text)) => println!("{text}"),
        Some(Outcome::Cancelled) => eprintln!("Edit cancelled"),
        None => {}
    }

    Ok(())
}

fn run_app(terminal: &mut Tui, app: &mut App) -> Result<()> {
    loop {
        app.editor.drain_suggestions();
        terminal.draw(|f| ui(f, app))?;

        if app.editor.state() == EditorState::Idle {
            return Ok(());
        }
        if !event::poll(Duration::from_millis(50))? {
            continue;
        }
        if let Event::Key(key) = event::read()?
            && key.kind == KeyEventKind::Press
        {
            app.handle_key(key);
        }
    }
}

fn chars(text: &str, start: usize, end: usize) -> String {
    text.chars()
        .skip(start)
        .take(end.saturating_sub(start))
        .collect()
}

fn document_lines(editor: &EditorController) -> Vec<Line<'static>> {
    let doc = editor.document();
    let range = editor.selection().normalized(doc).and_then(|sel| {
        Some((
            doc.index_of(&sel.anchor_key)?,
            sel.anchor_offset,
            doc.index_of(&sel.focus_key)?,
            sel.focus_offset,
        ))
    });
    let highlight = Style::default().add_modifier(Modifier::REVERSED);

    doc.blocks()
        .iter()
        .enumerate()
        .map(|(i, block)| match range {
            Some((start, start_offset, end, end_offset))
                if (start..=end).contains(&i) && (start, start_offset) != (end, end_offset) =>
            {
                let from = if i == start { start_offset } else { 0 };
                let to = if i == end { end_offset } else { block.len() };
                Line::from(vec![
                    Span::raw(chars(&block.text, 0, from)),
                    Span::styled(chars(&block.text, from, to), highlight),
                    Span::raw(chars(&block.text, to, block.len())),
                ])
            }
            _ => Line::from(block.text.clone()),
        })
        .collect()
}

const COMPOSING_HELP: &str =
    "Esc: save & exit | Shift+Enter: new line | Ctrl+B/I/U/K/E: format | Ctrl+Z/Y: undo/redo";

fn ui(f: &mut Frame, app: &mut App) {
    let popover_height = if app.editor.popover().is_some() { 8 } else { 0 };
    let toolbar_height = if app.show_toolbar { 1 } else { 0 };
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(toolbar_height),
            Constraint::Min(3),
            Constraint::Length(popover_height),
            Constraint::Length(1),
        ])
        .split(f.area());

    if app.show_toolbar {
        let buttons: Vec<Span> = ToolbarAction::ALL
            .iter()
            .enumerate()
            .map(|(i, action)| Span::raw(format!("F{} {action:?}  ", i + 1)))
            .collect();
        f.render_widget(Paragraph::new(Line::from(buttons)), chunks[0]);
    }

    let editor_area = chunks[1];
    let content = Paragraph::new(document_lines(&app.editor))
        .block(Block::default().borders(Borders::ALL).title("Card description"));
    f.render_widget(content, editor_area);

    let doc = app.editor.document();
    let focus = app.editor.selection().focus();
    if let (Some(row), Some(block)) = (doc.index_of(&focus.key), doc.block(&focus.key)) {
        let column = Span::raw(chars(&block.text, 0, focus.offset)).width();
        let x = editor_area.x + 1 + u16::try_from(column).unwrap_or(u16::MAX);
        let y = editor_area.y + 1 + u16::try_from(row).unwrap_or(u16::MAX);
        f.set_cursor_position(Position::new(
            x.min(editor_area.right().saturating_sub(2)),
            y.min(editor_area.bottom().saturating_sub(2)),
        ));
    }

    if let Some(pipeline) = app.editor.popover() {
        let title = match pipeline.kind() {
            SuggestionKind::Mention => "People",
            SuggestionKind::Emoji => "Emoji",
        };
        let mut items: Vec<ListItem> = pipeline
            .candidates()
            .iter()
            .map(|candidate| ListItem::new(candidate_line(candidate)))
            .collect();
        if items.is_empty() {
            items.push(ListItem::new(Line::styled(
                "No matches",
                Style::default().fg(Color::DarkGray),
            )));
        }
        let list = List::new(items)
            .block(Block::default().borders(Borders::ALL).title(title))
            .highlight_style(Style::default().bg(Color::Yellow).fg(Color::Black));
        let mut state = ListState::default();
        state.select(Some(pipeline.highlighted_index()));
        f.render_stateful_widget(list, chunks[2], &mut state);
    }

    let status = match (app.invite.pending(), app.editor.mode()) {
        (Some(candidate), _) => format!("Add {} to the board? (y/n)", candidate.display_name),
        (None, Some(InputMode::Suggesting(_))) => {
            "↑/↓: choose | Enter/Tab: insert | Esc: close".to_string()
        }
        _ => COMPOSING_HELP.to_string(),
    };
    f.render_widget(Paragraph::new(Line::from(status)), chunks[3]);
}

fn candidate_line(candidate: &Candidate) -> Line<'static> {
    match candidate.kind {
        SuggestionKind::Mention => {
            let mut spans = vec![
                Span::raw(candidate.display_name.clone()),
                Span::styled(
                    format!(" @{}", candidate.value),
                    Style::default().fg(Color::DarkGray),
                ),
            ];
            if candidate.is_bot {
                spans.push(Span::raw(" [bot]"));
            }
            if !candidate.is_board_member {
                spans.push(Span::styled(
                    " (not on board)",
                    Style::default().fg(Color::Red),
                ));
            }
            Line::from(spans)
        }
        SuggestionKind::Emoji => {
            Line::from(format!("{} {}", candidate.value, candidate.display_name))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_engine_key_maps_modifiers() {
        let key = event::KeyEvent::new(KeyCode::Char('b'), KeyModifiers::CONTROL);

        let mapped = engine_key(&key).unwrap();

        assert_eq!(mapped.key, Key::Char('b'));
        assert!(mapped.modifiers.ctrl);
        assert!(!mapped.modifiers.shift);
        assert!(engine_key(&event::KeyEvent::new(KeyCode::F(1), KeyModifiers::NONE)).is_none());
    }

    #[test]
    fn test_caret_moves_across_blocks() {
        let doc = Document::from_text("ab\ncde");
        let first = doc.first().key;
        let second = doc.last().key;

        let left = moved_caret(&doc, &Selection::caret(second, 0), Key::ArrowLeft, false);
        assert_eq!(left, Some(Selection::caret(first, 2)));

        let down = moved_caret(&doc, &Selection::caret(first, 2), Key::ArrowDown, false);
        assert_eq!(down, Some(Selection::caret(second, 2)));

        let extended = moved_caret(&doc, &Selection::caret(first, 0), Key::End, true);
        assert_eq!(extended, Some(Selection::new(first, 0, first, 2)));

        assert_eq!(
            moved_caret(&doc, &Selection::caret(first, 0), Key::ArrowUp, false),
            None
        );
    }

    #[test]
    fn test_config_maps_to_engine_settings() {
        let mut config = Config::default();
        config.suggestions.debounce_ms = 50;
        config.suggestions.name_display = NameDisplaySetting::FullName;
        config.editor.platform = PlatformSetting::Mac;

        let settings = suggestion_settings(&config);

        assert_eq!(settings.debounce, Duration::from_millis(50));
        assert_eq!(settings.name_display, NameDisplay::FullName);
        assert_eq!(platform(config.editor.platform), Platform::Mac);
    }
}
