use crate::editing::Command;
use crate::input::{Key, KeyEvent, Keymap, Platform};
use crate::suggestions::SuggestionKind;

/// What the keyboard is currently driving
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum InputMode {
    #[default]
    Composing,
    /// A suggestion popover is open and owns the navigation keys
    Suggesting(SuggestionKind),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PopoverKey {
    Up,
    Down,
    Accept,
    Dismiss,
}

/// Resolved meaning of a key press
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Dispatch {
    Command(Command),
    Popover(PopoverKey),
    InsertText(String),
    SplitBlock,
    DeleteBackward,
    DeleteForward,
    Ignored,
}

/// Editor state the dispatcher needs to resolve a key
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DispatchContext {
    pub mode: InputMode,
    pub save_on_enter: bool,
    pub document_empty: bool,
}

/// Maps key presses to commands, popover navigation or plain edits
#[derive(Debug, Clone)]
pub struct Dispatcher {
    keymap: Keymap,
}

impl Dispatcher {
    pub fn new(platform: Platform) -> Self {
        Self {
            keymap: Keymap::default_for(platform),
        }
    }

    pub fn with_keymap(keymap: Keymap) -> Self {
        Self { keymap }
    }

    pub fn keymap(&self) -> &Keymap {
        &self.keymap
    }

    pub fn keymap_mut(&mut self) -> &mut Keymap {
        &mut self.keymap
    }

    pub fn dispatch(&self, event: &KeyEvent, ctx: &DispatchContext) -> Dispatch {
        if let InputMode::Suggesting(_) = ctx.mode
            && let Some(key) = popover_key(event)
        {
            return Dispatch::Popover(key);
        }

        if let Some(command) = self.keymap.lookup(event) {
            return Dispatch::Command(command);
        }

        match event.key {
            Key::Escape => Dispatch::Command(Command::Blur),
            Key::Backspace if ctx.document_empty => Dispatch::Command(Command::Backspace),
            Key::Backspace => Dispatch::DeleteBackward,
            Key::Delete => Dispatch::DeleteForward,
            Key::Enter if ctx.save_on_enter && !event.modifiers.shift => {
                Dispatch::Command(Command::Blur)
            }
            Key::Enter => Dispatch::SplitBlock,
            _ => match event.printable() {
                Some(c) => Dispatch::InsertText(c.to_string()),
                None => Dispatch::Ignored,
            },
        }
    }
}

fn popover_key(event: &KeyEvent) -> Option<PopoverKey> {
    match event.key {
        Key::ArrowUp => Some(PopoverKey::Up),
        Key::ArrowDown => Some(PopoverKey::Down),
        Key::Enter | Key::Tab => Some(PopoverKey::Accept),
        Key::Escape => Some(PopoverKey::Dismiss),
        _ => None,
    }
}
