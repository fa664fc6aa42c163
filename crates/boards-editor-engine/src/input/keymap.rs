use std::collections::HashMap;

use crate::editing::Command;
use crate::input::{Key, KeyEvent, Modifiers, Platform};

/// A key plus the modifiers held with it
///
/// Letters are stored lowercase, so `Shift+Z` is `{ Char('z'), SHIFT }`
/// whether the host reported `'z'` or `'Z'`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyCombo {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyCombo {
    pub fn new(key: Key, modifiers: Modifiers) -> Self {
        Self {
            key: key.normalized(),
            modifiers,
        }
    }

    pub fn ctrl(c: char) -> Self {
        Self::new(Key::Char(c), Modifiers::CTRL)
    }

    pub fn primary(c: char, platform: Platform) -> Self {
        Self::new(Key::Char(c), Modifiers::primary(platform))
    }

    pub fn primary_shift(c: char, platform: Platform) -> Self {
        Self::new(Key::Char(c), Modifiers::primary_shift(platform))
    }
}

impl From<&KeyEvent> for KeyCombo {
    fn from(event: &KeyEvent) -> Self {
        Self::new(event.key, event.modifiers)
    }
}

/// Shortcut table from key combos to commands
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Keymap {
    bindings: HashMap<KeyCombo, Command>,
}

impl Keymap {
    /// An empty keymap
    pub fn new() -> Self {
        Self {
            bindings: HashMap::new(),
        }
    }

    pub fn default_for(platform: Platform) -> Self {
        let mut keymap = Self::new();

        keymap.bind(KeyCombo::primary('b', platform), Command::Bold);
        keymap.bind(KeyCombo::primary('i', platform), Command::Italic);
        keymap.bind(KeyCombo::primary('u', platform), Command::Strikethrough);
        keymap.bind(KeyCombo::primary('k', platform), Command::Link);
        keymap.bind(KeyCombo::primary('e', platform), Command::Code);

        keymap.bind(KeyCombo::primary('z', platform), Command::Undo);
        keymap.bind(KeyCombo::primary_shift('z', platform), Command::Redo);
        if !platform.is_mac() {
            keymap.bind(KeyCombo::ctrl('y'), Command::Redo);
        }

        keymap
    }

    pub fn bind(&mut self, combo: KeyCombo, command: Command) {
        self.bindings.insert(combo, command);
    }

    pub fn unbind(&mut self, combo: KeyCombo) -> Option<Command> {
        self.bindings.remove(&combo)
    }

    pub fn lookup(&self, event: &KeyEvent) -> Option<Command> {
        self.bindings.get(&KeyCombo::from(event)).copied()
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl Default for Keymap {
    fn default() -> Self {
        Self::default_for(Platform::current())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case('b', Command::Bold)]
    #[case('i', Command::Italic)]
    #[case('u', Command::Strikethrough)]
    #[case('k', Command::Link)]
    #[case('e', Command::Code)]
    #[case('z', Command::Undo)]
    fn test_primary_shortcuts(#[case] c: char, #[case] command: Command) {
        for platform in [Platform::Mac, Platform::Other] {
            let keymap = Keymap::default_for(platform);

            assert_eq!(keymap.lookup(&KeyEvent::primary(c, platform)), Some(command));
        }
    }

    #[test]
    fn test_redo_bindings() {
        let mac = Keymap::default_for(Platform::Mac);
        let other = Keymap::default_for(Platform::Other);
        let ctrl_y = KeyEvent::with_modifiers(Key::Char('y'), Modifiers::CTRL);
        // hosts usually report the shifted letter
        let shift_z = |platform| {
            KeyEvent::with_modifiers(Key::Char('Z'), Modifiers::primary_shift(platform))
        };

        assert_eq!(mac.lookup(&shift_z(Platform::Mac)), Some(Command::Redo));
        assert_eq!(other.lookup(&shift_z(Platform::Other)), Some(Command::Redo));
        assert_eq!(other.lookup(&ctrl_y), Some(Command::Redo));
        assert_eq!(mac.lookup(&ctrl_y), None);
    }

    #[test]
    fn test_wrong_modifier_does_not_match() {
        let keymap = Keymap::default_for(Platform::Mac);

        assert_eq!(
            keymap.lookup(&KeyEvent::with_modifiers(Key::Char('b'), Modifiers::CTRL)),
            None
        );
        assert_eq!(keymap.lookup(&KeyEvent::char('b')), None);
    }

    #[test]
    fn test_bind_and_unbind() {
        let mut keymap = Keymap::new();
        let combo = KeyCombo::primary('q', Platform::Other);

        keymap.bind(combo, Command::Quote);
        assert_eq!(
            keymap.lookup(&KeyEvent::primary('q', Platform::Other)),
            Some(Command::Quote)
        );

        assert_eq!(keymap.unbind(combo), Some(Command::Quote));
        assert!(keymap.is_empty());
    }
}
