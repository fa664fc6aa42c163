use serde::{Deserialize, Serialize};

/// Which modifier acts as the primary shortcut modifier
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    /// Cmd
    Mac,
    /// Ctrl
    #[default]
    Other,
}

impl Platform {
    /// The platform this binary was built for
    pub fn current() -> Self {
        if cfg!(target_os = "macos") {
            Platform::Mac
        } else {
            Platform::Other
        }
    }

    pub fn is_mac(&self) -> bool {
        *self == Platform::Mac
    }
}

/// A key, independent of the UI toolkit that reported it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Key {
    Char(char),
    Enter,
    Tab,
    Escape,
    Backspace,
    Delete,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Home,
    End,
    Other,
}

impl Key {
    /// Letters compare case-insensitively; Shift is carried by [`Modifiers`]
    pub(crate) fn normalized(self) -> Self {
        match self {
            Key::Char(c) => Key::Char(c.to_ascii_lowercase()),
            key => key,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Modifiers {
    pub ctrl: bool,
    pub alt: bool,
    pub shift: bool,
    pub meta: bool,
}

impl Modifiers {
    pub const NONE: Self = Self {
        ctrl: false,
        alt: false,
        shift: false,
        meta: false,
    };
    pub const CTRL: Self = Self {
        ctrl: true,
        ..Self::NONE
    };
    pub const SHIFT: Self = Self {
        shift: true,
        ..Self::NONE
    };
    pub const META: Self = Self {
        meta: true,
        ..Self::NONE
    };
    pub const CTRL_SHIFT: Self = Self {
        ctrl: true,
        shift: true,
        ..Self::NONE
    };
    pub const META_SHIFT: Self = Self {
        meta: true,
        shift: true,
        ..Self::NONE
    };

    /// Cmd on macOS, Ctrl elsewhere
    pub fn primary(platform: Platform) -> Self {
        if platform.is_mac() { Self::META } else { Self::CTRL }
    }

    pub fn primary_shift(platform: Platform) -> Self {
        if platform.is_mac() {
            Self::META_SHIFT
        } else {
            Self::CTRL_SHIFT
        }
    }

    pub fn has_primary(&self, platform: Platform) -> bool {
        if platform.is_mac() { self.meta } else { self.ctrl }
    }
}

/// One key press as delivered by the host UI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct KeyEvent {
    pub key: Key,
    pub modifiers: Modifiers,
}

impl KeyEvent {
    pub fn new(key: Key) -> Self {
        Self {
            key,
            modifiers: Modifiers::NONE,
        }
    }

    pub fn with_modifiers(key: Key, modifiers: Modifiers) -> Self {
        Self { key, modifiers }
    }

    pub fn char(c: char) -> Self {
        Self::new(Key::Char(c))
    }

    pub fn shift(key: Key) -> Self {
        Self::with_modifiers(key, Modifiers::SHIFT)
    }

    pub fn primary(c: char, platform: Platform) -> Self {
        Self::with_modifiers(Key::Char(c), Modifiers::primary(platform))
    }

    /// Text this key types when it is not part of a shortcut
    pub fn printable(&self) -> Option<char> {
        match self.key {
            Key::Char(c) if !c.is_control() && !self.modifiers.ctrl && !self.modifiers.meta => {
                Some(c)
            }
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case(Platform::Mac, Modifiers::META, true)]
    #[case(Platform::Mac, Modifiers::CTRL, false)]
    #[case(Platform::Other, Modifiers::CTRL, true)]
    #[case(Platform::Other, Modifiers::META, false)]
    fn test_primary_modifier(
        #[case] platform: Platform,
        #[case] modifiers: Modifiers,
        #[case] primary: bool,
    ) {
        assert_eq!(modifiers.has_primary(platform), primary);
        assert!(Modifiers::primary(platform).has_primary(platform));
    }

    #[test]
    fn test_printable() {
        assert_eq!(KeyEvent::char('a').printable(), Some('a'));
        assert_eq!(KeyEvent::shift(Key::Char('A')).printable(), Some('A'));
        assert_eq!(KeyEvent::primary('a', Platform::Other).printable(), None);
        assert_eq!(KeyEvent::primary('a', Platform::Mac).printable(), None);
        assert_eq!(KeyEvent::new(Key::Enter).printable(), None);
    }
}
