//! Keyboard handling: toolkit-neutral key events, the shortcut keymap and
//! the dispatcher that turns a key press into a [`Dispatch`].

pub mod dispatcher;
pub mod keymap;
pub mod keys;

pub use dispatcher::{Dispatch, DispatchContext, Dispatcher, InputMode, PopoverKey};
pub use keymap::{KeyCombo, Keymap};
pub use keys::{Key, KeyEvent, Modifiers, Platform};
