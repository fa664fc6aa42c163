pub mod collaborators;
pub mod controller;
pub mod editing;
pub mod input;
pub mod suggestions;

pub use controller::{
    EditorCallbacks, EditorConfig, EditorController, EditorState, ToolbarAction,
};
