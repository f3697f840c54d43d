//! Interaction layer: tools, context-menu commands, and shortcuts that
//! translate input events into `FlowStore` calls.

pub mod commands;
pub mod input;
pub mod shortcuts;
pub mod tools;

pub use input::{InputEvent, Modifiers};
pub use shortcuts::ShortcutAction;
pub use tools::{
    ConnectTool, EditorAction, HitInfo, ResizeTool, SelectTool, Tool, ToolKind,
};
