//! TUI pane rendering modules
//!
//! - [`tree`]: the positioned call tree on a canvas
//! - [`source`]: routine text with syntax highlighting
//! - [`console`]: narration of the current event and captured `console.log` output
//! - [`status`]: status bar with keybindings and playback state
//!
//! Each module exports a stateless `render_*` function; scroll and viewport
//! state lives in [`App`](crate::ui::App).

pub mod console;
pub mod source;
pub mod status;
pub mod tree;

pub use console::render_console_pane;
pub use source::{render_source_pane, SourceScrollState};
pub use status::render_status_bar;
pub use tree::{render_tree_pane, TreeViewport};
