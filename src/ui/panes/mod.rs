//! TUI pane rendering modules
//!
//! # Pane Modules
//!
//! - [`script`]: The command script with the current line highlighted
//! - [`queue`]: The node chain from head to tail, with addresses
//! - [`heap`]: The allocation ledger, live blocks and tombstones
//! - [`terminal`]: Output the shell printed so far
//! - [`status`]: Status bar with keybindings and replay position
//!
//! Each pane module exports a `render_*` function plus any scroll state it
//! keeps between frames.

pub mod heap;
pub mod queue;
pub mod script;
pub mod status;
pub mod terminal;

pub use heap::{render_heap_pane, HeapScrollState};
pub use queue::render_queue_pane;
pub use script::{render_script_pane, ScriptScrollState};
pub use status::{render_status_bar, StatusRenderData};
pub use terminal::render_terminal_pane;
