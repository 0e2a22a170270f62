//! Terminal user interface built on [ratatui](https://github.com/ratatui-org/ratatui).
//!
//! The UI replays a finished shell session one snapshot at a time:
//!
//! - **[`app`]**: application state, keyboard event loop, pane focus, auto-play
//! - **[`panes`]**: stateless render functions for each visible pane (script,
//!   queue, heap, output, status bar)
//! - **[`theme`]**: centralized color palette used by all panes
//!
//! The entry point is [`App`]: construct it with a [`Session`] that has run its
//! script and call [`App::run`] to start the event loop.
//!
//! [`Session`]: crate::shell::Session
//! [`App::run`]: app::App::run

pub mod app;
pub mod panes;
pub mod theme;

pub use app::App;
