//! # UI Module
//!
//! Terminal front end over the [`crate::nav`] core.
//!
//! ## Components
//!
//! - [`terminal`] - raw-mode session, panic hook, signal task, event source
//! - [`host`] - what a command flow needs from its environment
//! - [`runner`] - the draw / key loop and the [`Screen`] trait
//! - [`screens`] - one type per full-screen view
//! - [`keys`] - key decoding shared by all screens
//! - [`mod@render`] - row highlighting, status line, footer
//! - [`theme`] - built-in color palettes
//!
//! ## Layout
//!
//! Every screen uses the same frame:
//!
//! ```text
//! ┌ title ────────────────────────┬ Entry ─────────────┐
//! │ rows (virtualized)            │ optional side pane │
//! │                               │                    │
//! └───────────────────────────────┴────────────────────┘
//! status line (search prompt, errors, confirmations)
//! keys: q=quit  ·  / find  ·  ...
//! ```

pub mod host;
pub mod keys;
pub mod render;
pub mod runner;
pub mod screens;
pub mod terminal;
pub mod theme;

pub use host::{Host, TerminalHost};
pub use runner::{run_screen, Ended, Flow, Screen};
pub use terminal::{CrosstermEventReader, EventReader, TerminalSession};
pub use theme::Theme;
