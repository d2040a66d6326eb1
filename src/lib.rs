//! zipscope - terminal viewers for zip archives, JSON documents and
//! conversation exports.
//!
//! The [`nav`] module is the terminal-independent navigation core
//! (viewport, tree, search, text panel). [`ui`] draws it with ratatui,
//! [`commands`] wires each subcommand to its data source.

pub mod archive;
pub mod commands;
pub mod config;
pub mod error;
pub mod input;
pub mod launcher;
pub mod logging;
pub mod nav;
pub mod transcript;
pub mod ui;
