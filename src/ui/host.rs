//! The environment a command flow runs screens in.
//!
//! [`TerminalHost`] is the real terminal; tests provide their own [`Host`]
//! over `ratatui::backend::TestBackend` with scripted key events.

use crate::error::ToolError;
use crate::launcher;
use crate::ui::runner::{run_screen, Ended, Screen};
use crate::ui::terminal::{CrosstermEventReader, EventReader, TerminalSession};
use crate::ui::theme::Theme;
use anyhow::Result;
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::ffi::OsString;
use std::future::Future;
use std::io::Stdout;
use std::path::Path;

pub trait Host {
    type Backend: Backend;

    /// The terminal to draw on and the source of its key events.
    fn parts(&mut self) -> (&mut Terminal<Self::Backend>, &mut dyn EventReader);

    /// Give the terminal to a child process.
    fn suspend(&mut self) -> Result<()>;

    /// Take the terminal back from a child process.
    fn resume(&mut self) -> Result<()>;

    /// Hand a file to the platform's default application.
    fn open_external(&mut self, path: &Path) -> bool;

    /// Run this program again with `args` on the (suspended) terminal.
    fn run_nested(&mut self, args: Vec<OsString>) -> impl Future<Output = Result<(), ToolError>>;

    fn run<S: Screen>(&mut self, screen: &mut S, theme: &Theme) -> Result<Ended<S::Outcome>> {
        let (terminal, events) = self.parts();
        run_screen(terminal, screen, events, theme)
    }
}

/// The process's own terminal.
pub struct TerminalHost {
    session: TerminalSession,
    events: CrosstermEventReader,
}

impl TerminalHost {
    pub fn enter() -> Result<Self, ToolError> {
        Ok(Self {
            session: TerminalSession::enter()?,
            events: CrosstermEventReader,
        })
    }
}

impl Host for TerminalHost {
    type Backend = CrosstermBackend<Stdout>;

    fn parts(&mut self) -> (&mut Terminal<Self::Backend>, &mut dyn EventReader) {
        (self.session.terminal_mut(), &mut self.events)
    }

    fn suspend(&mut self) -> Result<()> {
        self.session.suspend()
    }

    fn resume(&mut self) -> Result<()> {
        self.session.resume()
    }

    fn open_external(&mut self, path: &Path) -> bool {
        launcher::open_with_default_handler(path)
    }

    fn run_nested(&mut self, args: Vec<OsString>) -> impl Future<Output = Result<(), ToolError>> {
        async move { launcher::run_nested_viewer(&args).await }
    }
}
