//! # Terminal Session
//!
//! Raw mode and the alternate screen are owned by [`TerminalSession`]. The
//! terminal is put back to normal by, in order of preference:
//!
//! 1. [`TerminalSession::suspend`] before a nested viewer takes over
//! 2. `Drop` when a command returns or unwinds
//! 3. the panic hook from [`install_panic_hook`]
//! 4. the SIGINT/SIGTERM task from [`spawn_signal_listener`], which then exits
//!    with 130 / 143

use crate::error::ToolError;
use anyhow::{Context, Result};
use crossterm::{
    cursor::{Hide, Show},
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::{self, Stdout};
use std::panic;
use std::sync::Once;
use std::time::Duration;

pub type CrosstermTerminal = Terminal<CrosstermBackend<Stdout>>;

/// Exit status after SIGINT (or Ctrl-C in raw mode).
pub const EXIT_INTERRUPTED: u8 = 130;
/// Exit status after SIGTERM.
pub const EXIT_TERMINATED: u8 = 143;

/// Source of terminal events, injectable for tests.
pub trait EventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>>;
}

/// Production event reader that uses crossterm's event polling + read.
/// Key release and repeat events (reported on Windows) are dropped.
pub struct CrosstermEventReader;

impl EventReader for CrosstermEventReader {
    fn read_event(&mut self, timeout: Duration) -> Result<Option<Event>> {
        if !event::poll(timeout).context("Failed to poll for events")? {
            return Ok(None);
        }
        match event::read().context("Failed to read terminal event")? {
            Event::Key(key) if key.kind != KeyEventKind::Press => Ok(None),
            other => Ok(Some(other)),
        }
    }
}

/// Put the terminal back into cooked mode on the main screen. Safe to call
/// more than once.
pub fn restore_terminal() {
    let _ = disable_raw_mode();
    let _ = execute!(io::stdout(), LeaveAlternateScreen, Show);
}

static PANIC_HOOK: Once = Once::new();

/// Restore the terminal before the default panic message is printed.
pub fn install_panic_hook() {
    PANIC_HOOK.call_once(|| {
        let original_hook = panic::take_hook();
        panic::set_hook(Box::new(move |panic_info| {
            restore_terminal();
            original_hook(panic_info);
        }));
    });
}

/// Background task that restores the terminal and exits when the process
/// receives SIGINT or SIGTERM. Must be called inside a tokio runtime.
pub fn spawn_signal_listener() -> tokio::task::JoinHandle<()> {
    tokio::spawn(async {
        let code = wait_for_termination().await;
        tracing::info!(code, "terminating on signal");
        restore_terminal();
        std::process::exit(i32::from(code));
    })
}

#[cfg(unix)]
async fn wait_for_termination() -> u8 {
    use tokio::signal::unix::{signal, SignalKind};

    let Ok(mut term) = signal(SignalKind::terminate()) else {
        return match tokio::signal::ctrl_c().await {
            Ok(()) => EXIT_INTERRUPTED,
            Err(_) => std::future::pending().await,
        };
    };
    tokio::select! {
        res = tokio::signal::ctrl_c() => match res {
            Ok(()) => EXIT_INTERRUPTED,
            Err(_) => std::future::pending().await,
        },
        _ = term.recv() => EXIT_TERMINATED,
    }
}

#[cfg(not(unix))]
async fn wait_for_termination() -> u8 {
    match tokio::signal::ctrl_c().await {
        Ok(()) => EXIT_INTERRUPTED,
        Err(_) => std::future::pending().await,
    }
}

/// Raw mode + alternate screen for the lifetime of the value.
pub struct TerminalSession {
    terminal: CrosstermTerminal,
    active: bool,
}

impl TerminalSession {
    pub fn enter() -> Result<Self, ToolError> {
        install_panic_hook();
        let terminal_error = |e: io::Error| ToolError::Terminal {
            detail: e.to_string(),
        };
        enable_raw_mode().map_err(terminal_error)?;
        if let Err(e) = execute!(io::stdout(), EnterAlternateScreen, Hide) {
            restore_terminal();
            return Err(terminal_error(e));
        }
        let terminal = match Terminal::new(CrosstermBackend::new(io::stdout())) {
            Ok(terminal) => terminal,
            Err(e) => {
                restore_terminal();
                return Err(terminal_error(e));
            }
        };
        tracing::debug!("terminal session entered");
        Ok(Self {
            terminal,
            active: true,
        })
    }

    pub fn terminal_mut(&mut self) -> &mut CrosstermTerminal {
        &mut self.terminal
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Hand the terminal to a child process.
    pub fn suspend(&mut self) -> Result<()> {
        if !self.active {
            return Ok(());
        }
        disable_raw_mode().context("Failed to disable raw mode")?;
        execute!(self.terminal.backend_mut(), LeaveAlternateScreen, Show)
            .context("Failed to leave alternate screen")?;
        self.active = false;
        tracing::debug!("terminal session suspended");
        Ok(())
    }

    /// Take the terminal back after a child process and force a full redraw.
    pub fn resume(&mut self) -> Result<()> {
        if self.active {
            return Ok(());
        }
        enable_raw_mode().context("Failed to enable raw mode")?;
        execute!(self.terminal.backend_mut(), EnterAlternateScreen, Hide)
            .context("Failed to enter alternate screen")?;
        self.terminal.clear().context("Failed to clear terminal")?;
        self.active = true;
        tracing::debug!("terminal session resumed");
        Ok(())
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if self.active {
            restore_terminal();
            let _ = self.terminal.show_cursor();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossterm_event_reader_type() {
        let _reader: Box<dyn EventReader> = Box::new(CrosstermEventReader);
    }

    #[test]
    fn test_exit_codes() {
        assert_eq!(EXIT_INTERRUPTED, 128 + 2);
        assert_eq!(EXIT_TERMINATED, 128 + 15);
    }

    #[test]
    fn test_panic_hook_installs_once() {
        install_panic_hook();
        install_panic_hook();
    }
}
