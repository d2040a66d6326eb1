//! Key translation shared by every screen.
//!
//! A key first goes to the search session (see [`dispatch_search`]); only
//! when that ignores it is it looked up with [`nav_key`].

use crate::nav::{SearchInput, SearchOutcome, SearchSession, SearchTarget};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

/// Navigation commands understood by all scrollable screens.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NavKey {
    Up,
    Down,
    PageUp,
    PageDown,
    Home,
    End,
}

fn has_ctrl(key: &KeyEvent) -> bool {
    key.modifiers.contains(KeyModifiers::CONTROL)
}

/// Ctrl-C arrives as a key in raw mode; treat it like SIGINT.
pub fn is_interrupt(key: &KeyEvent) -> bool {
    has_ctrl(key) && matches!(key.code, KeyCode::Char('c' | 'C'))
}

pub fn is_quit(key: &KeyEvent) -> bool {
    !has_ctrl(key) && matches!(key.code, KeyCode::Char('q' | 'Q'))
}

pub fn nav_key(key: &KeyEvent) -> Option<NavKey> {
    let ctrl = has_ctrl(key);
    match key.code {
        KeyCode::Char('u' | 'U') if ctrl => Some(NavKey::PageUp),
        KeyCode::Char('d' | 'D') if ctrl => Some(NavKey::PageDown),
        _ if ctrl => None,
        KeyCode::Up | KeyCode::Char('k' | 'K') => Some(NavKey::Up),
        KeyCode::Down | KeyCode::Char('j' | 'J') => Some(NavKey::Down),
        KeyCode::PageUp | KeyCode::Char('u') => Some(NavKey::PageUp),
        KeyCode::PageDown | KeyCode::Char('d') => Some(NavKey::PageDown),
        KeyCode::Home | KeyCode::Char('g') => Some(NavKey::Home),
        KeyCode::End | KeyCode::Char('G') => Some(NavKey::End),
        _ => None,
    }
}

/// What `key` means to a search session in `composing` state.
pub fn search_input(key: &KeyEvent, composing: bool) -> SearchInput {
    if has_ctrl(key) {
        return SearchInput::Other;
    }
    if composing {
        match key.code {
            KeyCode::Char(c) if !c.is_control() => SearchInput::Char(c),
            KeyCode::Backspace => SearchInput::Backspace,
            KeyCode::Enter => SearchInput::Accept,
            KeyCode::Esc => SearchInput::Cancel,
            _ => SearchInput::Other,
        }
    } else {
        match key.code {
            KeyCode::Char('/') => SearchInput::Activate,
            KeyCode::Char('n') => SearchInput::Next,
            KeyCode::Char('N') => SearchInput::Previous,
            _ => SearchInput::Other,
        }
    }
}

/// Offer `key` to the search session. [`SearchOutcome::Ignored`] means the
/// caller should treat it as a normal key.
pub fn dispatch_search(
    session: &mut SearchSession,
    key: &KeyEvent,
    target: &mut dyn SearchTarget,
) -> SearchOutcome {
    let input = search_input(key, session.is_composing());
    session.handle(input, target)
}
