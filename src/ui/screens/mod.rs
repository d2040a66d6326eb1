//! # Screens
//!
//! - [`ListScreen`] - flat label list (`list`, `pick`)
//! - [`BrowserScreen`] - archive entries with a metadata panel (`browse`)
//! - [`JsonTreeScreen`] - collapsible JSON tree (`tree`)
//! - [`ConversationsScreen`] - conversation titles (`gpt`)
//! - [`TranscriptScreen`] - one wrapped conversation (`gpt`, after Enter)
//!
//! Every screen owns its rows and one [`SearchBar`]; keys go to the search
//! bar first and only unhandled keys reach the screen's own bindings.

pub mod browser;
pub mod conversations;
pub mod json_tree;
pub mod list;
pub mod transcript;

pub use browser::{BrowseAction, BrowserScreen};
pub use conversations::{ConversationAction, ConversationsScreen};
pub use json_tree::JsonTreeScreen;
pub use list::{ListOutcome, ListScreen};
pub use transcript::{TranscriptAction, TranscriptScreen};

use crate::nav::{SearchOutcome, SearchSession, SearchTarget, Viewport};
use crate::ui::keys::{dispatch_search, NavKey};
use crate::ui::render::{search_status, Status};
use crossterm::event::KeyEvent;

/// A search session plus the outcome of the last key it handled.
#[derive(Debug, Clone, Default)]
pub struct SearchBar {
    session: SearchSession,
    last: Option<SearchOutcome>,
}

impl SearchBar {
    pub fn session(&self) -> &SearchSession {
        &self.session
    }

    /// Offer `key` to the session. Returns `true` when it was consumed.
    pub fn offer(&mut self, key: &KeyEvent, target: &mut dyn SearchTarget) -> bool {
        let outcome = dispatch_search(&mut self.session, key, target);
        if outcome == SearchOutcome::Ignored {
            self.last = None;
            return false;
        }
        self.last = Some(outcome);
        true
    }

    /// Query to highlight in drawn rows.
    pub fn highlight(&self) -> &str {
        self.session.highlight_query()
    }

    /// Status line owed to the search: the prompt while composing, or a
    /// miss after `n` / `N`.
    pub fn status(&self) -> Option<Status> {
        let no_match = self.last == Some(SearchOutcome::NoMatch);
        search_status(&self.session, no_match).or_else(|| {
            no_match.then(|| Status::error(format!("No match: {}", self.session.last_query())))
        })
    }
}

/// Apply a navigation key to a selection-oriented viewport.
pub fn apply_nav(viewport: &mut Viewport, nav: NavKey) {
    match nav {
        NavKey::Up => viewport.move_by(-1),
        NavKey::Down => viewport.move_by(1),
        NavKey::PageUp => viewport.page_up(),
        NavKey::PageDown => viewport.page_down(),
        NavKey::Home => viewport.home(),
        NavKey::End => viewport.end(),
    }
}

/// Rows available inside a bordered block of `height` rows.
pub(crate) fn inner_rows(height: u16) -> usize {
    usize::from(height.saturating_sub(2)).max(1)
}
