//! # Search Session
//!
//! Incremental substring search shared by every screen. The session knows
//! nothing about what a row is; hosts expose their rows through
//! [`SearchTarget`] and the session only ever asks them to select an index.
//!
//! ## States
//!
//! ```text
//!            activate              accept (non-empty)
//!   Idle ───────────────▶ Composing ───────────────▶ Committed
//!    ▲                     │   ▲                         │
//!    └─── cancel / accept ─┘   └──────── activate ───────┘
//!         (empty query)
//! ```
//!
//! `Committed` behaves like `Idle` for navigation keys but keeps the last
//! accepted query so `next` / `previous` can repeat it.

use crate::nav::text::contains_ignore_case;
use std::borrow::Cow;

/// Capability a host screen implements so the session can search its rows.
pub trait SearchTarget {
    fn row_count(&self) -> usize;
    /// Plain, undecorated text of a row.
    fn row_text(&self, index: usize) -> Cow<'_, str>;
    fn selected(&self) -> usize;
    fn select(&mut self, index: usize);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchMode {
    Idle,
    Composing,
    Committed,
}

/// Search-related key intents, already decoded from raw key events.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchInput {
    Activate,
    Char(char),
    Backspace,
    Accept,
    Cancel,
    Next,
    Previous,
    /// Any other key pressed while composing.
    Other,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// The session did not handle the input; the host may interpret it.
    Ignored,
    /// Handled without moving the selection.
    Consumed,
    /// Handled and the host was asked to select this index.
    Moved(usize),
    /// Handled, the query matched nothing, selection untouched.
    NoMatch,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Forward,
    Backward,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchSession {
    mode: SearchMode,
    buffer: String,
    last_query: String,
    anchor: usize,
}

impl Default for SearchSession {
    fn default() -> Self {
        Self::new()
    }
}

impl SearchSession {
    pub fn new() -> Self {
        Self {
            mode: SearchMode::Idle,
            buffer: String::new(),
            last_query: String::new(),
            anchor: 0,
        }
    }

    pub fn mode(&self) -> SearchMode {
        self.mode
    }

    pub fn is_composing(&self) -> bool {
        self.mode == SearchMode::Composing
    }

    /// The query being typed; empty unless composing.
    pub fn buffer(&self) -> &str {
        if self.is_composing() {
            &self.buffer
        } else {
            ""
        }
    }

    pub fn last_query(&self) -> &str {
        &self.last_query
    }

    /// Query to highlight in rendered rows.
    pub fn highlight_query(&self) -> &str {
        if self.is_composing() {
            &self.buffer
        } else {
            &self.last_query
        }
    }

    /// Feed one decoded input to the session.
    pub fn handle(&mut self, input: SearchInput, target: &mut dyn SearchTarget) -> SearchOutcome {
        if self.is_composing() {
            return self.handle_composing(input, target);
        }
        match input {
            SearchInput::Activate => {
                self.activate(target.selected());
                SearchOutcome::Consumed
            }
            SearchInput::Next => self.repeat(Direction::Forward, target),
            SearchInput::Previous => self.repeat(Direction::Backward, target),
            _ => SearchOutcome::Ignored,
        }
    }

    fn handle_composing(
        &mut self,
        input: SearchInput,
        target: &mut dyn SearchTarget,
    ) -> SearchOutcome {
        match input {
            SearchInput::Char(c) => {
                self.buffer.push(c);
                self.live_search(target)
            }
            SearchInput::Backspace => {
                self.buffer.pop();
                self.live_search(target)
            }
            SearchInput::Accept => {
                self.last_query = std::mem::take(&mut self.buffer);
                self.mode = self.resting_mode();
                SearchOutcome::Consumed
            }
            SearchInput::Cancel => {
                self.buffer.clear();
                self.mode = self.resting_mode();
                SearchOutcome::Consumed
            }
            SearchInput::Activate
            | SearchInput::Next
            | SearchInput::Previous
            | SearchInput::Other => SearchOutcome::Consumed,
        }
    }

    fn activate(&mut self, anchor: usize) {
        self.mode = SearchMode::Composing;
        self.buffer.clear();
        self.anchor = anchor;
    }

    fn resting_mode(&self) -> SearchMode {
        if self.last_query.is_empty() {
            SearchMode::Idle
        } else {
            SearchMode::Committed
        }
    }

    /// Search forward from just after the anchor, wrapping to the top.
    fn live_search(&self, target: &mut dyn SearchTarget) -> SearchOutcome {
        if self.buffer.is_empty() {
            return SearchOutcome::Consumed;
        }
        match find_from(&*target, self.anchor, Direction::Forward, &self.buffer) {
            Some(index) => {
                target.select(index);
                SearchOutcome::Moved(index)
            }
            None => SearchOutcome::NoMatch,
        }
    }

    fn repeat(&self, direction: Direction, target: &mut dyn SearchTarget) -> SearchOutcome {
        if self.last_query.is_empty() {
            return SearchOutcome::Ignored;
        }
        match find_from(&*target, target.selected(), direction, &self.last_query) {
            Some(index) => {
                target.select(index);
                SearchOutcome::Moved(index)
            }
            None => SearchOutcome::NoMatch,
        }
    }
}

/// Scan every row once, starting next to `start` and wrapping around; `start`
/// itself is examined last.
pub fn find_from(
    target: &dyn SearchTarget,
    start: usize,
    direction: Direction,
    query: &str,
) -> Option<usize> {
    let count = target.row_count();
    if count == 0 || query.is_empty() {
        return None;
    }
    let start = start.min(count - 1);
    (1..=count)
        .map(|step| match direction {
            Direction::Forward => (start + step) % count,
            Direction::Backward => (start + count - step % count) % count,
        })
        .find(|&index| contains_ignore_case(&target.row_text(index), query))
}
