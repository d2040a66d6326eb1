//! Plain scrollable list of labels.

use super::{apply_nav, inner_rows, SearchBar};
use crate::nav::FlatList;
use crate::ui::keys::{is_quit, nav_key};
use crate::ui::render::{body_and_footer, key_hints, list_lines, render_footer};
use crate::ui::runner::{Flow, Screen};
use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListOutcome {
    /// Enter on this row.
    Chosen(usize),
    Cancelled,
}

pub struct ListScreen {
    title: String,
    list: FlatList,
    search: SearchBar,
}

impl ListScreen {
    pub fn new(title: impl Into<String>, labels: Vec<String>) -> Self {
        Self {
            title: title.into(),
            list: FlatList::new(labels),
            search: SearchBar::default(),
        }
    }

    pub fn list(&self) -> &FlatList {
        &self.list
    }

    pub fn search(&self) -> &SearchBar {
        &self.search
    }
}

impl Screen for ListScreen {
    type Outcome = ListOutcome;

    fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        let (body, status_area, hints_area) = body_and_footer(frame.area());
        self.list.viewport_mut().resize(inner_rows(body.height));

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ({}) ", self.title, self.list.len()))
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(body);
        frame.render_widget(block, body);

        let lines = if self.list.is_empty() {
            vec!["(empty)".into()]
        } else {
            list_lines(
                self.list.visible(),
                self.list.selected_index(),
                usize::from(inner.width),
                self.search.highlight(),
                theme,
            )
        };
        frame.render_widget(Paragraph::new(lines).style(Style::default().fg(theme.fg_dim)), inner);

        let hints = key_hints(&["q=quit", "/ find", "n/N next/prev", "Enter exit"]);
        render_footer(
            frame,
            status_area,
            hints_area,
            self.search.status().as_ref(),
            &hints,
            theme,
        );
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow<ListOutcome> {
        if self.search.offer(&key, &mut self.list) {
            return Flow::Continue;
        }
        if is_quit(&key) {
            return Flow::Exit(ListOutcome::Cancelled);
        }
        if key.code == KeyCode::Enter {
            return Flow::Exit(if self.list.is_empty() {
                ListOutcome::Cancelled
            } else {
                ListOutcome::Chosen(self.list.selected_index())
            });
        }
        if let Some(nav) = nav_key(&key) {
            apply_nav(self.list.viewport_mut(), nav);
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(screen: &mut ListScreen, code: KeyCode) -> Flow<ListOutcome> {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn fruit() -> ListScreen {
        ListScreen::new(
            "fruit",
            vec!["apple".into(), "Banana".into(), "cherry".into()],
        )
    }

    #[test]
    fn test_search_then_enter_chooses_match() {
        let mut screen = fruit();
        for c in ['/', 'a', 'n'] {
            assert_eq!(press(&mut screen, KeyCode::Char(c)), Flow::Continue);
        }
        assert_eq!(screen.list().selected_index(), 1);
        // First Enter accepts the query, the second one chooses.
        assert_eq!(press(&mut screen, KeyCode::Enter), Flow::Continue);
        assert_eq!(
            press(&mut screen, KeyCode::Enter),
            Flow::Exit(ListOutcome::Chosen(1))
        );
    }

    #[test]
    fn test_q_is_text_while_composing() {
        let mut screen = fruit();
        press(&mut screen, KeyCode::Char('/'));
        assert_eq!(press(&mut screen, KeyCode::Char('q')), Flow::Continue);
        press(&mut screen, KeyCode::Esc);
        assert_eq!(
            press(&mut screen, KeyCode::Char('q')),
            Flow::Exit(ListOutcome::Cancelled)
        );
    }

    #[test]
    fn test_navigation_keys() {
        let mut screen = fruit();
        press(&mut screen, KeyCode::Char('G'));
        assert_eq!(screen.list().selected_index(), 2);
        press(&mut screen, KeyCode::Char('k'));
        assert_eq!(screen.list().selected_index(), 1);
        press(&mut screen, KeyCode::Home);
        assert_eq!(screen.list().selected_index(), 0);
    }

    #[test]
    fn test_enter_on_empty_list_cancels() {
        let mut screen = ListScreen::new("nothing", Vec::new());
        assert_eq!(
            press(&mut screen, KeyCode::Enter),
            Flow::Exit(ListOutcome::Cancelled)
        );
    }
}
