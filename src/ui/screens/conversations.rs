//! List of conversations in an export archive.

use super::{apply_nav, inner_rows, SearchBar};
use crate::nav::FlatList;
use crate::transcript::Conversation;
use crate::ui::keys::{is_quit, nav_key};
use crate::ui::render::{body_and_footer, key_hints, list_lines, render_footer, Status};
use crate::ui::runner::{Flow, Screen};
use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::Style,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConversationAction {
    Quit,
    Open(usize),
    Export(usize),
}

pub struct ConversationsScreen {
    title: String,
    conversations: Vec<Conversation>,
    list: FlatList,
    search: SearchBar,
    status: Option<Status>,
}

impl ConversationsScreen {
    pub fn new(title: impl Into<String>, conversations: Vec<Conversation>) -> Self {
        let list = FlatList::new(conversations.iter().map(|c| c.label.clone()).collect());
        Self {
            title: title.into(),
            conversations,
            list,
            search: SearchBar::default(),
            status: None,
        }
    }

    pub fn conversation(&self, index: usize) -> Option<&Conversation> {
        self.conversations.get(index)
    }

    pub fn list(&self) -> &FlatList {
        &self.list
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }
}

impl Screen for ConversationsScreen {
    type Outcome = ConversationAction;

    fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        let (body, status_area, hints_area) = body_and_footer(frame.area());
        self.list.viewport_mut().resize(inner_rows(body.height));

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} - {} conversations ", self.title, self.list.len()))
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(body);
        frame.render_widget(block, body);

        let lines = if self.list.is_empty() {
            vec!["(no conversations)".into()]
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

        let status = self.search.status().or_else(|| self.status.clone());
        render_footer(
            frame,
            status_area,
            hints_area,
            status.as_ref(),
            &key_hints(&["q=quit", "Enter=open", "e=export", "/ find", "n/N next/prev"]),
            theme,
        );
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow<ConversationAction> {
        self.status = None;
        if self.search.offer(&key, &mut self.list) {
            return Flow::Continue;
        }
        if is_quit(&key) {
            return Flow::Exit(ConversationAction::Quit);
        }
        let selected = (!self.list.is_empty()).then(|| self.list.selected_index());
        match (key.code, selected) {
            (KeyCode::Enter, Some(index)) => return Flow::Exit(ConversationAction::Open(index)),
            (KeyCode::Char('e' | 'E'), Some(index)) => {
                return Flow::Exit(ConversationAction::Export(index));
            }
            _ => {
                if let Some(nav) = nav_key(&key) {
                    apply_nav(self.list.viewport_mut(), nav);
                }
            }
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;
    use serde_json::json;

    fn press(screen: &mut ConversationsScreen, code: KeyCode) -> Flow<ConversationAction> {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn screen() -> ConversationsScreen {
        let conversations = vec![
            Conversation::from_value(0, &json!({"title": "Rust lifetimes", "mapping": {}})),
            Conversation::from_value(1, &json!({"mapping": {}})),
        ];
        ConversationsScreen::new("export.zip", conversations)
    }

    #[test]
    fn test_labels_fall_back_to_numbered() {
        let s = screen();
        assert_eq!(s.list().labels(), ["Rust lifetimes", "Conversation #2"]);
    }

    #[test]
    fn test_open_and_export() {
        let mut s = screen();
        press(&mut s, KeyCode::Down);
        assert_eq!(
            press(&mut s, KeyCode::Enter),
            Flow::Exit(ConversationAction::Open(1))
        );
        assert_eq!(
            press(&mut s, KeyCode::Char('e')),
            Flow::Exit(ConversationAction::Export(1))
        );
    }

    #[test]
    fn test_export_status_clears_on_navigation() {
        let mut s = screen();
        s.set_status(Status::success("Exported exports/Rust lifetimes.txt"));
        press(&mut s, KeyCode::Char('j'));
        assert!(s.status().is_none());
    }

    #[test]
    fn test_empty_list_ignores_enter() {
        let mut s = ConversationsScreen::new("empty.zip", Vec::new());
        assert_eq!(press(&mut s, KeyCode::Enter), Flow::Continue);
        assert_eq!(
            press(&mut s, KeyCode::Char('q')),
            Flow::Exit(ConversationAction::Quit)
        );
    }
}
