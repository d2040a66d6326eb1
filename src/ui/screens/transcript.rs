//! One conversation as wrapped text, message by message.

use super::{inner_rows, SearchBar};
use crate::nav::{LineKind, TextPanel};
use crate::transcript::Message;
use crate::ui::keys::{is_quit, nav_key, NavKey};
use crate::ui::render::{body_and_footer, highlight_spans, key_hints, render_footer, Status};
use crate::ui::runner::{Flow, Screen};
use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    style::{Modifier, Style},
    text::Line,
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const INITIAL_WIDTH: usize = 80;

const HINTS: [&str; 7] = [
    "q=back",
    "e=export",
    "/ find",
    "n/N next/prev match",
    "]/[ next/prev msg",
    "u/d page",
    "g/G top/bottom",
];

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TranscriptAction {
    Back,
    Export,
}

pub struct TranscriptScreen {
    title: String,
    messages: Vec<Message>,
    panel: TextPanel,
    search: SearchBar,
    status: Option<Status>,
}

impl TranscriptScreen {
    pub fn new(title: impl Into<String>, messages: Vec<Message>) -> Self {
        let source = messages
            .iter()
            .map(|m| (m.author.clone(), m.text.clone()))
            .collect();
        Self {
            title: title.into(),
            messages,
            panel: TextPanel::new(source, INITIAL_WIDTH),
            search: SearchBar::default(),
            status: None,
        }
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn panel(&self) -> &TextPanel {
        &self.panel
    }

    pub fn status(&self) -> Option<&Status> {
        self.status.as_ref()
    }

    pub fn set_status(&mut self, status: Status) {
        self.status = Some(status);
    }

    fn line_style(&self, kind: LineKind, record: usize, theme: &Theme) -> Style {
        match kind {
            LineKind::Header => {
                let author = self
                    .panel
                    .records()
                    .get(record)
                    .map_or("", |r| r.author.as_str());
                Style::default()
                    .fg(theme.author_color(author))
                    .add_modifier(Modifier::BOLD)
            }
            LineKind::Body | LineKind::Separator => Style::default().fg(theme.fg),
        }
    }
}

impl Screen for TranscriptScreen {
    type Outcome = TranscriptAction;

    fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        let (body, status_area, hints_area) = body_and_footer(frame.area());
        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(body);
        frame.render_widget(block, body);

        self.panel.rewrap(usize::from(inner.width));
        self.panel.viewport_mut().resize(inner_rows(body.height));

        let query = self.search.highlight();
        let lines: Vec<Line> = self
            .panel
            .visible_lines()
            .map(|(_, line)| {
                let style = self.line_style(line.kind, line.record, theme);
                Line::from(highlight_spans(&line.text, query, style, theme))
            })
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        let status = self.search.status().or_else(|| self.status.clone());
        render_footer(
            frame,
            status_area,
            hints_area,
            status.as_ref(),
            &key_hints(&HINTS),
            theme,
        );
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow<TranscriptAction> {
        self.status = None;
        if self.search.offer(&key, &mut self.panel) {
            return Flow::Continue;
        }
        if is_quit(&key) || key.code == KeyCode::Esc {
            return Flow::Exit(TranscriptAction::Back);
        }
        match key.code {
            KeyCode::Char('e' | 'E') => return Flow::Exit(TranscriptAction::Export),
            KeyCode::Char(']') => self.panel.jump_to_next_record(),
            KeyCode::Char('[') => self.panel.jump_to_previous_record(),
            _ => match nav_key(&key) {
                Some(NavKey::Up) => self.panel.scroll_by(-1),
                Some(NavKey::Down) => self.panel.scroll_by(1),
                Some(NavKey::PageUp) => self.panel.page_up(),
                Some(NavKey::PageDown) => self.panel.page_down(),
                Some(NavKey::Home) => self.panel.viewport_mut().home(),
                Some(NavKey::End) => self.panel.viewport_mut().end(),
                None => {}
            },
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(screen: &mut TranscriptScreen, code: KeyCode) -> Flow<TranscriptAction> {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn screen() -> TranscriptScreen {
        TranscriptScreen::new(
            "Greetings",
            vec![
                Message::new("user", "hello"),
                Message::new("assistant", "world wide web"),
            ],
        )
    }

    #[test]
    fn test_record_jumps() {
        let mut s = screen();
        press(&mut s, KeyCode::Char(']'));
        assert_eq!(s.panel().current_record(), Some(1));
        press(&mut s, KeyCode::Char('['));
        assert_eq!(s.panel().current_record(), Some(0));
    }

    #[test]
    fn test_back_and_export() {
        let mut s = screen();
        assert_eq!(
            press(&mut s, KeyCode::Char('e')),
            Flow::Exit(TranscriptAction::Export)
        );
        assert_eq!(press(&mut s, KeyCode::Esc), Flow::Exit(TranscriptAction::Back));
        assert_eq!(
            press(&mut s, KeyCode::Char('q')),
            Flow::Exit(TranscriptAction::Back)
        );
    }

    #[test]
    fn test_status_clears_on_scroll() {
        let mut s = screen();
        s.set_status(Status::error("Export failed: read-only"));
        press(&mut s, KeyCode::Down);
        assert!(s.status().is_none());
    }

    #[test]
    fn test_search_finds_body_text() {
        let mut s = screen();
        for c in ['/', 'w', 'i', 'd', 'e'] {
            press(&mut s, KeyCode::Char(c));
        }
        assert_eq!(s.panel().current_record(), Some(1));
        // Esc while composing cancels the search, not the screen.
        assert_eq!(press(&mut s, KeyCode::Esc), Flow::Continue);
    }
}
