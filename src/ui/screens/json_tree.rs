//! Collapsible JSON tree viewer.

use super::{apply_nav, inner_rows, SearchBar};
use crate::nav::TreeNavigator;
use crate::ui::keys::{is_quit, nav_key};
use crate::ui::render::{
    body_and_footer, highlight_spans, key_hints, render_footer, row_style, Status,
};
use crate::ui::runner::{Flow, Screen};
use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use ratatui::{
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const HINTS: [&str; 6] = [
    "q=quit",
    "arrows or h/j/k/l move",
    "g/G top/bottom",
    "u/d page",
    "Enter/Space toggle",
    "/ find",
];

pub struct JsonTreeScreen {
    title: String,
    tree: TreeNavigator,
    search: SearchBar,
}

impl JsonTreeScreen {
    pub fn new(title: impl Into<String>, tree: TreeNavigator) -> Self {
        Self {
            title: title.into(),
            tree,
            search: SearchBar::default(),
        }
    }

    pub fn tree(&self) -> &TreeNavigator {
        &self.tree
    }

    /// `path: items.[0].name  type: string` for the selected node.
    fn location(&self) -> String {
        match self.tree.selected_node() {
            Some(id) => format!(
                "path: {}  type: {}",
                self.tree.path_label(id),
                self.tree.node(id).kind.as_str()
            ),
            None => "path:   type: ".to_string(),
        }
    }

    fn row_line(&self, index: usize, width: usize, theme: &Theme) -> Option<Line<'static>> {
        let id = *self.tree.visible().get(index)?;
        let selected = index == self.tree.viewport().selected();
        let label = self.tree.row_label(id).fit(width);
        let base = row_style(selected, theme);
        let query = self.search.highlight();

        let mut spans = highlight_spans(&label.prefix, query, base.fg(theme.json_key), theme);
        spans.extend(highlight_spans(
            &label.value,
            query,
            base.fg(theme.kind_color(label.kind)),
            theme,
        ));
        let used = label.text().chars().count();
        if selected && used < width {
            spans.push(Span::styled(" ".repeat(width - used), base));
        }
        Some(Line::from(spans))
    }
}

impl Screen for JsonTreeScreen {
    type Outcome = ();

    fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        let (body, status_area, hints_area) = body_and_footer(frame.area());
        self.tree.viewport_mut().resize(inner_rows(body.height));

        let block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(theme.accent));
        let inner = block.inner(body);
        frame.render_widget(block, body);

        let width = usize::from(inner.width);
        let lines: Vec<Line> = self
            .tree
            .viewport()
            .visible_range()
            .filter_map(|index| self.row_line(index, width, theme))
            .collect();
        frame.render_widget(Paragraph::new(lines), inner);

        let status = self
            .search
            .status()
            .unwrap_or_else(|| Status::muted(self.location()));
        render_footer(
            frame,
            status_area,
            hints_area,
            Some(&status),
            &key_hints(&HINTS),
            theme,
        );
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow<()> {
        if self.search.offer(&key, &mut self.tree) {
            return Flow::Continue;
        }
        if is_quit(&key) {
            return Flow::Exit(());
        }
        if key.modifiers.contains(KeyModifiers::CONTROL) {
            if let Some(nav) = nav_key(&key) {
                apply_nav(self.tree.viewport_mut(), nav);
            }
            return Flow::Continue;
        }
        match key.code {
            KeyCode::Left | KeyCode::Char('h' | 'H') => self.tree.collapse_or_go_to_parent(),
            KeyCode::Right | KeyCode::Char('l' | 'L' | ' ') | KeyCode::Enter => {
                self.tree.toggle_selected();
            }
            _ => {
                if let Some(nav) = nav_key(&key) {
                    apply_nav(self.tree.viewport_mut(), nav);
                }
            }
        }
        Flow::Continue
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn press(screen: &mut JsonTreeScreen, code: KeyCode) -> Flow<()> {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    fn screen() -> JsonTreeScreen {
        JsonTreeScreen::new(
            "doc.json",
            TreeNavigator::new(json!({"name": "zip", "items": [1, 2], "ok": true})),
        )
    }

    #[test]
    fn test_toggle_and_collapse_keys() {
        let mut s = screen();
        assert_eq!(s.tree().visible().len(), 3);
        press(&mut s, KeyCode::Down);
        press(&mut s, KeyCode::Char(' '));
        assert_eq!(s.tree().visible().len(), 5);

        // Into the first array item, then back to its parent.
        press(&mut s, KeyCode::Char('j'));
        press(&mut s, KeyCode::Char('h'));
        assert_eq!(s.tree().viewport().selected(), 1);
        press(&mut s, KeyCode::Left);
        assert_eq!(s.tree().visible().len(), 3);
    }

    #[test]
    fn test_location_line() {
        let mut s = screen();
        press(&mut s, KeyCode::Down);
        press(&mut s, KeyCode::Enter);
        press(&mut s, KeyCode::Down);
        assert_eq!(s.location(), "path: items.[0]  type: number");
    }

    #[test]
    fn test_search_moves_selection() {
        let mut s = screen();
        for c in ['/', 't', 'r', 'u', 'e'] {
            press(&mut s, KeyCode::Char(c));
        }
        assert_eq!(s.tree().viewport().selected(), 2);
        press(&mut s, KeyCode::Esc);
        assert_eq!(press(&mut s, KeyCode::Char('q')), Flow::Exit(()));
    }
}
