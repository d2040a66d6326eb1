//! Archive browser: entry names on the left, metadata of the selected entry
//! on the right. Actions that need the terminal or the filesystem are
//! returned as [`BrowseAction`]s for the caller to run.

use super::{apply_nav, inner_rows, SearchBar};
use crate::archive::EntryMeta;
use crate::nav::FlatList;
use crate::ui::keys::{is_quit, nav_key};
use crate::ui::render::{body_and_footer, key_hints, list_lines, render_footer, Status};
use crate::ui::runner::{Flow, Screen};
use crate::ui::theme::Theme;
use crossterm::event::{KeyCode, KeyEvent};
use ratatui::{
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

const MIN_LIST_WIDTH: u16 = 10;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrowseAction {
    Quit,
    /// Show a `.json` entry in the tree viewer.
    PreviewJson(String),
    /// Extract an entry and hand it to the default application.
    OpenExternal(String),
    /// Show the archive's conversations.
    OpenConversations,
}

pub struct BrowserScreen {
    title: String,
    entries: Vec<EntryMeta>,
    list: FlatList,
    search: SearchBar,
    status: Option<Status>,
    pane_fraction: f64,
    has_conversations: bool,
}

/// Whether Enter should open `entry` in the tree viewer.
pub fn is_json_entry(entry: &EntryMeta) -> bool {
    !entry.is_directory && entry.name.to_ascii_lowercase().ends_with(".json")
}

impl BrowserScreen {
    pub fn new(
        title: impl Into<String>,
        entries: Vec<EntryMeta>,
        pane_fraction: f64,
        has_conversations: bool,
    ) -> Self {
        let list = FlatList::new(entries.iter().map(|e| e.name.clone()).collect());
        Self {
            title: title.into(),
            entries,
            list,
            search: SearchBar::default(),
            status: None,
            pane_fraction,
            has_conversations,
        }
    }

    pub fn selected_entry(&self) -> Option<&EntryMeta> {
        self.entries.get(self.list.selected_index())
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

    fn hints(&self) -> String {
        let mut parts = vec!["q=quit", "/ find", "n/N next/prev", "Enter=json", "o=open"];
        if self.has_conversations {
            parts.push("v=GPT");
        }
        key_hints(&parts)
    }

    fn meta_lines(&self, theme: &Theme) -> Vec<Line<'static>> {
        let Some(entry) = self.selected_entry() else {
            return Vec::new();
        };
        let label = Style::default().fg(theme.fg_dim);
        let value = Style::default().fg(theme.fg);
        let row = |name: &'static str, text: String| {
            Line::from(vec![Span::styled(name, label), Span::styled(text, value)])
        };
        let mut lines = vec![
            row("Name: ", entry.name.clone()),
            row("Dir: ", if entry.is_directory { "yes" } else { "no" }.to_string()),
            row("Method: ", entry.method.clone()),
            row(
                "Size: ",
                format!(
                    "{} (raw), {} (zip)",
                    entry.uncompressed_size, entry.compressed_size
                ),
            ),
            row("CRC32: ", entry.crc32.clone()),
        ];
        if let Some(modified) = &entry.last_modified {
            lines.push(row("Modified: ", modified.clone()));
        }
        lines
    }
}

impl Screen for BrowserScreen {
    type Outcome = BrowseAction;

    fn render(&mut self, frame: &mut Frame, theme: &Theme) {
        let (body, status_area, hints_area) = body_and_footer(frame.area());
        // Truncation toward zero is the intended floor.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let left = ((f64::from(body.width) * self.pane_fraction) as u16).max(MIN_LIST_WIDTH);
        let panes = Layout::default()
            .direction(Direction::Horizontal)
            .constraints([Constraint::Length(left), Constraint::Min(0)])
            .split(body);

        self.list.viewport_mut().resize(inner_rows(panes[0].height));
        let list_block = Block::default()
            .borders(Borders::ALL)
            .title(format!(" {} ", self.title))
            .border_style(Style::default().fg(theme.accent));
        let inner = list_block.inner(panes[0]);
        frame.render_widget(list_block, panes[0]);
        let lines = list_lines(
            self.list.visible(),
            self.list.selected_index(),
            usize::from(inner.width),
            self.search.highlight(),
            theme,
        );
        frame.render_widget(Paragraph::new(lines), inner);

        let meta = Paragraph::new(self.meta_lines(theme)).block(
            Block::default()
                .borders(Borders::ALL)
                .title(" Entry ")
                .border_style(Style::default().fg(theme.fg_dim)),
        );
        frame.render_widget(meta, panes[1]);

        let status = self.search.status().or_else(|| self.status.clone());
        render_footer(
            frame,
            status_area,
            hints_area,
            status.as_ref(),
            &self.hints(),
            theme,
        );
    }

    fn handle_key(&mut self, key: KeyEvent) -> Flow<BrowseAction> {
        // Messages last until the next key.
        self.status = None;
        if self.search.offer(&key, &mut self.list) {
            return Flow::Continue;
        }
        if is_quit(&key) {
            return Flow::Exit(BrowseAction::Quit);
        }
        match key.code {
            KeyCode::Enter => match self.selected_entry() {
                Some(entry) if is_json_entry(entry) => {
                    return Flow::Exit(BrowseAction::PreviewJson(entry.name.clone()));
                }
                Some(entry) if !entry.is_directory => {
                    self.status = Some(Status::muted(format!(
                        "Not a JSON entry: {} (o opens it externally)",
                        entry.name
                    )));
                }
                _ => {}
            },
            KeyCode::Char('o' | 'O') => match self.selected_entry() {
                Some(entry) if !entry.is_directory => {
                    return Flow::Exit(BrowseAction::OpenExternal(entry.name.clone()));
                }
                _ => {}
            },
            KeyCode::Char('v' | 'V') => {
                if self.has_conversations {
                    return Flow::Exit(BrowseAction::OpenConversations);
                }
                self.status = Some(Status::error(
                    "GPT view unavailable: conversations.json not found at root",
                ));
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

    fn entry(name: &str) -> EntryMeta {
        EntryMeta {
            name: name.to_string(),
            compressed_size: 10,
            uncompressed_size: 20,
            method: "deflate".to_string(),
            crc32: "0000abcd".to_string(),
            is_directory: name.ends_with('/'),
            last_modified: None,
        }
    }

    fn screen(has_conversations: bool) -> BrowserScreen {
        BrowserScreen::new(
            "test.zip",
            vec![entry("docs/"), entry("docs/a.JSON"), entry("notes.txt")],
            0.55,
            has_conversations,
        )
    }

    fn press(screen: &mut BrowserScreen, code: KeyCode) -> Flow<BrowseAction> {
        screen.handle_key(KeyEvent::new(code, KeyModifiers::empty()))
    }

    #[test]
    fn test_enter_previews_json_case_insensitive() {
        let mut s = screen(false);
        assert_eq!(press(&mut s, KeyCode::Enter), Flow::Continue);
        press(&mut s, KeyCode::Down);
        assert_eq!(
            press(&mut s, KeyCode::Enter),
            Flow::Exit(BrowseAction::PreviewJson("docs/a.JSON".into()))
        );
    }

    #[test]
    fn test_open_skips_directories() {
        let mut s = screen(false);
        assert_eq!(press(&mut s, KeyCode::Char('o')), Flow::Continue);
        press(&mut s, KeyCode::Char('G'));
        assert_eq!(
            press(&mut s, KeyCode::Char('o')),
            Flow::Exit(BrowseAction::OpenExternal("notes.txt".into()))
        );
    }

    #[test]
    fn test_gpt_view_requires_conversations() {
        let mut s = screen(false);
        assert_eq!(press(&mut s, KeyCode::Char('v')), Flow::Continue);
        assert_eq!(
            s.status().map(|st| st.text.as_str()),
            Some("GPT view unavailable: conversations.json not found at root")
        );

        let mut s = screen(true);
        assert_eq!(
            press(&mut s, KeyCode::Char('V')),
            Flow::Exit(BrowseAction::OpenConversations)
        );
    }

    #[test]
    fn test_status_clears_on_next_key() {
        let mut s = BrowserScreen::new("z", Vec::new(), 0.5, false);
        press(&mut s, KeyCode::Char('v'));
        assert!(s.status().is_some());
        press(&mut s, KeyCode::Down);
        assert!(s.status().is_none());

        let mut s = screen(true);
        s.set_status(Status::success("Opened externally: notes.txt"));
        press(&mut s, KeyCode::Up);
        assert!(s.status().is_none());
    }

    #[test]
    fn test_hints_mention_gpt_only_when_available() {
        assert!(screen(true).hints().ends_with("v=GPT"));
        assert!(!screen(false).hints().contains("v=GPT"));
    }
}
