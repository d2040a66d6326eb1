//! Drawing helpers shared by the screens: highlighted rows, the status line
//! and the two-line footer every screen ends with.

use crate::nav::text::{char_len, match_ranges, truncate_with_ellipsis};
use crate::nav::SearchSession;
use crate::ui::theme::Theme;
use ratatui::{
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::Paragraph,
    Frame,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Muted,
    Success,
    Error,
}

/// One line of feedback shown at the bottom of a screen.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Status {
    pub text: String,
    pub tone: Tone,
}

impl Status {
    pub fn muted(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Muted,
        }
    }

    pub fn success(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Success,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            tone: Tone::Error,
        }
    }

    pub fn style(&self, theme: &Theme) -> Style {
        let color = match self.tone {
            Tone::Muted => theme.fg_dim,
            Tone::Success => theme.success,
            Tone::Error => theme.error,
        };
        Style::default().fg(color)
    }
}

/// `keys: a  ·  b  ·  c`
pub fn key_hints(parts: &[&str]) -> String {
    format!("keys: {}", parts.join("  ·  "))
}

/// Status line while a query is being typed, `None` otherwise. `no_match`
/// is the outcome of the last keystroke.
pub fn search_status(session: &SearchSession, no_match: bool) -> Option<Status> {
    if !session.is_composing() {
        return None;
    }
    let text = format!("Search: {}", session.buffer());
    Some(if no_match {
        Status::error(format!("{text}  (no match)"))
    } else {
        Status::muted(text)
    })
}

/// Split `text` into spans, styling every case-insensitive occurrence of
/// `query` with the theme's match colors.
pub fn highlight_spans(text: &str, query: &str, base: Style, theme: &Theme) -> Vec<Span<'static>> {
    let matched = base
        .fg(theme.match_fg)
        .bg(theme.match_bg)
        .add_modifier(Modifier::BOLD);
    let mut spans = Vec::new();
    let mut cursor = 0;
    for range in match_ranges(text, query) {
        if range.start > cursor {
            spans.push(Span::styled(text[cursor..range.start].to_string(), base));
        }
        spans.push(Span::styled(text[range.clone()].to_string(), matched));
        cursor = range.end;
    }
    if cursor < text.len() || spans.is_empty() {
        spans.push(Span::styled(text[cursor..].to_string(), base));
    }
    spans
}

/// Cut to `width` with an ellipsis, or pad with spaces up to it.
pub fn fit_width(text: &str, width: usize) -> String {
    let mut out = truncate_with_ellipsis(text, width);
    let len = char_len(&out);
    if len < width {
        out.push_str(&" ".repeat(width - len));
    }
    out
}

/// Style of a list row, depending on whether it is the selected one.
pub fn row_style(selected: bool, theme: &Theme) -> Style {
    if selected {
        Style::default()
            .fg(theme.fg)
            .bg(theme.selection_bg)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default().fg(theme.fg)
    }
}

/// Lines for a flat list slice: each label fitted to `width`, the selected
/// row filled with the selection color, matches of `query` highlighted.
pub fn list_lines<'a>(
    rows: impl Iterator<Item = (usize, &'a str)>,
    selected: usize,
    width: usize,
    query: &str,
    theme: &Theme,
) -> Vec<Line<'static>> {
    rows.map(|(index, label)| {
        let style = row_style(index == selected, theme);
        Line::from(highlight_spans(&fit_width(label, width), query, style, theme))
    })
    .collect()
}

/// Split `area` into the body and the two footer rows (status + hints).
pub fn body_and_footer(area: Rect) -> (Rect, Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(1),    // Body
            Constraint::Length(1), // Status
            Constraint::Length(1), // Key hints
        ])
        .split(area);
    (chunks[0], chunks[1], chunks[2])
}

/// Draw the status row (when there is something to say) and the hint row.
pub fn render_footer(
    frame: &mut Frame,
    status_area: Rect,
    hints_area: Rect,
    status: Option<&Status>,
    hints: &str,
    theme: &Theme,
) {
    if let Some(status) = status {
        let width = usize::from(status_area.width);
        frame.render_widget(
            Paragraph::new(truncate_with_ellipsis(&status.text, width)).style(status.style(theme)),
            status_area,
        );
    }
    let width = usize::from(hints_area.width);
    frame.render_widget(
        Paragraph::new(truncate_with_ellipsis(hints, width))
            .style(Style::default().fg(theme.fg_dim)),
        hints_area,
    );
}
