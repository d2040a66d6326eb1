//! # Text Panel
//!
//! Long, word-wrapped text grouped into records (one per message). Each
//! record renders as:
//!
//! ```text
//! [author]
//! body line 1
//! body line 2
//!
//! ```
//!
//! The panel is scroll-oriented: the selected line is the reading position
//! and is placed at the top of the window by jumps and search hits.

use crate::nav::search::SearchTarget;
use crate::nav::text::wrap_lines;
use crate::nav::viewport::Viewport;
use std::borrow::Cow;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Header,
    Body,
    Separator,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PanelLine {
    pub text: String,
    pub kind: LineKind,
    /// Index of the record this line belongs to.
    pub record: usize,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageRecord {
    pub author: String,
    /// Index of the header line.
    pub start: usize,
    /// Header, body and separator lines together.
    pub line_count: usize,
}

#[derive(Debug, Clone)]
pub struct TextPanel {
    source: Vec<(String, String)>,
    width: usize,
    lines: Vec<PanelLine>,
    records: Vec<MessageRecord>,
    viewport: Viewport,
}

impl TextPanel {
    pub fn new(source: Vec<(String, String)>, width: usize) -> Self {
        let mut panel = Self {
            source,
            width: width.max(1),
            lines: Vec::new(),
            records: Vec::new(),
            viewport: Viewport::default(),
        };
        panel.layout();
        panel
    }

    pub fn lines(&self) -> &[PanelLine] {
        &self.lines
    }

    pub fn records(&self) -> &[MessageRecord] {
        &self.records
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    /// Record under the reading position.
    pub fn current_record(&self) -> Option<usize> {
        self.lines
            .get(self.viewport.selected())
            .map(|line| line.record)
    }

    pub fn visible_lines(&self) -> impl Iterator<Item = (usize, &PanelLine)> {
        let range = self.viewport.visible_range();
        self.lines[range.clone()]
            .iter()
            .zip(range)
            .map(|(line, index)| (index, line))
    }

    /// Move to the first record header after the reading position, or to the
    /// last line when there is none.
    pub fn jump_to_next_record(&mut self) {
        let current = self.viewport.selected();
        let next = self.records.partition_point(|r| r.start <= current);
        match self.records.get(next) {
            Some(record) => self.viewport.scroll_to(record.start),
            None => self.viewport.end(),
        }
    }

    /// Move to the last record header before the reading position, or to the
    /// first line when there is none.
    pub fn jump_to_previous_record(&mut self) {
        let current = self.viewport.selected();
        let before = self.records.partition_point(|r| r.start < current);
        match before.checked_sub(1).and_then(|i| self.records.get(i)) {
            Some(record) => self.viewport.scroll_to(record.start),
            None => self.viewport.home(),
        }
    }

    /// Scroll the window by `delta` lines; the reading position follows the
    /// top row.
    pub fn scroll_by(&mut self, delta: isize) {
        let top = self.viewport.offset().saturating_add_signed(delta);
        self.viewport.scroll_to(top);
    }

    pub fn page_down(&mut self) {
        self.scroll_by(self.page_delta());
    }

    pub fn page_up(&mut self) {
        self.scroll_by(-self.page_delta());
    }

    /// Re-wrap at a new width, staying on the record being read.
    pub fn rewrap(&mut self, width: usize) {
        let width = width.max(1);
        if width == self.width {
            return;
        }
        let record = self.current_record();
        self.width = width;
        self.layout();
        if let Some(start) = record.and_then(|i| self.records.get(i)).map(|r| r.start) {
            self.viewport.scroll_to(start);
        }
    }

    fn page_delta(&self) -> isize {
        isize::try_from(self.viewport.height()).unwrap_or(isize::MAX)
    }

    fn layout(&mut self) {
        self.lines.clear();
        self.records.clear();
        for (record, (author, text)) in self.source.iter().enumerate() {
            let start = self.lines.len();
            self.lines.push(PanelLine {
                text: format!("[{author}]"),
                kind: LineKind::Header,
                record,
            });
            self.lines
                .extend(wrap_lines(text, self.width).into_iter().map(|text| PanelLine {
                    text,
                    kind: LineKind::Body,
                    record,
                }));
            self.lines.push(PanelLine {
                text: String::new(),
                kind: LineKind::Separator,
                record,
            });
            self.records.push(MessageRecord {
                author: author.clone(),
                start,
                line_count: self.lines.len() - start,
            });
        }
        self.viewport.set_item_count(self.lines.len());
    }
}

impl SearchTarget for TextPanel {
    fn row_count(&self) -> usize {
        self.lines.len()
    }

    fn row_text(&self, index: usize) -> Cow<'_, str> {
        self.lines
            .get(index)
            .map_or(Cow::Borrowed(""), |line| Cow::Borrowed(line.text.as_str()))
    }

    fn selected(&self) -> usize {
        self.viewport.selected()
    }

    fn select(&mut self, index: usize) {
        self.viewport.scroll_to(index);
    }
}
