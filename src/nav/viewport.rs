//! # Viewport
//!
//! A virtualized window over an ordered row sequence. The viewport never
//! owns rows; it only tracks how many there are, which one is selected, and
//! which slice is on screen.
//!
//! ## Invariant
//!
//! After every operation:
//!
//! ```text
//! height >= 1
//! 0 <= offset <= max(0, len - height)
//! offset <= selected <= offset + height - 1     (when len > 0)
//! selected == 0 && offset == 0                  (when len == 0)
//! ```
//!
//! Every operation is a constant-time re-clamp, so per-keystroke cost is
//! bounded by the visible height rather than the row count.

use std::ops::Range;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Viewport {
    selected: usize,
    offset: usize,
    height: usize,
    len: usize,
}

impl Default for Viewport {
    fn default() -> Self {
        Self::new(0, 1)
    }
}

impl Viewport {
    pub fn new(len: usize, height: usize) -> Self {
        let mut viewport = Self {
            selected: 0,
            offset: 0,
            height: height.max(1),
            len,
        };
        viewport.clamp();
        viewport
    }

    pub fn selected(&self) -> usize {
        self.selected
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Largest legal scroll offset for the current length and height.
    pub fn max_offset(&self) -> usize {
        self.len.saturating_sub(self.height)
    }

    /// Indices of the rows currently on screen.
    pub fn visible_range(&self) -> Range<usize> {
        self.offset..(self.offset + self.height).min(self.len)
    }

    pub fn is_visible(&self, index: usize) -> bool {
        self.visible_range().contains(&index)
    }

    pub fn move_by(&mut self, delta: isize) {
        if self.is_empty() {
            return;
        }
        self.selected = if delta.is_negative() {
            self.selected.saturating_sub(delta.unsigned_abs())
        } else {
            self.selected.saturating_add(delta.unsigned_abs())
        };
        self.clamp();
    }

    pub fn move_to(&mut self, index: usize) {
        if self.is_empty() {
            return;
        }
        self.selected = index;
        self.clamp();
    }

    /// Select `index` and scroll so it sits on the top row when the
    /// remaining rows allow it.
    pub fn scroll_to(&mut self, index: usize) {
        if self.is_empty() {
            return;
        }
        self.selected = index.min(self.len - 1);
        self.offset = self.selected.min(self.max_offset());
        self.clamp();
    }

    pub fn page_up(&mut self) {
        self.move_by(-(self.page_delta()));
    }

    pub fn page_down(&mut self) {
        self.move_by(self.page_delta());
    }

    pub fn home(&mut self) {
        self.move_to(0);
    }

    pub fn end(&mut self) {
        self.move_to(self.len.saturating_sub(1));
    }

    pub fn resize(&mut self, height: usize) {
        self.height = height.max(1);
        self.clamp();
    }

    /// Change the row count. The selected index is kept when it is still in
    /// range, otherwise it moves to the last row.
    pub fn set_item_count(&mut self, len: usize) {
        self.len = len;
        self.clamp();
    }

    fn page_delta(&self) -> isize {
        isize::try_from(self.height).unwrap_or(isize::MAX)
    }

    fn clamp(&mut self) {
        if self.len == 0 {
            self.selected = 0;
            self.offset = 0;
            return;
        }
        self.selected = self.selected.min(self.len - 1);
        if self.selected < self.offset {
            self.offset = self.selected;
        }
        if self.selected >= self.offset + self.height {
            self.offset = self.selected + 1 - self.height;
        }
        self.offset = self.offset.min(self.max_offset());
    }
}
