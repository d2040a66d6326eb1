//! Flat label list: the simplest row shape, one label per item.

use crate::nav::search::SearchTarget;
use crate::nav::viewport::Viewport;
use std::borrow::Cow;

#[derive(Debug, Clone, Default)]
pub struct FlatList {
    labels: Vec<String>,
    viewport: Viewport,
}

impl FlatList {
    pub fn new(labels: Vec<String>) -> Self {
        let viewport = Viewport::new(labels.len(), 1);
        Self { labels, viewport }
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    pub fn len(&self) -> usize {
        self.labels.len()
    }

    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn selected_index(&self) -> usize {
        self.viewport.selected()
    }

    pub fn selected_label(&self) -> Option<&str> {
        self.labels
            .get(self.viewport.selected())
            .map(String::as_str)
    }

    /// Visible slice paired with absolute row indices.
    pub fn visible(&self) -> impl Iterator<Item = (usize, &str)> {
        let range = self.viewport.visible_range();
        self.labels[range.clone()]
            .iter()
            .zip(range)
            .map(|(label, index)| (index, label.as_str()))
    }
}

impl SearchTarget for FlatList {
    fn row_count(&self) -> usize {
        self.labels.len()
    }

    fn row_text(&self, index: usize) -> Cow<'_, str> {
        self.labels
            .get(index)
            .map_or(Cow::Borrowed(""), |label| Cow::Borrowed(label.as_str()))
    }

    fn selected(&self) -> usize {
        self.viewport.selected()
    }

    fn select(&mut self, index: usize) {
        self.viewport.move_to(index);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn list(n: usize) -> FlatList {
        FlatList::new((0..n).map(|i| format!("entry-{i}")).collect())
    }

    #[test]
    fn test_visible_pairs_indices_with_labels() {
        let mut l = list(10);
        l.viewport_mut().resize(3);
        l.viewport_mut().move_to(5);
        let rows: Vec<_> = l.visible().collect();
        assert_eq!(rows, vec![(3, "entry-3"), (4, "entry-4"), (5, "entry-5")]);
        assert_eq!(l.selected_label(), Some("entry-5"));
    }

    #[test]
    fn test_empty_list_has_no_selection() {
        let l = FlatList::new(Vec::new());
        assert!(l.is_empty());
        assert_eq!(l.selected_label(), None);
        assert_eq!(l.visible().count(), 0);
    }

    #[test]
    fn test_select_goes_through_viewport() {
        let mut l = list(4);
        l.select(99);
        assert_eq!(l.selected(), 3);
        assert_eq!(l.row_text(3), "entry-3");
    }
}
