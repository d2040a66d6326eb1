//! # Tree Navigator
//!
//! Lazy hierarchical view over a parsed JSON document.
//!
//! Nodes live in an arena and are identified by their path from the root,
//! which stays stable across expand/collapse. A node's children are only
//! materialized the first time it is expanded; collapsing keeps them cached.
//!
//! The root is the container of the document. When it has entries it is not
//! drawn itself, so the first rows are its children at depth 1. A scalar or
//! empty document is shown as a single `(root)` row.

use crate::nav::search::SearchTarget;
use crate::nav::text::{char_len, truncate_with_ellipsis, ELLIPSIS};
use crate::nav::viewport::Viewport;
use serde_json::Value;
use std::borrow::Cow;
use std::collections::HashMap;
use std::fmt;

/// Default cap on value previews, in chars.
pub const DEFAULT_PREVIEW_BUDGET: usize = 60;

const ROOT_LABEL: &str = "(root)";
const CARET_EXPANDED: char = '▾';
const CARET_COLLAPSED: char = '▸';
const NEWLINE_MARK: &str = "⏎";

#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum PathSegment {
    Key(String),
    Index(usize),
}

impl fmt::Display for PathSegment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => f.write_str(key),
            Self::Index(index) => write!(f, "[{index}]"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl ValueKind {
    pub fn of(value: &Value) -> Self {
        match value {
            Value::Object(_) => Self::Object,
            Value::Array(_) => Self::Array,
            Value::String(_) => Self::String,
            Value::Number(_) => Self::Number,
            Value::Bool(_) => Self::Boolean,
            Value::Null => Self::Null,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Object => "object",
            Self::Array => "array",
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Null => "null",
        }
    }
}

#[derive(Debug, Clone)]
pub struct TreeNode {
    pub key: Option<PathSegment>,
    pub kind: ValueKind,
    pub depth: usize,
    pub path: Vec<PathSegment>,
    pub parent: Option<NodeId>,
    pub expanded: bool,
    child_count: usize,
    children: Option<Vec<NodeId>>,
    preview: String,
}

impl TreeNode {
    pub fn has_children(&self) -> bool {
        self.child_count > 0
    }

    pub fn child_count(&self) -> usize {
        self.child_count
    }

    pub fn children_materialized(&self) -> bool {
        self.children.is_some()
    }

    pub fn preview(&self) -> &str {
        &self.preview
    }

    pub fn key_label(&self) -> String {
        self.key
            .as_ref()
            .map_or_else(|| ROOT_LABEL.to_string(), ToString::to_string)
    }
}

/// A row split into its structural prefix and the value preview, so the
/// renderer can color the preview by kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RowLabel {
    pub prefix: String,
    pub value: String,
    pub kind: ValueKind,
}

impl RowLabel {
    pub fn text(&self) -> String {
        format!("{}{}", self.prefix, self.value)
    }

    /// Cut the row to `width` chars, shortening the value first.
    pub fn fit(&self, width: usize) -> RowLabel {
        let prefix_len = char_len(&self.prefix);
        if prefix_len + char_len(&self.value) <= width {
            return self.clone();
        }
        if prefix_len >= width {
            return RowLabel {
                prefix: truncate_with_ellipsis(&self.prefix, width),
                value: String::new(),
                kind: self.kind,
            };
        }
        RowLabel {
            prefix: self.prefix.clone(),
            value: truncate_with_ellipsis(&self.value, width - prefix_len),
            kind: self.kind,
        }
    }
}

/// Short display form of a value, capped at `budget` chars of content.
pub fn preview_value(value: &Value, budget: usize) -> String {
    match value {
        Value::String(s) => {
            let cut = if char_len(s) > budget {
                let mut cut: String = s.chars().take(budget.saturating_sub(1)).collect();
                cut.push(ELLIPSIS);
                cut
            } else {
                s.clone()
            };
            format!("\"{}\"", cut.replace('\n', NEWLINE_MARK))
        }
        Value::Number(n) => n.to_string(),
        Value::Bool(b) => b.to_string(),
        Value::Null => "null".to_string(),
        Value::Array(items) => format!("[{}]", items.len()),
        Value::Object(map) => format!("{{{}}}", map.len()),
    }
}

/// Resolve `path` against `root`.
pub fn value_at<'a>(root: &'a Value, path: &[PathSegment]) -> Option<&'a Value> {
    path.iter().try_fold(root, |value, segment| match segment {
        PathSegment::Key(key) => value.as_object()?.get(key),
        PathSegment::Index(index) => value.as_array()?.get(*index),
    })
}

/// Dotted path for the status line, e.g. `items.[0].name`.
pub fn path_label(path: &[PathSegment]) -> String {
    if path.is_empty() {
        return ROOT_LABEL.to_string();
    }
    path.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(".")
}

fn child_count(value: &Value) -> usize {
    match value {
        Value::Object(map) => map.len(),
        Value::Array(items) => items.len(),
        _ => 0,
    }
}

#[derive(Debug)]
pub struct TreeNavigator {
    document: Value,
    nodes: Vec<TreeNode>,
    by_path: HashMap<Vec<PathSegment>, NodeId>,
    visible: Vec<NodeId>,
    viewport: Viewport,
    preview_budget: usize,
}

impl TreeNavigator {
    pub fn new(document: Value) -> Self {
        Self::with_preview_budget(document, DEFAULT_PREVIEW_BUDGET)
    }

    pub fn with_preview_budget(document: Value, preview_budget: usize) -> Self {
        let root = TreeNode {
            key: None,
            kind: ValueKind::of(&document),
            depth: 0,
            path: Vec::new(),
            parent: None,
            expanded: true,
            child_count: child_count(&document),
            children: None,
            preview: preview_value(&document, preview_budget),
        };
        let mut navigator = Self {
            document,
            nodes: vec![root],
            by_path: HashMap::from([(Vec::new(), NodeId(0))]),
            visible: Vec::new(),
            viewport: Viewport::default(),
            preview_budget,
        };
        navigator.refresh(None);
        navigator
    }

    pub fn root(&self) -> NodeId {
        NodeId(0)
    }

    pub fn document(&self) -> &Value {
        &self.document
    }

    pub fn node(&self, id: NodeId) -> &TreeNode {
        &self.nodes[id.0]
    }

    pub fn node_by_path(&self, path: &[PathSegment]) -> Option<NodeId> {
        self.by_path.get(path).copied()
    }

    /// Value of a node, looked up from the document by path.
    pub fn value(&self, id: NodeId) -> Option<&Value> {
        value_at(&self.document, &self.node(id).path)
    }

    pub fn visible(&self) -> &[NodeId] {
        &self.visible
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn viewport_mut(&mut self) -> &mut Viewport {
        &mut self.viewport
    }

    pub fn selected_node(&self) -> Option<NodeId> {
        self.visible.get(self.viewport.selected()).copied()
    }

    /// On-screen rows paired with their absolute index.
    pub fn visible_rows(&self) -> impl Iterator<Item = (usize, NodeId)> + '_ {
        let range = self.viewport.visible_range();
        self.visible[range.clone()].iter().copied().zip(range).map(|(id, i)| (i, id))
    }

    /// Expand a collapsed node or collapse an expanded one. Leaves are left
    /// alone. Returns whether anything changed.
    pub fn toggle(&mut self, id: NodeId) -> bool {
        if !self.node(id).has_children() {
            return false;
        }
        if !self.node(id).expanded {
            self.materialize(id);
        }
        let node = &mut self.nodes[id.0];
        node.expanded = !node.expanded;
        let path = node.path.clone();
        self.refresh(Some(&path));
        true
    }

    pub fn toggle_selected(&mut self) -> bool {
        self.selected_node().is_some_and(|id| self.toggle(id))
    }

    /// Collapse the selected node when it is expanded, otherwise move the
    /// selection to its parent row.
    pub fn collapse_or_go_to_parent(&mut self) {
        let Some(id) = self.selected_node() else {
            return;
        };
        let node = self.node(id);
        if node.expanded && node.has_children() {
            self.toggle(id);
            return;
        }
        let Some(parent) = node.parent else {
            return;
        };
        if let Some(index) = self.visible.iter().position(|&v| v == parent) {
            self.viewport.move_to(index);
        }
    }

    /// Depth-first pre-order list of every node whose ancestors are expanded.
    pub fn flatten_visible(&mut self) -> Vec<NodeId> {
        let root = self.root();
        if !self.node(root).has_children() {
            return vec![root];
        }
        let mut out = Vec::new();
        let mut stack = vec![root];
        while let Some(id) = stack.pop() {
            if id != root {
                out.push(id);
            }
            let node = self.node(id);
            if !(node.expanded && node.has_children()) {
                continue;
            }
            self.materialize(id);
            if let Some(children) = &self.nodes[id.0].children {
                stack.extend(children.iter().rev().copied());
            }
        }
        out
    }

    /// Recompute the visible rows and put the selection back on `keep` (or on
    /// whatever was selected before), falling back to the first row.
    pub fn refresh(&mut self, keep: Option<&[PathSegment]>) {
        let keep: Option<Vec<PathSegment>> = keep
            .map(<[PathSegment]>::to_vec)
            .or_else(|| self.selected_node().map(|id| self.node(id).path.clone()));
        self.visible = self.flatten_visible();
        self.viewport.set_item_count(self.visible.len());
        let index = keep
            .and_then(|path| {
                self.visible
                    .iter()
                    .position(|&id| self.nodes[id.0].path == path)
            })
            .unwrap_or(0);
        self.viewport.move_to(index);
    }

    pub fn row_label(&self, id: NodeId) -> RowLabel {
        let node = self.node(id);
        let caret = if !node.has_children() {
            ' '
        } else if node.expanded {
            CARET_EXPANDED
        } else {
            CARET_COLLAPSED
        };
        // Depth-1 rows sit at the left edge; the root only shows when it is
        // the sole row.
        let indent = "  ".repeat(node.depth.saturating_sub(1));
        RowLabel {
            prefix: format!("{indent}{caret} {}: ", node.key_label()),
            value: node.preview.clone(),
            kind: node.kind,
        }
    }

    pub fn path_label(&self, id: NodeId) -> String {
        path_label(&self.node(id).path)
    }

    fn materialize(&mut self, id: NodeId) {
        if self.nodes[id.0].children.is_some() {
            return;
        }
        let parent = &self.nodes[id.0];
        let depth = parent.depth + 1;
        let base = parent.path.clone();
        let specs: Vec<(PathSegment, &Value)> = match value_at(&self.document, &base) {
            Some(Value::Object(map)) => map
                .iter()
                .map(|(key, value)| (PathSegment::Key(key.clone()), value))
                .collect(),
            Some(Value::Array(items)) => items
                .iter()
                .enumerate()
                .map(|(index, value)| (PathSegment::Index(index), value))
                .collect(),
            _ => Vec::new(),
        };
        let built: Vec<TreeNode> = specs
            .into_iter()
            .map(|(segment, value)| {
                let mut path = base.clone();
                path.push(segment.clone());
                TreeNode {
                    key: Some(segment),
                    kind: ValueKind::of(value),
                    depth,
                    path,
                    parent: Some(id),
                    expanded: false,
                    child_count: child_count(value),
                    children: None,
                    preview: preview_value(value, self.preview_budget),
                }
            })
            .collect();

        let mut children = Vec::with_capacity(built.len());
        for node in built {
            let child = NodeId(self.nodes.len());
            self.by_path.insert(node.path.clone(), child);
            self.nodes.push(node);
            children.push(child);
        }
        self.nodes[id.0].children = Some(children);
    }
}

impl SearchTarget for TreeNavigator {
    fn row_count(&self) -> usize {
        self.visible.len()
    }

    fn row_text(&self, index: usize) -> Cow<'_, str> {
        match self.visible.get(index) {
            Some(&id) => {
                let node = self.node(id);
                Cow::Owned(format!("{}: {}", node.key_label(), node.preview))
            }
            None => Cow::Borrowed(""),
        }
    }

    fn selected(&self) -> usize {
        self.viewport.selected()
    }

    fn select(&mut self, index: usize) {
        self.viewport.move_to(index);
    }
}
