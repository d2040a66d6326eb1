//! # Navigation Core
//!
//! Terminal-independent state for every scrollable screen:
//!
//! - [`Viewport`] - selection and scroll window over N rows
//! - [`FlatList`] - labels + viewport
//! - [`TreeNavigator`] - lazily expanded JSON tree flattened into rows
//! - [`TextPanel`] - wrapped multi-record text with record jumps
//! - [`SearchSession`] - incremental search over any [`SearchTarget`]
//!
//! Nothing here draws or reads keys; hosts in [`crate::ui`] translate key
//! events into calls on these types and render the visible slice.

pub mod list;
pub mod search;
pub mod text;
pub mod text_panel;
pub mod tree;
pub mod viewport;

pub use list::FlatList;
pub use search::{SearchInput, SearchMode, SearchOutcome, SearchSession, SearchTarget};
pub use text_panel::{LineKind, MessageRecord, PanelLine, TextPanel};
pub use tree::{NodeId, PathSegment, RowLabel, TreeNavigator, ValueKind};
pub use viewport::Viewport;
