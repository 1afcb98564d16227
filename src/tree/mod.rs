//! Hierarchical lazy-expansion table.
//!
//! # Data Flow
//! ```text
//! rows + TableLevel + ExpansionView
//!     → table.rs render (recursive, pure)
//!     → TableView (Loading | Empty | Rows with nested ChildViews)
//!     → render.rs (terminal text)
//!
//! user toggles a row
//!     → TableEvent::ToggleExpand(NodeKey)
//!     → controller.rs (store.toggle_expand, fetch once per key)
//!     → store.rs cache entry populated
//!     → re-render shows the subtree
//! ```
//!
//! Node keys come from keys.rs and are the only link between a rendered row
//! and its state.

pub mod column;
pub mod controller;
pub mod keys;
pub mod render;
pub mod store;
pub mod table;

pub use column::{ColumnDef, TableRecord};
pub use controller::{ChildFetcher, FetchError, Handled, LazyExpansion};
pub use keys::{cache_key, expansion_key, NodeKey};
pub use render::render_text;
pub use store::{CacheEntry, ExpansionNode, ExpansionStore, ExpansionView, Toggle};
pub use table::{
    child_visible, render, ChildLevel, ChildView, Expander, RowView, TableBody, TableCallbacks,
    TableEvent, TableLevel, TableView,
};
