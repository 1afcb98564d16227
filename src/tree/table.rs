//! Recursive hierarchical table.
//!
//! A [`TableLevel`] describes one level: its columns, its empty message and,
//! optionally, the child level shown beneath an expanded row. Rendering is a
//! pure function of the level definition, the rows, the level's own loading
//! flag and an [`ExpansionView`]; it never fetches.
//!
//! Per level, exactly one of three bodies is produced:
//! `Loading` (own data loading), `Empty` (loaded, no rows) or `Rows`.

use crate::tree::column::{ColumnDef, TableRecord};
use crate::tree::keys::NodeKey;
use crate::tree::store::{ExpansionStore, ExpansionView};

pub const DEFAULT_NO_DATA_MESSAGE: &str = "Không có dữ liệu";

/// One level of a hierarchical table.
#[derive(Debug, Clone)]
pub struct TableLevel {
    pub columns: Vec<ColumnDef>,
    pub no_data_message: String,
    pub child: Option<ChildLevel>,
    /// Offer an "add child" action on each row of this level.
    pub allow_add_child: bool,
}

/// The nested level shown under an expanded row.
#[derive(Debug, Clone)]
pub struct ChildLevel {
    /// Child entity type name; drives the node keys.
    pub entity_name: Option<String>,
    /// Field of the parent row holding its entity id.
    pub parent_id_key: Option<String>,
    pub level: Box<TableLevel>,
}

impl TableLevel {
    pub fn new(columns: Vec<ColumnDef>) -> Self {
        Self {
            columns,
            no_data_message: DEFAULT_NO_DATA_MESSAGE.to_string(),
            child: None,
            allow_add_child: false,
        }
    }

    pub fn with_no_data_message(mut self, message: impl Into<String>) -> Self {
        self.no_data_message = message.into();
        self
    }

    pub fn with_child(
        mut self,
        entity_name: impl Into<String>,
        parent_id_key: impl Into<String>,
        level: TableLevel,
    ) -> Self {
        self.child = Some(ChildLevel {
            entity_name: Some(entity_name.into()),
            parent_id_key: Some(parent_id_key.into()),
            level: Box::new(level),
        });
        self
    }

    pub fn with_add_child(mut self) -> Self {
        self.allow_add_child = true;
        self
    }

    /// Rows of this level can show a child subtree at all.
    pub fn is_expandable(&self) -> bool {
        self.child
            .as_ref()
            .is_some_and(|c| c.parent_id_key.is_some() && !c.level.columns.is_empty())
    }

    /// Columns a rendered row occupies, including the expander and action columns.
    pub fn span(&self) -> usize {
        self.columns.len() + usize::from(self.is_expandable()) + usize::from(self.allow_add_child)
    }

    fn node_key<T: TableRecord>(&self, row: &T) -> Option<NodeKey> {
        let child = self.child.as_ref()?;
        let id = row.field(child.parent_id_key.as_deref()?)?;
        Some(NodeKey::new(child.entity_name.as_deref(), id))
    }
}

/// The subtree is shown iff the node is expanded, the child level has
/// columns and the parent id key is defined.
pub fn child_visible(expanded: bool, has_child_columns: bool, has_parent_id_key: bool) -> bool {
    expanded && has_child_columns && has_parent_id_key
}

/// Rendered table.
#[derive(Debug, Clone, PartialEq)]
pub struct TableView {
    pub headers: Vec<String>,
    pub span: usize,
    pub body: TableBody,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TableBody {
    Loading,
    Empty(String),
    Rows(Vec<RowView>),
}

#[derive(Debug, Clone, PartialEq)]
pub struct RowView {
    pub cells: Vec<String>,
    pub expander: Option<Expander>,
    /// Parent id passed to `on_add_child_click`.
    pub add_child: Option<String>,
    pub child: Option<ChildView>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Expander {
    pub key: NodeKey,
    pub expanded: bool,
}

/// Nested table spanning the parent's full width.
#[derive(Debug, Clone, PartialEq)]
pub struct ChildView {
    pub colspan: usize,
    pub table: Box<TableView>,
}

impl TableView {
    pub fn rows(&self) -> &[RowView] {
        match &self.body {
            TableBody::Rows(rows) => rows,
            _ => &[],
        }
    }
}

impl RowView {
    pub fn toggle_event(&self) -> Option<TableEvent> {
        self.expander
            .as_ref()
            .map(|e| TableEvent::ToggleExpand(e.key.clone()))
    }

    pub fn add_child_event(&self) -> Option<TableEvent> {
        self.add_child.as_ref().map(|id| TableEvent::AddChild {
            parent_id: id.clone(),
        })
    }
}

/// User interaction raised by a rendered row.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableEvent {
    ToggleExpand(NodeKey),
    AddChild { parent_id: String },
}

/// Caller-owned handlers for table interactions.
pub trait TableCallbacks {
    fn toggle_expand(&mut self, key: &NodeKey);

    fn on_add_child_click(&mut self, _parent_id: &str) {}
}

impl TableEvent {
    pub fn dispatch<C: TableCallbacks + ?Sized>(&self, callbacks: &mut C) {
        match self {
            TableEvent::ToggleExpand(key) => callbacks.toggle_expand(key),
            TableEvent::AddChild { parent_id } => callbacks.on_add_child_click(parent_id),
        }
    }
}

/// Queue events for later async handling.
impl TableCallbacks for Vec<TableEvent> {
    fn toggle_expand(&mut self, key: &NodeKey) {
        self.push(TableEvent::ToggleExpand(key.clone()));
    }

    fn on_add_child_click(&mut self, parent_id: &str) {
        self.push(TableEvent::AddChild {
            parent_id: parent_id.to_string(),
        });
    }
}

/// Toggling straight on a store, for callers that fetch separately.
impl<T> TableCallbacks for ExpansionStore<T> {
    fn toggle_expand(&mut self, key: &NodeKey) {
        ExpansionStore::<T>::toggle_expand(self, key);
    }
}

/// Render one level and, recursively, every expanded subtree below it.
pub fn render<T, S>(level: &TableLevel, data: &[T], is_loading: bool, state: &S) -> TableView
where
    T: TableRecord,
    S: ExpansionView<T>,
{
    let headers = level.columns.iter().map(|c| c.header.clone()).collect();
    let span = level.span();

    let body = if is_loading {
        TableBody::Loading
    } else if data.is_empty() {
        TableBody::Empty(level.no_data_message.clone())
    } else {
        TableBody::Rows(data.iter().map(|row| render_row(level, row, state)).collect())
    };

    TableView {
        headers,
        span,
        body,
    }
}

fn render_row<T, S>(level: &TableLevel, row: &T, state: &S) -> RowView
where
    T: TableRecord,
    S: ExpansionView<T>,
{
    let cells = level
        .columns
        .iter()
        .map(|c| row.field(&c.key).unwrap_or_default())
        .collect();

    let key = level.node_key(row);
    let expanded = key.as_ref().is_some_and(|k| state.is_expanded(k));

    let expander = if level.is_expandable() {
        key.clone().map(|key| Expander { key, expanded })
    } else {
        None
    };

    let add_child = if level.allow_add_child {
        key.as_ref().map(|k| k.parent_id().to_string())
    } else {
        None
    };

    let child = match (&level.child, &key) {
        (Some(child), Some(key))
            if child_visible(
                expanded,
                !child.level.columns.is_empty(),
                child.parent_id_key.is_some(),
            ) =>
        {
            let (data, loading) = match state.cache_entry(key) {
                Some(entry) => (entry.data.as_slice(), entry.is_loading),
                None => (&[][..], false),
            };
            Some(ChildView {
                colspan: level.span(),
                table: Box::new(render(&child.level, data, loading, state)),
            })
        }
        _ => None,
    };

    RowView {
        cells,
        expander,
        add_child,
        child,
    }
}
