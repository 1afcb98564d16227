//! Expansion state arena.
//!
//! Nodes are keyed by their expansion key. `toggle_expand` is the only way to
//! flip a node; the fetch lifecycle (`begin_fetch` → `complete_fetch` /
//! `fail_fetch`) only touches the cache entry. Rendering sees the store
//! through the read-only [`ExpansionView`] projection.
//!
//! Collapsing never drops a cache entry. Only `invalidate` and `clear` do.

use std::collections::HashMap;

use crate::tree::keys::NodeKey;

/// Cached children of one node.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheEntry<T> {
    pub data: Vec<T>,
    pub is_loading: bool,
}

impl<T> CacheEntry<T> {
    pub fn loading() -> Self {
        Self {
            data: Vec::new(),
            is_loading: true,
        }
    }

    pub fn loaded(data: Vec<T>) -> Self {
        Self {
            data,
            is_loading: false,
        }
    }
}

/// Per-node state.
#[derive(Debug, Clone)]
pub struct ExpansionNode<T> {
    pub key: NodeKey,
    pub expanded: bool,
    pub entry: Option<CacheEntry<T>>,
}

/// What a toggle did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Toggle {
    Collapsed,
    /// `needs_fetch` is true when no entry exists yet, loading or loaded.
    Expanded { needs_fetch: bool },
}

/// Read-only projection consumed by the renderer.
pub trait ExpansionView<T> {
    fn is_expanded(&self, key: &NodeKey) -> bool;
    fn cache_entry(&self, key: &NodeKey) -> Option<&CacheEntry<T>>;
}

/// Arena of expansion nodes.
#[derive(Debug, Clone)]
pub struct ExpansionStore<T> {
    nodes: HashMap<String, ExpansionNode<T>>,
    by_cache_key: HashMap<String, String>,
}

impl<T> Default for ExpansionStore<T> {
    fn default() -> Self {
        Self {
            nodes: HashMap::new(),
            by_cache_key: HashMap::new(),
        }
    }
}

impl<T> ExpansionStore<T> {
    pub fn new() -> Self {
        Self::default()
    }

    fn node_mut(&mut self, key: &NodeKey) -> &mut ExpansionNode<T> {
        self.by_cache_key
            .entry(key.cache_key().to_string())
            .or_insert_with(|| key.expansion_key().to_string());

        self.nodes
            .entry(key.expansion_key().to_string())
            .or_insert_with(|| ExpansionNode {
                key: key.clone(),
                expanded: false,
                entry: None,
            })
    }

    /// Flip a node's expanded flag, creating it on first use.
    pub fn toggle_expand(&mut self, key: &NodeKey) -> Toggle {
        let node = self.node_mut(key);
        node.expanded = !node.expanded;

        if node.expanded {
            Toggle::Expanded {
                needs_fetch: node.entry.is_none(),
            }
        } else {
            Toggle::Collapsed
        }
    }

    /// Mark a node as loading. Returns false if a fetch is already outstanding.
    ///
    /// Data from a previous load stays in place until the new one completes.
    pub fn begin_fetch(&mut self, key: &NodeKey) -> bool {
        let node = self.node_mut(key);
        match node.entry.as_mut() {
            Some(entry) if entry.is_loading => false,
            Some(entry) => {
                entry.is_loading = true;
                true
            }
            None => {
                node.entry = Some(CacheEntry::loading());
                true
            }
        }
    }

    pub fn complete_fetch(&mut self, key: &NodeKey, data: Vec<T>) {
        self.node_mut(key).entry = Some(CacheEntry::loaded(data));
    }

    /// Settle a failed fetch as loaded-empty, which renders the no-data message.
    pub fn fail_fetch(&mut self, key: &NodeKey) {
        self.node_mut(key).entry = Some(CacheEntry::loaded(Vec::new()));
    }

    /// Give up on an outstanding fetch.
    ///
    /// A fresh entry is removed so the next expand fetches again. An entry
    /// still holding earlier rows keeps them and stops loading.
    pub fn abandon_fetch(&mut self, key: &NodeKey) {
        let Some(node) = self.nodes.get_mut(key.expansion_key()) else {
            return;
        };
        let Some(entry) = node.entry.as_mut() else {
            return;
        };
        if !entry.is_loading {
            return;
        }
        if entry.data.is_empty() {
            node.entry = None;
        } else {
            entry.is_loading = false;
        }
    }

    /// Drop a node's cached children. The expanded flag is kept.
    pub fn invalidate(&mut self, key: &NodeKey) -> Option<CacheEntry<T>> {
        self.nodes
            .get_mut(key.expansion_key())
            .and_then(|node| node.entry.take())
    }

    pub fn node(&self, key: &NodeKey) -> Option<&ExpansionNode<T>> {
        self.nodes.get(key.expansion_key())
    }

    /// Look up a cache entry by its raw cache key.
    pub fn entry_by_cache_key(&self, cache_key: &str) -> Option<&CacheEntry<T>> {
        let expansion = self.by_cache_key.get(cache_key)?;
        self.nodes.get(expansion)?.entry.as_ref()
    }

    pub fn nodes(&self) -> impl Iterator<Item = &ExpansionNode<T>> {
        self.nodes.values()
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Discard all state, as when the owning page goes away.
    pub fn clear(&mut self) {
        self.nodes.clear();
        self.by_cache_key.clear();
    }
}

impl<T> ExpansionView<T> for ExpansionStore<T> {
    fn is_expanded(&self, key: &NodeKey) -> bool {
        self.node(key).is_some_and(|n| n.expanded)
    }

    fn cache_entry(&self, key: &NodeKey) -> Option<&CacheEntry<T>> {
        self.node(key).and_then(|n| n.entry.as_ref())
    }
}
