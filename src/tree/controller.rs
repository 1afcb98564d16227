//! Caller-side expansion controller.
//!
//! Owns an [`ExpansionStore`] and a [`ChildFetcher`], and turns toggles into
//! at most one fetch per node: a fetch only starts when the node has no
//! cache entry (first expansion, or after `refresh` invalidated it).
//!
//! A fetch that is dropped before it settles is abandoned, never left loading.

use std::future::Future;

use crate::tree::keys::NodeKey;
use crate::tree::store::{ExpansionStore, Toggle};
use crate::tree::table::TableEvent;

/// Errors from loading child rows.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("upstream returned status {0}")]
    Status(u16),

    #[error("unexpected response shape: {0}")]
    Decode(String),

    #[error("unknown entity type `{0}`")]
    UnknownEntity(String),
}

/// Loads the children of one parent.
pub trait ChildFetcher<T> {
    fn fetch_children(
        &self,
        child_type: &str,
        parent_id: &str,
    ) -> impl Future<Output = Result<Vec<T>, FetchError>> + Send;
}

/// Outcome of handling a [`TableEvent`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Handled {
    Toggled(Toggle),
    /// Creating children is the caller's flow; the parent id is handed back.
    AddChild(String),
}

pub struct LazyExpansion<T, F> {
    store: ExpansionStore<T>,
    fetcher: F,
}

impl<T, F> LazyExpansion<T, F>
where
    F: ChildFetcher<T>,
{
    pub fn new(fetcher: F) -> Self {
        Self {
            store: ExpansionStore::new(),
            fetcher,
        }
    }

    pub fn store(&self) -> &ExpansionStore<T> {
        &self.store
    }

    pub fn fetcher(&self) -> &F {
        &self.fetcher
    }

    /// Synchronous half of a toggle: flip the node and, on first expansion,
    /// mark its entry loading.
    ///
    /// When this returns `Expanded { needs_fetch: true }` the caller owns the
    /// fetch: await [`fetch`](Self::fetch), then hand the result to
    /// [`settle`](Self::settle), or call [`abandon`](Self::abandon) if it
    /// gives up. The store renders `Loading` in between.
    pub fn begin_toggle(&mut self, key: &NodeKey) -> Toggle {
        let toggle = self.store.toggle_expand(key);
        if let Toggle::Expanded { needs_fetch: true } = toggle {
            self.store.begin_fetch(key);
        }
        toggle
    }

    /// Load the children of `key` without touching the store.
    pub async fn fetch(&self, key: &NodeKey) -> Result<Vec<T>, FetchError> {
        self.fetcher
            .fetch_children(key.child_type(), key.parent_id())
            .await
    }

    /// Apply a fetch result. Failures settle loaded-empty.
    pub fn settle(&mut self, key: &NodeKey, result: Result<Vec<T>, FetchError>) {
        apply_result(&mut self.store, key, result);
    }

    /// Forget an outstanding fetch so the next expand starts a new one.
    pub fn abandon(&mut self, key: &NodeKey) {
        self.store.abandon_fetch(key);
    }

    /// Toggle a node, loading its children on first expansion.
    ///
    /// Dropping the returned future mid-fetch abandons the fetch.
    pub async fn toggle(&mut self, key: &NodeKey) -> Toggle {
        let toggle = self.begin_toggle(key);
        if let Toggle::Expanded { needs_fetch: true } = toggle {
            self.run_fetch(key).await;
        }
        toggle
    }

    /// Drop cached children and reload them if the node is open.
    pub async fn refresh(&mut self, key: &NodeKey) {
        self.store.invalidate(key);
        if !self.store.node(key).is_some_and(|n| n.expanded) {
            return;
        }
        if !self.store.begin_fetch(key) {
            tracing::debug!(key = %key, "Fetch already outstanding");
            return;
        }
        self.run_fetch(key).await;
    }

    pub async fn handle(&mut self, event: TableEvent) -> Handled {
        match event {
            TableEvent::ToggleExpand(key) => Handled::Toggled(self.toggle(&key).await),
            TableEvent::AddChild { parent_id } => Handled::AddChild(parent_id),
        }
    }

    /// Fetch for an entry already marked loading.
    async fn run_fetch(&mut self, key: &NodeKey) {
        let pending = PendingFetch {
            store: &mut self.store,
            key,
            settled: false,
        };
        let result = self
            .fetcher
            .fetch_children(key.child_type(), key.parent_id())
            .await;
        pending.settle(result);
    }
}

fn apply_result<T>(store: &mut ExpansionStore<T>, key: &NodeKey, result: Result<Vec<T>, FetchError>) {
    match result {
        Ok(rows) => {
            tracing::debug!(key = %key, rows = rows.len(), "Children loaded");
            store.complete_fetch(key, rows);
        }
        Err(e) => {
            tracing::warn!(key = %key, error = %e, "Failed to load children");
            store.fail_fetch(key);
        }
    }
}

/// A loading entry that is abandoned on drop unless settled.
struct PendingFetch<'a, T> {
    store: &'a mut ExpansionStore<T>,
    key: &'a NodeKey,
    settled: bool,
}

impl<T> PendingFetch<'_, T> {
    fn settle(mut self, result: Result<Vec<T>, FetchError>) {
        apply_result(&mut *self.store, self.key, result);
        self.settled = true;
    }
}

impl<T> Drop for PendingFetch<'_, T> {
    fn drop(&mut self) {
        if !self.settled {
            tracing::debug!(key = %self.key, "Fetch cancelled");
            self.store.abandon_fetch(self.key);
        }
    }
}
