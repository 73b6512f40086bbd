/// Cancellation, existence queries, and introspection utilities
use super::core::EventSpace;
use crate::level::{Cancel, Query};
use crate::path::IntoEventPath;
use tracing::info;

impl EventSpace {
    /// Cancels listeners at the resolved path per `selector`.
    ///
    /// [`Cancel::All`] detaches the level and its entire subtree;
    /// [`Cancel::LocalOnly`] clears only the level's own set;
    /// [`Cancel::Listener`] removes one exact reference. Cancelling a path
    /// with no corresponding level is a no-op. Returns the number of
    /// listener entries removed.
    pub async fn cancel(&self, event_name: impl IntoEventPath, selector: Cancel) -> usize {
        let path = event_name.into_event_path();
        let removed = {
            let mut root = self.root.write().await;
            root.remove_listeners(path.segments(), &selector)
        };
        self.note_removed(removed, &format!("'{}'", path)).await;
        removed
    }

    /// Alias for [`cancel`](Self::cancel).
    #[inline]
    pub async fn off(&self, event_name: impl IntoEventPath, selector: Cancel) -> usize {
        self.cancel(event_name, selector).await
    }

    /// The bare-cancel default: clears the whole universe (root path,
    /// [`Cancel::All`]).
    pub async fn clear(&self) -> usize {
        self.cancel(crate::path::EventPath::root(), Cancel::All).await
    }

    /// Clears the local listener sets of the resolved level's subtree,
    /// detaching the children; `include_self` also clears the level's own
    /// set. Returns the number of listener entries removed.
    pub async fn cancel_descendants(
        &self,
        event_name: impl IntoEventPath,
        include_self: bool,
    ) -> usize {
        let path = event_name.into_event_path();
        let removed = {
            let mut root = self.root.write().await;
            root.clear_descendants(path.segments(), include_self)
        };
        self.note_removed(removed, &format!("subtree of '{}'", path)).await;
        removed
    }

    /// Clears local listener sets from the root down to the resolved path,
    /// stopping early if the chain breaks; `include_self` controls the
    /// terminal level. Returns the number of listener entries removed.
    pub async fn cancel_ancestors(
        &self,
        event_name: impl IntoEventPath,
        include_self: bool,
    ) -> usize {
        let path = event_name.into_event_path();
        let removed = {
            let mut root = self.root.write().await;
            root.clear_ancestors(path.segments(), include_self)
        };
        self.note_removed(removed, &format!("ancestors of '{}'", path)).await;
        removed
    }

    /// Alias for [`cancel_descendants`](Self::cancel_descendants).
    #[inline]
    pub async fn off_descendants(
        &self,
        event_name: impl IntoEventPath,
        include_self: bool,
    ) -> usize {
        self.cancel_descendants(event_name, include_self).await
    }

    /// Alias for [`cancel_ancestors`](Self::cancel_ancestors).
    #[inline]
    pub async fn off_ancestors(
        &self,
        event_name: impl IntoEventPath,
        include_self: bool,
    ) -> usize {
        self.cancel_ancestors(event_name, include_self).await
    }

    /// Whether the resolved level matches `query`. Never errors; a missing
    /// path is simply `false`.
    pub async fn has(&self, event_name: impl IntoEventPath, query: Query) -> bool {
        let path = event_name.into_event_path();
        self.root.read().await.has(path.segments(), &query)
    }

    /// Whether the resolved level (if `include_self`) or any level in its
    /// subtree matches `query`.
    pub async fn has_descendants(
        &self,
        event_name: impl IntoEventPath,
        query: Query,
        include_self: bool,
    ) -> bool {
        let path = event_name.into_event_path();
        self.root
            .read()
            .await
            .has_descendants(path.segments(), &query, include_self)
    }

    /// Whether any level on the root-to-path chain matches `query`;
    /// `include_self` controls the terminal level.
    pub async fn has_ancestors(
        &self,
        event_name: impl IntoEventPath,
        query: Query,
        include_self: bool,
    ) -> bool {
        let path = event_name.into_event_path();
        self.root
            .read()
            .await
            .has_ancestors(path.segments(), &query, include_self)
    }

    /// All paths currently holding at least one listener.
    pub async fn registered_paths(&self) -> Vec<String> {
        self.root.read().await.registered_paths()
    }

    /// Number of listeners local to the resolved path.
    pub async fn listener_count(&self, event_name: impl IntoEventPath) -> usize {
        let path = event_name.into_event_path();
        self.root.read().await.listener_count_at(path.segments())
    }

    /// Total number of listener entries across the whole tree.
    pub async fn total_listeners(&self) -> usize {
        self.root.read().await.total_listeners()
    }

    /// Validates the namespace tree, reporting structural issues such as
    /// empty-shell levels and paths with excessive listener counts.
    pub async fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        self.root.read().await.audit(&mut issues);
        issues
    }

    async fn note_removed(&self, removed: usize, what: &str) {
        if removed > 0 {
            let mut stats = self.stats.write().await;
            stats.total_listeners = stats.total_listeners.saturating_sub(removed);
            info!("Removed {} listeners from {}", removed, what);
        }
    }
}
