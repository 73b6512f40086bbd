/// Trigger methods and the dispatch pipeline
use super::core::EventSpace;
use crate::events::{Delivery, Event, EventError, EventHandler};
use crate::level::EventLevel;
use crate::path::{EventPath, IntoEventPath};
use std::sync::Arc;
use tracing::{debug, error, warn};

impl EventSpace {
    /// Triggers the listeners at the resolved path.
    ///
    /// With `include_children` set, the trigger is descendant-inclusive: the
    /// resolved level's own listeners fire first, followed by every listener
    /// in its subtree in depth-first pre-order (root-to-leaf along any
    /// chain). Without it, only the exact level's listeners fire.
    ///
    /// Every invoked listener receives the originally-triggered payload;
    /// descendant listeners are not told their own path. Listener failures
    /// are isolated: an erring listener is logged and the remaining
    /// invocations of the pass proceed.
    ///
    /// Triggering a path with no corresponding level is a silent no-op.
    pub async fn trigger<T>(
        &self,
        event_name: impl IntoEventPath,
        event: &T,
        include_children: bool,
        delivery: Delivery,
    ) -> Result<(), EventError>
    where
        T: Event,
    {
        let path = event_name.into_event_path();
        let data = self.serialization_pool.serialize_event(event)?;

        let targets = {
            let root = self.root.read().await;
            let mut targets = Vec::new();
            if include_children {
                root.collect_descendants(path.segments(), true, &mut targets);
            } else {
                root.collect_local(path.segments(), &mut targets);
            }
            if targets.is_empty() {
                log_unmatched(&root, &path);
            }
            targets
        };

        self.dispatch(&path, targets, data, delivery).await;
        Ok(())
    }

    /// Triggers the resolved level's subtree, with `include_self` deciding
    /// whether the level's own listeners fire before its descendants.
    pub async fn trigger_descendants<T>(
        &self,
        event_name: impl IntoEventPath,
        event: &T,
        include_self: bool,
        delivery: Delivery,
    ) -> Result<(), EventError>
    where
        T: Event,
    {
        let path = event_name.into_event_path();
        let data = self.serialization_pool.serialize_event(event)?;

        let targets = {
            let root = self.root.read().await;
            let mut targets = Vec::new();
            root.collect_descendants(path.segments(), include_self, &mut targets);
            if targets.is_empty() {
                log_unmatched(&root, &path);
            }
            targets
        };

        self.dispatch(&path, targets, data, delivery).await;
        Ok(())
    }

    /// Triggers the chain from the root down to the resolved path, in
    /// root-to-leaf order, stopping early when a segment is missing.
    /// `include_self` controls the terminal level's own listeners.
    pub async fn trigger_ancestors<T>(
        &self,
        event_name: impl IntoEventPath,
        event: &T,
        include_self: bool,
        delivery: Delivery,
    ) -> Result<(), EventError>
    where
        T: Event,
    {
        let path = event_name.into_event_path();
        let data = self.serialization_pool.serialize_event(event)?;

        let targets = {
            let root = self.root.read().await;
            let mut targets = Vec::new();
            root.collect_ancestors(path.segments(), include_self, &mut targets);
            if targets.is_empty() {
                log_unmatched(&root, &path);
            }
            targets
        };

        self.dispatch(&path, targets, data, delivery).await;
        Ok(())
    }

    /// Convenience trigger: descendant-inclusive, inline delivery.
    ///
    /// `send` reaches the resolved level and everything below it. This is the
    /// documented default contract -- it is what lets one-shot listeners
    /// (which live at a private leaf under the nominal path) fire on a plain
    /// `send` of the nominal path. Use [`trigger`](Self::trigger) with
    /// `include_children = false` for exact-level dispatch.
    #[inline]
    pub async fn send<T>(&self, event_name: impl IntoEventPath, event: &T) -> Result<(), EventError>
    where
        T: Event,
    {
        self.trigger_descendants(event_name, event, true, Delivery::Inline)
            .await
    }

    /// Alias for [`trigger_descendants`](Self::trigger_descendants) with
    /// inline delivery and `include_self` set.
    #[inline]
    pub async fn send_descendants<T>(
        &self,
        event_name: impl IntoEventPath,
        event: &T,
    ) -> Result<(), EventError>
    where
        T: Event,
    {
        self.trigger_descendants(event_name, event, true, Delivery::Inline)
            .await
    }

    /// Alias for [`trigger_ancestors`](Self::trigger_ancestors) with inline
    /// delivery and `include_self` set.
    #[inline]
    pub async fn send_ancestors<T>(
        &self,
        event_name: impl IntoEventPath,
        event: &T,
    ) -> Result<(), EventError>
    where
        T: Event,
    {
        self.trigger_ancestors(event_name, event, true, Delivery::Inline)
            .await
    }

    /// Internal dispatch over a snapshotted listener set.
    ///
    /// Runs with the tree lock released, so listeners are free to re-enter
    /// the space; mutations they make are visible to later triggers, never to
    /// the current pass.
    async fn dispatch(
        &self,
        path: &EventPath,
        handlers: Vec<Arc<dyn EventHandler>>,
        data: Arc<Vec<u8>>,
        delivery: Delivery,
    ) {
        let invoked = handlers.len();
        if invoked > 0 && cfg!(debug_assertions) {
            debug!("Dispatching '{}' to {} listeners", path, invoked);
        }

        match delivery {
            Delivery::Inline => {
                for handler in &handlers {
                    if let Err(e) = handler.handle(&data).await {
                        error!("Listener {} failed: {}", handler.handler_name(), e);
                    }
                }
            }
            Delivery::Deferred => {
                for handler in handlers {
                    let data = data.clone();
                    tokio::spawn(async move {
                        if let Err(e) = handler.handle(&data).await {
                            error!("Listener {} failed: {}", handler.handler_name(), e);
                        }
                    });
                }
            }
        }

        let mut stats = self.stats.write().await;
        stats.events_triggered += 1;
        match delivery {
            Delivery::Inline => stats.inline_invocations += invoked as u64,
            Delivery::Deferred => stats.deferred_invocations += invoked as u64,
        }
    }
}

/// Diagnostic for a trigger that resolved no listeners: a silent no-op for
/// the caller, but worth a hint in the logs when similar paths exist.
fn log_unmatched(root: &EventLevel, path: &EventPath) {
    let similar = root.find_similar_paths(&path.to_string(), 5);
    if !similar.is_empty() {
        warn!(
            "No listeners for '{}' (similar paths registered: {:?})",
            path, similar
        );
    } else {
        debug!("No listeners for '{}'", path);
    }
}
