/// Listener registration methods
use super::core::EventSpace;
use crate::events::{Event, EventError, EventHandler, TypedEventHandler};
use crate::level::Cancel;
use crate::path::{EventPath, IntoEventPath};
use async_trait::async_trait;
use std::any::TypeId;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Weak};
use tracing::{debug, info};

impl EventSpace {
    /// Registers a persistent listener at the resolved path.
    ///
    /// Missing levels along the path are created. Returns the stored listener
    /// reference; keep it to cancel this exact listener later with
    /// [`Cancel::Listener`] or to query it with
    /// [`Query::Listener`](crate::level::Query::Listener).
    ///
    /// Registering the identical returned reference again at the same path is
    /// a no-op (set semantics); registering a fresh closure always adds a new
    /// entry.
    ///
    /// # Examples
    ///
    /// ```rust,no_run
    /// use eventspace::{EventSpace, EventError};
    /// use serde::{Serialize, Deserialize};
    ///
    /// #[derive(Debug, Serialize, Deserialize)]
    /// struct InventoryChanged { slot: u32 }
    ///
    /// async fn example() -> Result<(), EventError> {
    ///     let space = EventSpace::new();
    ///     let listener = space.receive("player.inventory", |event: InventoryChanged| {
    ///         println!("slot {} changed", event.slot);
    ///         Ok(())
    ///     }).await?;
    ///     space.cancel("player.inventory", eventspace::Cancel::Listener(listener)).await;
    ///     Ok(())
    /// }
    /// ```
    pub async fn receive<T, F>(
        &self,
        event_name: impl IntoEventPath,
        listener: F,
    ) -> Result<Arc<dyn EventHandler>, EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Result<(), EventError> + Send + Sync + Clone + 'static,
    {
        let path = event_name.into_event_path();
        let handler_name = format!("{}::{}", path, T::type_name());
        let handler: Arc<dyn EventHandler> =
            Arc::new(TypedEventHandler::new(handler_name, listener));
        self.attach(&path, handler.clone()).await;
        Ok(handler)
    }

    /// Alias for [`receive`](Self::receive).
    pub async fn on<T, F>(
        &self,
        event_name: impl IntoEventPath,
        listener: F,
    ) -> Result<Arc<dyn EventHandler>, EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Result<(), EventError> + Send + Sync + Clone + 'static,
    {
        self.receive(event_name, listener).await
    }

    /// Registers a one-shot listener: invoked on the first matching trigger,
    /// then deregistered automatically.
    ///
    /// The listener is wrapped and registered at the nominal path suffixed
    /// with a single-use random segment, so it lives at its own private leaf.
    /// An unrelated cancellation of the nominal path's local set can
    /// therefore never remove it (a subtree cancellation of the nominal path
    /// still can, since the private leaf is a descendant). Because the
    /// private leaf sits below the nominal path, one-shot listeners are
    /// reached by descendant-inclusive triggers such as
    /// [`send`](Self::send), not by exact-level dispatch.
    ///
    /// Returns the inner (user) listener reference.
    pub async fn receive_once<T, F>(
        self: &Arc<Self>,
        event_name: impl IntoEventPath,
        listener: F,
    ) -> Result<Arc<dyn EventHandler>, EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Result<(), EventError> + Send + Sync + Clone + 'static,
    {
        let mut path = event_name.into_event_path();
        path.push_unique();

        let handler_name = format!("{}::{}", path, T::type_name());
        let inner: Arc<dyn EventHandler> =
            Arc::new(TypedEventHandler::new(handler_name, listener));
        let wrapper: Arc<dyn EventHandler> = Arc::new(OnceHandler {
            inner: inner.clone(),
            space: Arc::downgrade(self),
            path: path.clone(),
            fired: AtomicBool::new(false),
        });

        self.attach(&path, wrapper).await;
        Ok(inner)
    }

    /// Alias for [`receive_once`](Self::receive_once).
    pub async fn once<T, F>(
        self: &Arc<Self>,
        event_name: impl IntoEventPath,
        listener: F,
    ) -> Result<Arc<dyn EventHandler>, EventError>
    where
        T: Event + 'static,
        F: Fn(T) -> Result<(), EventError> + Send + Sync + Clone + 'static,
    {
        self.receive_once(event_name, listener).await
    }

    /// Internal helper adding an already-wrapped listener to the tree.
    pub(super) async fn attach(&self, path: &EventPath, handler: Arc<dyn EventHandler>) -> bool {
        let added = {
            let mut root = self.root.write().await;
            root.add_listener(path.segments(), handler)
        };

        if added {
            let mut stats = self.stats.write().await;
            stats.total_listeners += 1;
            info!("Registered listener at '{}'", path);
        } else {
            debug!("Listener already registered at '{}', kept once", path);
        }
        added
    }
}

/// Wrapper giving a listener fire-once semantics.
///
/// The `fired` flag guarantees exactly-once even when several deferred
/// invocations were scheduled before the first one ran; the weak
/// back-reference lets the wrapper prune its private leaf without keeping the
/// space alive.
struct OnceHandler {
    inner: Arc<dyn EventHandler>,
    space: Weak<EventSpace>,
    path: EventPath,
    fired: AtomicBool,
}

impl std::fmt::Debug for OnceHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OnceHandler")
            .field("inner", &self.inner)
            .field("fired", &self.fired.load(Ordering::Relaxed))
            .finish()
    }
}

#[async_trait]
impl EventHandler for OnceHandler {
    async fn handle(&self, data: &[u8]) -> Result<(), EventError> {
        if self.fired.swap(true, Ordering::SeqCst) {
            return Ok(());
        }

        let result = self.inner.handle(data).await;

        // The dispatch pass invoking us works from a snapshot with the tree
        // lock released, so removing the private leaf here cannot deadlock.
        if let Some(space) = self.space.upgrade() {
            space.cancel(&self.path, Cancel::All).await;
        }

        result
    }

    fn expected_type_id(&self) -> TypeId {
        self.inner.expected_type_id()
    }

    fn handler_name(&self) -> &str {
        self.inner.handler_name()
    }
}
