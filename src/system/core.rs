/// Core EventSpace implementation
use super::cache::SerializationBufferPool;
use super::stats::EventSpaceStats;
use crate::level::EventLevel;
use tokio::sync::RwLock;

/// The public facade over one namespace universe.
///
/// An `EventSpace` exclusively owns one root [`EventLevel`]; all mutable
/// state lives in that tree. Separate instances are fully independent:
/// registering on one never makes a listener visible to another.
///
/// Every operation normalizes its event-name input into a path vector and
/// delegates to the tree; triggers snapshot the matching listener set under a
/// read lock and dispatch after releasing it, so listeners that re-enter the
/// space (registering, cancelling, triggering) never deadlock and never
/// affect the dispatch pass that invoked them.
pub struct EventSpace {
    /// Root of the namespace tree (the empty path).
    pub(super) root: RwLock<EventLevel>,
    /// Dispatch statistics (kept as RwLock for atomic updates)
    pub(super) stats: RwLock<EventSpaceStats>,
    /// Serialization buffer pool so each trigger serializes its payload once
    pub(super) serialization_pool: SerializationBufferPool,
}

impl std::fmt::Debug for EventSpace {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventSpace")
            .field("root", &"[namespace tree]")
            .field("stats", &"[stats]")
            .finish()
    }
}

impl EventSpace {
    /// Creates a new, empty namespace universe.
    pub fn new() -> Self {
        Self {
            root: RwLock::new(EventLevel::new()),
            stats: RwLock::new(EventSpaceStats::default()),
            serialization_pool: SerializationBufferPool::default(),
        }
    }

    /// Gets the current dispatch statistics.
    #[inline]
    pub async fn get_stats(&self) -> EventSpaceStats {
        self.stats.read().await.clone()
    }
}

impl Default for EventSpace {
    fn default() -> Self {
        Self::new()
    }
}
