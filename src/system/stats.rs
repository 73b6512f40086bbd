/// Statistics tracking for the dispatcher
use serde::{Deserialize, Serialize};

/// Dispatch statistics for monitoring one namespace universe.
#[derive(Debug, Default, Clone, Serialize, Deserialize)]
pub struct EventSpaceStats {
    /// Number of listener entries currently registered in the tree
    pub total_listeners: usize,
    /// Total number of triggers dispatched since the space was created
    pub events_triggered: u64,
    /// Total number of listener invocations performed inline
    pub inline_invocations: u64,
    /// Total number of listener invocations handed to the runtime as
    /// fire-and-forget tasks
    pub deferred_invocations: u64,
}
