//! # Utility Functions
//!
//! Factory helpers and the process-wide default namespace universe.
//!
//! Most applications use [`global()`] for app-wide wiring and
//! [`create_event_space()`] when an isolated universe is needed (plugin
//! sandboxes, tests).

use crate::system::EventSpace;
use lazy_static::lazy_static;
use std::sync::Arc;

lazy_static! {
    /// One process-wide default universe, constructed on first use and
    /// living for the lifetime of the process.
    static ref GLOBAL_SPACE: Arc<EventSpace> = Arc::new(EventSpace::new());
}

/// Returns the process-wide default [`EventSpace`].
///
/// All callers share the same namespace tree; use
/// [`create_event_space()`] for an independent universe instead.
pub fn global() -> Arc<EventSpace> {
    GLOBAL_SPACE.clone()
}

/// Creates a new, independent namespace universe.
///
/// The returned space shares nothing with [`global()`] or with any other
/// instance: listeners registered here are invisible everywhere else.
pub fn create_event_space() -> Arc<EventSpace> {
    Arc::new(EventSpace::new())
}
