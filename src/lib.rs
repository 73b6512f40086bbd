//! # Eventspace
//!
//! A hierarchical, in-process publish/subscribe dispatcher. Listeners
//! register against dot-delimited namespace paths (`"player.inventory.changed"`);
//! events published to a path invoke listeners at that path and/or at its
//! ancestor or descendant paths depending on the trigger variant.
//!
//! ## Core Features
//!
//! - **Type Safety**: Payloads are strongly typed; any
//!   `Serialize + Deserialize + Debug` type is an event.
//! - **Hierarchical Routing**: The namespace is a tree of levels; triggers
//!   can target an exact level, a whole subtree, or the root-to-level chain.
//! - **Async/Await Support**: Built on Tokio; delivery is inline (awaited in
//!   order) or deferred (one fire-and-forget task per listener).
//! - **One-shot Listeners**: Automatically deregistered after their first
//!   invocation, each living at its own collision-free private leaf.
//! - **Isolation**: Listener failures are logged, never propagated to
//!   sibling listeners; separate spaces share nothing.
//!
//! ## Architecture Overview
//!
//! - [`EventPath`]: normalization of event names into ordered segment
//!   vectors (dot-split strings or pre-split sequences).
//! - [`EventLevel`]: the namespace tree — per-level listener sets, child
//!   maps, and the traversal/mutation algorithms.
//! - [`EventSpace`]: the public facade — registration
//!   ([`receive`](EventSpace::receive)/[`once`](EventSpace::once)),
//!   cancellation ([`cancel`](EventSpace::cancel) and the subtree/chain
//!   variants), triggering ([`send`](EventSpace::send)/
//!   [`trigger`](EventSpace::trigger) families), and existence queries.
//!
//! ## Quick Start Example
//!
//! ```rust,no_run
//! use eventspace::{create_event_space, Cancel, Query};
//! use serde::{Deserialize, Serialize};
//!
//! #[derive(Debug, Serialize, Deserialize)]
//! struct SlotChanged {
//!     slot: u32,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let space = create_event_space();
//!
//!     // Persistent listener at an exact path.
//!     space.receive("player.inventory", |event: SlotChanged| {
//!         println!("slot {} changed", event.slot);
//!         Ok(())
//!     }).await?;
//!
//!     // One-shot listener, gone after its first invocation.
//!     space.once("player.inventory", |_event: SlotChanged| {
//!         println!("first change only");
//!         Ok(())
//!     }).await?;
//!
//!     // Descendant-inclusive send reaches both.
//!     space.send("player.inventory", &SlotChanged { slot: 3 }).await?;
//!
//!     assert!(space.has_descendants("player", Query::Any, false).await);
//!     space.cancel("player.inventory", Cancel::All).await;
//!     Ok(())
//! }
//! ```

// tests
mod test_integration;

// Core modules
pub mod events;
pub mod level;
pub mod path;
pub mod system;
pub mod utils;

// Re-export commonly used items for convenience
pub use events::{Delivery, Event, EventError, EventHandler, TypedEventHandler};
pub use level::{Cancel, EventLevel, Query};
pub use path::{EventPath, IntoEventPath};
pub use system::{EventSpace, EventSpaceStats};
pub use utils::{create_event_space, global};

// External dependencies that callers commonly need
pub use async_trait::async_trait;
pub use serde::{Deserialize, Serialize};
pub use std::sync::Arc;
