//! # Event Traits and Dispatch Infrastructure
//!
//! This module defines the payload and listener abstractions the dispatcher
//! is built on: the [`Event`] trait for payloads, the [`EventHandler`] trait
//! for listeners, and the [`TypedEventHandler`] bridge between the two.
//!
//! ## Design Principles
//!
//! - **Type Safety**: Payloads are strongly typed; listeners declare the type
//!   they expect and mismatched payloads are skipped, not crashed on.
//! - **Serialization**: A trigger serializes its payload once and every
//!   invoked listener deserializes its own typed copy, so listeners can never
//!   observe each other's mutations.
//! - **Isolation**: A failing listener is logged and never aborts the
//!   remaining invocations of the same dispatch pass.

use async_trait::async_trait;
use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::{any::{Any, TypeId}, fmt::Debug};

// ============================================================================
// Event Traits
// ============================================================================

/// Core trait that all event payloads implement.
///
/// Provides serialization for dispatch, type identification for routing, and
/// dynamic typing support. Most types get this through the blanket
/// implementation; deriving `Serialize`/`Deserialize`/`Debug` is enough.
pub trait Event: Send + Sync + Any + Debug {
    /// Returns a stable, unique identifier for the payload type.
    fn type_name() -> &'static str
    where
        Self: Sized;

    /// Serializes the payload for dispatch.
    fn serialize(&self) -> Result<Vec<u8>, EventError>;

    /// Deserializes a payload from bytes.
    fn deserialize(data: &[u8]) -> Result<Self, EventError>
    where
        Self: Sized;

    /// Returns this payload as `&dyn Any` for runtime downcasting.
    fn as_any(&self) -> &dyn Any;
}

/// Blanket implementation with JSON serialization.
///
/// Any `Serialize + DeserializeOwned + Send + Sync + Debug` type is an event:
///
/// ```rust
/// use serde::{Deserialize, Serialize};
///
/// #[derive(Debug, Serialize, Deserialize)]
/// struct InventoryChanged {
///     slot: u32,
/// }
/// // InventoryChanged now implements Event automatically.
/// ```
impl<T> Event for T
where
    T: Serialize + DeserializeOwned + Send + Sync + Any + Debug + 'static,
{
    fn type_name() -> &'static str {
        std::any::type_name::<T>()
    }

    fn serialize(&self) -> Result<Vec<u8>, EventError> {
        serde_json::to_vec(self).map_err(|e| {
            tracing::error!(
                "Event serialization failed for type '{}': {} (event debug: {:?})",
                Self::type_name(),
                e,
                self
            );
            EventError::Serialization(e)
        })
    }

    fn deserialize(data: &[u8]) -> Result<Self, EventError> {
        serde_json::from_slice(data).map_err(|e| {
            tracing::error!(
                "Event deserialization failed for type '{}': {} ({} bytes)",
                Self::type_name(),
                e,
                data.len()
            );
            EventError::Deserialization(e)
        })
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// Listener trait invoked by the dispatcher.
///
/// Abstracts over the type-specific handling logic so heterogeneous listeners
/// can share one tree. Most users never implement this directly; closures are
/// wrapped in [`TypedEventHandler`] by the registration methods.
#[async_trait]
pub trait EventHandler: Send + Sync + 'static + Debug {
    /// Handles an event from serialized payload data.
    async fn handle(&self, data: &[u8]) -> Result<(), EventError>;

    /// Returns the `TypeId` of the payload type this listener expects.
    fn expected_type_id(&self) -> TypeId;

    /// Returns a human-readable name for this listener for debugging.
    fn handler_name(&self) -> &str;
}

/// Type-safe wrapper bridging a typed closure to the [`EventHandler`] trait.
///
/// # Type Parameters
///
/// * `T` - The payload type this listener processes
/// * `F` - The closure handling the payload
pub struct TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> Result<(), EventError> + Send + Sync,
{
    handler: F,
    name: String,
    _phantom: std::marker::PhantomData<T>,
}

impl<T, F> Clone for TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> Result<(), EventError> + Send + Sync + Clone,
{
    fn clone(&self) -> Self {
        Self {
            handler: self.handler.clone(),
            name: self.name.clone(),
            _phantom: std::marker::PhantomData,
        }
    }
}

impl<T, F> Debug for TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> Result<(), EventError> + Send + Sync,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TypedEventHandler")
            .field("name", &self.name)
            .finish()
    }
}

impl<T, F> TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> Result<(), EventError> + Send + Sync,
{
    /// Creates a new typed listener wrapper.
    pub fn new(name: String, handler: F) -> Self {
        Self {
            handler,
            name,
            _phantom: std::marker::PhantomData,
        }
    }
}

#[async_trait]
impl<T, F> EventHandler for TypedEventHandler<T, F>
where
    T: Event,
    F: Fn(T) -> Result<(), EventError> + Send + Sync + Clone + 'static,
{
    async fn handle(&self, data: &[u8]) -> Result<(), EventError> {
        match T::deserialize(data) {
            Ok(event) => (self.handler)(event),
            Err(e) => {
                // Type mismatch between trigger payload and listener; skip
                // this listener rather than failing the dispatch pass.
                tracing::warn!(
                    "Listener '{}' (expects '{}') skipped: {}",
                    self.name,
                    std::any::type_name::<T>(),
                    e
                );
                Ok(())
            }
        }
    }

    fn expected_type_id(&self) -> TypeId {
        TypeId::of::<T>()
    }

    fn handler_name(&self) -> &str {
        &self.name
    }
}

// ============================================================================
// Delivery Mode
// ============================================================================

/// How a trigger delivers the payload to the snapshotted listeners.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Delivery {
    /// Await each listener in snapshot order before the trigger call returns.
    Inline,
    /// Spawn one fire-and-forget task per listener. Tasks are spawned in
    /// snapshot order but carry no completion-order guarantee, and a listener
    /// cancelled after its task was spawned still runs with the payload
    /// captured at schedule time.
    Deferred,
}

impl Default for Delivery {
    fn default() -> Self {
        Delivery::Inline
    }
}

// ============================================================================
// Error Types
// ============================================================================

/// Errors that can occur during dispatcher operations.
///
/// Triggering, cancelling, or querying a path with no corresponding tree node
/// is normal behavior (a silent no-op), not an error, and never surfaces here.
#[derive(Debug, thiserror::Error)]
pub enum EventError {
    /// Serialization failed when converting a payload to bytes
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    /// Deserialization failed when converting bytes to a payload
    #[error("Deserialization error: {0}")]
    Deserialization(serde_json::Error),
    /// Listener execution failed during dispatch
    #[error("Handler execution error: {0}")]
    HandlerExecution(String),
    #[error("An unexpected error occurred: {0}")]
    Other(String),
}
