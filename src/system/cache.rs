/// Serialization buffer handling for the dispatch pipeline.
/// A trigger serializes its payload exactly once; every invoked listener
/// shares the same buffer through an `Arc`.
use std::sync::Arc;

/// Pre-allocated buffer pool for serialization to reduce allocations.
pub struct SerializationBufferPool {
    /// Kept simple for now; future versions could reuse buffers across
    /// triggers.
    _placeholder: (),
}

impl SerializationBufferPool {
    pub fn new() -> Self {
        Self { _placeholder: () }
    }

    /// Serializes a payload into a shared buffer with error context.
    #[inline]
    pub fn serialize_event<T>(&self, event: &T) -> Result<Arc<Vec<u8>>, crate::events::EventError>
    where
        T: crate::events::Event,
    {
        match event.serialize() {
            Ok(data) => {
                if cfg!(debug_assertions) {
                    tracing::trace!(
                        "Serialized payload of type '{}' ({} bytes)",
                        T::type_name(),
                        data.len()
                    );
                }
                Ok(Arc::new(data))
            }
            Err(e) => {
                tracing::error!(
                    "Failed to serialize payload of type '{}' in trigger pipeline: {}",
                    T::type_name(),
                    e
                );
                Err(e)
            }
        }
    }
}

impl Default for SerializationBufferPool {
    fn default() -> Self {
        Self::new()
    }
}
