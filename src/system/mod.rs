/// Facade module - broken down into manageable components
mod cache;
mod core;
mod emitters;
mod handlers;
mod management;
mod stats;
mod tests;

// Re-export all public items from submodules
pub use core::EventSpace;
pub use stats::EventSpaceStats;
