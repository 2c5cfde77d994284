//! Pipeline module.
//!
//! This module provides the entity cleaner and its observer hook.

mod builder;
pub mod events;

pub use builder::{EntityCleaner, EntityCleanerBuilder};
pub use events::{CleaningEvent, CleaningObserver, ClosureObserver};
