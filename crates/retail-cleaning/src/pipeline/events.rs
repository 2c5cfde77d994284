//! Observer hook for cleaning runs.
//!
//! Cell-level recoveries (unknown dates) are silent in the logs. Callers that
//! want to see them register an observer.
//!
//! # Example
//!
//! ```rust,ignore
//! use retail_cleaning::{CleaningEvent, Entity, EntityCleaner};
//!
//! let outcome = EntityCleaner::builder()
//!     .on_event(|event| {
//!         if let CleaningEvent::UnknownDates { column, count } = &event {
//!             eprintln!("{count} unparseable dates in {column}");
//!         }
//!     })
//!     .build()?
//!     .clean(Entity::Users, df)?;
//! ```

use crate::types::Entity;
use serde::{Deserialize, Serialize};

/// Something that happened while cleaning one table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum CleaningEvent {
    /// A pipeline received its input table.
    Started {
        entity: Entity,
        rows: usize,
        columns: usize,
    },
    /// A row rule removed rows.
    RowsDropped { rule: String, count: usize },
    /// Columns were removed from the table.
    ColumnsDropped { columns: Vec<String> },
    /// Date cells became the unknown marker.
    UnknownDates { column: String, count: usize },
    /// The pipeline produced its canonical table.
    Completed {
        entity: Entity,
        rows: usize,
        columns: usize,
    },
    /// The pipeline aborted.
    Failed { entity: Entity, message: String },
}

/// Receives [`CleaningEvent`]s from a running pipeline.
///
/// Implementations must be `Send + Sync` so one cleaner can be shared across
/// worker threads.
pub trait CleaningObserver: Send + Sync {
    fn observe(&self, event: CleaningEvent);
}

/// Wrapper that implements [`CleaningObserver`] using a closure.
pub struct ClosureObserver<F>
where
    F: Fn(CleaningEvent) + Send + Sync,
{
    callback: F,
}

impl<F> ClosureObserver<F>
where
    F: Fn(CleaningEvent) + Send + Sync,
{
    pub fn new(callback: F) -> Self {
        Self { callback }
    }
}

impl<F> CleaningObserver for ClosureObserver<F>
where
    F: Fn(CleaningEvent) + Send + Sync,
{
    fn observe(&self, event: CleaningEvent) {
        (self.callback)(event);
    }
}

static_assertions::assert_impl_all!(CleaningEvent: Send, Sync);
