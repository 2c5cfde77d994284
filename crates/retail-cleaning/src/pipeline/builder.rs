//! Entry point for cleaning one extracted table.
//!
//! [`EntityCleaner`] owns the configuration and the compiled row filter,
//! dispatches to the pipeline of the requested entity, and wraps the result
//! with its report and destination table name.

use crate::cleaner::RowFilter;
use crate::config::{CleaningConfig, ConfigValidationError};
use crate::entities::{PipelineContext, run_pipeline};
use crate::error::{CleaningError, Result};
use crate::pipeline::events::{CleaningEvent, CleaningObserver, ClosureObserver};
use crate::types::{CleaningOutcome, Entity};
use polars::prelude::*;
use std::sync::Arc;
use std::time::Instant;
use tracing::{error, info};

/// Cleans raw tables into their canonical form.
///
/// # Example
///
/// ```rust,ignore
/// use retail_cleaning::{CleaningConfig, Entity, EntityCleaner};
///
/// let cleaner = EntityCleaner::builder()
///     .config(CleaningConfig::builder().convert_weights(true).build()?)
///     .on_event(|event| println!("{event:?}"))
///     .build()?;
///
/// let outcome = cleaner.clean(Entity::Products, raw_products)?;
/// println!("{} rows ready for {}", outcome.data.height(), outcome.table);
/// ```
pub struct EntityCleaner {
    config: CleaningConfig,
    filter: RowFilter,
    observer: Option<Arc<dyn CleaningObserver>>,
}

// Ensure EntityCleaner can be moved to a worker thread
static_assertions::assert_impl_all!(EntityCleaner: Send, Sync);

impl Default for EntityCleaner {
    fn default() -> Self {
        Self::new()
    }
}

impl EntityCleaner {
    /// A cleaner with the default configuration and no observer.
    pub fn new() -> Self {
        Self {
            config: CleaningConfig::default(),
            filter: RowFilter::default(),
            observer: None,
        }
    }

    /// Create a new cleaner builder.
    pub fn builder() -> EntityCleanerBuilder {
        EntityCleanerBuilder::default()
    }

    pub fn config(&self) -> &CleaningConfig {
        &self.config
    }

    /// Clean `df` as a table of `entity`.
    ///
    /// # Errors
    ///
    /// Schema errors (missing columns, tables too narrow for the row filter)
    /// and cell errors with no fallback abort the whole table.
    pub fn clean(&self, entity: Entity, df: DataFrame) -> Result<CleaningOutcome> {
        self.clean_with_filter(entity, df, &self.filter)
    }

    /// Clean `df` with a different bad-row pattern for this call only.
    pub fn clean_with(
        &self,
        entity: Entity,
        df: DataFrame,
        bad_row_pattern: &str,
    ) -> Result<CleaningOutcome> {
        let filter = build_filter(bad_row_pattern, self.config.filter_columns.clone())?;
        self.clean_with_filter(entity, df, &filter)
    }

    fn notify(&self, event: CleaningEvent) {
        if let Some(observer) = &self.observer {
            observer.observe(event);
        }
    }

    fn clean_with_filter(
        &self,
        entity: Entity,
        df: DataFrame,
        filter: &RowFilter,
    ) -> Result<CleaningOutcome> {
        let start_time = Instant::now();
        info!(
            "Cleaning {} table: {} rows x {} columns",
            entity,
            df.height(),
            df.width()
        );
        self.notify(CleaningEvent::Started {
            entity,
            rows: df.height(),
            columns: df.width(),
        });

        let mut ctx = PipelineContext::new(entity, filter, self.observer.as_deref(), &df);
        let data = match run_pipeline(df, &mut ctx, &self.config) {
            Ok(data) => data,
            Err(e) => {
                error!("Cleaning {} failed: {}", entity, e);
                self.notify(CleaningEvent::Failed {
                    entity,
                    message: e.to_string(),
                });
                return Err(e);
            }
        };

        let mut report = ctx.into_report(&data);
        report.duration_ms = start_time.elapsed().as_millis() as u64;

        info!(
            "Cleaned {} table: {} -> {} rows, {} unknown dates, {}ms",
            entity,
            report.rows_before,
            report.rows_after,
            report.total_unknown_dates(),
            report.duration_ms
        );
        self.notify(CleaningEvent::Completed {
            entity,
            rows: data.height(),
            columns: data.width(),
        });

        Ok(CleaningOutcome {
            entity,
            table: entity.target_table(),
            data,
            report,
        })
    }
}

fn build_filter(pattern: &str, columns: Option<Vec<String>>) -> Result<RowFilter> {
    let filter = RowFilter::new(pattern)?;
    Ok(match columns {
        Some(columns) => filter.with_columns(columns),
        None => filter,
    })
}

/// Builder for [`EntityCleaner`].
#[derive(Default)]
pub struct EntityCleanerBuilder {
    config: Option<CleaningConfig>,
    observer: Option<Arc<dyn CleaningObserver>>,
}

impl EntityCleanerBuilder {
    /// Set the cleaning configuration.
    pub fn config(mut self, config: CleaningConfig) -> Self {
        self.config = Some(config);
        self
    }

    /// Set an observer for receiving events during cleaning.
    pub fn observer(mut self, observer: Arc<dyn CleaningObserver>) -> Self {
        self.observer = Some(observer);
        self
    }

    /// Set an event callback closure.
    ///
    /// This is a convenience method for simple event handling.
    /// For shared observers, use [`observer`](Self::observer).
    pub fn on_event<F>(mut self, callback: F) -> Self
    where
        F: Fn(CleaningEvent) + Send + Sync + 'static,
    {
        self.observer = Some(Arc::new(ClosureObserver::new(callback)));
        self
    }

    /// Build the cleaner.
    ///
    /// Returns an error if the configuration is invalid.
    pub fn build(self) -> std::result::Result<EntityCleaner, ConfigValidationError> {
        let config = self.config.unwrap_or_default();
        config.validate()?;

        let filter = build_filter(&config.bad_row_pattern, config.filter_columns.clone())
            .map_err(|e| match e {
                CleaningError::InvalidPattern { pattern, reason } => {
                    ConfigValidationError::InvalidPattern { pattern, reason }
                }
                other => ConfigValidationError::InvalidPattern {
                    pattern: config.bad_row_pattern.clone(),
                    reason: other.to_string(),
                },
            })?;

        Ok(EntityCleaner {
            config,
            filter,
            observer: self.observer,
        })
    }
}
