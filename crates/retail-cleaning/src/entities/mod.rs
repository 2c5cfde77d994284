//! Per-entity cleaning pipelines.
//!
//! Each pipeline is a fixed sequence of steps over one raw table. Steps
//! share a [`PipelineContext`] that applies the row filter, records what was
//! removed, and forwards events to the caller's observer.

mod cards;
mod date_times;
mod orders;
mod products;
mod stores;
mod users;

pub use cards::{COMPOUND_CARD_COLUMN, REQUIRED_CARD_COLUMNS, clean_card_data};
pub use date_times::{DATETIME_COLUMN, DATETIME_FORMAT, clean_date_times_data};
pub use orders::{STRAY_ORDER_COLUMNS, clean_orders_data};
pub use products::{PRODUCTS_INDEX_ARTIFACT, clean_products_data, convert_product_weights};
pub use stores::{MIN_NON_NULL_VALUES, WEB_PORTAL, clean_store_data};
pub use users::clean_user_data;

use crate::cleaner::{RowFilter, tidy_date_column};
use crate::config::CleaningConfig;
use crate::error::Result;
use crate::pipeline::{CleaningEvent, CleaningObserver};
use crate::types::{CleaningReport, Entity};
use crate::utils::has_column;
use polars::prelude::*;
use tracing::debug;

/// Report key for rows removed by the placeholder pattern.
pub const RULE_PLACEHOLDER: &str = "placeholder";
/// Report key for rows removed by the `NULL` marker rule.
pub const RULE_NULL_MARKER: &str = "null_marker";
/// Report key for rows with no values at all.
pub const RULE_EMPTY_ROW: &str = "empty_row";

/// Shared state of one pipeline run.
pub(crate) struct PipelineContext<'a> {
    entity: Entity,
    filter: &'a RowFilter,
    observer: Option<&'a dyn CleaningObserver>,
    report: CleaningReport,
}

impl<'a> PipelineContext<'a> {
    pub(crate) fn new(
        entity: Entity,
        filter: &'a RowFilter,
        observer: Option<&'a dyn CleaningObserver>,
        input: &DataFrame,
    ) -> Self {
        Self {
            entity,
            filter,
            observer,
            report: CleaningReport::new(entity, input),
        }
    }

    /// Entity name used in schema error messages.
    pub(crate) fn label(&self) -> &'static str {
        self.entity.as_str()
    }

    pub(crate) fn emit(&self, event: CleaningEvent) {
        if let Some(observer) = self.observer {
            observer.observe(event);
        }
    }

    pub(crate) fn step(&mut self, message: impl Into<String>) {
        let message = message.into();
        debug!("[{}] {}", self.entity, message);
        self.report.add_step(message);
    }

    pub(crate) fn rows_removed(&mut self, rule: &str, count: usize) {
        self.report.record_rows_removed(rule, count);
        if count > 0 {
            self.emit(CleaningEvent::RowsDropped {
                rule: rule.to_string(),
                count,
            });
        }
    }

    /// Run both row rules of the configured filter.
    pub(crate) fn filter_rows(&mut self, df: DataFrame) -> Result<DataFrame> {
        let (df, stats) = self.filter.apply(df)?;
        self.rows_removed(RULE_PLACEHOLDER, stats.placeholder_rows);
        self.rows_removed(RULE_NULL_MARKER, stats.null_rows);
        self.step(format!(
            "Removed {} placeholder rows and {} NULL rows",
            stats.placeholder_rows, stats.null_rows
        ));
        Ok(df)
    }

    /// Drop the named columns that exist and record them.
    pub(crate) fn drop_columns(&mut self, df: DataFrame, columns: &[&str]) -> DataFrame {
        let present: Vec<String> = columns
            .iter()
            .filter(|column| has_column(&df, column))
            .map(|column| column.to_string())
            .collect();

        if present.is_empty() {
            return df;
        }

        let names: Vec<PlSmallStr> = present.iter().map(|c| c.as_str().into()).collect();
        let df = df.drop_many(names);
        self.step(format!("Dropped columns {:?}", present));
        self.report.dropped_columns.extend(present.iter().cloned());
        self.emit(CleaningEvent::ColumnsDropped { columns: present });
        df
    }

    /// Normalize a date column and record its unknown cells.
    pub(crate) fn tidy_dates(&mut self, df: &mut DataFrame, column: &str) -> Result<()> {
        let unknown = tidy_date_column(self.label(), df, column)?;
        self.report.record_unknown_dates(column, unknown);
        if unknown > 0 {
            self.emit(CleaningEvent::UnknownDates {
                column: column.to_string(),
                count: unknown,
            });
        }
        self.step(format!("Normalized '{}' ({} unknown)", column, unknown));
        Ok(())
    }

    pub(crate) fn into_report(mut self, output: &DataFrame) -> CleaningReport {
        self.report.finish(output);
        self.report
    }
}

/// Run the pipeline for `entity` with the given context.
pub(crate) fn run_pipeline(
    df: DataFrame,
    ctx: &mut PipelineContext<'_>,
    config: &CleaningConfig,
) -> Result<DataFrame> {
    match ctx.entity {
        Entity::Users => users::run(df, ctx),
        Entity::Cards => cards::run(df, ctx),
        Entity::Stores => stores::run(df, ctx),
        Entity::Products => {
            let df = products::run(df, ctx)?;
            if config.convert_weights {
                products::run_weights(df, ctx, &config.weight_column)
            } else {
                Ok(df)
            }
        }
        Entity::Orders => orders::run(df, ctx),
        Entity::DateTimes => date_times::run(df, ctx),
    }
}

/// Run one pipeline step function with default settings and no observer.
fn run_detached(
    entity: Entity,
    df: DataFrame,
    pipeline: fn(DataFrame, &mut PipelineContext<'_>) -> Result<DataFrame>,
) -> Result<DataFrame> {
    let filter = RowFilter::default();
    let mut ctx = PipelineContext::new(entity, &filter, None, &df);
    pipeline(df, &mut ctx)
}
