use polars::prelude::*;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

// ============================================================================
// Entities
// ============================================================================

/// The record families the cleaning pipelines know how to repair.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Entity {
    Users,
    Cards,
    Stores,
    Products,
    Orders,
    DateTimes,
}

impl Entity {
    pub const ALL: [Entity; 6] = [
        Entity::Users,
        Entity::Cards,
        Entity::Stores,
        Entity::Products,
        Entity::Orders,
        Entity::DateTimes,
    ];

    /// Name of the destination table the cleaned data is loaded into.
    pub fn target_table(&self) -> &'static str {
        match self {
            Self::Users => "dim_users",
            Self::Cards => "dim_card_details",
            Self::Stores => "dim_store_details",
            Self::Products => "dim_products",
            Self::Orders => "orders_table",
            Self::DateTimes => "dim_date_times",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Users => "users",
            Self::Cards => "cards",
            Self::Stores => "stores",
            Self::Products => "products",
            Self::Orders => "orders",
            Self::DateTimes => "date-times",
        }
    }
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unknown entity '{0}', expected one of: users, cards, stores, products, orders, date-times")]
pub struct ParseEntityError(pub String);

impl FromStr for Entity {
    type Err = ParseEntityError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "users" | "user" => Ok(Self::Users),
            "cards" | "card" => Ok(Self::Cards),
            "stores" | "store" => Ok(Self::Stores),
            "products" | "product" => Ok(Self::Products),
            "orders" | "order" => Ok(Self::Orders),
            "date-times" | "datetimes" | "date-time" => Ok(Self::DateTimes),
            _ => Err(ParseEntityError(s.to_string())),
        }
    }
}

// ============================================================================
// Cleaning Report
// ============================================================================

/// What a pipeline run did to one table.
///
/// ```rust,ignore
/// let outcome = EntityCleaner::new().clean(Entity::Users, df)?;
/// println!(
///     "{}: {} -> {} rows in {}ms",
///     outcome.table, outcome.report.rows_before, outcome.report.rows_after,
///     outcome.report.duration_ms
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CleaningReport {
    pub entity: Entity,
    pub target_table: String,

    pub rows_before: usize,
    pub rows_after: usize,
    pub columns_before: usize,
    pub columns_after: usize,

    /// Rows removed, keyed by the rule that removed them.
    pub rows_removed: BTreeMap<String, usize>,

    /// Columns dropped, in the order they were removed.
    pub dropped_columns: Vec<String>,

    /// Cells per date column that could not be parsed and became unknown.
    pub unknown_dates: BTreeMap<String, usize>,

    /// Total execution time in milliseconds.
    pub duration_ms: u64,

    /// Human-readable log of the steps taken.
    pub steps: Vec<String>,
}

impl CleaningReport {
    pub fn new(entity: Entity, input: &DataFrame) -> Self {
        Self {
            entity,
            target_table: entity.target_table().to_string(),
            rows_before: input.height(),
            rows_after: input.height(),
            columns_before: input.width(),
            columns_after: input.width(),
            rows_removed: BTreeMap::new(),
            dropped_columns: Vec::new(),
            unknown_dates: BTreeMap::new(),
            duration_ms: 0,
            steps: Vec::new(),
        }
    }

    pub fn total_rows_removed(&self) -> usize {
        self.rows_removed.values().sum()
    }

    pub fn total_unknown_dates(&self) -> usize {
        self.unknown_dates.values().sum()
    }

    pub(crate) fn add_step(&mut self, step: impl Into<String>) {
        self.steps.push(step.into());
    }

    pub(crate) fn record_rows_removed(&mut self, rule: &str, count: usize) {
        *self.rows_removed.entry(rule.to_string()).or_insert(0) += count;
    }

    pub(crate) fn record_unknown_dates(&mut self, column: &str, count: usize) {
        self.unknown_dates.insert(column.to_string(), count);
    }

    pub(crate) fn finish(&mut self, output: &DataFrame) {
        self.rows_after = output.height();
        self.columns_after = output.width();
    }
}

/// A cleaned table ready for the load step.
#[derive(Debug, Clone)]
pub struct CleaningOutcome {
    pub entity: Entity,
    /// Destination table name, see [`Entity::target_table`].
    pub table: &'static str,
    pub data: DataFrame,
    pub report: CleaningReport,
}
