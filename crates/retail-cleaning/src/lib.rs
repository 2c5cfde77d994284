//! Retail Data Cleaning Library
//!
//! Normalization rules that turn messy extracted retail tables into typed,
//! schema-conformant tables ready to load, built on Polars.
//!
//! # Overview
//!
//! Each extracted table belongs to one [`Entity`] and goes through that
//! entity's fixed pipeline:
//!
//! - **Row Filter**: drops corrupted placeholder rows and `NULL` marker rows
//! - **Date Normalizer**: permissive date parsing, unparseable cells become unknown
//! - **Locale Normalizer**: `GGB` country code fix, then US/GB/DE phone formats
//! - **Unit Normalizer**: `3 x 200g`, `16oz`, `1.5kg` to Float64 kilograms
//! - **Entity Pipelines**: users, cards, stores, products, orders, date-times
//!
//! # Quick Start
//!
//! ```rust,ignore
//! use retail_cleaning::{Entity, EntityCleaner};
//! use polars::prelude::*;
//!
//! let raw = CsvReadOptions::default()
//!     .with_infer_schema_length(Some(0))
//!     .try_into_reader_with_file_path(Some("legacy_users.csv".into()))?
//!     .finish()?;
//!
//! let outcome = EntityCleaner::new().clean(Entity::Users, raw)?;
//! println!(
//!     "{} rows for {}, {} unknown dates",
//!     outcome.data.height(),
//!     outcome.table,
//!     outcome.report.total_unknown_dates()
//! );
//! ```
//!
//! # Configuration
//!
//! Only bad-row detection and weight conversion are configurable:
//!
//! ```rust,ignore
//! use retail_cleaning::{CleaningConfig, EntityCleaner};
//!
//! let config = CleaningConfig::builder()
//!     .bad_row_pattern("^[0-9A-Z]{10}$")
//!     .filter_columns(["first_name", "last_name", "date_of_birth", "company"])
//!     .convert_weights(true)
//!     .build()?;
//!
//! let cleaner = EntityCleaner::builder().config(config).build()?;
//! ```
//!
//! # Errors
//!
//! Schema problems abort the table with a [`CleaningError`] naming the
//! entity and column. Unparseable dates never do; they are counted in the
//! [`CleaningReport`] and reported through [`CleaningEvent::UnknownDates`].

pub mod cleaner;
pub mod config;
pub mod entities;
pub mod error;
pub mod pipeline;
pub mod types;
pub mod utils;

// Re-exports for convenient access
pub use cleaner::{
    DateValue, Locale, RowFilter, RowFilterStats, WeightUnit, normalize_dates, parse_date,
    parse_weight,
};
pub use config::{CleaningConfig, CleaningConfigBuilder, ConfigValidationError};
pub use entities::{
    clean_card_data, clean_date_times_data, clean_orders_data, clean_products_data,
    clean_store_data, clean_user_data, convert_product_weights,
};
pub use error::{CleaningError, Result as CleaningResult, ResultExt};
pub use pipeline::{
    CleaningEvent, CleaningObserver, ClosureObserver, EntityCleaner, EntityCleanerBuilder,
};
pub use types::{CleaningOutcome, CleaningReport, Entity, ParseEntityError};
pub use utils::require_columns;
