//! Cleaning primitives shared by the entity pipelines.
//!
//! This module provides:
//! - Row filtering of corrupted placeholder and `NULL` rows
//! - Permissive date parsing with an explicit unknown marker
//! - Country code correction and per-locale phone normalization
//! - Weight and volume conversion to kilograms
//! - Strict numeric casts

mod converters;
pub mod dates;
pub mod locale;
pub mod row_filter;
pub mod units;

pub(crate) use converters::{strip_non_digits, text_to_float64, text_to_int64, try_text_to_int64};

pub use dates::{
    DateNormalization, DateParseError, DateValue, normalize_dates, parse_date, parse_date_value,
    tidy_date_column,
};
pub use locale::{Locale, correct_country_code, normalize_locale_fields, normalize_phone};
pub use row_filter::{RowFilter, RowFilterStats, remove_null_rows};
pub use units::{KG_PER_OUNCE, WeightParseError, WeightUnit, convert_weights, parse_weight};
