//! Shared utilities for the cleaning pipelines.
//!
//! Column lookup, schema checks, and text extraction helpers used by the
//! normalizers and the entity pipelines.

use crate::error::{CleaningError, Result};
use polars::prelude::*;

/// Name of the synthetic row-index column a loader writes alongside the data.
pub const INDEX_COLUMN: &str = "index";

// =============================================================================
// Data Type Utilities
// =============================================================================

/// Check if a DataType is numeric (integer or float).
#[inline]
pub fn is_numeric_dtype(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Check if a DataType already holds calendar values.
#[inline]
pub fn is_date_dtype(dtype: &DataType) -> bool {
    matches!(dtype, DataType::Date | DataType::Datetime(_, _))
}

// =============================================================================
// Column Utilities
// =============================================================================

/// Check whether the table carries a column with this exact name.
#[inline]
pub fn has_column(df: &DataFrame, name: &str) -> bool {
    df.get_column_index(name).is_some()
}

/// Column names in table order, without the synthetic index column.
pub fn data_column_names(df: &DataFrame) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != INDEX_COLUMN)
        .map(|name| name.to_string())
        .collect()
}

/// Fail with a schema error naming the first expected column that is absent.
pub fn require_columns(entity: &str, df: &DataFrame, columns: &[&str]) -> Result<()> {
    match columns.iter().find(|column| !has_column(df, column)) {
        Some(missing) => Err(CleaningError::missing_column(entity, *missing)),
        None => Ok(()),
    }
}

/// Drop every listed column that exists; absent names are ignored.
pub fn drop_if_present(df: DataFrame, columns: &[&str]) -> DataFrame {
    let present: Vec<PlSmallStr> = columns
        .iter()
        .filter(|column| has_column(&df, column))
        .map(|column| (*column).into())
        .collect();

    if present.is_empty() {
        df
    } else {
        df.drop_many(present)
    }
}

/// View a series as text, casting non-string dtypes.
pub fn as_text(series: &Series) -> PolarsResult<Series> {
    if series.dtype() == &DataType::String {
        Ok(series.clone())
    } else {
        series.cast(&DataType::String)
    }
}

/// Owned text values of a series, nulls preserved.
pub fn series_text_values(series: &Series) -> PolarsResult<Vec<Option<String>>> {
    let text = as_text(series)?;
    Ok(text
        .str()?
        .into_iter()
        .map(|value| value.map(str::to_string))
        .collect())
}

/// Owned text values of a named column, nulls preserved.
///
/// Fails with a schema error when the column is absent.
pub fn column_text_values(entity: &str, df: &DataFrame, name: &str) -> Result<Vec<Option<String>>> {
    let column = df
        .column(name)
        .map_err(|_| CleaningError::missing_column(entity, name))?;
    Ok(series_text_values(column.as_materialized_series())?)
}

/// Replace a column's values by mapping every non-null text cell.
pub fn map_text_column<F>(entity: &str, df: &mut DataFrame, name: &str, f: F) -> Result<()>
where
    F: Fn(&str) -> String,
{
    let values: Vec<Option<String>> = column_text_values(entity, df, name)?
        .into_iter()
        .map(|value| value.map(|v| f(&v)))
        .collect();
    df.with_column(Series::new(name.into(), values))?;
    Ok(())
}

/// Number of non-null cells in a column.
#[inline]
pub fn non_null_count(column: &Column) -> usize {
    column.len() - column.null_count()
}

// =============================================================================
// Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_is_numeric_dtype() {
        assert!(is_numeric_dtype(&DataType::Int64));
        assert!(is_numeric_dtype(&DataType::Float64));
        assert!(!is_numeric_dtype(&DataType::String));
        assert!(!is_numeric_dtype(&DataType::Boolean));
    }

    #[test]
    fn test_is_date_dtype() {
        assert!(is_date_dtype(&DataType::Date));
        assert!(is_date_dtype(&DataType::Datetime(
            TimeUnit::Milliseconds,
            None
        )));
        assert!(!is_date_dtype(&DataType::String));
    }

    #[test]
    fn test_data_column_names_skips_index() {
        let df = df! {
            "index" => &[0i64, 1],
            "first_name" => &["Ann", "Bob"],
            "last_name" => &["Lee", "Ray"],
        }
        .unwrap();

        assert_eq!(data_column_names(&df), vec!["first_name", "last_name"]);
    }

    #[test]
    fn test_require_columns_names_first_missing() {
        let df = df! { "card_number" => &["1"], "expiry_date" => &["12/25"] }.unwrap();
        let err = require_columns(
            "cards",
            &df,
            &["card_number", "expiry_date", "card_provider", "date_payment_confirmed"],
        )
        .unwrap_err();

        match err {
            CleaningError::MissingColumn { column, .. } => assert_eq!(column, "card_provider"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_drop_if_present_ignores_absent() {
        let df = df! { "a" => &["1"], "b" => &["2"] }.unwrap();
        let df = drop_if_present(df, &["b", "zzz"]);
        assert_eq!(data_column_names(&df), vec!["a"]);
    }

    #[test]
    fn test_series_text_values_casts_numbers() {
        let series = Series::new("n".into(), &[Some(1i64), None, Some(30)]);
        let values = series_text_values(&series).unwrap();
        assert_eq!(
            values,
            vec![Some("1".to_string()), None, Some("30".to_string())]
        );
    }

    #[test]
    fn test_map_text_column_keeps_nulls() {
        let mut df = df! { "address" => &[Some("1 High St\nLeeds"), None] }.unwrap();
        map_text_column("stores", &mut df, "address", |v| v.replace('\n', ", ")).unwrap();

        let values = column_text_values("stores", &df, "address").unwrap();
        assert_eq!(values, vec![Some("1 High St, Leeds".to_string()), None]);
    }
}
