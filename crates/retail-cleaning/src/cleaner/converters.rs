//! Strict text to numeric conversions for canonical columns.

use crate::error::{CleaningError, Result};
use crate::utils::{is_numeric_dtype, series_text_values};
use polars::prelude::*;
use std::str::FromStr;

/// Parse every non-null cell of a text series as `T`.
///
/// Blank cells become null. The first cell that does not parse fails the
/// whole column with a [`CleaningError::TypeConversionFailed`].
fn parse_strict<T: FromStr>(series: &Series, target_type: &'static str) -> Result<Vec<Option<T>>> {
    let values = series_text_values(series)?;
    let mut parsed: Vec<Option<T>> = Vec::with_capacity(values.len());

    for value in values {
        match value.as_deref().map(str::trim) {
            Some("") | None => parsed.push(None),
            Some(text) => {
                let number = text.parse::<T>().map_err(|_| CleaningError::TypeConversionFailed {
                    column: series.name().to_string(),
                    target_type,
                    value: text.to_string(),
                })?;
                parsed.push(Some(number));
            }
        }
    }

    Ok(parsed)
}

/// Convert a text series to Int64, failing on any non-integer cell.
pub(crate) fn text_to_int64(series: &Series) -> Result<Series> {
    if is_numeric_dtype(series.dtype()) && !series.dtype().is_float() {
        return Ok(series.cast(&DataType::Int64)?);
    }
    let values: Vec<Option<i64>> = parse_strict(series, "Int64")?;
    Ok(Series::new(series.name().clone(), values))
}

/// Convert a text series to Float64, failing on any non-numeric cell.
pub(crate) fn text_to_float64(series: &Series) -> Result<Series> {
    if is_numeric_dtype(series.dtype()) {
        return Ok(series.cast(&DataType::Float64)?);
    }
    let values: Vec<Option<f64>> = parse_strict(series, "Float64")?;
    Ok(Series::new(series.name().clone(), values))
}

/// Convert to Int64 only if every non-null cell is an integer.
///
/// Returns `None` when any cell fails, leaving the caller's column as it was.
pub(crate) fn try_text_to_int64(series: &Series) -> Result<Option<Series>> {
    match text_to_int64(series) {
        Ok(converted) => Ok(Some(converted)),
        Err(CleaningError::TypeConversionFailed { .. }) => Ok(None),
        Err(other) => Err(other),
    }
}

/// Remove every character that is not an ASCII digit.
pub(crate) fn strip_non_digits(value: &str) -> String {
    value.chars().filter(char::is_ascii_digit).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_null_at(series: &Series, idx: usize) -> bool {
        matches!(series.get(idx).unwrap(), AnyValue::Null)
    }

    #[test]
    fn test_text_to_int64_basic() {
        let series = Series::new("card_number".into(), &["4000123456789010", " 42 ", "7"]);
        let result = text_to_int64(&series).unwrap();

        assert_eq!(result.dtype(), &DataType::Int64);
        assert_eq!(
            result.get(0).unwrap().try_extract::<i64>().unwrap(),
            4_000_123_456_789_010
        );
        assert_eq!(result.get(1).unwrap().try_extract::<i64>().unwrap(), 42);
    }

    #[test]
    fn test_text_to_int64_keeps_nulls_and_blanks() {
        let series = Series::new("n".into(), &[Some("1"), None, Some("  ")]);
        let result = text_to_int64(&series).unwrap();

        assert_eq!(result.get(0).unwrap().try_extract::<i64>().unwrap(), 1);
        assert!(is_null_at(&result, 1));
        assert!(is_null_at(&result, 2));
    }

    #[test]
    fn test_text_to_int64_rejects_non_integer() {
        let series = Series::new("month".into(), &["5", "May"]);
        let err = text_to_int64(&series).unwrap_err();

        match err {
            CleaningError::TypeConversionFailed {
                column,
                target_type,
                value,
            } => {
                assert_eq!(column, "month");
                assert_eq!(target_type, "Int64");
                assert_eq!(value, "May");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_text_to_int64_passes_integers_through() {
        let series = Series::new("n".into(), &[1i32, 2, 3]);
        let result = text_to_int64(&series).unwrap();
        assert_eq!(result.dtype(), &DataType::Int64);
    }

    #[test]
    fn test_text_to_float64() {
        let series = Series::new("latitude".into(), &[Some("51.5"), None, Some("-0.12")]);
        let result = text_to_float64(&series).unwrap();

        assert_eq!(result.dtype(), &DataType::Float64);
        assert_eq!(result.get(0).unwrap().try_extract::<f64>().unwrap(), 51.5);
        assert!(is_null_at(&result, 1));
        assert_eq!(result.get(2).unwrap().try_extract::<f64>().unwrap(), -0.12);
    }

    #[test]
    fn test_text_to_float64_rejects_text() {
        let series = Series::new("longitude".into(), &["N/A"]);
        assert!(matches!(
            text_to_float64(&series).unwrap_err(),
            CleaningError::TypeConversionFailed { .. }
        ));
    }

    #[test]
    fn test_try_text_to_int64_is_all_or_nothing() {
        let good = Series::new("staff_numbers".into(), &["34", "12"]);
        assert!(try_text_to_int64(&good).unwrap().is_some());

        let mixed = Series::new("staff_numbers".into(), &["34", "twelve"]);
        assert!(try_text_to_int64(&mixed).unwrap().is_none());
    }

    #[test]
    fn test_strip_non_digits() {
        assert_eq!(strip_non_digits("3n9"), "39");
        assert_eq!(strip_non_digits("J78"), "78");
        assert_eq!(strip_non_digits("abc"), "");
    }
}
