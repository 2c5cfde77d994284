//! Card details extracted from PDF tables.
//!
//! The PDF reader sometimes merges the card number and expiry date into one
//! `card_number expiry_date` column and emits spurious empty columns.

use super::{PipelineContext, run_detached};
use crate::cleaner::text_to_int64;
use crate::error::Result;
use crate::types::Entity;
use crate::utils::{column_text_values, has_column, map_text_column, require_columns};
use polars::prelude::*;

/// Columns a card table must carry before cleaning.
pub const REQUIRED_CARD_COLUMNS: [&str; 4] = [
    "card_number",
    "expiry_date",
    "card_provider",
    "date_payment_confirmed",
];

/// Merged column produced when the PDF reader misses a column boundary.
pub const COMPOUND_CARD_COLUMN: &str = "card_number expiry_date";

pub(crate) fn run(df: DataFrame, ctx: &mut PipelineContext<'_>) -> Result<DataFrame> {
    require_columns(ctx.label(), &df, &REQUIRED_CARD_COLUMNS)?;

    let mut df = df;
    if has_column(&df, COMPOUND_CARD_COLUMN) {
        let split = split_compound_column(ctx.label(), &mut df)?;
        ctx.step(format!("Split {} merged card number/expiry values", split));
        df = ctx.drop_columns(df, &[COMPOUND_CARD_COLUMN]);
    }

    let empty = all_null_columns(&df);
    let empty: Vec<&str> = empty.iter().map(String::as_str).collect();
    df = ctx.drop_columns(df, &empty);

    let mut df = ctx.filter_rows(df)?;
    ctx.tidy_dates(&mut df, "date_payment_confirmed")?;

    map_text_column(ctx.label(), &mut df, "card_number", |number| {
        number.trim_matches('?').to_string()
    })?;
    let numbers = text_to_int64(df.column("card_number")?.as_materialized_series())?;
    df.with_column(numbers)?;
    ctx.step("Cast card_number to Int64");

    Ok(df)
}

/// Copy merged values into `card_number` and `expiry_date`, split on the
/// first whitespace. Rows where the merged cell is null keep their values.
fn split_compound_column(entity: &str, df: &mut DataFrame) -> Result<usize> {
    let merged = column_text_values(entity, df, COMPOUND_CARD_COLUMN)?;
    let mut numbers = column_text_values(entity, df, "card_number")?;
    let mut expiries = column_text_values(entity, df, "expiry_date")?;

    let mut split = 0;
    for (row, value) in merged.iter().enumerate() {
        let Some(value) = value else { continue };
        let (number, expiry) = match value.split_once(char::is_whitespace) {
            Some((number, expiry)) => (number.to_string(), Some(expiry.to_string())),
            None => (value.clone(), None),
        };
        numbers[row] = Some(number);
        expiries[row] = expiry;
        split += 1;
    }

    df.with_column(Series::new("card_number".into(), numbers))?;
    df.with_column(Series::new("expiry_date".into(), expiries))?;
    Ok(split)
}

/// Columns with no values at all. An empty table has none.
fn all_null_columns(df: &DataFrame) -> Vec<String> {
    if df.height() == 0 {
        return Vec::new();
    }
    df.get_columns()
        .iter()
        .filter(|column| column.null_count() == column.len())
        .map(|column| column.name().to_string())
        .collect()
}

/// Clean a raw card details table with the default row filter.
pub fn clean_card_data(df: DataFrame) -> Result<DataFrame> {
    run_detached(Entity::Cards, df, run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CleaningError;
    use crate::utils::data_column_names;

    fn raw_cards() -> DataFrame {
        df! {
            "card_number" => &[Some("30060773296197"), None, Some("??4971858637664481"), Some("NULL")],
            "expiry_date" => &[Some("09/26"), None, Some("09/23"), Some("NULL")],
            "card_provider" => &[Some("Diners Club"), Some("VISA 16 digit"), Some("VISA 16 digit"), Some("NULL")],
            "date_payment_confirmed" => &[Some("2015-11-25"), Some("2001-06-18"), Some("2006 July 07"), Some("NULL")],
            "card_number expiry_date" => &[None, Some("4000123456789010 12/25"), None, None],
            "Unnamed: 5" => &[None::<&str>, None, None, None],
        }
        .unwrap()
    }

    #[test]
    fn test_card_pipeline() {
        let df = clean_card_data(raw_cards()).unwrap();

        assert_eq!(df.height(), 3);
        assert!(!has_column(&df, COMPOUND_CARD_COLUMN));
        assert!(!has_column(&df, "Unnamed: 5"));
        assert_eq!(df.column("card_number").unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            df.column("date_payment_confirmed").unwrap().dtype(),
            &DataType::Date
        );

        let numbers = df.column("card_number").unwrap().as_materialized_series().clone();
        assert_eq!(
            numbers.get(1).unwrap().try_extract::<i64>().unwrap(),
            4_000_123_456_789_010
        );
        assert_eq!(
            numbers.get(2).unwrap().try_extract::<i64>().unwrap(),
            4_971_858_637_664_481
        );
        assert_eq!(
            column_text_values("cards", &df, "expiry_date").unwrap()[1],
            Some("12/25".to_string())
        );
    }

    #[test]
    fn test_compound_split_on_first_whitespace() {
        let mut df = df! {
            "card_number" => &[None::<&str>],
            "expiry_date" => &[None::<&str>],
            "card_number expiry_date" => &["4000123456789010 12/25"],
        }
        .unwrap();

        assert_eq!(split_compound_column("cards", &mut df).unwrap(), 1);
        assert_eq!(
            column_text_values("cards", &df, "card_number").unwrap(),
            vec![Some("4000123456789010".to_string())]
        );
        assert_eq!(
            column_text_values("cards", &df, "expiry_date").unwrap(),
            vec![Some("12/25".to_string())]
        );
    }

    #[test]
    fn test_missing_card_provider_is_schema_error() {
        let df = df! {
            "card_number" => &["1"],
            "expiry_date" => &["12/25"],
            "date_payment_confirmed" => &["2020-01-01"],
        }
        .unwrap();

        let err = clean_card_data(df).unwrap_err();
        assert!(err.is_schema_error());
        match err {
            CleaningError::MissingColumn { column, .. } => assert_eq!(column, "card_provider"),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_all_null_columns_detected() {
        let df = raw_cards();
        assert_eq!(all_null_columns(&df), vec!["Unnamed: 5".to_string()]);

        let empty = df.head(Some(0));
        assert!(all_null_columns(&empty).is_empty());
        assert_eq!(data_column_names(&empty).len(), 6);
    }
}
