//! Store details from the stores API.

use super::{PipelineContext, run_detached};
use crate::cleaner::{strip_non_digits, text_to_float64, try_text_to_int64};
use crate::error::Result;
use crate::types::Entity;
use crate::utils::{column_text_values, map_text_column, non_null_count, require_columns};
use polars::prelude::*;

/// Store type of online-only stores, which have no physical location.
pub const WEB_PORTAL: &str = "Web Portal";

/// Columns with fewer values than this are dropped as unused.
pub const MIN_NON_NULL_VALUES: usize = 5;

const COORDINATE_COLUMNS: [&str; 2] = ["latitude", "longitude"];

const REQUIRED_COLUMNS: [&str; 7] = [
    "store_type",
    "latitude",
    "longitude",
    "continent",
    "address",
    "opening_date",
    "staff_numbers",
];

pub(crate) fn run(df: DataFrame, ctx: &mut PipelineContext<'_>) -> Result<DataFrame> {
    require_columns(ctx.label(), &df, &REQUIRED_COLUMNS)?;

    let mut df = ctx.filter_rows(df)?;

    let cleared = clear_web_portal_coordinates(ctx.label(), &mut df)?;
    ctx.step(format!("Cleared coordinates of {} web portal stores", cleared));

    map_text_column(ctx.label(), &mut df, "continent", |continent| {
        strip_ee_typo(continent).to_string()
    })?;
    map_text_column(ctx.label(), &mut df, "address", |address| {
        address.replace('\n', ", ")
    })?;
    ctx.step("Fixed continent typos and flattened addresses");

    ctx.tidy_dates(&mut df, "opening_date")?;

    let sparse = sparse_columns(&df);
    let sparse: Vec<&str> = sparse.iter().map(String::as_str).collect();
    let mut df = ctx.drop_columns(df, &sparse);

    map_text_column(ctx.label(), &mut df, "staff_numbers", strip_non_digits)?;
    let staff = df.column("staff_numbers")?.as_materialized_series().clone();
    match try_text_to_int64(&staff)? {
        Some(converted) => {
            df.with_column(converted)?;
            ctx.step("Cast staff_numbers to Int64");
        }
        None => ctx.step("Kept staff_numbers as text, not every value is an integer"),
    }

    for column in COORDINATE_COLUMNS {
        let converted = text_to_float64(df.column(column)?.as_materialized_series())?;
        df.with_column(converted)?;
    }
    ctx.step("Cast latitude and longitude to Float64");

    Ok(df)
}

/// Null out latitude and longitude of web portal rows.
fn clear_web_portal_coordinates(entity: &str, df: &mut DataFrame) -> Result<usize> {
    let is_portal: Vec<bool> = column_text_values(entity, df, "store_type")?
        .iter()
        .map(|store_type| store_type.as_deref() == Some(WEB_PORTAL))
        .collect();

    for column in COORDINATE_COLUMNS {
        let values: Vec<Option<String>> = column_text_values(entity, df, column)?
            .into_iter()
            .zip(is_portal.iter())
            .map(|(value, portal)| if *portal { None } else { value })
            .collect();
        df.with_column(Series::new(column.into(), values))?;
    }

    Ok(is_portal.iter().filter(|&&portal| portal).count())
}

/// `eeEurope` -> `Europe`. A bare `ee` is left alone.
fn strip_ee_typo(continent: &str) -> &str {
    match continent.strip_prefix("ee") {
        Some(rest) if !rest.is_empty() => rest,
        _ => continent,
    }
}

fn sparse_columns(df: &DataFrame) -> Vec<String> {
    df.get_columns()
        .iter()
        .filter(|column| non_null_count(column) < MIN_NON_NULL_VALUES)
        .map(|column| column.name().to_string())
        .collect()
}

/// Clean a raw store details table with the default row filter.
pub fn clean_store_data(df: DataFrame) -> Result<DataFrame> {
    run_detached(Entity::Stores, df, run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cleaner::RowFilter;
    use crate::utils::has_column;

    fn raw_stores() -> DataFrame {
        df! {
            "index" => &["0", "1", "2", "3", "4", "5", "6"],
            "address" => &[Some("N/A"), Some("Flat 72W\nSally isle\nEast Deantown"), Some("Heckerstraße 4/5\n50491 Säckingen"), Some("NULL"), Some("1 Main St\nUtica"), Some("12 Rue\nLondon"), Some("Unit 3\nLeeds")],
            "longitude" => &[Some("N/A"), Some("51.62907"), Some("13.4"), Some("NULL"), Some("-75.2"), Some("-0.1"), Some("-1.5")],
            "lat" => &[None::<&str>, None, None, None, None, Some("13.4"), None],
            "locality" => &[Some("N/A"), Some("High Wycombe"), Some("Landshut"), Some("NULL"), Some("Utica"), Some("London"), Some("Leeds")],
            "store_code" => &["WEB-1388012W", "HI-9B97EE4E", "LA-0772C7B9", "NULL", "UT-1234ABCD", "LO-5678EFGH", "LE-1A2B3C4D"],
            "staff_numbers" => &["325", "34", "3n9", "NULL", "J78", "12", "10"],
            "opening_date" => &["2010-06-12", "1996-10-25", "October 1997 04", "NULL", "2001/02/03", "2005 May 5", "2012-03-04"],
            "store_type" => &["Web Portal", "Local", "Super Store", "NULL", "Outlet", "Local", "Local"],
            "latitude" => &[Some("N/A"), Some("-0.74934"), Some("48.5"), Some("NULL"), Some("43.1"), Some("51.5"), Some("53.8")],
            "country_code" => &["GB", "GB", "DE", "NULL", "US", "GB", "GB"],
            "continent" => &["Europe", "Europe", "eeEurope", "NULL", "America", "ee", "Europe"],
        }
        .unwrap()
    }

    #[test]
    fn test_store_pipeline() {
        let df = clean_store_data(raw_stores()).unwrap();
        assert_eq!(df.height(), 6);

        // web portal coordinates are cleared before the strict float cast
        let latitude = df.column("latitude").unwrap();
        assert_eq!(latitude.dtype(), &DataType::Float64);
        assert!(matches!(latitude.get(0).unwrap(), AnyValue::Null));
        assert_eq!(df.column("longitude").unwrap().null_count(), 1);

        assert_eq!(
            column_text_values("stores", &df, "continent").unwrap(),
            vec![
                Some("Europe".to_string()),
                Some("Europe".to_string()),
                Some("Europe".to_string()),
                Some("America".to_string()),
                Some("ee".to_string()),
                Some("Europe".to_string()),
            ]
        );
        assert_eq!(
            column_text_values("stores", &df, "address").unwrap()[1],
            Some("Flat 72W, Sally isle, East Deantown".to_string())
        );

        assert_eq!(df.column("opening_date").unwrap().dtype(), &DataType::Date);
        assert_eq!(df.column("staff_numbers").unwrap().dtype(), &DataType::Int64);
        assert_eq!(
            df.column("staff_numbers")
                .unwrap()
                .get(2)
                .unwrap()
                .try_extract::<i64>()
                .unwrap(),
            39
        );

        assert!(!has_column(&df, "lat"));
    }

    #[test]
    fn test_strip_ee_typo() {
        assert_eq!(strip_ee_typo("eeEurope"), "Europe");
        assert_eq!(strip_ee_typo("eeAmerica"), "America");
        assert_eq!(strip_ee_typo("Europe"), "Europe");
        assert_eq!(strip_ee_typo("ee"), "ee");
    }

    #[test]
    fn test_web_portal_coordinates_cleared() {
        let mut df = df! {
            "store_type" => &["Web Portal", "Local"],
            "latitude" => &["51.5", "52.1"],
            "longitude" => &["-0.1", "1.3"],
        }
        .unwrap();

        assert_eq!(clear_web_portal_coordinates("stores", &mut df).unwrap(), 1);
        assert_eq!(
            column_text_values("stores", &df, "latitude").unwrap(),
            vec![None, Some("52.1".to_string())]
        );
    }

    #[test]
    fn test_custom_filter_pattern() {
        let filter = RowFilter::new("^WEB").unwrap().with_columns(vec!["store_code".to_string()]);
        let df = raw_stores();
        let mut ctx = PipelineContext::new(Entity::Stores, &filter, None, &df);
        let df = run(df, &mut ctx).unwrap();

        assert_eq!(df.height(), 5);
        assert_eq!(ctx.into_report(&df).rows_removed["placeholder"], 1);
    }
}
