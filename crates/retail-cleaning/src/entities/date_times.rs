//! Sale date-time dimension from the JSON events feed.

use super::{PipelineContext, run_detached};
use crate::cleaner::text_to_int64;
use crate::error::{CleaningError, Result, ResultExt};
use crate::types::Entity;
use crate::utils::{column_text_values, require_columns};
use chrono::NaiveDateTime;
use polars::prelude::*;

/// Name of the synthesized timestamp column.
pub const DATETIME_COLUMN: &str = "datetime";

/// Format of the `year-month-day-timestamp` composite.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d-%H:%M:%S";

const INTEGER_COLUMNS: [&str; 3] = ["month", "day", "year"];

pub(crate) fn run(df: DataFrame, ctx: &mut PipelineContext<'_>) -> Result<DataFrame> {
    require_columns(ctx.label(), &df, &["timestamp", "month", "year", "day"])?;

    let mut df = ctx.filter_rows(df)?;

    for column in INTEGER_COLUMNS {
        let converted = text_to_int64(df.column(column)?.as_materialized_series())?;
        df.with_column(converted)?;
    }
    ctx.step("Cast month, day and year to Int64");

    let datetimes = build_datetimes(ctx.label(), &df)?;
    df.with_column(datetimes)?;
    ctx.step(format!("Added '{}' column", DATETIME_COLUMN));

    Ok(df)
}

/// Combine the integer date parts and the `timestamp` text into one
/// millisecond Datetime column. Any row that does not fit the format fails
/// the table.
fn build_datetimes(entity: &str, df: &DataFrame) -> Result<Series> {
    let years = df.column("year")?.as_materialized_series().i64()?;
    let months = df.column("month")?.as_materialized_series().i64()?;
    let days = df.column("day")?.as_materialized_series().i64()?;
    let times = column_text_values(entity, df, "timestamp")?;

    let mut millis: Vec<Option<i64>> = Vec::with_capacity(df.height());
    for (row, (((year, month), day), time)) in years
        .into_iter()
        .zip(months)
        .zip(days)
        .zip(times.iter())
        .enumerate()
    {
        let (Some(year), Some(month), Some(day), Some(time)) = (year, month, day, time) else {
            return Err(CleaningError::TimestampParse {
                row,
                value: format!("{:?}-{:?}-{:?}-{:?}", year, month, day, time),
            });
        };

        let composite = format!("{year:04}-{month:02}-{day:02}-{}", time.trim());
        let parsed = NaiveDateTime::parse_from_str(&composite, DATETIME_FORMAT).map_err(|_| {
            CleaningError::TimestampParse {
                row,
                value: composite.clone(),
            }
        })?;
        millis.push(Some(parsed.and_utc().timestamp_millis()));
    }

    Series::new(DATETIME_COLUMN.into(), millis)
        .cast(&DataType::Datetime(TimeUnit::Milliseconds, None))
        .context(format!("{entity}: building '{DATETIME_COLUMN}'"))
}

/// Clean a raw date-times table with the default row filter.
pub fn clean_date_times_data(df: DataFrame) -> Result<DataFrame> {
    run_detached(Entity::DateTimes, df, run)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn raw_date_times() -> DataFrame {
        df! {
            "index" => &["0", "1", "2", "3"],
            "timestamp" => &["22:00:06", "DXBU6GX1VC", "NULL", "7:05:30"],
            "month" => &["9", "OPSSA3W8GS", "NULL", "12"],
            "year" => &["2012", "ZY7Q0G6W6Q", "NULL", "1999"],
            "day" => &["19", "OB1QMIVK16", "NULL", "3"],
            "time_period" => &["Evening", "NULL", "NULL", "Morning"],
            "date_uuid" => &["3b7ca996", "x", "NULL", "adc86836"],
        }
        .unwrap()
    }

    #[test]
    fn test_date_times_pipeline() {
        let df = clean_date_times_data(raw_date_times()).unwrap();

        assert_eq!(df.height(), 2);
        for column in INTEGER_COLUMNS {
            assert_eq!(df.column(column).unwrap().dtype(), &DataType::Int64);
        }

        let datetime = df.column(DATETIME_COLUMN).unwrap();
        assert_eq!(
            datetime.dtype(),
            &DataType::Datetime(TimeUnit::Milliseconds, None)
        );

        let expected = NaiveDate::from_ymd_opt(2012, 9, 19)
            .unwrap()
            .and_hms_opt(22, 0, 6)
            .unwrap()
            .and_utc()
            .timestamp_millis();
        let physical = datetime
            .as_materialized_series()
            .to_physical_repr()
            .into_owned();
        assert_eq!(
            physical.get(0).unwrap().try_extract::<i64>().unwrap(),
            expected
        );
    }

    #[test]
    fn test_malformed_timestamp_is_fatal() {
        let df = df! {
            "timestamp" => &["22:00:06", "late evening"],
            "month" => &["9", "10"],
            "year" => &["2012", "2013"],
            "day" => &["19", "20"],
        }
        .unwrap();

        match clean_date_times_data(df).unwrap_err() {
            CleaningError::TimestampParse { row, value } => {
                assert_eq!(row, 1);
                assert_eq!(value, "2013-10-20-late evening");
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_timestamp_is_fatal() {
        let df = df! {
            "timestamp" => &[None::<&str>],
            "month" => &[Some("9")],
            "year" => &[Some("2012")],
            "day" => &[Some("19")],
        }
        .unwrap();

        assert!(matches!(
            clean_date_times_data(df).unwrap_err(),
            CleaningError::TimestampParse { row: 0, .. }
        ));
    }
}
