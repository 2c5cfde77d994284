//! Best-effort parsing of heterogeneous date strings.
//!
//! Extracts mix ISO dates (`1968-10-16`), slashed dates (`2003/12/16`),
//! US month-first dates (`10/16/1968`) and free text with named months
//! (`January 1951 27`, `1971 October 23`, `27th Jan 1951`). Anything that has
//! no date structure, or names a day past the end of its month, becomes
//! [`DateValue::Unknown`] instead of failing the table.

use crate::error::{CleaningError, Result};
use crate::utils::{is_date_dtype, series_text_values};
use chrono::{Datelike, NaiveDate};
use polars::prelude::*;
use tracing::debug;

/// Days between 0001-01-01 (CE day 1) and 1970-01-01.
const UNIX_EPOCH_DAYS_FROM_CE: i32 = 719_163;

/// Two-digit years up to this value are read as 20xx, later ones as 19xx.
const TWO_DIGIT_YEAR_PIVOT: u32 = 68;

const MONTHS: [&str; 12] = [
    "january",
    "february",
    "march",
    "april",
    "may",
    "june",
    "july",
    "august",
    "september",
    "october",
    "november",
    "december",
];

const WEEKDAYS: [&str; 7] = [
    "monday",
    "tuesday",
    "wednesday",
    "thursday",
    "friday",
    "saturday",
    "sunday",
];

/// Outcome of parsing one date cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateValue {
    Known(NaiveDate),
    /// The text was present but is not a usable date.
    Unknown,
}

impl DateValue {
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }

    pub fn known(self) -> Option<NaiveDate> {
        match self {
            Self::Known(date) => Some(date),
            Self::Unknown => None,
        }
    }
}

/// Why a date string did not parse.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum DateParseError {
    #[error("unknown string format")]
    UnknownFormat,

    #[error("day is out of range for month: {year}-{month:02}-{day:02}")]
    DayOutOfRange { year: i32, month: u32, day: u32 },

    #[error("year {0} is out of range")]
    YearOutOfRange(u32),

    /// A number too large for the parser itself.
    #[error("value out of range: {0}")]
    OutOfRange(String),
}

impl DateParseError {
    /// Recoverable failures become the unknown marker; the rest abort.
    pub fn is_recoverable(&self) -> bool {
        matches!(
            self,
            Self::UnknownFormat | Self::DayOutOfRange { .. } | Self::YearOutOfRange(_)
        )
    }
}

#[derive(Debug, Clone, Copy)]
enum Token {
    Number { value: u32, digits: usize },
    Month(u32),
}

/// Parse a date string, month-first when the order is ambiguous.
pub fn parse_date(text: &str) -> std::result::Result<NaiveDate, DateParseError> {
    let text = strip_iso_time(text.trim());
    let tokens = tokenize(text)?;

    let months: Vec<u32> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Month(m) => Some(*m),
            Token::Number { .. } => None,
        })
        .collect();
    let numbers: Vec<(u32, usize)> = tokens
        .iter()
        .filter_map(|t| match t {
            Token::Number { value, digits } => Some((*value, *digits)),
            Token::Month(_) => None,
        })
        .collect();

    let (year, month, day) = match (months.as_slice(), numbers.as_slice()) {
        ([month], [a, b]) => {
            let (year, day) = if is_year_like(*a) && !is_year_like(*b) {
                (*a, b.0)
            } else if is_year_like(*b) && !is_year_like(*a) {
                (*b, a.0)
            } else if !is_year_like(*a) && !is_year_like(*b) {
                // "Jan 12 05": day then two-digit year
                (*b, a.0)
            } else {
                return Err(DateParseError::UnknownFormat);
            };
            (expand_year(year)?, *month, day)
        }
        ([], [(value, 8)]) => {
            // compact YYYYMMDD
            (
                expand_year((value / 10_000, 4))?,
                value / 100 % 100,
                value % 100,
            )
        }
        ([], [a, b, c]) => {
            if is_year_like(*a) {
                let (month, day) = if b.0 > 12 && c.0 <= 12 {
                    (c.0, b.0)
                } else {
                    (b.0, c.0)
                };
                (expand_year(*a)?, month, day)
            } else if is_year_like(*c) || c.1 <= 2 {
                let (month, day) = if a.0 > 12 && b.0 <= 12 {
                    (b.0, a.0)
                } else {
                    (a.0, b.0)
                };
                (expand_year(*c)?, month, day)
            } else {
                return Err(DateParseError::UnknownFormat);
            }
        }
        _ => return Err(DateParseError::UnknownFormat),
    };

    build_date(year, month, day)
}

/// Parse a date string into a [`DateValue`], folding recoverable failures
/// into [`DateValue::Unknown`].
pub fn parse_date_value(text: &str) -> std::result::Result<DateValue, DateParseError> {
    match parse_date(text) {
        Ok(date) => Ok(DateValue::Known(date)),
        Err(e) if e.is_recoverable() => Ok(DateValue::Unknown),
        Err(e) => Err(e),
    }
}

/// A typed date column plus the rows that held unparseable text.
#[derive(Debug, Clone)]
pub struct DateNormalization {
    pub series: Series,
    /// Positions whose text became the unknown marker. Rows that were
    /// already null are not listed.
    pub unknown_rows: Vec<usize>,
}

impl DateNormalization {
    pub fn unknown_count(&self) -> usize {
        self.unknown_rows.len()
    }
}

/// Convert a column of date-like cells to `DataType::Date`.
///
/// Already-typed date columns come back unchanged.
pub fn normalize_dates(series: &Series) -> Result<DateNormalization> {
    if is_date_dtype(series.dtype()) {
        return Ok(DateNormalization {
            series: series.clone(),
            unknown_rows: Vec::new(),
        });
    }

    let values = series_text_values(series)?;
    let mut days: Vec<Option<i32>> = Vec::with_capacity(values.len());
    let mut unknown_rows = Vec::new();

    for (row, value) in values.iter().enumerate() {
        let Some(text) = value else {
            days.push(None);
            continue;
        };

        match parse_date_value(text) {
            Ok(DateValue::Known(date)) => days.push(Some(days_since_epoch(date))),
            Ok(DateValue::Unknown) => {
                unknown_rows.push(row);
                days.push(None);
            }
            Err(e) => {
                return Err(CleaningError::DateParse {
                    column: series.name().to_string(),
                    value: text.clone(),
                    reason: e.to_string(),
                });
            }
        }
    }

    let series = Series::new(series.name().clone(), days).cast(&DataType::Date)?;
    Ok(DateNormalization {
        series,
        unknown_rows,
    })
}

/// Normalize a named date column in place, returning its unknown count.
pub fn tidy_date_column(entity: &str, df: &mut DataFrame, column: &str) -> Result<usize> {
    let source = df
        .column(column)
        .map_err(|_| CleaningError::missing_column(entity, column))?
        .as_materialized_series()
        .clone();

    let normalized = normalize_dates(&source)?;
    let unknown = normalized.unknown_count();
    df.with_column(normalized.series)?;

    debug!("Normalized '{}' to dates ({} unknown)", column, unknown);
    Ok(unknown)
}

/// Days since 1970-01-01, the physical value of a polars Date.
pub fn days_since_epoch(date: NaiveDate) -> i32 {
    date.num_days_from_ce() - UNIX_EPOCH_DAYS_FROM_CE
}

fn strip_iso_time(text: &str) -> &str {
    // 2019-04-09T11:20:00 -> 2019-04-09
    let bytes = text.as_bytes();
    match text.find('T') {
        Some(pos)
            if pos > 0
                && bytes[pos - 1].is_ascii_digit()
                && bytes.get(pos + 1).is_some_and(u8::is_ascii_digit) =>
        {
            &text[..pos]
        }
        _ => text,
    }
}

fn tokenize(text: &str) -> std::result::Result<Vec<Token>, DateParseError> {
    let mut tokens = Vec::new();

    for raw in text.split(|c: char| c.is_whitespace() || matches!(c, '-' | '/' | '.' | ',')) {
        if raw.is_empty() || raw.contains(':') {
            continue;
        }

        let word = strip_ordinal_suffix(raw);
        if word.bytes().all(|b| b.is_ascii_digit()) {
            let value = word
                .parse::<u32>()
                .map_err(|_| DateParseError::OutOfRange(word.to_string()))?;
            tokens.push(Token::Number {
                value,
                digits: word.len(),
            });
            continue;
        }

        let lower = word.to_ascii_lowercase();
        if let Some(month) = month_number(&lower) {
            tokens.push(Token::Month(month));
        } else if is_weekday(&lower) || lower == "am" || lower == "pm" {
            continue;
        } else {
            return Err(DateParseError::UnknownFormat);
        }
    }

    Ok(tokens)
}

fn strip_ordinal_suffix(word: &str) -> &str {
    for suffix in ["st", "nd", "rd", "th"] {
        if let Some(stem) = word.strip_suffix(suffix)
            && !stem.is_empty()
            && stem.bytes().all(|b| b.is_ascii_digit())
        {
            return stem;
        }
    }
    word
}

fn month_number(lower: &str) -> Option<u32> {
    if lower.len() < 3 {
        return None;
    }
    MONTHS
        .iter()
        .position(|name| *name == lower || (lower.len() <= 4 && name.starts_with(lower)))
        .map(|idx| idx as u32 + 1)
}

fn is_weekday(lower: &str) -> bool {
    lower.len() >= 3
        && WEEKDAYS
            .iter()
            .any(|name| *name == lower || name.starts_with(lower))
}

fn is_year_like((value, digits): (u32, usize)) -> bool {
    digits >= 3 || value > 31
}

fn expand_year((value, digits): (u32, usize)) -> std::result::Result<i32, DateParseError> {
    if value > 9999 {
        return Err(DateParseError::YearOutOfRange(value));
    }
    let year = if digits <= 2 {
        if value <= TWO_DIGIT_YEAR_PIVOT {
            2000 + value
        } else {
            1900 + value
        }
    } else {
        value
    };
    Ok(year as i32)
}

fn build_date(year: i32, month: u32, day: u32) -> std::result::Result<NaiveDate, DateParseError> {
    if year == 0 {
        return Err(DateParseError::YearOutOfRange(0));
    }
    if !(1..=12).contains(&month) || day == 0 {
        return Err(DateParseError::UnknownFormat);
    }
    NaiveDate::from_ymd_opt(year, month, day)
        .ok_or(DateParseError::DayOutOfRange { year, month, day })
}
