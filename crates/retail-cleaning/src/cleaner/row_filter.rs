//! Removal of corrupted placeholder rows and `NULL` marker rows.
//!
//! Both rules inspect a fixed number of leading data columns (the synthetic
//! `index` column never counts). Surviving rows keep their original order.

use crate::config::DEFAULT_BAD_ROW_PATTERN;
use crate::error::{CleaningError, Result};
use crate::utils::{column_text_values, data_column_names, require_columns};
use once_cell::sync::Lazy;
use polars::prelude::*;
use regex::Regex;
use tracing::debug;

static DEFAULT_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(DEFAULT_BAD_ROW_PATTERN).expect("default bad-row pattern compiles"));

/// Number of leading data columns the placeholder rule inspects.
pub const PLACEHOLDER_COLUMNS: usize = 4;

/// Number of leading data columns the `NULL` rule inspects.
pub const NULL_MARKER_COLUMNS: usize = 2;

/// Literal text an extraction writes for a missing record.
pub const NULL_MARKER: &str = "NULL";

/// Rows removed by each rule of a [`RowFilter`] pass.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RowFilterStats {
    pub placeholder_rows: usize,
    pub null_rows: usize,
}

impl RowFilterStats {
    pub fn total(&self) -> usize {
        self.placeholder_rows + self.null_rows
    }
}

/// Drops rows that carry no real data.
#[derive(Debug, Clone)]
pub struct RowFilter {
    pattern: Regex,
    columns: Option<Vec<String>>,
}

impl Default for RowFilter {
    fn default() -> Self {
        Self {
            pattern: DEFAULT_PATTERN.clone(),
            columns: None,
        }
    }
}

impl RowFilter {
    /// Create a filter whose placeholder rule uses `pattern`.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern = Regex::new(pattern).map_err(|e| CleaningError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(Self {
            pattern,
            columns: None,
        })
    }

    /// Inspect these named columns instead of the first four data columns.
    pub fn with_columns(mut self, columns: Vec<String>) -> Self {
        self.columns = Some(columns);
        self
    }

    pub fn pattern(&self) -> &str {
        self.pattern.as_str()
    }

    /// Apply the placeholder rule, then the `NULL` rule.
    pub fn apply(&self, df: DataFrame) -> Result<(DataFrame, RowFilterStats)> {
        let (df, placeholder_rows) = self.remove_placeholder_rows(df)?;
        let (df, null_rows) = remove_null_rows(df)?;
        Ok((
            df,
            RowFilterStats {
                placeholder_rows,
                null_rows,
            },
        ))
    }

    /// A cell matches when the pattern matches at its first character.
    fn matches_at_start(&self, value: &str) -> bool {
        self.pattern.find(value).is_some_and(|m| m.start() == 0)
    }

    /// Drop rows where every inspected column matches the placeholder pattern.
    ///
    /// Null cells never match. Returns the filtered table and the number of
    /// rows removed.
    pub fn remove_placeholder_rows(&self, df: DataFrame) -> Result<(DataFrame, usize)> {
        let columns = match &self.columns {
            Some(columns) => {
                let names: Vec<&str> = columns.iter().map(String::as_str).collect();
                require_columns("row filter", &df, &names)?;
                columns.clone()
            }
            None => leading_data_columns(&df, PLACEHOLDER_COLUMNS, "placeholder row filter")?,
        };

        let mut all_match = vec![true; df.height()];
        for name in &columns {
            let values = column_text_values("row filter", &df, name)?;
            for (flag, value) in all_match.iter_mut().zip(values.iter()) {
                *flag = *flag && value.as_deref().is_some_and(|v| self.matches_at_start(v));
            }
        }

        let removed = all_match.iter().filter(|&&m| m).count();
        let keep: Vec<bool> = all_match.into_iter().map(|m| !m).collect();
        let df = df.filter(&BooleanChunked::new("keep".into(), keep))?;

        debug!("Placeholder filter removed {} rows", removed);
        Ok((df, removed))
    }
}

/// Drop rows whose first two data columns are both the literal `NULL`.
pub fn remove_null_rows(df: DataFrame) -> Result<(DataFrame, usize)> {
    let columns = leading_data_columns(&df, NULL_MARKER_COLUMNS, "NULL row filter")?;

    let mut all_null = vec![true; df.height()];
    for name in &columns {
        let values = column_text_values("row filter", &df, name)?;
        for (flag, value) in all_null.iter_mut().zip(values.iter()) {
            *flag = *flag && value.as_deref() == Some(NULL_MARKER);
        }
    }

    let removed = all_null.iter().filter(|&&m| m).count();
    let keep: Vec<bool> = all_null.into_iter().map(|m| !m).collect();
    let df = df.filter(&BooleanChunked::new("keep".into(), keep))?;

    debug!("NULL filter removed {} rows", removed);
    Ok((df, removed))
}

fn leading_data_columns(df: &DataFrame, count: usize, rule: &'static str) -> Result<Vec<String>> {
    let names = data_column_names(df);
    if names.len() < count {
        return Err(CleaningError::InsufficientColumns {
            rule,
            required: count,
            found: names.len(),
        });
    }
    Ok(names.into_iter().take(count).collect())
}
