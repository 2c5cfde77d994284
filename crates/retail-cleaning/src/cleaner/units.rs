//! Weight and volume strings to kilograms.
//!
//! Accepts `<number><unit>` and multipack `<count> x <number><unit>` values,
//! e.g. `1.5kg`, `77g .`, `16oz`, `3 x 200g`. Volumes are treated as water
//! (1 ml = 1 g).

use crate::error::{CleaningError, Result};
use crate::utils::column_text_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Kilograms per ounce, kept at the precision the loaded tables use.
pub const KG_PER_OUNCE: f64 = 0.0283;

/// Separator of a multipack expression.
const MULTIPLICAND_SEPARATOR: &str = " x ";

/// Unit suffix recognised on a weight value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum WeightUnit {
    Kilograms,
    Grams,
    Millilitres,
    Ounces,
}

impl WeightUnit {
    /// Suffixes in classification order.
    const SUFFIXES: [(&'static str, WeightUnit); 4] = [
        ("kg", WeightUnit::Kilograms),
        ("g", WeightUnit::Grams),
        ("ml", WeightUnit::Millilitres),
        ("oz", WeightUnit::Ounces),
    ];

    /// Split a trailing unit suffix off `text`.
    pub fn classify(text: &str) -> Option<(WeightUnit, &str)> {
        Self::SUFFIXES.iter().find_map(|(suffix, unit)| {
            text.strip_suffix(suffix).map(|stem| (*unit, stem))
        })
    }

    pub fn to_kilograms(&self, amount: f64) -> f64 {
        match self {
            Self::Kilograms => amount,
            Self::Grams | Self::Millilitres => amount / 1000.0,
            Self::Ounces => amount * KG_PER_OUNCE,
        }
    }
}

/// The text left after unit stripping was not a number.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("not a numeric weight: '{0}'")]
pub struct WeightParseError(pub String);

/// Convert one weight string to kilograms.
///
/// Values without a recognised suffix are taken to be kilograms already.
pub fn parse_weight(value: &str) -> std::result::Result<f64, WeightParseError> {
    let trimmed = value.trim_end_matches([' ', '.']);
    let (unit, amount_text) = match WeightUnit::classify(trimmed) {
        Some((unit, stem)) => (Some(unit), stem),
        None => (None, trimmed),
    };

    let amount = match amount_text.split_once(MULTIPLICAND_SEPARATOR) {
        Some((count, each)) => parse_number(count)? * parse_number(each)?,
        None => parse_number(amount_text)?,
    };

    Ok(match unit {
        Some(unit) => unit.to_kilograms(amount),
        None => amount,
    })
}

fn parse_number(text: &str) -> std::result::Result<f64, WeightParseError> {
    text.trim()
        .parse::<f64>()
        .map_err(|_| WeightParseError(text.to_string()))
}

/// Convert a named weight column to Float64 kilograms in place.
///
/// Nulls stay null. A value with no numeric part left after unit stripping
/// fails the whole column.
pub fn convert_weights(entity: &str, df: &mut DataFrame, column: &str) -> Result<()> {
    let values = column_text_values(entity, df, column)?;
    let mut kilograms: Vec<Option<f64>> = Vec::with_capacity(values.len());

    for value in &values {
        match value {
            Some(text) => {
                let kg = parse_weight(text).map_err(|_| CleaningError::WeightParse {
                    column: column.to_string(),
                    value: text.clone(),
                })?;
                kilograms.push(Some(kg));
            }
            None => kilograms.push(None),
        }
    }

    df.with_column(Series::new(column.into(), kilograms))?;
    debug!("Converted '{}' to kilograms", column);
    Ok(())
}
