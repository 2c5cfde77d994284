//! Products catalogue from object storage.

use super::{PipelineContext, RULE_EMPTY_ROW, run_detached};
use crate::cleaner::convert_weights;
use crate::error::Result;
use crate::types::Entity;
use crate::utils::INDEX_COLUMN;
use polars::prelude::*;

/// Index column a CSV writer leaves behind in the products extract.
pub const PRODUCTS_INDEX_ARTIFACT: &str = "Unnamed: 0";

pub(crate) fn run(df: DataFrame, ctx: &mut PipelineContext<'_>) -> Result<DataFrame> {
    let df = ctx.drop_columns(df, &[PRODUCTS_INDEX_ARTIFACT]);
    let df = ctx.filter_rows(df)?;

    let (mut df, removed) = remove_empty_rows(df)?;
    ctx.rows_removed(RULE_EMPTY_ROW, removed);
    ctx.step(format!("Removed {} empty rows", removed));

    ctx.tidy_dates(&mut df, "date_added")?;
    Ok(df)
}

pub(crate) fn run_weights(
    df: DataFrame,
    ctx: &mut PipelineContext<'_>,
    weight_column: &str,
) -> Result<DataFrame> {
    let mut df = df;
    convert_weights(ctx.label(), &mut df, weight_column)?;
    ctx.step(format!("Converted '{}' to kilograms", weight_column));
    Ok(df)
}

/// Drop rows where every data column is null.
fn remove_empty_rows(df: DataFrame) -> Result<(DataFrame, usize)> {
    let mut any_value = vec![false; df.height()];
    for column in df.get_columns() {
        if column.name().as_str() == INDEX_COLUMN {
            continue;
        }
        let present = column.is_not_null();
        for (flag, value) in any_value.iter_mut().zip(&present) {
            *flag = *flag || value.unwrap_or(false);
        }
    }

    let removed = any_value.iter().filter(|&&keep| !keep).count();
    let df = df.filter(&BooleanChunked::new("keep".into(), any_value))?;
    Ok((df, removed))
}

/// Clean a raw products table with the default row filter.
///
/// Weights are left as extracted; see [`convert_product_weights`].
pub fn clean_products_data(df: DataFrame) -> Result<DataFrame> {
    run_detached(Entity::Products, df, run)
}

/// Normalize the weight column of a products table to Float64 kilograms.
///
/// Best run on the output of [`clean_products_data`], whose row filter
/// removes the placeholder rows that can never parse as weights.
pub fn convert_product_weights(df: DataFrame, weight_column: &str) -> Result<DataFrame> {
    let mut df = df;
    convert_weights(Entity::Products.as_str(), &mut df, weight_column)?;
    Ok(df)
}
