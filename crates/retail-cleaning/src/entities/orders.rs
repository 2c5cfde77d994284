//! Orders: the fact table. Personal names and leftover index columns go.

use super::{PipelineContext, run_detached};
use crate::error::{Result, ResultExt};
use crate::types::Entity;
use crate::utils::{INDEX_COLUMN, drop_if_present};
use polars::prelude::*;

/// Columns removed from the orders table when present.
pub const STRAY_ORDER_COLUMNS: [&str; 4] = ["first_name", "last_name", "1", "level_0"];

pub(crate) fn run(df: DataFrame, ctx: &mut PipelineContext<'_>) -> Result<DataFrame> {
    let df = ctx.drop_columns(df, &STRAY_ORDER_COLUMNS);
    let df = reset_index(df)?;
    ctx.step("Reset row numbering");
    Ok(df)
}

/// Replace any `index` column with a fresh 0..n Int64 one at position 0.
fn reset_index(df: DataFrame) -> Result<DataFrame> {
    let df = drop_if_present(df, &[INDEX_COLUMN]);
    let mut df = df
        .with_row_index(INDEX_COLUMN.into(), None)
        .context("orders: regenerating index")?;
    let index = df
        .column(INDEX_COLUMN)?
        .cast(&DataType::Int64)
        .context("orders: casting index to Int64")?;
    df.with_column(index)?;
    Ok(df)
}

/// Clean a raw orders table.
pub fn clean_orders_data(df: DataFrame) -> Result<DataFrame> {
    run_detached(Entity::Orders, df, run)
}
