//! Users: dates of birth and joining, country codes, phone numbers.

use super::{PipelineContext, run_detached};
use crate::cleaner::normalize_locale_fields;
use crate::error::Result;
use crate::types::Entity;
use crate::utils::require_columns;
use polars::prelude::*;

const DATE_COLUMNS: [&str; 2] = ["date_of_birth", "join_date"];
const LOCALE_COLUMNS: [&str; 3] = ["country", "country_code", "phone_number"];

pub(crate) fn run(df: DataFrame, ctx: &mut PipelineContext<'_>) -> Result<DataFrame> {
    require_columns(ctx.label(), &df, &DATE_COLUMNS)?;
    require_columns(ctx.label(), &df, &LOCALE_COLUMNS)?;

    let mut df = ctx.filter_rows(df)?;

    for column in DATE_COLUMNS {
        ctx.tidy_dates(&mut df, column)?;
    }

    // phone rules read the corrected country code
    normalize_locale_fields(ctx.label(), &mut df)?;
    ctx.step("Corrected country codes and normalized phone numbers");

    Ok(df)
}

/// Clean a raw users table with the default row filter.
pub fn clean_user_data(df: DataFrame) -> Result<DataFrame> {
    run_detached(Entity::Users, df, run)
}
