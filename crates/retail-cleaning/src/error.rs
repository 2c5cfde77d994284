//! Error types for the cleaning pipelines.
//!
//! Schema-level problems (missing columns, tables too narrow for the row
//! filter) abort the whole table. Cell-level problems are handled locally by
//! the normalizers and only surface here when no fallback exists.
//!
//! Errors are serializable so a caller can forward them as `{code, message}`.

use serde::Serialize;
use serde::ser::SerializeStruct;
use thiserror::Error;

/// The main error type for the cleaning pipelines.
#[derive(Error, Debug)]
pub enum CleaningError {
    /// A column the entity schema requires is absent.
    #[error("{entity}: expected column \"{column}\" not found, please check the data source")]
    MissingColumn { entity: String, column: String },

    /// The table has fewer data columns than a row rule inspects.
    #[error("{rule} needs at least {required} data columns, table has {found}")]
    InsufficientColumns {
        rule: &'static str,
        required: usize,
        found: usize,
    },

    /// The bad-row pattern override did not compile.
    #[error("Invalid bad-row pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    /// A value could not be cast to the column's canonical type.
    #[error("Failed to convert column '{column}' to {target_type}: '{value}'")]
    TypeConversionFailed {
        column: String,
        target_type: &'static str,
        value: String,
    },

    /// A weight had no numeric part left after its unit was stripped.
    #[error("Weight in column '{column}' is not numeric after unit stripping: '{value}'")]
    WeightParse { column: String, value: String },

    /// The synthesized timestamp of the date-times table could not be parsed.
    #[error("Row {row}: cannot build timestamp from '{value}'")]
    TimestampParse { row: usize, value: String },

    /// A date parse failed for a reason other than an unknown format.
    #[error("Failed to parse date '{value}' in column '{column}': {reason}")]
    DateParse {
        column: String,
        value: String,
        reason: String,
    },

    /// Polars error wrapper.
    #[error("Polars error: {0}")]
    Polars(#[from] polars::error::PolarsError),

    /// Generic error with context.
    #[error("{context}: {source}")]
    WithContext {
        context: String,
        #[source]
        source: Box<CleaningError>,
    },
}

impl CleaningError {
    /// Shorthand for a [`CleaningError::MissingColumn`].
    pub fn missing_column(entity: impl Into<String>, column: impl Into<String>) -> Self {
        CleaningError::MissingColumn {
            entity: entity.into(),
            column: column.into(),
        }
    }

    /// Add context to an error.
    pub fn with_context(self, context: impl Into<String>) -> Self {
        CleaningError::WithContext {
            context: context.into(),
            source: Box::new(self),
        }
    }

    /// Stable error code for callers that branch on the failure kind.
    pub fn error_code(&self) -> &'static str {
        match self {
            Self::MissingColumn { .. } => "MISSING_COLUMN",
            Self::InsufficientColumns { .. } => "INSUFFICIENT_COLUMNS",
            Self::InvalidPattern { .. } => "INVALID_PATTERN",
            Self::TypeConversionFailed { .. } => "TYPE_CONVERSION_FAILED",
            Self::WeightParse { .. } => "WEIGHT_PARSE",
            Self::TimestampParse { .. } => "TIMESTAMP_PARSE",
            Self::DateParse { .. } => "DATE_PARSE",
            Self::Polars(_) => "POLARS_ERROR",
            Self::WithContext { source, .. } => source.error_code(),
        }
    }

    /// True when the table itself does not match the entity schema.
    pub fn is_schema_error(&self) -> bool {
        match self {
            Self::MissingColumn { .. } | Self::InsufficientColumns { .. } => true,
            Self::WithContext { source, .. } => source.is_schema_error(),
            _ => false,
        }
    }
}

impl Serialize for CleaningError {
    fn serialize<S>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error>
    where
        S: serde::Serializer,
    {
        let mut state = serializer.serialize_struct("CleaningError", 2)?;
        state.serialize_field("code", &self.error_code())?;
        state.serialize_field("message", &self.to_string())?;
        state.end()
    }
}

/// Result type alias for cleaning operations.
pub type Result<T> = std::result::Result<T, CleaningError>;

/// Extension trait for adding context to Results.
pub trait ResultExt<T> {
    /// Add context to an error result.
    fn context(self, context: impl Into<String>) -> Result<T>;
}

impl<T> ResultExt<T> for Result<T> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| e.with_context(context))
    }
}

impl<T> ResultExt<T> for std::result::Result<T, polars::error::PolarsError> {
    fn context(self, context: impl Into<String>) -> Result<T> {
        self.map_err(|e| CleaningError::Polars(e).with_context(context))
    }
}
