//! Configuration for the cleaning pipelines.
//!
//! Only the bad-row detection is tunable. Locale rules and unit conversion
//! factors are fixed constants of their modules.

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Default pattern for corrupted placeholder cells: ten digits or uppercase letters.
pub const DEFAULT_BAD_ROW_PATTERN: &str = "^[0-9A-Z]{10}$";

/// Default name of the products weight column.
pub const DEFAULT_WEIGHT_COLUMN: &str = "weight";

/// Configuration for an [`EntityCleaner`](crate::EntityCleaner).
///
/// # Example
///
/// ```rust,ignore
/// use retail_cleaning::CleaningConfig;
///
/// let config = CleaningConfig::builder()
///     .bad_row_pattern("^[0-9A-Z]{12}$")
///     .convert_weights(false)
///     .build()?;
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CleaningConfig {
    /// Regex a cell must match to count as a corrupted placeholder.
    /// Default: `^[0-9A-Z]{10}$`
    pub bad_row_pattern: String,

    /// Explicit columns for the placeholder row filter.
    /// If None, the first four data columns are used.
    pub filter_columns: Option<Vec<String>>,

    /// Column holding product weights.
    /// Default: "weight"
    pub weight_column: String,

    /// Whether the products pipeline also normalizes weights to kilograms.
    /// Default: true
    pub convert_weights: bool,
}

impl Default for CleaningConfig {
    fn default() -> Self {
        Self {
            bad_row_pattern: DEFAULT_BAD_ROW_PATTERN.to_string(),
            filter_columns: None,
            weight_column: DEFAULT_WEIGHT_COLUMN.to_string(),
            convert_weights: true,
        }
    }
}

impl CleaningConfig {
    /// Create a new configuration builder.
    pub fn builder() -> CleaningConfigBuilder {
        CleaningConfigBuilder::default()
    }

    /// Validate the configuration and return errors if invalid.
    pub fn validate(&self) -> Result<(), ConfigValidationError> {
        if let Err(e) = Regex::new(&self.bad_row_pattern) {
            return Err(ConfigValidationError::InvalidPattern {
                pattern: self.bad_row_pattern.clone(),
                reason: e.to_string(),
            });
        }

        if self.weight_column.trim().is_empty() {
            return Err(ConfigValidationError::EmptyColumnName("weight_column"));
        }

        if let Some(columns) = &self.filter_columns
            && columns.iter().any(|c| c.trim().is_empty())
        {
            return Err(ConfigValidationError::EmptyColumnName("filter_columns"));
        }

        Ok(())
    }
}

/// Errors that can occur during configuration validation.
#[derive(Debug, thiserror::Error)]
pub enum ConfigValidationError {
    #[error("Invalid bad-row pattern '{pattern}': {reason}")]
    InvalidPattern { pattern: String, reason: String },

    #[error("Empty column name in '{0}'")]
    EmptyColumnName(&'static str),
}

/// Builder for [`CleaningConfig`] with fluent API.
#[derive(Debug, Default)]
pub struct CleaningConfigBuilder {
    bad_row_pattern: Option<String>,
    filter_columns: Option<Vec<String>>,
    weight_column: Option<String>,
    convert_weights: Option<bool>,
}

impl CleaningConfigBuilder {
    /// Set the regex used to detect corrupted placeholder rows.
    pub fn bad_row_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.bad_row_pattern = Some(pattern.into());
        self
    }

    /// Name the columns the placeholder filter inspects instead of the
    /// first four data columns.
    pub fn filter_columns<I, S>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.filter_columns = Some(columns.into_iter().map(Into::into).collect());
        self
    }

    /// Set the products weight column.
    pub fn weight_column(mut self, column: impl Into<String>) -> Self {
        self.weight_column = Some(column.into());
        self
    }

    /// Enable or disable weight normalization in the products pipeline.
    pub fn convert_weights(mut self, convert: bool) -> Self {
        self.convert_weights = Some(convert);
        self
    }

    /// Build the configuration.
    ///
    /// Returns a validated `CleaningConfig` or an error if validation fails.
    pub fn build(self) -> Result<CleaningConfig, ConfigValidationError> {
        let config = CleaningConfig {
            bad_row_pattern: self
                .bad_row_pattern
                .unwrap_or_else(|| DEFAULT_BAD_ROW_PATTERN.to_string()),
            filter_columns: self.filter_columns,
            weight_column: self
                .weight_column
                .unwrap_or_else(|| DEFAULT_WEIGHT_COLUMN.to_string()),
            convert_weights: self.convert_weights.unwrap_or(true),
        };

        config.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = CleaningConfig::default();
        assert_eq!(config.bad_row_pattern, "^[0-9A-Z]{10}$");
        assert_eq!(config.weight_column, "weight");
        assert!(config.filter_columns.is_none());
        assert!(config.convert_weights);
    }

    #[test]
    fn test_builder_custom_values() {
        let config = CleaningConfig::builder()
            .bad_row_pattern("^X+$")
            .filter_columns(["first_name", "last_name"])
            .weight_column("mass")
            .convert_weights(false)
            .build()
            .unwrap();

        assert_eq!(config.bad_row_pattern, "^X+$");
        assert_eq!(
            config.filter_columns,
            Some(vec!["first_name".to_string(), "last_name".to_string()])
        );
        assert_eq!(config.weight_column, "mass");
        assert!(!config.convert_weights);
    }

    #[test]
    fn test_validation_invalid_pattern() {
        let result = CleaningConfig::builder().bad_row_pattern("([a-z").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::InvalidPattern { .. }
        ));
    }

    #[test]
    fn test_validation_empty_weight_column() {
        let result = CleaningConfig::builder().weight_column("  ").build();
        assert!(matches!(
            result.unwrap_err(),
            ConfigValidationError::EmptyColumnName("weight_column")
        ));
    }

    #[test]
    fn test_config_from_partial_json() {
        let json = r#"{ "bad_row_pattern": "^[A-Z]{8}$", "convert_weights": false }"#;
        let config: CleaningConfig = serde_json::from_str(json).unwrap();

        assert_eq!(config.bad_row_pattern, "^[A-Z]{8}$");
        assert!(!config.convert_weights);
        assert_eq!(config.weight_column, "weight");
        assert!(config.validate().is_ok());
    }
}
