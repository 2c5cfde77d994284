//! Country code correction and per-locale phone number normalization.
//!
//! Phone rules dispatch on the country code, so the code must be corrected
//! first. Each rule is an ordered chain of rewrites; later steps see the
//! output of earlier ones.

use crate::error::Result;
use crate::utils::column_text_values;
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Supported phone-format regimes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    Us,
    Gb,
    De,
}

impl Locale {
    /// Look up the locale for an ISO country code; unsupported codes give None.
    pub fn from_country_code(code: &str) -> Option<Self> {
        match code {
            "US" => Some(Self::Us),
            "GB" => Some(Self::Gb),
            "DE" => Some(Self::De),
            _ => None,
        }
    }

    /// International dialling prefix without the leading `+`.
    pub fn dialling_code(&self) -> &'static str {
        match self {
            Self::Us => "1",
            Self::Gb => "44",
            Self::De => "49",
        }
    }

    /// Rewrite a phone number into this locale's international form.
    pub fn normalize_phone(&self, number: &str) -> String {
        match self {
            Self::Us => normalize_us_phone(number),
            Self::Gb => normalize_trunk_prefixed_phone(number, self.dialling_code(), false),
            Self::De => normalize_trunk_prefixed_phone(number, self.dialling_code(), true),
        }
    }
}

/// Fix the `GGB` typo extractions carry for United Kingdom rows.
pub fn correct_country_code(country: Option<&str>, country_code: Option<&str>) -> Option<String> {
    match (country, country_code) {
        (Some("United Kingdom"), Some("GGB")) => Some("GB".to_string()),
        (_, code) => code.map(str::to_string),
    }
}

/// Normalize a phone number for an already-corrected country code.
///
/// Unsupported or missing codes pass the number through unchanged.
pub fn normalize_phone(country_code: Option<&str>, number: &str) -> String {
    match country_code.and_then(Locale::from_country_code) {
        Some(locale) => locale.normalize_phone(number),
        None => number.to_string(),
    }
}

fn normalize_us_phone(number: &str) -> String {
    let mut number = number.to_string();
    if number.starts_with('(') && number.contains(')') {
        number = number.replace('(', "").replace(')', " ");
    }
    number = number.replace('.', " ").replace('-', " ").replace('x', " ext ");
    if let Some(rest) = number.strip_prefix("001") {
        number = rest.trim().to_string();
    }
    if !number.starts_with("+1") {
        number = format!("+1 {number}");
    }
    number
}

/// GB and DE share one shape: `(0)` trunk marker after the country code,
/// optional national parentheses, and a leading `0` trunk prefix.
fn normalize_trunk_prefixed_phone(number: &str, dialling_code: &str, strip_spaces: bool) -> String {
    let international = format!("+{dialling_code}");
    let mut number = number.to_string();

    if number.starts_with(&international) && number.contains("(0)") {
        number = number.replace("(0)", "");
    }
    if number.starts_with('(') {
        number = number.replace(['(', ')'], "");
    }
    if let Some(rest) = number.strip_prefix('0') {
        number = format!("{international}{rest}");
        if strip_spaces {
            number = number.replace(' ', "");
        }
    }
    if number.starts_with(dialling_code) {
        number = format!("+{number}");
    }
    number
}

/// Correct `country_code`, then normalize `phone_number` from it.
pub fn normalize_locale_fields(entity: &str, df: &mut DataFrame) -> Result<()> {
    let countries = column_text_values(entity, df, "country")?;
    let codes = column_text_values(entity, df, "country_code")?;
    let phones = column_text_values(entity, df, "phone_number")?;

    let corrected: Vec<Option<String>> = countries
        .iter()
        .zip(codes.iter())
        .map(|(country, code)| correct_country_code(country.as_deref(), code.as_deref()))
        .collect();

    let corrections = corrected
        .iter()
        .zip(codes.iter())
        .filter(|(new, old)| new != old)
        .count();

    let normalized: Vec<Option<String>> = phones
        .iter()
        .zip(corrected.iter())
        .map(|(phone, code)| {
            phone
                .as_deref()
                .map(|number| normalize_phone(code.as_deref(), number))
        })
        .collect();

    df.with_column(Series::new("country_code".into(), corrected))?;
    df.with_column(Series::new("phone_number".into(), normalized))?;

    debug!("Corrected {} country codes", corrections);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_country_code_correction() {
        assert_eq!(
            correct_country_code(Some("United Kingdom"), Some("GGB")),
            Some("GB".to_string())
        );
        assert_eq!(
            correct_country_code(Some("Germany"), Some("GGB")),
            Some("GGB".to_string())
        );
        assert_eq!(
            correct_country_code(Some("United Kingdom"), Some("GB")),
            Some("GB".to_string())
        );
        assert_eq!(correct_country_code(Some("United Kingdom"), None), None);
    }

    #[test]
    fn test_us_phone_rules() {
        assert_eq!(normalize_phone(Some("US"), "(555)123-4567"), "+1 555 123 4567");
        assert_eq!(normalize_phone(Some("US"), "555.123.4567"), "+1 555 123 4567");
        assert_eq!(
            normalize_phone(Some("US"), "001-845-123-4567x890"),
            "+1 845 123 4567 ext 890"
        );
        assert_eq!(normalize_phone(Some("US"), "+1-846-593-2839"), "+1 846 593 2839");
    }

    #[test]
    fn test_gb_phone_rules() {
        assert_eq!(normalize_phone(Some("GB"), "+44(0)1234567890"), "+441234567890");
        assert_eq!(normalize_phone(Some("GB"), "(01632) 960 001"), "+441632 960 001");
        assert_eq!(normalize_phone(Some("GB"), "0161 496 0674"), "+44161 496 0674");
        assert_eq!(normalize_phone(Some("GB"), "441514960596"), "+441514960596");
    }

    #[test]
    fn test_gb_parentheses_stripped_before_trunk_zero() {
        // "(0" only becomes a trunk zero once the parenthesis is gone
        assert_eq!(normalize_phone(Some("GB"), "(0)20 7946 0958"), "+4420 7946 0958");
    }

    #[test]
    fn test_de_phone_rules() {
        assert_eq!(normalize_phone(Some("DE"), "+49(0)30 1234567"), "+4930 1234567");
        assert_eq!(normalize_phone(Some("DE"), "030 1234 567"), "+49301234567");
        assert_eq!(normalize_phone(Some("DE"), "(030) 1234567"), "+49301234567");
        assert_eq!(normalize_phone(Some("DE"), "49 30 1234567"), "+49 30 1234567");
    }

    #[test]
    fn test_unsupported_locale_passthrough() {
        assert_eq!(normalize_phone(Some("FR"), "(01) 23.45"), "(01) 23.45");
        assert_eq!(normalize_phone(Some("GGB"), "07700 900123"), "07700 900123");
        assert_eq!(normalize_phone(None, "07700 900123"), "07700 900123");
    }

    #[test]
    fn test_locale_fields_ordering() {
        let mut df = df! {
            "country" => &["United Kingdom", "Germany"],
            "country_code" => &["GGB", "DE"],
            "phone_number" => &["+44(0)1234567890", "0301234567"],
        }
        .unwrap();

        normalize_locale_fields("users", &mut df).unwrap();

        let codes = column_text_values("users", &df, "country_code").unwrap();
        let phones = column_text_values("users", &df, "phone_number").unwrap();
        assert_eq!(codes, vec![Some("GB".to_string()), Some("DE".to_string())]);
        assert_eq!(
            phones,
            vec![
                Some("+441234567890".to_string()),
                Some("+49301234567".to_string())
            ]
        );
    }

    #[test]
    fn test_locale_fields_require_columns() {
        let mut df = df! {
            "country" => &["Germany"],
            "country_code" => &["DE"],
        }
        .unwrap();
        let err = normalize_locale_fields("users", &mut df).unwrap_err();
        assert!(err.to_string().contains("phone_number"));
    }
}
