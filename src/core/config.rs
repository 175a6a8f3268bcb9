//! Run configuration: taxable year, tax value unit, filer identity.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

use super::entity::check_digit;
use super::format::Format;

/// Configuration of one generation run, read from JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(deny_unknown_fields)]
pub struct RunConfig {
    /// Taxable year being reported.
    #[serde(default = "default_year")]
    pub year: i32,
    /// Tax value unit (UVT) of the taxable year, in pesos.
    #[serde(default = "default_uvt")]
    #[schemars(with = "f64")]
    pub uvt: Decimal,
    /// Whether tax liability accounts were closed at year end. When true the
    /// closing balance of a withholding account is the amount withheld;
    /// otherwise the net movement of the period is used.
    #[serde(default = "default_closes_taxes")]
    pub closes_taxes: bool,
    /// Envelope number of the first XML file; later formats count up from it.
    #[serde(default = "default_first_envelope")]
    pub first_envelope: u32,
    /// Submission date written to XML headers. Defaults to today.
    #[serde(default)]
    pub submission_date: Option<NaiveDate>,
    /// The reporting company or person.
    #[serde(default)]
    pub filer: Filer,
    /// Formats to produce; all when absent.
    #[serde(default)]
    pub formats: Option<Vec<Format>>,
}

fn default_year() -> i32 {
    2025
}

fn default_uvt() -> Decimal {
    Decimal::from(49_799)
}

fn default_closes_taxes() -> bool {
    true
}

fn default_first_envelope() -> u32 {
    1
}

impl Default for RunConfig {
    fn default() -> Self {
        RunConfig {
            year: default_year(),
            uvt: default_uvt(),
            closes_taxes: default_closes_taxes(),
            first_envelope: default_first_envelope(),
            submission_date: None,
            filer: Filer::default(),
            formats: None,
        }
    }
}

/// Identity and address of the filer, used in XML headers and as the
/// fallback address of domestic counterparties without one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct Filer {
    pub id_type: String,
    pub id: String,
    pub check_digit: Option<String>,
    pub legal_name: String,
    pub first_surname: String,
    pub second_surname: String,
    pub first_name: String,
    pub second_name: String,
    pub street: String,
    pub region: String,
    pub locality: String,
}

pub const FALLBACK_STREET: &str = "SIN DIRECCION";
pub const FALLBACK_REGION: &str = "11";
pub const FALLBACK_LOCALITY: &str = "001";

impl Filer {
    pub fn id_type(&self) -> &str {
        if self.id_type.is_empty() {
            "31"
        } else {
            &self.id_type
        }
    }

    pub fn check_digit(&self) -> String {
        match &self.check_digit {
            Some(dv) if !dv.is_empty() => dv.clone(),
            _ => check_digit(&self.id).map(|d| d.to_string()).unwrap_or_default(),
        }
    }

    pub fn fallback_street(&self) -> &str {
        or_default(&self.street, FALLBACK_STREET)
    }

    pub fn fallback_region(&self) -> &str {
        or_default(&self.region, FALLBACK_REGION)
    }

    pub fn fallback_locality(&self) -> &str {
        or_default(&self.locality, FALLBACK_LOCALITY)
    }
}

fn or_default<'a>(value: &'a str, default: &'a str) -> &'a str {
    if value.trim().is_empty() {
        default
    } else {
        value
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("invalid config: {0}")]
    Json(#[from] serde_json::Error),
    #[error("uvt must be positive, got {0}")]
    NonPositiveUvt(Decimal),
    #[error("year {0} is outside 2000..=2100")]
    Year(i32),
}

impl RunConfig {
    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: RunConfig = serde_json::from_str(&text)?;
        config.check()?;
        Ok(config)
    }

    pub fn check(&self) -> Result<(), ConfigError> {
        if self.uvt <= Decimal::ZERO {
            return Err(ConfigError::NonPositiveUvt(self.uvt));
        }
        if !(2000..=2100).contains(&self.year) {
            return Err(ConfigError::Year(self.year));
        }
        Ok(())
    }

    pub fn formats(&self) -> Vec<Format> {
        match &self.formats {
            Some(formats) if !formats.is_empty() => {
                let mut formats = formats.clone();
                formats.sort();
                formats.dedup();
                formats
            }
            _ => Format::ALL.to_vec(),
        }
    }

    pub fn submission_date(&self) -> NaiveDate {
        self.submission_date
            .unwrap_or_else(|| chrono::Local::now().date_naive())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn defaults_fill_missing_fields() {
        let config: RunConfig = serde_json::from_str(r#"{"filer": {"id": "900123456"}}"#).unwrap();
        assert_eq!(config.year, 2025);
        assert_eq!(config.uvt, dec!(49799));
        assert!(config.closes_taxes);
        assert_eq!(config.formats().len(), Format::ALL.len());
        assert_eq!(config.filer.id_type(), "31");
        assert_eq!(config.filer.check_digit(), "8");
        assert_eq!(config.filer.fallback_street(), FALLBACK_STREET);
    }

    #[test]
    fn parses_format_subset_and_date() {
        let config: RunConfig = serde_json::from_str(
            r#"{"year": 2024, "uvt": 47065, "formats": ["2276", "1001", "1001"], "submission_date": "2025-04-01"}"#,
        )
        .unwrap();
        assert_eq!(config.formats(), vec![Format::F1001, Format::F2276]);
        assert_eq!(
            config.submission_date(),
            NaiveDate::from_ymd_opt(2025, 4, 1).unwrap()
        );
    }

    #[test]
    fn rejects_bad_values() {
        let config = RunConfig {
            uvt: dec!(0),
            ..Default::default()
        };
        assert!(matches!(config.check(), Err(ConfigError::NonPositiveUvt(_))));
        assert!(serde_json::from_str::<RunConfig>(r#"{"colour": 1}"#).is_err());
    }
}
