//! Optional TOML configuration.
//!
//! ```toml
//! [data]
//! path = "data/properties.csv"
//! store = ":memory:"
//!
//! [logging]
//! level = "debug"
//! file = "rental.log"
//!
//! [refresh]
//! delay_ms = 1500
//! new_records = 0
//! disabled_sources = ["habitaclia"]
//!
//! [calculator]
//! purchase_price = 250000
//! interest_rate = 3.1
//! ```
//!
//! Every key is optional. Command-line flags win over file values, which win
//! over built-in defaults.

use std::path::{Path, PathBuf};
use std::time::Duration;

use rental_core::CalculatorInputs;
use rental_data::RefreshConfig;
use rust_decimal::Decimal;
use serde::Deserialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config file '{path}': {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("invalid config file '{path}': {source}")]
    Parse {
        path: PathBuf,
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Config {
    pub data: DataSection,
    pub logging: LoggingSection,
    pub refresh: RefreshSection,
    pub calculator: CalculatorSection,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct DataSection {
    pub path: Option<PathBuf>,
    /// Where loaded listings are kept; only `":memory:"` is supported.
    pub store: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LoggingSection {
    pub level: Option<String>,
    pub file: Option<PathBuf>,
}

#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct RefreshSection {
    pub delay_ms: Option<u64>,
    pub new_records: Option<usize>,
    /// Source ids (e.g. `"fotocasa"`) to leave out of refreshes.
    pub disabled_sources: Vec<String>,
}

/// Overrides for the calculator's default scenario.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct CalculatorSection {
    pub purchase_price: Option<Decimal>,
    pub down_payment_percent: Option<Decimal>,
    pub interest_rate: Option<Decimal>,
    pub loan_term_years: Option<Decimal>,
    pub monthly_rent: Option<Decimal>,
    pub property_tax_annual: Option<Decimal>,
    pub insurance_annual: Option<Decimal>,
    pub maintenance_percent: Option<Decimal>,
    pub vacancy_percent: Option<Decimal>,
}

impl Config {
    pub fn from_toml_str(
        input: &str,
        path: &Path,
    ) -> Result<Self, ConfigError> {
        toml::from_str(input).map_err(|source| ConfigError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn load(path: &Path) -> Result<Self, ConfigError> {
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml_str(&contents, path)
    }

    /// Loads `path` when given, otherwise returns the built-in defaults.
    pub fn load_optional(path: Option<&Path>) -> Result<Self, ConfigError> {
        match path {
            Some(path) => Self::load(path),
            None => Ok(Self::default()),
        }
    }

    pub fn refresh_config(&self) -> RefreshConfig {
        let defaults = RefreshConfig::default();
        RefreshConfig {
            delay: self
                .refresh
                .delay_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.delay),
            new_records: self.refresh.new_records.unwrap_or(defaults.new_records),
        }
    }
}

impl CalculatorSection {
    /// Overwrites the fields of `inputs` that this section sets.
    pub fn apply_to(
        &self,
        inputs: &mut CalculatorInputs,
    ) {
        let fields = [
            (self.purchase_price, &mut inputs.purchase_price),
            (self.down_payment_percent, &mut inputs.down_payment_percent),
            (self.interest_rate, &mut inputs.interest_rate),
            (self.loan_term_years, &mut inputs.loan_term_years),
            (self.monthly_rent, &mut inputs.monthly_rent),
            (self.property_tax_annual, &mut inputs.property_tax_annual),
            (self.insurance_annual, &mut inputs.insurance_annual),
            (self.maintenance_percent, &mut inputs.maintenance_percent),
            (self.vacancy_percent, &mut inputs.vacancy_percent),
        ];
        for (value, slot) in fields {
            if let Some(value) = value {
                *slot = value;
            }
        }
    }
}
