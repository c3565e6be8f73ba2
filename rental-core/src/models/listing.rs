use std::fmt;
use std::str::FromStr;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Constraints applied when browsing listings. `None` means unconstrained;
/// every bound is inclusive.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FilterOptions {
    /// Exact, case-sensitive neighborhood name.
    pub neighborhood: Option<String>,
    pub min_price: Option<Decimal>,
    pub max_price: Option<Decimal>,
    pub min_yield: Option<Decimal>,
    pub min_bedrooms: Option<u32>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortField {
    #[default]
    Yield,
    Price,
    MonthlyRent,
    SqMeters,
    Bedrooms,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SortOrder {
    Asc,
    #[default]
    Desc,
}

#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ParseSortError {
    #[error("unknown sort field '{0}' (expected yield, price, monthly-rent, sq-meters or bedrooms)")]
    Field(String),

    #[error("unknown sort order '{0}' (expected asc or desc)")]
    Order(String),
}

impl SortField {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Yield => "yield",
            Self::Price => "price",
            Self::MonthlyRent => "monthly-rent",
            Self::SqMeters => "sq-meters",
            Self::Bedrooms => "bedrooms",
        }
    }
}

impl FromStr for SortField {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "yield" => Ok(Self::Yield),
            "price" => Ok(Self::Price),
            "monthly-rent" | "monthlyrent" | "rent" => Ok(Self::MonthlyRent),
            "sq-meters" | "sqmeters" | "size" => Ok(Self::SqMeters),
            "bedrooms" | "rooms" => Ok(Self::Bedrooms),
            _ => Err(ParseSortError::Field(s.to_string())),
        }
    }
}

impl fmt::Display for SortField {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SortOrder {
    type Err = ParseSortError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "asc" => Ok(Self::Asc),
            "desc" => Ok(Self::Desc),
            _ => Err(ParseSortError::Order(s.to_string())),
        }
    }
}

impl fmt::Display for SortOrder {
    fn fmt(
        &self,
        f: &mut fmt::Formatter<'_>,
    ) -> fmt::Result {
        f.write_str(match self {
            Self::Asc => "asc",
            Self::Desc => "desc",
        })
    }
}

/// Metrics shown side by side when comparing listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ComparisonMetric {
    Price,
    MonthlyRent,
    Yield,
    SqMeters,
    Bedrooms,
    PricePerSqMeter,
}

impl ComparisonMetric {
    pub const ALL: [ComparisonMetric; 6] = [
        Self::Price,
        Self::MonthlyRent,
        Self::Yield,
        Self::SqMeters,
        Self::Bedrooms,
        Self::PricePerSqMeter,
    ];

    /// Whether a smaller value is the better one.
    pub fn lower_is_better(&self) -> bool {
        matches!(self, Self::Price | Self::PricePerSqMeter)
    }

    pub fn label(&self) -> &'static str {
        match self {
            Self::Price => "Price",
            Self::MonthlyRent => "Rent/mo",
            Self::Yield => "Yield",
            Self::SqMeters => "Size",
            Self::Bedrooms => "Rooms",
            Self::PricePerSqMeter => "Price/m²",
        }
    }
}

/// One metric row of a comparison: values in input order plus the indices
/// holding the best value. An empty `winners` list means a tie.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricComparison {
    pub metric: ComparisonMetric,
    pub values: Vec<Decimal>,
    pub winners: Vec<usize>,
}
