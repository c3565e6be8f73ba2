use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Descriptive statistics for every listing sharing one neighborhood name.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NeighborhoodStats {
    pub name: String,
    /// Mean price, rounded to a whole number.
    pub avg_price: Decimal,
    /// Mean monthly rent, rounded to a whole number.
    pub avg_rent: Decimal,
    /// Mean of the listings' stored yields, rounded to two decimal places.
    pub avg_yield: Decimal,
    pub property_count: usize,
    pub min_price: Decimal,
    pub max_price: Decimal,
}

/// Headline figures over a ranked set of [`NeighborhoodStats`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MarketSummary {
    pub areas_tracked: usize,
    pub total_properties: usize,
    /// Name and average yield of the top-ranked neighborhood.
    pub best: Option<(String, Decimal)>,
    /// Mean of the per-neighborhood average yields.
    pub average_yield: Decimal,
}
