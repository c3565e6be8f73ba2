//! Per-neighborhood statistics over a snapshot of listings.
//!
//! Listings are grouped by exact, case-sensitive neighborhood name. Each
//! group's average yield is the mean of the listings' stored yields, not the
//! yield of the averaged price and rent. The result is ranked by average yield,
//! highest first; ties keep the order in which the neighborhoods first appear.
//!
//! # Example
//!
//! ```
//! use chrono::NaiveDate;
//! use rust_decimal_macros::dec;
//! use rental_core::{NewProperty, Property};
//! use rental_core::calculations::calculate_neighborhood_stats;
//!
//! let date = NaiveDate::from_ymd_opt(2026, 1, 21).unwrap();
//! let listing = |id, price, rent| {
//!     Property::from_new(
//!         id,
//!         NewProperty {
//!             address: format!("Carrer {id}"),
//!             neighborhood: "Eixample".to_string(),
//!             price,
//!             monthly_rent: rent,
//!             sq_meters: 70,
//!             bedrooms: 2,
//!             bathrooms: 1,
//!             source: "Manual".to_string(),
//!             image_url: None,
//!         },
//!         date,
//!     )
//! };
//!
//! // 5% and 7% yields
//! let stats = calculate_neighborhood_stats(&[
//!     listing(1, dec!(240000), dec!(1000)),
//!     listing(2, dec!(240000), dec!(1400)),
//! ]);
//!
//! assert_eq!(stats[0].avg_yield, dec!(6.00));
//! assert_eq!(stats[0].property_count, 2);
//! ```

use std::collections::HashMap;

use rust_decimal::Decimal;
use tracing::debug;

use crate::calculations::common::{round_half_up, round_whole};
use crate::models::{MarketSummary, NeighborhoodStats, Property};

/// Groups `properties` by neighborhood and ranks the groups by average yield.
///
/// An empty input yields an empty result.
pub fn calculate_neighborhood_stats(properties: &[Property]) -> Vec<NeighborhoodStats> {
    let mut order: Vec<&str> = Vec::new();
    let mut groups: HashMap<&str, Vec<&Property>> = HashMap::new();

    for property in properties {
        let name = property.neighborhood.as_str();
        groups
            .entry(name)
            .or_insert_with(|| {
                order.push(name);
                Vec::new()
            })
            .push(property);
    }

    let mut stats: Vec<NeighborhoodStats> = order
        .into_iter()
        .filter_map(|name| groups.get(name).map(|group| summarize(name, group)))
        .collect();

    // sort_by is stable: tied yields keep first-appearance order
    stats.sort_by(|a, b| b.avg_yield.cmp(&a.avg_yield));

    debug!(
        properties = properties.len(),
        neighborhoods = stats.len(),
        "calculated neighborhood stats"
    );
    stats
}

fn summarize(
    name: &str,
    group: &[&Property],
) -> NeighborhoodStats {
    let count = Decimal::from(group.len());

    let mut total_price = Decimal::ZERO;
    let mut total_rent = Decimal::ZERO;
    let mut total_yield = Decimal::ZERO;
    let mut min_price = group[0].price;
    let mut max_price = group[0].price;

    for property in group {
        total_price = total_price.saturating_add(property.price);
        total_rent = total_rent.saturating_add(property.monthly_rent);
        total_yield = total_yield.saturating_add(property.gross_yield);
        min_price = min_price.min(property.price);
        max_price = max_price.max(property.price);
    }

    NeighborhoodStats {
        name: name.to_string(),
        avg_price: round_whole(total_price / count),
        avg_rent: round_whole(total_rent / count),
        avg_yield: round_half_up(total_yield / count),
        property_count: group.len(),
        min_price,
        max_price,
    }
}

/// The first `n` neighborhoods of an already ranked list.
pub fn top_neighborhoods(
    stats: &[NeighborhoodStats],
    n: usize,
) -> &[NeighborhoodStats] {
    &stats[..n.min(stats.len())]
}

/// Headline figures for a ranked list produced by
/// [`calculate_neighborhood_stats`].
pub fn market_summary(
    stats: &[NeighborhoodStats],
    total_properties: usize,
) -> MarketSummary {
    let average_yield = if stats.is_empty() {
        Decimal::ZERO
    } else {
        let total = stats
            .iter()
            .fold(Decimal::ZERO, |acc, s| acc.saturating_add(s.avg_yield));
        round_half_up(total / Decimal::from(stats.len()))
    };

    MarketSummary {
        areas_tracked: stats.len(),
        total_properties,
        best: stats.first().map(|s| (s.name.clone(), s.avg_yield)),
        average_yield,
    }
}
