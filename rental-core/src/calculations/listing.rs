//! Browsing helpers: filtering, ordering and side-by-side comparison of
//! listings.

use std::cmp::Ordering;

use rust_decimal::Decimal;

use crate::calculations::common::round_whole;
use crate::models::{
    ComparisonMetric, FilterOptions, MetricComparison, Property, SortField, SortOrder,
};

/// Whether `property` satisfies every constraint in `filters`.
pub fn matches_filters(
    property: &Property,
    filters: &FilterOptions,
) -> bool {
    if let Some(neighborhood) = &filters.neighborhood {
        if property.neighborhood != *neighborhood {
            return false;
        }
    }
    if filters.min_price.is_some_and(|min| property.price < min) {
        return false;
    }
    if filters.max_price.is_some_and(|max| property.price > max) {
        return false;
    }
    if filters.min_yield.is_some_and(|min| property.gross_yield < min) {
        return false;
    }
    if filters.min_bedrooms.is_some_and(|min| property.bedrooms < min) {
        return false;
    }
    true
}

/// Listings matching `filters`, in input order.
pub fn filter_properties(
    properties: &[Property],
    filters: &FilterOptions,
) -> Vec<Property> {
    properties
        .iter()
        .filter(|p| matches_filters(p, filters))
        .cloned()
        .collect()
}

fn sort_key(
    property: &Property,
    field: SortField,
) -> Decimal {
    match field {
        SortField::Yield => property.gross_yield,
        SortField::Price => property.price,
        SortField::MonthlyRent => property.monthly_rent,
        SortField::SqMeters => Decimal::from(property.sq_meters),
        SortField::Bedrooms => Decimal::from(property.bedrooms),
    }
}

/// Stable in-place sort of listings by one numeric field.
pub fn sort_properties(
    properties: &mut [Property],
    field: SortField,
    order: SortOrder,
) {
    properties.sort_by(|a, b| {
        let ordering = sort_key(a, field).cmp(&sort_key(b, field));
        match order {
            SortOrder::Asc => ordering,
            SortOrder::Desc => ordering.reverse(),
        }
    });
}

/// Filters, then sorts.
pub fn query_properties(
    properties: &[Property],
    filters: &FilterOptions,
    field: SortField,
    order: SortOrder,
) -> Vec<Property> {
    let mut result = filter_properties(properties, filters);
    sort_properties(&mut result, field, order);
    result
}

/// Price per square meter, rounded to a whole number. A listing without a
/// recorded size is treated as one square meter.
pub fn price_per_sq_meter(property: &Property) -> Decimal {
    round_whole(property.price / Decimal::from(property.sq_meters.max(1)))
}

fn metric_value(
    property: &Property,
    metric: ComparisonMetric,
) -> Decimal {
    match metric {
        ComparisonMetric::Price => property.price,
        ComparisonMetric::MonthlyRent => property.monthly_rent,
        ComparisonMetric::Yield => property.gross_yield,
        ComparisonMetric::SqMeters => Decimal::from(property.sq_meters),
        ComparisonMetric::Bedrooms => Decimal::from(property.bedrooms),
        ComparisonMetric::PricePerSqMeter => property.price / Decimal::from(property.sq_meters.max(1)),
    }
}

fn compare_metric(
    properties: &[Property],
    metric: ComparisonMetric,
) -> MetricComparison {
    let exact: Vec<Decimal> = properties.iter().map(|p| metric_value(p, metric)).collect();

    let best = exact.iter().copied().reduce(|best, value| {
        let better = match value.cmp(&best) {
            Ordering::Less => metric.lower_is_better(),
            Ordering::Greater => !metric.lower_is_better(),
            Ordering::Equal => false,
        };
        if better { value } else { best }
    });

    let all_equal = exact.windows(2).all(|w| w[0] == w[1]);
    let winners = match best {
        Some(best) if properties.len() > 1 && !all_equal => exact
            .iter()
            .enumerate()
            .filter(|(_, value)| **value == best)
            .map(|(idx, _)| idx)
            .collect(),
        _ => Vec::new(),
    };

    // Winners use the exact ratio; the reported value is rounded like the
    // other currency figures.
    let values = match metric {
        ComparisonMetric::PricePerSqMeter => exact.into_iter().map(round_whole).collect(),
        _ => exact,
    };

    MetricComparison {
        metric,
        values,
        winners,
    }
}

/// Compares listings metric by metric. See [`MetricComparison`] for the
/// shape of each row.
pub fn compare_properties(properties: &[Property]) -> Vec<MetricComparison> {
    ComparisonMetric::ALL
        .iter()
        .map(|metric| compare_metric(properties, *metric))
        .collect()
}
