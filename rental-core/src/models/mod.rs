mod calculator;
mod data_source;
mod listing;
mod neighborhood_stats;
mod property;

pub use calculator::{CalculatorInputs, CalculatorResults};
pub use data_source::{DataSource, ScraperStats, ScraperStatus};
pub use listing::{
    ComparisonMetric, FilterOptions, MetricComparison, ParseSortError, SortField, SortOrder,
};
pub use neighborhood_stats::{MarketSummary, NeighborhoodStats};
pub use property::{NewProperty, Property, PropertyUpdate, PropertyValidationError};
