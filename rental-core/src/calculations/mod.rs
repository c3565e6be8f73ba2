//! Pure rental-investment calculations.
//!
//! Every function here is a deterministic function of its arguments: no I/O,
//! no shared state, safe to call from any number of threads.

pub mod common;
pub mod investment;
pub mod listing;
pub mod neighborhood;

pub use investment::{CLOSING_COST_RATE, calculate_investment, monthly_mortgage};
pub use listing::{
    compare_properties, filter_properties, matches_filters, price_per_sq_meter, query_properties,
    sort_properties,
};
pub use neighborhood::{calculate_neighborhood_stats, market_summary, top_neighborhoods};
