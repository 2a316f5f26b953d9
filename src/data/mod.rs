//! Data module - CSV loading and aggregation

pub mod frame;

mod aggregator;
mod loader;

pub use aggregator::{
    authority_count, full_emissions_table, overall_per_capita, overall_totals,
    percentage_changes, region_scaled_to_baseline, region_sums, top_emitters, AggregateError,
    BASELINE_YEAR, FINAL_YEAR,
};
pub use loader::{load_emissions, load_regions, LoaderError};
