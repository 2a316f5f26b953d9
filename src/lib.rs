//! UK local-authority domestic CO2 emissions statistics.
//!
//! Loads the raw emissions and administrative-code tables, derives
//! per-capita and regional aggregates with their 2005 to 2019 changes, and
//! renders a fixed chart set plus a standout report to the output
//! directory. Everything is recomputed from the source CSVs on every run.

pub mod analysis;
pub mod charts;
pub mod data;
pub mod report;
pub mod stats;
