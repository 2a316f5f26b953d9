//! Stats module - regression helpers for trendline charts

mod calculator;

pub use calculator::{LinearFit, StatsCalculator};
