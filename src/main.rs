//! UK Local Authority Domestic CO2 Emissions Statistics
//!
//! Recomputes the derived emissions tables from the input CSVs and renders
//! the full chart set on every run.

use std::path::Path;

use anyhow::Result;

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    la_emissions::analysis::run(Path::new("."))
}
