//! CSV Data Loader Module
//! Reads the raw emissions and administrative-code tables using Polars.

use log::debug;
use polars::prelude::*;
use std::path::Path;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Failed to load CSV: {0}")]
    CsvError(#[from] PolarsError),
}

/// Load the raw local-authority emissions table.
///
/// Selects and renames the fixed column subset, drops rows without a local
/// authority code, and removes rows whose authority name contains
/// "Unallocated". Those rows hold emissions not attributed to any specific
/// authority and are out of scope for authority-level analysis.
pub fn load_emissions(path: &Path) -> Result<DataFrame, LoaderError> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .select([
            col("Country").alias("country"),
            col("Local Authority").alias("la_name"),
            col("Local Authority Code").alias("la_code"),
            col("Calendar Year").alias("year"),
            col("LA CO2 Sector").alias("sector"),
            col("LA CO2 Sub-sector").alias("subsector"),
            col("Territorial emissions (kt CO2)").alias("emissions"),
            col("Mid-year Population (thousands)").alias("population"),
            col("Area (km2)").alias("area"),
        ])
        .drop_nulls(Some(vec![col("la_code")]))
        .filter(
            col("la_name")
                .str()
                .contains_literal(lit("Unallocated"))
                .not(),
        )
        .collect()?;

    debug!("loaded {} emissions rows from {}", df.height(), path.display());
    Ok(df)
}

/// Load the administrative-code table and build the region lookup.
///
/// One row per local authority code. English authorities carry their region
/// name; devolved-nation authorities have no region recorded, so the country
/// name stands in.
pub fn load_regions(path: &Path) -> Result<DataFrame, LoaderError> {
    let df = LazyCsvReader::new(path)
        .with_infer_schema_length(Some(10000))
        .with_ignore_errors(true)
        .finish()?
        .select([
            col("LADCD").alias("la_code"),
            col("RGNNM").fill_null(col("CTRYNM")).alias("region"),
        ])
        .collect()?;

    debug!("loaded {} region codes from {}", df.height(), path.display());
    Ok(df)
}
