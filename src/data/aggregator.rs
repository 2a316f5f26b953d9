//! Aggregation Module
//! Derived emissions tables consumed by the chart and report layers.

use log::debug;
use polars::prelude::*;
use thiserror::Error;

/// Reference year for percentage-change comparisons.
pub const BASELINE_YEAR: i32 = 2005;
/// Most recent year compared against the baseline.
pub const FINAL_YEAR: i32 = 2019;

#[derive(Error, Debug)]
pub enum AggregateError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
}

/// Build the full derived table: one row per (la_name, year) with total
/// domestic emissions, population, area, region and the two derived ratios.
///
/// Only the "Domestic" sector contributes to the totals; industrial,
/// commercial and transport emissions are excluded. Authorities whose code
/// is absent from the region lookup drop out of the join.
pub fn full_emissions_table(
    emissions: &DataFrame,
    regions: &DataFrame,
) -> Result<DataFrame, AggregateError> {
    let domestic = emissions
        .clone()
        .lazy()
        .filter(col("sector").eq(lit("Domestic")))
        .group_by([col("la_name"), col("year")])
        .agg([col("emissions").sum().alias("total_emissions")]);

    // Population, area and region repeat across sector rows within a year,
    // so the first occurrence stands for the whole (authority, year) pair.
    let pop_area = emissions
        .clone()
        .lazy()
        .join(
            regions.clone().lazy(),
            [col("la_code")],
            [col("la_code")],
            JoinArgs::new(JoinType::Inner),
        )
        .group_by([col("la_name"), col("year")])
        .agg([
            col("la_code").first(),
            col("population").first(),
            col("area").first(),
            col("region").first(),
        ]);

    let full = pop_area
        .join(
            domestic,
            [col("la_name"), col("year")],
            [col("la_name"), col("year")],
            JoinArgs::new(JoinType::Inner),
        )
        .with_columns([
            (col("total_emissions") / col("population")).alias("emissions_per_capita"),
            (lit(1000.0) * col("population") / col("area")).alias("population_density"),
        ])
        .sort(["la_name", "year"], Default::default())
        .collect()?;

    debug!("full emissions table: {} (authority, year) rows", full.height());
    Ok(full)
}

/// Build the percentage-change table: one row per authority present in both
/// the baseline and final years.
///
/// Values are matched by an explicit filter on the year column and an inner
/// join on the authority name, never by row position within a group. An
/// authority missing either year drops out of the join.
pub fn percentage_changes(full: &DataFrame) -> Result<DataFrame, AggregateError> {
    let base = full
        .clone()
        .lazy()
        .filter(col("year").eq(lit(BASELINE_YEAR)))
        .select([
            col("la_name"),
            col("total_emissions").alias("total_emissions_2005"),
            col("emissions_per_capita").alias("pc_emissions_2005"),
            col("region"),
        ]);

    let latest = full
        .clone()
        .lazy()
        .filter(col("year").eq(lit(FINAL_YEAR)))
        .select([
            col("la_name"),
            col("total_emissions").alias("total_emissions_final"),
            col("emissions_per_capita").alias("pc_emissions_final"),
        ]);

    let changes = base
        .join(
            latest,
            [col("la_name")],
            [col("la_name")],
            JoinArgs::new(JoinType::Inner),
        )
        .with_columns([
            (lit(100.0) - col("total_emissions_final") / col("total_emissions_2005") * lit(100.0))
                .alias("total_percentage_decrease"),
            (lit(100.0) - col("pc_emissions_final") / col("pc_emissions_2005") * lit(100.0))
                .alias("pc_percentage_decrease"),
            (col("pc_emissions_2005") - col("pc_emissions_final")).alias("pc_absolute_decrease"),
        ])
        .select([
            col("la_name"),
            col("total_percentage_decrease"),
            col("pc_percentage_decrease"),
            col("pc_absolute_decrease"),
            col("total_emissions_2005"),
            col("pc_emissions_2005"),
            col("region"),
        ])
        .sort(["la_name"], Default::default())
        .collect()?;

    debug!(
        "percentage changes: {} authorities present in both {} and {}",
        changes.height(),
        BASELINE_YEAR,
        FINAL_YEAR
    );
    Ok(changes)
}

/// National total domestic emissions per year.
pub fn overall_totals(full: &DataFrame) -> Result<DataFrame, AggregateError> {
    let df = full
        .clone()
        .lazy()
        .group_by([col("year")])
        .agg([col("total_emissions").sum()])
        .sort(["year"], Default::default())
        .collect()?;
    Ok(df)
}

/// National domestic emissions per capita per year, as the ratio of the
/// national sums rather than the mean of the authority ratios.
pub fn overall_per_capita(full: &DataFrame) -> Result<DataFrame, AggregateError> {
    let df = full
        .clone()
        .lazy()
        .group_by([col("year")])
        .agg([col("total_emissions").sum(), col("population").sum()])
        .with_columns([
            (col("total_emissions") / col("population")).alias("emissions_per_capita"),
        ])
        .select([col("year"), col("emissions_per_capita")])
        .sort(["year"], Default::default())
        .collect()?;
    Ok(df)
}

/// Regional totals per year, with per-capita emissions of the sums.
pub fn region_sums(full: &DataFrame) -> Result<DataFrame, AggregateError> {
    let df = full
        .clone()
        .lazy()
        .group_by([col("region"), col("year")])
        .agg([
            col("total_emissions").sum().alias("total_domestic_emissions"),
            col("population").sum().alias("total_population"),
        ])
        .with_columns([(col("total_domestic_emissions") / col("total_population"))
            .alias("domestic_emissions_per_capita")])
        .sort(["region", "year"], Default::default())
        .collect()?;
    Ok(df)
}

/// Region sums with each year's values expressed as a fraction of the
/// region's baseline-year value. Baseline values are matched by an explicit
/// year filter, the same way as [`percentage_changes`].
pub fn region_scaled_to_baseline(sums: &DataFrame) -> Result<DataFrame, AggregateError> {
    let base = sums
        .clone()
        .lazy()
        .filter(col("year").eq(lit(BASELINE_YEAR)))
        .select([
            col("region"),
            col("total_domestic_emissions").alias("total_baseline"),
            col("domestic_emissions_per_capita").alias("pc_baseline"),
        ]);

    let df = sums
        .clone()
        .lazy()
        .join(
            base,
            [col("region")],
            [col("region")],
            JoinArgs::new(JoinType::Inner),
        )
        .with_columns([
            (col("total_domestic_emissions") / col("total_baseline")).alias("total_share_of_2005"),
            (col("domestic_emissions_per_capita") / col("pc_baseline")).alias("pc_share_of_2005"),
        ])
        .sort(["region", "year"], Default::default())
        .collect()?;
    Ok(df)
}

/// Names of the `n` authorities with the largest `column` value in `year`,
/// largest first.
pub fn top_emitters(
    full: &DataFrame,
    year: i32,
    column: &str,
    n: usize,
) -> Result<Vec<String>, AggregateError> {
    let df = full
        .clone()
        .lazy()
        .filter(col("year").eq(lit(year)))
        .sort([column], SortMultipleOptions::default().with_order_descending(true))
        .limit(n as IdxSize)
        .select([col("la_name")])
        .collect()?;
    Ok(super::frame::column_str(&df, "la_name")?)
}

/// Number of distinct authorities in the full table.
pub fn authority_count(full: &DataFrame) -> Result<usize, AggregateError> {
    Ok(full
        .column("la_name")?
        .as_materialized_series()
        .n_unique()?)
}
