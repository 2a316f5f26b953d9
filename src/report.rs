//! Standout Report
//! Persists the notable-authority queries as a JSON document.

use std::fs::File;
use std::io::BufWriter;
use std::path::Path;

use log::info;
use polars::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::data::{frame, FINAL_YEAR};

/// Total reduction below this marks an authority as lagging.
const LOW_TOTAL_DECREASE: f64 = 30.0;
/// Reduction above this counts as large.
const LARGE_DECREASE: f64 = 45.0;
/// 2005 total emissions above this mark a large emitter (kt).
const LARGE_TOTAL_2005: f64 = 1300.0;
/// 2005 per-capita emissions above this mark a heavy per-capita emitter (t).
const LARGE_PC_2005: f64 = 3.5;
/// Entries in each per-capita ranking.
const RANKING_SIZE: usize = 10;

#[derive(Error, Debug)]
pub enum ReportError {
    #[error("Polars error: {0}")]
    PolarsError(#[from] PolarsError),
    #[error("Failed to write report: {0}")]
    Io(#[from] std::io::Error),
    #[error("Failed to serialize report: {0}")]
    Json(#[from] serde_json::Error),
}

/// One authority's 2005 to 2019 change figures.
#[derive(Debug, Clone, Serialize)]
pub struct AuthorityChange {
    pub la_name: String,
    pub region: String,
    pub total_emissions_2005: f64,
    pub pc_emissions_2005: f64,
    pub total_percentage_decrease: f64,
    pub pc_percentage_decrease: f64,
    pub pc_absolute_decrease: f64,
}

/// One authority's per-capita emissions in the final year.
#[derive(Debug, Clone, Serialize)]
pub struct PerCapitaEntry {
    pub la_name: String,
    pub emissions_per_capita: f64,
}

#[derive(Debug, Serialize)]
pub struct StandoutReport {
    pub small_total_reductions: Vec<AuthorityChange>,
    pub large_reductions_from_high_totals: Vec<AuthorityChange>,
    pub large_reductions_from_high_per_capita: Vec<AuthorityChange>,
    pub highest_per_capita_2019: Vec<PerCapitaEntry>,
    pub lowest_per_capita_2019: Vec<PerCapitaEntry>,
}

/// Pull the standout authorities out of the derived tables.
pub fn standout_report(
    changes: &DataFrame,
    full: &DataFrame,
) -> Result<StandoutReport, ReportError> {
    let small = changes
        .clone()
        .lazy()
        .filter(col("total_percentage_decrease").lt(lit(LOW_TOTAL_DECREASE)))
        .collect()?;

    let large_total = changes
        .clone()
        .lazy()
        .filter(
            col("total_percentage_decrease")
                .gt(lit(LARGE_DECREASE))
                .and(col("total_emissions_2005").gt(lit(LARGE_TOTAL_2005))),
        )
        .collect()?;

    let large_pc = changes
        .clone()
        .lazy()
        .filter(
            col("pc_percentage_decrease")
                .gt(lit(LARGE_DECREASE))
                .and(col("pc_emissions_2005").gt(lit(LARGE_PC_2005))),
        )
        .collect()?;

    let ranked = full
        .clone()
        .lazy()
        .filter(col("year").eq(lit(FINAL_YEAR)))
        .sort(
            ["emissions_per_capita"],
            SortMultipleOptions::default().with_order_descending(true),
        )
        .select([col("la_name"), col("emissions_per_capita")])
        .collect()?;

    Ok(StandoutReport {
        small_total_reductions: change_rows(&small)?,
        large_reductions_from_high_totals: change_rows(&large_total)?,
        large_reductions_from_high_per_capita: change_rows(&large_pc)?,
        highest_per_capita_2019: ranking_rows(&ranked.head(Some(RANKING_SIZE)))?,
        lowest_per_capita_2019: ranking_rows(&ranked.tail(Some(RANKING_SIZE)))?,
    })
}

/// Write the report as pretty-printed JSON.
pub fn write_report(report: &StandoutReport, path: &Path) -> Result<(), ReportError> {
    let file = File::create(path)?;
    serde_json::to_writer_pretty(BufWriter::new(file), report)?;
    info!("wrote {}", path.display());
    Ok(())
}

fn change_rows(df: &DataFrame) -> Result<Vec<AuthorityChange>, ReportError> {
    let la_names = frame::column_str(df, "la_name")?;
    let regions = frame::column_str(df, "region")?;
    let total_2005 = frame::column_f64(df, "total_emissions_2005")?;
    let pc_2005 = frame::column_f64(df, "pc_emissions_2005")?;
    let total_dec = frame::column_f64(df, "total_percentage_decrease")?;
    let pc_dec = frame::column_f64(df, "pc_percentage_decrease")?;
    let pc_abs = frame::column_f64(df, "pc_absolute_decrease")?;

    Ok((0..df.height())
        .map(|i| AuthorityChange {
            la_name: la_names[i].clone(),
            region: regions[i].clone(),
            total_emissions_2005: total_2005[i],
            pc_emissions_2005: pc_2005[i],
            total_percentage_decrease: total_dec[i],
            pc_percentage_decrease: pc_dec[i],
            pc_absolute_decrease: pc_abs[i],
        })
        .collect())
}

fn ranking_rows(df: &DataFrame) -> Result<Vec<PerCapitaEntry>, ReportError> {
    let la_names = frame::column_str(df, "la_name")?;
    let per_capita = frame::column_f64(df, "emissions_per_capita")?;

    Ok((0..df.height())
        .map(|i| PerCapitaEntry {
            la_name: la_names[i].clone(),
            emissions_per_capita: per_capita[i],
        })
        .collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_changes() -> DataFrame {
        df!(
            "la_name" => ["Arun", "Barnet", "Craven", "Derby"],
            "total_percentage_decrease" => [25.0, 50.0, 35.0, 48.0],
            "pc_percentage_decrease" => [20.0, 40.0, 50.0, 48.0],
            "pc_absolute_decrease" => [0.5, 1.5, 2.0, 1.8],
            "total_emissions_2005" => [900.0, 1400.0, 400.0, 1200.0],
            "pc_emissions_2005" => [2.5, 3.0, 4.0, 3.4],
            "region" => ["South East", "London", "Yorkshire and The Humber", "East Midlands"],
        )
        .unwrap()
    }

    fn sample_full() -> DataFrame {
        df!(
            "la_name" => ["Arun", "Barnet", "Craven", "Derby"],
            "year" => [2019, 2019, 2019, 2019],
            "emissions_per_capita" => [2.0, 1.8, 2.4, 1.6],
        )
        .unwrap()
    }

    #[test]
    fn thresholds_pick_the_standouts() {
        let report = standout_report(&sample_changes(), &sample_full()).unwrap();

        let names: Vec<&str> = report
            .small_total_reductions
            .iter()
            .map(|c| c.la_name.as_str())
            .collect();
        assert_eq!(names, vec!["Arun"]);

        // Barnet is the only large reducer that was also a large 2005 emitter.
        let names: Vec<&str> = report
            .large_reductions_from_high_totals
            .iter()
            .map(|c| c.la_name.as_str())
            .collect();
        assert_eq!(names, vec!["Barnet"]);

        // Craven reduced per-capita emissions by half from a high base;
        // Derby's 48% decrease misses the 3.5 t baseline threshold.
        let names: Vec<&str> = report
            .large_reductions_from_high_per_capita
            .iter()
            .map(|c| c.la_name.as_str())
            .collect();
        assert_eq!(names, vec!["Craven"]);
    }

    #[test]
    fn rankings_are_ordered_by_per_capita() {
        let report = standout_report(&sample_changes(), &sample_full()).unwrap();

        let highest: Vec<&str> = report
            .highest_per_capita_2019
            .iter()
            .map(|e| e.la_name.as_str())
            .collect();
        assert_eq!(highest, vec!["Craven", "Arun", "Barnet", "Derby"]);
        assert_eq!(report.highest_per_capita_2019[0].emissions_per_capita, 2.4);
    }

    #[test]
    fn report_serializes_to_json() {
        let report = standout_report(&sample_changes(), &sample_full()).unwrap();
        let json = serde_json::to_string(&report).unwrap();
        assert!(json.contains("\"small_total_reductions\""));
        assert!(json.contains("\"Arun\""));
    }
}
