//! Analysis Runner
//! The fixed recompute-and-render pass: load the input tables, build the
//! derived tables, write every chart and the standout report.
//!
//! Chart selections, axis limits and colours are the analysis constants;
//! nothing here is configurable at runtime.

use std::fs;
use std::path::Path;

use anyhow::Context;
use log::info;
use plotters::prelude::{BLUE, GREEN, RED};
use plotters::style::full_palette::ORANGE;
use polars::prelude::{col, lit, IntoLazy, JoinArgs, JoinType};

use crate::charts::{self, ChartSpec, Highlight};
use crate::data::{self, frame};
use crate::report;

/// Input CSV locations relative to the project root.
pub const EMISSIONS_CSV: &str = "inputs/LA_emissions.csv";
pub const CODES_CSV: &str = "inputs/la_all_codes.csv";

/// Chart output directory relative to the project root.
pub const FIGURES_DIR: &str = "outputs/figures";
/// Standout report location relative to the project root.
pub const REPORT_PATH: &str = "outputs/standouts.json";

const HIGHLIGHT_REGION: &str = "Northern Ireland";

/// Run the whole pass. Every invocation recomputes everything from the
/// source files; no state survives between runs apart from the output files.
pub fn run(project_root: &Path) -> anyhow::Result<()> {
    let figures = project_root.join(FIGURES_DIR);
    fs::create_dir_all(&figures)
        .with_context(|| format!("creating {}", figures.display()))?;

    info!("loading input tables");
    let emissions = data::load_emissions(&project_root.join(EMISSIONS_CSV))?;
    let regions = data::load_regions(&project_root.join(CODES_CSV))?;

    info!("building derived tables");
    let full = data::full_emissions_table(&emissions, &regions)?;
    let changes = data::percentage_changes(&full)?;
    let overall_total = data::overall_totals(&full)?;
    let overall_pc = data::overall_per_capita(&full)?;
    let sums = data::region_sums(&full)?;
    let scaled = data::region_scaled_to_baseline(&sums)?;

    info!("rendering overall charts");
    charts::line_chart(
        &overall_total,
        "year",
        "total_emissions",
        160_000.0,
        BLUE,
        &ChartSpec {
            title: "Total UK domestic CO2 emissions",
            x_label: "Year",
            y_label: "Total domestic CO2 emissions (kt)",
            filename: "total.png",
        },
        &figures,
    )?;

    charts::line_chart(
        &overall_pc,
        "year",
        "emissions_per_capita",
        2.6,
        ORANGE,
        &ChartSpec {
            title: "Overall UK domestic CO2 emissions per capita",
            x_label: "Year",
            y_label: "Domestic CO2 emissions per capita (tons)",
            filename: "per_capita.png",
        },
        &figures,
    )?;

    info!("rendering regional charts");
    charts::region_lines_chart(
        &sums,
        "total_domestic_emissions",
        &[
            Highlight { region: "South East", colour: GREEN },
            Highlight { region: HIGHLIGHT_REGION, colour: RED },
        ],
        Some(22_500.0),
        false,
        &ChartSpec {
            title: "Total domestic CO2 emissions by region",
            x_label: "Year",
            y_label: "Total domestic CO2 emissions (kilotons)",
            filename: "regions_totals.png",
        },
        &figures,
    )?;

    charts::region_lines_chart(
        &sums,
        "domestic_emissions_per_capita",
        &[
            Highlight { region: HIGHLIGHT_REGION, colour: RED },
            Highlight { region: "London", colour: BLUE },
        ],
        Some(3.0),
        false,
        &ChartSpec {
            title: "Domestic CO2 emissions per capita by region",
            x_label: "Year",
            y_label: "Domestic CO2 emissions per capita (tons)",
            filename: "regions_per_capita.png",
        },
        &figures,
    )?;

    charts::region_lines_chart(
        &scaled,
        "total_share_of_2005",
        &[Highlight { region: HIGHLIGHT_REGION, colour: RED }],
        None,
        true,
        &ChartSpec {
            title: "Total domestic CO2 emissions by region",
            x_label: "Year",
            y_label: "Total emissions as a percentage of 2005 value",
            filename: "scaled_total_region.png",
        },
        &figures,
    )?;

    charts::region_lines_chart(
        &scaled,
        "pc_share_of_2005",
        &[Highlight { region: HIGHLIGHT_REGION, colour: RED }],
        None,
        true,
        &ChartSpec {
            title: "Domestic CO2 emissions per capita by region",
            x_label: "Year",
            y_label: "Per capita emissions as a percentage of 2005 value",
            filename: "scaled_pc_region.png",
        },
        &figures,
    )?;

    charts::bar_chart(
        &region_remaining_share(&scaled)?,
        "region",
        "total_share_of_2005",
        true,
        1.2,
        &ChartSpec {
            title: "2019 domestic emissions as a share of 2005, by region",
            x_label: "Region",
            y_label: "Share of 2005 emissions",
            filename: "regions_remaining_share.png",
        },
        &figures,
    )?;

    info!("rendering authority charts");
    let n_authorities = data::authority_count(&full)?;
    let la_average: Vec<(f64, f64)> = frame::xy_pairs(&overall_total, "year", "total_emissions")?
        .into_iter()
        .map(|(year, total)| (year, total / n_authorities as f64))
        .collect();

    let top_total = data::top_emitters(&full, data::BASELINE_YEAR, "total_emissions", 5)?;
    charts::multi_line_chart(
        &full,
        &top_total,
        "year",
        "total_emissions",
        &la_average,
        "LA average",
        2_500.0,
        &ChartSpec {
            title: "Domestic emissions of the five largest total emitters in 2005",
            x_label: "Year",
            y_label: "Total domestic CO2 emissions (kt)",
            filename: "biggest_emitters_total.png",
        },
        &figures,
    )?;

    let uk_average = frame::xy_pairs(&overall_pc, "year", "emissions_per_capita")?;
    let top_pc = data::top_emitters(&full, data::BASELINE_YEAR, "emissions_per_capita", 5)?;
    charts::multi_line_chart(
        &full,
        &top_pc,
        "year",
        "emissions_per_capita",
        &uk_average,
        "UK overall",
        4.5,
        &ChartSpec {
            title: "Domestic emissions of the five largest per capita emitters in 2005",
            x_label: "Year",
            y_label: "Domestic CO2 emissions per capita (tons)",
            filename: "biggest_emitters_per_capita.png",
        },
        &figures,
    )?;

    charts::region_split_scatter(
        &changes,
        "total_emissions_2005",
        "total_percentage_decrease",
        HIGHLIGHT_REGION,
        "Northern Irish LAs",
        2_500.0,
        60.0,
        &ChartSpec {
            title: "CO2 reductions 2005-19 vs total domestic emissions in 2005",
            x_label: "Total domestic emissions in 2005 (kt CO2)",
            y_label: "Percentage reduction in total domestic CO2 emissions, 2005-19",
            filename: "la_percentage_reductions_by_total.png",
        },
        &figures,
    )?;

    charts::region_split_scatter(
        &changes,
        "pc_emissions_2005",
        "pc_percentage_decrease",
        HIGHLIGHT_REGION,
        "Northern Irish LAs",
        4.5,
        70.0,
        &ChartSpec {
            title: "CO2 reductions 2005-19 vs per capita emissions in 2005",
            x_label: "Domestic CO2 emissions per capita in 2005 (tons)",
            y_label: "Percentage reduction in domestic CO2 emissions per capita, 2005-19",
            filename: "la_percentage_reduction_per_capita.png",
        },
        &figures,
    )?;

    let latest = full
        .clone()
        .lazy()
        .filter(col("year").eq(lit(data::FINAL_YEAR)))
        .collect()?;

    charts::scatter_with_trendline(
        &latest,
        "population_density",
        "emissions_per_capita",
        3,
        2.5,
        &ChartSpec {
            title: "Household CO2 emissions per capita vs population density",
            x_label: "2019 population density (people/km2)",
            y_label: "2019 household emissions per capita (t CO2 per person)",
            filename: "emissions_vs_pop_density.png",
        },
        &figures,
    )?;

    let density_changes = latest
        .clone()
        .lazy()
        .select([col("la_name"), col("population_density")])
        .join(
            changes.clone().lazy(),
            [col("la_name")],
            [col("la_name")],
            JoinArgs::new(JoinType::Inner),
        )
        .collect()?;

    charts::scatter_with_trendline(
        &density_changes,
        "population_density",
        "pc_percentage_decrease",
        3,
        65.0,
        &ChartSpec {
            title: "Percentage decrease in per capita emissions vs population density",
            x_label: "2019 population density (people/km2)",
            y_label: "Percentage decrease in domestic CO2 emissions per capita, 2005-19",
            filename: "population_density_pc.png",
        },
        &figures,
    )?;

    info!("writing standout report");
    let standouts = report::standout_report(&changes, &full)?;
    report::write_report(&standouts, &project_root.join(REPORT_PATH))?;

    info!("analysis complete");
    Ok(())
}

/// Each region's 2019 total emissions as a fraction of its 2005 value,
/// one row per region, sorted by region name.
fn region_remaining_share(scaled: &polars::prelude::DataFrame) -> anyhow::Result<polars::prelude::DataFrame> {
    Ok(scaled
        .clone()
        .lazy()
        .filter(col("year").eq(lit(data::FINAL_YEAR)))
        .select([col("region"), col("total_share_of_2005")])
        .sort(["region"], Default::default())
        .collect()?)
}
