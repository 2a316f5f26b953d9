//! End-to-end pipeline tests over CSV fixtures.

use std::fs;
use std::path::Path;

use polars::prelude::*;
use tempfile::tempdir;

use la_emissions::analysis;
use la_emissions::charts::{self, ChartSpec};
use la_emissions::data::{self, frame};

const EMISSIONS_CSV: &str = "\
Country,Local Authority,Local Authority Code,Calendar Year,LA CO2 Sector,LA CO2 Sub-sector,Territorial emissions (kt CO2),Mid-year Population (thousands),Area (km2)
England,Ashford,E07000105,2005,Domestic,Domestic Gas,600.0,100.0,500.0
England,Ashford,E07000105,2005,Domestic,Domestic Electricity,400.0,100.0,500.0
England,Ashford,E07000105,2005,Industry,Industry Gas,300.0,100.0,500.0
England,Ashford,E07000105,2019,Domestic,Domestic Gas,400.0,110.0,500.0
England,Ashford,E07000105,2019,Domestic,Domestic Electricity,300.0,110.0,500.0
Northern Ireland,Belfast,N09000003,2005,Domestic,Domestic Gas,800.0,200.0,100.0
Northern Ireland,Belfast,N09000003,2019,Domestic,Domestic Gas,600.0,210.0,100.0
Wales,Cardiff,W06000015,2005,Domestic,Domestic Gas,500.0,150.0,140.0
Wales,Cardiff,W06000015,2019,Domestic,Domestic Gas,350.0,155.0,140.0
England,Unallocated electricity,,2005,Domestic,Domestic Electricity,50.0,,
England,Unallocated consumption,E00000000,2019,Domestic,Domestic Gas,25.0,,
";

const CODES_CSV: &str = "\
LADCD,LADNM,RGNNM,CTRYNM
E07000105,Ashford,South East,England
N09000003,Belfast,,Northern Ireland
W06000015,Cardiff,,Wales
";

fn write_inputs(root: &Path) {
    fs::create_dir_all(root.join("inputs")).unwrap();
    fs::write(root.join(analysis::EMISSIONS_CSV), EMISSIONS_CSV).unwrap();
    fs::write(root.join(analysis::CODES_CSV), CODES_CSV).unwrap();
}

fn load_tables(root: &Path) -> (DataFrame, DataFrame) {
    let emissions = data::load_emissions(&root.join(analysis::EMISSIONS_CSV)).unwrap();
    let regions = data::load_regions(&root.join(analysis::CODES_CSV)).unwrap();
    (emissions, regions)
}

#[test]
fn loader_drops_unattributed_rows() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());
    let (emissions, _) = load_tables(dir.path());

    // One row has no authority code, one is an "Unallocated" bucket.
    assert_eq!(emissions.height(), 9);

    let names = frame::column_str(&emissions, "la_name").unwrap();
    assert!(names.iter().all(|n| !n.contains("Unallocated")));
    assert!(emissions.column("emissions").is_ok());
    assert!(emissions.column("population").is_ok());
}

#[test]
fn region_lookup_falls_back_to_country_name() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());
    let (_, regions) = load_tables(dir.path());

    let codes = frame::column_str(&regions, "la_code").unwrap();
    let names = frame::column_str(&regions, "region").unwrap();
    let belfast = codes.iter().position(|c| c == "N09000003").unwrap();
    assert_eq!(names[belfast], "Northern Ireland");
    let ashford = codes.iter().position(|c| c == "E07000105").unwrap();
    assert_eq!(names[ashford], "South East");
}

#[test]
fn derived_tables_hold_the_pipeline_invariants() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());
    let (emissions, regions) = load_tables(dir.path());

    let full = data::full_emissions_table(&emissions, &regions).unwrap();

    // Three authorities in two years each; the unattributed rows are gone.
    assert_eq!(full.height(), 6);
    let names = frame::column_str(&full, "la_name").unwrap();
    assert!(names.iter().all(|n| !n.contains("Unallocated")));

    let totals = frame::column_f64(&full, "total_emissions").unwrap();
    let pops = frame::column_f64(&full, "population").unwrap();
    let areas = frame::column_f64(&full, "area").unwrap();
    let per_capita = frame::column_f64(&full, "emissions_per_capita").unwrap();
    let density = frame::column_f64(&full, "population_density").unwrap();
    for i in 0..full.height() {
        assert_eq!(per_capita[i], totals[i] / pops[i]);
        assert_eq!(density[i], 1000.0 * pops[i] / areas[i]);
    }

    // 1000 kt down to 700 kt is exactly a 30% decrease.
    let changes = data::percentage_changes(&full).unwrap();
    let ashford = changes
        .clone()
        .lazy()
        .filter(col("la_name").eq(lit("Ashford")))
        .collect()
        .unwrap();
    assert_eq!(
        frame::column_f64(&ashford, "total_percentage_decrease").unwrap()[0],
        30.0
    );
}

#[test]
fn chart_functions_write_a_png() {
    let dir = tempdir().unwrap();
    let series = df!(
        "year" => [2005, 2010, 2015, 2019],
        "total_emissions" => [100.0, 90.0, 80.0, 70.0],
    )
    .unwrap();

    charts::line_chart(
        &series,
        "year",
        "total_emissions",
        120.0,
        plotters::prelude::BLUE,
        &ChartSpec {
            title: "Total emissions",
            x_label: "Year",
            y_label: "Emissions (kt)",
            filename: "smoke.png",
        },
        dir.path(),
    )
    .unwrap();

    let bytes = fs::read(dir.path().join("smoke.png")).unwrap();
    assert_eq!(&bytes[..4], b"\x89PNG");
}

#[test]
fn full_run_writes_every_output() {
    let dir = tempdir().unwrap();
    write_inputs(dir.path());

    analysis::run(dir.path()).unwrap();

    let figures = dir.path().join(analysis::FIGURES_DIR);
    for name in [
        "total.png",
        "per_capita.png",
        "regions_totals.png",
        "regions_per_capita.png",
        "scaled_total_region.png",
        "scaled_pc_region.png",
        "regions_remaining_share.png",
        "biggest_emitters_total.png",
        "biggest_emitters_per_capita.png",
        "la_percentage_reductions_by_total.png",
        "la_percentage_reduction_per_capita.png",
        "emissions_vs_pop_density.png",
        "population_density_pc.png",
    ] {
        let bytes = fs::read(figures.join(name)).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG", "{name} is not a PNG");
    }

    let report: serde_json::Value =
        serde_json::from_str(&fs::read_to_string(dir.path().join(analysis::REPORT_PATH)).unwrap())
            .unwrap();
    // All three authorities have both comparison years, so they all rank.
    assert_eq!(report["highest_per_capita_2019"].as_array().unwrap().len(), 3);
    assert!(report["small_total_reductions"].is_array());
}
