//! Static Chart Renderer
//! Renders the fixed chart family to PNG files with plotters.
//!
//! Every function here is a pure sink: it takes a derived table plus
//! caller-supplied constants (labels, fixed axis limits, colours, output
//! filename), writes exactly one image and returns nothing. Axis ranges and
//! colours are never inferred from the data unless the caller leaves them
//! unset.

use std::path::Path;

use anyhow::Result;
use log::{info, warn};
use plotters::prelude::*;
use plotters::style::full_palette::GREY;
use plotters::style::text_anchor::{HPos, Pos, VPos};
use plotters::style::FontTransform;
use polars::prelude::{col, lit, DataFrame, IntoLazy};

use crate::data::frame;
use crate::stats::StatsCalculator;

/// Output image size, matching the default matplotlib figure at 100 DPI.
const FIGURE_SIZE: (u32, u32) = (640, 480);

const CAPTION_FONT: (&str, i32) = ("sans-serif", 18);
const LABEL_FONT: (&str, i32) = ("sans-serif", 13);

/// Line colours cycled through for multi-authority charts.
pub const PALETTE: [RGBColor; 10] = [
    RGBColor(31, 119, 180),  // Blue
    RGBColor(255, 127, 14),  // Orange
    RGBColor(44, 160, 44),   // Green
    RGBColor(214, 39, 40),   // Red
    RGBColor(148, 103, 189), // Purple
    RGBColor(140, 86, 75),   // Brown
    RGBColor(227, 119, 194), // Pink
    RGBColor(127, 127, 127), // Grey
    RGBColor(188, 189, 34),  // Olive
    RGBColor(23, 190, 207),  // Cyan
];

/// Axis labels, title and output filename for one chart.
pub struct ChartSpec<'a> {
    pub title: &'a str,
    pub x_label: &'a str,
    pub y_label: &'a str,
    pub filename: &'a str,
}

/// A region drawn in its own colour on a region-lines chart.
pub struct Highlight<'a> {
    pub region: &'a str,
    pub colour: RGBColor,
}

fn extent(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    let mut min = f64::INFINITY;
    let mut max = f64::NEG_INFINITY;
    for v in values {
        if v.is_finite() {
            min = min.min(v);
            max = max.max(v);
        }
    }
    (min <= max).then_some((min, max))
}

fn series_for(data: &DataFrame, key: &str, value: &str, x: &str, y: &str) -> Result<Vec<(f64, f64)>> {
    let df = data
        .clone()
        .lazy()
        .filter(col(key).eq(lit(value)))
        .collect()?;
    Ok(frame::xy_pairs(&df, x, y)?)
}

/// Single-line chart with a caller-supplied colour and y limit.
pub fn line_chart(
    data: &DataFrame,
    x: &str,
    y: &str,
    y_max: f64,
    colour: RGBColor,
    spec: &ChartSpec,
    out_dir: &Path,
) -> Result<()> {
    let series = frame::xy_pairs(data, x, y)?;
    let (x_min, x_max) = extent(series.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));

    let path = out_dir.join(spec.filename);
    let root = BitMapBackend::new(&path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .label_style(LABEL_FONT)
        .draw()?;

    chart.draw_series(LineSeries::new(series, &colour))?;

    root.present()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// One line per named authority plus a grey, translucent average overlay.
///
/// Authorities are drawn and listed in the order given, cycling through the
/// palette; the average series is caller-supplied rather than derived here.
pub fn multi_line_chart(
    data: &DataFrame,
    las: &[String],
    x: &str,
    y: &str,
    average: &[(f64, f64)],
    average_label: &str,
    y_max: f64,
    spec: &ChartSpec,
    out_dir: &Path,
) -> Result<()> {
    let mut lines: Vec<(String, Vec<(f64, f64)>)> = Vec::with_capacity(las.len());
    for la in las {
        lines.push((la.clone(), series_for(data, "la_name", la, x, y)?));
    }

    let xs = lines
        .iter()
        .flat_map(|(_, pts)| pts.iter().map(|p| p.0))
        .chain(average.iter().map(|p| p.0));
    let (x_min, x_max) = extent(xs).unwrap_or((0.0, 1.0));

    let path = out_dir.join(spec.filename);
    let root = BitMapBackend::new(&path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .label_style(LABEL_FONT)
        .draw()?;

    for (i, (name, pts)) in lines.iter().enumerate() {
        let colour = PALETTE[i % PALETTE.len()];
        chart
            .draw_series(LineSeries::new(pts.iter().copied(), &colour))?
            .label(name)
            .legend(move |(lx, ly)| {
                PathElement::new(vec![(lx, ly), (lx + 20, ly)], ShapeStyle::from(&colour))
            });
    }

    chart
        .draw_series(LineSeries::new(average.iter().copied(), &GREY.mix(0.3)))?
        .label(average_label)
        .legend(|(lx, ly)| {
            PathElement::new(vec![(lx, ly), (lx + 20, ly)], ShapeStyle::from(&GREY.mix(0.3)))
        });

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Scatter with a red least-squares trendline and an R² annotation placed at
/// 70%/50% of the axes.
pub fn scatter_with_trendline(
    data: &DataFrame,
    x: &str,
    y: &str,
    point_size: i32,
    y_max: f64,
    spec: &ChartSpec,
    out_dir: &Path,
) -> Result<()> {
    let points = frame::xy_pairs(data, x, y)?;
    let xs: Vec<f64> = points.iter().map(|p| p.0).collect();
    let ys: Vec<f64> = points.iter().map(|p| p.1).collect();
    let (x_min, x_max) = extent(xs.iter().copied()).unwrap_or((0.0, 1.0));

    let path = out_dir.join(spec.filename);
    let root = BitMapBackend::new(&path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .label_style(LABEL_FONT)
        .draw()?;

    chart.draw_series(
        points
            .iter()
            .map(|&(px, py)| Circle::new((px, py), point_size, BLUE.filled())),
    )?;

    if let Some(fit) = StatsCalculator::linear_fit(&xs, &ys) {
        chart.draw_series(LineSeries::new(
            vec![(x_min, fit.predict(x_min)), (x_max, fit.predict(x_max))],
            &RED,
        ))?;

        let predicted: Vec<f64> = xs.iter().map(|&v| fit.predict(v)).collect();
        let r2 = StatsCalculator::r_squared(&ys, &predicted);
        chart.draw_series(std::iter::once(Text::new(
            format!("R\u{00b2} = {:.2}", r2),
            (x_min + 0.7 * (x_max - x_min), 0.5 * y_max),
            ("sans-serif", 15).into_font().color(&RED),
        )))?;
    } else {
        warn!("{}: too few points for a trendline", spec.filename);
    }

    root.present()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// Scatter with the rows matching one region drawn in red over the rest.
pub fn region_split_scatter(
    data: &DataFrame,
    x: &str,
    y: &str,
    highlight_region: &str,
    highlight_label: &str,
    x_max: f64,
    y_max: f64,
    spec: &ChartSpec,
    out_dir: &Path,
) -> Result<()> {
    let background = data
        .clone()
        .lazy()
        .filter(col("region").neq(lit(highlight_region)))
        .collect()?;
    let highlighted = data
        .clone()
        .lazy()
        .filter(col("region").eq(lit(highlight_region)))
        .collect()?;
    let bg = frame::xy_pairs(&background, x, y)?;
    let hl = frame::xy_pairs(&highlighted, x, y)?;

    let path = out_dir.join(spec.filename);
    let root = BitMapBackend::new(&path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(0.0..x_max, 0.0..y_max)?;
    chart
        .configure_mesh()
        .x_desc(spec.x_label)
        .y_desc(spec.y_label)
        .label_style(LABEL_FONT)
        .draw()?;

    chart.draw_series(
        bg.iter()
            .map(|&(px, py)| Circle::new((px, py), 2, BLUE.mix(0.5).filled())),
    )?;
    chart
        .draw_series(
            hl.iter()
                .map(|&(px, py)| Circle::new((px, py), 2, RED.mix(0.5).filled())),
        )?
        .label(highlight_label)
        .legend(|(lx, ly)| Circle::new((lx + 10, ly), 3, RED.filled()));

    chart
        .configure_series_labels()
        .position(SeriesLabelPosition::LowerRight)
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// One line per region, non-highlighted regions in thin grey, highlighted
/// regions in their own colour with a legend entry.
///
/// With `y_max` unset the y axis scales to the data; with `percent_axis` the
/// y labels render fractional values as percentages.
pub fn region_lines_chart(
    data: &DataFrame,
    y_column: &str,
    highlights: &[Highlight],
    y_max: Option<f64>,
    percent_axis: bool,
    spec: &ChartSpec,
    out_dir: &Path,
) -> Result<()> {
    let all_pairs = frame::xy_pairs(data, "year", y_column)?;
    let (x_min, x_max) = extent(all_pairs.iter().map(|p| p.0)).unwrap_or((0.0, 1.0));
    let y_upper = match y_max {
        Some(v) => v,
        None => extent(all_pairs.iter().map(|p| p.1))
            .map(|(_, hi)| hi * 1.05)
            .unwrap_or(1.0),
    };

    let regions = frame::unique_str(data, "region")?;

    let path = out_dir.join(spec.filename);
    let root = BitMapBackend::new(&path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(40)
        .y_label_area_size(60)
        .build_cartesian_2d(x_min..x_max, 0.0..y_upper)?;

    let percent_fmt = |v: &f64| format!("{:.0}%", v * 100.0);
    {
        let mut mesh = chart.configure_mesh();
        mesh.x_desc(spec.x_label)
            .y_desc(spec.y_label)
            .label_style(LABEL_FONT);
        if percent_axis {
            mesh.y_label_formatter(&percent_fmt);
        }
        mesh.draw()?;
    }

    for region in &regions {
        if highlights.iter().any(|h| h.region == region.as_str()) {
            continue;
        }
        let pts = series_for(data, "region", region, "year", y_column)?;
        chart.draw_series(LineSeries::new(pts, &GREY))?;
    }

    for h in highlights {
        let pts = series_for(data, "region", h.region, "year", y_column)?;
        let colour = h.colour;
        chart
            .draw_series(LineSeries::new(
                pts,
                ShapeStyle::from(&h.colour).stroke_width(2),
            ))?
            .label(h.region)
            .legend(move |(lx, ly)| {
                PathElement::new(
                    vec![(lx, ly), (lx + 20, ly)],
                    ShapeStyle::from(&colour).stroke_width(2),
                )
            });
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;

    root.present()?;
    info!("wrote {}", path.display());
    Ok(())
}

/// One bar per category with a value label above each bar.
///
/// With `percentages` set, values are fractions and both the y labels and
/// the bar labels render as percentages.
pub fn bar_chart(
    data: &DataFrame,
    category: &str,
    y: &str,
    percentages: bool,
    y_max: f64,
    spec: &ChartSpec,
    out_dir: &Path,
) -> Result<()> {
    let categories = frame::column_str(data, category)?;
    let values = frame::column_f64(data, y)?;
    let n = categories.len() as i32;

    let path = out_dir.join(spec.filename);
    let root = BitMapBackend::new(&path, FIGURE_SIZE).into_drawing_area();
    root.fill(&WHITE)?;

    let mut chart = ChartBuilder::on(&root)
        .caption(spec.title, CAPTION_FONT)
        .margin(10)
        .x_label_area_size(110)
        .y_label_area_size(60)
        .build_cartesian_2d((0..n).into_segmented(), 0.0..y_max)?;

    let category_fmt = |seg: &SegmentValue<i32>| match seg {
        SegmentValue::CenterOf(i) if *i >= 0 => categories
            .get(*i as usize)
            .cloned()
            .unwrap_or_default(),
        _ => String::new(),
    };
    let percent_fmt = |v: &f64| format!("{:.0}%", v * 100.0);
    {
        let mut mesh = chart.configure_mesh();
        mesh.disable_x_mesh()
            .x_labels(categories.len())
            .x_label_formatter(&category_fmt)
            .x_label_style(
                ("sans-serif", 10)
                    .into_font()
                    .transform(FontTransform::Rotate90),
            )
            .y_desc(spec.y_label)
            .label_style(LABEL_FONT);
        if percentages {
            mesh.y_label_formatter(&percent_fmt);
        }
        mesh.draw()?;
    }

    for (i, &v) in values.iter().enumerate() {
        chart.draw_series(std::iter::once(Rectangle::new(
            [
                (SegmentValue::Exact(i as i32), 0.0),
                (SegmentValue::Exact(i as i32 + 1), v),
            ],
            PALETTE[0].filled(),
        )))?;
    }

    let label_style = TextStyle::from(("sans-serif", 12).into_font())
        .pos(Pos::new(HPos::Center, VPos::Bottom));
    let offset = if percentages { 0.03 } else { 0.1 };
    for (i, &v) in values.iter().enumerate() {
        let label = if percentages {
            format!("{:.2}%", v * 100.0)
        } else {
            format!("{:.2}", v)
        };
        chart.draw_series(std::iter::once(Text::new(
            label,
            (SegmentValue::CenterOf(i as i32), v + offset),
            label_style.clone(),
        )))?;
    }

    root.present()?;
    info!("wrote {}", path.display());
    Ok(())
}
