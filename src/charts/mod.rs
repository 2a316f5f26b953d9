//! Charts module - static chart rendering

mod renderer;

pub use renderer::{
    bar_chart, line_chart, multi_line_chart, region_lines_chart, region_split_scatter,
    scatter_with_trendline, ChartSpec, Highlight, PALETTE,
};
