//! Bump chart library
//!
//! Computes the geometry of a bump chart (rank over time) from a polars
//! DataFrame and hands the drawable primitives to a `DrawingSurface`.
//!
//! Module organization:
//! - `chart`: ranks, trajectories, curves, labels and styling
//! - `config`: chart configuration from properties
//! - `pipeline`: end-to-end layout and rendering
//! - `render`: drawing surface abstraction and the recording surface

pub mod chart;
pub mod config;
pub mod pipeline;
pub mod render;

pub use chart::{
    validate_dataframe, BumpChartError, ColumnKeys, Result, ShowLabels, TieMethod,
};
pub use chart::data::prepare_data;
pub use config::ChartConfig;
pub use pipeline::{
    build_layout, calculate_ranks, draw_layout, render_bump_chart, render_bump_chart_on,
    BumpChart, ChartLayout,
};
pub use render::{DrawingSurface, RecordingSurface};
