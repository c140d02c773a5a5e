//! Bump chart pipeline
//!
//! The pipeline:
//! 1. Validates the table and resolves ranks
//! 2. Builds one trajectory per entity
//! 3. Interpolates curves and places endpoint labels
//! 4. Styles entities and hands primitives to a `DrawingSurface`
//!
//! Everything that can fail happens in `build_layout`, so a surface never
//! receives a partial chart.

use crate::chart::colors::{draw_order, entity_styles, palette_colors, EntityStyle};
use crate::chart::{
    prepare_data, ColumnKeys, Curve, CurveInterpolator, LabelPlacer, LabelSlot, Point,
    RankResolver, Result, TieMethod, TimeAxis, Trajectory, TrajectoryBuilder,
};
use crate::config::ChartConfig;
use crate::render::{
    AxesFrame, DrawingSurface, LineStyle, MarkerStyle, RecordingSurface, TextStyle,
};
use polars::prelude::DataFrame;
use serde::Serialize;
use tracing::debug;

/// Complete chart geometry, independent of any surface
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartLayout {
    pub time_axis: TimeAxis,
    /// One per entity, in order of first appearance
    pub trajectories: Vec<Trajectory>,
    /// Aligned with `trajectories`
    pub curves: Vec<Curve>,
    pub labels: Vec<LabelSlot>,
    /// Aligned with `trajectories`
    pub styles: Vec<EntityStyle>,
    pub frame: AxesFrame,
    pub show_points: bool,
    pub label_font_size: f64,
}

/// A rendered chart: its layout and the surface it was drawn on
#[derive(Debug)]
pub struct BumpChart<S> {
    pub layout: ChartLayout,
    pub surface: S,
}

/// Compute the chart layout without drawing anything
pub fn build_layout(
    df: &DataFrame,
    keys: &ColumnKeys,
    config: &ChartConfig,
) -> Result<ChartLayout> {
    let data = prepare_data(
        df,
        keys,
        config.ascending,
        config.tie_method,
        config.time_order.as_deref(),
    )?;

    let trajectories = TrajectoryBuilder::build(&data)?;
    debug!("Built {} trajectories", trajectories.len());

    let interpolator = CurveInterpolator::new(config.smooth);
    let curves: Vec<Curve> = trajectories
        .iter()
        .map(|t| interpolator.interpolate(t))
        .collect();
    debug!(
        "Interpolated {} segments (smooth: {})",
        curves.iter().map(Curve::segment_count).sum::<usize>(),
        config.smooth
    );

    let placer = LabelPlacer::new(
        config.show_labels,
        config.label_padding,
        config.min_label_distance,
    );
    let labels = placer.place(&trajectories);
    debug!("Placed {} labels", labels.len());

    let base_colors = palette_colors(config.palette.as_deref(), data.entities.len());
    let styles = entity_styles(
        &data.entities,
        &base_colors,
        &config.highlighting(),
        config.line_width,
        config.marker_size,
    );

    let frame = AxesFrame::from_layout(
        &data.time_axis,
        &trajectories,
        config.figure_size,
        config.show_grid,
    );

    Ok(ChartLayout {
        time_axis: data.time_axis,
        trajectories,
        curves,
        labels,
        styles,
        frame,
        show_points: config.show_points,
        label_font_size: config.label_font_size,
    })
}

/// Render a bump chart into an in-memory `RecordingSurface`
pub fn render_bump_chart(
    df: &DataFrame,
    keys: &ColumnKeys,
    config: &ChartConfig,
) -> Result<BumpChart<RecordingSurface>> {
    render_bump_chart_on(df, keys, config, RecordingSurface::new())
}

/// Render a bump chart onto any drawing surface
///
/// The surface is only touched once the whole layout has been computed.
pub fn render_bump_chart_on<S: DrawingSurface>(
    df: &DataFrame,
    keys: &ColumnKeys,
    config: &ChartConfig,
    mut surface: S,
) -> Result<BumpChart<S>> {
    let layout = build_layout(df, keys, config)?;
    draw_layout(&layout, &mut surface);
    Ok(BumpChart { layout, surface })
}

/// Emit the layout's primitives: curves and markers in z-order, then labels
pub fn draw_layout<S: DrawingSurface + ?Sized>(layout: &ChartLayout, surface: &mut S) {
    surface.begin(&layout.frame);

    for idx in draw_order(&layout.styles) {
        let (curve, style) = (&layout.curves[idx], &layout.styles[idx]);

        let line = LineStyle {
            color: style.color,
            alpha: style.alpha,
            width: style.line_width,
            z_order: style.z_order,
        };
        for run in &curve.runs {
            surface.draw_path(&curve.entity, run, &line);
        }

        if layout.show_points && !curve.points.is_empty() {
            let marker = MarkerStyle {
                color: style.color,
                alpha: style.alpha,
                size: style.marker_size,
                z_order: style.z_order,
            };
            surface.draw_markers(&curve.entity, &curve.points, &marker);
        }
    }

    for label in &layout.labels {
        let style = &layout.styles[label.entity_index];
        let text = TextStyle {
            color: style.color,
            alpha: style.alpha,
            font_size: layout.label_font_size,
            align: label.align,
        };
        surface.draw_text(&label.text, Point::new(label.x, label.y), &text);
    }

    surface.finish();
}

/// Rank values within each group
///
/// `groups[i]` is the group (time index) of `values[i]`. Output is aligned
/// with the input; null values rank at the bottom of their group.
pub fn calculate_ranks(
    groups: &[usize],
    values: &[Option<f64>],
    ascending: bool,
    tie_method: TieMethod,
) -> Vec<f64> {
    RankResolver::new(ascending, tie_method).resolve(groups, values)
}
