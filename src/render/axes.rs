use crate::chart::{TimeAxis, Trajectory};
use serde::Serialize;

/// Above this many ranks, y ticks are thinned to an evenly stepped subset
pub const MAX_Y_TICKS: usize = 50;

/// Axes description handed to the surface before any data is drawn
///
/// The y axis is inverted: rank 1 is at the top.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AxesFrame {
    /// Figure size in inches (width, height)
    pub figure_size: (f64, f64),
    pub x_limits: (f64, f64),
    /// (bottom, top); bottom is the larger rank
    pub y_limits: (f64, f64),
    /// Tick position and label per time step
    pub x_ticks: Vec<(f64, String)>,
    /// Integer ranks 1..=max, stepped once there are more than `MAX_Y_TICKS`
    pub y_ticks: Vec<f64>,
    pub show_grid: bool,
}

impl AxesFrame {
    /// Frame covering every time step and every observed rank, with half a
    /// unit of padding on each side
    pub fn from_layout(
        time_axis: &TimeAxis,
        trajectories: &[Trajectory],
        figure_size: (f64, f64),
        show_grid: bool,
    ) -> Self {
        let max_rank = trajectories
            .iter()
            .filter_map(Trajectory::max_rank)
            .fold(1.0_f64, f64::max)
            .ceil();

        let (x_min, x_max) = time_axis
            .xs
            .iter()
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &x| {
                (lo.min(x), hi.max(x))
            });

        let x_ticks = time_axis
            .xs
            .iter()
            .copied()
            .zip(time_axis.labels())
            .collect();

        let y_ticks = rank_ticks(max_rank);

        Self {
            figure_size,
            x_limits: (x_min - 0.5, x_max + 0.5),
            y_limits: (max_rank + 0.5, 0.5),
            x_ticks,
            y_ticks,
            show_grid,
        }
    }
}

/// Integer tick positions from 1 up to `max_rank`, at most `MAX_Y_TICKS + 1`
fn rank_ticks(max_rank: f64) -> Vec<f64> {
    let step = (max_rank / MAX_Y_TICKS as f64).ceil().max(1.0);
    let mut ticks = Vec::new();
    let mut tick = 1.0;
    while tick <= max_rank && ticks.len() <= MAX_Y_TICKS {
        ticks.push(tick);
        tick += step;
    }
    ticks
}
