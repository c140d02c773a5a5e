//! Bump chart layout core
//!
//! Pure functions from an input table to chart geometry.
//!
//! Structure:
//! - `data.rs`: column extraction, validation, time axis, rank preparation
//! - `ranks.rs`: rank resolution and tie methods
//! - `trajectory.rs`: per-entity rank paths with explicit gaps
//! - `curve.rs`: straight or monotone cubic segments between observed points
//! - `labels.rs`: endpoint label collision avoidance
//! - `colors.rs`: entity colors and highlight styling
//! - `properties.rs`: property registry backed by chart.json
//! - `error.rs`: error types

pub mod colors;
pub mod curve;
pub mod data;
pub mod error;
pub mod labels;
pub mod properties;
pub mod ranks;
pub mod trajectory;

pub use colors::{EntityStyle, Highlighting, Rgb};
pub use curve::{Curve, CurveInterpolator, CurveSegment, Point, SegmentShape};
pub use data::{prepare_data, validate_dataframe, ColumnKeys, PreparedData, TimeAxis, TimeKey};
pub use error::{BumpChartError, Result};
pub use labels::{place_labels, LabelPlacer, LabelSlot, ShowLabels, Side, TextAlign};
pub use properties::ChartPropertyReader;
pub use ranks::{rank_group, RankResolver, TieMethod};
pub use trajectory::{Trajectory, TrajectoryBuilder, TrajectoryPoint};
