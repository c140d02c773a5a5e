//! Rendering hand-off
//!
//! The layout core never draws; it hands primitives to a `DrawingSurface`.
//!
//! Structure:
//! - `axes.rs`: axes frame (limits, ticks, grid) derived from the layout
//! - `surface.rs`: the `DrawingSurface` trait and the in-memory `RecordingSurface`

pub mod axes;
pub mod surface;

pub use axes::AxesFrame;
pub use surface::{DrawingSurface, LineStyle, MarkerStyle, Primitive, RecordingSurface, TextStyle};
