//! Curve geometry between observed trajectory points
//!
//! Without smoothing each pair of consecutive observed points is joined by a
//! straight segment. With smoothing the segments become cubic Beziers built
//! from monotone cubic Hermite tangents, so a curve never passes outside the
//! rank band of its two endpoints. Gaps are never bridged.

use super::trajectory::{Trajectory, TrajectoryPoint};
use serde::Serialize;

/// A point in data coordinates (x = time position, y = rank)
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum SegmentShape {
    Line,
    Cubic { c1: Point, c2: Point },
}

/// One drawable piece between two consecutive observed points
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct CurveSegment {
    pub start: Point,
    pub end: Point,
    pub shape: SegmentShape,
}

impl CurveSegment {
    pub fn line(start: Point, end: Point) -> Self {
        Self {
            start,
            end,
            shape: SegmentShape::Line,
        }
    }

    /// Evaluate the segment at parameter `t` in [0, 1]
    ///
    /// t = 0 and t = 1 return `start` and `end` exactly.
    pub fn point_at(&self, t: f64) -> Point {
        let t = t.clamp(0.0, 1.0);
        let mt = 1.0 - t;
        match self.shape {
            SegmentShape::Line => Point::new(
                mt * self.start.x + t * self.end.x,
                mt * self.start.y + t * self.end.y,
            ),
            SegmentShape::Cubic { c1, c2 } => {
                let a = mt * mt * mt;
                let b = 3.0 * mt * mt * t;
                let c = 3.0 * mt * t * t;
                let d = t * t * t;
                Point::new(
                    a * self.start.x + b * c1.x + c * c2.x + d * self.end.x,
                    a * self.start.y + b * c1.y + c * c2.y + d * self.end.y,
                )
            }
        }
    }

    /// Sample the segment as a polyline of `samples + 1` points
    ///
    /// Straight segments always flatten to their two endpoints.
    pub fn flatten(&self, samples: usize) -> Vec<Point> {
        match self.shape {
            SegmentShape::Line => vec![self.start, self.end],
            SegmentShape::Cubic { .. } => {
                let samples = samples.max(1);
                (0..=samples)
                    .map(|i| self.point_at(i as f64 / samples as f64))
                    .collect()
            }
        }
    }
}

/// Drawable geometry of one trajectory
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Curve {
    pub entity: String,
    /// One segment list per continuous run; a new run starts after every gap
    pub runs: Vec<Vec<CurveSegment>>,
    /// Every observed point, including isolated ones that have no segment
    pub points: Vec<Point>,
}

impl Curve {
    pub fn segment_count(&self) -> usize {
        self.runs.iter().map(Vec::len).sum()
    }
}

/// Converts trajectories into curves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CurveInterpolator {
    pub smooth: bool,
}

impl CurveInterpolator {
    pub fn new(smooth: bool) -> Self {
        Self { smooth }
    }

    pub fn interpolate(&self, trajectory: &Trajectory) -> Curve {
        let runs = trajectory
            .runs()
            .into_iter()
            .filter(|run| run.len() >= 2)
            .map(|run| {
                let points = run_points(run);
                if self.smooth {
                    monotone_segments(&points)
                } else {
                    points
                        .windows(2)
                        .map(|w| CurveSegment::line(w[0], w[1]))
                        .collect()
                }
            })
            .collect();

        Curve {
            entity: trajectory.entity.clone(),
            runs,
            points: trajectory
                .observed()
                .filter_map(|p| p.rank.map(|r| Point::new(p.x, r)))
                .collect(),
        }
    }
}

fn run_points(run: &[TrajectoryPoint]) -> Vec<Point> {
    run.iter()
        .filter_map(|p| p.rank.map(|r| Point::new(p.x, r)))
        .collect()
}

/// Cubic Bezier segments through `points` with monotone Hermite tangents
///
/// Interior tangents use the Fritsch-Butland weighted harmonic mean of the
/// neighbouring secants (zero at local extrema and flat stretches); tangents
/// at both ends of a run are flat. This keeps every control point inside the
/// rank band of its segment.
fn monotone_segments(points: &[Point]) -> Vec<CurveSegment> {
    let n = points.len();
    if n < 2 {
        return Vec::new();
    }

    let h: Vec<f64> = points.windows(2).map(|w| w[1].x - w[0].x).collect();
    let d: Vec<f64> = points
        .windows(2)
        .zip(&h)
        .map(|(w, &hk)| if hk != 0.0 { (w[1].y - w[0].y) / hk } else { 0.0 })
        .collect();

    let mut m = vec![0.0; n];
    for k in 1..n - 1 {
        let (d0, d1) = (d[k - 1], d[k]);
        if d0 * d1 <= 0.0 {
            continue;
        }
        let (h0, h1) = (h[k - 1], h[k]);
        m[k] = 3.0 * (h0 + h1) / ((2.0 * h1 + h0) / d0 + (h1 + 2.0 * h0) / d1);
    }

    (0..n - 1)
        .map(|k| {
            let (p0, p1) = (points[k], points[k + 1]);
            let third = h[k] / 3.0;
            CurveSegment {
                start: p0,
                end: p1,
                shape: SegmentShape::Cubic {
                    c1: Point::new(p0.x + third, p0.y + m[k] * third),
                    c2: Point::new(p1.x - third, p1.y - m[k + 1] * third),
                },
            }
        })
        .collect()
}
