//! Drawing surface abstraction
//!
//! Anything that can draw paths, markers and text can render a bump chart.
//! `RecordingSurface` keeps the primitives in memory so they can be inspected
//! or written out as JSON.

use super::axes::AxesFrame;
use crate::chart::colors::{to_hex, Rgb};
use crate::chart::{CurveSegment, Point, TextAlign};
use serde::{Serialize, Serializer};

fn serialize_hex<S: Serializer>(color: &Rgb, s: S) -> Result<S::Ok, S::Error> {
    s.serialize_str(&to_hex(*color))
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LineStyle {
    #[serde(serialize_with = "serialize_hex")]
    pub color: Rgb,
    pub alpha: f64,
    pub width: f64,
    pub z_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MarkerStyle {
    #[serde(serialize_with = "serialize_hex")]
    pub color: Rgb,
    pub alpha: f64,
    /// Diameter in points
    pub size: f64,
    pub z_order: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TextStyle {
    #[serde(serialize_with = "serialize_hex")]
    pub color: Rgb,
    pub alpha: f64,
    pub font_size: f64,
    pub align: TextAlign,
}

/// Receiver for chart primitives, in data coordinates
pub trait DrawingSurface {
    /// Called once, before any primitive
    fn begin(&mut self, frame: &AxesFrame);

    /// One continuous path. Consecutive segments share endpoints; a gap in the
    /// trajectory arrives as a separate call.
    fn draw_path(&mut self, entity: &str, segments: &[CurveSegment], style: &LineStyle);

    /// Point markers at observed ranks
    fn draw_markers(&mut self, entity: &str, points: &[Point], style: &MarkerStyle);

    /// A text label at `at`, vertically centred
    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle);

    /// Called once, after the last primitive
    fn finish(&mut self) {}
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Primitive {
    Path {
        entity: String,
        segments: Vec<CurveSegment>,
        style: LineStyle,
    },
    Markers {
        entity: String,
        points: Vec<Point>,
        style: MarkerStyle,
    },
    Text {
        text: String,
        at: Point,
        style: TextStyle,
    },
}

/// In-memory surface that records every primitive it receives
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordingSurface {
    pub frame: Option<AxesFrame>,
    pub primitives: Vec<Primitive>,
    #[serde(skip)]
    finished: bool,
}

impl RecordingSurface {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Recorded paths belonging to `entity`
    pub fn paths_for<'a>(&'a self, entity: &'a str) -> impl Iterator<Item = &'a [CurveSegment]> {
        self.primitives.iter().filter_map(move |p| match p {
            Primitive::Path {
                entity: e,
                segments,
                ..
            } if e == entity => Some(segments.as_slice()),
            _ => None,
        })
    }

    /// Recorded text primitives
    pub fn texts(&self) -> impl Iterator<Item = (&str, Point)> {
        self.primitives.iter().filter_map(|p| match p {
            Primitive::Text { text, at, .. } => Some((text.as_str(), *at)),
            _ => None,
        })
    }

    /// Serialize the recorded scene as pretty-printed JSON
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

impl DrawingSurface for RecordingSurface {
    fn begin(&mut self, frame: &AxesFrame) {
        self.frame = Some(frame.clone());
        self.primitives.clear();
        self.finished = false;
    }

    fn draw_path(&mut self, entity: &str, segments: &[CurveSegment], style: &LineStyle) {
        self.primitives.push(Primitive::Path {
            entity: entity.to_string(),
            segments: segments.to_vec(),
            style: style.clone(),
        });
    }

    fn draw_markers(&mut self, entity: &str, points: &[Point], style: &MarkerStyle) {
        self.primitives.push(Primitive::Markers {
            entity: entity.to_string(),
            points: points.to_vec(),
            style: style.clone(),
        });
    }

    fn draw_text(&mut self, text: &str, at: Point, style: &TextStyle) {
        self.primitives.push(Primitive::Text {
            text: text.to_string(),
            at,
            style: style.clone(),
        });
    }

    fn finish(&mut self) {
        self.finished = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn line_style() -> LineStyle {
        LineStyle {
            color: [31, 119, 180],
            alpha: 1.0,
            width: 2.5,
            z_order: 2,
        }
    }

    #[test]
    fn test_recording_surface_collects_primitives() {
        let mut surface = RecordingSurface::new();
        let seg = CurveSegment::line(Point::new(0.0, 1.0), Point::new(1.0, 2.0));
        surface.draw_path("A", &[seg], &line_style());
        surface.draw_path("B", &[seg], &line_style());
        surface.draw_text(
            "A",
            Point::new(-0.3, 1.0),
            &TextStyle {
                color: [0, 0, 0],
                alpha: 1.0,
                font_size: 10.0,
                align: TextAlign::End,
            },
        );
        surface.finish();

        assert!(surface.is_finished());
        assert_eq!(surface.paths_for("A").count(), 1);
        assert_eq!(surface.texts().collect::<Vec<_>>(), vec![("A", Point::new(-0.3, 1.0))]);
    }

    #[test]
    fn test_scene_json_uses_hex_colors() {
        let mut surface = RecordingSurface::new();
        let seg = CurveSegment::line(Point::new(0.0, 1.0), Point::new(1.0, 2.0));
        surface.draw_path("A", &[seg], &line_style());

        let json: serde_json::Value = serde_json::from_str(&surface.to_json().unwrap()).unwrap();
        let path = &json["primitives"][0];
        assert_eq!(path["type"], "path");
        assert_eq!(path["style"]["color"], "#1F77B4");
        assert_eq!(path["segments"][0]["shape"]["kind"], "line");
    }
}
