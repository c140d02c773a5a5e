//! Endpoint label placement with collision avoidance
//!
//! Labels sit at the first (left) and last (right) observed point of each
//! trajectory. On each side they are kept at least `min_distance` apart while
//! staying as close as possible to the true endpoint rank. Label order never
//! crosses the rank order.

use super::curve::Point;
use super::trajectory::Trajectory;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

/// Which sides receive labels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ShowLabels {
    Hidden,
    Left,
    Right,
    #[default]
    Both,
}

impl ShowLabels {
    /// Parse "true" | "false" | "left" | "right" | "both" (case-insensitive)
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "true" | "both" => Some(Self::Both),
            "false" | "none" | "hidden" => Some(Self::Hidden),
            "left" => Some(Self::Left),
            "right" => Some(Self::Right),
            _ => None,
        }
    }

    pub fn includes(&self, side: Side) -> bool {
        matches!(
            (self, side),
            (Self::Both, _) | (Self::Left, Side::Left) | (Self::Right, Side::Right)
        )
    }
}

impl From<bool> for ShowLabels {
    fn from(show: bool) -> Self {
        if show {
            Self::Both
        } else {
            Self::Hidden
        }
    }
}

/// Horizontal text anchoring relative to the label position
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TextAlign {
    /// Text extends to the right of its position
    Start,
    /// Text ends at its position
    End,
}

/// A placed endpoint label
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LabelSlot {
    pub entity: String,
    pub entity_index: usize,
    pub side: Side,
    /// Endpoint the label belongs to (true rank position)
    pub anchor: Point,
    /// Text position after collision avoidance
    pub x: f64,
    pub y: f64,
    pub text: String,
    pub align: TextAlign,
}

/// Adjust label positions so neighbours are at least `min_distance` apart
///
/// Output is aligned with `targets`. Labels are ordered by target with input
/// order breaking exact ties; that order is preserved. Overlapping neighbours
/// are pooled into clusters spaced `min_distance` apart and each cluster is
/// centred on its members' targets, which minimises the total squared
/// displacement. Labels that do not collide are left untouched.
///
/// Positions are accumulated in placement order, so for consecutive labels
/// `next >= prev + min_distance` holds exactly in floating point.
pub fn place_labels(targets: &[f64], min_distance: f64) -> Vec<f64> {
    let n = targets.len();
    if n < 2 || !min_distance.is_finite() || min_distance <= 0.0 {
        return targets.to_vec();
    }

    let mut order: Vec<usize> = (0..n).collect();
    order.sort_by(|&a, &b| targets[a].total_cmp(&targets[b]));

    struct Cluster {
        len: usize,
        /// Sum over members of (target - offset_in_cluster * min_distance)
        sum: f64,
        top: f64,
    }

    let mut clusters: Vec<Cluster> = Vec::with_capacity(n);
    for &idx in &order {
        clusters.push(Cluster {
            len: 1,
            sum: targets[idx],
            top: targets[idx],
        });

        while clusters.len() >= 2 {
            let last = &clusters[clusters.len() - 1];
            let prev = &clusters[clusters.len() - 2];
            if last.top >= prev.top + prev.len as f64 * min_distance {
                break;
            }

            let shift = prev.len as f64 * min_distance;
            let len = prev.len + last.len;
            let sum = prev.sum + last.sum - last.len as f64 * shift;
            clusters.truncate(clusters.len() - 2);
            clusters.push(Cluster {
                len,
                sum,
                top: sum / len as f64,
            });
        }
    }

    let mut placed = vec![0.0; n];
    let mut sorted_pos = 0;
    let mut prev: Option<f64> = None;
    for cluster in &clusters {
        for j in 0..cluster.len {
            let pos = match prev {
                None => cluster.top,
                Some(p) if j > 0 => p + min_distance,
                // Rounding in the cluster mean can land a few ulps short
                Some(p) => cluster.top.max(p + min_distance),
            };
            placed[order[sorted_pos]] = pos;
            prev = Some(pos);
            sorted_pos += 1;
        }
    }

    placed
}

/// Builds label slots for the requested sides
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LabelPlacer {
    pub show: ShowLabels,
    /// Horizontal distance between endpoint and text
    pub padding: f64,
    pub min_distance: f64,
}

impl LabelPlacer {
    pub fn new(show: ShowLabels, padding: f64, min_distance: f64) -> Self {
        Self {
            show,
            padding,
            min_distance,
        }
    }

    /// Place labels for every trajectory with at least one observed point
    ///
    /// Left labels come first, then right labels, each in entity order.
    pub fn place(&self, trajectories: &[Trajectory]) -> Vec<LabelSlot> {
        let mut slots = Vec::new();
        for side in [Side::Left, Side::Right] {
            if self.show.includes(side) {
                slots.extend(self.place_side(trajectories, side));
            }
        }
        slots
    }

    fn place_side(&self, trajectories: &[Trajectory], side: Side) -> Vec<LabelSlot> {
        let anchors: Vec<(usize, Point)> = trajectories
            .iter()
            .enumerate()
            .filter_map(|(i, t)| {
                let endpoint = match side {
                    Side::Left => t.first_observed(),
                    Side::Right => t.last_observed(),
                }?;
                endpoint.rank.map(|r| (i, Point::new(endpoint.x, r)))
            })
            .collect();

        let targets: Vec<f64> = anchors.iter().map(|(_, p)| p.y).collect();
        let placed = place_labels(&targets, self.min_distance);

        let (dx, align) = match side {
            Side::Left => (-self.padding, TextAlign::End),
            Side::Right => (self.padding, TextAlign::Start),
        };

        anchors
            .into_iter()
            .zip(placed)
            .map(|((i, anchor), y)| LabelSlot {
                entity: trajectories[i].entity.clone(),
                entity_index: i,
                side,
                anchor,
                x: anchor.x + dx,
                y,
                text: trajectories[i].entity.clone(),
                align,
            })
            .collect()
    }
}
