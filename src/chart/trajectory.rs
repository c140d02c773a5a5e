//! Per-entity rank trajectories over the full time axis
//!
//! Every trajectory has exactly one point per distinct time value. Time steps
//! where the entity has no rank are explicit gaps; nothing is interpolated
//! across them.

use super::data::PreparedData;
use super::error::{BumpChartError, Result};
use serde::Serialize;

/// One time step of a trajectory
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct TrajectoryPoint {
    pub time_index: usize,
    pub x: f64,
    /// None marks a gap
    pub rank: Option<f64>,
}

impl TrajectoryPoint {
    pub fn is_gap(&self) -> bool {
        self.rank.is_none()
    }
}

/// Rank path of one entity
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Trajectory {
    pub entity: String,
    pub points: Vec<TrajectoryPoint>,
}

impl Trajectory {
    /// Observed (non-gap) points in time order
    pub fn observed(&self) -> impl Iterator<Item = &TrajectoryPoint> {
        self.points.iter().filter(|p| !p.is_gap())
    }

    pub fn first_observed(&self) -> Option<&TrajectoryPoint> {
        self.observed().next()
    }

    pub fn last_observed(&self) -> Option<&TrajectoryPoint> {
        self.points.iter().rev().find(|p| !p.is_gap())
    }

    /// Maximal runs of consecutive observed points
    ///
    /// A gap ends the current run; runs never span a gap.
    pub fn runs(&self) -> Vec<&[TrajectoryPoint]> {
        self.points
            .split(|p| p.is_gap())
            .filter(|run| !run.is_empty())
            .collect()
    }

    /// Largest observed rank, if any
    pub fn max_rank(&self) -> Option<f64> {
        self.observed()
            .filter_map(|p| p.rank)
            .fold(None, |acc: Option<f64>, r| Some(acc.map_or(r, |a| a.max(r))))
    }
}

/// Assembles trajectories from prepared observations
pub struct TrajectoryBuilder;

impl TrajectoryBuilder {
    /// Build one trajectory per entity, in entity order
    ///
    /// Fails with `DuplicateObservation` if an (entity, time) pair occurs twice.
    pub fn build(data: &PreparedData) -> Result<Vec<Trajectory>> {
        let n_times = data.time_axis.len();
        let mut slots: Vec<Vec<Option<usize>>> = vec![vec![None; n_times]; data.entities.len()];

        for (i, obs) in data.observations.iter().enumerate() {
            let slot = &mut slots[obs.entity_index][obs.time_index];
            if slot.is_some() {
                return Err(BumpChartError::DuplicateObservation {
                    time: data.time_axis.keys[obs.time_index].to_string(),
                    entity: data.entities[obs.entity_index].clone(),
                });
            }
            *slot = Some(i);
        }

        let trajectories = data
            .entities
            .iter()
            .zip(slots)
            .map(|(entity, row)| Trajectory {
                entity: entity.clone(),
                points: row
                    .into_iter()
                    .enumerate()
                    .map(|(t, obs)| TrajectoryPoint {
                        time_index: t,
                        x: data.time_axis.xs[t],
                        rank: obs.and_then(|i| data.observations[i].rank),
                    })
                    .collect(),
            })
            .collect();

        Ok(trajectories)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::chart::data::{Observation, TimeAxis, TimeKey};

    fn prepared(
        n_times: usize,
        entities: &[&str],
        obs: &[(usize, usize, Option<f64>)],
    ) -> PreparedData {
        PreparedData {
            time_axis: TimeAxis {
                keys: (0..n_times)
                    .map(|t| TimeKey::Number(2020.0 + t as f64))
                    .collect(),
                xs: (0..n_times).map(|t| 2020.0 + t as f64).collect(),
            },
            entities: entities.iter().map(|e| e.to_string()).collect(),
            observations: obs
                .iter()
                .enumerate()
                .map(|(row, &(time_index, entity_index, rank))| Observation {
                    row,
                    time_index,
                    entity_index,
                    rank,
                })
                .collect(),
        }
    }

    #[test]
    fn test_one_point_per_time_step() {
        let data = prepared(
            3,
            &["A", "B"],
            &[(0, 0, Some(1.0)), (0, 1, Some(2.0)), (2, 0, Some(2.0))],
        );
        let trajectories = TrajectoryBuilder::build(&data).unwrap();
        assert_eq!(trajectories.len(), 2);
        assert!(trajectories.iter().all(|t| t.points.len() == 3));

        let b = &trajectories[1];
        assert_eq!(b.entity, "B");
        assert_eq!(b.first_observed().map(|p| p.time_index), Some(0));
        assert_eq!(b.last_observed().map(|p| p.time_index), Some(0));
        assert!(b.points[1].is_gap() && b.points[2].is_gap());
    }

    #[test]
    fn test_gap_splits_runs() {
        let data = prepared(
            4,
            &["A"],
            &[(0, 0, Some(1.0)), (1, 0, Some(3.0)), (3, 0, Some(2.0))],
        );
        let trajectories = TrajectoryBuilder::build(&data).unwrap();
        let runs = trajectories[0].runs();
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].len(), 2);
        assert_eq!(runs[1].len(), 1);
        assert_eq!(runs[1][0].x, 2023.0);
        assert_eq!(trajectories[0].max_rank(), Some(3.0));
    }

    #[test]
    fn test_missing_rank_is_gap() {
        let data = prepared(2, &["A"], &[(0, 0, None), (1, 0, Some(1.0))]);
        let trajectories = TrajectoryBuilder::build(&data).unwrap();
        assert!(trajectories[0].points[0].is_gap());
        assert_eq!(trajectories[0].first_observed().map(|p| p.x), Some(2021.0));
    }

    #[test]
    fn test_duplicate_observation() {
        let data = prepared(2, &["A"], &[(0, 0, Some(1.0)), (0, 0, Some(2.0))]);
        let err = TrajectoryBuilder::build(&data).unwrap_err();
        match err {
            BumpChartError::DuplicateObservation { time, entity } => {
                assert_eq!(time, "2020");
                assert_eq!(entity, "A");
            }
            other => panic!("unexpected error: {}", other),
        }
    }
}
