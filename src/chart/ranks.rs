//! Rank resolution
//!
//! Turns either explicit ranks or raw values into one rank per observation.
//! Values are ranked within their time group; ties are resolved by a
//! [`TieMethod`].

use super::error::{BumpChartError, Result};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// How tied values share rank positions within a group
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum TieMethod {
    /// Mean of the contested positions (2 and 3 tied -> 2.5 each)
    #[default]
    Average,
    /// Smallest contested position
    Min,
    /// Largest contested position
    Max,
    /// Original row order breaks the tie, consecutive integer ranks
    First,
    /// Consecutive integers per distinct value (10,10,8 -> 1,1,2)
    Dense,
}

impl TieMethod {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Average => "average",
            Self::Min => "min",
            Self::Max => "max",
            Self::First => "first",
            Self::Dense => "dense",
        }
    }
}

impl FromStr for TieMethod {
    type Err = BumpChartError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "average" => Ok(Self::Average),
            "min" => Ok(Self::Min),
            "max" => Ok(Self::Max),
            "first" => Ok(Self::First),
            "dense" => Ok(Self::Dense),
            _ => Err(BumpChartError::InvalidTieMethod(s.to_string())),
        }
    }
}

impl fmt::Display for TieMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Rank a single group of values
///
/// `values` are in original row order. Missing values rank after every
/// present value, whatever the polarity, and tie with each other.
pub fn rank_group(values: &[Option<f64>], ascending: bool, method: TieMethod) -> Vec<f64> {
    let n = values.len();
    let mut order: Vec<usize> = (0..n).collect();

    // Stable sort: equal values keep row order, which `First` relies on
    order.sort_by(|&a, &b| compare_values(values[a], values[b], ascending));

    let mut ranks = vec![0.0; n];
    let mut dense = 0.0;
    let mut start = 0;

    while start < n {
        let mut end = start + 1;
        while end < n && same_value(values[order[start]], values[order[end]]) {
            end += 1;
        }

        // Positions start+1 ..= end are contested by this tie group
        dense += 1.0;
        for (offset, &row) in order[start..end].iter().enumerate() {
            ranks[row] = match method {
                TieMethod::Average => (start + 1 + end) as f64 / 2.0,
                TieMethod::Min => (start + 1) as f64,
                TieMethod::Max => end as f64,
                TieMethod::First => (start + offset + 1) as f64,
                TieMethod::Dense => dense,
            };
        }

        start = end;
    }

    ranks
}

fn compare_values(a: Option<f64>, b: Option<f64>, ascending: bool) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) if ascending => a.total_cmp(&b),
        (Some(a), Some(b)) => b.total_cmp(&a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn same_value(a: Option<f64>, b: Option<f64>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        (None, None) => true,
        _ => false,
    }
}

/// Computes ranks from raw values, grouped by time step
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RankResolver {
    /// true: lower values get better (lower) ranks
    pub ascending: bool,
    pub method: TieMethod,
}

impl RankResolver {
    pub fn new(ascending: bool, method: TieMethod) -> Self {
        Self { ascending, method }
    }

    /// Rank `values` within the groups given by `groups`
    ///
    /// Both slices are aligned row by row; the output is aligned the same way.
    pub fn resolve(&self, groups: &[usize], values: &[Option<f64>]) -> Vec<f64> {
        debug_assert_eq!(groups.len(), values.len());

        let mut by_group: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
        for (row, &group) in groups.iter().enumerate() {
            by_group.entry(group).or_default().push(row);
        }

        let mut ranks = vec![0.0; values.len()];
        for rows in by_group.values() {
            let group_values: Vec<Option<f64>> = rows.iter().map(|&r| values[r]).collect();
            let group_ranks = rank_group(&group_values, self.ascending, self.method);
            for (&row, rank) in rows.iter().zip(group_ranks) {
                ranks[row] = rank;
            }
        }

        ranks
    }
}

/// Validate explicit ranks and pass them through verbatim
///
/// Missing ranks stay missing (they become gaps). Negative or infinite ranks,
/// or a column with no rank at all, are rejected.
pub fn explicit_ranks(values: &[Option<f64>]) -> Result<Vec<Option<f64>>> {
    if values.iter().all(Option::is_none) {
        return Err(BumpChartError::InvalidRank(
            "all rank values are missing".to_string(),
        ));
    }

    if let Some(bad) = values.iter().flatten().find(|r| !r.is_finite()) {
        return Err(BumpChartError::InvalidRank(format!(
            "rank values must be finite, found {}",
            bad
        )));
    }

    if let Some(bad) = values.iter().flatten().find(|r| **r < 0.0) {
        return Err(BumpChartError::InvalidRank(format!(
            "rank values must be non-negative, found {}",
            bad
        )));
    }

    Ok(values.to_vec())
}
