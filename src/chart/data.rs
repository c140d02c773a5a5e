//! Input validation and rank preparation
//!
//! Reads the time, entity and rank/value columns out of a polars DataFrame,
//! builds the sorted time axis and resolves one rank per row.

use super::error::{BumpChartError, Result};
use super::ranks::{explicit_ranks, RankResolver, TieMethod};
use polars::prelude::*;
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::fmt;
use tracing::debug;

/// Names of the columns a bump chart is built from
///
/// Exactly one of `rank` and `value` must be set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ColumnKeys {
    pub time: String,
    pub entity: String,
    pub rank: Option<String>,
    pub value: Option<String>,
}

impl ColumnKeys {
    /// Keys for a table that already carries ranks
    pub fn with_rank(time: &str, entity: &str, rank: &str) -> Self {
        Self {
            time: time.to_string(),
            entity: entity.to_string(),
            rank: Some(rank.to_string()),
            value: None,
        }
    }

    /// Keys for a table whose ranks are computed from values
    pub fn with_value(time: &str, entity: &str, value: &str) -> Self {
        Self {
            time: time.to_string(),
            entity: entity.to_string(),
            rank: None,
            value: Some(value.to_string()),
        }
    }
}

/// One time value; numeric columns keep their number, anything else its text
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum TimeKey {
    Number(f64),
    Label(String),
}

impl TimeKey {
    /// Natural order: numbers numerically, labels lexicographically
    fn natural_cmp(&self, other: &Self) -> Ordering {
        match (self, other) {
            (Self::Number(a), Self::Number(b)) => a.total_cmp(b),
            (Self::Label(a), Self::Label(b)) => a.cmp(b),
            (Self::Number(_), Self::Label(_)) => Ordering::Less,
            (Self::Label(_), Self::Number(_)) => Ordering::Greater,
        }
    }
}

impl fmt::Display for TimeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(x) => write!(f, "{}", x),
            Self::Label(s) => f.write_str(s),
        }
    }
}

/// Sorted distinct time values and their horizontal positions
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TimeAxis {
    pub keys: Vec<TimeKey>,
    /// x coordinate of each key: the value itself for naturally ordered
    /// numeric times, the ordinal position otherwise
    pub xs: Vec<f64>,
}

impl TimeAxis {
    /// Build the axis from per-row time keys
    ///
    /// Returns the axis and, for every row, the index of its time key.
    /// With `order`, keys are placed by their position in that list and any
    /// observed time missing from it is an input error.
    pub fn build(times: &[TimeKey], order: Option<&[String]>) -> Result<(Self, Vec<usize>)> {
        let mut keys: Vec<TimeKey> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        for key in times {
            if seen.insert(key.to_string()) {
                keys.push(key.clone());
            }
        }

        let numeric = keys.iter().all(|k| matches!(k, TimeKey::Number(_)));

        let xs = match order {
            Some(order) => {
                let position: HashMap<&str, usize> = order
                    .iter()
                    .enumerate()
                    .map(|(i, s)| (s.as_str(), i))
                    .collect();
                let mut ranked = Vec::with_capacity(keys.len());
                for key in keys {
                    let label = key.to_string();
                    let pos = position.get(label.as_str()).copied().ok_or_else(|| {
                        BumpChartError::InputShape(format!(
                            "time value '{}' is not listed in the supplied time order",
                            label
                        ))
                    })?;
                    ranked.push((pos, key));
                }
                ranked.sort_by_key(|(pos, _)| *pos);
                keys = ranked.into_iter().map(|(_, key)| key).collect();
                (0..keys.len()).map(|i| i as f64).collect()
            }
            None => {
                keys.sort_by(|a, b| a.natural_cmp(b));
                if numeric {
                    keys.iter()
                        .map(|k| match k {
                            TimeKey::Number(x) => *x,
                            TimeKey::Label(_) => 0.0,
                        })
                        .collect()
                } else {
                    (0..keys.len()).map(|i| i as f64).collect()
                }
            }
        };

        let index: HashMap<String, usize> = keys
            .iter()
            .enumerate()
            .map(|(i, k)| (k.to_string(), i))
            .collect();
        let rows = times
            .iter()
            .map(|k| {
                index.get(&k.to_string()).copied().ok_or_else(|| {
                    BumpChartError::InputShape(format!("time value '{}' has no axis position", k))
                })
            })
            .collect::<Result<Vec<_>>>()?;

        Ok((Self { keys, xs }, rows))
    }

    pub fn len(&self) -> usize {
        self.keys.len()
    }

    pub fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    /// Tick labels, one per key
    pub fn labels(&self) -> Vec<String> {
        self.keys.iter().map(|k| k.to_string()).collect()
    }
}

/// One input row after rank resolution
#[derive(Debug, Clone, PartialEq)]
pub struct Observation {
    /// Row position in the input table
    pub row: usize,
    pub time_index: usize,
    pub entity_index: usize,
    /// None when the input rank was missing; drawn as a gap
    pub rank: Option<f64>,
}

/// Validated input ready for trajectory building
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedData {
    pub time_axis: TimeAxis,
    /// Entities in order of first appearance
    pub entities: Vec<String>,
    pub observations: Vec<Observation>,
}

/// Validate that the DataFrame has the required columns and keys
pub fn validate_dataframe(df: &DataFrame, keys: &ColumnKeys) -> Result<()> {
    if df.height() == 0 {
        return Err(BumpChartError::EmptyInput("DataFrame is empty".to_string()));
    }

    let missing: Vec<&str> = [keys.time.as_str(), keys.entity.as_str()]
        .into_iter()
        .filter(|name| df.column(name).is_err())
        .collect();
    if !missing.is_empty() {
        return Err(BumpChartError::InputShape(format!(
            "Missing required columns: {:?}",
            missing
        )));
    }

    match (&keys.rank, &keys.value) {
        (None, None) => Err(BumpChartError::InputShape(
            "Either a rank key or a value key must be provided".to_string(),
        )),
        (Some(_), Some(_)) => Err(BumpChartError::InputShape(
            "Only one of rank key and value key may be provided".to_string(),
        )),
        (Some(rank), None) if df.column(rank).is_err() => Err(BumpChartError::InputShape(
            format!("Rank column '{}' not found in DataFrame", rank),
        )),
        (None, Some(value)) if df.column(value).is_err() => Err(BumpChartError::InputShape(
            format!("Value column '{}' not found in DataFrame", value),
        )),
        _ => Ok(()),
    }
}

/// Validate the DataFrame, build the time axis and resolve ranks
///
/// `ascending` and `tie_method` only apply when ranking from values.
pub fn prepare_data(
    df: &DataFrame,
    keys: &ColumnKeys,
    ascending: bool,
    tie_method: TieMethod,
    time_order: Option<&[String]>,
) -> Result<PreparedData> {
    validate_dataframe(df, keys)?;

    let times = read_time_column(df.column(&keys.time)?.as_materialized_series())?;
    let entity_names = read_entity_column(df.column(&keys.entity)?.as_materialized_series())?;

    let (time_axis, time_rows) = TimeAxis::build(&times, time_order)?;
    if time_axis.len() < 2 {
        return Err(BumpChartError::EmptyInput(format!(
            "a bump chart needs at least two distinct time values, found {}",
            time_axis.len()
        )));
    }

    let ranks = match (&keys.rank, &keys.value) {
        (Some(rank), _) => {
            let series = df.column(rank)?.as_materialized_series();
            if !is_numeric(series.dtype()) {
                return Err(BumpChartError::InvalidRank(format!(
                    "rank column '{}' must be numeric, found {}",
                    rank,
                    series.dtype()
                )));
            }
            explicit_ranks(&read_numeric(series)?)?
        }
        (None, Some(value)) => {
            let series = df.column(value)?.as_materialized_series();
            if !is_numeric(series.dtype()) {
                return Err(BumpChartError::InputShape(format!(
                    "value column '{}' must be numeric, found {}",
                    value,
                    series.dtype()
                )));
            }
            let resolver = RankResolver::new(ascending, tie_method);
            resolver
                .resolve(&time_rows, &read_numeric(series)?)
                .into_iter()
                .map(Some)
                .collect()
        }
        (None, None) => {
            return Err(BumpChartError::InputShape(
                "Either a rank key or a value key must be provided".to_string(),
            ))
        }
    };

    let mut entities: Vec<String> = Vec::new();
    let mut entity_index: HashMap<String, usize> = HashMap::new();
    let mut observations = Vec::with_capacity(df.height());

    for (row, name) in entity_names.into_iter().enumerate() {
        let idx = *entity_index.entry(name.clone()).or_insert_with(|| {
            entities.push(name);
            entities.len() - 1
        });
        observations.push(Observation {
            row,
            time_index: time_rows[row],
            entity_index: idx,
            rank: ranks[row],
        });
    }

    debug!(
        "Prepared {} observations: {} entities over {} time steps",
        observations.len(),
        entities.len(),
        time_axis.len()
    );

    Ok(PreparedData {
        time_axis,
        entities,
        observations,
    })
}

fn is_numeric(dtype: &DataType) -> bool {
    matches!(
        dtype,
        DataType::Int8
            | DataType::Int16
            | DataType::Int32
            | DataType::Int64
            | DataType::UInt8
            | DataType::UInt16
            | DataType::UInt32
            | DataType::UInt64
            | DataType::Float32
            | DataType::Float64
    )
}

/// Numeric column as f64; nulls and NaN become None
fn read_numeric(series: &Series) -> Result<Vec<Option<f64>>> {
    let cast = series.cast(&DataType::Float64)?;
    Ok(cast
        .f64()?
        .into_iter()
        .map(|v| v.filter(|x| !x.is_nan()))
        .collect())
}

fn read_time_column(series: &Series) -> Result<Vec<TimeKey>> {
    let missing = || {
        BumpChartError::InputShape(format!("time column '{}' contains nulls", series.name()))
    };

    if is_numeric(series.dtype()) {
        read_numeric(series)?
            .into_iter()
            .map(|v| match v {
                Some(x) if x.is_finite() => Ok(TimeKey::Number(x)),
                Some(x) => Err(BumpChartError::InputShape(format!(
                    "time column '{}' contains non-finite value {}",
                    series.name(),
                    x
                ))),
                None => Err(missing()),
            })
            .collect()
    } else {
        let cast = series.cast(&DataType::String)?;
        let values = cast.str()?;
        values
            .into_iter()
            .map(|v| v.map(|s| TimeKey::Label(s.to_string())).ok_or_else(missing))
            .collect()
    }
}

fn read_entity_column(series: &Series) -> Result<Vec<String>> {
    let cast = series.cast(&DataType::String)?;
    let values = cast.str()?;
    values
        .into_iter()
        .map(|v| {
            v.map(|s| s.to_string()).ok_or_else(|| {
                BumpChartError::InputShape(format!(
                    "entity column '{}' contains nulls",
                    series.name()
                ))
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ranked_df() -> DataFrame {
        df! {
            "year" => [2020, 2020, 2021, 2021],
            "team" => ["A", "B", "A", "B"],
            "rank" => [1, 2, 2, 1]
        }
        .unwrap()
    }

    #[test]
    fn test_valid_dataframe_with_rank_key() {
        let keys = ColumnKeys::with_rank("year", "team", "rank");
        assert!(validate_dataframe(&ranked_df(), &keys).is_ok());
    }

    #[test]
    fn test_empty_dataframe() {
        let df = df! {
            "year" => Vec::<i32>::new(),
            "team" => Vec::<String>::new(),
            "rank" => Vec::<i32>::new()
        }
        .unwrap();
        let keys = ColumnKeys::with_rank("year", "team", "rank");
        assert!(matches!(
            validate_dataframe(&df, &keys),
            Err(BumpChartError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_missing_time_column() {
        let keys = ColumnKeys::with_rank("season", "team", "rank");
        let err = validate_dataframe(&ranked_df(), &keys).unwrap_err();
        assert!(matches!(&err, BumpChartError::InputShape(msg) if msg.contains("season")));
    }

    #[test]
    fn test_both_or_neither_keys() {
        let df = ranked_df();
        let mut keys = ColumnKeys::with_rank("year", "team", "rank");
        keys.value = Some("rank".to_string());
        assert!(matches!(
            validate_dataframe(&df, &keys),
            Err(BumpChartError::InputShape(_))
        ));

        keys.rank = None;
        keys.value = None;
        assert!(matches!(
            validate_dataframe(&df, &keys),
            Err(BumpChartError::InputShape(_))
        ));
    }

    #[test]
    fn test_missing_rank_or_value_column() {
        let df = ranked_df();
        let err = validate_dataframe(&df, &ColumnKeys::with_rank("year", "team", "pos"));
        assert!(matches!(err, Err(BumpChartError::InputShape(msg)) if msg.contains("'pos'")));

        let err = validate_dataframe(&df, &ColumnKeys::with_value("year", "team", "score"));
        assert!(matches!(err, Err(BumpChartError::InputShape(msg)) if msg.contains("'score'")));
    }

    #[test]
    fn test_prepare_with_values_descending() {
        let df = df! {
            "year" => [2020, 2020, 2020, 2021, 2021, 2021],
            "team" => ["A", "B", "C", "A", "B", "C"],
            "score" => [100.0, 100.0, 80.0, 50.0, 70.0, 60.0]
        }
        .unwrap();
        let keys = ColumnKeys::with_value("year", "team", "score");
        let prepared = prepare_data(&df, &keys, false, TieMethod::Average, None).unwrap();

        let ranks: Vec<Option<f64>> = prepared.observations.iter().map(|o| o.rank).collect();
        assert_eq!(
            ranks,
            vec![Some(1.5), Some(1.5), Some(3.0), Some(3.0), Some(1.0), Some(2.0)]
        );
        assert_eq!(prepared.entities, vec!["A", "B", "C"]);
        assert_eq!(prepared.time_axis.xs, vec![2020.0, 2021.0]);
    }

    #[test]
    fn test_prepare_requires_two_time_steps() {
        let df = df! {
            "year" => [2020, 2020],
            "team" => ["A", "B"],
            "rank" => [1, 2]
        }
        .unwrap();
        let keys = ColumnKeys::with_rank("year", "team", "rank");
        assert!(matches!(
            prepare_data(&df, &keys, true, TieMethod::Average, None),
            Err(BumpChartError::EmptyInput(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_non_numeric_rank() {
        let df = df! {
            "year" => [2020, 2021],
            "team" => ["A", "A"],
            "rank" => ["first", "second"]
        }
        .unwrap();
        let keys = ColumnKeys::with_rank("year", "team", "rank");
        assert!(matches!(
            prepare_data(&df, &keys, true, TieMethod::Average, None),
            Err(BumpChartError::InvalidRank(_))
        ));
    }

    #[test]
    fn test_string_times_sort_lexicographically() {
        let df = df! {
            "quarter" => ["Q2", "Q1", "Q2", "Q1"],
            "team" => ["A", "A", "B", "B"],
            "rank" => [2, 1, 1, 2]
        }
        .unwrap();
        let keys = ColumnKeys::with_rank("quarter", "team", "rank");
        let prepared = prepare_data(&df, &keys, true, TieMethod::Average, None).unwrap();
        assert_eq!(prepared.time_axis.labels(), vec!["Q1", "Q2"]);
        assert_eq!(prepared.time_axis.xs, vec![0.0, 1.0]);
        assert_eq!(prepared.observations[0].time_index, 1);
    }

    #[test]
    fn test_supplied_time_order() {
        let times = vec![
            TimeKey::Label("Mar".to_string()),
            TimeKey::Label("Jan".to_string()),
            TimeKey::Label("Feb".to_string()),
        ];
        let order = vec!["Jan".to_string(), "Feb".to_string(), "Mar".to_string()];
        let (axis, rows) = TimeAxis::build(&times, Some(&order)).unwrap();
        assert_eq!(axis.labels(), vec!["Jan", "Feb", "Mar"]);
        assert_eq!(rows, vec![2, 0, 1]);

        let short = vec!["Jan".to_string()];
        assert!(matches!(
            TimeAxis::build(&times, Some(&short)),
            Err(BumpChartError::InputShape(_))
        ));
    }

    #[test]
    fn test_prepare_rejects_infinite_time() {
        let df = df! {
            "year" => &[2020.0, f64::INFINITY],
            "team" => &["A", "A"],
            "rank" => &[1.0, 1.0]
        }
        .unwrap();
        let keys = ColumnKeys::with_rank("year", "team", "rank");
        assert!(matches!(
            prepare_data(&df, &keys, true, TieMethod::Average, None),
            Err(BumpChartError::InputShape(msg)) if msg.contains("non-finite")
        ));
    }
}
