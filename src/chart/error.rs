use thiserror::Error;

/// Errors raised while validating input or computing a bump chart layout
///
/// Every variant is raised before anything is drawn.
#[derive(Debug, Error)]
pub enum BumpChartError {
    /// Missing column, or both/neither of the rank and value keys supplied
    #[error("Input shape error: {0}")]
    InputShape(String),

    /// The same (time, entity) pair appears more than once
    #[error("Duplicate observation for entity '{entity}' at time '{time}'")]
    DuplicateObservation { time: String, entity: String },

    /// Unrecognized tie method token
    #[error("Invalid tie method '{0}'. Valid values: [average, min, max, first, dense]")]
    InvalidTieMethod(String),

    /// Zero rows, or fewer than two distinct time values
    #[error("Empty input: {0}")]
    EmptyInput(String),

    /// Rank column is non-numeric, negative or entirely null
    #[error("Invalid rank: {0}")]
    InvalidRank(String),

    /// Configuration error (malformed property values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Error reported by polars while reading columns
    #[error("Polars error: {0}")]
    Polars(#[from] polars::prelude::PolarsError),
}

/// Type alias for Results using BumpChartError
pub type Result<T> = std::result::Result<T, BumpChartError>;
