use crate::grid::Coord;
use thiserror::Error;

/// Errors raised by grid accessors and layout parsing
#[derive(Debug, Clone, PartialEq, Error)]
pub enum GridError {
    #[error("cell {coord} is outside the {cols}x{rows} grid")]
    OutOfBounds { coord: Coord, cols: i32, rows: i32 },
    #[error("layout line {line}: {reason}")]
    Layout { line: usize, reason: String },
}

/// Precondition failures of a search run.
///
/// The session never lets these happen, so seeing one means a caller
/// bypassed the state machine.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SearchError {
    #[error("invalid endpoint {coord}: {reason}")]
    InvalidEndpoint { coord: Coord, reason: &'static str },
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("a search needs two endpoints, {selected} selected")]
    EndpointsMissing { selected: usize },
    #[error(transparent)]
    Grid(#[from] GridError),
    #[error("failed to spawn search thread: {0}")]
    Spawn(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("invalid config value `{field}`: {reason}")]
    Invalid { field: &'static str, reason: String },
}
