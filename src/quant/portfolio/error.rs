//! # Portfolio Errors
//!
//! Value-level failures of the frontier pipeline. Nothing here is retried.

use thiserror::Error;

/// Errors returned by statistics, sampling, selection and data providers.
#[derive(Debug, Error)]
pub enum PortfolioError {
  /// Fewer valid assets than a frontier needs.
  #[error("at least {required} valid assets are required, found {found}")]
  InsufficientAssets { found: usize, required: usize },
  /// Price history missing, empty, or too short after alignment and cleaning.
  #[error("price data unavailable: {0}")]
  DataUnavailable(String),
  /// Every candidate has zero volatility, so no Sharpe ratio can be ranked.
  #[error("no candidate has a finite Sharpe ratio (volatility is zero for every draw)")]
  DegenerateVolatility,
  /// Selection over a cloud with no draws.
  #[error("cannot select portfolios from an empty simulation cloud")]
  EmptyCloud,
  #[error("{what}: expected dimension {expected}, found {found}")]
  DimensionMismatch {
    what: &'static str,
    expected: usize,
    found: usize,
  },
  #[error("invalid annual returns: {0}")]
  InvalidReturns(String),
  #[error("invalid covariance matrix: {0}")]
  InvalidCovariance(String),
  #[error("invalid configuration: {0}")]
  InvalidConfig(String),
  #[error("invalid date '{value}'")]
  DateParse {
    value: String,
    #[source]
    source: chrono::ParseError,
  },
  #[error(transparent)]
  Shape(#[from] ndarray::ShapeError),
  #[error(transparent)]
  Csv(#[from] csv::Error),
  #[error(transparent)]
  Io(#[from] std::io::Error),
}

pub type Result<T> = std::result::Result<T, PortfolioError>;
