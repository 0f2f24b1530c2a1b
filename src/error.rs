//! # Errors
//!
//! Failures surfaced at the two entry points of the crate: price-table
//! ingestion and an optimization run. Numeric degeneracy is never reported
//! here; the estimator and allocator substitute safe defaults instead.

use thiserror::Error;

/// Error type for ingestion and optimization.
#[derive(Debug, Error)]
pub enum PortfolioError {
  /// Header row has fewer than a period column plus two assets.
  #[error("price table needs a period column and at least 2 asset columns, found {found} column(s)")]
  TooFewColumns { found: usize },

  /// Fewer than two assets survived the minimum-points filter.
  #[error("need at least 2 assets with enough valid prices, found {usable}")]
  InsufficientAssets { usable: usize },

  /// Not enough assets were selected for an optimization run.
  #[error("select at least {required} assets to optimize, got {selected}")]
  TooFewAssets { selected: usize, required: usize },

  /// A selected asset has too short a return history.
  #[error("asset '{asset}' has {length} returns, at least {required} are required")]
  InsufficientHistory {
    asset: String,
    length: usize,
    required: usize,
  },

  /// Asset list and return series disagree in length.
  #[error("expected {expected} return series, got {actual}")]
  DimensionMismatch { expected: usize, actual: usize },

  /// Asset identifier is not a column of the price table.
  #[error("unknown asset '{0}'")]
  UnknownAsset(String),

  /// Asset identifier occurs twice in a header or a selection.
  #[error("asset '{0}' appears more than once")]
  DuplicateAsset(String),

  /// Invalid engine configuration.
  #[error("invalid configuration: {0}")]
  Config(String),

  #[error(transparent)]
  Csv(#[from] csv::Error),

  #[error(transparent)]
  Io(#[from] std::io::Error),
}

/// Result alias used throughout the crate.
pub type Result<T> = std::result::Result<T, PortfolioError>;
