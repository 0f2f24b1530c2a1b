//! # Portfolio Engine
//!
//! $$
//! \text{prices}\to r\to(\mu,\Sigma)\to\mathbf w\to(\mu_p,\sigma_p,\text{Sharpe},RC,DR)
//! $$
//!
//! Single entry point that validates a selection, runs the pipeline and
//! assembles an [`OptimizationResult`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde::Serialize;
use tracing::debug;
use tracing::warn;

use super::allocator::allocate_with_mode;
use super::estimator::TRADING_PERIODS_PER_YEAR;
use super::estimator::estimate_statistics;
use super::evaluator::evaluate_portfolio;
use super::types::OptimizationMode;
use super::types::OptimizationResult;
use crate::data::PriceTable;
use crate::error::PortfolioError;
use crate::error::Result;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PortfolioEngineConfig {
  /// Annualization factor for means and covariances.
  pub periods_per_year: f64,
  /// Minimum number of selected assets.
  pub min_assets: usize,
  /// Minimum return-series length of every selected asset.
  pub min_history: usize,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      periods_per_year: TRADING_PERIODS_PER_YEAR,
      min_assets: 2,
      min_history: 10,
    }
  }
}

impl PortfolioEngineConfig {
  /// Check value ranges.
  pub fn validate(&self) -> Result<()> {
    if !(self.periods_per_year.is_finite() && self.periods_per_year > 0.0) {
      return Err(PortfolioError::Config(format!(
        "periods_per_year must be positive, got {}",
        self.periods_per_year
      )));
    }
    if self.min_assets < 2 {
      return Err(PortfolioError::Config(format!(
        "min_assets must be at least 2, got {}",
        self.min_assets
      )));
    }
    if self.min_history < 2 {
      return Err(PortfolioError::Config(format!(
        "min_history must be at least 2, got {}",
        self.min_history
      )));
    }
    Ok(())
  }

  /// Parse a TOML document; missing keys keep their defaults.
  pub fn from_toml_str(s: &str) -> Result<Self> {
    let config: Self = toml::from_str(s).map_err(|e| PortfolioError::Config(e.to_string()))?;
    config.validate()?;
    Ok(config)
  }

  /// Load a TOML configuration file.
  pub fn from_toml_file<P: AsRef<Path>>(path: P) -> Result<Self> {
    Self::from_toml_str(&fs::read_to_string(path)?)
  }
}

/// Assets and mode of one optimization run.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizationRequest {
  /// Selected assets; their order defines the result's indexing.
  pub assets: Vec<String>,
  pub mode: OptimizationMode,
}

impl OptimizationRequest {
  pub fn new<I, S>(assets: I, mode: OptimizationMode) -> Self
  where
    I: IntoIterator<Item = S>,
    S: Into<String>,
  {
    Self {
      assets: assets.into_iter().map(Into::into).collect(),
      mode,
    }
  }
}

/// Stateless optimization engine.
#[derive(Clone, Debug, Default)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  /// Construct an engine after validating `config`.
  pub fn new(config: PortfolioEngineConfig) -> Result<Self> {
    config.validate()?;
    Ok(Self { config })
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  /// Optimize the selected columns of a price table.
  pub fn optimize(
    &self,
    table: &PriceTable,
    request: &OptimizationRequest,
  ) -> Result<OptimizationResult> {
    let returns = request
      .assets
      .iter()
      .map(|asset| {
        table
          .returns(asset)
          .ok_or_else(|| PortfolioError::UnknownAsset(asset.clone()))
      })
      .collect::<Result<Vec<_>>>()?;

    self.optimize_returns(&request.assets, &returns, request.mode)
  }

  /// Optimize from return series already aligned with `assets`.
  pub fn optimize_returns(
    &self,
    assets: &[String],
    returns: &[Vec<f64>],
    mode: OptimizationMode,
  ) -> Result<OptimizationResult> {
    self.check_selection(assets)?;
    if returns.len() != assets.len() {
      return Err(PortfolioError::DimensionMismatch {
        expected: assets.len(),
        actual: returns.len(),
      });
    }

    if let Some((asset, series)) = assets
      .iter()
      .zip(returns)
      .min_by_key(|(_, series)| series.len())
    {
      if series.len() < self.config.min_history {
        return Err(PortfolioError::InsufficientHistory {
          asset: asset.clone(),
          length: series.len(),
          required: self.config.min_history,
        });
      }
    }

    if !mode.target_in_recommended_range() {
      let (lo, hi) = OptimizationMode::RECOMMENDED_TARGET_RANGE;
      warn!(%mode, lo, hi, "target return outside the recommended range");
    }

    let stats = estimate_statistics(returns, self.config.periods_per_year);
    let weights = allocate_with_mode(mode, &stats);
    let metrics = evaluate_portfolio(&weights, &stats);

    debug!(
      %mode,
      assets = assets.len(),
      expected_return = metrics.expected_return,
      volatility = metrics.volatility,
      "optimization finished"
    );

    Ok(OptimizationResult {
      assets: assets.to_vec(),
      mode,
      weights: weights.iter().copied().collect(),
      expected_return: metrics.expected_return,
      volatility: metrics.volatility,
      sharpe: metrics.sharpe,
      risk_contribution: metrics.risk_contribution,
      diversification_ratio: metrics.diversification_ratio,
      mean_returns: stats.mean_returns.iter().copied().collect(),
      description: mode.description(),
    })
  }

  fn check_selection(&self, assets: &[String]) -> Result<()> {
    if assets.len() < self.config.min_assets {
      return Err(PortfolioError::TooFewAssets {
        selected: assets.len(),
        required: self.config.min_assets,
      });
    }
    let mut seen = HashSet::with_capacity(assets.len());
    if let Some(dup) = assets.iter().find(|asset| !seen.insert(asset.as_str())) {
      return Err(PortfolioError::DuplicateAsset(dup.clone()));
    }
    Ok(())
  }
}
