//! # Portfolio Types
//!
//! $$
//! \text{Sharpe} = \frac{\mathbb E[R_p]}{\sigma_p}
//! $$
//!
//! Optimization modes and the result record of a run.

use std::fmt::Display;

use serde::Deserialize;
use serde::Serialize;

/// Allocation heuristic used for a run.
///
/// Each variant maps to one allocator in [`super::allocator`]; an exact
/// solver would be added as a new variant.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "mode", rename_all = "kebab-case")]
pub enum OptimizationMode {
  /// Weights proportional to inverse own variance.
  MinVariance,
  /// Geometrically decaying weights over the top-ranked returns.
  MaxReturn,
  /// Return-to-risk weights nudged toward a target annual return.
  Efficient {
    /// Target annual return, recommended within [0.05, 0.30].
    target_return: f64,
  },
}

impl OptimizationMode {
  /// Recommended range for the efficient mode's target return.
  pub const RECOMMENDED_TARGET_RANGE: (f64, f64) = (0.05, 0.30);

  /// Human-readable description of the method.
  pub fn description(&self) -> String {
    match self {
      Self::MinVariance => concat!(
        "Minimum variance: weights proportional to the inverse of each asset's ",
        "own variance (cross-covariances ignored)"
      )
      .to_string(),
      Self::MaxReturn => concat!(
        "Maximum return: up to five top-returning assets with geometrically ",
        "decaying weights, leftover spread across held assets"
      )
      .to_string(),
      Self::Efficient { target_return } => format!(
        "Efficient heuristic: return-to-risk weights adjusted toward a {:.1}% target annual return",
        target_return * 100.0
      ),
    }
  }

  /// Whether the target return (if any) lies in the recommended range.
  pub fn target_in_recommended_range(&self) -> bool {
    match self {
      Self::Efficient { target_return } => {
        let (lo, hi) = Self::RECOMMENDED_TARGET_RANGE;
        (lo..=hi).contains(target_return)
      }
      _ => true,
    }
  }
}

impl Display for OptimizationMode {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::MinVariance => write!(f, "min-variance"),
      Self::MaxReturn => write!(f, "max-return"),
      Self::Efficient { target_return } => write!(f, "efficient({target_return})"),
    }
  }
}

/// Output of a single optimization run.
#[derive(Clone, Debug, Serialize)]
pub struct OptimizationResult {
  /// Asset identifiers in indexing order.
  pub assets: Vec<String>,
  /// Mode the run was made with.
  pub mode: OptimizationMode,
  /// Final weights, non-negative and summing to one.
  pub weights: Vec<f64>,
  /// Annualized expected portfolio return.
  pub expected_return: f64,
  /// Annualized portfolio volatility.
  pub volatility: f64,
  /// `expected_return / volatility` with a zero risk-free rate.
  pub sharpe: f64,
  /// Share of portfolio variance from each asset's own variance.
  pub risk_contribution: Vec<f64>,
  /// Weighted average asset volatility over portfolio volatility.
  pub diversification_ratio: f64,
  /// Annualized mean return per asset.
  pub mean_returns: Vec<f64>,
  /// Human-readable description of the method used.
  pub description: String,
}

impl OptimizationResult {
  /// Iterate `(asset, weight)` pairs in indexing order.
  pub fn allocations(&self) -> impl Iterator<Item = (&str, f64)> + '_ {
    self
      .assets
      .iter()
      .map(String::as_str)
      .zip(self.weights.iter().copied())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn efficient_description_mentions_target() {
    let mode = OptimizationMode::Efficient {
      target_return: 0.12,
    };
    assert!(mode.description().contains("12.0%"));
  }

  #[test]
  fn fixed_mode_descriptions_name_the_rule() {
    assert!(OptimizationMode::MinVariance
      .description()
      .ends_with("own variance (cross-covariances ignored)"));
    assert!(OptimizationMode::MaxReturn
      .description()
      .contains("geometrically decaying weights"));
  }

  #[test]
  fn recommended_range_only_applies_to_efficient() {
    assert!(OptimizationMode::MaxReturn.target_in_recommended_range());
    assert!(OptimizationMode::Efficient { target_return: 0.3 }.target_in_recommended_range());
    assert!(!OptimizationMode::Efficient { target_return: 0.5 }.target_in_recommended_range());
  }

  #[test]
  fn mode_serializes_with_tag() {
    let json = serde_json::to_string(&OptimizationMode::Efficient {
      target_return: 0.1,
    })
    .unwrap();
    assert_eq!(json, r#"{"mode":"efficient","target_return":0.1}"#);

    let back: OptimizationMode = serde_json::from_str(r#"{"mode":"min-variance"}"#).unwrap();
    assert_eq!(back, OptimizationMode::MinVariance);
  }
}
