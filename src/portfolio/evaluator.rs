//! # Portfolio Evaluator
//!
//! $$
//! \mu_p=\mathbf w^\top\mu,\quad \sigma_p^2=\mathbf w^\top\Sigma\mathbf w,\quad
//! DR=\frac{\sum_i w_i\sigma_i}{\sigma_p}
//! $$
//!

use nalgebra::DVector;
use serde::Serialize;

use super::estimator::AssetStatistics;

/// Portfolio-level risk and return figures.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct PortfolioMetrics {
  pub expected_return: f64,
  /// Floored at zero.
  pub variance: f64,
  pub volatility: f64,
  /// Zero when volatility is zero.
  pub sharpe: f64,
  /// `w_i^2 * Cov_ii / variance`; all zero when variance is zero.
  pub risk_contribution: Vec<f64>,
  /// One when volatility is zero.
  pub diversification_ratio: f64,
}

/// Evaluate `weights` against annualized statistics.
pub fn evaluate_portfolio(weights: &DVector<f64>, stats: &AssetStatistics) -> PortfolioMetrics {
  let cov = &stats.covariance;
  let expected_return = weights.dot(&stats.mean_returns);
  let variance = weights.dot(&(cov * weights)).max(0.0);
  let volatility = variance.sqrt();

  let sharpe = if volatility > 0.0 {
    expected_return / volatility
  } else {
    0.0
  };

  let risk_contribution = weights
    .iter()
    .enumerate()
    .map(|(i, w)| {
      if variance > 0.0 {
        w * w * cov[(i, i)] / variance
      } else {
        0.0
      }
    })
    .collect();

  let weighted_vol: f64 = weights
    .iter()
    .enumerate()
    .map(|(i, w)| w * cov[(i, i)].max(0.0).sqrt())
    .sum();
  let diversification_ratio = if volatility > 0.0 {
    weighted_vol / volatility
  } else {
    1.0
  };

  PortfolioMetrics {
    expected_return,
    variance,
    volatility,
    sharpe,
    risk_contribution,
    diversification_ratio,
  }
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use approx::assert_relative_eq;
  use nalgebra::DMatrix;

  use super::*;

  fn uncorrelated(mu: &[f64], var: &[f64]) -> AssetStatistics {
    AssetStatistics {
      mean_returns: DVector::from_column_slice(mu),
      covariance: DMatrix::from_diagonal(&DVector::from_column_slice(var)),
    }
  }

  #[test]
  fn metrics_match_closed_form() {
    let stats = AssetStatistics {
      mean_returns: DVector::from_vec(vec![0.1, 0.2]),
      covariance: DMatrix::from_row_slice(2, 2, &[0.04, 0.01, 0.01, 0.09]),
    };
    let w = DVector::from_vec(vec![0.6, 0.4]);
    let m = evaluate_portfolio(&w, &stats);

    let var = 0.36 * 0.04 + 2.0 * 0.24 * 0.01 + 0.16 * 0.09;
    assert_relative_eq!(m.expected_return, 0.14, epsilon = 1e-12);
    assert_relative_eq!(m.variance, var, epsilon = 1e-12);
    assert_relative_eq!(m.volatility, var.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(m.sharpe, 0.14 / var.sqrt(), epsilon = 1e-12);
    assert_relative_eq!(m.risk_contribution[0], 0.36 * 0.04 / var, epsilon = 1e-12);
    assert_relative_eq!(m.risk_contribution[1], 0.16 * 0.09 / var, epsilon = 1e-12);
    assert_relative_eq!(
      m.diversification_ratio,
      (0.6 * 0.2 + 0.4 * 0.3) / var.sqrt(),
      epsilon = 1e-12
    );
  }

  #[test]
  fn concentrated_portfolio_has_unit_diversification() {
    let stats = uncorrelated(&[0.1, 0.05, 0.07], &[0.04, 0.02, 0.03]);
    let w = DVector::from_vec(vec![1.0, 0.0, 0.0]);
    let m = evaluate_portfolio(&w, &stats);

    assert_abs_diff_eq!(m.diversification_ratio, 1.0, epsilon = 1e-12);
    assert_abs_diff_eq!(m.risk_contribution[0], 1.0, epsilon = 1e-12);
  }

  #[test]
  fn equal_uncorrelated_portfolio_is_diversified() {
    let stats = uncorrelated(&[0.1, 0.1, 0.1, 0.1], &[0.04, 0.04, 0.04, 0.04]);
    let w = DVector::from_element(4, 0.25);
    let m = evaluate_portfolio(&w, &stats);

    assert!(m.diversification_ratio > 1.0);
    assert_relative_eq!(m.diversification_ratio, 2.0, epsilon = 1e-12);
  }

  #[test]
  fn zero_variance_is_guarded() {
    let stats = uncorrelated(&[0.1, 0.2], &[0.0, 0.0]);
    let w = DVector::from_vec(vec![0.5, 0.5]);
    let m = evaluate_portfolio(&w, &stats);

    assert_eq!(m.volatility, 0.0);
    assert_eq!(m.sharpe, 0.0);
    assert_eq!(m.diversification_ratio, 1.0);
    assert!(m.risk_contribution.iter().all(|&rc| rc == 0.0));
  }

  #[test]
  fn negative_variance_is_floored() {
    let stats = AssetStatistics {
      mean_returns: DVector::from_vec(vec![0.1, 0.1]),
      covariance: DMatrix::from_row_slice(2, 2, &[0.01, -0.02, -0.02, 0.01]),
    };
    let m = evaluate_portfolio(&DVector::from_element(2, 0.5), &stats);
    assert_eq!(m.variance, 0.0);
    assert_eq!(m.volatility, 0.0);
  }
}
