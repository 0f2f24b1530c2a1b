//! # Statistics Estimator
//!
//! $$
//! \Sigma_{ij} = \frac{1}{m-1}\sum_{k<m}(r_{i,k}-\bar r_i)(r_{j,k}-\bar r_j),\quad m=\min(n_i,n_j)
//! $$
//!
//! Per-asset mean returns and a sample covariance matrix over the
//! overlapping prefix of each pair of return series.

use nalgebra::DMatrix;
use nalgebra::DVector;

/// Variance substituted on the diagonal when a series is too short.
pub const FALLBACK_VARIANCE: f64 = 0.01;

/// Trading periods per year used for annualization.
pub const TRADING_PERIODS_PER_YEAR: f64 = 252.0;

/// Annualized inputs for the allocator and evaluator.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetStatistics {
  /// Annualized mean return per asset.
  pub mean_returns: DVector<f64>,
  /// Annualized covariance matrix, indexed like `mean_returns`.
  pub covariance: DMatrix<f64>,
}

impl AssetStatistics {
  /// Number of assets.
  pub fn len(&self) -> usize {
    self.mean_returns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.mean_returns.is_empty()
  }

  /// Annualized variance of asset `i`.
  pub fn variance(&self, i: usize) -> f64 {
    self.covariance[(i, i)]
  }
}

fn finite_only(xs: &[f64]) -> Vec<f64> {
  xs.iter().copied().filter(|x| x.is_finite()).collect()
}

/// Arithmetic mean of the finite values, 0 when there are none.
pub fn mean_return(xs: &[f64]) -> f64 {
  let (sum, count) = xs
    .iter()
    .filter(|x| x.is_finite())
    .fold((0.0, 0usize), |(s, c), &x| (s + x, c + 1));
  if count == 0 {
    0.0
  } else {
    sum / count as f64
  }
}

fn pair_covariance(x: &[f64], mx: f64, y: &[f64], my: f64) -> f64 {
  let m = x.len().min(y.len());
  let acc: f64 = x[..m]
    .iter()
    .zip(&y[..m])
    .map(|(a, b)| (a - mx) * (b - my))
    .sum();
  acc / (m - 1) as f64
}

/// Sample covariance matrix of already filtered return series.
///
/// Each pair uses the shorter common prefix together with the full-series
/// means in `means`. Pairs with one or fewer overlapping points get
/// [`FALLBACK_VARIANCE`] on the diagonal and 0 elsewhere.
///
/// # Panics
///
/// Panics if `means` and `series` differ in length.
pub fn covariance_matrix(series: &[Vec<f64>], means: &[f64]) -> DMatrix<f64> {
  let n = series.len();
  assert_eq!(means.len(), n, "one mean per return series is required");
  let mut cov = DMatrix::zeros(n, n);

  for i in 0..n {
    for j in i..n {
      let m = series[i].len().min(series[j].len());
      let c = if m <= 1 {
        if i == j {
          FALLBACK_VARIANCE
        } else {
          0.0
        }
      } else {
        pair_covariance(&series[i], means[i], &series[j], means[j])
      };
      cov[(i, j)] = c;
      cov[(j, i)] = c;
    }
  }

  cov
}

/// Estimate annualized means and covariance from raw return series.
///
/// Non-finite values are dropped first; every entry is then scaled by
/// `periods_per_year` (simple scaling, no compounding).
pub fn estimate_statistics(returns: &[Vec<f64>], periods_per_year: f64) -> AssetStatistics {
  let filtered: Vec<Vec<f64>> = returns.iter().map(|r| finite_only(r)).collect();
  let means: Vec<f64> = filtered.iter().map(|r| mean_return(r)).collect();
  let cov = covariance_matrix(&filtered, &means);

  AssetStatistics {
    mean_returns: DVector::from_vec(means) * periods_per_year,
    covariance: cov * periods_per_year,
  }
}
