//! # Allocators
//!
//! $$
//! w_i \propto \frac{1}{\sigma_i^2},\qquad
//! w_{(r)} = \min\left(0.5\cdot 0.7^{r},\ 1-\textstyle\sum_{k<r} w_{(k)}\right)
//! $$
//!
//! Long-only allocation heuristics. None of them solves the underlying
//! quadratic program; each produces a plausible, diversified weight vector
//! from annualized means and variances.

use std::cmp::Reverse;

use nalgebra::DVector;
use ordered_float::OrderedFloat;
use tracing::debug;
use tracing::warn;

use super::estimator::AssetStatistics;
use super::types::OptimizationMode;

/// Lower bound applied to variances before inverting or taking roots.
pub const VARIANCE_FLOOR: f64 = 0.0001;

const MAX_RETURN_TOP_N: usize = 5;
const MAX_RETURN_BASE_WEIGHT: f64 = 0.5;
const MAX_RETURN_DECAY: f64 = 0.7;
const MAX_RETURN_MIN_REMAINING: f64 = 0.01;

const EFFICIENT_RETURN_FLOOR: f64 = 0.01;
const EFFICIENT_TOLERANCE: f64 = 0.001;
const EFFICIENT_MAX_ROUNDS: usize = 50;
const EFFICIENT_MAX_STEP: f64 = 0.02;
const EFFICIENT_STEP_SCALE: f64 = 0.1;
const EFFICIENT_PROGRESS: f64 = 0.9;

/// Uniform `1/n` weights.
pub fn equal_weights(n: usize) -> DVector<f64> {
  DVector::from_element(n, 1.0 / n as f64)
}

/// Clamp weights to be non-negative and rescale them to sum to one.
///
/// Falls back to [`equal_weights`] when the clamped total is not a positive
/// finite number.
pub fn normalize_weights(raw: DVector<f64>) -> DVector<f64> {
  let clamped = raw.map(|w| w.max(0.0));
  let total = clamped.sum();
  if total > 0.0 && total.is_finite() {
    clamped / total
  } else {
    equal_weights(raw.len())
  }
}

/// Inverse-variance allocation. Cross-covariances are ignored.
pub fn allocate_min_variance(stats: &AssetStatistics) -> DVector<f64> {
  let raw = DVector::from_fn(stats.len(), |i, _| {
    1.0 / stats.variance(i).max(VARIANCE_FLOOR)
  });
  normalize_weights(raw)
}

/// Rank-based allocation biased toward the highest annualized returns.
///
/// The top five assets receive `min(0.5 * 0.7^rank, remaining)` in rank
/// order until less than 1% is left; any larger leftover is shared equally
/// among the assets already holding weight.
pub fn allocate_max_return(stats: &AssetStatistics) -> DVector<f64> {
  let n = stats.len();
  let mu = &stats.mean_returns;

  let mut order: Vec<usize> = (0..n).collect();
  order.sort_by_key(|&i| Reverse(OrderedFloat(mu[i])));

  let mut w = DVector::zeros(n);
  let mut remaining = 1.0;
  for (rank, &i) in order.iter().take(MAX_RETURN_TOP_N).enumerate() {
    if remaining <= MAX_RETURN_MIN_REMAINING {
      break;
    }
    let alloc = (MAX_RETURN_BASE_WEIGHT * MAX_RETURN_DECAY.powi(rank as i32)).min(remaining);
    w[i] = alloc;
    remaining -= alloc;
  }

  if remaining > MAX_RETURN_MIN_REMAINING {
    let held = w.iter().filter(|&&x| x > 0.0).count();
    if held > 0 {
      let share = remaining / held as f64;
      for x in w.iter_mut().filter(|x| **x > 0.0) {
        *x += share;
      }
    }
  }

  normalize_weights(w)
}

/// Outcome of the efficient-mode search.
#[derive(Clone, Debug)]
struct EfficientSearch {
  weights: DVector<f64>,
  /// Rounds that adjusted at least one weight.
  rounds: usize,
  achieved_return: f64,
}

fn efficient_search(stats: &AssetStatistics, target_return: f64) -> EfficientSearch {
  let n = stats.len();
  let mu = &stats.mean_returns;

  let ratios = DVector::from_fn(n, |i, _| {
    let sigma = stats.variance(i).max(VARIANCE_FLOOR).sqrt();
    (mu[i].max(EFFICIENT_RETURN_FLOOR) / sigma).max(0.0)
  });
  let total = ratios.sum();
  let mut w = if total > 0.0 && total.is_finite() {
    ratios / total
  } else {
    warn!(total, "degenerate return-to-risk ratios, starting from equal weights");
    equal_weights(n)
  };

  let mut current = w.dot(mu);
  let mut gap = target_return - current;
  let mut rounds = 0;

  if gap.abs() > EFFICIENT_TOLERANCE {
    while rounds < EFFICIENT_MAX_ROUNDS {
      let mut adjusted = false;

      for i in 0..n {
        let diff = mu[i] - current;
        if diff * gap > 0.0 {
          // |gap| * 0.1 * |diff| / |gap|: the gap magnitude cancels.
          w[i] += (EFFICIENT_STEP_SCALE * diff.abs()).min(EFFICIENT_MAX_STEP);
          adjusted = true;
        }
      }

      if !adjusted {
        break;
      }
      rounds += 1;

      w = normalize_weights(w);
      current = w.dot(mu);
      let next_gap = target_return - current;
      let closed = next_gap.abs() < EFFICIENT_PROGRESS * gap.abs();
      gap = next_gap;
      if closed {
        break;
      }
    }
  }

  debug!(rounds, target_return, achieved = current, gap, "efficient allocation finished");
  EfficientSearch {
    weights: normalize_weights(w),
    rounds,
    achieved_return: current,
  }
}

/// Greedy return-targeting allocation.
///
/// Starts from weights proportional to `max(mu_i, 0.01) / sigma_i`, then for
/// up to 50 rounds tilts weight toward assets whose return lies on the
/// target's side of the current portfolio return. Stops once a round closes
/// at least 10% of the remaining gap or makes no adjustment. The target is
/// not guaranteed to be reached.
pub fn allocate_efficient(stats: &AssetStatistics, target_return: f64) -> DVector<f64> {
  efficient_search(stats, target_return).weights
}

/// Dispatch to the allocator selected by `mode`.
pub fn allocate_with_mode(mode: OptimizationMode, stats: &AssetStatistics) -> DVector<f64> {
  if stats.is_empty() {
    return DVector::zeros(0);
  }

  match mode {
    OptimizationMode::MinVariance => allocate_min_variance(stats),
    OptimizationMode::MaxReturn => allocate_max_return(stats),
    OptimizationMode::Efficient { target_return } => allocate_efficient(stats, target_return),
  }
}
