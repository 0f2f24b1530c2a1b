//! # Returns
//!
//! $$
//! r_t = \frac{p_t - p_{t-1}}{p_{t-1}}
//! $$
//!

/// Convert a price series to simple period returns.
///
/// Transitions where either price is not strictly positive are skipped, so
/// the output can be shorter than `prices.len() - 1`.
pub fn simple_returns(prices: &[f64]) -> Vec<f64> {
  let mut out = Vec::with_capacity(prices.len().saturating_sub(1));
  for pair in prices.windows(2) {
    let (prev, curr) = (pair[0], pair[1]);
    if prev > 0.0 && curr > 0.0 {
      out.push((curr - prev) / prev);
    }
  }
  out
}
