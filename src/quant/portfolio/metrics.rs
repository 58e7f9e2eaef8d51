//! # Portfolio Metrics
//!
//! $$
//! \mu_p = \mathbf{w}^\top\mu,\qquad
//! \sigma_p = \sqrt{\mathbf{w}^\top \Sigma \mathbf{w}},\qquad
//! S = \frac{\mu_p - r_f}{\sigma_p}
//! $$

use ndarray::ArrayView1;
use ndarray::ArrayView2;

/// Volatility at or below this is treated as zero.
pub const VOLATILITY_EPSILON: f64 = 1e-15;

/// Return, risk and Sharpe ratio of a single weight vector.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PortfolioMetrics {
  pub expected_return: f64,
  pub volatility: f64,
  /// NaN when the portfolio has zero volatility.
  pub sharpe: f64,
}

impl PortfolioMetrics {
  /// True when the Sharpe ratio is undefined (zero volatility).
  pub fn is_degenerate(&self) -> bool {
    !self.sharpe.is_finite()
  }
}

/// Evaluate one portfolio against annualized returns and covariance.
///
/// Volatility uses the full quadratic form, so cross-asset covariance counts.
/// A zero-volatility portfolio gets a NaN Sharpe ratio instead of an
/// infinite one; the selector never ranks it.
pub fn evaluate(
  weights: ArrayView1<'_, f64>,
  mu: ArrayView1<'_, f64>,
  cov: ArrayView2<'_, f64>,
  risk_free_rate: f64,
) -> PortfolioMetrics {
  let expected_return = weights.dot(&mu);
  let variance = weights.dot(&cov.dot(&weights));
  let volatility = variance.max(0.0).sqrt();

  let sharpe = if volatility > VOLATILITY_EPSILON {
    (expected_return - risk_free_rate) / volatility
  } else {
    f64::NAN
  };

  PortfolioMetrics {
    expected_return,
    volatility,
    sharpe,
  }
}
