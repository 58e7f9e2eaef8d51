//! # Portfolio Types
//!
//! $$
//! \mathbf{w}^\*=\arg\max_{k} \frac{\mathbb E[R_k]-r_f}{\sigma_k}
//! $$
//!
//! Simulation cloud and result containers shared by the sampler and selector.

use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView1;

use super::metrics::PortfolioMetrics;

/// One evaluated draw: weights plus its derived metrics.
#[derive(Clone, Debug)]
pub struct PortfolioCandidate {
  /// Non-negative weights summing to one, in the cloud's asset order.
  pub weights: Array1<f64>,
  pub expected_return: f64,
  pub volatility: f64,
  /// `(expected_return - risk_free) / volatility`, NaN when volatility is zero.
  pub sharpe: f64,
}

/// All Monte Carlo draws of one run, stored as parallel arrays indexed by draw.
#[derive(Clone, Debug)]
pub struct SimulationCloud {
  tickers: Vec<String>,
  returns: Array1<f64>,
  volatilities: Array1<f64>,
  sharpe_ratios: Array1<f64>,
  weights: Array2<f64>,
}

impl SimulationCloud {
  pub(crate) fn from_draws(tickers: &[String], draws: Vec<(Array1<f64>, PortfolioMetrics)>) -> Self {
    let n_assets = tickers.len();
    let n = draws.len();
    let mut returns = Array1::zeros(n);
    let mut volatilities = Array1::zeros(n);
    let mut sharpe_ratios = Array1::zeros(n);
    let mut weights = Array2::zeros((n, n_assets));

    for (i, (w, m)) in draws.into_iter().enumerate() {
      returns[i] = m.expected_return;
      volatilities[i] = m.volatility;
      sharpe_ratios[i] = m.sharpe;
      weights.row_mut(i).assign(&w);
    }

    Self {
      tickers: tickers.to_vec(),
      returns,
      volatilities,
      sharpe_ratios,
      weights,
    }
  }

  /// Asset ordering of the weight columns.
  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn returns(&self) -> &Array1<f64> {
    &self.returns
  }

  pub fn volatilities(&self) -> &Array1<f64> {
    &self.volatilities
  }

  pub fn sharpe_ratios(&self) -> &Array1<f64> {
    &self.sharpe_ratios
  }

  /// `draws x assets` weight matrix.
  pub fn weights(&self) -> &Array2<f64> {
    &self.weights
  }

  pub fn len(&self) -> usize {
    self.returns.len()
  }

  pub fn is_empty(&self) -> bool {
    self.returns.is_empty()
  }

  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }

  /// Stored metrics of draw `idx`.
  pub fn metrics(&self, idx: usize) -> Option<PortfolioMetrics> {
    (idx < self.len()).then(|| PortfolioMetrics {
      expected_return: self.returns[idx],
      volatility: self.volatilities[idx],
      sharpe: self.sharpe_ratios[idx],
    })
  }

  /// Candidate at draw `idx`.
  pub fn candidate(&self, idx: usize) -> Option<PortfolioCandidate> {
    (idx < self.len()).then(|| PortfolioCandidate {
      weights: self.weights.row(idx).to_owned(),
      expected_return: self.returns[idx],
      volatility: self.volatilities[idx],
      sharpe: self.sharpe_ratios[idx],
    })
  }
}

/// A selected portfolio with its weights keyed by ticker.
#[derive(Clone, Debug)]
pub struct NamedPortfolio {
  /// Draw index in the originating cloud.
  pub index: usize,
  /// `(ticker, weight)` in the cloud's asset order.
  pub weights: Vec<(String, f64)>,
  pub expected_return: f64,
  pub volatility: f64,
  pub sharpe: f64,
}

impl NamedPortfolio {
  pub(crate) fn from_cloud(cloud: &SimulationCloud, index: usize) -> Self {
    let row: ArrayView1<'_, f64> = cloud.weights().row(index);
    Self {
      index,
      weights: cloud
        .tickers()
        .iter()
        .cloned()
        .zip(row.iter().copied())
        .collect(),
      expected_return: cloud.returns()[index],
      volatility: cloud.volatilities()[index],
      sharpe: cloud.sharpe_ratios()[index],
    }
  }

  /// Weight for `ticker`, if it is part of the portfolio.
  pub fn weight(&self, ticker: &str) -> Option<f64> {
    self
      .weights
      .iter()
      .find(|(t, _)| t == ticker)
      .map(|(_, w)| *w)
  }

  /// Weights as an ordered vector, dropping the names.
  pub fn weight_vector(&self) -> Array1<f64> {
    self.weights.iter().map(|(_, w)| *w).collect()
  }
}

/// The two distinguished portfolios of one run.
#[derive(Clone, Debug)]
pub struct OptimalPortfolios {
  /// Highest finite Sharpe ratio.
  pub max_sharpe: NamedPortfolio,
  /// Lowest volatility.
  pub min_volatility: NamedPortfolio,
}
