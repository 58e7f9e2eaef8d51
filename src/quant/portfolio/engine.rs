//! # Portfolio Engine
//!
//! $$
//! (\mu,\Sigma) \xrightarrow{\text{Monte Carlo}} \{(\mathbf w_k,\mu_k,\sigma_k,S_k)\}_{k=1}^N
//! \xrightarrow{\text{select}} (\mathbf w_{S}^\*, \mathbf w_{\sigma}^\*)
//! $$
//!
//! High-level orchestration: the `optimize` entry point and the full
//! request pipeline from ticker list to optimal portfolios.

use ndarray::Array1;
use ndarray::Array2;
use rand::Rng;
use tracing::debug;
use tracing::info;
use tracing::warn;

use super::data::AnnualizedStats;
use super::data::MIN_ASSETS;
use super::data::PriceSeries;
use super::data::TRADING_DAYS;
use super::data::annualize;
use super::data::log_returns;
use super::error::PortfolioError;
use super::error::Result;
use super::provider::PriceHistoryProvider;
use super::provider::TickerPartition;
use super::provider::TickerValidator;
use super::provider::normalize_tickers;
use super::sampler::simulate_par;
use super::sampler::simulate_seeded;
use super::selector::select;
use super::types::OptimalPortfolios;
use super::types::SimulationCloud;

/// Runtime configuration for [`PortfolioEngine`].
#[derive(Clone, Debug)]
pub struct PortfolioEngineConfig {
  /// Number of random portfolios per run.
  pub n_simulations: usize,
  /// Annual risk-free rate used in Sharpe ratios (0.02 = 2%).
  pub risk_free_rate: f64,
  /// Trading days per year for annualization.
  pub trading_days: usize,
  /// Years of price history requested from providers.
  pub years: u32,
  /// Master seed; `None` draws one from entropy.
  pub seed: Option<u64>,
  /// Spread draws over the rayon pool.
  pub parallel: bool,
}

impl Default for PortfolioEngineConfig {
  fn default() -> Self {
    Self {
      n_simulations: 5_000,
      risk_free_rate: 0.02,
      trading_days: TRADING_DAYS,
      years: 5,
      seed: None,
      parallel: true,
    }
  }
}

impl PortfolioEngineConfig {
  pub fn validate(&self) -> Result<()> {
    if !self.risk_free_rate.is_finite() {
      return Err(PortfolioError::InvalidConfig(format!(
        "risk_free_rate must be finite, got {}",
        self.risk_free_rate
      )));
    }
    if self.trading_days == 0 {
      return Err(PortfolioError::InvalidConfig(
        "trading_days must be positive".into(),
      ));
    }
    if self.years == 0 {
      return Err(PortfolioError::InvalidConfig(
        "years must be positive".into(),
      ));
    }
    Ok(())
  }
}

/// Everything one pipeline run produced, for reporting and plotting.
#[derive(Clone, Debug)]
pub struct OptimizationReport {
  pub tickers: TickerPartition,
  /// Number of aligned price rows used.
  pub observations: usize,
  pub stats: AnnualizedStats,
  pub cloud: SimulationCloud,
  pub optimal: OptimalPortfolios,
  /// Master seed of the run, for reproduction.
  pub seed: u64,
}

/// Single entry-point engine for frontier estimation.
#[derive(Clone, Debug)]
pub struct PortfolioEngine {
  config: PortfolioEngineConfig,
}

impl PortfolioEngine {
  /// Construct a new engine with explicit configuration.
  pub fn new(config: PortfolioEngineConfig) -> Self {
    Self { config }
  }

  /// Borrow engine configuration.
  pub fn config(&self) -> &PortfolioEngineConfig {
    &self.config
  }

  fn resolve_seed(&self) -> u64 {
    self.config.seed.unwrap_or_else(|| rand::thread_rng().gen())
  }

  /// Sample the cloud and select the optimal portfolios.
  pub fn optimize(&self, stats: &AnnualizedStats) -> Result<(SimulationCloud, OptimalPortfolios)> {
    let seed = self.resolve_seed();
    self.optimize_with_seed(stats, seed)
  }

  fn optimize_with_seed(
    &self,
    stats: &AnnualizedStats,
    seed: u64,
  ) -> Result<(SimulationCloud, OptimalPortfolios)> {
    self.config.validate()?;

    let cfg = &self.config;
    debug!(
      n_simulations = cfg.n_simulations,
      n_assets = stats.n_assets(),
      seed,
      parallel = cfg.parallel,
      "sampling portfolios"
    );

    let cloud = if cfg.parallel {
      simulate_par(stats, cfg.n_simulations, cfg.risk_free_rate, seed)
    } else {
      simulate_seeded(stats, cfg.n_simulations, cfg.risk_free_rate, seed)
    };

    let degenerate = (0..cloud.len())
      .filter(|&idx| cloud.metrics(idx).is_some_and(|m| m.is_degenerate()))
      .count();
    if degenerate > 0 {
      warn!(
        degenerate,
        total = cloud.len(),
        "draws with zero volatility excluded from max-Sharpe selection"
      );
    }

    let optimal = select(&cloud)?;
    Ok((cloud, optimal))
  }

  /// Derive statistics from a cleaned price table and optimize.
  pub fn analyze(&self, prices: &PriceSeries) -> Result<OptimizationReport> {
    self.config.validate()?;
    let returns = log_returns(prices);
    let stats = annualize(&returns, self.config.trading_days)?;
    let seed = self.resolve_seed();
    let (cloud, optimal) = self.optimize_with_seed(&stats, seed)?;

    info!(
      assets = stats.n_assets(),
      observations = prices.len(),
      draws = cloud.len(),
      max_sharpe = optimal.max_sharpe.sharpe,
      min_volatility = optimal.min_volatility.volatility,
      "frontier estimated"
    );

    Ok(OptimizationReport {
      tickers: TickerPartition {
        valid: prices.tickers().to_vec(),
        invalid: Vec::new(),
      },
      observations: prices.len(),
      stats,
      cloud,
      optimal,
      seed,
    })
  }

  /// Full request pipeline: normalize, validate, fetch, annualize, optimize.
  pub fn run<P, V>(&self, provider: &P, validator: &V, requested: &[String]) -> Result<OptimizationReport>
  where
    P: PriceHistoryProvider + ?Sized,
    V: TickerValidator + ?Sized,
  {
    self.config.validate()?;
    let tickers = normalize_tickers(requested);
    if tickers.len() < MIN_ASSETS {
      return Err(PortfolioError::InsufficientAssets {
        found: tickers.len(),
        required: MIN_ASSETS,
      });
    }

    let partition = validator.validate(&tickers);
    if !partition.invalid.is_empty() {
      warn!(invalid = ?partition.invalid, "invalid tickers excluded");
    }
    if partition.valid.len() < MIN_ASSETS {
      return Err(PortfolioError::InsufficientAssets {
        found: partition.valid.len(),
        required: MIN_ASSETS,
      });
    }

    let prices = provider.fetch(&partition.valid, self.config.years)?;
    debug!(rows = prices.len(), "price history fetched");

    let mut report = self.analyze(&prices)?;
    report.tickers = partition;
    Ok(report)
  }
}

/// Optimize directly from annualized inputs.
///
/// `annual_returns` and `cov_matrix` follow the order of `tickers`. A `seed`
/// makes the run reproducible.
pub fn optimize(
  annual_returns: Array1<f64>,
  cov_matrix: Array2<f64>,
  tickers: Vec<String>,
  n_simulations: usize,
  risk_free_rate: f64,
  seed: Option<u64>,
) -> Result<(SimulationCloud, OptimalPortfolios)> {
  let stats = AnnualizedStats::new(tickers, annual_returns, cov_matrix)?;
  let engine = PortfolioEngine::new(PortfolioEngineConfig {
    n_simulations,
    risk_free_rate,
    seed,
    ..PortfolioEngineConfig::default()
  });
  engine.optimize(&stats)
}
