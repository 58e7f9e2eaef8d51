//! # Portfolio
//!
//! $$
//! \sigma_p^2 = \mathbf{w}^\top \Sigma \mathbf{w}
//! $$
//!
//! Monte Carlo estimation of the efficient frontier: return statistics,
//! random portfolio sampling and selection of the max-Sharpe and
//! min-volatility portfolios.

pub mod data;
pub mod engine;
pub mod error;
pub mod metrics;
pub mod provider;
pub mod sampler;
pub mod selector;
pub mod types;

pub use data::AnnualizedStats;
pub use data::MIN_ASSETS;
pub use data::PriceSeries;
pub use data::ReturnSeries;
pub use data::TRADING_DAYS;
pub use data::annualize;
pub use data::correlation_from_covariance;
pub use data::log_returns;
pub use engine::OptimizationReport;
pub use engine::PortfolioEngine;
pub use engine::PortfolioEngineConfig;
pub use engine::optimize;
pub use error::PortfolioError;
pub use error::Result;
pub use metrics::PortfolioMetrics;
pub use metrics::evaluate;
pub use provider::CsvPriceProvider;
pub use provider::PriceHistoryProvider;
pub use provider::TickerPartition;
pub use provider::TickerValidator;
pub use provider::normalize_tickers;
pub use provider::parse_tickers;
pub use sampler::random_weights;
pub use sampler::simulate;
pub use sampler::simulate_par;
pub use sampler::simulate_seeded;
pub use selector::select;
pub use types::NamedPortfolio;
pub use types::OptimalPortfolios;
pub use types::PortfolioCandidate;
pub use types::SimulationCloud;
