//! # frontier-mc
//!
//! $$
//! \max_{k}\ \frac{\mathbf w_k^\top\mu - r_f}{\sqrt{\mathbf w_k^\top\Sigma\mathbf w_k}}
//! \quad\text{and}\quad
//! \min_{k}\ \sqrt{\mathbf w_k^\top\Sigma\mathbf w_k}
//! $$
//!
//! Estimates the mean-variance efficient frontier by Monte Carlo sampling of
//! long-only portfolios over annualized statistics derived from daily prices.
//!
//! | Module            | Description                                                        |
//! |-------------------|--------------------------------------------------------------------|
//! | [`quant::portfolio`] | Return statistics, sampler, selector and the pipeline engine.  |
//! | [`visualization`] | Plotly charts of the frontier cloud and the selected portfolios.   |
//!
//! ## Features
//!
//! - `yahoo`: price history and ticker validation through Yahoo Finance.

pub mod quant;
pub mod visualization;

pub use quant::portfolio::PortfolioEngine;
pub use quant::portfolio::PortfolioEngineConfig;
pub use quant::portfolio::PortfolioError;
pub use quant::portfolio::optimize;
