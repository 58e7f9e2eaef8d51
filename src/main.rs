use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use anyhow::bail;
use clap::Parser;
use frontier_mc::quant::portfolio::CsvPriceProvider;
use frontier_mc::quant::portfolio::NamedPortfolio;
use frontier_mc::quant::portfolio::OptimizationReport;
use frontier_mc::quant::portfolio::PortfolioEngine;
use frontier_mc::quant::portfolio::PortfolioEngineConfig;
use frontier_mc::quant::portfolio::TRADING_DAYS;
use frontier_mc::quant::portfolio::parse_tickers;
use frontier_mc::visualization::write_report_html;
use prettytable::Cell;
use prettytable::Row;
use prettytable::Table;
use tracing::info;
use tracing::warn;
use tracing_subscriber::EnvFilter;

/// Monte Carlo efficient frontier from historical close prices.
#[derive(Parser, Debug)]
#[command(name = "frontier", version, about)]
struct Args {
  /// CSV of close prices: `date` column followed by one column per ticker.
  #[arg(long, env = "FRONTIER_PRICES")]
  prices: Option<PathBuf>,

  /// Comma separated tickers; defaults to every column of the CSV.
  #[arg(long, short)]
  tickers: Option<String>,

  /// Years of history to use.
  #[arg(long, default_value_t = 5, value_parser = clap::value_parser!(u32).range(1..=50))]
  years: u32,

  /// Number of random portfolios.
  #[arg(long, short = 'n', default_value_t = 5_000, env = "FRONTIER_SIMULATIONS")]
  simulations: usize,

  /// Annual risk-free rate in percent.
  #[arg(long, default_value_t = 2.0)]
  risk_free: f64,

  /// Trading days per year.
  #[arg(long, default_value_t = TRADING_DAYS)]
  trading_days: usize,

  /// Seed for a reproducible run.
  #[arg(long, env = "FRONTIER_SEED")]
  seed: Option<u64>,

  /// Draw portfolios on a single thread.
  #[arg(long)]
  sequential: bool,

  /// Directory for HTML charts.
  #[arg(long)]
  html_dir: Option<PathBuf>,
}

fn weight_cell(p: &NamedPortfolio, ticker: &str) -> Cell {
  Cell::new(&format!("{:.2}%", p.weight(ticker).unwrap_or(0.0) * 100.0))
}

fn print_report(report: &OptimizationReport) {
  let max_sharpe = &report.optimal.max_sharpe;
  let min_vol = &report.optimal.min_volatility;

  let mut summary = Table::new();
  summary.set_titles(Row::new(vec![
    Cell::new("Portfolio"),
    Cell::new("Return"),
    Cell::new("Volatility"),
    Cell::new("Sharpe"),
  ]));
  for (label, p) in [("Max Sharpe", max_sharpe), ("Min volatility", min_vol)] {
    summary.add_row(Row::new(vec![
      Cell::new(label),
      Cell::new(&format!("{:.2}%", p.expected_return * 100.0)),
      Cell::new(&format!("{:.2}%", p.volatility * 100.0)),
      Cell::new(&format!("{:.3}", p.sharpe)),
    ]));
  }
  summary.printstd();

  let mut weights = Table::new();
  weights.set_titles(Row::new(vec![
    Cell::new("Ticker"),
    Cell::new("Annual return"),
    Cell::new("Max Sharpe"),
    Cell::new("Min volatility"),
  ]));
  for (i, ticker) in report.stats.tickers().iter().enumerate() {
    weights.add_row(Row::new(vec![
      Cell::new(ticker),
      Cell::new(&format!("{:.2}%", report.stats.mu()[i] * 100.0)),
      weight_cell(max_sharpe, ticker),
      weight_cell(min_vol, ticker),
    ]));
  }
  weights.printstd();
}

fn main() -> Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .init();

  let args = Args::parse();

  let engine = PortfolioEngine::new(PortfolioEngineConfig {
    n_simulations: args.simulations,
    risk_free_rate: args.risk_free / 100.0,
    trading_days: args.trading_days,
    years: args.years,
    seed: args.seed,
    parallel: !args.sequential,
  });

  let report = match &args.prices {
    Some(path) => {
      let provider = CsvPriceProvider::from_path(path)
        .with_context(|| format!("failed to read prices from {}", path.display()))?;
      let requested = match &args.tickers {
        Some(list) => parse_tickers(list),
        None => provider.columns().to_vec(),
      };
      engine.run(&provider, &provider, &requested)?
    }
    None => run_remote(&engine, args.tickers.as_deref())?,
  };

  if !report.tickers.invalid.is_empty() {
    warn!("excluded tickers: {}", report.tickers.invalid.join(", "));
  }
  info!(
    seed = report.seed,
    observations = report.observations,
    "{} simulations over {} assets",
    report.cloud.len(),
    report.stats.n_assets()
  );
  print_report(&report);

  if let Some(dir) = &args.html_dir {
    let written = write_report_html(&report, dir)
      .with_context(|| format!("failed to write charts to {}", dir.display()))?;
    for path in written {
      info!(path = %path.display(), "chart written");
    }
  }

  Ok(())
}

#[cfg(feature = "yahoo")]
fn run_remote(engine: &PortfolioEngine, tickers: Option<&str>) -> Result<OptimizationReport> {
  use frontier_mc::quant::yahoo::YahooPriceProvider;

  let Some(list) = tickers else {
    bail!("--tickers is required when fetching from Yahoo Finance");
  };
  let provider = YahooPriceProvider::new()?;
  Ok(engine.run(&provider, &provider, &parse_tickers(list))?)
}

#[cfg(not(feature = "yahoo"))]
fn run_remote(_engine: &PortfolioEngine, _tickers: Option<&str>) -> Result<OptimizationReport> {
  bail!("--prices is required (build with the `yahoo` feature to fetch quotes online)")
}
