//! # Visualization
//!
//! $$
//! \{(\sigma_k,\mu_k,S_k)\}_{k=1}^N \mapsto \text{risk/return scatter coloured by } S_k
//! $$
//!
//! Plotly charts for one optimization run: the frontier cloud with the two
//! selected portfolios, allocation bars, the correlation heatmap and
//! per-asset annual returns.

use std::path::Path;
use std::path::PathBuf;

use plotly::Bar;
use plotly::HeatMap;
use plotly::Layout;
use plotly::Plot;
use plotly::Scatter;
use plotly::color::NamedColor;
use plotly::common::ColorScale;
use plotly::common::ColorScalePalette;
use plotly::common::Marker;
use plotly::common::MarkerSymbol;
use plotly::common::Mode;
use plotly::layout::Axis;
use plotly::layout::Margin;

use crate::quant::portfolio::AnnualizedStats;
use crate::quant::portfolio::NamedPortfolio;
use crate::quant::portfolio::OptimalPortfolios;
use crate::quant::portfolio::OptimizationReport;
use crate::quant::portfolio::SimulationCloud;

fn percent(v: f64) -> f64 {
  v * 100.0
}

fn layout(title: &str, x_title: &str, y_title: &str) -> Layout {
  Layout::new()
    .title(title)
    .auto_size(true)
    .height(560)
    .margin(Margin::new().left(64).right(32).top(72).bottom(56))
    .x_axis(Axis::new().title(x_title))
    .y_axis(Axis::new().title(y_title))
}

fn weights_hover(p: &NamedPortfolio) -> String {
  p.weights
    .iter()
    .map(|(t, w)| format!("{t}: {:.1}%", percent(*w)))
    .collect::<Vec<_>>()
    .join("<br>")
}

/// Scatter of every draw in (volatility, return) space, coloured by Sharpe
/// ratio, with the max-Sharpe and min-volatility portfolios highlighted.
///
/// Draws without a finite Sharpe ratio are plotted with a zero colour value.
pub fn frontier_plot(cloud: &SimulationCloud, optimal: &OptimalPortfolios) -> Plot {
  let x: Vec<f64> = cloud.volatilities().iter().map(|v| percent(*v)).collect();
  let y: Vec<f64> = cloud.returns().iter().map(|r| percent(*r)).collect();
  let colour: Vec<f64> = cloud
    .sharpe_ratios()
    .iter()
    .map(|s| if s.is_finite() { *s } else { 0.0 })
    .collect();
  let hover: Vec<String> = x
    .iter()
    .zip(y.iter())
    .zip(colour.iter())
    .map(|((v, r), s)| format!("vol: {v:.2}%<br>return: {r:.2}%<br>sharpe: {s:.3}"))
    .collect();

  let mut plot = Plot::new();
  plot.set_layout(layout(
    "Efficient frontier (Monte Carlo)",
    "Annual volatility (%)",
    "Expected annual return (%)",
  ));

  plot.add_trace(
    Scatter::new(x, y)
      .mode(Mode::Markers)
      .name("Simulated portfolios")
      .marker(
        Marker::new()
          .size(5)
          .opacity(0.6)
          .color_array(colour)
          .color_scale(ColorScale::Palette(ColorScalePalette::Viridis))
          .show_scale(true),
      )
      .hover_text_array(hover)
      .hover_template("%{hovertext}<extra></extra>"),
  );

  for (p, label, colour) in [
    (&optimal.max_sharpe, "Max Sharpe", NamedColor::Gold),
    (&optimal.min_volatility, "Min volatility", NamedColor::DeepSkyBlue),
  ] {
    plot.add_trace(
      Scatter::new(vec![percent(p.volatility)], vec![percent(p.expected_return)])
        .mode(Mode::Markers)
        .name(label)
        .marker(
          Marker::new()
            .size(18)
            .symbol(MarkerSymbol::Star)
            .color(colour),
        )
        .hover_text_array(vec![format!(
          "<b>{label}</b><br>sharpe: {:.3}<br>{}",
          p.sharpe,
          weights_hover(p)
        )])
        .hover_template("%{hovertext}<extra></extra>"),
    );
  }

  plot
}

/// Bar chart of one portfolio's weights in percent.
pub fn allocation_plot(portfolio: &NamedPortfolio, title: &str) -> Plot {
  let tickers: Vec<String> = portfolio.weights.iter().map(|(t, _)| t.clone()).collect();
  let weights: Vec<f64> = portfolio.weights.iter().map(|(_, w)| percent(*w)).collect();

  let mut plot = Plot::new();
  plot.set_layout(layout(title, "Asset", "Weight (%)"));
  plot.add_trace(Bar::new(tickers, weights).name(title));
  plot
}

/// Heatmap of the asset correlation matrix.
pub fn correlation_heatmap(stats: &AnnualizedStats) -> Plot {
  let tickers = stats.tickers().to_vec();
  let z: Vec<Vec<f64>> = stats
    .corr()
    .rows()
    .into_iter()
    .map(|row| row.to_vec())
    .collect();

  let mut plot = Plot::new();
  plot.set_layout(layout("Correlation matrix", "", ""));
  plot.add_trace(
    HeatMap::new(tickers.clone(), tickers, z)
      .color_scale(ColorScale::Palette(ColorScalePalette::RdBu)),
  );
  plot
}

/// Bar chart of each asset's expected annual return in percent.
pub fn annual_returns_plot(stats: &AnnualizedStats) -> Plot {
  let tickers = stats.tickers().to_vec();
  let returns: Vec<f64> = stats.mu().iter().map(|r| percent(*r)).collect();

  let mut plot = Plot::new();
  plot.set_layout(layout(
    "Expected annual return per asset",
    "Asset",
    "Return (%)",
  ));
  plot.add_trace(Bar::new(tickers, returns).name("Annual return"));
  plot
}

/// Write every chart of a report as standalone HTML files into `dir`.
pub fn write_report_html(report: &OptimizationReport, dir: &Path) -> std::io::Result<Vec<PathBuf>> {
  std::fs::create_dir_all(dir)?;

  let charts = [
    ("frontier.html", frontier_plot(&report.cloud, &report.optimal)),
    (
      "allocation_max_sharpe.html",
      allocation_plot(&report.optimal.max_sharpe, "Max Sharpe allocation"),
    ),
    (
      "allocation_min_volatility.html",
      allocation_plot(&report.optimal.min_volatility, "Min volatility allocation"),
    ),
    ("correlation.html", correlation_heatmap(&report.stats)),
    ("annual_returns.html", annual_returns_plot(&report.stats)),
  ];

  let mut written = Vec::with_capacity(charts.len());
  for (name, plot) in charts {
    let path = dir.join(name);
    std::fs::write(&path, plot.to_html())?;
    written.push(path);
  }
  Ok(written)
}
