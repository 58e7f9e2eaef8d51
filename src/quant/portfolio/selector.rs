//! # Frontier Selector
//!
//! $$
//! k_S = \arg\max_{k:\,S_k\in\mathbb R} S_k,\qquad k_\sigma = \arg\min_k \sigma_k
//! $$
//!
//! Picks the max-Sharpe and min-volatility draws from a simulation cloud.
//! Ties resolve to the lowest draw index.

use ndarray::ArrayView1;

use super::error::PortfolioError;
use super::error::Result;
use super::types::NamedPortfolio;
use super::types::OptimalPortfolios;
use super::types::SimulationCloud;

/// Index of the largest finite value, first occurrence on ties.
fn argmax_finite(values: ArrayView1<'_, f64>) -> Option<usize> {
  let mut best: Option<(usize, f64)> = None;
  for (idx, &v) in values.iter().enumerate() {
    if !v.is_finite() {
      continue;
    }
    match best {
      Some((_, b)) if v <= b => {}
      _ => best = Some((idx, v)),
    }
  }
  best.map(|(idx, _)| idx)
}

/// Index of the smallest finite value, first occurrence on ties.
fn argmin_finite(values: ArrayView1<'_, f64>) -> Option<usize> {
  let mut best: Option<(usize, f64)> = None;
  for (idx, &v) in values.iter().enumerate() {
    if !v.is_finite() {
      continue;
    }
    match best {
      Some((_, b)) if v >= b => {}
      _ => best = Some((idx, v)),
    }
  }
  best.map(|(idx, _)| idx)
}

/// Select the max-Sharpe and min-volatility portfolios.
///
/// Draws with a non-finite Sharpe ratio never win the Sharpe ranking. Fails
/// with [`PortfolioError::EmptyCloud`] on an empty cloud and with
/// [`PortfolioError::DegenerateVolatility`] when no draw has a finite Sharpe
/// ratio.
pub fn select(cloud: &SimulationCloud) -> Result<OptimalPortfolios> {
  if cloud.is_empty() {
    return Err(PortfolioError::EmptyCloud);
  }

  let max_sharpe_idx =
    argmax_finite(cloud.sharpe_ratios().view()).ok_or(PortfolioError::DegenerateVolatility)?;
  let min_vol_idx =
    argmin_finite(cloud.volatilities().view()).ok_or(PortfolioError::DegenerateVolatility)?;

  Ok(OptimalPortfolios {
    max_sharpe: NamedPortfolio::from_cloud(cloud, max_sharpe_idx),
    min_volatility: NamedPortfolio::from_cloud(cloud, min_vol_idx),
  })
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::Array1;
  use ndarray::array;
  use rand::SeedableRng;
  use rand::rngs::StdRng;

  use crate::quant::portfolio::data::AnnualizedStats;
  use crate::quant::portfolio::metrics::PortfolioMetrics;
  use crate::quant::portfolio::metrics::evaluate;
  use crate::quant::portfolio::sampler::simulate;
  use crate::quant::portfolio::sampler::simulate_par;
  use super::*;

  fn names() -> Vec<String> {
    vec!["AAA".to_string(), "BBB".to_string()]
  }

  fn two_asset_stats() -> AnnualizedStats {
    AnnualizedStats::new(
      names(),
      array![0.10, 0.05],
      array![[0.04, 0.0], [0.0, 0.01]],
    )
    .unwrap()
  }

  fn cloud_of(rows: Vec<(Array1<f64>, f64, f64, f64)>) -> SimulationCloud {
    let draws = rows
      .into_iter()
      .map(|(w, ret, vol, sharpe)| {
        (
          w,
          PortfolioMetrics {
            expected_return: ret,
            volatility: vol,
            sharpe,
          },
        )
      })
      .collect();
    SimulationCloud::from_draws(&names(), draws)
  }

  #[test]
  fn argmax_and_argmin_prefer_first_index_on_ties() {
    let v = array![1.0, 3.0, f64::NAN, 3.0, -2.0, -2.0];
    assert_eq!(argmax_finite(v.view()), Some(1));
    assert_eq!(argmin_finite(v.view()), Some(4));
    assert_eq!(argmax_finite(array![f64::NAN, f64::INFINITY].view()), None);
  }

  #[test]
  fn empty_cloud_is_rejected() {
    let cloud = cloud_of(vec![]);
    assert!(matches!(select(&cloud), Err(PortfolioError::EmptyCloud)));

    let stats = two_asset_stats();
    let cloud = simulate(&stats, 0, 0.02, &mut StdRng::seed_from_u64(3));
    assert!(matches!(select(&cloud), Err(PortfolioError::EmptyCloud)));
  }

  #[test]
  fn nan_sharpe_never_wins() {
    let cloud = cloud_of(vec![
      (array![0.5, 0.5], 0.05, 0.0, f64::NAN),
      (array![0.2, 0.8], 0.04, 0.10, -0.5),
      (array![0.9, 0.1], 0.09, 0.20, 0.2),
    ]);
    let optimal = select(&cloud).unwrap();

    assert_eq!(optimal.max_sharpe.index, 2);
    assert_eq!(optimal.min_volatility.index, 0);
  }

  #[test]
  fn all_degenerate_cloud_fails_max_sharpe() {
    let cloud = cloud_of(vec![
      (array![0.5, 0.5], 0.05, 0.0, f64::NAN),
      (array![0.3, 0.7], 0.04, 0.0, f64::NAN),
    ]);
    assert!(matches!(
      select(&cloud),
      Err(PortfolioError::DegenerateVolatility)
    ));
  }

  #[test]
  fn single_draw_is_both_portfolios() {
    let stats = two_asset_stats();
    let cloud = simulate(&stats, 1, 0.02, &mut StdRng::seed_from_u64(8));
    let optimal = select(&cloud).unwrap();

    assert_eq!(optimal.max_sharpe.index, 0);
    assert_eq!(optimal.min_volatility.index, 0);
    assert_eq!(optimal.max_sharpe.weights, optimal.min_volatility.weights);
    assert_eq!(optimal.max_sharpe.sharpe, optimal.min_volatility.sharpe);
  }

  #[test]
  fn selected_portfolios_bound_the_cloud() {
    let stats = AnnualizedStats::new(
      vec!["AAA".into(), "BBB".into(), "CCC".into()],
      array![0.08, 0.10, 0.12],
      array![[0.04, 0.01, 0.0], [0.01, 0.09, 0.02], [0.0, 0.02, 0.16]],
    )
    .unwrap();
    let cloud = simulate_par(&stats, 5_000, 0.02, 2024);
    let optimal = select(&cloud).unwrap();

    for &s in cloud.sharpe_ratios().iter().filter(|s| s.is_finite()) {
      assert!(optimal.max_sharpe.sharpe >= s);
    }
    for &v in cloud.volatilities().iter() {
      assert!(optimal.min_volatility.volatility <= v);
    }
  }

  #[test]
  fn min_volatility_favours_low_variance_asset() {
    let stats = two_asset_stats();
    let cloud = simulate(&stats, 10_000, 0.02, &mut StdRng::seed_from_u64(12345));
    let optimal = select(&cloud).unwrap();

    let equal_weight_vol = (0.25f64 * 0.04 + 0.25 * 0.01).sqrt();
    let min_vol = &optimal.min_volatility;

    assert!(min_vol.volatility <= equal_weight_vol);
    // analytic minimum is w = (0.2, 0.8)
    assert!(min_vol.weight("BBB").unwrap() > 0.7);
    assert!(min_vol.weight("BBB").unwrap() > min_vol.weight("AAA").unwrap());
    assert_abs_diff_eq!(min_vol.volatility, 0.008f64.sqrt(), epsilon = 1e-3);
  }

  #[test]
  fn identical_assets_yield_valid_weights() {
    let stats = AnnualizedStats::new(
      names(),
      array![0.07, 0.07],
      array![[0.02, 0.02], [0.02, 0.02]],
    )
    .unwrap();
    let cloud = simulate(&stats, 1_000, 0.01, &mut StdRng::seed_from_u64(77));
    let optimal = select(&cloud).unwrap();

    for p in [&optimal.max_sharpe, &optimal.min_volatility] {
      let w = p.weight_vector();
      assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-9);
      assert!(w.iter().all(|v| *v >= 0.0));
      assert_eq!(p.weights.len(), 2);
    }
  }

  #[test]
  fn stored_metrics_round_trip_from_weights() {
    let stats = two_asset_stats();
    let cloud = simulate(&stats, 2_000, 0.02, &mut StdRng::seed_from_u64(31));
    let optimal = select(&cloud).unwrap();

    for p in [&optimal.max_sharpe, &optimal.min_volatility] {
      let m = evaluate(
        p.weight_vector().view(),
        stats.mu().view(),
        stats.cov().view(),
        0.02,
      );
      assert_abs_diff_eq!(m.expected_return, p.expected_return, epsilon = 1e-12);
      assert_abs_diff_eq!(m.volatility, p.volatility, epsilon = 1e-12);
      assert_abs_diff_eq!(m.sharpe, p.sharpe, epsilon = 1e-12);
    }
  }
}
