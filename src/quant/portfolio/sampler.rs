//! # Monte Carlo Sampler
//!
//! $$
//! u_i \overset{iid}{\sim} \mathcal U(0,1),\qquad w_i = \frac{u_i}{\sum_j u_j}
//! $$
//!
//! Random long-only portfolios evaluated against one set of annualized
//! statistics. Normalized uniforms are not uniform on the simplex; they
//! concentrate around equal weights.

use ndarray::Array1;
use rand::Rng;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand_distr::Distribution;
use rand_distr::Uniform;
use rayon::iter::IntoParallelIterator;
use rayon::iter::ParallelIterator;

use super::data::AnnualizedStats;
use super::metrics::PortfolioMetrics;
use super::metrics::evaluate;
use super::types::SimulationCloud;

/// Stream offset between consecutive draws of a seeded run.
const DRAW_SEED_STRIDE: u64 = 0xD134_2543_DE82_EF95;

/// Draw `n_assets` uniforms and normalize them to sum to one.
pub fn random_weights<R: Rng + ?Sized>(n_assets: usize, rng: &mut R) -> Array1<f64> {
  if n_assets == 0 {
    return Array1::zeros(0);
  }

  let uniform = Uniform::new(0.0, 1.0);
  let raw: Array1<f64> = (0..n_assets).map(|_| uniform.sample(&mut *rng)).collect();
  let total = raw.sum();

  if total > 0.0 {
    raw / total
  } else {
    Array1::from_elem(n_assets, 1.0 / n_assets as f64)
  }
}

fn draw<R: Rng + ?Sized>(
  stats: &AnnualizedStats,
  risk_free_rate: f64,
  rng: &mut R,
) -> (Array1<f64>, PortfolioMetrics) {
  let w = random_weights(stats.n_assets(), rng);
  let metrics = evaluate(
    w.view(),
    stats.mu().view(),
    stats.cov().view(),
    risk_free_rate,
  );
  (w, metrics)
}

/// Seed of the independent stream used by draw `idx` of a seeded run.
pub fn draw_seed(seed: u64, idx: usize) -> u64 {
  seed.wrapping_add(DRAW_SEED_STRIDE.wrapping_mul((idx as u64).wrapping_add(1)))
}

/// Run exactly `n_simulations` draws from the caller's generator.
pub fn simulate<R: Rng + ?Sized>(
  stats: &AnnualizedStats,
  n_simulations: usize,
  risk_free_rate: f64,
  rng: &mut R,
) -> SimulationCloud {
  let draws = (0..n_simulations)
    .map(|_| draw(stats, risk_free_rate, &mut *rng))
    .collect();
  SimulationCloud::from_draws(stats.tickers(), draws)
}

/// Sequential run where draw `i` uses its own stream seeded by [`draw_seed`].
///
/// Produces the same cloud as [`simulate_par`] for the same `seed`.
pub fn simulate_seeded(
  stats: &AnnualizedStats,
  n_simulations: usize,
  risk_free_rate: f64,
  seed: u64,
) -> SimulationCloud {
  let draws = (0..n_simulations)
    .map(|idx| {
      let mut rng = StdRng::seed_from_u64(draw_seed(seed, idx));
      draw(stats, risk_free_rate, &mut rng)
    })
    .collect();
  SimulationCloud::from_draws(stats.tickers(), draws)
}

/// Parallel run over the rayon pool; the result does not depend on the
/// number of threads.
pub fn simulate_par(
  stats: &AnnualizedStats,
  n_simulations: usize,
  risk_free_rate: f64,
  seed: u64,
) -> SimulationCloud {
  let draws = (0..n_simulations)
    .into_par_iter()
    .map(|idx| {
      let mut rng = StdRng::seed_from_u64(draw_seed(seed, idx));
      draw(stats, risk_free_rate, &mut rng)
    })
    .collect();
  SimulationCloud::from_draws(stats.tickers(), draws)
}

#[cfg(test)]
mod tests {
  use approx::assert_abs_diff_eq;
  use ndarray::array;

  use super::*;

  fn three_asset_stats() -> AnnualizedStats {
    AnnualizedStats::new(
      vec!["AAA".into(), "BBB".into(), "CCC".into()],
      array![0.08, 0.10, 0.12],
      array![[0.04, 0.01, 0.0], [0.01, 0.09, 0.02], [0.0, 0.02, 0.16]],
    )
    .unwrap()
  }

  #[test]
  fn random_weights_are_valid() {
    let mut rng = StdRng::seed_from_u64(7);
    for n in 1..12 {
      let w = random_weights(n, &mut rng);
      assert_eq!(w.len(), n);
      assert_abs_diff_eq!(w.sum(), 1.0, epsilon = 1e-9);
      assert!(w.iter().all(|v| *v >= 0.0));
    }
    assert!(random_weights(0, &mut rng).is_empty());
  }

  #[test]
  fn simulate_runs_exactly_n_draws() {
    let stats = three_asset_stats();
    let mut rng = StdRng::seed_from_u64(1);
    let cloud = simulate(&stats, 257, 0.02, &mut rng);

    assert_eq!(cloud.len(), 257);
    assert_eq!(cloud.weights().dim(), (257, 3));
    for row in cloud.weights().rows() {
      assert_abs_diff_eq!(row.sum(), 1.0, epsilon = 1e-9);
      assert!(row.iter().all(|v| *v >= 0.0));
    }
    assert!(cloud.volatilities().iter().all(|v| *v >= 0.0));
  }

  #[test]
  fn fixed_seed_reproduces_cloud() {
    let stats = three_asset_stats();
    let a = simulate(&stats, 500, 0.02, &mut StdRng::seed_from_u64(42));
    let b = simulate(&stats, 500, 0.02, &mut StdRng::seed_from_u64(42));
    let c = simulate(&stats, 500, 0.02, &mut StdRng::seed_from_u64(43));

    assert_eq!(a.weights(), b.weights());
    assert_eq!(a.returns(), b.returns());
    assert_eq!(a.volatilities(), b.volatilities());
    assert_ne!(a.weights(), c.weights());
  }

  #[test]
  fn parallel_and_sequential_seeded_runs_agree() {
    let stats = three_asset_stats();
    let par_a = simulate_par(&stats, 2_000, 0.02, 99);
    let par_b = simulate_par(&stats, 2_000, 0.02, 99);
    let seq = simulate_seeded(&stats, 2_000, 0.02, 99);

    assert_eq!(par_a.weights(), par_b.weights());
    assert_eq!(par_a.weights(), seq.weights());
    assert_eq!(par_a.sharpe_ratios(), seq.sharpe_ratios());
  }

  #[test]
  fn cloud_rows_keep_index_to_metrics_correspondence() {
    let stats = three_asset_stats();
    let cloud = simulate_par(&stats, 300, 0.01, 5);

    for idx in [0, 17, 299] {
      let c = cloud.candidate(idx).unwrap();
      let m = evaluate(
        c.weights.view(),
        stats.mu().view(),
        stats.cov().view(),
        0.01,
      );
      assert_eq!(m.expected_return, c.expected_return);
      assert_eq!(m.volatility, c.volatility);
      assert_eq!(m.sharpe, c.sharpe);
    }
    assert!(cloud.candidate(300).is_none());
  }

  #[test]
  fn zero_draws_give_empty_cloud() {
    let stats = three_asset_stats();
    let cloud = simulate(&stats, 0, 0.02, &mut StdRng::seed_from_u64(0));
    assert!(cloud.is_empty());
    assert_eq!(cloud.weights().dim(), (0, 3));
  }

  #[test]
  fn draw_seeds_differ_per_index() {
    assert_ne!(draw_seed(0, 0), draw_seed(0, 1));
    assert_eq!(draw_seed(11, 3), draw_seed(11, 3));
  }
}
