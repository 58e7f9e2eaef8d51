//! # Portfolio Data Utilities
//!
//! $$
//! r_t = \ln\frac{p_t}{p_{t-1}},\qquad
//! \mu = 252\,\bar r,\qquad
//! \Sigma = 252\,\widehat{\operatorname{cov}}(r)
//! $$
//!
//! Price table cleaning, log returns and annualized return statistics.

use chrono::Duration;
use chrono::NaiveDate;
use ndarray::Array1;
use ndarray::Array2;
use ndarray::ArrayView2;
use ndarray::Axis;
use ndarray::s;
use ndarray_stats::CorrelationExt;

use super::error::PortfolioError;
use super::error::Result;

/// Trading days per year used for annualization.
pub const TRADING_DAYS: usize = 252;

/// Minimum number of assets for a frontier.
pub const MIN_ASSETS: usize = 2;

/// Relative tolerance for the covariance symmetry check.
const SYMMETRY_TOLERANCE: f64 = 1e-10;

pub(crate) fn usable_price(p: &Option<f64>) -> bool {
  matches!(p, Some(v) if v.is_finite() && *v > 0.0)
}

/// Close prices aligned on a common, strictly increasing date index.
///
/// Rows are `dates`, columns follow `tickers`.
#[derive(Clone, Debug)]
pub struct PriceSeries {
  tickers: Vec<String>,
  dates: Vec<NaiveDate>,
  prices: Array2<f64>,
}

impl PriceSeries {
  /// Build a price table from raw rows, dropping every row where any asset
  /// is missing, non-finite or non-positive.
  pub fn new(tickers: Vec<String>, mut rows: Vec<(NaiveDate, Vec<Option<f64>>)>) -> Result<Self> {
    if tickers.len() < MIN_ASSETS {
      return Err(PortfolioError::InsufficientAssets {
        found: tickers.len(),
        required: MIN_ASSETS,
      });
    }

    rows.sort_by_key(|(date, _)| *date);
    if let Some(dup) = rows.windows(2).find(|w| w[0].0 == w[1].0) {
      return Err(PortfolioError::DataUnavailable(format!(
        "duplicate date {} in price history",
        dup[0].0
      )));
    }

    let n_assets = tickers.len();
    let mut dates = Vec::with_capacity(rows.len());
    let mut flat = Vec::with_capacity(rows.len() * n_assets);

    for (date, row) in rows {
      if row.len() != n_assets {
        return Err(PortfolioError::DimensionMismatch {
          what: "price row",
          expected: n_assets,
          found: row.len(),
        });
      }
      if !row.iter().all(usable_price) {
        continue;
      }
      dates.push(date);
      flat.extend(row.into_iter().flatten());
    }

    if dates.len() < 2 {
      return Err(PortfolioError::DataUnavailable(format!(
        "{} aligned price rows after cleaning, at least 2 required",
        dates.len()
      )));
    }

    let prices = Array2::from_shape_vec((dates.len(), n_assets), flat)?;
    Ok(Self {
      tickers,
      dates,
      prices,
    })
  }

  /// Keep only the trailing `years` of history, anchored at the last date.
  ///
  /// A window reaching past the earliest representable date keeps the whole
  /// history.
  pub fn tail_years(&self, years: u32) -> Result<Self> {
    let Some(&last) = self.dates.last() else {
      return Err(PortfolioError::DataUnavailable("empty price history".into()));
    };
    let first = match Duration::try_days(i64::from(years) * 365)
      .and_then(|span| last.checked_sub_signed(span))
    {
      Some(start) => self.dates.partition_point(|d| *d < start),
      None => 0,
    };

    if self.dates.len() - first < 2 {
      return Err(PortfolioError::DataUnavailable(format!(
        "fewer than 2 price rows in the last {years} year(s)"
      )));
    }

    Ok(Self {
      tickers: self.tickers.clone(),
      dates: self.dates[first..].to_vec(),
      prices: self.prices.slice(s![first.., ..]).to_owned(),
    })
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn dates(&self) -> &[NaiveDate] {
    &self.dates
  }

  /// Prices as a `dates x assets` view.
  pub fn prices(&self) -> ArrayView2<'_, f64> {
    self.prices.view()
  }

  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }

  pub fn len(&self) -> usize {
    self.dates.len()
  }

  pub fn is_empty(&self) -> bool {
    self.dates.is_empty()
  }
}

/// Daily log returns, `periods x assets`.
#[derive(Clone, Debug)]
pub struct ReturnSeries {
  tickers: Vec<String>,
  values: Array2<f64>,
}

impl ReturnSeries {
  pub fn new(tickers: Vec<String>, values: Array2<f64>) -> Result<Self> {
    if values.ncols() != tickers.len() {
      return Err(PortfolioError::DimensionMismatch {
        what: "return columns",
        expected: tickers.len(),
        found: values.ncols(),
      });
    }
    Ok(Self { tickers, values })
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  pub fn values(&self) -> ArrayView2<'_, f64> {
    self.values.view()
  }

  pub fn len(&self) -> usize {
    self.values.nrows()
  }

  pub fn is_empty(&self) -> bool {
    self.values.nrows() == 0
  }
}

/// Convert a cleaned price table to daily log returns.
pub fn log_returns(prices: &PriceSeries) -> ReturnSeries {
  let p = prices.prices();
  let ratio = &p.slice(s![1.., ..]) / &p.slice(s![..-1, ..]);

  ReturnSeries {
    tickers: prices.tickers().to_vec(),
    values: ratio.mapv(f64::ln),
  }
}

/// Annualized expected returns, covariance and correlation for one asset ordering.
#[derive(Clone, Debug)]
pub struct AnnualizedStats {
  tickers: Vec<String>,
  mu: Array1<f64>,
  cov: Array2<f64>,
  corr: Array2<f64>,
}

impl AnnualizedStats {
  /// Wrap externally supplied annual returns and covariance.
  ///
  /// Rejects mismatched dimensions, non-finite entries, negative variances and
  /// asymmetric matrices.
  pub fn new(tickers: Vec<String>, mu: Array1<f64>, cov: Array2<f64>) -> Result<Self> {
    let n = tickers.len();
    if n < MIN_ASSETS {
      return Err(PortfolioError::InsufficientAssets {
        found: n,
        required: MIN_ASSETS,
      });
    }
    if mu.len() != n {
      return Err(PortfolioError::DimensionMismatch {
        what: "annual returns",
        expected: n,
        found: mu.len(),
      });
    }
    if cov.nrows() != n || cov.ncols() != n {
      return Err(PortfolioError::DimensionMismatch {
        what: "covariance matrix",
        expected: n,
        found: if cov.nrows() != n { cov.nrows() } else { cov.ncols() },
      });
    }
    if !mu.iter().all(|v| v.is_finite()) {
      return Err(PortfolioError::InvalidReturns(
        "contains non-finite values".into(),
      ));
    }
    if !cov.iter().all(|v| v.is_finite()) {
      return Err(PortfolioError::InvalidCovariance(
        "contains non-finite values".into(),
      ));
    }

    for i in 0..n {
      if cov[[i, i]] < 0.0 {
        return Err(PortfolioError::InvalidCovariance(format!(
          "negative variance {} for {}",
          cov[[i, i]],
          tickers[i]
        )));
      }
      for j in (i + 1)..n {
        let (a, b) = (cov[[i, j]], cov[[j, i]]);
        if (a - b).abs() > SYMMETRY_TOLERANCE * a.abs().max(b.abs()).max(1.0) {
          return Err(PortfolioError::InvalidCovariance(format!(
            "entries ({i}, {j}) and ({j}, {i}) differ: {a} vs {b}"
          )));
        }
      }
    }

    let corr = correlation_from_covariance(&cov);
    Ok(Self {
      tickers,
      mu,
      cov,
      corr,
    })
  }

  pub fn tickers(&self) -> &[String] {
    &self.tickers
  }

  /// Expected annual return per asset.
  pub fn mu(&self) -> &Array1<f64> {
    &self.mu
  }

  /// Annualized covariance matrix.
  pub fn cov(&self) -> &Array2<f64> {
    &self.cov
  }

  /// Correlation matrix, for presentation only.
  pub fn corr(&self) -> &Array2<f64> {
    &self.corr
  }

  pub fn n_assets(&self) -> usize {
    self.tickers.len()
  }
}

/// Annualize daily log returns.
///
/// The covariance is the joint sample covariance (ddof = 1) over the same
/// aligned rows for every asset pair, scaled by `trading_days`.
pub fn annualize(returns: &ReturnSeries, trading_days: usize) -> Result<AnnualizedStats> {
  if trading_days == 0 {
    return Err(PortfolioError::InvalidConfig(
      "trading_days must be positive".into(),
    ));
  }
  if returns.len() < 2 {
    return Err(PortfolioError::DataUnavailable(format!(
      "{} return rows, at least 2 required to annualize",
      returns.len()
    )));
  }

  let scale = trading_days as f64;
  let values = returns.values();

  let mean = values
    .mean_axis(Axis(0))
    .ok_or_else(|| PortfolioError::DataUnavailable("empty return series".into()))?;
  let sample_cov = values
    .t()
    .cov(1.0)
    .map_err(|_| PortfolioError::DataUnavailable("empty return series".into()))?;
  // Averaging with the transpose makes the result exactly symmetric.
  let cov = (&sample_cov + &sample_cov.t()) * (0.5 * scale);

  AnnualizedStats::new(returns.tickers().to_vec(), mean * scale, cov)
}

/// Normalize a covariance matrix by per-asset standard deviations.
///
/// Assets with zero variance get zero off-diagonal correlation.
pub fn correlation_from_covariance(cov: &Array2<f64>) -> Array2<f64> {
  let n = cov.nrows();
  let sd = cov.diag().mapv(|v| v.max(0.0).sqrt());

  Array2::from_shape_fn((n, n), |(i, j)| {
    if i == j {
      return 1.0;
    }
    let denom = sd[i] * sd[j];
    if denom > 1e-15 {
      (cov[[i, j]] / denom).clamp(-1.0, 1.0)
    } else {
      0.0
    }
  })
}
