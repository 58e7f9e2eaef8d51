//! # Yahoo Finance
//!
//! Daily adjusted closes and ticker validation through `yahoo_finance_api`
//! (blocking client).

use std::collections::BTreeMap;

use chrono::DateTime;
use chrono::NaiveDate;
use time::Duration;
use time::OffsetDateTime;
use tracing::debug;
use tracing::warn;
use yahoo_finance_api as yahoo;

use crate::quant::portfolio::PortfolioError;
use crate::quant::portfolio::PriceHistoryProvider;
use crate::quant::portfolio::PriceSeries;
use crate::quant::portfolio::Result;
use crate::quant::portfolio::TickerPartition;
use crate::quant::portfolio::TickerValidator;

/// Price provider backed by the Yahoo Finance chart API.
pub struct YahooPriceProvider {
  connector: yahoo::YahooConnector,
}

impl YahooPriceProvider {
  pub fn new() -> Result<Self> {
    let connector = yahoo::YahooConnector::new()
      .map_err(|e| PortfolioError::DataUnavailable(format!("yahoo connector: {e}")))?;
    Ok(Self { connector })
  }

  fn adjusted_closes(
    &self,
    ticker: &str,
    start: OffsetDateTime,
    end: OffsetDateTime,
  ) -> Result<BTreeMap<NaiveDate, f64>> {
    let quotes = self
      .connector
      .get_quote_history(ticker, start, end)
      .and_then(|resp| resp.quotes())
      .map_err(|e| PortfolioError::DataUnavailable(format!("{ticker}: {e}")))?;

    Ok(
      quotes
        .iter()
        .filter_map(|q| {
          DateTime::from_timestamp(q.timestamp as i64, 0).map(|dt| (dt.date_naive(), q.adjclose))
        })
        .collect(),
    )
  }
}

impl TickerValidator for YahooPriceProvider {
  /// A ticker is valid when Yahoo returns at least one quote for the last 5 days.
  fn validate(&self, tickers: &[String]) -> TickerPartition {
    let mut partition = TickerPartition::default();
    for ticker in tickers {
      match self.connector.get_quote_range(ticker, "1d", "5d") {
        Ok(resp) if resp.quotes().is_ok_and(|q| !q.is_empty()) => {
          partition.valid.push(ticker.clone())
        }
        Ok(_) => partition.invalid.push(ticker.clone()),
        Err(e) => {
          debug!(%ticker, error = %e, "ticker lookup failed");
          partition.invalid.push(ticker.clone());
        }
      }
    }
    partition
  }
}

impl PriceHistoryProvider for YahooPriceProvider {
  fn fetch(&self, tickers: &[String], years: u32) -> Result<PriceSeries> {
    let end = OffsetDateTime::now_utc();
    let start = end
      .checked_sub(Duration::days(i64::from(years) * 365))
      .unwrap_or(OffsetDateTime::UNIX_EPOCH)
      .max(OffsetDateTime::UNIX_EPOCH);

    let mut columns = Vec::with_capacity(tickers.len());
    for ticker in tickers {
      let closes = self.adjusted_closes(ticker, start, end)?;
      if closes.is_empty() {
        warn!(%ticker, "no quotes returned");
      }
      columns.push(closes);
    }

    let dates: Vec<NaiveDate> = columns
      .iter()
      .flat_map(|c| c.keys().copied())
      .collect::<std::collections::BTreeSet<_>>()
      .into_iter()
      .collect();
    if dates.is_empty() {
      return Err(PortfolioError::DataUnavailable(
        "no data available for the requested tickers".into(),
      ));
    }

    let rows = dates
      .into_iter()
      .map(|d| (d, columns.iter().map(|c| c.get(&d).copied()).collect()))
      .collect();
    PriceSeries::new(tickers.to_vec(), rows)
  }
}
