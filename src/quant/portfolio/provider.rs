//! # Market Data Providers
//!
//! Collaborator traits for price history and ticker validation, plus a
//! CSV-file implementation.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use chrono::NaiveDate;
use tracing::debug;

use super::data::PriceSeries;
use super::data::usable_price;
use super::error::PortfolioError;
use super::error::Result;

/// Source of date-aligned close prices.
pub trait PriceHistoryProvider {
  /// Fetch `years` of history for `tickers`, columns in the given order.
  fn fetch(&self, tickers: &[String], years: u32) -> Result<PriceSeries>;
}

/// Splits requested symbols into known and unknown ones.
pub trait TickerValidator {
  fn validate(&self, tickers: &[String]) -> TickerPartition;
}

/// Result of ticker validation; both lists keep request order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TickerPartition {
  pub valid: Vec<String>,
  pub invalid: Vec<String>,
}

/// Trim, uppercase, drop empty entries and de-duplicate, keeping first occurrence.
pub fn normalize_tickers<S: AsRef<str>>(raw: &[S]) -> Vec<String> {
  let mut seen = HashSet::new();
  raw
    .iter()
    .map(|t| t.as_ref().trim().to_uppercase())
    .filter(|t| !t.is_empty())
    .filter(|t| seen.insert(t.clone()))
    .collect()
}

/// Parse a ticker list separated by commas or whitespace, such as
/// `"aapl, msft GOOGL"`.
pub fn parse_tickers(input: &str) -> Vec<String> {
  normalize_tickers(&input.split(|c: char| c == ',' || c.is_whitespace()).collect::<Vec<_>>())
}

fn parse_date(raw: &str) -> Result<NaiveDate> {
  // accepts "2024-01-02", "2024-01-02 00:00:00" and "2024-01-02T00:00:00Z"
  let day = raw.split([' ', 'T']).next().unwrap_or(raw);
  NaiveDate::parse_from_str(day, "%Y-%m-%d").map_err(|source| PortfolioError::DateParse {
    value: raw.to_string(),
    source,
  })
}

/// Price history loaded from a CSV file shaped `date,T1,T2,...`.
///
/// Blank or unparseable cells are missing prices. The historical window is
/// anchored at the last date where every requested ticker has a price.
#[derive(Clone, Debug)]
pub struct CsvPriceProvider {
  columns: Vec<String>,
  rows: Vec<(NaiveDate, Vec<Option<f64>>)>,
}

impl CsvPriceProvider {
  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
    let file = File::open(path.as_ref())?;
    debug!(path = %path.as_ref().display(), "loading price csv");
    Self::from_reader(file)
  }

  pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
    let mut rdr = csv::ReaderBuilder::new()
      .trim(csv::Trim::All)
      .from_reader(reader);

    let columns: Vec<String> = rdr
      .headers()?
      .iter()
      .skip(1)
      .map(|h| h.trim().to_uppercase())
      .collect();
    if columns.is_empty() {
      return Err(PortfolioError::DataUnavailable(
        "csv has no price columns".into(),
      ));
    }

    let mut rows = Vec::new();
    for record in rdr.records() {
      let record = record?;
      let Some(date) = record.get(0) else {
        continue;
      };
      let date = parse_date(date)?;
      let prices = (0..columns.len())
        .map(|i| record.get(i + 1).and_then(|cell| cell.parse::<f64>().ok()))
        .collect();
      rows.push((date, prices));
    }

    debug!(columns = columns.len(), rows = rows.len(), "price csv loaded");
    Ok(Self { columns, rows })
  }

  /// Tickers present in the file, uppercased.
  pub fn columns(&self) -> &[String] {
    &self.columns
  }

  fn column_index(&self, ticker: &str) -> Option<usize> {
    self.columns.iter().position(|c| c.eq_ignore_ascii_case(ticker))
  }
}

impl TickerValidator for CsvPriceProvider {
  /// A ticker is valid when its column exists and holds at least one
  /// finite, positive price.
  fn validate(&self, tickers: &[String]) -> TickerPartition {
    let mut partition = TickerPartition::default();
    for ticker in tickers {
      let has_data = self
        .column_index(ticker)
        .is_some_and(|i| self.rows.iter().any(|(_, row)| usable_price(&row[i])));
      if has_data {
        partition.valid.push(ticker.clone());
      } else {
        partition.invalid.push(ticker.clone());
      }
    }
    partition
  }
}

impl PriceHistoryProvider for CsvPriceProvider {
  fn fetch(&self, tickers: &[String], years: u32) -> Result<PriceSeries> {
    let indices = tickers
      .iter()
      .map(|t| {
        self
          .column_index(t)
          .ok_or_else(|| PortfolioError::DataUnavailable(format!("no price column for {t}")))
      })
      .collect::<Result<Vec<_>>>()?;

    let rows = self
      .rows
      .iter()
      .map(|(date, row)| (*date, indices.iter().map(|&i| row[i]).collect()))
      .collect();

    PriceSeries::new(tickers.to_vec(), rows)?.tail_years(years)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use super::*;

  const CSV: &str = "\
date,AAPL,MSFT,DEAD,ZERO
2023-01-03,125.0,240.0,,0
2023-01-04,126.0,,,-1.5
2023-01-05,124.0,238.0,,NaN
2023-01-06 00:00:00,129.0,245.0,,0.0
";

  #[test]
  fn normalize_trims_uppercases_and_dedupes() {
    let raw = [" aapl", "MSFT ", "", "Aapl", "nvda"];
    assert_eq!(normalize_tickers(&raw), vec!["AAPL", "MSFT", "NVDA"]);
    assert_eq!(parse_tickers("aapl, msft,,GOOGL"), vec!["AAPL", "MSFT", "GOOGL"]);
    assert_eq!(parse_tickers("spy qqq\tspy"), vec!["SPY", "QQQ"]);
  }

  #[test]
  fn csv_validation_partitions_tickers() {
    let provider = CsvPriceProvider::from_reader(CSV.as_bytes()).unwrap();
    let request = vec![
      "MSFT".to_string(),
      "DEAD".into(),
      "ZZZZ".into(),
      "ZERO".into(),
      "AAPL".into(),
    ];
    let partition = provider.validate(&request);

    assert_eq!(partition.valid, vec!["MSFT", "AAPL"]);
    assert_eq!(partition.invalid, vec!["DEAD", "ZZZZ", "ZERO"]);
  }

  #[test]
  fn csv_fetch_aligns_and_drops_missing_rows() {
    let provider = CsvPriceProvider::from_reader(CSV.as_bytes()).unwrap();
    let prices = provider
      .fetch(&["MSFT".to_string(), "AAPL".to_string()], 5)
      .unwrap();

    assert_eq!(prices.tickers(), &["MSFT", "AAPL"]);
    assert_eq!(prices.len(), 3);
    assert_eq!(prices.prices().row(0).to_vec(), vec![240.0, 125.0]);
  }

  #[test]
  fn csv_fetch_with_unbounded_window_keeps_all_rows() {
    let provider = CsvPriceProvider::from_reader(CSV.as_bytes()).unwrap();
    let prices = provider
      .fetch(&["AAPL".to_string(), "MSFT".to_string()], u32::MAX)
      .unwrap();
    assert_eq!(prices.len(), 3);
  }

  #[test]
  fn csv_fetch_fails_without_data() {
    let provider = CsvPriceProvider::from_reader(CSV.as_bytes()).unwrap();
    let err = provider
      .fetch(&["AAPL".to_string(), "DEAD".to_string()], 5)
      .unwrap_err();
    assert!(matches!(err, PortfolioError::DataUnavailable(_)));

    let err = provider
      .fetch(&["AAPL".to_string(), "NOPE".to_string()], 5)
      .unwrap_err();
    assert!(matches!(err, PortfolioError::DataUnavailable(_)));
  }

  #[test]
  fn csv_from_path_and_bad_date() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(CSV.as_bytes()).unwrap();
    let provider = CsvPriceProvider::from_path(file.path()).unwrap();
    assert_eq!(provider.columns(), &["AAPL", "MSFT", "DEAD", "ZERO"]);

    let err = CsvPriceProvider::from_reader("date,A,B\n03/01/2023,1,2\n".as_bytes()).unwrap_err();
    assert!(matches!(err, PortfolioError::DateParse { .. }));
  }
}
