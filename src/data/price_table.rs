//! # Price Table
//!
//! CSV layout: the first header names the period column, every further header
//! is an asset identifier. Period labels are kept for display only; prices are
//! ordered by row.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use csv::Trim;
use tracing::debug;
use tracing::warn;

use crate::error::PortfolioError;
use crate::error::Result;
use crate::portfolio::returns::simple_returns;

/// Minimum number of valid prices for an asset to be usable.
pub const MIN_VALID_POINTS: usize = 10;

const MIN_COLUMNS: usize = 3;
const MIN_USABLE_ASSETS: usize = 2;

/// Parsed price history, one gap-free series per asset column.
#[derive(Clone, Debug, Default)]
pub struct PriceTable {
  assets: Vec<String>,
  periods: Vec<String>,
  prices: Vec<Vec<f64>>,
}

impl PriceTable {
  /// Parse a price table from CSV.
  ///
  /// Non-numeric cells are dropped from their asset's series, rows with only
  /// empty cells are skipped. Fails when the header has fewer than three
  /// columns or fewer than two assets keep [`MIN_VALID_POINTS`] prices.
  pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
    let mut rdr = ReaderBuilder::new()
      .has_headers(true)
      .flexible(true)
      .trim(Trim::All)
      .from_reader(reader);

    let headers = rdr.headers()?.clone();
    if headers.len() < MIN_COLUMNS {
      return Err(PortfolioError::TooFewColumns {
        found: headers.len(),
      });
    }

    let assets: Vec<String> = headers.iter().skip(1).map(str::to_string).collect();
    let mut seen = HashSet::with_capacity(assets.len());
    if let Some(dup) = assets.iter().find(|asset| !seen.insert(asset.as_str())) {
      return Err(PortfolioError::DuplicateAsset(dup.clone()));
    }
    let mut prices = vec![Vec::new(); assets.len()];
    let mut periods = Vec::new();

    for record in rdr.records() {
      let record = record?;
      if record.iter().all(str::is_empty) {
        continue;
      }

      periods.push(record.get(0).unwrap_or_default().to_string());
      for (series, cell) in prices.iter_mut().zip(record.iter().skip(1)) {
        match cell.parse::<f64>() {
          Ok(p) if p.is_finite() => series.push(p),
          _ => {}
        }
      }
    }

    let table = Self {
      assets,
      periods,
      prices,
    };

    for (asset, series) in table.assets.iter().zip(&table.prices) {
      if series.len() < MIN_VALID_POINTS {
        warn!(
          asset = asset.as_str(),
          points = series.len(),
          "asset excluded, too few valid prices"
        );
      }
    }

    let usable = table.usable_assets().count();
    if usable < MIN_USABLE_ASSETS {
      return Err(PortfolioError::InsufficientAssets { usable });
    }

    debug!(
      rows = table.len(),
      assets = table.assets.len(),
      usable,
      "price table loaded"
    );
    Ok(table)
  }

  /// Read and parse a CSV file.
  pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
    let file = File::open(path)?;
    Self::from_reader(file)
  }

  /// All asset identifiers in column order, usable or not.
  pub fn assets(&self) -> &[String] {
    &self.assets
  }

  /// Assets with at least [`MIN_VALID_POINTS`] valid prices, in column order.
  pub fn usable_assets(&self) -> impl Iterator<Item = &str> + '_ {
    self
      .assets
      .iter()
      .zip(&self.prices)
      .filter(|(_, series)| series.len() >= MIN_VALID_POINTS)
      .map(|(asset, _)| asset.as_str())
  }

  /// Period labels of the rows that were kept.
  pub fn periods(&self) -> &[String] {
    &self.periods
  }

  /// Number of rows kept.
  pub fn len(&self) -> usize {
    self.periods.len()
  }

  pub fn is_empty(&self) -> bool {
    self.periods.is_empty()
  }

  fn index_of(&self, asset: &str) -> Option<usize> {
    self.assets.iter().position(|a| a == asset)
  }

  /// Valid prices of `asset` in row order.
  pub fn prices(&self, asset: &str) -> Option<&[f64]> {
    self.index_of(asset).map(|i| self.prices[i].as_slice())
  }

  /// Simple returns of `asset`.
  pub fn returns(&self, asset: &str) -> Option<Vec<f64>> {
    self.prices(asset).map(simple_returns)
  }
}

#[cfg(test)]
mod tests {
  use std::io::Write;

  use tracing_test::traced_test;

  use super::*;

  fn sample_csv(rows: usize) -> String {
    let mut out = String::from("date,AAA,BBB,CCC\n");
    for d in 1..=rows {
      let ccc = if d < 5 { "20".to_string() } else { "n/a".to_string() };
      out.push_str(&format!(
        "2024-01-{d:02},{},{},{ccc}\n",
        100.0 + d as f64,
        50.0 + 0.5 * d as f64
      ));
    }
    out
  }

  #[test]
  fn repeated_header_is_rejected() {
    let csv = sample_csv(12).replacen("CCC", "AAA", 1);
    match PriceTable::from_reader(csv.as_bytes()) {
      Err(PortfolioError::DuplicateAsset(name)) => assert_eq!(name, "AAA"),
      other => panic!("unexpected outcome {other:?}"),
    }
  }

  #[test]
  fn parses_usable_assets_and_skips_bad_cells() {
    let table = PriceTable::from_reader(sample_csv(12).as_bytes()).unwrap();

    assert_eq!(table.assets(), ["AAA", "BBB", "CCC"]);
    assert_eq!(table.usable_assets().collect::<Vec<_>>(), ["AAA", "BBB"]);
    assert_eq!(table.len(), 12);
    assert_eq!(table.prices("AAA").unwrap().len(), 12);
    assert_eq!(table.prices("CCC").unwrap(), [20.0, 20.0, 20.0, 20.0]);
    assert_eq!(table.returns("BBB").unwrap().len(), 11);
    assert!(table.prices("ZZZ").is_none());
  }

  #[test]
  fn two_header_columns_are_rejected() {
    let csv = "date,AAA\n2024-01-01,1\n2024-01-02,2\n";
    let err = PriceTable::from_reader(csv.as_bytes()).unwrap_err();
    assert!(matches!(err, PortfolioError::TooFewColumns { found: 2 }));
  }

  #[test]
  fn too_few_usable_assets_are_rejected() {
    let err = PriceTable::from_reader(sample_csv(4).as_bytes()).unwrap_err();
    assert!(matches!(err, PortfolioError::InsufficientAssets { usable: 0 }));
  }

  #[test]
  fn empty_rows_and_whitespace_are_ignored() {
    let mut csv = String::from(" date , AAA , BBB \n");
    for d in 1..=10 {
      csv.push_str(&format!("d{d}, {} ,{}\n", d as f64, 2.0 * d as f64));
      csv.push_str(",,\n");
    }
    let table = PriceTable::from_reader(csv.as_bytes()).unwrap();

    assert_eq!(table.len(), 10);
    assert_eq!(table.periods()[0], "d1");
    assert_eq!(table.prices("AAA").unwrap()[9], 10.0);
  }

  #[test]
  fn ragged_rows_are_tolerated() {
    let mut csv = String::from("date,AAA,BBB\n");
    for d in 1..=11 {
      csv.push_str(&format!("d{d},{d},{d}\n"));
    }
    csv.push_str("d12,12\n");
    let table = PriceTable::from_reader(csv.as_bytes()).unwrap();

    assert_eq!(table.prices("AAA").unwrap().len(), 12);
    assert_eq!(table.prices("BBB").unwrap().len(), 11);
  }

  #[test]
  fn loads_from_path() {
    let mut file = tempfile::NamedTempFile::new().unwrap();
    file.write_all(sample_csv(15).as_bytes()).unwrap();

    let table = PriceTable::from_path(file.path()).unwrap();
    assert_eq!(table.usable_assets().count(), 2);
  }

  #[test]
  fn missing_file_is_an_io_error() {
    let err = PriceTable::from_path("/definitely/not/here.csv").unwrap_err();
    assert!(matches!(err, PortfolioError::Io(_)));
  }

  #[traced_test]
  #[test]
  fn excluded_assets_are_logged() {
    PriceTable::from_reader(sample_csv(12).as_bytes()).unwrap();
    assert!(logs_contain("asset excluded"));
  }
}
