use serde::{Deserialize, Serialize};

use crate::constants::EBIT_LOOKBACK_YEARS;
use crate::error::{Error, Result};

/// Fundamental metrics for one scored ticker
///
/// One row of the per-market metric table. Immutable once written: the
/// table is append-only and a ticker already present is never re-fetched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetricRecord {
    /// Company long name, reduced to ASCII so rows are byte-stable across runs
    pub long_name: String,

    /// Ticker symbol, market-suffixed (e.g. "EQNR.OL")
    pub ticker: String,

    /// EBIT per fiscal year, most recent first, provider order preserved
    pub ebit_history: Vec<f64>,

    /// Arithmetic mean of `ebit_history`
    pub ebit_average: f64,

    /// Enterprise value at fetch time
    pub enterprise_value: f64,

    /// Return on equity at fetch time
    pub return_on_equity: f64,
}

impl MetricRecord {
    /// Serialize to one CSV row matching the metric table header order
    pub fn to_csv_row(&self) -> Vec<String> {
        let mut row = Vec::with_capacity(EBIT_LOOKBACK_YEARS + 5);
        row.push(self.long_name.clone());
        row.push(self.ticker.clone());
        for ebit in &self.ebit_history {
            row.push(ebit.to_string());
        }
        row.push(self.ebit_average.to_string());
        row.push(self.enterprise_value.to_string());
        row.push(self.return_on_equity.to_string());
        row
    }

    /// Parse one CSV row in metric table column order
    pub fn from_csv_record(record: &csv::StringRecord) -> Result<Self> {
        let expected = EBIT_LOOKBACK_YEARS + 5;
        if record.len() != expected {
            return Err(Error::Parse(format!(
                "Metric row has {} fields, expected {}",
                record.len(),
                expected
            )));
        }

        let parse_field = |idx: usize, name: &str| -> Result<f64> {
            record[idx]
                .parse::<f64>()
                .map_err(|e| Error::Parse(format!("Invalid {}: {}", name, e)))
        };

        let mut ebit_history = Vec::with_capacity(EBIT_LOOKBACK_YEARS);
        for i in 0..EBIT_LOOKBACK_YEARS {
            ebit_history.push(parse_field(2 + i, "EBIT")?);
        }

        Ok(MetricRecord {
            long_name: record[0].to_string(),
            ticker: record[1].to_string(),
            ebit_history,
            ebit_average: parse_field(2 + EBIT_LOOKBACK_YEARS, "EBIT_average")?,
            enterprise_value: parse_field(3 + EBIT_LOOKBACK_YEARS, "enterprise_value")?,
            return_on_equity: parse_field(4 + EBIT_LOOKBACK_YEARS, "return_on_equity")?,
        })
    }
}
