use chrono::{Datelike, Utc};
use std::collections::HashSet;
use std::fs::OpenOptions;
use std::path::{Path, PathBuf};

use crate::constants::{
    EBIT_LOOKBACK_YEARS, EMPTY_TABLE_HEADER, METRIC_LEADING_COLUMNS, METRIC_TRAILING_COLUMNS,
};
use crate::error::{Error, Result};
use crate::models::{Market, MetricRecord};

/// Build the metric table header for a reference year
///
/// Year labels cover the most recent complete fiscal years, newest first.
/// They are baked into a table on first write; appends to a table with any
/// other header are rejected.
pub fn metric_table_header(reference_year: i32) -> Vec<String> {
    let mut header: Vec<String> = METRIC_LEADING_COLUMNS
        .iter()
        .map(|s| s.to_string())
        .collect();
    for offset in 1..=EBIT_LOOKBACK_YEARS as i32 {
        header.push(format!("EBIT_{}", reference_year - offset));
    }
    header.extend(METRIC_TRAILING_COLUMNS.iter().map(|s| s.to_string()));
    header
}

/// Append-only record of processed tickers, used for resumability
///
/// Two table kinds back the ledger: one metric table per market and a single
/// empty-ticker table shared across all markets. Tables are created with
/// their header on first write and never rewritten; every append is flushed
/// to disk before the next ticker is attempted.
pub struct TickerLedger {
    data_dir: PathBuf,
    results_dir: PathBuf,
    metric_header: Vec<String>,
}

impl TickerLedger {
    pub fn new(data_dir: PathBuf, results_dir: PathBuf) -> Self {
        Self::with_reference_year(data_dir, results_dir, Utc::now().year())
    }

    /// Ledger with explicit header years, used by tests for stable output
    pub fn with_reference_year(
        data_dir: PathBuf,
        results_dir: PathBuf,
        reference_year: i32,
    ) -> Self {
        Self {
            data_dir,
            results_dir,
            metric_header: metric_table_header(reference_year),
        }
    }

    /// Header of the per-market metric tables
    pub fn metric_header(&self) -> &[String] {
        &self.metric_header
    }

    pub fn metric_table_path(&self, market: Market) -> PathBuf {
        self.results_dir.join(market.metrics_filename())
    }

    pub fn empty_table_path(&self) -> PathBuf {
        self.data_dir.join("empty_tickers.csv")
    }

    /// Tickers already scored for this market, across all prior runs
    pub fn scored_tickers(&self, market: Market) -> Result<HashSet<String>> {
        read_column(&self.metric_table_path(market), &self.metric_header, 1)
    }

    /// Tickers confirmed data-empty, shared across markets
    pub fn empty_tickers(&self) -> Result<HashSet<String>> {
        let header: Vec<String> = EMPTY_TABLE_HEADER.iter().map(|s| s.to_string()).collect();
        read_column(&self.empty_table_path(), &header, 0)
    }

    /// Append one scored row; the metric table is created on first write
    pub fn record_scored(&self, market: Market, record: &MetricRecord) -> Result<()> {
        let path = self.metric_table_path(market);
        ensure_table(&path, &self.metric_header)?;
        append_row(&path, &record.to_csv_row())
    }

    /// Append one ticker to the shared empty-ticker table
    pub fn record_empty(&self, ticker: &str) -> Result<()> {
        let path = self.empty_table_path();
        let header: Vec<String> = EMPTY_TABLE_HEADER.iter().map(|s| s.to_string()).collect();
        ensure_table(&path, &header)?;
        append_row(&path, &[ticker.to_string()])
    }

    /// Read the full metric table for a market, in row order
    pub fn read_metric_table(&self, market: Market) -> Result<Vec<MetricRecord>> {
        let path = self.metric_table_path(market);
        if !path.exists() {
            return Ok(Vec::new());
        }
        check_header(&path, &self.metric_header)?;

        let mut reader = csv::Reader::from_path(&path)?;
        let mut records = Vec::new();
        for result in reader.records() {
            let row = result?;
            records.push(MetricRecord::from_csv_record(&row)?);
        }
        Ok(records)
    }
}

/// Create the table with its header if absent, else verify the header
fn ensure_table(path: &Path, header: &[String]) -> Result<()> {
    if path.exists() {
        return check_header(path, header);
    }

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;
    writer.write_record(header)?;
    writer.flush()?;
    Ok(())
}

fn check_header(path: &Path, expected: &[String]) -> Result<()> {
    let mut reader = csv::Reader::from_path(path)?;
    let found = reader.headers()?;
    if found.iter().ne(expected.iter().map(|s| s.as_str())) {
        return Err(Error::Ledger(format!(
            "Header mismatch in {}: found [{}], expected [{}]",
            path.display(),
            found.iter().collect::<Vec<_>>().join(","),
            expected.join(",")
        )));
    }
    Ok(())
}

/// Append one row and force it to disk, so a crash mid-run loses at most
/// the in-flight ticker
fn append_row(path: &Path, row: &[String]) -> Result<()> {
    let file = OpenOptions::new().append(true).open(path)?;
    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(file);
    writer.write_record(row)?;
    writer.flush()?;

    let file = writer
        .into_inner()
        .map_err(|e| Error::Io(format!("CSV writer error: {}", e)))?;
    file.sync_all()?;
    Ok(())
}

/// Membership column of a table; a missing table is an empty set
fn read_column(path: &Path, header: &[String], column: usize) -> Result<HashSet<String>> {
    if !path.exists() {
        return Ok(HashSet::new());
    }
    check_header(path, header)?;

    let mut reader = csv::Reader::from_path(path)?;
    let mut members = HashSet::new();
    for result in reader.records() {
        let row = result?;
        if let Some(value) = row.get(column) {
            members.insert(value.to_string());
        }
    }
    Ok(members)
}
