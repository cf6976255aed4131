use std::cmp::Ordering;
use std::path::Path;

use crate::constants::RANKED_EXTRA_COLUMNS;
use crate::error::{Error, Result};
use crate::models::MetricRecord;

/// One metric row with its derived ranking columns
#[derive(Debug, Clone, PartialEq)]
pub struct RankedRecord {
    pub record: MetricRecord,
    /// EBIT average over enterprise value; undefined for non-positive EV
    pub ebit_ev_ratio: Option<f64>,
    pub ebit_ev_rank: usize,
    pub roe_rank: usize,
    /// Sum of the two factor ranks; lower is better
    pub total_rank: usize,
}

/// Rank a metric table by combined earnings yield and profitability
///
/// Pure function of the input rows: recomputed in full on every pass, no
/// state carried between passes.
///
/// Rank labels are assigned by sorting on a factor and then reapplying the
/// 0..n-1 input positions to the reordered rows, rather than computing a
/// conventional competition rank. Kept byte-for-byte compatible with the
/// historical output; see DESIGN.md before changing it.
pub fn rank(records: &[MetricRecord]) -> Vec<RankedRecord> {
    let n = records.len();
    // Input positions, captured before any sort
    let original_index: Vec<usize> = (0..n).collect();

    let mut rows: Vec<RankedRecord> = records
        .iter()
        .map(|record| RankedRecord {
            ebit_ev_ratio: ebit_ev_ratio(record),
            record: record.clone(),
            ebit_ev_rank: 0,
            roe_rank: 0,
            total_rank: 0,
        })
        .collect();

    rows.sort_by(|a, b| cmp_desc_undefined_last(a.ebit_ev_ratio, b.ebit_ev_ratio));
    for (pos, row) in rows.iter_mut().enumerate() {
        row.ebit_ev_rank = original_index[pos];
    }

    rows.sort_by(|a, b| {
        cmp_desc_undefined_last(
            defined(a.record.return_on_equity),
            defined(b.record.return_on_equity),
        )
    });
    for (pos, row) in rows.iter_mut().enumerate() {
        row.roe_rank = original_index[pos];
    }

    for row in rows.iter_mut() {
        row.total_rank = row.ebit_ev_rank + row.roe_rank;
    }
    rows.sort_by_key(|row| row.total_rank);

    rows
}

/// Earnings yield against enterprise value; None when the division is
/// meaningless (non-positive EV) so the row sorts after all defined ratios
fn ebit_ev_ratio(record: &MetricRecord) -> Option<f64> {
    if record.enterprise_value <= 0.0 {
        return None;
    }
    defined(record.ebit_average / record.enterprise_value)
}

fn defined(value: f64) -> Option<f64> {
    value.is_finite().then_some(value)
}

/// Descending order on defined values; undefined values last
fn cmp_desc_undefined_last(a: Option<f64>, b: Option<f64>) -> Ordering {
    match (a, b) {
        (Some(x), Some(y)) => y.partial_cmp(&x).unwrap_or(Ordering::Equal),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

/// Write the ranked table, replacing any previous ranking output
pub fn write_ranked_csv(
    path: &Path,
    metric_header: &[String],
    rows: &[RankedRecord],
) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }

    let mut writer = csv::Writer::from_path(path)?;

    let mut header: Vec<String> = metric_header.to_vec();
    header.extend(RANKED_EXTRA_COLUMNS.iter().map(|s| s.to_string()));
    writer.write_record(&header)?;

    for row in rows {
        let mut fields = row.record.to_csv_row();
        fields.push(
            row.ebit_ev_ratio
                .map(|r| r.to_string())
                .unwrap_or_default(),
        );
        fields.push(row.ebit_ev_rank.to_string());
        fields.push(row.roe_rank.to_string());
        fields.push(row.total_rank.to_string());
        writer.write_record(&fields)?;
    }

    writer.flush()?;
    writer
        .into_inner()
        .map_err(|e| Error::Io(format!("CSV writer error: {}", e)))?
        .sync_all()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    fn record(ticker: &str, ebit_average: f64, ev: f64, roe: f64) -> MetricRecord {
        MetricRecord {
            long_name: format!("{} ASA", ticker),
            ticker: ticker.to_string(),
            ebit_history: vec![ebit_average; 4],
            ebit_average,
            enterprise_value: ev,
            return_on_equity: roe,
        }
    }

    #[test]
    fn test_rank_three_rows() {
        // Ratios: A 0.1, B 0.4, C 0.025. Both factor sorts give B,A,C, so
        // ranks are B=0, A=1, C=2 on each factor and totals B=0, A=2, C=4.
        let rows = vec![
            record("A", 100.0, 1000.0, 0.10),
            record("B", 200.0, 500.0, 0.30),
            record("C", 50.0, 2000.0, 0.05),
        ];

        let ranked = rank(&rows);

        let tickers: Vec<&str> = ranked.iter().map(|r| r.record.ticker.as_str()).collect();
        assert_eq!(tickers, vec!["B", "A", "C"]);

        assert_eq!(ranked[0].ebit_ev_rank, 0);
        assert_eq!(ranked[0].roe_rank, 0);
        assert_eq!(ranked[0].total_rank, 0);

        assert_eq!(ranked[1].ebit_ev_rank, 1);
        assert_eq!(ranked[1].roe_rank, 1);
        assert_eq!(ranked[1].total_rank, 2);

        assert_eq!(ranked[2].ebit_ev_rank, 2);
        assert_eq!(ranked[2].roe_rank, 2);
        assert_eq!(ranked[2].total_rank, 4);
    }

    #[test]
    fn test_zero_enterprise_value_sorts_last() {
        let rows = vec![
            record("ZERO", 100.0, 0.0, 0.50),
            record("OK", 100.0, 1000.0, 0.10),
        ];

        let ranked = rank(&rows);

        let zero = ranked
            .iter()
            .find(|r| r.record.ticker == "ZERO")
            .unwrap();
        assert_eq!(zero.ebit_ev_ratio, None);
        // Undefined ratio takes the last earnings-yield rank label
        assert_eq!(zero.ebit_ev_rank, 1);
        assert_eq!(zero.roe_rank, 0);
    }

    #[test]
    fn test_negative_enterprise_value_is_undefined() {
        let rows = vec![
            record("NEG", 100.0, -500.0, 0.10),
            record("OK", 100.0, 1000.0, 0.20),
        ];

        let ranked = rank(&rows);
        let neg = ranked.iter().find(|r| r.record.ticker == "NEG").unwrap();
        assert_eq!(neg.ebit_ev_ratio, None);
        assert_eq!(neg.ebit_ev_rank, 1);
    }

    #[test]
    fn test_rank_is_pure() {
        let rows = vec![
            record("A", 100.0, 1000.0, 0.10),
            record("B", 200.0, 500.0, 0.30),
        ];

        assert_eq!(rank(&rows), rank(&rows));
    }

    #[test]
    fn test_rank_empty_table() {
        assert!(rank(&[]).is_empty());
    }

    #[test]
    fn test_write_ranked_csv() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("ranked_norway.csv");

        let rows = vec![
            record("A", 100.0, 1000.0, 0.10),
            record("ZERO", 100.0, 0.0, 0.50),
        ];
        let ranked = rank(&rows);

        let header = crate::services::ledger::metric_table_header(2026);
        write_ranked_csv(&path, &header, &ranked).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        let mut lines = content.lines();
        let head = lines.next().unwrap();
        assert!(head.ends_with("EBIT/EV,EBIT/EV_rank,ROE_rank,total_rank"));

        // Undefined ratio serializes as an empty field, and regeneration
        // replaces the file wholesale
        assert!(content.contains(",,"));
        write_ranked_csv(&path, &header, &ranked).unwrap();
        assert_eq!(std::fs::read_to_string(&path).unwrap(), content);
    }
}
