use std::path::PathBuf;
use tracing::{info, warn};

use crate::error::Result;
use crate::models::{CollectConfig, Market};
use crate::services::extractor::{Extraction, MetricExtractor};
use crate::services::ledger::TickerLedger;
use crate::services::provider::FundamentalsProvider;
use crate::services::rate_limiter::RequestQuota;
use crate::services::universe::load_universe;

/// Outcome counts for one market pass
#[derive(Debug, Clone)]
pub struct MarketRunStats {
    pub market: Market,
    /// Tickers in the universe file
    pub universe: usize,
    /// Tickers excluded up front as already scored or known empty
    pub skipped: usize,
    /// Tickers attempted this pass
    pub attempted: usize,
    pub scored: usize,
    pub empty: usize,
    /// Provider faults; these tickers stay unprocessed and retry next run
    pub failed: usize,
}

/// Per-market collection orchestrator
///
/// Sequential by construction: one ticker at a time, one provider
/// interaction counted per ticker, cooldown pauses taken inline. A fault in
/// one ticker never aborts the pass; a ledger or universe I/O fault does.
pub struct CollectionPipeline<P> {
    extractor: MetricExtractor<P>,
    ledger: TickerLedger,
    quota: RequestQuota,
    data_dir: PathBuf,
}

impl<P: FundamentalsProvider> CollectionPipeline<P> {
    pub fn new(provider: P, config: &CollectConfig) -> Self {
        Self {
            extractor: MetricExtractor::new(provider),
            ledger: TickerLedger::new(config.data_dir.clone(), config.results_dir.clone()),
            quota: RequestQuota::new(config.request_cap, config.cooldown),
            data_dir: config.data_dir.clone(),
        }
    }

    pub fn ledger(&self) -> &TickerLedger {
        &self.ledger
    }

    pub fn quota(&self) -> &RequestQuota {
        &self.quota
    }

    /// Run the collection pass for one market
    pub async fn run_market(&mut self, market: Market) -> Result<MarketRunStats> {
        let universe_path = self.data_dir.join(market.universe_filename());
        let universe = load_universe(&universe_path)?;

        // Exclusion set computed once per pass: a ticker recorded earlier in
        // this same pass is already absent from `remaining`
        let scored = self.ledger.scored_tickers(market)?;
        let empty = self.ledger.empty_tickers()?;
        let remaining: Vec<String> = universe
            .iter()
            .filter(|ticker| !scored.contains(*ticker) && !empty.contains(*ticker))
            .cloned()
            .collect();

        let mut stats = MarketRunStats {
            market,
            universe: universe.len(),
            skipped: universe.len() - remaining.len(),
            attempted: remaining.len(),
            scored: 0,
            empty: 0,
            failed: 0,
        };

        info!(
            market = %market,
            universe = stats.universe,
            skipped = stats.skipped,
            remaining = stats.attempted,
            "Extracting metrics"
        );

        for (idx, ticker) in remaining.iter().enumerate() {
            match self.extractor.extract(ticker).await {
                Ok(Extraction::Scored(record)) => {
                    self.ledger.record_scored(market, &record)?;
                    stats.scored += 1;
                }
                Ok(Extraction::Empty) => {
                    self.ledger.record_empty(ticker)?;
                    stats.empty += 1;
                }
                Err(e) => {
                    // Left out of both tables, so the next run retries it
                    warn!(
                        market = %market,
                        ticker = %ticker,
                        index = idx + 1,
                        remaining = remaining.len(),
                        error = %e,
                        "Skipping ticker"
                    );
                    stats.failed += 1;
                }
            }

            // One provider interaction per ticker, whatever the outcome
            self.quota.note_request().await;
        }

        info!(
            market = %market,
            scored = stats.scored,
            empty = stats.empty,
            failed = stats.failed,
            pauses = self.quota.pauses(),
            "Market pass complete"
        );

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::services::provider::{
        FinancialStatements, FiscalValue, FundamentalsProvider, TickerProfile,
    };
    use async_trait::async_trait;
    use std::collections::HashSet;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use std::time::Duration;
    use tempfile::tempdir;

    /// Provider that scores every ticker except those scripted as empty or
    /// failing, counting every remote call it receives
    #[derive(Clone)]
    struct ScriptedProvider {
        calls: Arc<AtomicUsize>,
        empty: HashSet<String>,
        failing: HashSet<String>,
    }

    impl ScriptedProvider {
        fn new(empty: &[&str], failing: &[&str]) -> Self {
            Self {
                calls: Arc::new(AtomicUsize::new(0)),
                empty: empty.iter().map(|s| s.to_string()).collect(),
                failing: failing.iter().map(|s| s.to_string()).collect(),
            }
        }

        fn call_count(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl FundamentalsProvider for ScriptedProvider {
        async fn profile(&self, ticker: &str) -> Result<TickerProfile> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            if self.failing.contains(ticker) {
                return Err(Error::Provider(format!("connection reset for {}", ticker)));
            }
            Ok(TickerProfile {
                long_name: format!("{} ASA", ticker),
                enterprise_value: 1000.0,
                return_on_equity: 0.1,
            })
        }

        async fn income_statements(&self, ticker: &str) -> Result<FinancialStatements> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let mut statements = FinancialStatements::new();
            if !self.empty.contains(ticker) {
                statements.insert_line(
                    "EBIT",
                    (0..4)
                        .map(|i| FiscalValue {
                            fiscal_year: 2025 - i,
                            value: 100.0 * (4 - i) as f64,
                        })
                        .collect(),
                );
            }
            Ok(statements)
        }
    }

    fn test_config(dir: &std::path::Path) -> CollectConfig {
        CollectConfig {
            request_cap: 25,
            cooldown: Duration::from_millis(1),
            data_dir: dir.join("data"),
            results_dir: dir.join("results"),
        }
    }

    fn write_universe(config: &CollectConfig, market: Market, tickers: &[&str]) {
        std::fs::create_dir_all(&config.data_dir).unwrap();
        let mut content = tickers.join("\n");
        content.push('\n');
        std::fs::write(config.data_dir.join(market.universe_filename()), content).unwrap();
    }

    #[tokio::test]
    async fn test_second_run_issues_no_provider_calls() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        write_universe(&config, Market::Norway, &["EQNR.OL", "DNB.OL", "DEAD.OL"]);

        let provider = ScriptedProvider::new(&["DEAD.OL"], &[]);

        let mut pipeline = CollectionPipeline::new(provider.clone(), &config);
        let stats = pipeline.run_market(Market::Norway).await.unwrap();
        assert_eq!(stats.scored, 2);
        assert_eq!(stats.empty, 1);
        let calls_after_first = provider.call_count();
        assert!(calls_after_first > 0);

        let mut pipeline = CollectionPipeline::new(provider.clone(), &config);
        let stats = pipeline.run_market(Market::Norway).await.unwrap();
        assert_eq!(stats.attempted, 0);
        assert_eq!(stats.skipped, 3);
        assert_eq!(provider.call_count(), calls_after_first);
    }

    #[tokio::test]
    async fn test_fault_isolation_continues_past_failing_ticker() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        write_universe(&config, Market::Norway, &["A.OL", "BAD.OL", "C.OL"]);

        let provider = ScriptedProvider::new(&[], &["BAD.OL"]);
        let mut pipeline = CollectionPipeline::new(provider, &config);
        let stats = pipeline.run_market(Market::Norway).await.unwrap();

        assert_eq!(stats.scored, 2);
        assert_eq!(stats.failed, 1);

        let scored = pipeline.ledger().scored_tickers(Market::Norway).unwrap();
        let empty = pipeline.ledger().empty_tickers().unwrap();
        assert!(scored.contains("A.OL"));
        assert!(scored.contains("C.OL"));
        assert!(!scored.contains("BAD.OL"));
        assert!(!empty.contains("BAD.OL"));
    }

    #[tokio::test]
    async fn test_failed_ticker_is_retried_on_next_run() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        write_universe(&config, Market::Norway, &["A.OL", "BAD.OL"]);

        let mut pipeline =
            CollectionPipeline::new(ScriptedProvider::new(&[], &["BAD.OL"]), &config);
        pipeline.run_market(Market::Norway).await.unwrap();

        // The fault was transient; the next run picks the ticker back up
        let mut pipeline = CollectionPipeline::new(ScriptedProvider::new(&[], &[]), &config);
        let stats = pipeline.run_market(Market::Norway).await.unwrap();
        assert_eq!(stats.attempted, 1);
        assert_eq!(stats.scored, 1);
        assert!(pipeline
            .ledger()
            .scored_tickers(Market::Norway)
            .unwrap()
            .contains("BAD.OL"));
    }

    #[tokio::test]
    async fn test_partition_invariant_after_mixed_outcomes() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let universe = ["A.OL", "B.OL", "EMPTY.OL", "BAD.OL", "E.OL"];
        write_universe(&config, Market::Norway, &universe);

        let provider = ScriptedProvider::new(&["EMPTY.OL"], &["BAD.OL"]);
        let mut pipeline = CollectionPipeline::new(provider, &config);
        pipeline.run_market(Market::Norway).await.unwrap();

        let scored = pipeline.ledger().scored_tickers(Market::Norway).unwrap();
        let empty = pipeline.ledger().empty_tickers().unwrap();

        for ticker in &universe {
            let in_scored = scored.contains(*ticker);
            let in_empty = empty.contains(*ticker);
            let unprocessed = *ticker == "BAD.OL";
            // Exactly one of {scored, empty, unprocessed}
            assert_eq!(
                [in_scored, in_empty, unprocessed].iter().filter(|&&b| b).count(),
                1,
                "partition violated for {}",
                ticker
            );
        }
    }

    #[tokio::test]
    async fn test_empty_ticker_excluded_across_markets() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        write_universe(&config, Market::Norway, &["DEAD.XX"]);
        write_universe(&config, Market::Sweden, &["DEAD.XX", "VOLV-B.ST"]);

        let provider = ScriptedProvider::new(&["DEAD.XX"], &[]);
        let mut pipeline = CollectionPipeline::new(provider.clone(), &config);
        pipeline.run_market(Market::Norway).await.unwrap();

        let stats = pipeline.run_market(Market::Sweden).await.unwrap();
        assert_eq!(stats.skipped, 1);
        assert_eq!(stats.scored, 1);
    }

    #[tokio::test]
    async fn test_quota_pause_before_ticker_26() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        let tickers: Vec<String> = (0..30).map(|i| format!("T{:02}.OL", i)).collect();
        let refs: Vec<&str> = tickers.iter().map(|s| s.as_str()).collect();
        write_universe(&config, Market::Norway, &refs);

        let provider = ScriptedProvider::new(&[], &[]);
        let mut pipeline = CollectionPipeline::new(provider, &config);
        pipeline.run_market(Market::Norway).await.unwrap();

        assert_eq!(pipeline.quota().pauses(), 1);
        assert_eq!(pipeline.quota().used(), 5);
    }

    #[tokio::test]
    async fn test_missing_universe_file_is_fatal() {
        let dir = tempdir().unwrap();
        let config = test_config(dir.path());
        std::fs::create_dir_all(&config.data_dir).unwrap();

        let mut pipeline = CollectionPipeline::new(ScriptedProvider::new(&[], &[]), &config);
        assert!(pipeline.run_market(Market::Norway).await.is_err());
    }
}
