use crate::constants::EBIT_LOOKBACK_YEARS;
use crate::error::{Error, Result};
use crate::models::MetricRecord;
use crate::services::provider::FundamentalsProvider;

/// Outcome of extracting metrics for one ticker
///
/// "Empty" is a permanent classification (the provider is reachable but has
/// no statements for the ticker), distinct from a provider fault, which
/// leaves the ticker unprocessed so a later run retries it.
#[derive(Debug, Clone, PartialEq)]
pub enum Extraction {
    Scored(MetricRecord),
    Empty,
}

/// Derives one metric row per ticker from the fundamentals provider
pub struct MetricExtractor<P> {
    provider: P,
}

impl<P: FundamentalsProvider> MetricExtractor<P> {
    pub fn new(provider: P) -> Self {
        Self { provider }
    }

    /// Fetch both provider artifacts for `ticker` and derive its metric row.
    pub async fn extract(&self, ticker: &str) -> Result<Extraction> {
        let profile = self.provider.profile(ticker).await?;
        let statements = self.provider.income_statements(ticker).await?;

        if statements.is_empty() {
            return Ok(Extraction::Empty);
        }

        let ebit_line = statements
            .line("EBIT")
            .filter(|line| !line.is_empty())
            .ok_or_else(|| Error::Provider(format!("No EBIT line for {}", ticker)))?;

        if ebit_line.len() < EBIT_LOOKBACK_YEARS {
            return Err(Error::Provider(format!(
                "Incomplete EBIT history for {}: {} of {} fiscal years",
                ticker,
                ebit_line.len(),
                EBIT_LOOKBACK_YEARS
            )));
        }

        let ebit_history: Vec<f64> = ebit_line
            .iter()
            .take(EBIT_LOOKBACK_YEARS)
            .map(|v| v.value)
            .collect();
        let ebit_average = ebit_history.iter().sum::<f64>() / ebit_history.len() as f64;

        Ok(Extraction::Scored(MetricRecord {
            long_name: sanitize_long_name(&profile.long_name),
            ticker: ticker.to_string(),
            ebit_history,
            ebit_average,
            enterprise_value: profile.enterprise_value,
            return_on_equity: profile.return_on_equity,
        }))
    }
}

/// Reduce a company name to ASCII by dropping non-encodable characters,
/// keeping rows byte-identical across runs for the same provider response.
fn sanitize_long_name(name: &str) -> String {
    name.chars().filter(|c| c.is_ascii()).collect()
}
