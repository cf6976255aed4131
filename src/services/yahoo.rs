use async_trait::async_trait;
use chrono::{Datelike, NaiveDate, Utc};
use isahc::{config::Configurable, prelude::*, HttpClient};
use serde_json::Value;
use std::time::Duration as StdDuration;
use tokio::time::sleep;

use crate::services::provider::{
    FinancialStatements, FiscalValue, FundamentalsProvider, TickerProfile,
};

#[derive(Debug)]
pub enum YahooError {
    Http(isahc::Error),
    Serialization(serde_json::Error),
    InvalidResponse(String),
    MissingField(String),
    RateLimit,
    NoData(String),
}

impl From<isahc::Error> for YahooError {
    fn from(error: isahc::Error) -> Self {
        YahooError::Http(error)
    }
}

impl From<serde_json::Error> for YahooError {
    fn from(error: serde_json::Error) -> Self {
        YahooError::Serialization(error)
    }
}

impl std::fmt::Display for YahooError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            YahooError::Http(e) => write!(f, "HTTP error: {}", e),
            YahooError::Serialization(e) => write!(f, "Serialization error: {}", e),
            YahooError::InvalidResponse(s) => write!(f, "Invalid response: {}", s),
            YahooError::MissingField(s) => write!(f, "Missing field: {}", s),
            YahooError::RateLimit => write!(f, "Rate limit exceeded"),
            YahooError::NoData(s) => write!(f, "No data available: {}", s),
        }
    }
}

impl std::error::Error for YahooError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            YahooError::Http(e) => Some(e),
            YahooError::Serialization(e) => Some(e),
            _ => None,
        }
    }
}

/// Line items requested from the annual fundamentals endpoint
const STATEMENT_LINE_ITEMS: &[&str] = &["EBIT", "TotalRevenue", "NetIncome"];

/// Earliest period accepted from the fundamentals endpoint (2015-01-01 UTC)
const FUNDAMENTALS_PERIOD1: i64 = 1420070400;

#[derive(Clone)]
pub struct YahooClient {
    client: HttpClient,
    quote_base_url: String,
    fundamentals_base_url: String,
    user_agents: Vec<String>,
    random_agent: bool,
}

impl YahooClient {
    pub fn new(random_agent: bool) -> Result<Self, YahooError> {
        let client = HttpClient::builder()
            .timeout(StdDuration::from_secs(30))
            .build()?;

        let user_agents = vec![
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/120.0.0.0 Safari/537.36".to_string(),
            "Mozilla/5.0 (Windows NT 10.0; Win64; x64; rv:120.0) Gecko/20100101 Firefox/120.0".to_string(),
            "Mozilla/5.0 (Macintosh; Intel Mac OS X 10_15_7) AppleWebKit/605.1.15 (KHTML, like Gecko) Version/16.3 Safari/605.1.15".to_string(),
        ];

        Ok(YahooClient {
            client,
            quote_base_url: "https://query2.finance.yahoo.com/v10/finance/quoteSummary/"
                .to_string(),
            fundamentals_base_url:
                "https://query2.finance.yahoo.com/ws/fundamentals-timeseries/v1/finance/timeseries/"
                    .to_string(),
            user_agents,
            random_agent,
        })
    }

    fn get_user_agent(&self) -> String {
        if self.random_agent {
            use rand::seq::SliceRandom;
            self.user_agents
                .choose(&mut rand::thread_rng())
                .unwrap_or(&self.user_agents[0])
                .clone()
        } else {
            self.user_agents[0].clone()
        }
    }

    async fn make_request(&self, url: &str) -> Result<Value, YahooError> {
        const MAX_RETRIES: u32 = 5;

        let mut last_error: Option<String> = None;

        for attempt in 0..MAX_RETRIES {
            if attempt > 0 {
                let delay = StdDuration::from_secs_f64(
                    2.0_f64.powi(attempt as i32 - 1) + rand::random::<f64>(),
                );
                let delay = delay.min(StdDuration::from_secs(60));
                let reason = last_error.as_deref().unwrap_or("unknown error");
                tracing::info!(
                    "Yahoo API retry backoff: attempt {}/{} - reason: {}, waiting {:.1}s before retry",
                    attempt + 1,
                    MAX_RETRIES,
                    reason,
                    delay.as_secs_f64()
                );
                sleep(delay).await;
            }

            let request = isahc::Request::builder()
                .uri(url)
                .method("GET")
                .header("Accept", "application/json, text/plain, */*")
                .header("Accept-Language", "en-US,en;q=0.9")
                .header("Connection", "keep-alive")
                .header("User-Agent", self.get_user_agent())
                .body(())
                .map_err(|e| YahooError::InvalidResponse(format!("Request build error: {}", e)))?;

            let response = self.client.send_async(request).await;

            match response {
                Ok(mut resp) => {
                    let status = resp.status();

                    if status.is_success() {
                        match resp.text().await {
                            Ok(text) => match serde_json::from_str::<Value>(&text) {
                                Ok(data) => return Ok(data),
                                Err(e) => {
                                    last_error = Some(format!("JSON parse error: {}", e));
                                    continue;
                                }
                            },
                            Err(e) => {
                                last_error = Some(format!("Response body error: {}", e));
                                continue;
                            }
                        }
                    } else {
                        let status_text = status.canonical_reason().unwrap_or("Unknown");
                        if status == 429 {
                            last_error = Some("Too Many Requests (429) - rate limited".to_string());
                            continue;
                        } else if status == 404 {
                            return Err(YahooError::NoData(format!(
                                "Not Found (404) for {}",
                                url
                            )));
                        } else if status.is_server_error() {
                            last_error = Some(format!(
                                "Server error ({}) - {}",
                                status.as_u16(),
                                status_text
                            ));
                            continue;
                        } else {
                            // Other client errors are request problems, not worth retrying
                            return Err(YahooError::InvalidResponse(format!(
                                "Client error ({}) - {} - not retryable",
                                status.as_u16(),
                                status_text
                            )));
                        }
                    }
                }
                Err(e) => {
                    last_error = Some(format!("Network error: {}", e));
                    continue;
                }
            }
        }

        match last_error.as_deref() {
            Some(reason) if reason.contains("429") => Err(YahooError::RateLimit),
            Some(reason) => Err(YahooError::InvalidResponse(format!(
                "Max retries exceeded - {}",
                reason
            ))),
            None => Err(YahooError::InvalidResponse(
                "Max retries exceeded".to_string(),
            )),
        }
    }

    /// Fetch long name, enterprise value and return on equity for one ticker
    pub async fn quote_summary(&self, symbol: &str) -> Result<TickerProfile, YahooError> {
        let url = format!(
            "{}{}?modules=price,defaultKeyStatistics,financialData",
            self.quote_base_url, symbol
        );

        let response_data = self.make_request(&url).await?;

        let summary = response_data
            .get("quoteSummary")
            .ok_or_else(|| YahooError::InvalidResponse("Missing quoteSummary".to_string()))?;

        if let Some(error) = summary.get("error") {
            if !error.is_null() {
                return Err(YahooError::NoData(format!(
                    "quoteSummary error for {}: {}",
                    symbol, error
                )));
            }
        }

        let result = summary
            .get("result")
            .and_then(|r| r.as_array())
            .and_then(|r| r.first())
            .ok_or_else(|| YahooError::NoData(format!("Empty quoteSummary for {}", symbol)))?;

        let long_name = result
            .get("price")
            .and_then(|p| p.get("longName"))
            .and_then(|v| v.as_str())
            .ok_or_else(|| YahooError::MissingField("longName".to_string()))?
            .to_string();

        let enterprise_value = result
            .get("defaultKeyStatistics")
            .and_then(|s| s.get("enterpriseValue"))
            .and_then(|v| v.get("raw"))
            .and_then(|v| v.as_f64())
            .ok_or_else(|| YahooError::MissingField("enterpriseValue".to_string()))?;

        let return_on_equity = result
            .get("financialData")
            .and_then(|s| s.get("returnOnEquity"))
            .and_then(|v| v.get("raw"))
            .and_then(|v| v.as_f64())
            .ok_or_else(|| YahooError::MissingField("returnOnEquity".to_string()))?;

        tracing::debug!(
            symbol = symbol,
            enterprise_value = enterprise_value,
            return_on_equity = return_on_equity,
            "Fetched quote summary"
        );

        Ok(TickerProfile {
            long_name,
            enterprise_value,
            return_on_equity,
        })
    }

    /// Fetch the annual statement table for one ticker, possibly empty
    pub async fn annual_statements(
        &self,
        symbol: &str,
    ) -> Result<FinancialStatements, YahooError> {
        let types: Vec<String> = STATEMENT_LINE_ITEMS
            .iter()
            .map(|item| format!("annual{}", item))
            .collect();
        let url = format!(
            "{}{}?symbol={}&type={}&period1={}&period2={}",
            self.fundamentals_base_url,
            symbol,
            symbol,
            types.join(","),
            FUNDAMENTALS_PERIOD1,
            Utc::now().timestamp()
        );

        let response_data = self.make_request(&url).await?;

        let result = response_data
            .get("timeseries")
            .and_then(|t| t.get("result"))
            .and_then(|r| r.as_array())
            .ok_or_else(|| YahooError::InvalidResponse("Missing timeseries result".to_string()))?;

        let mut statements = FinancialStatements::new();

        for entry in result {
            let entry_type = entry
                .get("meta")
                .and_then(|m| m.get("type"))
                .and_then(|t| t.as_array())
                .and_then(|t| t.first())
                .and_then(|t| t.as_str());

            let Some(entry_type) = entry_type else {
                continue;
            };

            let Some(line_name) = entry_type.strip_prefix("annual") else {
                continue;
            };

            let values = match entry.get(entry_type).and_then(|v| v.as_array()) {
                Some(values) => values,
                None => continue,
            };

            let mut fiscal_values = Vec::new();
            for value in values {
                // Years with no report come back as nulls in the array
                let Some(raw) = value
                    .get("reportedValue")
                    .and_then(|r| r.get("raw"))
                    .and_then(|r| r.as_f64())
                else {
                    continue;
                };

                let Some(fiscal_year) = value
                    .get("asOfDate")
                    .and_then(|d| d.as_str())
                    .and_then(|d| NaiveDate::parse_from_str(d, "%Y-%m-%d").ok())
                    .map(|d| d.year())
                else {
                    continue;
                };

                fiscal_values.push(FiscalValue {
                    fiscal_year,
                    value: raw,
                });
            }

            if !fiscal_values.is_empty() {
                statements.insert_line(line_name, fiscal_values);
            }
        }

        tracing::debug!(
            symbol = symbol,
            empty = statements.is_empty(),
            "Fetched annual statements"
        );

        Ok(statements)
    }
}

#[async_trait]
impl FundamentalsProvider for YahooClient {
    async fn profile(&self, ticker: &str) -> crate::error::Result<TickerProfile> {
        self.quote_summary(ticker).await.map_err(Into::into)
    }

    async fn income_statements(&self, ticker: &str) -> crate::error::Result<FinancialStatements> {
        self.annual_statements(ticker).await.map_err(Into::into)
    }
}
