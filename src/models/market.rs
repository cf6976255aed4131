use serde::{Deserialize, Serialize};
use std::fmt;

/// Nordic stock markets covered by the screener
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Market {
    /// Oslo stock exchange (.OL)
    Norway,
    /// Copenhagen stock exchange (.CO)
    Denmark,
    /// Helsinki stock exchange (.HE)
    Finland,
    /// Stockholm stock exchange (.ST)
    Sweden,
}

impl Market {
    /// Ticker suffix used by the data provider for this exchange
    pub fn suffix(&self) -> &'static str {
        match self {
            Market::Norway => ".OL",
            Market::Denmark => ".CO",
            Market::Finland => ".HE",
            Market::Sweden => ".ST",
        }
    }

    /// Filename of the ticker universe list (one ticker per line, no header)
    pub fn universe_filename(&self) -> &'static str {
        match self {
            Market::Norway => "norwegian_tickers.csv",
            Market::Denmark => "danish_tickers.csv",
            Market::Finland => "finnish_tickers.csv",
            Market::Sweden => "swedish_tickers.csv",
        }
    }

    /// Filename of the append-only metric table for this market
    pub fn metrics_filename(&self) -> &'static str {
        match self {
            Market::Norway => "metrics_norway.csv",
            Market::Denmark => "metrics_denmark.csv",
            Market::Finland => "metrics_finland.csv",
            Market::Sweden => "metrics_sweden.csv",
        }
    }

    /// Filename of the ranked output table, regenerated on every ranking pass
    pub fn ranked_filename(&self) -> &'static str {
        match self {
            Market::Norway => "ranked_norway.csv",
            Market::Denmark => "ranked_denmark.csv",
            Market::Finland => "ranked_finland.csv",
            Market::Sweden => "ranked_sweden.csv",
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Result<Self, String> {
        match s.to_lowercase().as_str() {
            "norway" | "no" => Ok(Market::Norway),
            "denmark" | "dk" => Ok(Market::Denmark),
            "finland" | "fi" => Ok(Market::Finland),
            "sweden" | "se" => Ok(Market::Sweden),
            _ => Err(format!(
                "Invalid market: '{}'. Valid options: norway, denmark, finland, sweden",
                s
            )),
        }
    }

    /// Parse multiple markets from comma-separated string or "all"
    pub fn parse_markets(s: &str) -> Result<Vec<Self>, String> {
        if s.to_lowercase() == "all" {
            return Ok(Self::all());
        }

        s.split(',')
            .map(|part| Market::from_str(part.trim()))
            .collect()
    }

    /// All supported markets
    pub fn all() -> Vec<Market> {
        vec![
            Market::Norway,
            Market::Denmark,
            Market::Finland,
            Market::Sweden,
        ]
    }

    /// String representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Market::Norway => "norway",
            Market::Denmark => "denmark",
            Market::Finland => "finland",
            Market::Sweden => "sweden",
        }
    }
}

impl fmt::Display for Market {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
