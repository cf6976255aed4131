use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::Result;

/// Descriptive info for one ticker
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerProfile {
    pub long_name: String,
    pub enterprise_value: f64,
    pub return_on_equity: f64,
}

/// One line-item value for a fiscal year
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FiscalValue {
    pub fiscal_year: i32,
    pub value: f64,
}

/// Annual financial statement table for one ticker
///
/// Line items indexed by name, values ordered most recent fiscal year first.
/// A ticker the provider knows but has no statements for yields an empty
/// table, which is a classification ("empty"), not an error.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct FinancialStatements {
    line_items: HashMap<String, Vec<FiscalValue>>,
}

impl FinancialStatements {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a line item, keeping values sorted most recent year first
    pub fn insert_line(&mut self, name: impl Into<String>, mut values: Vec<FiscalValue>) {
        values.sort_by(|a, b| b.fiscal_year.cmp(&a.fiscal_year));
        self.line_items.insert(name.into(), values);
    }

    /// Values for a line item, most recent fiscal year first
    pub fn line(&self, name: &str) -> Option<&[FiscalValue]> {
        self.line_items.get(name).map(|v| v.as_slice())
    }

    /// True when the table has no rows at all
    pub fn is_empty(&self) -> bool {
        self.line_items.values().all(|v| v.is_empty())
    }
}

/// Abstract interface for fetching fundamental data.
#[async_trait]
pub trait FundamentalsProvider: Send + Sync {
    /// Fetch descriptive info (long name, enterprise value, return on equity).
    async fn profile(&self, ticker: &str) -> Result<TickerProfile>;

    /// Fetch the annual financial statement table, possibly empty.
    async fn income_statements(&self, ticker: &str) -> Result<FinancialStatements>;
}
