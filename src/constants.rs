//! Table Format and Quota Constants
//!
//! Defines the metric table schema and the provider quota model.
//!
//! ## Metric table format
//!
//! One row per scored ticker:
//! - 2 identity columns (long_name, ticker_name)
//! - 4 EBIT columns, one per fiscal year, most recent first
//! - 3 derived columns (EBIT_average, enterprise_value, return_on_equity)
//!
//! The EBIT year labels are fixed when a table is first created; an existing
//! table whose header no longer matches is rejected rather than appended to.

/// Number of fiscal years of EBIT history kept per ticker
pub const EBIT_LOOKBACK_YEARS: usize = 4;

/// Provider requests allowed per run before a mandatory cooldown
pub const REQUESTS_PER_HOUR_CAP: u32 = 25;

/// Cooldown after the request cap is reached, in seconds
pub const QUOTA_COOLDOWN_SECS: u64 = 3600;

/// Header of the shared empty-ticker table
pub const EMPTY_TABLE_HEADER: &[&str] = &["ticker_name"];

/// Columns of the metric table preceding the EBIT year columns
pub const METRIC_LEADING_COLUMNS: &[&str] = &["long_name", "ticker_name"];

/// Columns of the metric table following the EBIT year columns
pub const METRIC_TRAILING_COLUMNS: &[&str] =
    &["EBIT_average", "enterprise_value", "return_on_equity"];

/// Derived columns appended by the ranking pass
pub const RANKED_EXTRA_COLUMNS: &[&str] =
    &["EBIT/EV", "EBIT/EV_rank", "ROE_rank", "total_rank"];
