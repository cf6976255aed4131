pub mod extractor;
pub mod ledger;
pub mod pipeline;
pub mod provider;
pub mod ranking;
pub mod rate_limiter;
pub mod universe;
pub mod yahoo;

pub use extractor::{Extraction, MetricExtractor};
pub use ledger::{metric_table_header, TickerLedger};
pub use pipeline::{CollectionPipeline, MarketRunStats};
pub use provider::{FinancialStatements, FiscalValue, FundamentalsProvider, TickerProfile};
pub use ranking::{rank, write_ranked_csv, RankedRecord};
pub use rate_limiter::RequestQuota;
pub use universe::{append_suffix, load_universe};
pub use yahoo::{YahooClient, YahooError};
