mod collect_config;
mod market;
mod metric_record;

pub use collect_config::CollectConfig;
pub use market::Market;
pub use metric_record::MetricRecord;
