use std::path::PathBuf;
use std::time::Duration;

use crate::constants::{QUOTA_COOLDOWN_SECS, REQUESTS_PER_HOUR_CAP};
use crate::utils::{get_data_dir, get_results_dir};

/// Configuration for a collection run
#[derive(Debug, Clone)]
pub struct CollectConfig {
    /// Provider requests allowed before a mandatory cooldown
    pub request_cap: u32,

    /// How long to pause once the cap is reached
    pub cooldown: Duration,

    /// Directory holding universe files and the shared empty-ticker table
    pub data_dir: PathBuf,

    /// Directory holding metric tables and ranked output
    pub results_dir: PathBuf,
}

impl Default for CollectConfig {
    fn default() -> Self {
        Self {
            request_cap: REQUESTS_PER_HOUR_CAP,
            cooldown: Duration::from_secs(QUOTA_COOLDOWN_SECS),
            data_dir: get_data_dir(),
            results_dir: get_results_dir(),
        }
    }
}

impl CollectConfig {
    /// Config with a custom cap and cooldown, default directories
    pub fn with_quota(request_cap: u32, cooldown: Duration) -> Self {
        Self {
            request_cap,
            cooldown,
            ..Self::default()
        }
    }
}
