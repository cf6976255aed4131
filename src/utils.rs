use std::path::PathBuf;

/// Get the ticker universe directory from environment variable or use default
pub fn get_data_dir() -> PathBuf {
    std::env::var("SCREENER_DATA_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("data"))
}

/// Get the results directory from environment variable or use default
pub fn get_results_dir() -> PathBuf {
    std::env::var("SCREENER_RESULTS_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("results"))
}
