use chrono::Utc;
use std::time::Duration;

use crate::constants::QUOTA_COOLDOWN_SECS;
use crate::error::Error;
use crate::models::{CollectConfig, Market};
use crate::services::{rank, write_ranked_csv, CollectionPipeline, YahooClient};

pub fn run(markets_arg: String, cap: u32, cooldown_secs: Option<u64>) {
    let markets = match Market::parse_markets(&markets_arg) {
        Ok(markets) => markets,
        Err(e) => {
            eprintln!("❌ Error parsing markets: {}", e);
            eprintln!("   Valid options: all, norway, denmark, finland, sweden, or comma-separated");
            std::process::exit(1);
        }
    };

    let cooldown = Duration::from_secs(cooldown_secs.unwrap_or(QUOTA_COOLDOWN_SECS));
    let config = CollectConfig::with_quota(cap, cooldown);

    println!("🚀 Nordic fundamentals collector: START");
    println!("⏰ Started at: {}", Utc::now().format("%Y-%m-%d %H:%M:%S"));
    println!(
        "📋 Markets: {}",
        markets
            .iter()
            .map(|m| m.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    );
    println!(
        "⏳ Quota: {} requests, then a {}s cooldown",
        config.request_cap,
        config.cooldown.as_secs()
    );

    match run_collection(config, markets) {
        Ok(()) => {
            println!("\n✅ Collection completed successfully!");
        }
        Err(e) => {
            eprintln!("\n❌ Collection failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_collection(config: CollectConfig, markets: Vec<Market>) -> Result<(), Error> {
    let runtime = tokio::runtime::Runtime::new()
        .map_err(|e| Error::Config(format!("Failed to create runtime: {}", e)))?;

    runtime.block_on(async {
        let provider = YahooClient::new(true)
            .map_err(|e| Error::Config(format!("Failed to create provider client: {}", e)))?;
        let mut pipeline = CollectionPipeline::new(provider, &config);

        for market in markets {
            let stats = pipeline.run_market(market).await?;
            println!(
                "\n📊 {}: {} scored, {} empty, {} failed ({} of {} already done)",
                market, stats.scored, stats.empty, stats.failed, stats.skipped, stats.universe
            );

            let records = pipeline.ledger().read_metric_table(market)?;
            if records.is_empty() {
                println!("⚠️  No metrics recorded for {} yet, skipping ranking", market);
                continue;
            }

            let ranked = rank(&records);
            let ranked_path = config.results_dir.join(market.ranked_filename());
            write_ranked_csv(&ranked_path, pipeline.ledger().metric_header(), &ranked)?;
            println!(
                "🏆 Wrote {} ranked rows to {}",
                ranked.len(),
                ranked_path.display()
            );
        }

        Ok(())
    })
}
