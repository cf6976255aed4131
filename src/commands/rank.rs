use crate::error::Error;
use crate::models::Market;
use crate::services::{rank, write_ranked_csv, TickerLedger};
use crate::utils::{get_data_dir, get_results_dir};

pub fn run(markets_arg: String) {
    let markets = match Market::parse_markets(&markets_arg) {
        Ok(markets) => markets,
        Err(e) => {
            eprintln!("❌ Error parsing markets: {}", e);
            std::process::exit(1);
        }
    };

    match run_ranking(markets) {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Ranking failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn run_ranking(markets: Vec<Market>) -> Result<(), Error> {
    let results_dir = get_results_dir();
    let ledger = TickerLedger::new(get_data_dir(), results_dir.clone());

    for market in markets {
        let records = ledger.read_metric_table(market)?;
        if records.is_empty() {
            println!("⚠️  No metric table for {} yet, run 'collect' first", market);
            continue;
        }

        let ranked = rank(&records);
        let ranked_path = results_dir.join(market.ranked_filename());
        write_ranked_csv(&ranked_path, ledger.metric_header(), &ranked)?;

        println!(
            "🏆 {}: ranked {} stocks → {}",
            market,
            ranked.len(),
            ranked_path.display()
        );
        for row in ranked.iter().take(5) {
            println!(
                "   {:>3}  {:<12} {}",
                row.total_rank, row.record.ticker, row.record.long_name
            );
        }
    }

    Ok(())
}
