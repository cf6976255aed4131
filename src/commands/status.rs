use crate::error::Error;
use crate::models::Market;
use crate::services::{load_universe, TickerLedger};
use crate::utils::{get_data_dir, get_results_dir};

pub fn run() {
    println!("📊 Screener Ledger Status\n");

    match show_status() {
        Ok(()) => {}
        Err(e) => {
            eprintln!("❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

fn show_status() -> Result<(), Error> {
    let data_dir = get_data_dir();
    let ledger = TickerLedger::new(data_dir.clone(), get_results_dir());

    let empty = ledger.empty_tickers()?;
    println!("🚫 Empty tickers (shared across markets): {}\n", empty.len());

    for market in Market::all() {
        let universe_path = data_dir.join(market.universe_filename());
        if !universe_path.exists() {
            println!(
                "🔹 {:<8} universe file missing ({})",
                market.as_str(),
                universe_path.display()
            );
            continue;
        }

        let universe = load_universe(&universe_path)?;
        let scored = ledger.scored_tickers(market)?;
        let empty_here = universe.iter().filter(|t| empty.contains(*t)).count();
        let remaining = universe
            .iter()
            .filter(|t| !scored.contains(*t) && !empty.contains(*t))
            .count();

        println!(
            "🔹 {:<8} {:>5} in universe  {:>5} scored  {:>5} empty  {:>5} remaining",
            market.as_str(),
            universe.len(),
            scored.len(),
            empty_here,
            remaining
        );
    }

    println!("\n💡 Tip: 'collect' resumes from the remaining tickers only");

    Ok(())
}
