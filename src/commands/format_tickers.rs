use crate::error::Error;
use crate::models::Market;
use crate::services::append_suffix;
use crate::utils::get_data_dir;

pub fn run(markets_arg: String) {
    let markets = match Market::parse_markets(&markets_arg) {
        Ok(markets) => markets,
        Err(e) => {
            eprintln!("❌ Error parsing markets: {}", e);
            std::process::exit(1);
        }
    };

    match format_universes(markets) {
        Ok(()) => {
            println!("\n✅ Universe files formatted");
        }
        Err(e) => {
            eprintln!("❌ Formatting failed: {}", e);
            std::process::exit(1);
        }
    }
}

fn format_universes(markets: Vec<Market>) -> Result<(), Error> {
    let data_dir = get_data_dir();

    for market in markets {
        let path = data_dir.join(market.universe_filename());
        let count = append_suffix(&path, market.suffix())?;
        println!(
            "✅ {}: {} tickers suffixed with {}",
            market,
            count,
            market.suffix()
        );
    }

    Ok(())
}
