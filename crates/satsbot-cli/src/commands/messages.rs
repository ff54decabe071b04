use time::macros::format_description;
use time::Date;

use satsbot_core::{AllTimeHigh, FeesUsd, PeriodChange};

pub const HELP: &str = "Available commands:\n\
/btc - current BTC price\n\
/block - current block height\n\
/fees - recommended transaction fees in USD\n\
/marketcap - BTC market capitalization\n\
/hashrate - network hashrate\n\
/change - BTC price change over several periods\n\
/ath - BTC all-time high\n\
/top - top assets by market cap";

pub fn price(price_usd: f64) -> String {
    format!("Current BTC price: ${price_usd:.2}")
}

pub fn block(height: u64) -> String {
    format!("Current BTC block number: {height}")
}

pub fn fees(fees: FeesUsd) -> String {
    format!(
        "BTC Transaction Fees:\nLow: ${:.2}\nMedium: ${:.2}\nHigh: ${:.2}",
        fees.low, fees.medium, fees.high
    )
}

pub fn market_cap(market_cap_usd: f64) -> String {
    format!("Current BTC market cap: ${market_cap_usd:.2}")
}

pub fn hashrate(exahashes: f64) -> String {
    format!("Current BTC hashrate: {exahashes:.2} EH/s")
}

pub fn changes(changes: &[PeriodChange]) -> String {
    let mut output = String::from("Percentage changes in BTC price:");
    for change in changes {
        output.push_str(&format!("\n{}: {:.2}%", change.label, change.percent));
    }
    output
}

pub fn all_time_high(ath: AllTimeHigh) -> String {
    match ath.reached_on.and_then(long_date) {
        Some(day) => format!(
            "Bitcoin All-Time High: ${:.2} (reached on {day})",
            ath.price_usd
        ),
        None => format!("Bitcoin All-Time High: ${:.2}", ath.price_usd),
    }
}

/// `March 14, 2024`
fn long_date(date: Date) -> Option<String> {
    date.format(format_description!("[month repr:long] [day padding:none], [year]"))
        .ok()
}
