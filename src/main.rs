use anyhow::Result;
use chrono::Local;
use clap::Parser;
use std::time::Duration;
use tokio::time::sleep;
use tracing::error;
use veribet_odds_watch::models::OddsLine;
use veribet_odds_watch::scrapers::veribet::VeriBetScraper;
use veribet_odds_watch::utils::diff::{diff_cycles, ChangeReport};

/// Watch the veri.bet odds board and report line movement between polls.
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Seconds to wait between polling cycles
    #[arg(long, default_value_t = 10)]
    interval: u64,

    /// Slate date to watch (MM-DD-YYYY); defaults to today
    #[arg(long)]
    date: Option<String>,

    /// Run a single poll-and-diff cycle, then exit
    #[arg(long)]
    once: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenv::dotenv().ok();
    tracing_subscriber::fmt::init();

    let args = Args::parse();
    let scraper = VeriBetScraper::new();
    let mut previous: Vec<OddsLine> = Vec::new();

    loop {
        let date = args
            .date
            .clone()
            .unwrap_or_else(|| Local::now().format("%m-%d-%Y").to_string());

        match scraper.fetch_odds(&date).await {
            Ok(current) => {
                let report = diff_cycles(&current, &previous);
                print_report(&report)?;
                previous = current;
            }
            // A bad cycle is not fatal; the next poll retries from scratch.
            Err(e) => error!("polling cycle failed: {:#}", e),
        }

        if args.once {
            break;
        }
        sleep(Duration::from_secs(args.interval)).await;
    }

    Ok(())
}

fn print_report(report: &ChangeReport) -> Result<()> {
    if report.is_empty() {
        println!("NO CHANGES");
        return Ok(());
    }

    for line in &report.added_or_changed {
        println!("{}", serde_json::to_string(line)?);
    }

    if !report.removed.is_empty() {
        println!("REMOVED ITEMS");
        for line in &report.removed {
            println!("{}", serde_json::to_string(line)?);
        }
    }

    Ok(())
}
