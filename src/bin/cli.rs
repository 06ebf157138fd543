use std::sync::Arc;

use anyhow::Result;
use colored::{Color, Colorize};
use structopt::StructOpt;

use truthlens::analysis::{Dimension, SubprocessAnalyzer};
use truthlens::audit;
use truthlens::core::config::TruthlensConfig;
use truthlens::edgar::cache::DocumentCache;
use truthlens::edgar::text::truncate_chars;
use truthlens::edgar::throttle::Throttle;
use truthlens::edgar::tickers::Ticker;
use truthlens::edgar::EdgarClient;
use truthlens::fetch::FilingFetcher;
use truthlens::history::{ScoreRow, ScoreStore};
use truthlens::scorer::{self, CompositeResult};

#[derive(StructOpt, Debug)]
#[structopt(name = "truthlens", about = "Corporate narrative integrity scanner")]
enum Opt {
    /// Score a company
    Score {
        /// Ticker symbol (e.g. MSFT)
        ticker: String,
        /// Quarter label (e.g. Q4-2025); defaults to the current quarter
        #[structopt(long)]
        quarter: Option<String>,
        /// Also print the raw JSON result
        #[structopt(long)]
        json: bool,
    },
    /// Score every watchlist company
    Watchlist,
    /// Show score history for a ticker
    History {
        /// Ticker symbol
        ticker: String,
    },
}

const WATCHLIST: [&str; 12] = [
    "NVDA", "MSFT", "AAPL", "AMZN", "GOOG", "META", "TSLA", "CRM", "IBM", "ORCL", "NFLX", "JPM",
];

struct App {
    config: TruthlensConfig,
    fetcher: FilingFetcher,
    analyzer: SubprocessAnalyzer,
    store: ScoreStore,
}

impl App {
    async fn new(config: TruthlensConfig) -> Result<Self> {
        let edgar = Arc::new(EdgarClient::new(
            config.user_agent.clone(),
            Arc::new(Throttle::default()),
        ));
        let cache = DocumentCache::new(config.cache_dir.clone());
        let fetcher = FilingFetcher::new(edgar, cache);
        let analyzer = SubprocessAnalyzer::new(config.analyzer_cmd.clone(), config.analyzer_timeout);
        let store = ScoreStore::connect(&config.database_url).await?;

        Ok(App {
            config,
            fetcher,
            analyzer,
            store,
        })
    }

    async fn score(&self, ticker: &Ticker, quarter: Option<String>) -> CompositeResult {
        let result = scorer::run(&self.fetcher, &self.analyzer, ticker, quarter).await;
        if let Err(e) = self.store.save(&result).await {
            log::warn!("[{}] Failed to persist score: {}", ticker, e);
        }
        audit::record_scan(&self.config, &result).await;
        result
    }
}

fn score_color(score: u8) -> Color {
    if score >= 80 {
        Color::Green
    } else if score >= 60 {
        Color::Yellow
    } else if score >= 40 {
        Color::TrueColor {
            r: 255,
            g: 165,
            b: 0,
        }
    } else {
        Color::Red
    }
}

fn bar(score: u8, width: usize) -> String {
    let filled = ((f64::from(score) / 100.0) * width as f64).round() as usize;
    format!("{}{}", "█".repeat(filled), "░".repeat(width - filled))
}

fn dimension_label(dimension: Dimension) -> &'static str {
    match dimension {
        Dimension::AiNarrative => "AI Narrative      (25%)",
        Dimension::GuidanceAccuracy => "Guidance Accuracy (25%)",
        Dimension::RiskDrift => "Risk Drift        (20%)",
        Dimension::CapitalHonesty => "Capital Honesty   (15%)",
        Dimension::EsgSubstance => "ESG Substance     (15%)",
    }
}

fn print_scorecard(result: &CompositeResult) {
    let color = score_color(result.composite_score);

    println!("\n{}", "=".repeat(60));
    println!("  TRUTHLENS — {} ({})", result.company, result.ticker);
    println!("  {}", result.quarter);
    println!("{}", "=".repeat(60));
    println!(
        "\n  COMPOSITE SCORE: {}",
        format!("{}/100", result.composite_score).color(color).bold()
    );
    println!("  Verdict: {}", result.verdict.label().color(color));
    println!("\n  {}\n", bar(result.composite_score, 20));

    for dimension in Dimension::ALL {
        match result.dimensions.get(&dimension) {
            Some(dim) => {
                let c = score_color(dim.score);
                println!(
                    "  {}: {}  {}",
                    dimension_label(dimension),
                    format!("{:>3}", dim.score).color(c),
                    bar(dim.score, 15)
                );
            }
            None => println!("  {}: N/A", dimension_label(dimension)),
        }
    }

    println!();
    for dimension in Dimension::ALL {
        let dim = match result.dimensions.get(&dimension) {
            Some(dim) => dim,
            None => continue,
        };
        println!("  ── {} ──", dimension);
        if !dim.summary.is_empty() {
            println!("     {}", dim.summary);
        }
        for flag in dim.flags.iter().take(2) {
            println!("     {} {}", "⚠".yellow(), flag);
        }
        for quote in dim.evidence.iter().take(1) {
            println!("     \"{}\"", truncate_chars(quote, 120).dimmed());
        }
        println!();
    }

    println!("{}\n", "=".repeat(60));
}

fn print_history(ticker: &str, rows: &[ScoreRow]) {
    if rows.is_empty() {
        println!("No history found for {}", ticker);
        return;
    }

    let fmt = |s: Option<i64>| s.map_or_else(|| "?".to_string(), |v| v.to_string());

    println!("\n  Score History: {}", ticker);
    println!(
        "  {:<12} {:>9} {:>5} {:>9} {:>6} {:>8} {:>5}",
        "Quarter", "Composite", "AI", "Guidance", "Risk", "Capital", "ESG"
    );
    println!("  {}", "-".repeat(60));
    for row in rows {
        println!(
            "  {:<12} {:>9} {:>5} {:>9} {:>6} {:>8} {:>5}",
            row.quarter.as_deref().unwrap_or("?"),
            row.composite_score,
            fmt(row.ai_score),
            fmt(row.guidance_score),
            fmt(row.risk_drift_score),
            fmt(row.capital_score),
            fmt(row.esg_score),
        );
    }
    println!();
}

#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();
    let opt = Opt::from_args();
    let config = TruthlensConfig::from_env()?;

    match opt {
        Opt::Score {
            ticker,
            quarter,
            json,
        } => {
            let app = App::new(config).await?;
            let ticker = Ticker::new(ticker)?;
            let result = app.score(&ticker, quarter).await;
            print_scorecard(&result);
            if json {
                println!("{}", serde_json::to_string_pretty(&result)?);
            }
        }
        Opt::Watchlist => {
            let app = App::new(config).await?;
            println!("Running watchlist ({} companies)...", WATCHLIST.len());
            for symbol in WATCHLIST {
                // One bad ticker must not stop the rest of the batch
                match Ticker::new(symbol) {
                    Ok(ticker) => {
                        let result = app.score(&ticker, None).await;
                        println!(
                            "  {:<6} -> {:>3}/100  {}",
                            result.ticker, result.composite_score, result.verdict
                        );
                    }
                    Err(e) => eprintln!("  {:<6} -> ERROR: {}", symbol, e),
                }
            }
        }
        Opt::History { ticker } => {
            let store = ScoreStore::connect(&config.database_url).await?;
            let ticker = Ticker::new(ticker)?;
            let rows = store.history(ticker.as_str(), 8).await?;
            print_history(ticker.as_str(), &rows);
        }
    }

    Ok(())
}
