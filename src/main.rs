// =============================================================================
// Strategy Lab — Main Entry Point
// =============================================================================
//
// Subcommands:
//   analyze      run every enabled strategy on one instrument, print JSON
//   equity       replay a list of trade P&L values, print the metrics
//   portfolio    value the configured holdings against a quote file
//   init-config  write the default configuration file
//
// Logs go to stderr; stdout carries only the reports.
// =============================================================================

use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use strategy_lab::backtest::simulate;
use strategy_lab::market_data::{JsonFileLoader, PriceLoader, SyntheticLoader};
use strategy_lab::portfolio::{value_portfolio, QuoteBook};
use strategy_lab::runtime_config::{DataSource, RuntimeConfig};
use strategy_lab::strategy::StrategyEngine;

/// Trade list used when none is given on the command line.
const SAMPLE_TRADES: [f64; 7] = [100.0, -50.0, 200.0, -100.0, 300.0, -150.0, 250.0];

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Runtime configuration file (defaults are used when it is missing)
    #[arg(long, default_value = "runtime_config.json")]
    config: PathBuf,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compute indicators, signals and per-strategy backtests for one symbol
    Analyze {
        /// Instrument to analyse (overrides the config)
        #[arg(long)]
        symbol: Option<String>,

        /// First day included, YYYY-MM-DD
        #[arg(long)]
        start: Option<NaiveDate>,

        /// First day excluded, YYYY-MM-DD
        #[arg(long)]
        end: Option<NaiveDate>,

        /// Use the seeded random walk instead of bar files
        #[arg(long, default_value_t = false)]
        synthetic: bool,

        /// Directory holding <SYMBOL>.json bar files
        #[arg(long)]
        data_dir: Option<String>,

        /// Pretty-print the JSON report
        #[arg(long, default_value_t = false)]
        pretty: bool,
    },

    /// Replay trade P&L values into an equity curve
    Equity {
        /// Starting balance (overrides the config)
        #[arg(long)]
        initial_balance: Option<f64>,

        /// Comma-separated P&L per trade, e.g. 100,-50,200
        #[arg(long, value_delimiter = ',', allow_negative_numbers = true)]
        trades: Vec<f64>,
    },

    /// Value the configured portfolio against a quote file
    Portfolio {
        /// JSON quotes: {"bitcoin": {"usd": 65000}} or {"bitcoin": 65000}
        #[arg(long)]
        prices: PathBuf,
    },

    /// Write the default configuration to --config
    InitConfig {
        /// Overwrite an existing file
        #[arg(long, default_value_t = false)]
        force: bool,
    },
}

fn main() -> Result<()> {
    // ── 1. Environment & logging ─────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    // ── 2. Config ────────────────────────────────────────────────────────
    let mut config = match &cli.command {
        Command::InitConfig { .. } => RuntimeConfig::default(),
        _ => RuntimeConfig::load(&cli.config).unwrap_or_else(|e| {
            warn!(error = %e, "Failed to load config, using defaults");
            RuntimeConfig::default()
        }),
    };

    if let Ok(symbol) = std::env::var("STRATEGY_LAB_SYMBOL") {
        let symbol = symbol.trim().to_string();
        if !symbol.is_empty() {
            config.symbol = symbol;
        }
    }
    if let Ok(dir) = std::env::var("STRATEGY_LAB_DATA_DIR") {
        config.data_dir = dir;
    }

    // ── 3. Dispatch ──────────────────────────────────────────────────────
    match cli.command {
        Command::Analyze {
            symbol,
            start,
            end,
            synthetic,
            data_dir,
            pretty,
        } => {
            if let Some(s) = symbol {
                config.symbol = s;
            }
            if let Some(d) = start {
                config.start_date = d;
            }
            if end.is_some() {
                config.end_date = end;
            }
            if synthetic {
                config.data_source = DataSource::Synthetic;
            }
            if let Some(d) = data_dir {
                config.data_dir = d;
            }
            run_analyze(&config, pretty)
        }
        Command::Equity {
            initial_balance,
            trades,
        } => {
            let balance = initial_balance.unwrap_or(config.backtest.initial_balance);
            let trades = if trades.is_empty() {
                SAMPLE_TRADES.to_vec()
            } else {
                trades
            };
            run_equity(balance, &trades);
            Ok(())
        }
        Command::Portfolio { prices } => run_portfolio(&config, &prices),
        Command::InitConfig { force } => {
            if cli.config.exists() && !force {
                bail!(
                    "{} already exists, pass --force to overwrite",
                    cli.config.display()
                );
            }
            config.save(&cli.config)
        }
    }
}

fn run_analyze(config: &RuntimeConfig, pretty: bool) -> Result<()> {
    config.validate().context("invalid runtime config")?;

    info!(
        symbol = %config.symbol,
        start = %config.start_date,
        end = ?config.end_date,
        data_source = %config.data_source,
        "loading price series"
    );

    let loader: Box<dyn PriceLoader> = match config.data_source {
        DataSource::Json => Box::new(JsonFileLoader::new(&config.data_dir)),
        DataSource::Synthetic => Box::new(SyntheticLoader::new(config.synthetic.clone())),
    };

    let series = loader
        .load_or_empty(&config.symbol, config.start_date, config.end_date)
        .context("failed to load price series")?;

    let engine = StrategyEngine::from_config(config)?;
    let report = engine.run(&series);

    for o in &report.strategies {
        info!(
            strategy = %o.strategy,
            buys = o.buys,
            sells = o.sells,
            trades = o.trades.len(),
            total_profit = o.equity.total_profit,
            win_rate = o.equity.win_rate,
            max_drawdown = o.equity.max_drawdown,
            "strategy summary"
        );
    }

    let json = if pretty {
        serde_json::to_string_pretty(&report)
    } else {
        serde_json::to_string(&report)
    }
    .context("failed to serialise analysis report")?;
    println!("{json}");
    Ok(())
}

fn run_equity(initial_balance: f64, trades: &[f64]) {
    let report = simulate(initial_balance, trades);

    println!("Backtest Metrics:");
    println!("Total Profit/Loss: {:.2}", report.total_profit);
    println!("Win Rate: {:.2}%", report.win_rate);
    println!("Max Drawdown: {:.2}", report.max_drawdown);
    println!("Final Equity: {:.2}", report.final_equity());
    println!("Equity Curve:");
    for (i, equity) in report.curve.iter().enumerate() {
        println!("  {:>4}  {:.2}", i + 1, equity);
    }
}

fn run_portfolio(config: &RuntimeConfig, prices: &Path) -> Result<()> {
    let quotes = QuoteBook::from_file(prices)?;
    let valuation = value_portfolio(&config.portfolio, &quotes)?;

    println!(
        "{:<12} {:>12} {:>14} {:>14} {:>6} {:>8}",
        "Name", "Amount", "Price (USD)", "Value (USD)", "ESG", "Alloc %"
    );
    for h in &valuation.holdings {
        println!(
            "{:<12} {:>12.4} {:>14.2} {:>14.2} {:>6.0} {:>7.1}%",
            h.name, h.amount, h.price, h.value, h.esg, h.allocation_pct
        );
    }
    println!("Portfolio Value (USD): {:.2}", valuation.total_value);
    match valuation.weighted_esg {
        Some(score) => println!("Weighted ESG Score: {score:.2} / 100"),
        None => println!("Weighted ESG Score: n/a"),
    }
    Ok(())
}
