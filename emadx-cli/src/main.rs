//! emadx CLI: run the EMA/ADX backtest or inspect fetched history.
//!
//! Commands:
//! - `run`: fetch, run the strategy, print the summary, write artifacts
//! - `fetch`: fetch history and print bar statistics
//!
//! Log verbosity follows `RUST_LOG` (default `info`).

use anyhow::{Context, Result};
use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::EnvFilter;

use emadx_core::data::Lookback;
use emadx_core::Bar;
use emadx_runner::reporting::{format_details, format_summary};
use emadx_runner::{make_provider, BacktestConfig, Backtester, ProviderKind, Report};

#[derive(Parser)]
#[command(
    name = "emadx",
    about = "emadx: vectorized EMA crossover backtester gated by ADX and +DI"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

/// Data options shared by every command. Flags override the config file.
#[derive(Args)]
struct DataArgs {
    /// Path to a TOML config file. Defaults apply when omitted.
    #[arg(long)]
    config: Option<PathBuf>,

    /// Instrument symbol (e.g., EURUSD=X).
    #[arg(long)]
    symbol: Option<String>,

    /// End timestamp, "20211231 10:00:00" or "2021-12-31".
    #[arg(long)]
    end: Option<String>,

    /// History length, e.g. "3 Y", "6 M", "30 D".
    #[arg(long)]
    lookback: Option<Lookback>,

    /// Data provider: yahoo, csv or synthetic.
    #[arg(long)]
    provider: Option<ProviderKind>,

    /// CSV file for the csv provider.
    #[arg(long)]
    csv: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the strategy and write chart artifacts.
    Run {
        #[command(flatten)]
        data: DataArgs,

        /// Short EMA window.
        #[arg(long)]
        short: Option<usize>,

        /// Long EMA window.
        #[arg(long)]
        long: Option<usize>,

        /// ADX and +DI gate threshold.
        #[arg(long)]
        threshold: Option<f64>,

        /// Output directory for artifacts.
        #[arg(long, default_value = "results")]
        output_dir: PathBuf,

        /// Also print drawdowns and position statistics.
        #[arg(long, default_value_t = false)]
        details: bool,
    },
    /// Fetch history and print bar statistics.
    Fetch {
        #[command(flatten)]
        data: DataArgs,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            data,
            short,
            long,
            threshold,
            output_dir,
            details,
        } => {
            let mut config = load_config(&data)?;
            if let Some(short) = short {
                config.strategy.short_window = short;
            }
            if let Some(long) = long {
                config.strategy.long_window = long;
            }
            if let Some(threshold) = threshold {
                config.strategy.threshold = threshold;
            }
            config.validate()?;
            run_backtest_cmd(config, output_dir, details)
        }
        Commands::Fetch { data } => {
            let config = load_config(&data)?;
            config.validate()?;
            run_fetch(config)
        }
    }
}

fn load_config(args: &DataArgs) -> Result<BacktestConfig> {
    let mut config = match &args.config {
        Some(path) => BacktestConfig::from_file(path)
            .with_context(|| format!("loading config {}", path.display()))?,
        None => BacktestConfig::default(),
    };
    if let Some(symbol) = &args.symbol {
        config.instrument.symbol = symbol.clone();
    }
    if let Some(end) = &args.end {
        config.data.end = end.clone();
    }
    if let Some(lookback) = args.lookback {
        config.data.lookback = lookback;
    }
    if let Some(provider) = args.provider {
        config.data.provider = provider;
    }
    if let Some(csv) = &args.csv {
        config.data.csv_path = Some(csv.clone());
        if args.provider.is_none() {
            config.data.provider = ProviderKind::Csv;
        }
    }
    Ok(config)
}

fn run_backtest_cmd(config: BacktestConfig, output_dir: PathBuf, details: bool) -> Result<()> {
    let provider = make_provider(&config.data)?;
    let mut backtester = Backtester::new(config, provider.as_ref())?;

    let summary = backtester.run_strategy()?.clone();
    println!("{}", format_summary(&summary));
    if details {
        println!("\n{}", format_details(&summary));
    }
    if backtester.is_synthetic() {
        println!("\n(synthetic data: figures are not market results)");
    }

    match backtester.export(&output_dir)? {
        Report::Ready(paths) => println!("\nArtifacts saved to: {}", paths.run_dir.display()),
        Report::NoResults => println!("{}", emadx_runner::NO_RESULTS_MESSAGE),
    }
    Ok(())
}

fn run_fetch(config: BacktestConfig) -> Result<()> {
    let provider = make_provider(&config.data)?;
    let request = config.history_request()?;
    info!(provider = provider.name(), symbol = %request.symbol, "fetching");
    let fetched = provider.fetch(&request)?;
    let bars: Vec<Bar> = fetched.bars.into_iter().map(Bar::from).collect();

    let (first, last) = match (bars.first(), bars.last()) {
        (Some(first), Some(last)) => (first, last),
        _ => {
            println!("{}: no bars", fetched.symbol);
            return Ok(());
        }
    };
    let min = bars.iter().map(|b| b.close).fold(f64::INFINITY, f64::min);
    let max = bars.iter().map(|b| b.close).fold(f64::NEG_INFINITY, f64::max);
    let insane = bars.iter().filter(|b| !b.is_sane()).count();

    println!("{} ({:?})", fetched.symbol, fetched.source);
    println!("  bars:        {}", bars.len());
    println!("  range:       {} .. {}", first.date, last.date);
    println!("  first close: {:.5}", first.close);
    println!("  last close:  {:.5}", last.close);
    println!("  close range: {min:.5} .. {max:.5}");
    if insane > 0 {
        println!("  inconsistent OHLC rows: {insane}");
    }
    Ok(())
}
