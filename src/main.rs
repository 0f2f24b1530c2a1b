use std::path::Path;
use std::path::PathBuf;

use anyhow::Context;
use anyhow::Result;
use clap::Parser;
use clap::Subcommand;
use clap::ValueEnum;
use mpt_lite::OptimizationMode;
use mpt_lite::OptimizationRequest;
use mpt_lite::OptimizationResult;
use mpt_lite::PortfolioEngine;
use mpt_lite::PortfolioEngineConfig;
use mpt_lite::PriceTable;
use mpt_lite::data::MIN_VALID_POINTS;
use prettytable::Table;
use prettytable::format;
use prettytable::row;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "mpt-lite", version)]
#[command(about = "Heuristic portfolio allocation from a CSV of historical prices")]
struct Cli {
  #[command(subcommand)]
  command: Commands,
}

#[derive(Subcommand)]
enum Commands {
  /// List the assets of a price table and whether they are usable
  Assets {
    /// CSV file: period column followed by one price column per asset
    csv: PathBuf,
  },
  /// Compute an allocation and its risk/return figures
  Optimize {
    /// CSV file: period column followed by one price column per asset
    csv: PathBuf,

    /// Comma-separated assets to include (default: every usable asset)
    #[arg(short, long, value_delimiter = ',')]
    assets: Vec<String>,

    /// Allocation heuristic
    #[arg(short, long, value_enum, default_value_t = ModeArg::Efficient)]
    mode: ModeArg,

    /// Target annual return for the efficient mode (0.05 to 0.30 recommended)
    #[arg(short, long, default_value_t = 0.12)]
    target_return: f64,

    /// Print the result as JSON
    #[arg(long)]
    json: bool,

    /// Engine configuration file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,
  },
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum ModeArg {
  MinVariance,
  MaxReturn,
  Efficient,
}

impl ModeArg {
  fn into_mode(self, target_return: f64) -> OptimizationMode {
    match self {
      Self::MinVariance => OptimizationMode::MinVariance,
      Self::MaxReturn => OptimizationMode::MaxReturn,
      Self::Efficient => OptimizationMode::Efficient { target_return },
    }
  }
}

fn main() {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
    .with_writer(std::io::stderr)
    .init();

  if let Err(err) = run(Cli::parse()) {
    eprintln!("error: {err:#}");
    std::process::exit(1);
  }
}

fn run(cli: Cli) -> Result<()> {
  match cli.command {
    Commands::Assets { csv } => list_assets(&csv),
    Commands::Optimize {
      csv,
      assets,
      mode,
      target_return,
      json,
      config,
    } => {
      let config = match config {
        Some(path) => PortfolioEngineConfig::from_toml_file(&path)
          .with_context(|| format!("failed to load config {}", path.display()))?,
        None => PortfolioEngineConfig::default(),
      };
      let engine = PortfolioEngine::new(config)?;
      let table = load_table(&csv)?;

      let assets = if assets.is_empty() {
        table.usable_assets().map(str::to_string).collect()
      } else {
        assets
      };
      let request = OptimizationRequest::new(assets, mode.into_mode(target_return));
      let result = engine
        .optimize(&table, &request)
        .context("optimization refused")?;

      if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
      } else {
        print_result(&result);
      }
      Ok(())
    }
  }
}

fn load_table(path: &Path) -> Result<PriceTable> {
  PriceTable::from_path(path).with_context(|| format!("failed to load {}", path.display()))
}

fn list_assets(path: &Path) -> Result<()> {
  let prices = load_table(path)?;

  let mut table = Table::new();
  table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
  table.set_titles(row!["Asset", "Valid prices", "Usable"]);
  for asset in prices.assets() {
    let points = prices.prices(asset).map_or(0, <[f64]>::len);
    let usable = if points >= MIN_VALID_POINTS { "yes" } else { "no" };
    table.add_row(row![asset, points, usable]);
  }
  table.printstd();
  println!("{} rows", prices.len());
  Ok(())
}

fn pct(x: f64) -> String {
  format!("{:.2}%", x * 100.0)
}

fn print_result(result: &OptimizationResult) {
  let mut table = Table::new();
  table.set_format(*format::consts::FORMAT_NO_LINESEP_WITH_TITLE);
  table.set_titles(row!["Asset", "Weight", "Annual return", "Risk contribution"]);
  for (i, (asset, weight)) in result.allocations().enumerate() {
    table.add_row(row![
      asset,
      pct(weight),
      pct(result.mean_returns[i]),
      pct(result.risk_contribution[i])
    ]);
  }
  table.printstd();

  println!();
  println!("{}", result.description);
  println!("Expected return:       {}", pct(result.expected_return));
  println!("Volatility:            {}", pct(result.volatility));
  println!("Sharpe ratio:          {:.3}", result.sharpe);
  println!("Diversification ratio: {:.3}", result.diversification_ratio);
}
