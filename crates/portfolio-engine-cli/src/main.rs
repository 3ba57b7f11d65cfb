mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::allocation::AllocationArgs;
use commands::classify::ClassifyArgs;
use commands::contribute::ContributeArgs;
use commands::macro_targets::MacroTargetsArgs;
use commands::optimize::OptimizeArgs;
use commands::rebalance::RebalanceArgs;

/// Portfolio classification, allocation and optimization
#[derive(Parser)]
#[command(
    name = "pfe",
    version,
    about = "Portfolio classification, allocation and optimization",
    long_about = "A CLI for portfolio analytics with decimal precision. Classifies \
                  tickers into asset classes, computes current allocations, optimizes \
                  weights (minimum volatility, HRP, risk parity), derives macro-scenario \
                  targets, and suggests rebalancing trades and contribution allocations."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,
}

#[derive(Subcommand)]
enum Commands {
    /// Classify tickers into asset classes
    Classify(ClassifyArgs),
    /// Compute current allocation (holdings, weights, per-class totals)
    Allocation(AllocationArgs),
    /// Optimize portfolio weights from a historical return series
    Optimize(OptimizeArgs),
    /// Class-level target allocation for a macro scenario
    MacroTargets(MacroTargetsArgs),
    /// Suggest buy/sell trades toward target weights
    Rebalance(RebalanceArgs),
    /// Allocate a new contribution across under-weighted assets
    Contribute(ContributeArgs),
    /// Print version information
    Version,
}

#[derive(Debug, Clone, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Csv,
    Minimal,
}

fn main() {
    let cli = Cli::parse();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Classify(args) => commands::classify::run_classify(args),
        Commands::Allocation(args) => commands::allocation::run_allocation(args),
        Commands::Optimize(args) => commands::optimize::run_optimize(args),
        Commands::MacroTargets(args) => commands::macro_targets::run_macro_targets(args),
        Commands::Rebalance(args) => commands::rebalance::run_rebalance(args),
        Commands::Contribute(args) => commands::contribute::run_contribute(args),
        Commands::Version => {
            println!("pfe {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
