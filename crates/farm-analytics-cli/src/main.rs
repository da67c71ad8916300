mod commands;
mod input;
mod logging;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::analysis::AnalyzeArgs;
use commands::benchmark::BenchmarkArgs;
use commands::costs::{AggregateArgs, VarianceArgs};
use commands::profitability::ProfitabilityArgs;
use commands::units::ConvertArgs;

/// Crop cost, variance and profitability analytics
#[derive(Parser)]
#[command(
    name = "fma",
    version,
    about = "Crop cost, variance and profitability analytics",
    long_about = "A CLI for farm cost analytics with decimal precision. Converts costs \
                  between per-hectare, per-tonne and whole-farm figures, aggregates cost \
                  breakdowns, compares against budgets and 3-year averages, positions \
                  costs within market benchmarks, and computes break-even and margins."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// Log filter (e.g. "debug", "farm_analytics_core=trace"); RUST_LOG wins when set
    #[arg(long, global = true)]
    log_level: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    /// Convert a figure between per-hectare, per-tonne and total
    Convert(ConvertArgs),
    /// Variance of actual costs vs budget and 3-year average
    Variance(VarianceArgs),
    /// Aggregate a cost breakdown with group totals
    Aggregate(AggregateArgs),
    /// Position costs within market benchmark ranges
    Benchmark(BenchmarkArgs),
    /// Break-even price, margins and realized profit
    Profitability(ProfitabilityArgs),
    /// Full crop analysis: costs, variances and profitability
    Analyze(AnalyzeArgs),
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
    logging::init(cli.log_level.as_deref());

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Convert(args) => commands::units::run_convert(args),
        Commands::Variance(args) => commands::costs::run_variance(args),
        Commands::Aggregate(args) => commands::costs::run_aggregate(args),
        Commands::Benchmark(args) => commands::benchmark::run_benchmark(args),
        Commands::Profitability(args) => commands::profitability::run_profitability(args),
        Commands::Analyze(args) => commands::analysis::run_analyze(args),
        Commands::Version => {
            println!("fma {}", env!("CARGO_PKG_VERSION"));
            return;
        }
    };

    match result {
        Ok(value) => {
            output::format_output(&cli.output, &value);
            process::exit(0);
        }
        Err(e) => {
            tracing::debug!(error = %e, "command failed");
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    }
}
