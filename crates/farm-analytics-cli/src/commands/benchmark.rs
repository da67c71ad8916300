use clap::Args;
use rust_decimal::Decimal;
use serde_json::Value;

use farm_analytics_core::benchmark::{self, BenchmarkInput, BenchmarkRange, NamedBenchmark};

use crate::input;

/// Arguments for benchmark positioning
#[derive(Args)]
#[command(allow_hyphen_values = true)]
pub struct BenchmarkArgs {
    /// Market minimum
    #[arg(long)]
    pub min: Option<Decimal>,

    /// Market maximum
    #[arg(long)]
    pub max: Option<Decimal>,

    /// Market average
    #[arg(long)]
    pub average: Option<Decimal>,

    /// The farm's own figure
    #[arg(long)]
    pub current: Option<Decimal>,

    /// Label for a single range given by flags
    #[arg(long, default_value = "cost")]
    pub name: String,

    /// Path to JSON input file with a list of named ranges
    #[arg(long)]
    pub input: Option<String>,
}

pub fn run_benchmark(args: BenchmarkArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let request: BenchmarkInput = match input::request(args.input.as_deref())? {
        Some(r) => r,
        None => BenchmarkInput {
            benchmarks: vec![NamedBenchmark {
                name: args.name,
                range: BenchmarkRange {
                    min: args.min.ok_or("--min is required (or provide --input)")?,
                    max: args.max.ok_or("--max is required (or provide --input)")?,
                    average: args.average.ok_or("--average is required (or provide --input)")?,
                    current: args.current.ok_or("--current is required (or provide --input)")?,
                },
            }],
        },
    };

    let result = benchmark::evaluate_benchmarks(&request)?;
    Ok(serde_json::to_value(result)?)
}
