mod commands;
mod input;
mod output;
mod telemetry;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::amortization::AmortizationArgs;
use commands::cash_flow::CashFlowArgs;
use commands::mortgage::MortgageArgs;
use commands::roi::RoiArgs;
use commands::validate::ValidateArgs;

/// Property investment calculations
#[derive(Parser)]
#[command(
    name = "propcalc",
    version,
    about = "Property investment calculations",
    long_about = "A CLI for rental property analysis with decimal precision. \
                  Supports buy-and-hold ROI projection, mortgage payments, \
                  amortisation schedules and rental cash flow."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Output format
    #[arg(long, default_value = "json", global = true)]
    output: OutputFormat,

    /// YAML file overriding the calculator defaults
    #[arg(long, global = true)]
    config: Option<String>,

    /// Log filter used when RUST_LOG is unset (e.g. debug, propcalc_core=trace)
    #[arg(long, default_value = "warn", global = true)]
    log_level: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Project a buy-and-hold investment (ROI, equity, cash flow)
    Roi(RoiArgs),
    /// Validate calculator inputs without running a projection
    Validate(ValidateArgs),
    /// Monthly mortgage payment with taxes, insurance, HOA and PMI
    Mortgage(MortgageArgs),
    /// Month-by-month amortisation schedule
    Amortization(AmortizationArgs),
    /// Rental cash flow, NOI and cap rate
    CashFlow(CashFlowArgs),
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

    if let Err(e) = telemetry::init(&cli.log_level) {
        eprintln!("{}: {}", "error".red().bold(), e);
        process::exit(1);
    }

    let defaults = match input::config::load_defaults(cli.config.as_deref()) {
        Ok(defaults) => defaults,
        Err(e) => {
            eprintln!("{}: {}", "error".red().bold(), e);
            process::exit(1);
        }
    };

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Roi(args) => commands::roi::run_roi(args, &defaults),
        Commands::Validate(args) => commands::validate::run_validate(args),
        Commands::Mortgage(args) => commands::mortgage::run_mortgage(args, &defaults),
        Commands::Amortization(args) => commands::amortization::run_amortization(args, &defaults),
        Commands::CashFlow(args) => commands::cash_flow::run_cash_flow(args, &defaults),
        Commands::Version => {
            println!("propcalc {}", env!("CARGO_PKG_VERSION"));
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
