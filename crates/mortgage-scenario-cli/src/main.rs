mod commands;
mod input;
mod output;

use clap::{Parser, Subcommand, ValueEnum};
use colored::Colorize;
use std::process;

use commands::presets::PresetsArgs;
use commands::scenario::ScenarioArgs;
use commands::sensitivity::SensitivityArgs;
use commands::tax::PurchaseTaxArgs;

/// Leveraged property investment scenarios
#[derive(Parser)]
#[command(
    name = "msc",
    version,
    about = "Leveraged property investment scenarios",
    long_about = "Evaluate buying a property with a mortgage against keeping the cash \
                  invested. Computes financing, rental cash flow, appreciation, early \
                  repayment, purchase and capital gains tax, and the alternative \
                  portfolio with decimal precision."
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
    /// Evaluate one purchase scenario
    Scenario(ScenarioArgs),
    /// Quote progressive purchase tax for a property value
    PurchaseTax(PurchaseTaxArgs),
    /// Two-way sensitivity grid over assumptions
    Sensitivity(SensitivityArgs),
    /// List assumption and restriction presets
    Presets(PresetsArgs),
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

/// Initialise the `tracing` subscriber. Logs go to stderr so stdout stays parseable.
fn init_logging() {
    use tracing_subscriber::{fmt, EnvFilter};

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("mortgage_scenario_core=warn,msc=warn"));

    let json_logging = std::env::var("MSC_LOG_JSON").is_ok();

    if json_logging {
        fmt()
            .json()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    } else {
        fmt()
            .with_env_filter(env_filter)
            .with_target(true)
            .with_writer(std::io::stderr)
            .init();
    }
}

fn main() {
    let cli = Cli::parse();
    init_logging();

    let result: Result<serde_json::Value, Box<dyn std::error::Error>> = match cli.command {
        Commands::Scenario(args) => commands::scenario::run_scenario(args),
        Commands::PurchaseTax(args) => commands::tax::run_purchase_tax(args),
        Commands::Sensitivity(args) => commands::sensitivity::run_sensitivity(args),
        Commands::Presets(args) => commands::presets::run_presets(args),
        Commands::Version => {
            println!("msc {}", env!("CARGO_PKG_VERSION"));
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
