pub mod commands;

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use reorder_core::config::{AppConfig, LoadOptions, LogFormat};

#[derive(Debug, Parser)]
#[command(
    name = "reorder",
    about = "Weekly reorder recommendation CLI",
    long_about = "Compute weekly order recommendations from history and forecast snapshots, \
                  inspect configuration, and run readiness checks.",
    after_help = "Examples:\n  reorder recommend --date 2025-01-22\n  reorder doctor --json\n  \
                  reorder seed --out-dir data\n  reorder smoke"
)]
pub struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    #[command(about = "Recommend order quantities for the week containing a date")]
    Recommend {
        #[arg(long, help = "Any date in the target week (YYYY-MM-DD)")]
        date: String,
        #[arg(long, help = "Restrict output to one customer (exact name)")]
        customer: Option<String>,
        #[arg(long, help = "Emit the full response as JSON")]
        json: bool,
    },
    #[command(about = "List week-ending Sundays between two dates")]
    Weeks {
        #[arg(long)]
        from: String,
        #[arg(long)]
        to: String,
    },
    #[command(about = "Write the deterministic demo snapshot as CSV files")]
    Seed {
        #[arg(long, default_value = "data", help = "Directory for the generated CSV files")]
        out_dir: PathBuf,
    },
    #[command(about = "Run the engine over the demo snapshot and verify its invariants")]
    Smoke,
    #[command(about = "Inspect effective configuration values with source attribution")]
    Config,
    #[command(about = "Validate config and data file readiness")]
    Doctor {
        #[arg(long, help = "Emit machine-readable JSON output")]
        json: bool,
    },
}

pub fn run() -> ExitCode {
    let cli = Cli::parse();
    init_logging();

    let result = match cli.command {
        Command::Recommend { date, customer, json } => {
            commands::recommend::run(&date, customer.as_deref(), json)
        }
        Command::Weeks { from, to } => commands::weeks::run(&from, &to),
        Command::Seed { out_dir } => commands::seed::run(&out_dir),
        Command::Smoke => commands::smoke::run(),
        Command::Config => {
            commands::CommandResult { exit_code: 0, output: commands::config::run() }
        }
        Command::Doctor { json } => {
            commands::CommandResult { exit_code: 0, output: commands::doctor::run(json) }
        }
    };

    println!("{}", result.output);
    ExitCode::from(result.exit_code)
}

/// Logs go to stderr so stdout stays machine-readable. A config that fails
/// to load falls back to warnings only; the command itself reports why.
fn init_logging() {
    use tracing::Level;

    let (level, format) = match AppConfig::load(LoadOptions::default()) {
        Ok(config) => {
            (config.logging.level.parse::<Level>().unwrap_or(Level::WARN), config.logging.format)
        }
        Err(_) => (Level::WARN, LogFormat::Compact),
    };

    let builder = tracing_subscriber::fmt()
        .with_target(false)
        .with_max_level(level)
        .with_writer(std::io::stderr);
    let _ = match format {
        LogFormat::Compact => builder.compact().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Json => builder.json().try_init(),
    };
}
