//! `irenval` binary entry point.

use clap::{Parser, Subcommand};
use service_cli::commands::{self, ValueOptions};
use service_cli::config::{build_config, OutputFormat};
use service_cli::Result;
use std::path::PathBuf;
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// IREN data-centre portfolio valuation
#[derive(Parser)]
#[command(name = "irenval")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (defaults to irenval.toml when present)
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Value the portfolio and print the summary
    Value {
        /// Snapshot file to value instead of the reference portfolio
        #[arg(short, long)]
        snapshot: Option<PathBuf>,

        /// Scenario ID to select
        #[arg(long)]
        scenario: Option<String>,

        /// Output format (table, json, csv)
        #[arg(short, long)]
        format: Option<OutputFormat>,

        /// Print every active site's calculation trace
        #[arg(long)]
        steps: bool,
    },

    /// Print one site's calculation trace
    Site {
        /// Site ID
        #[arg(short, long)]
        id: String,

        /// Snapshot file containing the site
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// List preset and custom scenarios
    Scenarios {
        /// Snapshot file whose custom scenarios are listed too
        #[arg(short, long)]
        snapshot: Option<PathBuf>,
    },

    /// Write the reference portfolio as a JSON snapshot
    Export {
        /// Output file
        #[arg(short, long)]
        output: PathBuf,

        /// Scenario ID to select in the snapshot
        #[arg(long)]
        scenario: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = build_config(cli.config.as_deref())?;

    let log_level = if cli.verbose {
        "debug"
    } else {
        config.log_level.as_filter_str()
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(log_level)),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if cli.verbose {
        info!("Verbose mode enabled");
    }

    let mut stdout = std::io::stdout().lock();
    match cli.command {
        Commands::Value {
            snapshot,
            scenario,
            format,
            steps,
        } => {
            let options = ValueOptions {
                snapshot: snapshot.or_else(|| config.snapshot.clone()),
                scenario: scenario.or_else(|| config.default_scenario.clone()),
                format: format.unwrap_or(config.output_format),
                show_steps: steps || config.show_steps,
            };
            commands::value::run(&options, &mut stdout)
        }
        Commands::Site { id, snapshot } => {
            let snapshot = snapshot.or_else(|| config.snapshot.clone());
            commands::site::run(&id, snapshot.as_deref(), &mut stdout)
        }
        Commands::Scenarios { snapshot } => {
            let snapshot = snapshot.or_else(|| config.snapshot.clone());
            commands::scenarios::run(snapshot.as_deref(), &mut stdout)
        }
        Commands::Export { output, scenario } => {
            commands::export::run(&output, scenario.as_deref())
        }
    }
}
