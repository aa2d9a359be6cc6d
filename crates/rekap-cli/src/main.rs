//! CLI application for batch invoice extraction to Excel.

mod commands;
mod export;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use tracing::{debug, warn, Level};
use tracing_subscriber::FmtSubscriber;

use commands::{batch, config, process};

/// Batch invoice extractor - read invoice images with a vision model into one spreadsheet
#[derive(Parser)]
#[command(name = "rekap")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Path to config file
    #[arg(short, long, global = true)]
    config: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Process a single invoice image
    Process(process::ProcessArgs),

    /// Process many invoice images into one workbook
    Batch(batch::BatchArgs),

    /// Manage configuration
    Config(config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Set up logging based on verbosity
    let level = match cli.verbose {
        0 => Level::WARN,
        1 => Level::INFO,
        2 => Level::DEBUG,
        _ => Level::TRACE,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_writer(std::io::stderr)
        .finish();

    tracing::subscriber::set_global_default(subscriber)?;

    // Credentials may live in a .env file next to the invoices.
    if let Some(problem) = dotenv_problem(dotenvy::dotenv()) {
        warn!("{}", problem);
    }

    // Execute command
    match cli.command {
        Commands::Process(args) => process::run(args, cli.config.as_deref()).await,
        Commands::Batch(args) => batch::run(args, cli.config.as_deref()).await,
        Commands::Config(args) => config::run(args, cli.config.as_deref()).await,
    }
}

/// A missing `.env` is normal; anything else is worth a warning.
fn dotenv_problem(result: dotenvy::Result<PathBuf>) -> Option<String> {
    match result {
        Ok(path) => {
            debug!("Loaded environment from {}", path.display());
            None
        }
        Err(e) if e.not_found() => None,
        Err(e) => Some(format!("Could not load .env file: {}", e)),
    }
}
