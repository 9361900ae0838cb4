//! Market Vision CLI - AI-assisted forex chart analysis from the terminal.
//!
//! Sends a chart image to a multimodal model with a fixed analytical prompt
//! and renders the signal, confidence, per-method findings and suggested
//! trade levels.
//!
//! # Usage
//!
//! ```bash
//! # Store your Gemini API key (prompts when KEY is omitted)
//! market-vision key set
//!
//! # Analyze a chart (relay runs in-process unless a relay URL is configured)
//! market-vision analyze eurusd-h1.png
//!
//! # Run the relay endpoint for other clients
//! market-vision serve --port 3000
//!
//! # View configuration
//! market-vision config show
//! ```

use clap::{Parser, Subcommand};

mod cli;
mod logging;

/// Market Vision - AI-assisted forex chart analysis.
#[derive(Parser, Debug)]
#[command(name = "market-vision")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
struct Cli {
    /// Enable verbose (debug) logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Output logs in JSON format
    #[arg(long, global = true)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available commands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the relay HTTP endpoint
    Serve(cli::serve::ServeArgs),

    /// Analyze a chart image
    Analyze(cli::analyze::AnalyzeArgs),

    /// Manage the stored Gemini API key
    Key(cli::key::KeyArgs),

    /// View and manage configuration
    Config(cli::config::ConfigArgs),
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Logging isn't initialized yet, so use eprintln for config warnings.
    let config = match market_vision_core::Config::load() {
        Ok(config) => config,
        Err(e) => {
            eprintln!(
                "Warning: Failed to load config: {e}\n  \
                 Using default configuration. Check your config file with `market-vision config path`."
            );
            market_vision_core::Config::default()
        }
    };
    logging::init_from_config(&config, cli.verbose, cli.json_logs);

    tracing::debug!("Market Vision v{}", market_vision_core::VERSION);

    match cli.command {
        Commands::Serve(args) => cli::serve::execute(args, config).await,
        Commands::Analyze(args) => cli::analyze::execute(args, &config).await,
        Commands::Key(args) => cli::key::execute(args).await,
        Commands::Config(args) => cli::config::execute(args).await,
    }
}
