//! faqbot CLI
//!
//! Main entry point for the faqbot command-line tool.
//! Answers questions about a single text or PDF document.

mod commands;

use clap::{Parser, Subcommand};
use commands::{AskCommand, InspectCommand};
use faqbot_core::{
    config::{load_dotenv, AppConfig},
    logging, AppError,
};
use faqbot_docqa::{Ingestor, ProgressReporter, StagingArea};
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::Arc;

/// faqbot - ask questions about a document
#[derive(Parser, Debug)]
#[command(name = "faqbot")]
#[command(about = "Ask questions about a text or PDF document", long_about = None)]
#[command(version)]
struct Cli {
    /// Path to workspace directory (default: current directory)
    #[arg(short, long, global = true, env = "FAQBOT_WORKSPACE")]
    workspace: Option<PathBuf>,

    /// Path to config file
    #[arg(short, long, global = true, env = "FAQBOT_CONFIG")]
    config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, env = "RUST_LOG")]
    log_level: Option<String>,

    /// Enable verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Disable colored output (NO_COLOR is honored by the config loader)
    #[arg(long, global = true)]
    no_color: bool,

    /// Suppress progress lines on stderr
    #[arg(short, long, global = true)]
    quiet: bool,

    /// LLM provider (groq, openai, ollama, mock)
    #[arg(short, long, global = true, env = "FAQBOT_PROVIDER")]
    provider: Option<String>,

    /// Model identifier
    #[arg(short, long, global = true, env = "FAQBOT_MODEL")]
    model: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Ask a question about a document
    Ask(AskCommand),

    /// Show how a document is segmented and chunked
    Inspect(InspectCommand),
}

#[tokio::main]
async fn main() -> ExitCode {
    // Before parsing so `env` fallbacks see values from .env
    let dotenv_path = load_dotenv();

    let cli = Cli::parse();

    match run(cli, dotenv_path).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            match err.downcast_ref::<AppError>() {
                Some(app_err) if app_err.is_user_input() => eprintln!("warning: {}", app_err),
                _ => eprintln!("error: {:#}", err),
            }
            ExitCode::FAILURE
        }
    }
}

async fn run(cli: Cli, dotenv_path: Option<PathBuf>) -> anyhow::Result<()> {
    let config = AppConfig::load(cli.workspace, cli.config)?.with_overrides(
        cli.provider,
        cli.model,
        cli.log_level,
        cli.verbose,
        cli.no_color,
    );

    logging::init_logging(config.log_level.as_deref(), config.no_color)?;

    tracing::info!("faqbot starting");
    if let Some(path) = dotenv_path {
        tracing::debug!("Loaded environment from {:?}", path);
    }
    tracing::debug!("Workspace: {:?}", config.workspace);
    tracing::debug!("Provider: {}", config.provider);
    tracing::debug!("Model: {}", config.model);

    let staging = StagingArea::create(config.staging_dir())?;
    let progress = if cli.quiet {
        ProgressReporter::noop()
    } else {
        ProgressReporter::new(Arc::new(|event| eprintln!("{}", event)))
    };
    let ingestor = Ingestor::new(staging).with_progress(progress.clone());

    let command_name = match &cli.command {
        Commands::Ask(_) => "ask",
        Commands::Inspect(_) => "inspect",
    };
    let _span = tracing::info_span!("command", name = command_name).entered();

    let result = match cli.command {
        Commands::Ask(cmd) => cmd.execute(&config, &ingestor, progress).await,
        Commands::Inspect(cmd) => cmd.execute(&config, &ingestor).await,
    };

    match &result {
        Ok(_) => tracing::info!("Command completed successfully"),
        Err(e) if e.is_user_input() => tracing::warn!("{}", e),
        Err(e) => tracing::error!("Command failed: {}", e),
    }

    result.map_err(anyhow::Error::from)
}
