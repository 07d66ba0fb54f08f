//! docchat CLI entry point.

use anyhow::{Context, Result};
use clap::Parser;

use docchat::application::ServiceFactory;
use docchat::cli::{commands, Cli, Commands};
use docchat::infrastructure::config::ConfigLoader;
use docchat::infrastructure::logging::LoggerImpl;

async fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => ConfigLoader::load_from_file(path)?,
        None => ConfigLoader::load()?,
    };
    let _logger = LoggerImpl::init(&config.logging).context("Failed to initialize logging")?;

    let factory = ServiceFactory::new(config);
    let chat = factory
        .chat_service()
        .context("Failed to build chat service")?;

    match cli.command {
        Commands::Ingest(args) => commands::ingest::execute(args, &chat, cli.json).await,
        Commands::Ask(args) => commands::ask::execute(args, &chat, cli.json).await,
        Commands::Chat(args) => commands::chat::execute(args, &chat, cli.json).await,
        Commands::Search(args) => commands::search::execute(args, &chat, cli.json).await,
        Commands::Status => commands::status::execute(&chat, cli.json).await,
        Commands::Reset(args) => commands::reset::execute(args, &chat, cli.json).await,
    }
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    let json = cli.json;

    if let Err(err) = run(cli).await {
        docchat::cli::handle_error(err, json);
    }
}
