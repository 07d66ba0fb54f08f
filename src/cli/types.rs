//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::{
    ask::AskArgs, chat::ChatArgs, ingest::IngestArgs, reset::ResetArgs, search::SearchArgs,
};

#[derive(Parser)]
#[command(name = "docchat")]
#[command(about = "docchat - chat with your documents", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this YAML file instead of .docchat/
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Ingest documents into the vector store
    Ingest(IngestArgs),

    /// Ask a single question
    Ask(AskArgs),

    /// Start an interactive chat on stdin
    Chat(ChatArgs),

    /// Search the document collection without the language model
    Search(SearchArgs),

    /// Show system status
    Status,

    /// Delete the document collection
    Reset(ResetArgs),
}
