//! Implementation of the `docchat search` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::table::format_search_results;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::SearchResult;
use crate::services::ChatService;

#[derive(Args, Debug)]
pub struct SearchArgs {
    /// Search query
    pub query: String,

    /// Show hits as a table with scores instead of the tool output
    #[arg(long)]
    pub table: bool,
}

#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub query: String,
    pub output: String,
    pub results: Vec<SearchResult>,
    #[serde(skip)]
    table: bool,
}

impl CommandOutput for SearchOutput {
    fn to_human(&self) -> String {
        if self.table && !self.results.is_empty() {
            format_search_results(&self.results)
        } else {
            self.output.clone()
        }
    }
}

pub async fn execute(args: SearchArgs, chat: &ChatService, json_mode: bool) -> Result<()> {
    let (rendered, log) = chat.search(&args.query).await;
    output(
        &SearchOutput {
            query: args.query,
            output: rendered,
            results: log.results().to_vec(),
            table: args.table,
        },
        json_mode,
    );
    Ok(())
}
