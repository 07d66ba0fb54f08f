//! Implementation of the `docchat ask` command.

use anyhow::Result;
use clap::Args;
use serde::Serialize;

use crate::cli::output::progress::create_spinner;
use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Metadata;
use crate::services::ChatService;

#[derive(Args, Debug)]
pub struct AskArgs {
    /// Question to ask
    pub question: String,

    /// Session to attach the turn to
    #[arg(short, long, default_value = "cli")]
    pub session: String,

    /// Answer without searching the documents
    #[arg(long)]
    pub no_rag: bool,
}

#[derive(Debug, Serialize)]
pub struct AskOutput {
    pub session: String,
    pub answer: String,
    pub metadata: Metadata,
}

impl CommandOutput for AskOutput {
    fn to_human(&self) -> String {
        let mut text = self.answer.clone();
        if let Some(count) = self.metadata.get("search_results_count") {
            let rounds = self.metadata.get("rounds").cloned().unwrap_or_default();
            text.push_str(&format!(
                "\n\n{}",
                console::style(format!("[{count} search results, {rounds} rounds]")).dim()
            ));
        }
        text
    }
}

pub async fn execute(args: AskArgs, chat: &ChatService, json_mode: bool) -> Result<()> {
    let spinner = create_spinner("Thinking...", json_mode);
    let reply = chat.turn(&args.session, &args.question, !args.no_rag).await;
    spinner.finish_and_clear();

    if reply.is_error() {
        let message = reply.content.strip_prefix("Error: ").unwrap_or(&reply.content);
        anyhow::bail!("{message}");
    }

    output(
        &AskOutput {
            session: args.session,
            answer: reply.content,
            metadata: reply.metadata,
        },
        json_mode,
    );
    Ok(())
}
