//! Implementation of the `docchat chat` command.

use anyhow::{Context, Result};
use clap::Args;
use console::Style;
use std::io::Write;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::services::ChatService;

#[derive(Args, Debug)]
pub struct ChatArgs {
    /// Session id for the conversation
    #[arg(short, long, default_value = "cli")]
    pub session: String,

    /// Answer without searching the documents
    #[arg(long)]
    pub no_rag: bool,
}

/// What the loop should do with one input line.
#[derive(Debug, PartialEq, Eq)]
enum Input<'a> {
    Skip,
    Clear,
    Exit,
    Message(&'a str),
}

fn classify(line: &str) -> Input<'_> {
    match line.trim() {
        "" => Input::Skip,
        "/clear" => Input::Clear,
        "/exit" | "/quit" => Input::Exit,
        text => Input::Message(text),
    }
}

fn prompt(style: &Style) -> Result<()> {
    print!("{} ", style.apply_to("you>"));
    std::io::stdout().flush().context("Failed to flush stdout")
}

pub async fn execute(args: ChatArgs, chat: &ChatService, json_mode: bool) -> Result<()> {
    let user_style = Style::new().cyan().bold();
    let assistant_style = Style::new().green().bold();
    let error_style = Style::new().red();

    if !json_mode {
        println!(
            "{}",
            Style::new()
                .dim()
                .apply_to(format!("Session '{}'. /clear resets it, /exit quits.", args.session))
        );
        prompt(&user_style)?;
    }

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("Failed to read stdin")? {
        match classify(&line) {
            Input::Skip => {}
            Input::Exit => break,
            Input::Clear => {
                let cleared = chat.clear_session(&args.session).await;
                if json_mode {
                    println!("{}", serde_json::json!({ "cleared": cleared }));
                } else {
                    println!("{}", Style::new().dim().apply_to("History cleared."));
                }
            }
            Input::Message(text) => {
                let reply = chat.turn(&args.session, text, !args.no_rag).await;
                if json_mode {
                    println!("{}", serde_json::to_string(&reply).unwrap_or_default());
                } else if reply.is_error() {
                    println!("{}", error_style.apply_to(&reply.content));
                } else {
                    println!("{} {}", assistant_style.apply_to("docchat>"), reply.content);
                }
            }
        }
        if !json_mode {
            prompt(&user_style)?;
        }
    }

    Ok(())
}
