//! Implementation of the `docchat reset` command.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::services::ChatService;

#[derive(Args, Debug)]
pub struct ResetArgs {
    /// Confirm deletion of every stored chunk
    #[arg(long)]
    pub yes: bool,
}

#[derive(Debug, Serialize)]
pub struct ResetOutput {
    pub collection: String,
    pub deleted: bool,
}

impl CommandOutput for ResetOutput {
    fn to_human(&self) -> String {
        format!("Deleted collection '{}'.", self.collection)
    }
}

pub async fn execute(args: ResetArgs, chat: &ChatService, json_mode: bool) -> Result<()> {
    let collection = chat.collection().to_string();
    if !args.yes {
        anyhow::bail!("Refusing to delete collection '{collection}' without --yes");
    }

    chat.reset()
        .await
        .with_context(|| format!("Failed to delete collection '{collection}'"))?;

    output(
        &ResetOutput {
            collection,
            deleted: true,
        },
        json_mode,
    );
    Ok(())
}
