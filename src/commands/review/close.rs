use std::io::Write;

use clap::Args;

use crate::infra::upsource::{CloseOutcome, UpsourceClient};
use crate::session::Session;

#[derive(Args, Clone, PartialEq, Eq)]
pub struct CloseArgs {
    /// Review id, e.g. DEMO-CR-42
    pub review_id: String,
}

pub async fn run(args: &CloseArgs, session: &Session) -> anyhow::Result<()> {
    let client = session.client()?;
    run_with_client(args, &client, &mut std::io::stdout().lock()).await
}

async fn run_with_client<W: Write>(
    args: &CloseArgs,
    client: &UpsourceClient,
    out: &mut W,
) -> anyhow::Result<()> {
    match client.close_review(&args.review_id).await? {
        CloseOutcome::Closed => writeln!(out, "Closed {}", args.review_id)?,
        CloseOutcome::AlreadyClosed => writeln!(out, "{} is already closed", args.review_id)?,
    }
    Ok(())
}
