use std::io::Write;

use chrono::{DateTime, Utc};
use clap::Subcommand;

use crate::infra::upsource::RevisionList;
use crate::session::{Session, UserCache};
use crate::shared::table::{Table, terminal_width};
use crate::shared::time::format_optional;

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum RevisionCommands {
    /// List the most recent revisions of the project
    List,
}

impl RevisionCommands {
    pub async fn run(&self, session: &mut Session) -> anyhow::Result<()> {
        match self {
            Self::List => {
                list(
                    session,
                    Utc::now(),
                    terminal_width(),
                    &mut std::io::stdout().lock(),
                )
                .await
            }
        }
    }
}

async fn list<W: Write>(
    session: &mut Session,
    now: DateTime<Utc>,
    width: usize,
    out: &mut W,
) -> anyhow::Result<()> {
    let client = session.client()?;
    let revisions = client.list_revisions().await?;

    let authors: Vec<String> = revisions
        .revision
        .iter()
        .map(|r| r.author_id.clone())
        .collect();
    if let Err(e) = session
        .resolve_users(&client, authors.iter().map(String::as_str))
        .await
    {
        tracing::warn!(error = %e, "failed to resolve author names");
    }

    render(&revisions, session.users(), now, width, out)?;
    Ok(())
}

fn render<W: Write>(
    revisions: &RevisionList,
    users: &UserCache,
    now: DateTime<Utc>,
    width: usize,
    out: &mut W,
) -> std::io::Result<()> {
    if revisions.revision.is_empty() {
        writeln!(out, "No revisions.")?;
        return Ok(());
    }

    let mut table = Table::new(["REVISION", "AUTHOR", "DATE", "MESSAGE"]);
    for revision in &revisions.revision {
        let id = if revision.short_revision_id.is_empty() {
            &revision.revision_id
        } else {
            &revision.short_revision_id
        };
        let labels: Vec<&str> = revision
            .branch_head_label
            .iter()
            .chain(&revision.tags)
            .map(String::as_str)
            .collect();
        let message = if labels.is_empty() {
            revision.summary().to_string()
        } else {
            format!("({}) {}", labels.join(", "), revision.summary())
        };
        table.row([
            id.clone(),
            users.display_name(&revision.author_id).to_string(),
            format_optional(revision.date(), now),
            message,
        ]);
    }
    table.render(out, width)
}
