use std::io::Write;

use chrono::{DateTime, Utc};
use clap::{Args, Subcommand};

use crate::infra::upsource::{BranchList, UpsourceClient};
use crate::session::Session;
use crate::shared::table::{Table, terminal_width};
use crate::shared::time::format_optional;

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum BranchCommands {
    /// List branches of the project
    List(ListArgs),
}

#[derive(Args, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Only list branches matching this query
    #[arg(short, long)]
    pub query: Option<String>,
}

impl BranchCommands {
    pub async fn run(&self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::List(args) => {
                let client = session.client()?;
                list(
                    args,
                    &client,
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
    args: &ListArgs,
    client: &UpsourceClient,
    now: DateTime<Utc>,
    width: usize,
    out: &mut W,
) -> anyhow::Result<()> {
    let branches = client.list_branches(args.query.as_deref()).await?;
    render(&branches, now, width, out)?;
    Ok(())
}

fn render<W: Write>(
    branches: &BranchList,
    now: DateTime<Utc>,
    width: usize,
    out: &mut W,
) -> std::io::Result<()> {
    if branches.branch.is_empty() {
        writeln!(out, "No branches.")?;
        return Ok(());
    }

    let mut table = Table::new(["BRANCH", "REVIEW", "UPDATED", "LAST COMMIT"]);
    for branch in &branches.branch {
        let is_default =
            branch.is_default || branches.default_branch.as_deref() == Some(branch.name.as_str());
        let name = if is_default {
            format!("* {}", branch.name)
        } else {
            format!("  {}", branch.name)
        };
        let review = branch
            .review_id
            .as_ref()
            .map_or("-", |id| id.review_id.as_str());
        let revision = branch.last_revision.as_ref();
        table.row([
            name,
            review.to_string(),
            format_optional(revision.and_then(|r| r.date()), now),
            revision.map(|r| r.summary().to_string()).unwrap_or_default(),
        ]);
    }
    table.render(out, width)?;

    if branches.has_more {
        writeln!(
            out,
            "Showing {} of {} branches; use --query to narrow down.",
            branches.branch.len(),
            branches.total_branches
        )?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::upsource::mock::UpsourceMockServer;
    use chrono::TimeZone;
    use serde_json::json;

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2023, 11, 15, 22, 13, 20).unwrap()
    }

    fn branch_list() -> serde_json::Value {
        json!({
            "branch": [
                {
                    "name": "main",
                    "lastRevision": {
                        "revisionId": "abc",
                        "revisionCommitMessage": "Merge feature\n\ndetails",
                        "authorId": "u1",
                        "revisionDate": 1_700_000_000_000_i64
                    }
                },
                {
                    "name": "feature/login",
                    "reviewId": {"projectId": "demo", "reviewId": "DEMO-CR-3"}
                }
            ],
            "hasMore": true,
            "totalBranches": 120,
            "defaultBranch": "main"
        })
    }

    #[tokio::test]
    async fn lists_branches_with_review_and_last_commit() {
        let mock = UpsourceMockServer::start().await;
        mock.mock_result("getBranches", branch_list()).await;
        let args = ListArgs {
            query: Some("feature".to_string()),
        };
        let mut out = Vec::new();

        list(&args, &mock.client(), now(), 200, &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert!(lines[0].starts_with("BRANCH"));
        assert!(lines[1].starts_with("* main"));
        assert!(lines[1].contains("1 day ago"));
        assert!(lines[1].ends_with("Merge feature"));
        assert!(lines[2].starts_with("  feature/login"));
        assert!(lines[2].contains("DEMO-CR-3"));
        assert_eq!(lines[3], "Showing 2 of 120 branches; use --query to narrow down.");
        assert_eq!(
            mock.received_bodies("getBranches").await,
            vec![json!({"projectId": "demo", "query": "feature", "limit": 99})]
        );
    }

    #[test]
    fn empty_list() {
        let mut out = Vec::new();
        render(&BranchList::default(), now(), 80, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No branches.\n");
    }
}
