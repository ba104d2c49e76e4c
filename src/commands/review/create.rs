use std::io::Write;

use clap::Args;

use crate::commands::{pick_user, user_label};
use crate::infra::upsource::{RoleInReview, UpsourceClient};
use crate::session::Session;

#[derive(Args, Clone, PartialEq, Eq)]
pub struct CreateArgs {
    /// Branch to review
    #[arg(short, long)]
    pub branch: Option<String>,

    /// Revision to review (repeatable). Takes precedence over --branch
    #[arg(short, long = "revision", value_name = "REVISION")]
    pub revisions: Vec<String>,

    /// Skip adding the reviewers listed in the config file
    #[arg(long)]
    pub no_reviewers: bool,
}

pub async fn run(args: &CreateArgs, session: &Session) -> anyhow::Result<()> {
    let client = session.client()?;
    run_with_client(args, &client, &mut std::io::stdout().lock()).await
}

async fn run_with_client<W: Write>(
    args: &CreateArgs,
    client: &UpsourceClient,
    out: &mut W,
) -> anyhow::Result<()> {
    let review = client
        .create_review(args.branch.as_deref(), &args.revisions)
        .await?;
    writeln!(out, "Created {}", review.display_label())?;
    writeln!(out, "{}", client.review_url(review.id()))?;

    if args.no_reviewers {
        return Ok(());
    }
    for name in &client.config().reviewers {
        match add_reviewer(client, review.id(), name).await {
            Ok(user) => writeln!(out, "Added reviewer {user}")?,
            Err(e) => eprintln!("Warning: skipped reviewer '{name}': {e:#}"),
        }
    }
    Ok(())
}

/// Resolve `name` and add it as a reviewer. Returns the added user's label.
/// Unknown and ambiguous names fail without adding anyone.
async fn add_reviewer(
    client: &UpsourceClient,
    review_id: &str,
    name: &str,
) -> anyhow::Result<String> {
    let users = client.find_users(Some(name)).await?;
    let user = pick_user(&users, name).inspect_err(|e| {
        tracing::warn!(reviewer = name, error = %e, "reviewer not resolved");
    })?;
    client
        .add_participant(review_id, &user.user_id, RoleInReview::Reviewer)
        .await?;
    Ok(user_label(user).to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::upsource::UpsourceError;
    use crate::infra::upsource::mock::UpsourceMockServer;
    use crate::testing::factories::{review_json, user_json};
    use serde_json::json;

    fn args(branch: Option<&str>, revisions: &[&str]) -> CreateArgs {
        CreateArgs {
            branch: branch.map(String::from),
            revisions: revisions.iter().map(|r| r.to_string()).collect(),
            no_reviewers: false,
        }
    }

    fn client_with_reviewers(mock: &UpsourceMockServer, reviewers: &[&str]) -> UpsourceClient {
        let mut config = mock.config();
        config.reviewers = reviewers.iter().map(|r| r.to_string()).collect();
        UpsourceClient::new(config).unwrap()
    }

    #[tokio::test]
    async fn creates_review_and_adds_configured_reviewers() {
        let mock = UpsourceMockServer::start().await;
        mock.mock_result("createReview", review_json("DEMO-CR-9", "New feature", 1))
            .await;
        mock.mock_result_for(
            "findUsers",
            json!({"pattern": "bob"}),
            json!({"infos": [user_json("u-bobby", "bobby", "Bobby"), user_json("u-bob", "bob", "Bob")]}),
        )
        .await;
        mock.mock_result("addParticipantToReview", json!({})).await;
        let client = client_with_reviewers(&mock, &["bob"]);
        let mut out = Vec::new();

        run_with_client(&args(Some("feature/x"), &[]), &client, &mut out)
            .await
            .unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.contains("Created DEMO-CR-9 (New feature)"));
        assert!(out.contains("/demo/review/DEMO-CR-9"));
        assert!(out.contains("Added reviewer bob"));
        assert_eq!(
            mock.received_bodies("createReview").await,
            vec![json!({"projectId": "demo", "branch": "feature/x"})]
        );
        assert_eq!(
            mock.received_bodies("addParticipantToReview").await,
            vec![json!({
                "projectId": "demo",
                "reviewId": {"projectId": "demo", "reviewId": "DEMO-CR-9"},
                "participant": {"userId": "u-bob", "role": 2}
            })]
        );
    }

    #[tokio::test]
    async fn unknown_reviewer_is_not_fatal() {
        let mock = UpsourceMockServer::start().await;
        mock.mock_result("createReview", review_json("DEMO-CR-9", "New feature", 1))
            .await;
        mock.mock_result("findUsers", json!({"infos": []})).await;
        let client = client_with_reviewers(&mock, &["nobody"]);
        let mut out = Vec::new();

        run_with_client(&args(None, &["abc123"]), &client, &mut out)
            .await
            .unwrap();

        assert!(mock.received_bodies("addParticipantToReview").await.is_empty());
    }

    #[tokio::test]
    async fn ambiguous_reviewer_is_skipped() {
        let mock = UpsourceMockServer::start().await;
        mock.mock_result("createReview", review_json("DEMO-CR-9", "New feature", 1))
            .await;
        mock.mock_result(
            "findUsers",
            json!({"infos": [user_json("u-alice", "alice", "Alice"), user_json("u-alan", "alan", "Alan")]}),
        )
        .await;
        mock.mock_result("addParticipantToReview", json!({})).await;
        let client = client_with_reviewers(&mock, &["al"]);
        let mut out = Vec::new();

        run_with_client(&args(Some("feature/x"), &[]), &client, &mut out)
            .await
            .unwrap();

        assert!(!String::from_utf8(out).unwrap().contains("Added reviewer"));
        assert!(mock.received_bodies("addParticipantToReview").await.is_empty());
    }

    #[tokio::test]
    async fn add_reviewer_reports_ambiguity() {
        let mock = UpsourceMockServer::start().await;
        mock.mock_result(
            "findUsers",
            json!({"infos": [user_json("u-alice", "alice", "Alice"), user_json("u-alan", "alan", "Alan")]}),
        )
        .await;

        let err = add_reviewer(&mock.client(), "DEMO-CR-9", "al")
            .await
            .unwrap_err();

        assert_eq!(err.to_string(), "'al' is ambiguous: alice, alan");
    }

    #[tokio::test]
    async fn run_creates_through_shared_session() {
        let mock = UpsourceMockServer::start().await;
        mock.mock_result("createReview", review_json("DEMO-CR-9", "New feature", 1))
            .await;
        let (_dir, session) = mock.session();
        let mut create = args(Some("feature/x"), &[]);
        create.no_reviewers = true;

        run(&create, &session).await.unwrap();

        assert_eq!(
            mock.received_bodies("createReview").await,
            vec![json!({"projectId": "demo", "branch": "feature/x"})]
        );
    }

    #[tokio::test]
    async fn no_reviewers_flag_skips_lookup() {
        let mock = UpsourceMockServer::start().await;
        mock.mock_result("createReview", review_json("DEMO-CR-9", "New feature", 1))
            .await;
        let client = client_with_reviewers(&mock, &["bob"]);
        let mut create = args(Some("feature/x"), &[]);
        create.no_reviewers = true;

        run_with_client(&create, &client, &mut Vec::new())
            .await
            .unwrap();

        assert!(mock.received_bodies("findUsers").await.is_empty());
    }

    #[tokio::test]
    async fn missing_branch_and_revisions_fails_without_request() {
        let mock = UpsourceMockServer::start().await;
        let client = mock.client();

        let err = run_with_client(&args(None, &[]), &client, &mut Vec::new())
            .await
            .unwrap_err();

        assert!(matches!(
            err.downcast_ref::<UpsourceError>(),
            Some(UpsourceError::InvalidArgument(_))
        ));
        assert!(mock.received_requests().await.is_empty());
    }
}
