use std::io::Write;

use anyhow::{Context, bail};
use clap::{Args, Subcommand};

use crate::commands::{pick_user, user_label};
use crate::infra::upsource::{ParticipantRef, RoleInReview, UpsourceClient, User};
use crate::session::Session;

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum ParticipantCommands {
    /// Add a user to a review
    Add(AddArgs),

    /// Remove a user from a review
    Remove(RemoveArgs),
}

#[derive(Args, Clone, PartialEq, Eq)]
pub struct AddArgs {
    /// Review id, e.g. DEMO-CR-42
    pub review_id: String,

    /// Login, name or search pattern of the user
    pub user: String,

    /// Role of the new participant
    #[arg(short, long, value_enum, default_value = "reviewer")]
    pub role: RoleInReview,
}

#[derive(Args, Clone, PartialEq, Eq)]
pub struct RemoveArgs {
    /// Review id, e.g. DEMO-CR-42
    pub review_id: String,

    /// Login, name or search pattern of the user
    pub user: String,

    /// Only remove the participant with this role
    #[arg(short, long, value_enum)]
    pub role: Option<RoleInReview>,
}

impl ParticipantCommands {
    pub async fn run(&self, session: &Session) -> anyhow::Result<()> {
        let client = session.client()?;
        let mut stdout = std::io::stdout().lock();
        match self {
            Self::Add(args) => add(args, &client, &mut stdout).await,
            Self::Remove(args) => remove(args, &client, &mut stdout).await,
        }
    }
}

async fn resolve_user(client: &UpsourceClient, query: &str) -> anyhow::Result<User> {
    let users = client
        .find_users(Some(query))
        .await
        .context("failed to search users")?;
    Ok(pick_user(&users, query)?.clone())
}

async fn add<W: Write>(args: &AddArgs, client: &UpsourceClient, out: &mut W) -> anyhow::Result<()> {
    let user = resolve_user(client, &args.user).await?;
    client
        .add_participant(&args.review_id, &user.user_id, args.role)
        .await?;
    writeln!(
        out,
        "Added {} to {} as {}",
        user_label(&user),
        args.review_id,
        role_name(args.role)
    )?;
    Ok(())
}

async fn remove<W: Write>(
    args: &RemoveArgs,
    client: &UpsourceClient,
    out: &mut W,
) -> anyhow::Result<()> {
    let user = resolve_user(client, &args.user).await?;
    let review = client.review_details(&args.review_id).await?;

    let participants: Vec<ParticipantRef> = review
        .participants
        .iter()
        .filter(|p| p.user_id == user.user_id)
        .filter(|p| args.role.is_none_or(|role| p.role == role))
        .map(ParticipantRef::from)
        .collect();
    if participants.is_empty() {
        bail!("{} is not a participant of {}", user_label(&user), args.review_id);
    }

    for participant in &participants {
        client
            .remove_participant(&args.review_id, participant)
            .await?;
        writeln!(
            out,
            "Removed {} ({}) from {}",
            user_label(&user),
            role_name(participant.role),
            args.review_id
        )?;
    }
    Ok(())
}

fn role_name(role: RoleInReview) -> &'static str {
    match role {
        RoleInReview::Author => "author",
        RoleInReview::Reviewer => "reviewer",
        RoleInReview::Watcher => "watcher",
    }
}
