mod close;
mod create;
mod list;
mod open;
mod participant;
mod watch;

use clap::Subcommand;

use crate::session::Session;

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum ReviewCommands {
    /// List reviews as a tree (open reviews, then closed ones)
    List(list::ListArgs),

    /// Create a review from a branch or revisions and add the default reviewers
    Create(create::CreateArgs),

    /// Close a review
    Close(close::CloseArgs),

    /// Open a review in the browser
    Open(open::OpenArgs),

    /// Add or remove review participants
    #[command(subcommand)]
    Participant(participant::ParticipantCommands),

    /// Periodically refresh open reviews
    Watch(watch::WatchArgs),
}

impl ReviewCommands {
    pub async fn run(&self, session: &mut Session) -> anyhow::Result<()> {
        match self {
            Self::List(args) => list::run(args, session).await,
            Self::Create(args) => create::run(args, session).await,
            Self::Close(args) => close::run(args, session).await,
            Self::Open(args) => open::run(args, session),
            Self::Participant(cmd) => cmd.run(session).await,
            Self::Watch(args) => watch::run(args, session).await,
        }
    }
}
