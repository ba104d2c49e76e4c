use std::io::Write;

use chrono::{DateTime, Utc};
use clap::Args;

use crate::infra::upsource::{
    Review, ReviewList, ReviewState, UpsourceClient, UpsourceError, has_raised_concerns,
};
use crate::session::{Session, UserCache};
use crate::shared::table::{Table, terminal_width};
use crate::shared::time::format_optional;

const CLOSED_FOLDER: &str = "Closed Reviews";

#[derive(Args, Clone, PartialEq, Eq)]
pub struct ListArgs {
    /// Search query, e.g. "state: open and author: me"
    #[arg(short, long, conflicts_with = "state")]
    pub query: Option<String>,

    /// Only list reviews in this state
    #[arg(short, long, value_enum)]
    pub state: Option<ReviewState>,

    /// Expand the closed reviews folder
    #[arg(short, long, conflicts_with_all = ["query", "state"])]
    pub all: bool,
}

/// Reviews as fetched for one listing.
#[derive(Debug)]
pub enum ReviewView {
    /// Result of an explicit query or state filter.
    Flat(ReviewList),
    /// Open reviews plus the closed folder; `closed` is `None` while collapsed.
    Tree {
        open: ReviewList,
        closed: Option<ReviewList>,
    },
}

impl ReviewView {
    fn reviews(&self) -> impl Iterator<Item = &Review> {
        let (first, second) = match self {
            Self::Flat(list) => (list, None),
            Self::Tree { open, closed } => (open, closed.as_ref()),
        };
        first
            .reviews
            .iter()
            .chain(second.into_iter().flat_map(|l| l.reviews.iter()))
    }

    fn author_ids(&self) -> Vec<String> {
        self.reviews()
            .filter_map(Review::author)
            .map(|p| p.user_id.clone())
            .collect()
    }
}

pub async fn run(args: &ListArgs, session: &mut Session) -> anyhow::Result<()> {
    run_with_writer(
        args,
        session,
        Utc::now(),
        terminal_width(),
        &mut std::io::stdout().lock(),
    )
    .await
}

async fn run_with_writer<W: Write>(
    args: &ListArgs,
    session: &mut Session,
    now: DateTime<Utc>,
    width: usize,
    out: &mut W,
) -> anyhow::Result<()> {
    let client = session.client()?;
    let view = fetch(args, &client).await?;

    let ids = view.author_ids();
    if let Err(e) = session
        .resolve_users(&client, ids.iter().map(String::as_str))
        .await
    {
        tracing::warn!(error = %e, "failed to resolve author names");
    }

    render(&view, session.users(), now, width, out)?;
    Ok(())
}

async fn fetch(args: &ListArgs, client: &UpsourceClient) -> Result<ReviewView, UpsourceError> {
    if let Some(query) = &args.query {
        let list = client.list_reviews(Some(query)).await?;
        return Ok(ReviewView::Flat(without_removed(list)));
    }
    if let Some(state) = args.state {
        let list = client.list_reviews_with_state(Some(state)).await?;
        return Ok(ReviewView::Flat(without_removed(list)));
    }

    let open = client
        .list_reviews_with_state(Some(ReviewState::Open))
        .await?;
    let closed = if args.all {
        Some(
            client
                .list_reviews_with_state(Some(ReviewState::Closed))
                .await
                .map(without_removed)?,
        )
    } else {
        None
    };
    let open = without_removed(open);
    Ok(ReviewView::Tree { open, closed })
}

fn without_removed(mut list: ReviewList) -> ReviewList {
    list.reviews.retain(|r| !r.is_removed);
    list
}

/// Label shown in the tree, with a warning sign when a participant rejected it.
pub fn review_label(review: &Review) -> String {
    let label = review.display_label();
    if has_raised_concerns(review) {
        format!("{label} ⚠")
    } else {
        label
    }
}

fn review_row(review: &Review, users: &UserCache, now: DateTime<Utc>, indent: &str) -> [String; 3] {
    let author = review
        .author()
        .map_or("-", |p| users.display_name(&p.user_id));
    [
        format_optional(review.updated_at(), now),
        author.to_string(),
        format!("{indent}{}", review_label(review)),
    ]
}

fn write_truncation_note<W: Write>(out: &mut W, list: &ReviewList) -> std::io::Result<()> {
    if list.has_more {
        writeln!(
            out,
            "Showing {} of {} reviews; narrow the query to see the rest.",
            list.reviews.len(),
            list.total_count
        )?;
    }
    Ok(())
}

pub fn render<W: Write>(
    view: &ReviewView,
    users: &UserCache,
    now: DateTime<Utc>,
    width: usize,
    out: &mut W,
) -> std::io::Result<()> {
    if view.reviews().next().is_none() {
        writeln!(out, "No reviews.")?;
        return Ok(());
    }

    let mut table = Table::new(["UPDATED", "AUTHOR", "REVIEW"]);
    match view {
        ReviewView::Flat(list) => {
            for review in &list.reviews {
                table.row(review_row(review, users, now, ""));
            }
            table.render(out, width)?;
            write_truncation_note(out, list)?;
        }
        ReviewView::Tree { open, closed } => {
            for review in &open.reviews {
                table.row(review_row(review, users, now, ""));
            }
            match closed {
                Some(closed) => {
                    table.row([String::new(), String::new(), format!("▾ {CLOSED_FOLDER}")]);
                    for review in &closed.reviews {
                        table.row(review_row(review, users, now, "  "));
                    }
                }
                None => table.row([
                    String::new(),
                    String::new(),
                    format!("▸ {CLOSED_FOLDER} (--all to expand)"),
                ]),
            }
            table.render(out, width)?;
            write_truncation_note(out, open)?;
            if let Some(closed) = closed {
                write_truncation_note(out, closed)?;
            }
        }
    }
    Ok(())
}
