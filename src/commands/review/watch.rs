use std::collections::HashMap;
use std::future::Future;
use std::io::Write;
use std::time::Duration;

use chrono::Local;
use clap::Args;
use tokio::time::{Instant, MissedTickBehavior};

use super::list::review_label;
use crate::infra::notification::{self, Notification};
use crate::infra::upsource::{Review, ReviewState, UpsourceClient, has_raised_concerns};
use crate::session::Session;

#[derive(Args, Clone, PartialEq, Eq)]
pub struct WatchArgs {
    /// Seconds between refreshes
    #[arg(short, long, default_value_t = 60, value_parser = clap::value_parser!(u64).range(1..))]
    pub interval: u64,

    /// Send a desktop notification for each change
    #[arg(long)]
    pub notify: bool,
}

pub async fn run(args: &WatchArgs, session: &Session) -> anyhow::Result<()> {
    // Fail fast on a missing config instead of reporting it every tick
    session.load_config()?;

    let mut refresher = WatchRefresher {
        session,
        tracker: ReviewTracker::default(),
        notify: args.notify,
        out: std::io::stdout(),
    };
    let shutdown = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::warn!(error = %e, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    let refreshes =
        run_refresh_loop(Duration::from_secs(args.interval), shutdown, &mut refresher).await;
    tracing::debug!(refreshes, "watch stopped");
    Ok(())
}

trait Refresh {
    async fn refresh(&mut self) -> anyhow::Result<()>;
}

/// Call `refresher` every `period` until `shutdown` resolves. Returns the
/// number of refreshes that succeeded.
///
/// A refresh is never started while another is in flight: ticks missed during
/// a slow refresh are skipped, not queued. A failed refresh is reported and the
/// loop keeps going. Shutdown also cancels an in-flight refresh.
async fn run_refresh_loop<R, F>(period: Duration, shutdown: F, refresher: &mut R) -> u64
where
    R: Refresh,
    F: Future<Output = ()>,
{
    let mut ticker = tokio::time::interval(period);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut succeeded = 0;
    let mut busy_until: Option<Instant> = None;
    loop {
        let scheduled = tokio::select! {
            biased;
            () = &mut shutdown => break,
            at = ticker.tick() => at,
        };
        // Came due while the previous refresh was still running
        if busy_until.is_some_and(|end| scheduled < end) {
            tracing::debug!("skipping tick missed during refresh");
            continue;
        }
        tokio::select! {
            biased;
            () = &mut shutdown => break,
            result = refresher.refresh() => match result {
                Ok(()) => succeeded += 1,
                Err(e) => {
                    tracing::warn!(error = %e, "refresh failed");
                    eprintln!("Refresh failed: {e:#}");
                }
            },
        }
        busy_until = Some(Instant::now());
    }
    succeeded
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    New,
    ReadyToClose,
    ConcernsRaised,
    NoLongerOpen,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReviewChange {
    pub kind: ChangeKind,
    pub review_id: String,
    pub label: String,
}

impl ReviewChange {
    pub fn message(&self) -> String {
        let prefix = match self.kind {
            ChangeKind::New => "New review",
            ChangeKind::ReadyToClose => "Ready to close",
            ChangeKind::ConcernsRaised => "Concerns raised",
            ChangeKind::NoLongerOpen => "No longer open",
        };
        format!("{prefix}: {}", self.label)
    }

    fn notifies(&self) -> bool {
        self.kind != ChangeKind::NoLongerOpen
    }
}

#[derive(Debug, Clone)]
struct Snapshot {
    label: String,
    ready_to_close: bool,
    has_concerns: bool,
}

impl Snapshot {
    fn of(review: &Review) -> Self {
        Self {
            label: review_label(review),
            ready_to_close: review.is_ready_to_close,
            has_concerns: has_raised_concerns(review),
        }
    }
}

/// Remembers the open reviews seen on the previous refresh.
#[derive(Debug, Default)]
pub struct ReviewTracker {
    known: Option<HashMap<String, Snapshot>>,
}

impl ReviewTracker {
    /// Record the current open reviews. Returns `None` on the first call, which
    /// only establishes the baseline, and the changes since the last call after that.
    pub fn update(&mut self, reviews: &[Review]) -> Option<Vec<ReviewChange>> {
        let current: HashMap<String, Snapshot> = reviews
            .iter()
            .filter(|r| r.is_open() && !r.is_removed)
            .map(|r| (r.id().to_string(), Snapshot::of(r)))
            .collect();
        let previous = self.known.replace(current.clone())?;

        let change = |kind, id: &str, snapshot: &Snapshot| ReviewChange {
            kind,
            review_id: id.to_string(),
            label: snapshot.label.clone(),
        };

        let mut changes = Vec::new();
        // Keep output stable across refreshes
        let mut ids: Vec<&String> = current.keys().collect();
        ids.sort();
        for id in ids {
            let now = &current[id];
            match previous.get(id) {
                None => changes.push(change(ChangeKind::New, id, now)),
                Some(before) => {
                    if now.ready_to_close && !before.ready_to_close {
                        changes.push(change(ChangeKind::ReadyToClose, id, now));
                    }
                    if now.has_concerns && !before.has_concerns {
                        changes.push(change(ChangeKind::ConcernsRaised, id, now));
                    }
                }
            }
        }

        let mut gone: Vec<(&String, &Snapshot)> = previous
            .iter()
            .filter(|(id, _)| !current.contains_key(*id))
            .collect();
        gone.sort_by_key(|(id, _)| *id);
        for (id, before) in gone {
            changes.push(change(ChangeKind::NoLongerOpen, id, before));
        }

        Some(changes)
    }
}

fn notifications_for(changes: &[ReviewChange], client: &UpsourceClient) -> Vec<Notification> {
    changes
        .iter()
        .filter(|c| c.notifies())
        .map(|c| Notification::new("Upsource", c.message()).with_url(client.review_url(&c.review_id)))
        .collect()
}

struct WatchRefresher<'a, W> {
    session: &'a Session,
    tracker: ReviewTracker,
    notify: bool,
    out: W,
}

impl<W: Write> Refresh for WatchRefresher<'_, W> {
    async fn refresh(&mut self) -> anyhow::Result<()> {
        let client = self.session.client()?;
        let list = client
            .list_reviews_with_state(Some(ReviewState::Open))
            .await?;
        let timestamp = Local::now().format("%H:%M:%S");

        let Some(changes) = self.tracker.update(&list.reviews) else {
            writeln!(
                self.out,
                "[{timestamp}] Watching {} open reviews (Ctrl-C to stop)",
                list.reviews.len()
            )?;
            return Ok(());
        };
        tracing::debug!(changes = changes.len(), "refreshed open reviews");

        for change in &changes {
            writeln!(self.out, "[{timestamp}] {}", change.message())?;
        }
        if self.notify {
            for notification in notifications_for(&changes, &client) {
                if let Err(e) = notification::send(&notification) {
                    tracing::warn!(error = %e, "failed to send notification");
                }
            }
        }
        Ok(())
    }
}
