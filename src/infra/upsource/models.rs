//! Upsource RPC data transfer objects.
//!
//! Enum values travel as 1-based integers. Unknown discriminants are rejected
//! so a server/client mismatch surfaces as a decode error instead of a wrong
//! label.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(try_from = "u8", into = "u8")]
pub enum ReviewState {
    Open,
    Closed,
}

impl ReviewState {
    /// Value used in the `state: <value>` search syntax.
    pub fn as_query(self) -> &'static str {
        match self {
            Self::Open => "open",
            Self::Closed => "closed",
        }
    }
}

impl TryFrom<u8> for ReviewState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Open),
            2 => Ok(Self::Closed),
            other => Err(format!("unknown review state: {other}")),
        }
    }
}

impl From<ReviewState> for u8 {
    fn from(state: ReviewState) -> Self {
        match state {
            ReviewState::Open => 1,
            ReviewState::Closed => 2,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, clap::ValueEnum)]
#[serde(try_from = "u8", into = "u8")]
pub enum RoleInReview {
    Author,
    Reviewer,
    Watcher,
}

impl TryFrom<u8> for RoleInReview {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Author),
            2 => Ok(Self::Reviewer),
            3 => Ok(Self::Watcher),
            other => Err(format!("unknown participant role: {other}")),
        }
    }
}

impl From<RoleInReview> for u8 {
    fn from(role: RoleInReview) -> Self {
        match role {
            RoleInReview::Author => 1,
            RoleInReview::Reviewer => 2,
            RoleInReview::Watcher => 3,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub enum ParticipantState {
    Unread,
    Read,
    Accepted,
    Rejected,
}

impl TryFrom<u8> for ParticipantState {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Self::Unread),
            2 => Ok(Self::Read),
            3 => Ok(Self::Accepted),
            4 => Ok(Self::Rejected),
            other => Err(format!("unknown participant state: {other}")),
        }
    }
}

impl From<ParticipantState> for u8 {
    fn from(state: ParticipantState) -> Self {
        match state {
            ParticipantState::Unread => 1,
            ParticipantState::Read => 2,
            ParticipantState::Accepted => 3,
            ParticipantState::Rejected => 4,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReviewId {
    pub project_id: String,
    pub review_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub user_id: String,
    pub role: RoleInReview,
    pub state: Option<ParticipantState>,
}

/// Participant reference sent to add/remove calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ParticipantRef {
    pub user_id: String,
    pub role: RoleInReview,
}

impl From<&Participant> for ParticipantRef {
    fn from(participant: &Participant) -> Self {
        Self {
            user_id: participant.user_id.clone(),
            role: participant.role,
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct DiscussionCounter {
    pub count: u32,
    pub has_unresolved: bool,
    pub unresolved_count: u32,
    pub resolved_count: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub review_id: ReviewId,
    pub title: String,
    #[serde(default)]
    pub participants: Vec<Participant>,
    pub state: ReviewState,
    #[serde(default)]
    pub branch: Vec<String>,
    /// Milliseconds since the Unix epoch.
    #[serde(default)]
    pub updated_at: i64,
    #[serde(default)]
    pub is_unread: bool,
    #[serde(default)]
    pub is_ready_to_close: bool,
    #[serde(default)]
    pub is_removed: bool,
    pub discussion_counter: Option<DiscussionCounter>,
}

impl Review {
    pub fn id(&self) -> &str {
        &self.review_id.review_id
    }

    pub fn is_open(&self) -> bool {
        self.state == ReviewState::Open
    }

    pub fn updated_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.updated_at)
    }

    pub fn author(&self) -> Option<&Participant> {
        self.participants
            .iter()
            .find(|p| p.role == RoleInReview::Author)
    }

    pub fn has_unresolved_discussions(&self) -> bool {
        self.discussion_counter
            .as_ref()
            .is_some_and(|c| c.has_unresolved)
    }

    /// Label shown in lists: `<id> (<title>)`, marked when the review can be
    /// closed or still has unresolved discussions.
    pub fn display_label(&self) -> String {
        let label = format!("{} ({})", self.id(), self.title);
        if self.is_ready_to_close {
            format!("{label} ✅")
        } else if self.has_unresolved_discussions() {
            format!("{label} 💬")
        } else {
            label
        }
    }
}

/// True iff any participant rejected the review.
pub fn has_raised_concerns(review: &Review) -> bool {
    review
        .participants
        .iter()
        .any(|p| p.state == Some(ParticipantState::Rejected))
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ReviewList {
    pub reviews: Vec<Review>,
    pub has_more: bool,
    pub total_count: u64,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct Revision {
    pub revision_id: String,
    pub short_revision_id: String,
    pub revision_commit_message: String,
    pub author_id: String,
    /// Milliseconds since the Unix epoch.
    pub revision_date: i64,
    pub tags: Vec<String>,
    pub branch_head_label: Vec<String>,
}

impl Revision {
    pub fn date(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.revision_date)
    }

    /// First line of the commit message.
    pub fn summary(&self) -> &str {
        self.revision_commit_message
            .lines()
            .next()
            .unwrap_or_default()
            .trim()
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RevisionList {
    pub revision: Vec<Revision>,
    pub head_hash: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Branch {
    pub name: String,
    pub last_revision: Option<Revision>,
    #[serde(default)]
    pub is_default: bool,
    pub review_id: Option<ReviewId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct BranchList {
    pub branch: Vec<Branch>,
    pub has_more: bool,
    pub total_branches: u64,
    pub default_branch: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub user_id: String,
    #[serde(default)]
    pub name: String,
    pub email: Option<String>,
    pub login: Option<String>,
    #[serde(default)]
    pub is_resolved: bool,
    #[serde(default)]
    pub is_me: bool,
}

impl User {
    /// True if `query` equals the login or the display name (case-insensitive).
    pub fn matches_exactly(&self, query: &str) -> bool {
        self.login
            .as_deref()
            .is_some_and(|login| login.eq_ignore_ascii_case(query))
            || self.name.eq_ignore_ascii_case(query)
    }
}

/// Response of `findUsers`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct FindUsersResponse {
    pub infos: Vec<User>,
}

/// Response of `getUserInfo`.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub(crate) struct UserInfoResponse {
    pub result: Vec<User>,
}

/// Outcome of closing a review.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CloseOutcome {
    Closed,
    AlreadyClosed,
}
