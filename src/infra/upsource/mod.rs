//! Upsource RPC API client module.
//!
//! Provides `UpsourceClient` for review, branch, revision and user operations,
//! authenticated with the credentials from `upsource.json`.

mod client;
pub(crate) mod error;
#[cfg(test)]
pub mod mock;
mod models;

pub use client::{Envelope, RESULT_LIMIT, RpcError, UpsourceClient, review_url};
pub use error::UpsourceError;
pub use models::{
    Branch, BranchList, CloseOutcome, DiscussionCounter, Participant, ParticipantRef,
    ParticipantState, Review, ReviewId, ReviewList, ReviewState, Revision, RevisionList,
    RoleInReview, User, has_raised_concerns,
};
