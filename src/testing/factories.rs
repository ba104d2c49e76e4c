//! Test factories for creating test data with sensible defaults.
//!
//! Use `*_with()` variants to customize specific fields.
//!
//! # Example
//! ```ignore
//! use crate::testing::factories::{review, review_with};
//!
//! let r = review();
//! let r = review_with(|r| {
//!     r.title = "Custom Title".to_string();
//!     r.is_ready_to_close = true;
//! });
//! ```

use serde_json::json;

use crate::infra::upsource::{
    Participant, ParticipantState, Review, ReviewId, ReviewState, RoleInReview,
};

pub const PROJECT_ID: &str = "demo";

// =============================================================================
// Review factories
// =============================================================================

/// Create an open Review with default test values.
pub fn review() -> Review {
    Review {
        review_id: ReviewId {
            project_id: PROJECT_ID.to_string(),
            review_id: "DEMO-CR-1".to_string(),
        },
        title: "Test review".to_string(),
        participants: vec![participant(
            "author-id",
            RoleInReview::Author,
            Some(ParticipantState::Read),
        )],
        state: ReviewState::Open,
        branch: vec!["feature/test".to_string()],
        updated_at: 1_700_000_000_000,
        is_unread: false,
        is_ready_to_close: false,
        is_removed: false,
        discussion_counter: None,
    }
}

/// Create a Review with customizations applied via closure.
pub fn review_with(f: impl FnOnce(&mut Review)) -> Review {
    let mut r = review();
    f(&mut r);
    r
}

pub fn participant(user_id: &str, role: RoleInReview, state: Option<ParticipantState>) -> Participant {
    Participant {
        user_id: user_id.to_string(),
        role,
        state,
    }
}

// =============================================================================
// Wire-format JSON factories (for mock server responses)
// =============================================================================

/// Review descriptor as returned by the server.
pub fn review_json(id: &str, title: &str, state: u8) -> serde_json::Value {
    json!({
        "reviewId": {"projectId": PROJECT_ID, "reviewId": id},
        "title": title,
        "participants": [{"userId": "author-id", "role": 1, "state": 2}],
        "state": state,
        "branch": ["feature/test"],
        "updatedAt": 1_700_000_000_000_i64,
        "isUnread": false,
        "isReadyToClose": false,
        "discussionCounter": {"count": 0, "hasUnresolved": false, "unresolvedCount": 0, "resolvedCount": 0}
    })
}

/// `getReviews` result payload.
pub fn review_list_json(reviews: Vec<serde_json::Value>) -> serde_json::Value {
    let total = reviews.len();
    json!({"reviews": reviews, "hasMore": false, "totalCount": total})
}

/// User info as returned by `findUsers` / `getUserInfo`.
pub fn user_json(user_id: &str, login: &str, name: &str) -> serde_json::Value {
    json!({
        "userId": user_id,
        "name": name,
        "login": login,
        "email": format!("{login}@example.com"),
        "isResolved": true,
        "isMe": false
    })
}
