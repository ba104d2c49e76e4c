pub mod branch;
pub mod config;
pub mod review;
pub mod revision;
pub mod user;

use crate::infra::upsource::User;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum PickUserError {
    #[error("No user matches '{0}'")]
    NotFound(String),

    #[error("'{query}' is ambiguous: {}", .candidates.join(", "))]
    Ambiguous {
        query: String,
        candidates: Vec<String>,
    },
}

/// Short label for a user in messages: login, else name.
pub fn user_label(user: &User) -> &str {
    user.login
        .as_deref()
        .filter(|login| !login.is_empty())
        .unwrap_or(&user.name)
}

/// Pick the user a free-form `query` refers to: an exact login or name match,
/// otherwise the only search hit. Several inexact hits are ambiguous.
pub fn pick_user<'a>(users: &'a [User], query: &str) -> Result<&'a User, PickUserError> {
    if let Some(user) = users.iter().find(|u| u.matches_exactly(query)) {
        return Ok(user);
    }
    match users {
        [] => Err(PickUserError::NotFound(query.to_string())),
        [user] => Ok(user),
        _ => Err(PickUserError::Ambiguous {
            query: query.to_string(),
            candidates: users.iter().map(|u| user_label(u).to_string()).collect(),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    fn user(user_id: &str, login: &str, name: &str) -> User {
        User {
            user_id: user_id.to_string(),
            name: name.to_string(),
            email: None,
            login: Some(login.to_string()),
            is_resolved: true,
            is_me: false,
        }
    }

    #[rstest]
    #[case::exact_login_beats_order("bob", "u2")]
    #[case::exact_name("Carol King", "u3")]
    fn test_pick_user(#[case] query: &str, #[case] expected: &str) {
        let users = vec![
            user("u1", "bobby", "Bobby Tables"),
            user("u2", "bob", "Bob Builder"),
            user("u3", "carol", "Carol King"),
        ];
        assert_eq!(pick_user(&users, query).unwrap().user_id, expected);
    }

    #[test]
    fn single_inexact_hit_is_picked() {
        let users = vec![user("u3", "carol", "Carol King")];
        assert_eq!(pick_user(&users, "ca").unwrap().user_id, "u3");
    }

    #[test]
    fn several_inexact_hits_are_ambiguous() {
        let users = vec![
            user("u-alice", "alice", "Alice"),
            user("u-alan", "alan", "Alan"),
        ];

        let err = pick_user(&users, "al").unwrap_err();

        assert_eq!(
            err,
            PickUserError::Ambiguous {
                query: "al".to_string(),
                candidates: vec!["alice".to_string(), "alan".to_string()],
            }
        );
        assert_eq!(err.to_string(), "'al' is ambiguous: alice, alan");
    }

    #[test]
    fn pick_user_from_empty_list() {
        assert_eq!(
            pick_user(&[], "bob"),
            Err(PickUserError::NotFound("bob".to_string()))
        );
    }
}
