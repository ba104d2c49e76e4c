use std::io::Write;

use clap::{Args, Subcommand};

use crate::infra::upsource::{UpsourceClient, User};
use crate::session::Session;
use crate::shared::table::{Table, terminal_width};

#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum UserCommands {
    /// Search users by login, name or email
    Find(FindArgs),
}

#[derive(Args, Clone, PartialEq, Eq)]
pub struct FindArgs {
    /// Search pattern; lists users without one
    pub pattern: Option<String>,
}

impl UserCommands {
    pub async fn run(&self, session: &Session) -> anyhow::Result<()> {
        match self {
            Self::Find(args) => {
                let client = session.client()?;
                find(args, &client, &mut std::io::stdout().lock()).await
            }
        }
    }
}

async fn find<W: Write>(args: &FindArgs, client: &UpsourceClient, out: &mut W) -> anyhow::Result<()> {
    let users = client.find_users(args.pattern.as_deref()).await?;
    render(&users, terminal_width(), out)?;
    Ok(())
}

fn render<W: Write>(users: &[User], width: usize, out: &mut W) -> std::io::Result<()> {
    if users.is_empty() {
        writeln!(out, "No users found.")?;
        return Ok(());
    }

    let mut table = Table::new(["LOGIN", "NAME", "ID", "EMAIL"]);
    for user in users {
        let login = user.login.as_deref().unwrap_or("-");
        let login = if user.is_me {
            format!("{login} (you)")
        } else {
            login.to_string()
        };
        table.row([
            login,
            user.name.clone(),
            user.user_id.clone(),
            user.email.clone().unwrap_or_default(),
        ]);
    }
    table.render(out, width)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infra::upsource::mock::UpsourceMockServer;
    use crate::testing::factories::user_json;
    use serde_json::json;

    #[tokio::test]
    async fn find_sends_pattern_and_lists_matches() {
        let mock = UpsourceMockServer::start().await;
        mock.mock_result(
            "findUsers",
            json!({"infos": [user_json("u1", "alice", "Alice"), user_json("u2", "alina", "Alina")]}),
        )
        .await;
        let args = FindArgs {
            pattern: Some("ali".to_string()),
        };
        let mut out = Vec::new();

        find(&args, &mock.client(), &mut out).await.unwrap();

        let out = String::from_utf8(out).unwrap();
        let lines: Vec<&str> = out.lines().collect();
        assert_eq!(lines.len(), 3);
        assert!(lines[1].starts_with("alice"));
        assert!(lines[2].starts_with("alina"));
        assert_eq!(
            mock.received_bodies("findUsers").await,
            vec![json!({"projectId": "demo", "pattern": "ali", "limit": 99})]
        );
    }

    #[test]
    fn current_user_is_marked() {
        let users = vec![User {
            user_id: "u1".to_string(),
            name: "Alice".to_string(),
            email: None,
            login: Some("alice".to_string()),
            is_resolved: true,
            is_me: true,
        }];
        let mut out = Vec::new();

        render(&users, 100, &mut out).unwrap();

        let out = String::from_utf8(out).unwrap();
        assert!(out.lines().nth(1).unwrap().starts_with("alice (you)"));
    }

    #[test]
    fn no_match() {
        let mut out = Vec::new();
        render(&[], 100, &mut out).unwrap();
        assert_eq!(String::from_utf8(out).unwrap(), "No users found.\n");
    }
}
