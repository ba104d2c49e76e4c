//! Per-invocation context passed to every command.
//!
//! Owns the config location and the user cache. The config is re-read each
//! time a client is requested, so a long-running `review watch` picks up edits
//! to `upsource.json` on its next refresh.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use crate::infra::upsource::{UpsourceClient, UpsourceError, User};
use crate::shared::config::{self, ConfigError, UpsConfig};

pub struct Session {
    config_path: PathBuf,
    users: UserCache,
}

impl Session {
    pub fn new(config_path: impl Into<PathBuf>) -> Self {
        Self {
            config_path: config_path.into(),
            users: UserCache::default(),
        }
    }

    pub fn config_path(&self) -> &Path {
        &self.config_path
    }

    /// Load and validate the config file.
    pub fn load_config(&self) -> Result<UpsConfig, ConfigError> {
        let config = config::load_config(&self.config_path)?;
        config.validate(&self.config_path)?;
        Ok(config)
    }

    /// Build a client from a freshly loaded config.
    pub fn client(&self) -> Result<UpsourceClient, UpsourceError> {
        UpsourceClient::new(self.load_config()?)
    }

    pub fn users(&self) -> &UserCache {
        &self.users
    }

    /// Fetch and cache users among `ids` that are not cached yet.
    pub async fn resolve_users<'a, I>(
        &mut self,
        client: &UpsourceClient,
        ids: I,
    ) -> Result<(), UpsourceError>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let missing = self.users.missing(ids);
        if missing.is_empty() {
            return Ok(());
        }
        tracing::debug!(count = missing.len(), "fetching user info");
        for user in client.user_info(&missing).await? {
            self.users.insert(user);
        }
        Ok(())
    }
}

/// User lookup used for display names. Last write wins; entries never expire.
#[derive(Debug, Default)]
pub struct UserCache {
    users: HashMap<String, User>,
}

impl UserCache {
    pub fn insert(&mut self, user: User) {
        self.users.insert(user.user_id.clone(), user);
    }

    pub fn get(&self, user_id: &str) -> Option<&User> {
        self.users.get(user_id)
    }

    /// Ids from `ids` not present in the cache, deduplicated, in first-seen order.
    pub fn missing<'a, I>(&self, ids: I) -> Vec<String>
    where
        I: IntoIterator<Item = &'a str>,
    {
        let mut missing: Vec<String> = Vec::new();
        for id in ids {
            if !self.users.contains_key(id) && !missing.iter().any(|m| m == id) {
                missing.push(id.to_string());
            }
        }
        missing
    }

    /// Name for display: the user's name, else login, else the raw id.
    pub fn display_name<'a>(&'a self, user_id: &'a str) -> &'a str {
        let Some(user) = self.users.get(user_id) else {
            return user_id;
        };
        if !user.name.is_empty() {
            &user.name
        } else {
            user.login
                .as_deref()
                .filter(|login| !login.is_empty())
                .unwrap_or(user_id)
        }
    }
}
