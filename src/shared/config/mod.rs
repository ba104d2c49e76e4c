//! Upsource connection settings (`upsource.json`).
//!
//! The file lives in the project root by default and holds the server URL,
//! credentials, the project id and the default reviewer list. It is read before
//! every API call and only ever written by `ups config setup`.

pub mod setup;

use std::fmt;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::shared::dirs;

/// File name used when no explicit config path is given.
pub const CONFIG_FILE_NAME: &str = "upsource.json";

/// File name of the user-level setup defaults.
pub const DEFAULTS_FILE_NAME: &str = "defaults.json";

/// Connection settings for one Upsource project.
#[derive(Clone, Default, Deserialize, Serialize, JsonSchema, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct UpsConfig {
    /// Base URL of the Upsource server (e.g. "https://upsource.example.com").
    pub url: String,

    /// Login used for HTTP Basic authentication.
    pub login: String,

    /// Password used for HTTP Basic authentication.
    pub password: String,

    /// Upsource project id.
    pub project_id: String,

    /// Logins or names of users added as reviewers to newly created reviews.
    pub reviewers: Vec<String>,
}

impl UpsConfig {
    /// Check the fields every API call depends on.
    pub fn validate(&self, path: &Path) -> Result<()> {
        let missing = [("url", &self.url), ("projectId", &self.project_id)]
            .into_iter()
            .find(|(_, value)| value.trim().is_empty());
        match missing {
            Some((field, _)) => Err(ConfigError::Incomplete {
                path: path.to_path_buf(),
                field,
            }),
            None => Ok(()),
        }
    }

    /// Returns a copy safe to print: the password is replaced by asterisks.
    pub fn redacted(&self) -> Self {
        Self {
            password: mask(&self.password),
            ..self.clone()
        }
    }
}

impl fmt::Debug for UpsConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UpsConfig")
            .field("url", &self.url)
            .field("login", &self.login)
            .field("password", &mask(&self.password))
            .field("project_id", &self.project_id)
            .field("reviewers", &self.reviewers)
            .finish()
    }
}

fn mask(secret: &str) -> String {
    if secret.is_empty() {
        String::new()
    } else {
        "********".to_string()
    }
}

/// Values pre-filled into the setup wizard.
/// Loaded from `<config_dir>/upsource/defaults.json` when present.
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
#[serde(default, rename_all = "camelCase")]
pub struct SetupDefaults {
    pub url: String,
    pub login: String,
    pub project_id: String,
    pub reviewers: Vec<String>,
}

#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Config file not found: {0} (run `ups config setup` to create it)")]
    NotFound(PathBuf),

    /// Failed to read config file (permission error, etc.)
    #[error("Config file {path} is not readable: {source}")]
    ReadError { path: PathBuf, source: io::Error },

    #[error("Invalid config file {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error("Config file {path} has no {field}")]
    Incomplete { path: PathBuf, field: &'static str },

    #[error("Config file already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("Failed to write config file {path}: {source}")]
    WriteError { path: PathBuf, source: io::Error },
}

pub type Result<T> = std::result::Result<T, ConfigError>;

/// Load the config file at `path`.
pub fn load_config(path: &Path) -> Result<UpsConfig> {
    let content = match std::fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            return Err(ConfigError::NotFound(path.to_path_buf()));
        }
        Err(e) => {
            return Err(ConfigError::ReadError {
                path: path.to_path_buf(),
                source: e,
            });
        }
    };
    parse_json(&content, path)
}

/// Write `config` to `path`, refusing to replace an existing file.
pub fn save_new_config(path: &Path, config: &UpsConfig) -> Result<()> {
    let write_error = |source| ConfigError::WriteError {
        path: path.to_path_buf(),
        source,
    };

    let json = to_json(config, path)?;
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent).map_err(write_error)?;
    }

    let mut file = match std::fs::OpenOptions::new()
        .write(true)
        .create_new(true)
        .open(path)
    {
        Ok(file) => file,
        Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
            return Err(ConfigError::AlreadyExists(path.to_path_buf()));
        }
        Err(e) => return Err(write_error(e)),
    };

    writeln!(file, "{json}").map_err(write_error)?;

    Ok(())
}

/// Load setup defaults from `<config_dir>/upsource/defaults.json`.
/// Returns `SetupDefaults::default()` if no defaults file exists.
pub fn load_setup_defaults() -> Result<SetupDefaults> {
    let Some(dir) = dirs::upsource_config_dir() else {
        return Ok(SetupDefaults::default());
    };
    load_setup_defaults_from_dir(&dir)
}

pub fn load_setup_defaults_from_dir(dir: &Path) -> Result<SetupDefaults> {
    let path = dir.join(DEFAULTS_FILE_NAME);
    match std::fs::read_to_string(&path) {
        Ok(content) => parse_json(&content, &path),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(SetupDefaults::default()),
        Err(e) => Err(ConfigError::ReadError { path, source: e }),
    }
}

fn parse_json<T: serde::de::DeserializeOwned>(content: &str, path: &Path) -> Result<T> {
    serde_json::from_str(content).map_err(|e| ConfigError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

fn to_json<T: Serialize>(value: &T, path: &Path) -> Result<String> {
    serde_json::to_string_pretty(value).map_err(|e| ConfigError::WriteError {
        path: path.to_path_buf(),
        source: io::Error::other(e),
    })
}

/// Generate JSON Schema for the config file.
pub fn generate_schema() -> schemars::Schema {
    schemars::schema_for!(UpsConfig)
}
