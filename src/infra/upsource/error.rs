//! Upsource API error types.

use thiserror::Error;

use crate::shared::config::ConfigError;

#[derive(Error, Debug)]
pub enum UpsourceError {
    /// No usable config: the file is missing, unreadable, malformed or incomplete.
    #[error(transparent)]
    ConfigMissing(#[from] ConfigError),

    #[error("Upsource server is not reachable: {0}")]
    Unreachable(#[source] reqwest::Error),

    #[error("Upsource server error {code}: {message}")]
    Server { code: i64, message: String },

    #[error("Upsource server responded with HTTP {status}{}", format_detail(.message))]
    Http {
        status: u16,
        message: Option<String>,
    },

    #[error("Invalid response from Upsource server: {0}")]
    InvalidResponse(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

pub type Result<T> = std::result::Result<T, UpsourceError>;

fn format_detail(message: &Option<String>) -> String {
    match message {
        Some(message) if !message.is_empty() => format!(": {message}"),
        _ => String::new(),
    }
}
