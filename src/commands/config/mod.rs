mod setup;

use std::io::Write;

use clap::Subcommand;

use crate::session::Session;
use crate::shared::config;

/// Configuration management commands.
#[derive(Subcommand, Clone, PartialEq, Eq)]
pub enum ConfigCommands {
    /// Create upsource.json interactively
    Setup,

    /// Print the loaded configuration with the password masked
    Show,

    /// Print JSON Schema for the configuration file
    Schema,

    /// Print the path of the configuration file in use
    Path,
}

impl ConfigCommands {
    pub fn run(&self, session: &Session) -> anyhow::Result<()> {
        let mut stdout = std::io::stdout().lock();
        match self {
            Self::Setup => setup::run(session.config_path()),
            Self::Show => show(session, &mut stdout),
            Self::Schema => {
                let schema = config::generate_schema();
                let json = serde_json::to_string_pretty(&schema)?;
                writeln!(stdout, "{json}")?;
                Ok(())
            }
            Self::Path => {
                writeln!(stdout, "{}", session.config_path().display())?;
                Ok(())
            }
        }
    }
}

fn show<W: Write>(session: &Session, out: &mut W) -> anyhow::Result<()> {
    let config = config::load_config(session.config_path())?;
    let json = serde_json::to_string_pretty(&config.redacted())?;
    writeln!(out, "{json}")?;
    Ok(())
}
