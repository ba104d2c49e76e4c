use std::io::Write;
use std::path::Path;

use anyhow::Context;

use crate::shared::config::setup::interactive_setup;
use crate::shared::config::{self, ConfigError, SetupDefaults};
use crate::shared::prompt::{Prompter, TerminalPrompter};

pub fn run(path: &Path) -> anyhow::Result<()> {
    let defaults = config::load_setup_defaults()?;
    run_with_prompter(
        path,
        &mut TerminalPrompter,
        &defaults,
        &mut std::io::stdout().lock(),
    )
}

/// Run the setup wizard and persist the result at `path`.
///
/// An existing file is never touched: the user is pointed at it instead.
pub fn run_with_prompter<W: Write>(
    path: &Path,
    prompter: &mut dyn Prompter,
    defaults: &SetupDefaults,
    out: &mut W,
) -> anyhow::Result<()> {
    if path.exists() {
        writeln!(out, "Config file already exists: {}", path.display())?;
        return Ok(());
    }

    let Some(config) = interactive_setup(prompter, defaults).context("failed to read input")?
    else {
        writeln!(out, "Setup cancelled.")?;
        return Ok(());
    };

    match config::save_new_config(path, &config) {
        Ok(()) => {
            writeln!(out, "Saved {}", path.display())?;
            Ok(())
        }
        // Created by someone else while the wizard was running
        Err(ConfigError::AlreadyExists(existing)) => {
            writeln!(out, "Config file already exists: {}", existing.display())?;
            Ok(())
        }
        Err(e) => Err(e.into()),
    }
}
