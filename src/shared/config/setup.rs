//! Interactive creation of `upsource.json`.
//!
//! The wizard walks a fixed sequence of steps. Cancelling any prompt moves it
//! to `Cancelled` and the collected answers are dropped; only `Done` yields a
//! config.

use std::io;

use super::{SetupDefaults, UpsConfig};
use crate::shared::prompt::{Prompt, Prompter};

const QUESTION: &str = "Please enter your";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SetupStep {
    Url,
    Login,
    Password,
    ProjectId,
    Reviewers,
}

impl SetupStep {
    fn next(self) -> Option<Self> {
        match self {
            Self::Url => Some(Self::Login),
            Self::Login => Some(Self::Password),
            Self::Password => Some(Self::ProjectId),
            Self::ProjectId => Some(Self::Reviewers),
            Self::Reviewers => None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WizardState {
    Collecting(SetupStep),
    Done,
    Cancelled,
}

#[derive(Debug)]
pub struct SetupWizard {
    state: WizardState,
    config: UpsConfig,
}

impl SetupWizard {
    pub fn new(defaults: &SetupDefaults) -> Self {
        Self {
            state: WizardState::Collecting(SetupStep::Url),
            config: UpsConfig {
                url: defaults.url.clone(),
                login: defaults.login.clone(),
                password: String::new(),
                project_id: defaults.project_id.clone(),
                reviewers: defaults.reviewers.clone(),
            },
        }
    }

    pub fn state(&self) -> WizardState {
        self.state
    }

    /// The question for the current step, or `None` once the wizard has finished.
    pub fn prompt(&self) -> Option<Prompt> {
        let WizardState::Collecting(step) = self.state else {
            return None;
        };

        let prompt = match step {
            SetupStep::Url => Prompt::new(
                format!("{QUESTION} Upsource URL"),
                placeholder(&self.config.url, "URL"),
            ),
            SetupStep::Login => Prompt::new(
                format!("{QUESTION} login identifier"),
                placeholder(&self.config.login, "login identifier"),
            ),
            SetupStep::Password => Prompt::new(format!("{QUESTION} password"), "").masked(),
            SetupStep::ProjectId => Prompt::new(
                format!("{QUESTION} project ID"),
                placeholder(&self.config.project_id, "Project ID"),
            ),
            SetupStep::Reviewers => Prompt::new(
                format!("{QUESTION} default reviewers (comma separated)"),
                self.config.reviewers.join(", "),
            ),
        };
        Some(prompt)
    }

    /// Feed the answer for the current step. `None` cancels the whole flow.
    /// An empty answer keeps the pre-filled value.
    pub fn answer(&mut self, input: Option<String>) {
        let WizardState::Collecting(step) = self.state else {
            return;
        };
        let Some(input) = input else {
            self.state = WizardState::Cancelled;
            return;
        };

        // Passwords are taken verbatim
        let input = match step {
            SetupStep::Password => input.as_str(),
            _ => input.trim(),
        };
        if !input.is_empty() {
            match step {
                SetupStep::Url => self.config.url = input.to_string(),
                SetupStep::Login => self.config.login = input.to_string(),
                SetupStep::Password => self.config.password = input.to_string(),
                SetupStep::ProjectId => self.config.project_id = input.to_string(),
                SetupStep::Reviewers => self.config.reviewers = parse_reviewers(input),
            }
        }

        self.state = match step.next() {
            Some(next) => WizardState::Collecting(next),
            None => WizardState::Done,
        };
    }

    /// The collected config, only when every step was answered.
    pub fn into_config(self) -> Option<UpsConfig> {
        match self.state {
            WizardState::Done => Some(self.config),
            _ => None,
        }
    }
}

fn placeholder(current: &str, fallback: &str) -> String {
    if current.is_empty() {
        fallback.to_string()
    } else {
        current.to_string()
    }
}

/// Split a comma separated list, trimming entries and dropping empty ones.
pub fn parse_reviewers(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(str::trim)
        .filter(|name| !name.is_empty())
        .map(String::from)
        .collect()
}

/// Drive the wizard with `prompter` until it is done or cancelled.
pub fn interactive_setup(
    prompter: &mut dyn Prompter,
    defaults: &SetupDefaults,
) -> io::Result<Option<UpsConfig>> {
    let mut wizard = SetupWizard::new(defaults);
    while let Some(prompt) = wizard.prompt() {
        let answer = prompter.ask(&prompt)?;
        wizard.answer(answer);
    }
    tracing::debug!(state = ?wizard.state(), "setup wizard finished");
    Ok(wizard.into_config())
}
