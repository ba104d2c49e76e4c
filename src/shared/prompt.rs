//! Line prompts for interactive flows.
//!
//! `TerminalPrompter` reads keys in raw mode so secrets can be masked and Esc
//! or Ctrl-C cancels the prompt. When stdin is not a terminal it falls back to
//! plain line reads, where end of input cancels.

use std::io::{self, BufRead, IsTerminal, Write};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use crossterm::terminal;

/// A single question shown to the user.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Prompt {
    pub message: String,
    pub placeholder: String,
    pub masked: bool,
}

impl Prompt {
    pub fn new(message: impl Into<String>, placeholder: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            placeholder: placeholder.into(),
            masked: false,
        }
    }

    pub fn masked(mut self) -> Self {
        self.masked = true;
        self
    }

    /// Text printed before the cursor, e.g. `Please enter your login [alice]: `.
    pub fn label(&self) -> String {
        if self.placeholder.is_empty() {
            format!("{}: ", self.message)
        } else {
            format!("{} [{}]: ", self.message, self.placeholder)
        }
    }
}

/// Source of answers for interactive flows.
pub trait Prompter {
    /// Ask one question. `Ok(None)` means the user cancelled.
    fn ask(&mut self, prompt: &Prompt) -> io::Result<Option<String>>;
}

pub struct TerminalPrompter;

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &Prompt) -> io::Result<Option<String>> {
        let mut stderr = io::stderr();
        write!(stderr, "{}", prompt.label())?;
        stderr.flush()?;

        if !io::stdin().is_terminal() {
            return read_plain_line(&mut io::stdin().lock());
        }

        let answer = {
            let _raw = RawModeGuard::enable()?;
            read_raw_line(&mut stderr, prompt.masked)
        };
        writeln!(stderr)?;
        answer
    }
}

/// Restores cooked mode when dropped, including on early returns.
struct RawModeGuard;

impl RawModeGuard {
    fn enable() -> io::Result<Self> {
        terminal::enable_raw_mode()?;
        Ok(Self)
    }
}

impl Drop for RawModeGuard {
    fn drop(&mut self) {
        let _ = terminal::disable_raw_mode();
    }
}

fn read_raw_line<W: Write>(out: &mut W, masked: bool) -> io::Result<Option<String>> {
    let mut buffer = String::new();
    loop {
        let Event::Key(KeyEvent {
            code,
            modifiers,
            kind: KeyEventKind::Press,
            ..
        }) = event::read()?
        else {
            continue;
        };

        match code {
            KeyCode::Enter => return Ok(Some(buffer)),
            KeyCode::Esc => return Ok(None),
            KeyCode::Char('c' | 'd') if modifiers.contains(KeyModifiers::CONTROL) => {
                return Ok(None);
            }
            KeyCode::Backspace => {
                if buffer.pop().is_some() {
                    write!(out, "\u{8} \u{8}")?;
                }
            }
            KeyCode::Char(c) => {
                buffer.push(c);
                write!(out, "{}", if masked { '*' } else { c })?;
            }
            _ => {}
        }
        out.flush()?;
    }
}

fn read_plain_line<R: BufRead>(input: &mut R) -> io::Result<Option<String>> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Ok(None);
    }
    Ok(Some(line.trim_end_matches(['\r', '\n']).to_string()))
}

#[cfg(test)]
pub mod testing {
    use super::*;
    use std::collections::VecDeque;

    /// Replays canned answers and records the prompts it was asked.
    #[derive(Default)]
    pub struct ScriptedPrompter {
        answers: VecDeque<Option<String>>,
        pub asked: Vec<Prompt>,
    }

    impl ScriptedPrompter {
        pub fn new<I, S>(answers: I) -> Self
        where
            I: IntoIterator<Item = Option<S>>,
            S: Into<String>,
        {
            Self {
                answers: answers.into_iter().map(|a| a.map(Into::into)).collect(),
                asked: Vec::new(),
            }
        }
    }

    impl Prompter for ScriptedPrompter {
        fn ask(&mut self, prompt: &Prompt) -> io::Result<Option<String>> {
            self.asked.push(prompt.clone());
            Ok(self.answers.pop_front().flatten())
        }
    }
}
