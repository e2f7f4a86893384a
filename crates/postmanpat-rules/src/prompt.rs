//! Operator interaction.
//!
//! Rule building talks to the operator through [`Prompter`], a blocking
//! line-oriented transport. The terminal binary reads stdin; tests drive the
//! same code with [`ScriptedPrompter`].

use std::collections::VecDeque;

use thiserror::Error;

/// Failure to obtain an answer.
#[derive(Debug, Error)]
pub enum PromptError {
    /// No more input will arrive (end of file).
    #[error("operator input closed")]
    Closed,

    /// Reading input failed.
    #[error("failed to read operator input: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for prompt operations.
pub type PromptResult<T> = std::result::Result<T, PromptError>;

/// Blocking request/response channel to the operator.
pub trait Prompter {
    /// Shows `prompt` and blocks until one line of input arrives.
    ///
    /// # Errors
    ///
    /// Returns [`PromptError::Closed`] at end of input.
    fn read_line(&mut self, prompt: &str) -> PromptResult<String>;

    /// Shows an informational line.
    fn say(&mut self, message: &str);

    /// Asks a question, returning `default` on an empty answer.
    ///
    /// The default, when non-empty, is shown as `message [default]: `.
    /// Answers are trimmed.
    ///
    /// # Errors
    ///
    /// Propagates [`Prompter::read_line`] failures.
    fn ask(&mut self, message: &str, default: Option<&str>) -> PromptResult<String> {
        let prompt = match default {
            Some(d) if !d.is_empty() => format!("{message} [{d}]: "),
            _ => format!("{message}: "),
        };
        let answer = self.read_line(&prompt)?;
        let answer = answer.trim();
        if answer.is_empty() {
            return Ok(default.unwrap_or_default().to_string());
        }
        Ok(answer.to_string())
    }
}

/// Answer to a yes/no/quit question.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Answer {
    /// Go ahead.
    Yes,
    /// Skip.
    No,
    /// Stop the session.
    Quit,
}

impl Answer {
    /// Parses an answer. Empty input gives `None`; unrecognized input is
    /// treated as [`Answer::No`].
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "" => None,
            "y" | "yes" => Some(Self::Yes),
            "q" | "quit" => Some(Self::Quit),
            _ => Some(Self::No),
        }
    }
}

/// Asks a yes/no/quit question.
///
/// # Errors
///
/// Propagates prompt failures.
pub fn ask_yes_no(prompter: &mut dyn Prompter, message: &str, default: bool) -> PromptResult<Answer> {
    let hint = if default { "y" } else { "n" };
    let line = prompter.read_line(&format!("{message} [y/n/q] (default {hint}): "))?;
    Ok(Answer::parse(&line).unwrap_or(if default { Answer::Yes } else { Answer::No }))
}

/// Asks until a non-empty answer (or non-empty default) is given.
///
/// # Errors
///
/// Propagates prompt failures.
pub fn ask_required(
    prompter: &mut dyn Prompter,
    message: &str,
    default: Option<&str>,
) -> PromptResult<String> {
    loop {
        let answer = prompter.ask(message, default)?;
        if !answer.is_empty() {
            return Ok(answer);
        }
        prompter.say("Value required.");
    }
}

/// Splits a comma-separated answer, trimming items and dropping empty ones.
#[must_use]
pub fn split_list(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}

/// Prompter that replays canned answers and records what it was shown.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    transcript: Vec<String>,
}

impl ScriptedPrompter {
    /// Creates a prompter that answers with `answers` in order, then reports
    /// closed input.
    pub fn new<I, S>(answers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            answers: answers.into_iter().map(Into::into).collect(),
            transcript: Vec::new(),
        }
    }

    /// Every prompt and message shown, in order.
    #[must_use]
    pub fn transcript(&self) -> &[String] {
        &self.transcript
    }

    /// Answers not consumed yet.
    #[must_use]
    pub fn remaining(&self) -> usize {
        self.answers.len()
    }
}

impl Prompter for ScriptedPrompter {
    fn read_line(&mut self, prompt: &str) -> PromptResult<String> {
        self.transcript.push(prompt.to_string());
        self.answers.pop_front().ok_or(PromptError::Closed)
    }

    fn say(&mut self, message: &str) {
        self.transcript.push(message.to_string());
    }
}
