//! Interactive input and user notices

use dialoguer::{theme::ColorfulTheme, Input, Password};
use nexus_core::{nexus_println, NexusError, Result};
use std::collections::VecDeque;

/// Terminal interaction used by the setup flow.
pub trait Prompter {
    /// Ask for a line of echoed input; may return an empty string.
    fn ask(&mut self, prompt: &str) -> Result<String>;

    /// Ask for input with echo suppressed; may return an empty string.
    fn ask_secret(&mut self, prompt: &str) -> Result<String>;

    /// Tell the user something.
    fn notify(&mut self, message: &str);
}

/// Prompts on the controlling terminal.
pub struct TerminalPrompter {
    theme: ColorfulTheme,
}

impl TerminalPrompter {
    pub fn new() -> Self {
        Self {
            theme: ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompter {
    fn default() -> Self {
        Self::new()
    }
}

impl Prompter for TerminalPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        Input::<String>::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| NexusError::Prompt(e.to_string()))
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<String> {
        Password::with_theme(&self.theme)
            .with_prompt(prompt)
            .allow_empty_password(true)
            .interact()
            .map_err(|e| NexusError::Prompt(e.to_string()))
    }

    fn notify(&mut self, message: &str) {
        nexus_println!("{}", message);
    }
}

/// Replays canned answers and records everything it was asked and told.
///
/// Running out of answers yields empty strings, like a user pressing enter.
#[derive(Debug, Default)]
pub struct ScriptedPrompter {
    answers: VecDeque<String>,
    secrets: VecDeque<String>,
    pub asked: Vec<String>,
    pub asked_secret: Vec<String>,
    pub notices: Vec<String>,
}

impl ScriptedPrompter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue an answer for the next `ask`.
    pub fn answer(mut self, answer: impl Into<String>) -> Self {
        self.answers.push_back(answer.into());
        self
    }

    /// Queue an answer for the next `ask_secret`.
    pub fn secret(mut self, secret: impl Into<String>) -> Self {
        self.secrets.push_back(secret.into());
        self
    }
}

impl Prompter for ScriptedPrompter {
    fn ask(&mut self, prompt: &str) -> Result<String> {
        self.asked.push(prompt.to_string());
        Ok(self.answers.pop_front().unwrap_or_default())
    }

    fn ask_secret(&mut self, prompt: &str) -> Result<String> {
        self.asked_secret.push(prompt.to_string());
        Ok(self.secrets.pop_front().unwrap_or_default())
    }

    fn notify(&mut self, message: &str) {
        self.notices.push(message.to_string());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scripted_prompter_replays_in_order() {
        let mut prompter = ScriptedPrompter::new().answer("one").answer("two").secret("pw");
        assert_eq!(prompter.ask("A").unwrap(), "one");
        assert_eq!(prompter.ask_secret("P").unwrap(), "pw");
        assert_eq!(prompter.ask("B").unwrap(), "two");
        assert_eq!(prompter.ask("C").unwrap(), "");
        assert_eq!(prompter.asked, vec!["A", "B", "C"]);
        assert_eq!(prompter.asked_secret, vec!["P"]);
    }
}
