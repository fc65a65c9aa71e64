//! Domain collection.

use crate::error::{BlockerError, Result};
use std::collections::VecDeque;

/// Prompt text shown for each domain.
pub const PROMPT: &str = "Enter website to block (or press Enter to finish)";

/// A source of domain names, asked one at a time.
pub trait DomainPrompt {
    /// Returns the next raw answer, or `None` once the source is exhausted.
    ///
    /// # Errors
    ///
    /// Returns [`BlockerError::Prompt`] if the input cannot be read.
    fn next_domain(&mut self) -> Result<Option<String>>;
}

/// Interactive terminal prompt.
pub struct TerminalPrompt {
    theme: dialoguer::theme::ColorfulTheme,
}

impl TerminalPrompt {
    #[must_use]
    pub fn new() -> Self {
        Self {
            theme: dialoguer::theme::ColorfulTheme::default(),
        }
    }
}

impl Default for TerminalPrompt {
    fn default() -> Self {
        Self::new()
    }
}

impl DomainPrompt for TerminalPrompt {
    fn next_domain(&mut self) -> Result<Option<String>> {
        let answer: String = dialoguer::Input::with_theme(&self.theme)
            .with_prompt(PROMPT)
            .allow_empty(true)
            .interact_text()
            .map_err(|e| BlockerError::Prompt(e.to_string()))?;
        Ok(Some(answer))
    }
}

/// Domains known up front, e.g. from the command line.
#[derive(Debug, Default)]
pub struct PresetDomains(VecDeque<String>);

impl PresetDomains {
    #[must_use]
    pub fn new<S: Into<String>>(domains: impl IntoIterator<Item = S>) -> Self {
        Self(domains.into_iter().map(Into::into).collect())
    }
}

impl DomainPrompt for PresetDomains {
    fn next_domain(&mut self) -> Result<Option<String>> {
        Ok(self.0.pop_front())
    }
}

/// Asks `prompt` until it gives an empty answer or runs out.
///
/// Answers are trimmed; a whitespace-only answer ends collection.
///
/// # Errors
///
/// Propagates prompt failures.
pub fn collect_domains(prompt: &mut dyn DomainPrompt) -> Result<Vec<String>> {
    let mut domains = Vec::new();
    while let Some(answer) = prompt.next_domain()? {
        let domain = answer.trim();
        if domain.is_empty() {
            break;
        }
        domains.push(domain.to_string());
    }
    tracing::debug!(count = domains.len(), "Collected domains");
    Ok(domains)
}
