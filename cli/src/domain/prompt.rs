//! Elevated-privilege password prompt detection.
//!
//! Prompt text depends on locale and sudoers configuration, so the pattern
//! is configurable (`ssh.sudo_prompt`) rather than fixed.

use anyhow::{Context, Result};
use regex::Regex;

/// Default pattern: `[sudo] password for <user>:` at the start of a line.
pub const DEFAULT_SUDO_PROMPT: &str = r"(?m)^\[sudo\] password for [^:\n]*:";

/// Decides whether a chunk of remote output is asking for a password.
pub trait PromptMatcher: Send + Sync {
    fn is_password_prompt(&self, chunk: &str) -> bool;
}

/// Regex-backed [`PromptMatcher`].
#[derive(Debug, Clone)]
pub struct RegexPromptMatcher {
    pattern: Regex,
}

impl RegexPromptMatcher {
    /// Compile `pattern` into a matcher.
    ///
    /// # Errors
    ///
    /// Returns an error if `pattern` is not a valid regular expression.
    pub fn new(pattern: &str) -> Result<Self> {
        let pattern =
            Regex::new(pattern).with_context(|| format!("invalid sudo prompt pattern {pattern:?}"))?;
        Ok(Self { pattern })
    }
}

impl Default for RegexPromptMatcher {
    fn default() -> Self {
        #[allow(clippy::expect_used)]
        Self::new(DEFAULT_SUDO_PROMPT).expect("valid regex")
    }
}

impl PromptMatcher for RegexPromptMatcher {
    fn is_password_prompt(&self, chunk: &str) -> bool {
        self.pattern.is_match(chunk)
    }
}
