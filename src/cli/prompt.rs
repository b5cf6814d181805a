//! Confirmation prompt abstraction.
//!
//! Mutating commands gate on a yes/no prompt. The trait keeps the
//! orchestration testable: tests substitute [`AutoConfirm`] instead of
//! driving a live terminal.

use dialoguer::Confirm;

use crate::error::{Error, Result};

/// A synchronous yes/no confirmation capability.
pub trait ConfirmPrompt {
    /// Ask the operator; `default` is used on plain Enter.
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool>;
}

/// Interactive terminal prompt.
pub struct TerminalPrompt;

impl ConfirmPrompt for TerminalPrompt {
    fn confirm(&self, prompt: &str, default: bool) -> Result<bool> {
        Confirm::new()
            .with_prompt(prompt)
            .default(default)
            .interact()
            .map_err(|e| Error::Other(format!("prompt failed: {e}")))
    }
}

/// Fixed answer, for `--yes` and for tests.
pub struct AutoConfirm(pub bool);

impl ConfirmPrompt for AutoConfirm {
    fn confirm(&self, _prompt: &str, _default: bool) -> Result<bool> {
        Ok(self.0)
    }
}
