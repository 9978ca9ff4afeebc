//! Command intake: bounds checking for free-text editing instructions.

use serde::Serialize;

use crate::error::CoreError;

/// Maximum command length in characters, measured after trimming.
pub const MAX_COMMAND_CHARS: usize = 1000;

/// A trimmed, length-checked editing instruction.
///
/// Only [`validate_command`] constructs one, so holding a `Command` means the
/// text is non-empty and within [`MAX_COMMAND_CHARS`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct Command(String);

impl Command {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl AsRef<str> for Command {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Command {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Validate a raw command string.
///
/// Rejects input that is empty after trimming or longer than
/// [`MAX_COMMAND_CHARS`] characters.
pub fn validate_command(raw: &str) -> Result<Command, CoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(CoreError::Validation("Please enter a command".to_string()));
    }
    let len = trimmed.chars().count();
    if len > MAX_COMMAND_CHARS {
        return Err(CoreError::Validation(format!(
            "Command is too long ({len} characters, max {MAX_COMMAND_CHARS})"
        )));
    }
    Ok(Command(trimmed.to_string()))
}
