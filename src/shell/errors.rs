//! Error types for the command shell
//!
//! Queue-level failures are not errors here: they are reported in the session
//! output and counted. [`ShellError`] covers what stops a command from being
//! understood at all, and history bookkeeping.

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShellError {
    #[error("line {line}: unknown command '{name}'")]
    UnknownCommand { name: String, line: usize },

    #[error("line {line}: usage: {usage}")]
    BadArguments { usage: &'static str, line: usize },

    #[error("line {line}: unterminated quoted string")]
    UnterminatedQuote { line: usize },

    #[error("history: {message}")]
    History { message: String },
}

impl ShellError {
    /// Script line the error refers to, when there is one
    pub fn line(&self) -> Option<usize> {
        match self {
            ShellError::UnknownCommand { line, .. } => Some(*line),
            ShellError::BadArguments { line, .. } => Some(*line),
            ShellError::UnterminatedQuote { line } => Some(*line),
            ShellError::History { .. } => None,
        }
    }
}
