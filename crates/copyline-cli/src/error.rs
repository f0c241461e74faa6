//! CLI error classification and exit codes.

use std::fmt::{self, Display, Formatter};

/// Errors surfaced to the user by the CLI.
#[derive(Debug)]
pub(crate) enum CliError {
    Validation(String),
    Failure(anyhow::Error),
}

/// Convenience alias for functions returning a `CliError`.
pub(crate) type CliResult<T> = Result<T, CliError>;

impl CliError {
    pub(crate) fn validation(message: impl Into<String>) -> Self {
        Self::Validation(message.into())
    }

    pub(crate) fn failure(error: impl Into<anyhow::Error>) -> Self {
        Self::Failure(error.into())
    }

    pub(crate) const fn exit_code(&self) -> i32 {
        match self {
            Self::Validation(_) => 2,
            Self::Failure(_) => 3,
        }
    }

    pub(crate) fn display_message(&self) -> String {
        match self {
            Self::Validation(message) => message.clone(),
            Self::Failure(error) => format!("{error:#}"),
        }
    }
}

impl Display for CliError {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> fmt::Result {
        formatter.write_str("cli error")
    }
}

impl std::error::Error for CliError {}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::{Context, anyhow};

    #[test]
    fn exit_codes_distinguish_validation_and_failure() {
        assert_eq!(CliError::validation("bad").exit_code(), 2);
        assert_eq!(CliError::failure(anyhow!("io")).exit_code(), 3);
    }

    #[test]
    fn failure_message_includes_context_chain() {
        let err: anyhow::Result<()> =
            Err::<(), _>(anyhow!("broken pipe")).context("failed to read stdin");
        let message = err
            .map_err(CliError::failure)
            .err()
            .map(|err| err.display_message());
        assert_eq!(
            message.as_deref(),
            Some("failed to read stdin: broken pipe")
        );
        assert_eq!(CliError::validation("bad").to_string(), "cli error");
    }
}
