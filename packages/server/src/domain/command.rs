//! Text commands understood by the socket endpoint.

use thiserror::Error;

const INCREMENT_PREFIX: &str = "increment:";

/// A command carried in a text frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    /// `increment:<id>`
    Increment(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CommandError {
    #[error("Invalid target id '{0}'")]
    InvalidTarget(String),
}

impl Command {
    /// Parse a text frame.
    ///
    /// Returns `Ok(None)` for plain text that is not a command.
    pub fn parse(text: &str) -> Result<Option<Self>, CommandError> {
        let Some(target) = text.strip_prefix(INCREMENT_PREFIX) else {
            return Ok(None);
        };

        target
            .parse::<i64>()
            .map(|id| Some(Self::Increment(id)))
            .map_err(|_| CommandError::InvalidTarget(target.to_string()))
    }
}
