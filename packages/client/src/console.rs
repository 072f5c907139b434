//! Console output surface.

use std::io::Write;

use crate::{
    domain::{Message, StatusLine},
    error::ClientError,
    formatter::MessageFormatter,
};

/// Where the session renders messages, status lines and errors
pub trait Console: Send + Sync {
    fn message(&self, message: &Message);
    fn status(&self, status: StatusLine);
    fn error(&self, error: &ClientError);
}

/// Console writing to standard output
#[derive(Debug, Clone, Default)]
pub struct StdoutConsole {
    /// Prompt to redisplay after an inbound message interrupts the input line
    prompt: Option<String>,
}

impl StdoutConsole {
    pub fn with_prompt(prompt: impl Into<String>) -> Self {
        Self {
            prompt: Some(prompt.into()),
        }
    }
}

impl Console for StdoutConsole {
    fn message(&self, message: &Message) {
        println!("\n{}", MessageFormatter::format_received(message));
        if let Some(prompt) = &self.prompt {
            redisplay_prompt(prompt);
        }
    }

    fn status(&self, status: StatusLine) {
        println!("{}", MessageFormatter::format_status(status));
    }

    fn error(&self, error: &ClientError) {
        println!("{}", MessageFormatter::format_error(error));
    }
}

/// Redisplay the prompt after receiving a message
pub fn redisplay_prompt(prompt: &str) {
    print!("{}", prompt);
    std::io::stdout().flush().ok();
}
