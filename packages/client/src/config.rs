//! Client configuration.

/// Default WebSocket endpoint of the companion server.
pub const DEFAULT_URL: &str = "ws://localhost:8080/socket";

/// Input line that ends the session locally.
pub const DEFAULT_QUIT_SENTINEL: &str = "q";

/// Prompt shown while waiting for a line of input, naming the quit sentinel.
pub fn prompt_for(quit_sentinel: &str) -> String {
    format!("Enter message (or '{}' to quit): ", quit_sentinel)
}

/// Settings for one console session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// WebSocket URI to connect to
    pub url: String,
    /// Line that ends the session; compared exactly, without trimming
    pub quit_sentinel: String,
    /// Prompt displayed by the terminal reader
    pub prompt: String,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            url: DEFAULT_URL.to_string(),
            quit_sentinel: DEFAULT_QUIT_SENTINEL.to_string(),
            prompt: prompt_for(DEFAULT_QUIT_SENTINEL),
        }
    }
}

impl ClientConfig {
    /// Create a configuration for the given endpoint with default sentinel and prompt
    pub fn new(url: impl Into<String>) -> Self {
        Self {
            url: url.into(),
            ..Self::default()
        }
    }

    /// Replace the quit sentinel; the prompt follows it
    pub fn with_quit_sentinel(mut self, quit_sentinel: impl Into<String>) -> Self {
        self.quit_sentinel = quit_sentinel.into();
        self.prompt = prompt_for(&self.quit_sentinel);
        self
    }
}
