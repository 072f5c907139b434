//! Message formatting utilities for client display.

use crate::{domain::Message, domain::StatusLine, error::ClientError};

/// Message formatter for client display
pub struct MessageFormatter;

impl MessageFormatter {
    /// Format a message received from the endpoint
    pub fn format_received(message: &Message) -> String {
        format!("Received message: {}", message.as_str())
    }

    /// Format a session status line
    pub fn format_status(status: StatusLine) -> String {
        match status {
            StatusLine::Opened => "WebSocket connection opened".to_string(),
            StatusLine::Closed => "WebSocket connection closed".to_string(),
        }
    }

    /// Format an error that ended the session
    pub fn format_error(error: &ClientError) -> String {
        format!("WebSocket error: {}", error)
    }
}
