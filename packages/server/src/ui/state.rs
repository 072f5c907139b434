//! Shared application state.

use tokio::sync::Mutex;

use crate::{domain::Counter, infrastructure::ConnectionManager};

/// State shared by every handler
#[derive(Debug, Default)]
pub struct AppState {
    /// Connected sockets
    pub connections: ConnectionManager,
    /// Per-target counters
    pub counter: Mutex<Counter>,
    /// Echo plain text frames back to their sender
    pub echo: bool,
}

impl AppState {
    pub fn new(echo: bool) -> Self {
        Self {
            echo,
            ..Self::default()
        }
    }
}
