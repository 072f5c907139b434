//! UI layer: HTTP routes, WebSocket handling, and server lifecycle.

pub mod handler;
mod server;
mod signal;
mod state;

pub use server::Server;
pub use signal::shutdown_signal;
pub use state::AppState;
