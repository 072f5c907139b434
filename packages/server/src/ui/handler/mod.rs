//! Request handlers.

pub mod http;
pub mod websocket;

pub use http::{get_counts, health_check, hello};
pub use websocket::socket_handler;
