//! Interactive console client for a single WebSocket endpoint.
//!
//! Lines typed at the prompt are sent as text messages, incoming messages are
//! printed as they arrive, and the session ends when the quit sentinel is
//! entered, the server closes the connection, or an error occurs.

pub mod config;
pub mod connection;
pub mod console;
pub mod domain;
pub mod error;
pub mod formatter;
pub mod input;
pub mod receive;
pub mod runner;
pub mod send;
pub mod session;
pub mod state;

pub use config::ClientConfig;
pub use error::ClientError;
pub use runner::run_client;
pub use session::SessionController;
