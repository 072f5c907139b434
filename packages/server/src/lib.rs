//! Companion WebSocket server for the sockline console client.
//!
//! Serves a single `/socket` endpoint. Text frames of the form
//! `increment:<id>` bump an in-memory counter and broadcast the new counts to
//! every connected socket; other text can optionally be echoed back.

// layers
pub mod domain;
pub mod infrastructure;
pub mod ui;
