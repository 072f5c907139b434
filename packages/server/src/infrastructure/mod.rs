//! Infrastructure layer: delivery of outbound frames to connected sockets.

pub mod connection_manager;

pub use connection_manager::{ConnectionId, ConnectionManager, PusherChannel};
