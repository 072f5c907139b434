//! Utilities shared by the sockline client and server binaries.

pub mod logger;
