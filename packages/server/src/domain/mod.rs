//! Domain layer: counter state and the text commands that drive it.

pub mod command;
pub mod counter;

pub use command::{Command, CommandError};
pub use counter::{CountEntry, Counter};
