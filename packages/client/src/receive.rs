//! Receive loop: renders inbound messages in arrival order.

use std::sync::Arc;

use tokio::sync::watch;

use crate::{
    connection::{Connection, Inbound},
    console::Console,
    domain::LoopExit,
    state::SessionState,
};

/// Run until the channel closes or a receive fails.
///
/// Messages that arrive after the session left `Open` are dropped.
pub async fn run_receive_loop(
    connection: Arc<dyn Connection>,
    console: Arc<dyn Console>,
    state: watch::Receiver<SessionState>,
) -> LoopExit {
    loop {
        match connection.receive().await {
            Ok(Inbound::Message(message)) => {
                if state.borrow().is_open() {
                    console.message(&message);
                } else {
                    tracing::debug!("Dropping message received while not open");
                }
            }
            Ok(Inbound::Closed) => return LoopExit::RemoteClosed,
            Err(e) => return LoopExit::Failed(e),
        }
    }
}
