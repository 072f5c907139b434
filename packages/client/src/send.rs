//! Send loop: forwards local input lines in the order they were read.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::{
    connection::Connection,
    domain::{InputLine, LoopExit},
    state::SessionState,
};

/// Run until the quit sentinel, the end of input, a failed send, or the
/// session leaving `Open`.
///
/// Lines that become ready while the session is not `Open` are discarded.
pub async fn run_send_loop(
    connection: Arc<dyn Connection>,
    mut input: mpsc::UnboundedReceiver<InputLine>,
    state: watch::Receiver<SessionState>,
) -> LoopExit {
    let mut stop = state.clone();

    loop {
        let line = tokio::select! {
            line = input.recv() => line,
            _ = stop.wait_for(|state| !state.is_open()) => return LoopExit::Cancelled,
        };

        let message = match line {
            None => return LoopExit::InputClosed,
            Some(InputLine::Quit) => return LoopExit::Quit,
            Some(InputLine::Text(message)) => message,
        };
        let open = state.borrow().is_open();
        if !open {
            tracing::debug!("Discarding input while not open");
            continue;
        }

        if let Err(e) = connection.send(message).await {
            if !connection.is_open() {
                // The channel was already closed from the receive side, which
                // reports why; wait for the session to leave Open.
                tracing::debug!("Send raced with close: {}", e);
                let _ = stop.wait_for(|state| !state.is_open()).await;
                return LoopExit::Cancelled;
            }
            tracing::debug!("Failed to send message: {}", e);
            return LoopExit::Failed(e);
        }
    }
}
