//! Client execution logic.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};

use crate::{
    config::ClientConfig,
    connection::WebSocketConnector,
    console::StdoutConsole,
    domain::InputLine,
    error::ClientError,
    input::{ReadlineSource, spawn_input_reader},
    session::SessionController,
    state::SessionState,
};

/// Run one interactive session against `config.url` on the terminal.
///
/// There is no reconnection: the session ends for good on quit, remote close
/// or the first error.
pub async fn run_client(config: ClientConfig) -> Result<(), ClientError> {
    let console = Arc::new(StdoutConsole::with_prompt(config.prompt.clone()));
    let controller = SessionController::new(Arc::new(WebSocketConnector), console, &config.url);

    let (input_tx, input_rx) = mpsc::unbounded_channel();
    tokio::spawn(start_input_when_open(
        controller.watch_state(),
        config.prompt,
        config.quit_sentinel,
        input_tx,
    ));

    let result = controller.run(input_rx).await;
    tracing::info!("Client session ended in state {:?}", controller.state());

    result
}

/// Start reading the terminal once the handshake has succeeded, so the prompt
/// follows the "opened" status line. If the terminal cannot be set up,
/// `input_tx` is dropped and the session ends as if input had closed.
async fn start_input_when_open(
    mut state: watch::Receiver<SessionState>,
    prompt: String,
    quit_sentinel: String,
    input_tx: mpsc::UnboundedSender<InputLine>,
) {
    let opened = state
        .wait_for(|state| *state != SessionState::Connecting)
        .await
        .map(|state| state.is_open())
        .unwrap_or(false);
    if !opened {
        return;
    }

    if let Err(e) = spawn_input_reader(
        move || ReadlineSource::new(prompt),
        quit_sentinel,
        input_tx,
    ) {
        tracing::error!("{}", e);
    }
}
