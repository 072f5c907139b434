//! Local line input.
//!
//! Terminal reads block, so they run on a dedicated OS thread that forwards
//! classified lines to the async side over an unbounded channel. When the
//! session ends while the thread is blocked in a read, the thread is simply
//! abandoned.

use rustyline::{DefaultEditor, error::ReadlineError};
use tokio::sync::mpsc;

use crate::{domain::InputLine, error::ClientError};

/// A blocking source of input lines
pub trait LineSource {
    /// Read the next line without its line terminator.
    ///
    /// Returns `Ok(None)` once the input has ended.
    fn read_line(&mut self) -> Result<Option<String>, ClientError>;
}

/// Interactive terminal input backed by rustyline
pub struct ReadlineSource {
    editor: DefaultEditor,
    prompt: String,
}

impl ReadlineSource {
    pub fn new(prompt: impl Into<String>) -> Result<Self, ClientError> {
        let editor = DefaultEditor::new()
            .map_err(|e| ClientError::Input(format!("failed to initialize readline: {}", e)))?;

        Ok(Self {
            editor,
            prompt: prompt.into(),
        })
    }
}

impl LineSource for ReadlineSource {
    fn read_line(&mut self) -> Result<Option<String>, ClientError> {
        match self.editor.readline(&self.prompt) {
            Ok(line) => {
                if !line.is_empty() {
                    self.editor.add_history_entry(line.as_str()).ok();
                }
                Ok(Some(line))
            }
            Err(ReadlineError::Interrupted) => {
                // Ctrl+C
                tracing::info!("Interrupted");
                Ok(None)
            }
            Err(ReadlineError::Eof) => {
                // Ctrl+D
                tracing::info!("EOF");
                Ok(None)
            }
            Err(err) => Err(ClientError::Input(err.to_string())),
        }
    }
}

/// Spawn the input thread, forwarding classified lines into `input_tx`.
///
/// The source is built on the input thread itself. The thread stops after
/// forwarding the quit sentinel, at end of input, on a read error, or when the
/// receiving side has been dropped. In every case the channel closes, which
/// the send loop treats as a quit request.
pub fn spawn_input_reader<F, S>(
    make_source: F,
    quit_sentinel: String,
    input_tx: mpsc::UnboundedSender<InputLine>,
) -> Result<(), ClientError>
where
    F: FnOnce() -> Result<S, ClientError> + Send + 'static,
    S: LineSource,
{
    std::thread::Builder::new()
        .name("console-input".to_string())
        .spawn(move || {
            let mut source = match make_source() {
                Ok(source) => source,
                Err(e) => {
                    tracing::error!("{}", e);
                    return;
                }
            };

            loop {
                match source.read_line() {
                    Ok(Some(line)) => {
                        let input = InputLine::classify(line, &quit_sentinel);
                        let quit = input.is_quit();
                        if input_tx.send(input).is_err() || quit {
                            break;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        tracing::error!("Readline error: {}", e);
                        break;
                    }
                }
            }
        })
        .map_err(|e| ClientError::Input(format!("failed to spawn input thread: {}", e)))?;

    Ok(())
}
