//! Duplex connection to the remote endpoint.
//!
//! The session only talks to the [`Connection`] and [`Connector`] traits;
//! [`WebSocketConnection`] is the tokio-tungstenite implementation.

use std::sync::Arc;

use async_trait::async_trait;
use futures_util::{
    SinkExt, StreamExt,
    stream::{SplitSink, SplitStream},
};
use tokio::{
    net::TcpStream,
    sync::{Mutex, watch},
};
use tokio_tungstenite::{
    MaybeTlsStream, WebSocketStream, connect_async,
    tungstenite::{self, protocol::Message as Frame},
};

use crate::{domain::Message, error::ClientError};

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// What a call to [`Connection::receive`] produced
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Inbound {
    Message(Message),
    /// The channel is closed, either by the peer or by a local `close()`
    Closed,
}

/// One open duplex session.
///
/// `send` and `receive` may run concurrently from different tasks.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Connection: Send + Sync {
    /// Whether `close()` has not been called and the peer has not closed
    fn is_open(&self) -> bool;

    /// Send one text message. Fails with [`ClientError::Send`] once closed.
    async fn send(&self, message: Message) -> Result<(), ClientError>;

    /// Wait for the next message or for the channel to close.
    async fn receive(&self) -> Result<Inbound, ClientError>;

    /// Close the channel. Calling it again, or after the peer closed, does nothing.
    async fn close(&self);
}

/// Establishes connections
#[async_trait]
pub trait Connector: Send + Sync {
    async fn open(&self, uri: &str) -> Result<Arc<dyn Connection>, ClientError>;
}

/// Connector performing a WebSocket handshake
#[derive(Debug, Clone, Copy, Default)]
pub struct WebSocketConnector;

#[async_trait]
impl Connector for WebSocketConnector {
    async fn open(&self, uri: &str) -> Result<Arc<dyn Connection>, ClientError> {
        let (ws_stream, response) = connect_async(uri)
            .await
            .map_err(|e| ClientError::Connect(e.to_string()))?;

        tracing::info!(
            "Connected to {} (HTTP {})",
            uri,
            response.status().as_u16()
        );

        let connection: Arc<dyn Connection> = Arc::new(WebSocketConnection::new(ws_stream));
        Ok(connection)
    }
}

/// WebSocket connection split into independently locked halves
pub struct WebSocketConnection {
    write: Mutex<SplitSink<WsStream, Frame>>,
    read: Mutex<SplitStream<WsStream>>,
    /// `true` once the channel is closed from either side
    closed: watch::Sender<bool>,
}

impl WebSocketConnection {
    pub fn new(ws_stream: WsStream) -> Self {
        let (write, read) = ws_stream.split();
        let (closed, _) = watch::channel(false);

        Self {
            write: Mutex::new(write),
            read: Mutex::new(read),
            closed,
        }
    }

    fn mark_closed(&self) {
        self.closed.send_replace(true);
    }
}

#[async_trait]
impl Connection for WebSocketConnection {
    fn is_open(&self) -> bool {
        !*self.closed.borrow()
    }

    async fn send(&self, message: Message) -> Result<(), ClientError> {
        if !self.is_open() {
            return Err(ClientError::Send("connection is not open".to_string()));
        }

        let mut write = self.write.lock().await;
        write
            .send(Frame::Text(message.into_inner().into()))
            .await
            .map_err(|e| ClientError::Send(e.to_string()))
    }

    async fn receive(&self) -> Result<Inbound, ClientError> {
        let mut closed = self.closed.subscribe();
        let mut read = self.read.lock().await;

        loop {
            tokio::select! {
                biased;

                _ = closed.wait_for(|closed| *closed) => return Ok(Inbound::Closed),
                frame = read.next() => match frame {
                    Some(Ok(Frame::Text(text))) => {
                        return Ok(Inbound::Message(Message::new(text.as_str())));
                    }
                    Some(Ok(Frame::Binary(data))) => {
                        tracing::debug!("Ignoring {} bytes of binary data", data.len());
                    }
                    Some(Ok(Frame::Close(frame))) => {
                        tracing::info!("Server closed the connection: {:?}", frame);
                        self.mark_closed();
                        return Ok(Inbound::Closed);
                    }
                    // ping/pong are answered by tungstenite
                    Some(Ok(_)) => {}
                    Some(Err(
                        tungstenite::Error::ConnectionClosed | tungstenite::Error::AlreadyClosed,
                    ))
                    | None => {
                        self.mark_closed();
                        return Ok(Inbound::Closed);
                    }
                    Some(Err(e)) => {
                        tracing::debug!("WebSocket read error: {}", e);
                        self.mark_closed();
                        return Err(ClientError::Connection(e.to_string()));
                    }
                },
            }
        }
    }

    async fn close(&self) {
        if self.closed.send_replace(true) {
            tracing::debug!("Connection already closed");
            return;
        }

        let mut write = self.write.lock().await;
        if let Err(e) = write.send(Frame::Close(None)).await {
            tracing::debug!("Failed to send close frame: {}", e);
        }
        if let Err(e) = write.close().await {
            tracing::debug!("Failed to close WebSocket sink: {}", e);
        }
    }
}
