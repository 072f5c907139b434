//! Session state machine.
//!
//! Each connection event is a named transition: given the current state and an
//! event, [`transition`] returns the next state and the side effects the
//! controller has to perform. The function itself performs none of them.

use crate::domain::StatusLine;

/// Lifecycle of one console session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Handshake in progress
    Connecting,
    /// Messages may be sent and delivered
    Open,
    /// Shutdown requested, channel not yet released
    Closing,
    /// Terminal state
    Closed,
}

impl SessionState {
    pub fn is_open(self) -> bool {
        matches!(self, Self::Open)
    }
}

/// Something that happened to the session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    HandshakeSucceeded,
    HandshakeFailed,
    /// Quit sentinel entered, or local input ended
    QuitRequested,
    /// The peer closed the channel
    RemoteClosed,
    /// A send or receive failed
    Failed,
    /// The connection has been closed and both loops have stopped
    ChannelReleased,
}

/// Side effect requested by a transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Effect {
    Announce(StatusLine),
    CloseConnection,
}

/// Result of applying an event to a state
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub next: SessionState,
    pub effects: Vec<Effect>,
}

impl Transition {
    fn to(next: SessionState, effects: Vec<Effect>) -> Self {
        Self { next, effects }
    }

    fn stay(state: SessionState) -> Self {
        Self::to(state, Vec::new())
    }

    pub fn closes_connection(&self) -> bool {
        self.effects.contains(&Effect::CloseConnection)
    }
}

/// Compute the next state for `event`.
///
/// Events that do not apply to `state` leave it unchanged without effects;
/// `Closed` absorbs everything.
pub fn transition(state: SessionState, event: SessionEvent) -> Transition {
    use SessionEvent::*;
    use SessionState::*;

    match (state, event) {
        (Connecting, HandshakeSucceeded) => {
            Transition::to(Open, vec![Effect::Announce(StatusLine::Opened)])
        }
        (Connecting, HandshakeFailed) => Transition::to(Closed, Vec::new()),
        (Open, QuitRequested | RemoteClosed | Failed) => {
            Transition::to(Closing, vec![Effect::CloseConnection])
        }
        (Closing, ChannelReleased) => {
            Transition::to(Closed, vec![Effect::Announce(StatusLine::Closed)])
        }
        (state, _) => Transition::stay(state),
    }
}
