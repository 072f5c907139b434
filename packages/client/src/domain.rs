//! Domain types for the console session.
//!
//! This module contains plain values and pure functions without side effects,
//! making them easy to test.

use std::fmt;

use crate::{error::ClientError, state::SessionEvent};

/// An immutable text payload exchanged with the endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message(String);

impl Message {
    pub fn new(text: impl Into<String>) -> Self {
        Self(text.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A line read from the terminal, classified against the quit sentinel.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputLine {
    /// The quit sentinel was entered
    Quit,
    /// Any other line, to be forwarded as-is
    Text(Message),
}

impl InputLine {
    /// Classify a raw line.
    ///
    /// Matching is exact: no trimming and case-sensitive, so `" q"` or `"Q"` are sent.
    pub fn classify(line: String, quit_sentinel: &str) -> Self {
        if line == quit_sentinel {
            Self::Quit
        } else {
            Self::Text(Message::new(line))
        }
    }

    pub fn is_quit(&self) -> bool {
        matches!(self, Self::Quit)
    }
}

/// Status lines announced on the console
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusLine {
    Opened,
    Closed,
}

/// Why a send or receive loop stopped
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoopExit {
    /// The quit sentinel was entered
    Quit,
    /// Local input ended (EOF, Ctrl+C or a read error)
    InputClosed,
    /// The peer closed the channel
    RemoteClosed,
    /// The session left `Open` while the loop was waiting
    Cancelled,
    Failed(ClientError),
}

impl LoopExit {
    /// The lifecycle event this exit signals, plus the error to report if any
    pub fn into_event(self) -> (SessionEvent, Option<ClientError>) {
        match self {
            Self::Quit | Self::InputClosed | Self::Cancelled => (SessionEvent::QuitRequested, None),
            Self::RemoteClosed => (SessionEvent::RemoteClosed, None),
            Self::Failed(error) => (SessionEvent::Failed, Some(error)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_quit_sentinel() {
        // テスト項目: 終了コマンドと完全一致する行は Quit と判定される
        // given (前提条件):
        let line = "q".to_string();

        // when (操作):
        let result = InputLine::classify(line, "q");

        // then (期待する結果):
        assert_eq!(result, InputLine::Quit);
        assert!(result.is_quit());
    }

    #[test]
    fn test_classify_is_exact_match() {
        // テスト項目: 前後の空白や大文字は終了コマンドとみなされない
        // given (前提条件):
        let lines = [" q", "q ", "Q", "quit", ""];

        // when (操作):
        let results: Vec<InputLine> = lines
            .iter()
            .map(|line| InputLine::classify(line.to_string(), "q"))
            .collect();

        // then (期待する結果):
        for (line, result) in lines.iter().zip(results) {
            assert_eq!(result, InputLine::Text(Message::new(*line)));
        }
    }

    #[test]
    fn test_loop_exit_failure_carries_error() {
        // テスト項目: 失敗による終了はエラーと Failed イベントに変換される
        // given (前提条件):
        let exit = LoopExit::Failed(ClientError::Send("broken pipe".to_string()));

        // when (操作):
        let (event, error) = exit.into_event();

        // then (期待する結果):
        assert_eq!(event, SessionEvent::Failed);
        assert_eq!(error, Some(ClientError::Send("broken pipe".to_string())));
    }

    #[test]
    fn test_loop_exit_local_endings_request_quit() {
        // テスト項目: 終了コマンド・入力終了はエラーなしの終了要求になる
        // given (前提条件):
        let exits = [LoopExit::Quit, LoopExit::InputClosed, LoopExit::Cancelled];

        for exit in exits {
            // when (操作):
            let (event, error) = exit.into_event();

            // then (期待する結果):
            assert_eq!(event, SessionEvent::QuitRequested);
            assert!(error.is_none());
        }
    }

    #[test]
    fn test_message_display_is_raw_text() {
        // テスト項目: Message の表示は本文そのもの
        // given (前提条件):
        let message = Message::new("hello");

        // when (操作):
        let displayed = message.to_string();

        // then (期待する結果):
        assert_eq!(displayed, "hello");
        assert_eq!(message.into_inner(), "hello");
    }
}
