//! Session lifecycle: connect, run both loops, shut down once.

use std::sync::{
    Arc,
    atomic::{AtomicBool, Ordering},
};

use tokio::{
    sync::{mpsc, watch},
    task::JoinHandle,
};

use crate::{
    connection::{Connection, Connector},
    console::Console,
    domain::{InputLine, LoopExit},
    error::ClientError,
    receive::run_receive_loop,
    send::run_send_loop,
    state::{Effect, SessionEvent, SessionState, transition},
};

/// Owns the session state and the connection for one console session
pub struct SessionController {
    connector: Arc<dyn Connector>,
    console: Arc<dyn Console>,
    url: String,
    state: watch::Sender<SessionState>,
    /// Set by the first `run`; a session opens at most one connection
    started: AtomicBool,
}

impl SessionController {
    pub fn new(
        connector: Arc<dyn Connector>,
        console: Arc<dyn Console>,
        url: impl Into<String>,
    ) -> Self {
        let (state, _) = watch::channel(SessionState::Connecting);

        Self {
            connector,
            console,
            url: url.into(),
            state,
            started: AtomicBool::new(false),
        }
    }

    pub fn state(&self) -> SessionState {
        *self.state.borrow()
    }

    /// Subscribe to state changes
    pub fn watch_state(&self) -> watch::Receiver<SessionState> {
        self.state.subscribe()
    }

    /// Run the session to completion.
    ///
    /// Returns the error that ended the session, if any. The state is `Closed`
    /// when this returns, whatever the outcome. A controller runs once: later
    /// calls fail with [`ClientError::Connect`] without opening a connection.
    pub async fn run(
        &self,
        input: mpsc::UnboundedReceiver<InputLine>,
    ) -> Result<(), ClientError> {
        if self.started.swap(true, Ordering::SeqCst) {
            tracing::debug!("Session already ran in state {:?}", self.state());
            return Err(ClientError::Connect(
                "session has already been started".to_string(),
            ));
        }

        tracing::info!("Connecting to {}", self.url);

        let connection = match self.connector.open(&self.url).await {
            Ok(connection) => connection,
            Err(e) => {
                self.apply(SessionEvent::HandshakeFailed);
                self.console.error(&e);
                return Err(e);
            }
        };
        self.apply(SessionEvent::HandshakeSucceeded);

        let mut receive_task = tokio::spawn(run_receive_loop(
            connection.clone(),
            self.console.clone(),
            self.watch_state(),
        ));
        let mut send_task = tokio::spawn(run_send_loop(
            connection.clone(),
            input,
            self.watch_state(),
        ));

        // Whichever loop stops first decides why the session ends
        let (exit, other) = tokio::select! {
            exit = &mut receive_task => (join_exit("receive", exit), send_task),
            exit = &mut send_task => (join_exit("send", exit), receive_task),
        };
        tracing::debug!("Loop stopped: {:?}", exit);

        let (event, error) = exit.into_event();
        self.apply(event);
        if let Some(e) = &error {
            self.console.error(e);
        }
        self.release(&connection, other).await;

        match error {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Close the connection, wait for the remaining loop, and reach `Closed`
    async fn release(
        &self,
        connection: &Arc<dyn Connection>,
        other: JoinHandle<LoopExit>,
    ) {
        // close() is idempotent, so this is safe after a peer close too
        connection.close().await;

        // Closing unblocks receive(); the send loop observes the state change
        match other.await {
            Ok(exit) => tracing::debug!("Remaining loop stopped: {:?}", exit),
            Err(e) => tracing::warn!("Remaining loop did not stop cleanly: {}", e),
        }

        self.apply(SessionEvent::ChannelReleased);
    }

    /// Apply an event, publish the new state and announce status lines
    fn apply(&self, event: SessionEvent) {
        let current = self.state();
        let result = transition(current, event);
        self.state.send_replace(result.next);

        tracing::debug!("{:?} --{:?}--> {:?}", current, event, result.next);

        for effect in &result.effects {
            if let Effect::Announce(status) = effect {
                self.console.status(*status);
            }
        }
    }
}

fn join_exit(name: &str, result: Result<LoopExit, tokio::task::JoinError>) -> LoopExit {
    result.unwrap_or_else(|e| {
        tracing::error!("{} loop panicked: {}", name, e);
        LoopExit::Failed(ClientError::Connection(format!("{} loop aborted", name)))
    })
}

#[cfg(test)]
mod tests {
    use std::{
        sync::{Mutex, atomic::AtomicUsize},
        time::Duration,
    };

    use async_trait::async_trait;
    use tokio::sync::Notify;

    use super::*;
    use crate::{
        connection::Inbound,
        domain::{Message, StatusLine},
        formatter::MessageFormatter,
    };

    #[derive(Default)]
    struct RecordingConsole {
        lines: Mutex<Vec<String>>,
    }

    impl RecordingConsole {
        fn lines(&self) -> Vec<String> {
            self.lines.lock().unwrap().clone()
        }

        fn count(&self, line: &str) -> usize {
            self.lines().iter().filter(|l| *l == line).count()
        }
    }

    impl Console for RecordingConsole {
        fn message(&self, message: &Message) {
            self.lines
                .lock()
                .unwrap()
                .push(MessageFormatter::format_received(message));
        }

        fn status(&self, status: StatusLine) {
            self.lines
                .lock()
                .unwrap()
                .push(MessageFormatter::format_status(status));
        }

        fn error(&self, error: &ClientError) {
            self.lines
                .lock()
                .unwrap()
                .push(MessageFormatter::format_error(error));
        }
    }

    type RemoteSide = mpsc::UnboundedSender<Result<Inbound, ClientError>>;

    /// In-memory connection: inbound messages come from a channel, receive()
    /// blocks until close() is called or the peer side hangs up.
    struct FakeConnection {
        inbound: tokio::sync::Mutex<mpsc::UnboundedReceiver<Result<Inbound, ClientError>>>,
        sent: Mutex<Vec<Message>>,
        fail_sends: bool,
        closed: Notify,
        close_calls: AtomicUsize,
        opens: AtomicUsize,
    }

    impl FakeConnection {
        fn new(fail_sends: bool) -> (Arc<Self>, RemoteSide) {
            let (tx, rx) = mpsc::unbounded_channel();
            let connection = Arc::new(Self {
                inbound: tokio::sync::Mutex::new(rx),
                sent: Mutex::new(Vec::new()),
                fail_sends,
                closed: Notify::new(),
                close_calls: AtomicUsize::new(0),
                opens: AtomicUsize::new(0),
            });
            (connection, tx)
        }

        fn sent(&self) -> Vec<String> {
            self.sent
                .lock()
                .unwrap()
                .iter()
                .map(|m| m.to_string())
                .collect()
        }
    }

    #[async_trait]
    impl Connection for FakeConnection {
        fn is_open(&self) -> bool {
            self.close_calls.load(Ordering::SeqCst) == 0
        }

        async fn send(&self, message: Message) -> Result<(), ClientError> {
            if self.fail_sends {
                return Err(ClientError::Send("peer gone".to_string()));
            }
            self.sent.lock().unwrap().push(message);
            Ok(())
        }

        async fn receive(&self) -> Result<Inbound, ClientError> {
            let mut inbound = self.inbound.lock().await;
            tokio::select! {
                _ = self.closed.notified() => Ok(Inbound::Closed),
                item = inbound.recv() => item.unwrap_or(Ok(Inbound::Closed)),
            }
        }

        async fn close(&self) {
            self.close_calls.fetch_add(1, Ordering::SeqCst);
            self.closed.notify_one();
        }
    }

    struct FakeConnector {
        connection: Option<Arc<FakeConnection>>,
    }

    #[async_trait]
    impl Connector for FakeConnector {
        async fn open(&self, uri: &str) -> Result<Arc<dyn Connection>, ClientError> {
            match &self.connection {
                Some(connection) => {
                    connection.opens.fetch_add(1, Ordering::SeqCst);
                    Ok(connection.clone() as Arc<dyn Connection>)
                }
                None => Err(ClientError::Connect(format!("{} refused", uri))),
            }
        }
    }

    fn controller(
        connection: Option<Arc<FakeConnection>>,
    ) -> (SessionController, Arc<RecordingConsole>) {
        let console = Arc::new(RecordingConsole::default());
        let controller = SessionController::new(
            Arc::new(FakeConnector { connection }),
            console.clone(),
            "ws://test/socket",
        );
        (controller, console)
    }

    async fn wait_for_line(console: &RecordingConsole, line: &str) {
        tokio::time::timeout(Duration::from_secs(1), async {
            while console.count(line) == 0 {
                tokio::time::sleep(Duration::from_millis(5)).await;
            }
        })
        .await
        .expect("line should be printed");
    }

    #[tokio::test]
    async fn test_end_to_end_receive_then_quit() {
        // テスト項目: 接続 → 受信表示 → 終了コマンド → 切断の一連の流れ
        // given (前提条件):
        let (connection, remote) = FakeConnection::new(false);
        let (controller, console) = controller(Some(connection.clone()));
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        assert_eq!(controller.state(), SessionState::Connecting);

        // when (操作):
        let session = async {
            let result = controller.run(input_rx).await;
            (result, controller.state())
        };
        let driver = async {
            wait_for_line(&console, "WebSocket connection opened").await;
            remote
                .send(Ok(Inbound::Message(Message::new("hello"))))
                .unwrap();
            wait_for_line(&console, "Received message: hello").await;
            input_tx.send(InputLine::Quit).unwrap();
        };
        let ((result, state), ()) = tokio::join!(session, driver);

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(state, SessionState::Closed);
        assert_eq!(
            console.lines(),
            vec![
                "WebSocket connection opened",
                "Received message: hello",
                "WebSocket connection closed",
            ]
        );
        assert!(connection.sent().is_empty());
        assert_eq!(connection.close_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_lines_before_quit_are_sent_in_order() {
        // テスト項目: 終了コマンドより前の行がすべて入力順に送信される
        // given (前提条件):
        let (connection, _remote) = FakeConnection::new(false);
        let (controller, _console) = controller(Some(connection.clone()));
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        for line in ["a", "b", "c"] {
            input_tx.send(InputLine::Text(Message::new(line))).unwrap();
        }
        input_tx.send(InputLine::Quit).unwrap();

        // when (操作):
        let result = controller.run(input_rx).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(connection.sent(), vec!["a", "b", "c"]);
        assert_eq!(controller.state(), SessionState::Closed);
    }

    #[tokio::test]
    async fn test_remote_close_reaches_closed_without_input() {
        // テスト項目: リモートからの切断で入力なしに Closed に到達する
        // given (前提条件):
        let (connection, remote) = FakeConnection::new(false);
        let (controller, console) = controller(Some(connection));
        let (_input_tx, input_rx) = mpsc::unbounded_channel();
        remote.send(Ok(Inbound::Closed)).unwrap();

        // when (操作):
        let result = tokio::time::timeout(Duration::from_secs(1), controller.run(input_rx))
            .await
            .expect("session should end on remote close");

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(controller.state(), SessionState::Closed);
        assert_eq!(console.count("WebSocket connection closed"), 1);
    }

    #[tokio::test]
    async fn test_send_failure_reported_once_and_closed() {
        // テスト項目: 送信失敗でエラーが一度だけ表示され Closed に到達する
        // given (前提条件):
        let (connection, _remote) = FakeConnection::new(true);
        let (controller, console) = controller(Some(connection.clone()));
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        input_tx.send(InputLine::Text(Message::new("x"))).unwrap();
        input_tx.send(InputLine::Text(Message::new("y"))).unwrap();

        // when (操作):
        let result = controller.run(input_rx).await;

        // then (期待する結果):
        assert_eq!(result, Err(ClientError::Send("peer gone".to_string())));
        assert_eq!(controller.state(), SessionState::Closed);
        assert_eq!(console.count("WebSocket error: Send error: peer gone"), 1);
        assert_eq!(console.count("WebSocket connection closed"), 1);
        assert_eq!(connection.close_calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_receive_failure_reported_and_closed() {
        // テスト項目: 受信エラーで表示後に Closed に到達する
        // given (前提条件):
        let (connection, remote) = FakeConnection::new(false);
        let (controller, console) = controller(Some(connection));
        let (_input_tx, input_rx) = mpsc::unbounded_channel();
        remote
            .send(Err(ClientError::Connection("reset".to_string())))
            .unwrap();

        // when (操作):
        let result = controller.run(input_rx).await;

        // then (期待する結果):
        assert_eq!(result, Err(ClientError::Connection("reset".to_string())));
        assert_eq!(controller.state(), SessionState::Closed);
        assert_eq!(console.count("WebSocket error: Connection error: reset"), 1);
    }

    #[tokio::test]
    async fn test_connect_failure_never_opens() {
        // テスト項目: 接続失敗時は Open にならずにエラーを返す
        // given (前提条件):
        let (controller, console) = controller(None);
        let (_input_tx, input_rx) = mpsc::unbounded_channel();

        // when (操作):
        let result = controller.run(input_rx).await;

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Connect(_))));
        assert_eq!(controller.state(), SessionState::Closed);
        assert_eq!(
            console.lines(),
            vec!["WebSocket error: Connect error: ws://test/socket refused"]
        );
    }

    #[tokio::test]
    async fn test_end_of_input_closes_session() {
        // テスト項目: 入力の終了（EOF）で正常にセッションが終了する
        // given (前提条件):
        let (connection, _remote) = FakeConnection::new(false);
        let (controller, console) = controller(Some(connection));
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        drop(input_tx);

        // when (操作):
        let result = controller.run(input_rx).await;

        // then (期待する結果):
        assert!(result.is_ok());
        assert_eq!(console.count("WebSocket connection closed"), 1);
    }

    #[tokio::test]
    async fn test_second_run_is_rejected_without_opening() {
        // テスト項目: 終了したセッションを再実行しても接続は開かれず、すぐにエラーが返る
        // given (前提条件):
        let (connection, _remote) = FakeConnection::new(false);
        let (controller, console) = controller(Some(connection.clone()));
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        input_tx.send(InputLine::Quit).unwrap();
        assert!(controller.run(input_rx).await.is_ok());
        let lines_after_first_run = console.lines();

        // when (操作):
        let (_input_tx, input_rx) = mpsc::unbounded_channel();
        let result = tokio::time::timeout(Duration::from_secs(1), controller.run(input_rx))
            .await
            .expect("second run should return immediately");

        // then (期待する結果):
        assert!(matches!(result, Err(ClientError::Connect(_))));
        assert_eq!(controller.state(), SessionState::Closed);
        assert_eq!(connection.opens.load(Ordering::SeqCst), 1);
        assert_eq!(connection.close_calls.load(Ordering::SeqCst), 1);
        assert_eq!(console.lines(), lines_after_first_run);
    }

    /// Log sink collecting everything written at WARN and above
    #[derive(Clone, Default)]
    struct CapturedLogs(Arc<Mutex<Vec<String>>>);

    impl std::io::Write for CapturedLogs {
        fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
            self.0
                .lock()
                .unwrap()
                .push(String::from_utf8_lossy(buf).into_owned());
            Ok(buf.len())
        }

        fn flush(&mut self) -> std::io::Result<()> {
            Ok(())
        }
    }

    #[tokio::test]
    async fn test_session_errors_are_reported_only_on_console() {
        // テスト項目: 送受信エラーはコンソールに一度だけ表示され、警告ログとして重複出力されない
        // given (前提条件):
        let logs = CapturedLogs::default();
        let writer = logs.clone();
        let subscriber = tracing_subscriber::fmt()
            .with_max_level(tracing::Level::WARN)
            .with_writer(move || writer.clone())
            .with_ansi(false)
            .finish();
        let _guard = tracing::subscriber::set_default(subscriber);

        let (failing, _remote) = FakeConnection::new(true);
        let (send_controller, send_console) = controller(Some(failing));
        let (input_tx, send_input) = mpsc::unbounded_channel();
        input_tx.send(InputLine::Text(Message::new("x"))).unwrap();

        let (broken, remote) = FakeConnection::new(false);
        let (receive_controller, receive_console) = controller(Some(broken));
        let (_input_tx, receive_input) = mpsc::unbounded_channel();
        remote
            .send(Err(ClientError::Connection("reset".to_string())))
            .unwrap();

        // when (操作):
        let send_result = send_controller.run(send_input).await;
        let receive_result = receive_controller.run(receive_input).await;

        // then (期待する結果):
        assert!(send_result.is_err());
        assert!(receive_result.is_err());
        assert_eq!(send_console.count("WebSocket error: Send error: peer gone"), 1);
        assert_eq!(
            receive_console.count("WebSocket error: Connection error: reset"),
            1
        );
        assert!(
            logs.0.lock().unwrap().is_empty(),
            "unexpected log output: {:?}",
            logs.0.lock().unwrap()
        );
    }
}
