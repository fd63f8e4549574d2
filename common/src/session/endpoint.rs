use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::tcp::{OwnedReadHalf, OwnedWriteHalf};
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::{Mutex, Notify};

use crate::game::{HostSetup, SessionConfig};
use crate::log;
use crate::protocol::Role;

use super::broadcaster::EventBroadcaster;
use super::error::SessionError;
use super::events::{ConnectionState, PresentationCommand, SessionEvent};
use super::state::{SessionSnapshot, SessionState};

struct Shared<B: EventBroadcaster> {
    role: Role,
    state: Mutex<SessionState>,
    writer: Mutex<Option<OwnedWriteHalf>>,
    shutdown: Notify,
    terminated: AtomicBool,
    broadcaster: B,
}

impl<B: EventBroadcaster> Shared<B> {
    fn broadcast_all(&self, events: Vec<SessionEvent>) {
        for event in events {
            self.broadcaster.broadcast(event);
        }
    }

    async fn terminate(&self, reason: &str) {
        if self.terminated.swap(true, Ordering::SeqCst) {
            return;
        }

        log!("{} session ended: {}", self.role, reason);

        self.state.lock().await.terminate();

        if let Some(mut writer) = self.writer.lock().await.take() {
            let _ = writer.shutdown().await;
        }

        self.shutdown.notify_one();
        self.broadcaster
            .broadcast(SessionEvent::ConnectionStateChanged(ConnectionState::Disconnected));
    }
}

/// A bound host socket waiting for its single peer.
pub struct HostListener<B: EventBroadcaster> {
    listener: TcpListener,
    config: SessionConfig,
    broadcaster: B,
}

impl<B: EventBroadcaster> HostListener<B> {
    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> SessionConfig {
        self.config
    }

    /// Accepts exactly one connector; the listening socket is closed afterwards.
    pub async fn accept(self) -> Result<(SessionEndpoint<B>, ReceiveLoop<B>), SessionError> {
        let (stream, peer_addr) = self.listener.accept().await?;
        log!("Connector joined from {}", peer_addr);
        Ok(SessionEndpoint::start(
            stream,
            SessionState::host(self.config),
            self.broadcaster,
        ))
    }
}

/// One side of a connected session. Cheap to clone; all clones drive the
/// same connection.
pub struct SessionEndpoint<B: EventBroadcaster> {
    shared: Arc<Shared<B>>,
}

impl<B: EventBroadcaster> Clone for SessionEndpoint<B> {
    fn clone(&self) -> Self {
        Self {
            shared: self.shared.clone(),
        }
    }
}

impl<B: EventBroadcaster> SessionEndpoint<B> {
    /// Validates the host setup and binds. Nothing is bound if the setup is
    /// rejected.
    pub async fn listen(
        addr: &str,
        setup: HostSetup,
        broadcaster: B,
    ) -> Result<HostListener<B>, SessionError> {
        let config = setup.into_config()?;
        let listener = TcpListener::bind(addr).await?;

        log!(
            "Hosting as {} for {} rounds on {}",
            config.local_symbol,
            config.rounds,
            listener.local_addr()?
        );
        broadcaster.broadcast(SessionEvent::ConnectionStateChanged(
            ConnectionState::AwaitingConnection,
        ));

        Ok(HostListener {
            listener,
            config,
            broadcaster,
        })
    }

    pub async fn connect(addr: &str, broadcaster: B) -> Result<(Self, ReceiveLoop<B>), SessionError> {
        let stream = TcpStream::connect(addr).await?;
        log!("Connected to host at {}", addr);
        Ok(Self::start(stream, SessionState::connector(), broadcaster))
    }

    fn start(stream: TcpStream, state: SessionState, broadcaster: B) -> (Self, ReceiveLoop<B>) {
        if let Err(e) = stream.set_nodelay(true) {
            log!("Failed to disable Nagle: {}", e);
        }

        let (reader, writer) = stream.into_split();
        let role = state.role();
        let turn = state.turn();

        let shared = Arc::new(Shared {
            role,
            state: Mutex::new(state),
            writer: Mutex::new(Some(writer)),
            shutdown: Notify::new(),
            terminated: AtomicBool::new(false),
            broadcaster,
        });

        shared
            .broadcaster
            .broadcast(SessionEvent::ConnectionStateChanged(ConnectionState::Connected));
        shared.broadcaster.broadcast(SessionEvent::TurnChanged(turn));

        let receive_loop = ReceiveLoop {
            shared: shared.clone(),
            reader,
        };
        (Self { shared }, receive_loop)
    }

    pub fn role(&self) -> Role {
        self.shared.role
    }

    pub fn is_terminated(&self) -> bool {
        self.shared.terminated.load(Ordering::SeqCst)
    }

    pub async fn snapshot(&self) -> SessionSnapshot {
        self.shared.state.lock().await.snapshot()
    }

    /// Nothing is written and nothing changes unless the move is valid
    /// locally. The move only lands on the local board once the bytes are out.
    pub async fn send_move(&self, row: usize, col: usize) -> Result<(), SessionError> {
        let mut state = self.shared.state.lock().await;
        if self.is_terminated() {
            return Err(SessionError::NotConnected);
        }

        let (mv, bytes) = match state.prepare_local_move(row, col) {
            Ok(prepared) => prepared,
            Err(e) => {
                self.shared.broadcaster.broadcast(SessionEvent::MoveRejected(e));
                return Err(e.into());
            }
        };

        let write_result = {
            let mut writer = self.shared.writer.lock().await;
            match writer.as_mut() {
                Some(writer) => writer.write_all(&bytes).await,
                None => Err(io::Error::from(io::ErrorKind::NotConnected)),
            }
        };

        if let Err(e) = write_result {
            drop(state);
            self.shared.terminate(&format!("write failed: {}", e)).await;
            return Err(e.into());
        }

        state.commit_local_move(mv)?;
        self.shared.broadcast_all(state.take_events());
        Ok(())
    }

    pub async fn handle_command(&self, command: PresentationCommand) -> Result<(), SessionError> {
        match command {
            PresentationCommand::RequestMove { row, col } => self.send_move(row, col).await,
            PresentationCommand::Disconnect => {
                self.disconnect().await;
                Ok(())
            }
        }
    }

    pub async fn disconnect(&self) {
        self.shared.terminate("local disconnect").await;
    }
}

/// Owns the read half. Run it on its own task; it returns once the session
/// is over.
pub struct ReceiveLoop<B: EventBroadcaster> {
    shared: Arc<Shared<B>>,
    reader: OwnedReadHalf,
}

impl<B: EventBroadcaster> ReceiveLoop<B> {
    /// Reads one fixed-size message at a time, sized by the peer's role, so
    /// back-to-back messages are never merged.
    pub async fn run(mut self) {
        let mut buf = vec![0u8; self.shared.role.inbound_len()];

        let reason = loop {
            let read = tokio::select! {
                result = self.reader.read_exact(&mut buf) => result,
                _ = self.shared.shutdown.notified() => break "shutdown requested".to_string(),
            };

            match read {
                Ok(_) => {
                    let mut state = self.shared.state.lock().await;
                    if self.shared.terminated.load(Ordering::SeqCst) {
                        break "session already terminated".to_string();
                    }
                    match state.apply_inbound(&buf) {
                        Ok(()) => self.shared.broadcast_all(state.take_events()),
                        Err(e) => break e.to_string(),
                    }
                }
                Err(e) if e.kind() == io::ErrorKind::UnexpectedEof => {
                    break "peer closed the connection".to_string();
                }
                Err(e) => break format!("read failed: {}", e),
            }
        };

        self.shared.terminate(&reason).await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::{Board, GameError, Position, RoundResult, Symbol, Turn, TournamentResult};
    use crate::session::EventSender;
    use std::time::Duration;
    use tokio::sync::mpsc;
    use tokio::task::JoinHandle;
    use tokio::time::timeout;

    type Events = mpsc::UnboundedReceiver<SessionEvent>;

    const WAIT: Duration = Duration::from_secs(5);

    async fn wait_for<F>(rx: &mut Events, mut predicate: F) -> SessionEvent
    where
        F: FnMut(&SessionEvent) -> bool,
    {
        timeout(WAIT, async {
            loop {
                let event = rx.recv().await.expect("event channel closed");
                if predicate(&event) {
                    return event;
                }
            }
        })
        .await
        .expect("timed out waiting for event")
    }

    async fn wait_for_mark(rx: &mut Events, row: usize, col: usize) {
        let position = Position::new(row, col);
        wait_for(rx, |event| {
            matches!(event, SessionEvent::CellMarked { position: p, .. } if *p == position)
        })
        .await;
    }

    struct Pair {
        host: SessionEndpoint<EventSender>,
        host_rx: Events,
        host_loop: JoinHandle<()>,
        connector: SessionEndpoint<EventSender>,
        connector_rx: Events,
        connector_loop: JoinHandle<()>,
    }

    async fn create_pair(symbol: Symbol, rounds: i64) -> Pair {
        let (host_tx, host_rx) = mpsc::unbounded_channel();
        let (connector_tx, connector_rx) = mpsc::unbounded_channel();

        let listener = SessionEndpoint::listen("127.0.0.1:0", HostSetup::new(symbol, rounds), host_tx)
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap().to_string();

        let (accepted, connected) =
            tokio::join!(listener.accept(), SessionEndpoint::connect(&addr, connector_tx));
        let (host, host_receive) = accepted.unwrap();
        let (connector, connector_receive) = connected.unwrap();

        Pair {
            host,
            host_rx,
            host_loop: tokio::spawn(host_receive.run()),
            connector,
            connector_rx,
            connector_loop: tokio::spawn(connector_receive.run()),
        }
    }

    // Host X takes (0,0) and (0,1), connector O takes (1,0) and (1,1).
    const HOST_TOP_ROW_SETUP: [(bool, usize, usize); 4] = [(true, 0, 0), (false, 1, 0), (true, 0, 1), (false, 1, 1)];

    async fn play(pair: &mut Pair, moves: &[(bool, usize, usize)]) {
        for &(host_moves, row, col) in moves {
            if host_moves {
                pair.host.send_move(row, col).await.unwrap();
                wait_for_mark(&mut pair.connector_rx, row, col).await;
            } else {
                pair.connector.send_move(row, col).await.unwrap();
                wait_for_mark(&mut pair.host_rx, row, col).await;
            }
        }
    }

    async fn create_host_with_raw_peer(
        symbol: Symbol,
        rounds: i64,
    ) -> (SessionEndpoint<EventSender>, Events, JoinHandle<()>, TcpStream) {
        let (tx, rx) = mpsc::unbounded_channel();
        let listener = SessionEndpoint::listen("127.0.0.1:0", HostSetup::new(symbol, rounds), tx)
            .await
            .unwrap();
        let addr = listener.local_addr().unwrap();

        let (accepted, raw_peer) = tokio::join!(listener.accept(), TcpStream::connect(addr));
        let (host, receive) = accepted.unwrap();
        (host, rx, tokio::spawn(receive.run()), raw_peer.unwrap())
    }

    #[tokio::test]
    async fn test_full_exchange_over_tcp() {
        let mut pair = create_pair(Symbol::X, 1).await;

        play(&mut pair, &HOST_TOP_ROW_SETUP).await;

        let snapshot = pair.connector.snapshot().await;
        assert_eq!(snapshot.board.cell(Position::new(0, 1)).symbol(), Some(Symbol::X));
        assert_eq!(snapshot.turn, Turn::Remote);
        assert_eq!(snapshot.config.map(|c| c.local_symbol), Some(Symbol::O));

        pair.host.send_move(0, 2).await.unwrap();

        let SessionEvent::TournamentEnded(summary) =
            wait_for(&mut pair.connector_rx, |e| matches!(e, SessionEvent::TournamentEnded(_))).await
        else {
            unreachable!();
        };
        assert_eq!(summary.result, TournamentResult::RemoteWin);
        assert_eq!(summary.winner, Symbol::X);

        let SessionEvent::TournamentEnded(summary) =
            wait_for(&mut pair.host_rx, |e| matches!(e, SessionEvent::TournamentEnded(_))).await
        else {
            unreachable!();
        };
        assert_eq!(summary.result, TournamentResult::LocalWin);

        let host = pair.host.snapshot().await;
        assert_eq!((host.wins, host.losses, host.current_round), (0, 0, 1));
        assert_eq!(host.board, Board::new());
        assert_eq!(host.turn, Turn::Local);

        pair.host.disconnect().await;
        timeout(WAIT, pair.connector_loop).await.unwrap().unwrap();
        timeout(WAIT, pair.host_loop).await.unwrap().unwrap();
    }

    #[tokio::test]
    async fn test_rejected_move_writes_nothing() {
        let raw_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = raw_listener.local_addr().unwrap().to_string();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (connector, _receive) = SessionEndpoint::connect(&addr, tx).await.unwrap();
        let (mut raw_host, _) = raw_listener.accept().await.unwrap();

        let result = connector.send_move(0, 0).await;
        assert!(matches!(result, Err(SessionError::Game(GameError::NotMyTurn))));
        wait_for(&mut rx, |e| *e == SessionEvent::MoveRejected(GameError::NotMyTurn)).await;

        let mut buf = [0u8; 8];
        let read = timeout(Duration::from_millis(200), raw_host.read(&mut buf)).await;
        assert!(read.is_err(), "nothing should reach the wire");
        assert_eq!(connector.snapshot().await.board, Board::new());
    }

    #[tokio::test]
    async fn test_invalid_rounds_rejected_before_bind() {
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = SessionEndpoint::listen("127.0.0.1:0", HostSetup::new(Symbol::X, 10), tx).await;

        assert!(matches!(result, Err(SessionError::Setup(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_framing_error_terminates_and_resets() {
        let raw_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = raw_listener.local_addr().unwrap().to_string();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (connector, receive) = SessionEndpoint::connect(&addr, tx).await.unwrap();
        let receive_handle = tokio::spawn(receive.run());
        let (mut raw_host, _) = raw_listener.accept().await.unwrap();

        raw_host.write_all(b"00O3").await.unwrap();
        wait_for_mark(&mut rx, 0, 0).await;
        assert_eq!(connector.snapshot().await.turn, Turn::Local);

        raw_host.write_all(b"z0O3").await.unwrap();
        wait_for(&mut rx, |e| {
            *e == SessionEvent::ConnectionStateChanged(ConnectionState::Disconnected)
        })
        .await;
        timeout(WAIT, receive_handle).await.unwrap().unwrap();

        assert!(connector.is_terminated());
        let snapshot = connector.snapshot().await;
        assert_eq!(snapshot.board, Board::new());
        assert_eq!(snapshot.turn, Turn::Remote);

        let mut buf = [0u8; 8];
        let read = timeout(WAIT, raw_host.read(&mut buf)).await.unwrap().unwrap();
        assert_eq!(read, 0);
    }

    #[tokio::test]
    async fn test_disconnect_reaches_peer() {
        let mut pair = create_pair(Symbol::O, 3).await;

        pair.host.send_move(1, 1).await.unwrap();
        wait_for_mark(&mut pair.connector_rx, 1, 1).await;

        pair.host
            .handle_command(PresentationCommand::Disconnect)
            .await
            .unwrap();

        wait_for(&mut pair.connector_rx, |e| {
            *e == SessionEvent::ConnectionStateChanged(ConnectionState::Disconnected)
        })
        .await;
        timeout(WAIT, pair.connector_loop).await.unwrap().unwrap();
        timeout(WAIT, pair.host_loop).await.unwrap().unwrap();

        assert!(pair.connector.is_terminated());
        assert_eq!(pair.connector.snapshot().await.board, Board::new());
        assert!(matches!(
            pair.host.send_move(0, 0).await,
            Err(SessionError::NotConnected)
        ));
    }

    #[tokio::test]
    async fn test_host_opens_next_round_without_waiting() {
        let mut pair = create_pair(Symbol::X, 3).await;
        play(&mut pair, &HOST_TOP_ROW_SETUP).await;

        pair.host.send_move(0, 2).await.unwrap();
        pair.host.send_move(2, 2).await.unwrap();

        wait_for(&mut pair.connector_rx, |e| {
            *e == SessionEvent::RoundEnded {
                round_number: 1,
                result: RoundResult::RemoteWin,
            }
        })
        .await;
        wait_for_mark(&mut pair.connector_rx, 2, 2).await;

        assert!(!pair.connector.is_terminated());
        let snapshot = pair.connector.snapshot().await;
        assert_eq!((snapshot.wins, snapshot.losses, snapshot.current_round), (0, 1, 2));
        assert_eq!(snapshot.board.cell(Position::new(2, 2)).symbol(), Some(Symbol::X));
        assert_eq!(snapshot.turn, Turn::Local);

        pair.connector.send_move(1, 1).await.unwrap();
        wait_for_mark(&mut pair.host_rx, 1, 1).await;
        assert!(!pair.host.is_terminated());
    }

    #[tokio::test]
    async fn test_message_split_across_writes_is_reassembled() {
        let raw_listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = raw_listener.local_addr().unwrap().to_string();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let (connector, receive) = SessionEndpoint::connect(&addr, tx).await.unwrap();
        let _receive_handle = tokio::spawn(receive.run());
        let (mut raw_host, _) = raw_listener.accept().await.unwrap();

        raw_host.write_all(b"21").await.unwrap();
        raw_host.flush().await.unwrap();
        tokio::time::sleep(Duration::from_millis(50)).await;
        raw_host.write_all(b"O3").await.unwrap();

        wait_for_mark(&mut rx, 2, 1).await;
        assert!(!connector.is_terminated());
        assert_eq!(connector.snapshot().await.turn, Turn::Local);
    }

    #[tokio::test]
    async fn test_connect_to_closed_port_fails() {
        let closed = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = closed.local_addr().unwrap().to_string();
        drop(closed);
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = SessionEndpoint::connect(&addr, tx).await;

        assert!(matches!(result, Err(SessionError::Connection(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_listen_on_taken_address_fails() {
        let taken = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = taken.local_addr().unwrap().to_string();
        let (tx, mut rx) = mpsc::unbounded_channel();

        let result = SessionEndpoint::listen(&addr, HostSetup::new(Symbol::X, 3), tx).await;

        assert!(matches!(result, Err(SessionError::Connection(_))));
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn test_failed_write_terminates_and_resets() {
        let (host, mut rx, receive_handle, mut raw_peer) = create_host_with_raw_peer(Symbol::X, 5).await;

        host.send_move(0, 0).await.unwrap();
        let mut buf = [0u8; 4];
        timeout(WAIT, raw_peer.read_exact(&mut buf)).await.unwrap().unwrap();
        assert_eq!(&buf, b"00O5");

        raw_peer.write_all(b"11").await.unwrap();
        wait_for_mark(&mut rx, 1, 1).await;

        drop(host.shared.writer.lock().await.take());
        let result = host.send_move(2, 2).await;

        assert!(matches!(result, Err(SessionError::Connection(_))));
        wait_for(&mut rx, |e| {
            *e == SessionEvent::ConnectionStateChanged(ConnectionState::Disconnected)
        })
        .await;
        timeout(WAIT, receive_handle).await.unwrap().unwrap();

        assert!(host.is_terminated());
        let snapshot = host.snapshot().await;
        assert_eq!(snapshot.board, Board::new());
        assert_eq!(snapshot.turn, Turn::Local);
        assert_eq!((snapshot.wins, snapshot.losses, snapshot.current_round), (0, 0, 1));
    }
}
