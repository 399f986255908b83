//! WebSocket server and connection handling.
//!
//! Every mutation runs while the session's map entry is held, and the
//! snapshot that gets broadcast is taken before that entry is released, so
//! watchers never see a half-applied move or a state newer than its events.

use crate::config::ServerConfig;
use crate::protocol::{ClientMessage, GameInfo, SeatRequest, ServerMessage};
use crate::session::{GameSession, SessionError};
use dashmap::DashMap;
use futures_util::{SinkExt, StreamExt};
use settlers_core::{GameAction, GameEvent, PlayerId, TurnPhase};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::{TcpListener, TcpStream};
use tokio::sync::mpsc;
use tokio_tungstenite::{accept_async, tungstenite::Message};
use tracing::{debug, error, info, warn};
use uuid::Uuid;

/// Server state shared across all connections.
pub struct ServerState {
    pub config: ServerConfig,
    /// All running games
    pub sessions: DashMap<Uuid, GameSession>,
    /// Mapping from connection ID to its message sender
    pub connections: DashMap<Uuid, mpsc::UnboundedSender<ServerMessage>>,
}

impl ServerState {
    pub fn new(config: ServerConfig) -> Self {
        Self {
            config,
            sessions: DashMap::new(),
            connections: DashMap::new(),
        }
    }

    /// Send a message to a specific connection.
    pub fn send_to(&self, connection_id: Uuid, msg: ServerMessage) {
        if let Some(sender) = self.connections.get(&connection_id) {
            let _ = sender.send(msg);
        }
    }

    fn send_error(&self, connection_id: Uuid, message: impl Into<String>) {
        self.send_to(
            connection_id,
            ServerMessage::Error {
                message: message.into(),
            },
        );
    }

    fn broadcast(&self, watchers: &[Uuid], msg: ServerMessage) {
        for connection_id in watchers {
            self.send_to(*connection_id, msg.clone());
        }
    }

    pub fn list_games(&self) -> Vec<GameInfo> {
        self.sessions.iter().map(|s| s.to_info()).collect()
    }

    /// Create a game and subscribe its creator.
    pub fn create_game(
        &self,
        creator: Uuid,
        players: Vec<SeatRequest>,
        seed: Option<u64>,
    ) -> Result<Uuid, SessionError> {
        let game_id = self.open_game(players, seed)?;
        if let Some(mut session) = self.sessions.get_mut(&game_id) {
            session.watchers.insert(creator);
        }
        Ok(game_id)
    }

    /// Create a game nobody watches yet. Unwatched games are kept until
    /// someone has watched them and left.
    pub fn open_game(
        &self,
        players: Vec<SeatRequest>,
        seed: Option<u64>,
    ) -> Result<Uuid, SessionError> {
        let game_id = Uuid::new_v4();
        let seed = seed.or(self.config.board_seed);
        let session = GameSession::new(game_id, players, seed, self.config.rules)?;

        info!(
            %game_id,
            rules = ?self.config.rules,
            seed,
            players = session.game().player_count(),
            "created game"
        );
        self.sessions.insert(game_id, session);
        Ok(game_id)
    }

    /// Seat Alice (red) and Bob (blue) in a game so the server has
    /// something to serve before any `CreateGame`.
    pub fn open_default_game(&self) -> Result<Uuid, SessionError> {
        let seats = vec![
            SeatRequest {
                id: 1,
                name: "Alice".to_string(),
                color: "red".to_string(),
            },
            SeatRequest {
                id: 2,
                name: "Bob".to_string(),
                color: "blue".to_string(),
            },
        ];
        self.open_game(seats, None)
    }

    /// Snapshot a game, optionally subscribing the caller to updates.
    pub fn game_state(
        &self,
        connection_id: Uuid,
        game_id: Uuid,
        watch: bool,
    ) -> Result<ServerMessage, SessionError> {
        let mut session = self
            .sessions
            .get_mut(&game_id)
            .ok_or(SessionError::NotFound)?;
        if watch {
            session.watchers.insert(connection_id);
        }
        Ok(ServerMessage::GameState {
            game_id,
            state: session.snapshot(),
        })
    }

    /// Apply a move; returns its events, the fresh state and who to tell.
    pub fn apply_action(
        &self,
        game_id: Uuid,
        player: PlayerId,
        action: GameAction,
    ) -> Result<(Vec<GameEvent>, ServerMessage, Vec<Uuid>), SessionError> {
        let mut session = self
            .sessions
            .get_mut(&game_id)
            .ok_or(SessionError::NotFound)?;
        let events = session.apply_action(player, action)?;
        let update = ServerMessage::GameState {
            game_id,
            state: session.snapshot(),
        };
        let watchers = session.watchers.iter().copied().collect();
        Ok((events, update, watchers))
    }

    pub fn set_phase(
        &self,
        game_id: Uuid,
        phase: TurnPhase,
    ) -> Result<(GameEvent, ServerMessage, Vec<Uuid>), SessionError> {
        let mut session = self
            .sessions
            .get_mut(&game_id)
            .ok_or(SessionError::NotFound)?;
        let event = session.set_phase(phase);
        let update = ServerMessage::GameState {
            game_id,
            state: session.snapshot(),
        };
        let watchers = session.watchers.iter().copied().collect();
        Ok((event, update, watchers))
    }

    /// Forget a connection and end the games it was the last watcher of.
    pub fn disconnect(&self, connection_id: Uuid) {
        self.connections.remove(&connection_id);
        self.sessions.retain(|game_id, session| {
            if session.watchers.remove(&connection_id) && session.watchers.is_empty() {
                info!(%game_id, "closing game with no watchers");
                return false;
            }
            true
        });
    }
}

impl Default for ServerState {
    fn default() -> Self {
        Self::new(ServerConfig::default())
    }
}

/// Run the WebSocket server.
pub async fn run_server(state: Arc<ServerState>) -> anyhow::Result<()> {
    let addr = state.config.addr;
    let listener = TcpListener::bind(addr).await?;
    info!("Settlers server listening on {}", addr);

    while let Ok((stream, peer_addr)) = listener.accept().await {
        let state = Arc::clone(&state);
        tokio::spawn(async move {
            if let Err(e) = handle_connection(stream, peer_addr, state).await {
                error!("Connection error from {}: {}", peer_addr, e);
            }
        });
    }

    Ok(())
}

/// Handle a single WebSocket connection.
async fn handle_connection(
    stream: TcpStream,
    addr: SocketAddr,
    state: Arc<ServerState>,
) -> anyhow::Result<()> {
    let ws_stream = accept_async(stream).await?;
    info!("New WebSocket connection from {}", addr);

    let (mut ws_sender, mut ws_receiver) = ws_stream.split();
    let connection_id = Uuid::new_v4();

    let (tx, mut rx) = mpsc::unbounded_channel::<ServerMessage>();
    state.connections.insert(connection_id, tx);

    let welcome = ServerMessage::Welcome { connection_id };
    ws_sender
        .send(Message::Text(serde_json::to_string(&welcome)?.into()))
        .await?;

    // Forward queued messages to the socket
    let send_task = tokio::spawn(async move {
        while let Some(msg) = rx.recv().await {
            match serde_json::to_string(&msg) {
                Ok(text) => {
                    if ws_sender.send(Message::Text(text.into())).await.is_err() {
                        break;
                    }
                }
                Err(e) => error!("Failed to encode message: {}", e),
            }
        }
    });

    while let Some(msg) = ws_receiver.next().await {
        match msg {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(client_msg) => handle_message(connection_id, client_msg, &state),
                Err(e) => {
                    warn!("Invalid message from {}: {}", connection_id, e);
                    state.send_error(connection_id, format!("Invalid message: {}", e));
                }
            },
            Ok(Message::Close(_)) => {
                info!("Client {} closing connection", connection_id);
                break;
            }
            Ok(Message::Ping(_)) => state.send_to(connection_id, ServerMessage::Pong),
            Err(e) => {
                error!("WebSocket error from {}: {}", connection_id, e);
                break;
            }
            _ => {}
        }
    }

    state.disconnect(connection_id);
    send_task.abort();

    info!("Connection closed for {}", connection_id);
    Ok(())
}

/// Handle a client message.
fn handle_message(connection_id: Uuid, msg: ClientMessage, state: &ServerState) {
    match msg {
        ClientMessage::CreateGame { players, seed } => {
            match state.create_game(connection_id, players, seed) {
                Ok(game_id) => {
                    state.send_to(connection_id, ServerMessage::GameCreated { game_id });
                    if let Ok(update) = state.game_state(connection_id, game_id, false) {
                        state.send_to(connection_id, update);
                    }
                }
                Err(e) => state.send_error(connection_id, e.to_string()),
            }
        }

        ClientMessage::WatchGame { game_id } => {
            match state.game_state(connection_id, game_id, true) {
                Ok(update) => state.send_to(connection_id, update),
                Err(e) => state.send_error(connection_id, e.to_string()),
            }
        }

        ClientMessage::GetGame { game_id } => {
            match state.game_state(connection_id, game_id, false) {
                Ok(update) => state.send_to(connection_id, update),
                Err(e) => state.send_error(connection_id, e.to_string()),
            }
        }

        ClientMessage::ListGames => {
            let games = state.list_games();
            state.send_to(connection_id, ServerMessage::GameList { games });
        }

        ClientMessage::GameAction {
            game_id,
            player_id,
            action,
        } => {
            debug!(%game_id, player_id, ?action, "game action");
            match state.apply_action(game_id, player_id, action) {
                Ok((events, update, watchers)) => {
                    state.send_to(
                        connection_id,
                        ServerMessage::ActionResult {
                            success: true,
                            events,
                            error: None,
                        },
                    );
                    state.broadcast(&watchers, update);
                }
                Err(e) => {
                    debug!(%game_id, player_id, error = %e, "action rejected");
                    state.send_to(
                        connection_id,
                        ServerMessage::ActionResult {
                            success: false,
                            events: vec![],
                            error: Some(e.to_string()),
                        },
                    );
                }
            }
        }

        ClientMessage::SetPhase { game_id, phase } => match state.set_phase(game_id, phase) {
            Ok((event, update, watchers)) => {
                state.send_to(
                    connection_id,
                    ServerMessage::ActionResult {
                        success: true,
                        events: vec![event],
                        error: None,
                    },
                );
                state.broadcast(&watchers, update);
            }
            Err(e) => state.send_error(connection_id, e.to_string()),
        },

        ClientMessage::Ping => {
            state.send_to(connection_id, ServerMessage::Pong);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use settlers_core::HexPosition;

    fn seats() -> Vec<SeatRequest> {
        vec![
            SeatRequest {
                id: 1,
                name: "Alice".to_string(),
                color: "red".to_string(),
            },
            SeatRequest {
                id: 2,
                name: "Bob".to_string(),
                color: "blue".to_string(),
            },
        ]
    }

    fn connect(state: &ServerState) -> (Uuid, mpsc::UnboundedReceiver<ServerMessage>) {
        let id = Uuid::new_v4();
        let (tx, rx) = mpsc::unbounded_channel();
        state.connections.insert(id, tx);
        (id, rx)
    }

    #[test]
    fn test_create_game_sends_created_and_state() {
        let state = ServerState::default();
        let (conn, mut rx) = connect(&state);

        handle_message(
            conn,
            ClientMessage::CreateGame {
                players: seats(),
                seed: Some(5),
            },
            &state,
        );

        let game_id = match rx.try_recv().unwrap() {
            ServerMessage::GameCreated { game_id } => game_id,
            other => panic!("unexpected {:?}", other),
        };
        match rx.try_recv().unwrap() {
            ServerMessage::GameState { game_id: id, state } => {
                assert_eq!(id, game_id);
                assert_eq!(state.board.tiles.len(), 19);
                assert_eq!(state.players.len(), 2);
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(state.list_games().len(), 1);
    }

    #[test]
    fn test_action_is_broadcast_to_watchers() {
        let state = ServerState::default();
        let (alice, mut alice_rx) = connect(&state);
        let (watcher, mut watcher_rx) = connect(&state);

        let game_id = state.create_game(alice, seats(), Some(1)).unwrap();
        state.game_state(watcher, game_id, true).unwrap();

        handle_message(
            alice,
            ClientMessage::GameAction {
                game_id,
                player_id: 1,
                action: GameAction::PlaceSettlement(HexPosition::new(0, 0)),
            },
            &state,
        );

        match alice_rx.try_recv().unwrap() {
            ServerMessage::ActionResult {
                success, events, ..
            } => {
                assert!(success);
                assert!(!events.is_empty());
            }
            other => panic!("unexpected {:?}", other),
        }
        match watcher_rx.try_recv().unwrap() {
            ServerMessage::GameState { state, .. } => {
                assert_eq!(state.players[0].victory_points, 1);
            }
            other => panic!("unexpected {:?}", other),
        }
    }

    #[test]
    fn test_rejected_action_reports_error_without_broadcast() {
        let state = ServerState::default();
        let (bob, mut bob_rx) = connect(&state);
        let game_id = state.create_game(bob, seats(), Some(1)).unwrap();

        handle_message(
            bob,
            ClientMessage::GameAction {
                game_id,
                player_id: 2,
                action: GameAction::PlaceSettlement(HexPosition::new(0, 0)),
            },
            &state,
        );

        match bob_rx.try_recv().unwrap() {
            ServerMessage::ActionResult { success, error, .. } => {
                assert!(!success);
                assert_eq!(error.as_deref(), Some("Not your turn"));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert!(bob_rx.try_recv().is_err());
    }

    #[test]
    fn test_unknown_game() {
        let state = ServerState::default();
        let (conn, mut rx) = connect(&state);

        handle_message(
            conn,
            ClientMessage::GetGame {
                game_id: Uuid::new_v4(),
            },
            &state,
        );
        assert!(matches!(
            rx.try_recv().unwrap(),
            ServerMessage::Error { message } if message == "Game not found"
        ));
    }

    #[test]
    fn test_disconnect_drops_watch() {
        let state = ServerState::default();
        let (alice, _alice_rx) = connect(&state);
        let (bob, _bob_rx) = connect(&state);
        let game_id = state.create_game(alice, seats(), None).unwrap();
        state.game_state(bob, game_id, true).unwrap();

        state.disconnect(alice);

        assert!(state.connections.get(&alice).is_none());
        let session = state.sessions.get(&game_id).unwrap();
        assert_eq!(session.watchers.len(), 1);
        assert!(session.watchers.contains(&bob));
    }

    #[test]
    fn test_last_watcher_leaving_closes_game() {
        let state = ServerState::default();
        for _ in 0..10 {
            let (conn, _rx) = connect(&state);
            state.create_game(conn, seats(), None).unwrap();
            state.disconnect(conn);
        }

        assert_eq!(state.connections.len(), 0);
        assert_eq!(state.sessions.len(), 0);
    }

    #[test]
    fn test_default_game_survives_unrelated_disconnects() {
        let state = ServerState::new(ServerConfig {
            board_seed: Some(11),
            ..ServerConfig::default()
        });
        let game_id = state.open_default_game().unwrap();
        let (conn, mut rx) = connect(&state);

        handle_message(conn, ClientMessage::ListGames, &state);
        match rx.try_recv().unwrap() {
            ServerMessage::GameList { games } => {
                assert_eq!(games.len(), 1);
                assert_eq!(games[0].id, game_id);
                assert_eq!(games[0].players, vec!["Alice", "Bob"]);
            }
            other => panic!("unexpected {:?}", other),
        }

        state.disconnect(conn);
        assert!(state.sessions.get(&game_id).is_some());
    }
}
