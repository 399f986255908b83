//! WebSocket protocol messages for the settlers server.

use serde::{Deserialize, Serialize};
use settlers_core::{GameAction, GameEvent, GameStateSnapshot, PlayerId, TurnPhase};
use uuid::Uuid;

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ClientMessage {
    /// Generate a board and seat the given players, in turn order
    CreateGame {
        players: Vec<SeatRequest>,
        /// Board seed; falls back to the server default, then to fresh randomness
        seed: Option<u64>,
    },

    /// Receive state updates for a game
    WatchGame { game_id: Uuid },

    /// Request the current state once
    GetGame { game_id: Uuid },

    /// Request the game list
    ListGames,

    /// Submit a move on behalf of a seated player
    GameAction {
        game_id: Uuid,
        player_id: PlayerId,
        action: GameAction,
    },

    /// Host-driven phase change
    SetPhase { game_id: Uuid, phase: TurnPhase },

    /// Ping for keepalive
    Ping,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", content = "payload")]
pub enum ServerMessage {
    /// Welcome message with the connection's id
    Welcome { connection_id: Uuid },

    /// Game created successfully
    GameCreated { game_id: Uuid },

    /// Point-in-time snapshot of a game
    GameState {
        game_id: Uuid,
        state: GameStateSnapshot,
    },

    /// Outcome of a submitted move
    ActionResult {
        success: bool,
        events: Vec<GameEvent>,
        error: Option<String>,
    },

    /// List of running games
    GameList { games: Vec<GameInfo> },

    /// Error occurred
    Error { message: String },

    /// Pong response
    Pong,
}

/// A seat requested when creating a game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SeatRequest {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
}

/// Game summary for the lobby list.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GameInfo {
    pub id: Uuid,
    pub players: Vec<String>,
    pub current_player_index: usize,
    pub turn_phase: TurnPhase,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use settlers_core::HexPosition;

    #[test]
    fn test_parse_game_action_message() {
        let game_id = Uuid::new_v4();
        let text = json!({
            "type": "GameAction",
            "payload": {
                "game_id": game_id,
                "player_id": 1,
                "action": {"PlaceSettlement": {"q": 0, "r": 0}}
            }
        })
        .to_string();

        let msg: ClientMessage = serde_json::from_str(&text).unwrap();
        match msg {
            ClientMessage::GameAction {
                game_id: parsed,
                player_id,
                action,
            } => {
                assert_eq!(parsed, game_id);
                assert_eq!(player_id, 1);
                assert_eq!(action, GameAction::PlaceSettlement(HexPosition::new(0, 0)));
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn test_create_game_without_seed() {
        let text = r#"{"type":"CreateGame","payload":{"players":[{"id":1,"name":"Alice","color":"red"}],"seed":null}}"#;
        let msg: ClientMessage = serde_json::from_str(text).unwrap();
        assert!(matches!(
            msg,
            ClientMessage::CreateGame { seed: None, ref players } if players.len() == 1
        ));
    }

    #[test]
    fn test_action_result_keeps_null_error() {
        let msg = ServerMessage::ActionResult {
            success: true,
            events: vec![],
            error: None,
        };
        let value = serde_json::to_value(&msg).unwrap();
        assert_eq!(value["type"], "ActionResult");
        assert!(value["payload"]["error"].is_null());
    }
}
