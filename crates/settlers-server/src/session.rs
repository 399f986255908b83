//! Game session management.

use rand::rngs::StdRng;
use rand::SeedableRng;
use settlers_core::{
    game_snapshot, generate_standard_board, Board, GameAction, GameError, GameEvent, GameState,
    GameStateSnapshot, Player, PlayerId, TurnPhase,
};
use std::collections::HashSet;
use thiserror::Error;
use uuid::Uuid;

use crate::config::RulesMode;
use crate::protocol::{GameInfo, SeatRequest};

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Game not found")]
    NotFound,

    #[error(transparent)]
    Game(#[from] GameError),
}

/// One running game together with the rules it is played under and the
/// connections watching it.
pub struct GameSession {
    pub id: Uuid,
    pub rules: RulesMode,
    /// Connections that receive state updates
    pub watchers: HashSet<Uuid>,
    game: GameState,
}

impl GameSession {
    /// Generate a board and seat the players in the order given.
    pub fn new(
        id: Uuid,
        seats: Vec<SeatRequest>,
        seed: Option<u64>,
        rules: RulesMode,
    ) -> Result<Self, SessionError> {
        let board = match seed {
            Some(seed) => generate_standard_board(&mut StdRng::seed_from_u64(seed)),
            None => Board::standard(),
        };
        let players = seats
            .into_iter()
            .map(|seat| Player::new(seat.id, seat.name, seat.color))
            .collect();
        let game = GameState::new(board, players)?;

        Ok(Self {
            id,
            rules,
            watchers: HashSet::new(),
            game,
        })
    }

    pub fn game(&self) -> &GameState {
        &self.game
    }

    /// Apply a move under this session's rules.
    pub fn apply_action(
        &mut self,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, SessionError> {
        let events = self
            .game
            .apply_action(self.rules.validator(), player, action)?;
        Ok(events)
    }

    pub fn set_phase(&mut self, phase: TurnPhase) -> GameEvent {
        self.game.set_phase(phase)
    }

    pub fn snapshot(&self) -> GameStateSnapshot {
        game_snapshot(&self.game)
    }

    pub fn to_info(&self) -> GameInfo {
        GameInfo {
            id: self.id,
            players: self.game.players().iter().map(|p| p.name.clone()).collect(),
            current_player_index: self.game.current_player_index(),
            turn_phase: self.game.turn_phase(),
        }
    }
}
