//! Core game state.
//!
//! This module contains the `GameState` struct: the board, the seated players,
//! whose turn it is and the coarse turn phase. Every placement goes through a
//! [`PlacementValidator`] before anything is mutated.

use crate::actions::{GameAction, GameEvent};
use crate::board::Board;
use crate::player::{HexPosition, Player, PlayerId, ResourceHand, Road};
use crate::rules::{MoveRejection, PlacementValidator};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;
use tracing::debug;

/// Coarse turn phase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TurnPhase {
    /// Initial placement
    Setup,
    /// Regular building turn
    Main,
    /// The robber must be moved
    Robbing,
    /// Players are trading
    Trading,
}

impl TurnPhase {
    /// Lowercase wire name
    pub fn name(&self) -> &'static str {
        match self {
            TurnPhase::Setup => "setup",
            TurnPhase::Main => "main",
            TurnPhase::Robbing => "robbing",
            TurnPhase::Trading => "trading",
        }
    }
}

/// Errors that can occur when building or mutating a game
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum GameError {
    #[error("A game needs at least one player")]
    NoPlayers,

    #[error("Player id {0} is used twice")]
    DuplicatePlayer(PlayerId),

    #[error("No player with id {0}")]
    UnknownPlayer(PlayerId),

    #[error("No tile with id {0}")]
    UnknownTile(usize),

    #[error("Player index {index} is out of range for {players} players")]
    InvalidPlayerIndex { index: usize, players: usize },

    #[error(transparent)]
    Rejected(#[from] MoveRejection),
}

/// The complete game state
///
/// Deserialization goes through the same checks as [`GameState::new`], so a
/// loaded state always has at least one player and a valid current index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "RawGameState")]
pub struct GameState {
    board: Board,
    players: Vec<Player>,
    current_player_index: usize,
    turn_phase: TurnPhase,
}

/// Unchecked wire form of [`GameState`]
#[derive(Deserialize)]
struct RawGameState {
    board: Board,
    players: Vec<Player>,
    current_player_index: usize,
    turn_phase: TurnPhase,
}

impl TryFrom<RawGameState> for GameState {
    type Error = GameError;

    fn try_from(raw: RawGameState) -> Result<Self, Self::Error> {
        let mut state = GameState::new(raw.board, raw.players)?;
        if raw.current_player_index >= state.players.len() {
            return Err(GameError::InvalidPlayerIndex {
                index: raw.current_player_index,
                players: state.players.len(),
            });
        }
        state.current_player_index = raw.current_player_index;
        state.turn_phase = raw.turn_phase;
        Ok(state)
    }
}

impl GameState {
    /// Start a game on an existing board with players seated in turn order
    pub fn new(board: Board, players: Vec<Player>) -> Result<Self, GameError> {
        if players.is_empty() {
            return Err(GameError::NoPlayers);
        }

        let mut seen = HashSet::new();
        for player in &players {
            if !seen.insert(player.id) {
                return Err(GameError::DuplicatePlayer(player.id));
            }
        }

        Ok(Self {
            board,
            players,
            current_player_index: 0,
            turn_phase: TurnPhase::Setup,
        })
    }

    pub fn board(&self) -> &Board {
        &self.board
    }

    /// Players in turn order
    pub fn players(&self) -> &[Player] {
        &self.players
    }

    pub fn player_count(&self) -> usize {
        self.players.len()
    }

    pub fn current_player_index(&self) -> usize {
        self.current_player_index
    }

    pub fn turn_phase(&self) -> TurnPhase {
        self.turn_phase
    }

    /// The player whose turn it is
    pub fn current_player(&self) -> &Player {
        &self.players[self.current_player_index]
    }

    /// Get a player by id
    pub fn player(&self, id: PlayerId) -> Option<&Player> {
        self.players.iter().find(|p| p.id == id)
    }

    fn player_index(&self, id: PlayerId) -> Result<usize, GameError> {
        self.players
            .iter()
            .position(|p| p.id == id)
            .ok_or(GameError::UnknownPlayer(id))
    }

    /// Who owns the settlement or city at `position`
    pub fn building_owner(&self, position: &HexPosition) -> Option<PlayerId> {
        self.players
            .iter()
            .find(|p| p.has_building_at(position))
            .map(|p| p.id)
    }

    /// Who owns a road along the same edge
    pub fn road_owner(&self, road: &Road) -> Option<PlayerId> {
        self.players.iter().find(|p| p.has_road(road)).map(|p| p.id)
    }

    // ==================== Turn Management ====================

    /// Pass the turn to the next player, wrapping around
    pub fn advance_turn(&mut self) -> GameEvent {
        let player = self.current_player().id;
        self.current_player_index = (self.current_player_index + 1) % self.players.len();
        GameEvent::TurnEnded {
            player,
            next_player: self.current_player().id,
        }
    }

    /// Change the turn phase. Phase changes are driven by the host, not the engine.
    pub fn set_phase(&mut self, phase: TurnPhase) -> GameEvent {
        let from = self.turn_phase;
        self.turn_phase = phase;
        GameEvent::PhaseChanged { from, to: phase }
    }

    // ==================== Moves ====================

    /// Place a settlement for `player` at `position`
    pub fn place_settlement<V: PlacementValidator + ?Sized>(
        &mut self,
        rules: &V,
        player: PlayerId,
        position: HexPosition,
    ) -> Result<Vec<GameEvent>, GameError> {
        let index = self.player_index(player)?;
        let acting = &self.players[index];
        rules.validate_settlement(self, acting, position)?;
        let cost = rules.settlement_cost(self);
        Self::require_affordable(acting, &cost)?;

        let acting = &mut self.players[index];
        let mut events = Self::charge(acting, cost);
        acting.add_settlement(position);
        debug!(player, q = position.q, r = position.r, "settlement placed");

        events.push(GameEvent::SettlementBuilt {
            player,
            location: position,
            victory_points: acting.victory_points(),
        });
        Ok(events)
    }

    /// Place a road for `player`
    pub fn place_road<V: PlacementValidator + ?Sized>(
        &mut self,
        rules: &V,
        player: PlayerId,
        road: Road,
    ) -> Result<Vec<GameEvent>, GameError> {
        let index = self.player_index(player)?;
        let acting = &self.players[index];
        rules.validate_road(self, acting, &road)?;
        let cost = rules.road_cost(self);
        Self::require_affordable(acting, &cost)?;

        let acting = &mut self.players[index];
        let mut events = Self::charge(acting, cost);
        acting.add_road(road);
        debug!(player, ?road, "road placed");

        events.push(GameEvent::RoadBuilt { player, road });
        Ok(events)
    }

    /// Upgrade one of `player`'s settlements to a city
    pub fn build_city<V: PlacementValidator + ?Sized>(
        &mut self,
        rules: &V,
        player: PlayerId,
        position: HexPosition,
    ) -> Result<Vec<GameEvent>, GameError> {
        let index = self.player_index(player)?;
        let acting = &self.players[index];
        if !acting.has_settlement_at(&position) {
            return Err(MoveRejection::IllegalPosition(format!(
                "no settlement of yours at ({}, {})",
                position.q, position.r
            ))
            .into());
        }
        rules.validate_city(self, acting, position)?;
        let cost = rules.city_cost(self);
        Self::require_affordable(acting, &cost)?;

        let acting = &mut self.players[index];
        let mut events = Self::charge(acting, cost);
        acting.upgrade_to_city(position);
        debug!(player, q = position.q, r = position.r, "city built");

        events.push(GameEvent::CityBuilt {
            player,
            location: position,
            victory_points: acting.victory_points(),
        });
        Ok(events)
    }

    /// Relocate the robber to another tile
    pub fn move_robber<V: PlacementValidator + ?Sized>(
        &mut self,
        rules: &V,
        player: PlayerId,
        tile_id: usize,
    ) -> Result<Vec<GameEvent>, GameError> {
        let index = self.player_index(player)?;
        if self.board.tile(tile_id).is_none() {
            return Err(GameError::UnknownTile(tile_id));
        }
        rules.validate_robber_move(self, &self.players[index], tile_id)?;

        let from = self.board.robber_tile_id();
        self.board.move_robber(tile_id)?;
        debug!(player, tile_id, "robber moved");

        Ok(vec![GameEvent::RobberMoved {
            player,
            from,
            to: tile_id,
        }])
    }

    /// End `player`'s turn
    pub fn end_turn<V: PlacementValidator + ?Sized>(
        &mut self,
        rules: &V,
        player: PlayerId,
    ) -> Result<Vec<GameEvent>, GameError> {
        let index = self.player_index(player)?;
        rules.validate_end_turn(self, &self.players[index])?;
        Ok(vec![self.advance_turn()])
    }

    /// Apply an action on behalf of `player`
    pub fn apply_action<V: PlacementValidator + ?Sized>(
        &mut self,
        rules: &V,
        player: PlayerId,
        action: GameAction,
    ) -> Result<Vec<GameEvent>, GameError> {
        match action {
            GameAction::PlaceSettlement(position) => self.place_settlement(rules, player, position),
            GameAction::PlaceRoad(road) => self.place_road(rules, player, road),
            GameAction::BuildCity(position) => self.build_city(rules, player, position),
            GameAction::MoveRobber(tile_id) => self.move_robber(rules, player, tile_id),
            GameAction::EndTurn => self.end_turn(rules, player),
        }
    }

    // ==================== Helper Methods ====================

    fn require_affordable(player: &Player, cost: &ResourceHand) -> Result<(), MoveRejection> {
        if !player.resources.can_afford(cost) {
            return Err(MoveRejection::InsufficientResources);
        }
        Ok(())
    }

    /// Deduct an already-checked cost
    fn charge(player: &mut Player, cost: ResourceHand) -> Vec<GameEvent> {
        if cost.is_empty() || !player.resources.try_subtract(&cost) {
            return Vec::new();
        }
        vec![GameEvent::ResourcesSpent {
            player: player.id,
            cost,
        }]
    }
}
