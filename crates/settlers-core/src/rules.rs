//! Placement rules.
//!
//! Validation policy is kept apart from state mutation: every `GameState`
//! placement operation asks a [`PlacementValidator`] first and only mutates
//! once the validator has accepted and the cost is affordable. Two policies
//! ship with the crate:
//!
//! - [`Permissive`] accepts everything and charges nothing.
//! - [`StandardRules`] enforces turn order, phase gating, board bounds,
//!   occupancy, the distance rule, road connectivity and building costs.

use crate::game::{GameState, TurnPhase};
use crate::player::{costs, HexPosition, Player, ResourceHand, Road};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Why a move was refused
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize, Deserialize)]
pub enum MoveRejection {
    #[error("Not your turn")]
    OutOfTurn,

    #[error("Illegal position: {0}")]
    IllegalPosition(String),

    #[error("Cannot afford this")]
    InsufficientResources,

    #[error("Not allowed during the {actual:?} phase")]
    PhaseMismatch { actual: TurnPhase },
}

/// Decides whether a proposed move is legal and what it costs.
///
/// Implementations must not mutate anything; they only look at the state.
pub trait PlacementValidator {
    fn validate_settlement(
        &self,
        state: &GameState,
        player: &Player,
        position: HexPosition,
    ) -> Result<(), MoveRejection>;

    fn validate_road(
        &self,
        state: &GameState,
        player: &Player,
        road: &Road,
    ) -> Result<(), MoveRejection>;

    fn validate_city(
        &self,
        _state: &GameState,
        _player: &Player,
        _position: HexPosition,
    ) -> Result<(), MoveRejection> {
        Ok(())
    }

    fn validate_robber_move(
        &self,
        _state: &GameState,
        _player: &Player,
        _tile_id: usize,
    ) -> Result<(), MoveRejection> {
        Ok(())
    }

    fn validate_end_turn(&self, _state: &GameState, _player: &Player) -> Result<(), MoveRejection> {
        Ok(())
    }

    fn settlement_cost(&self, _state: &GameState) -> ResourceHand {
        ResourceHand::new()
    }

    fn road_cost(&self, _state: &GameState) -> ResourceHand {
        ResourceHand::new()
    }

    fn city_cost(&self, _state: &GameState) -> ResourceHand {
        ResourceHand::new()
    }
}

/// Accepts every placement for free
#[derive(Debug, Clone, Copy, Default)]
pub struct Permissive;

impl PlacementValidator for Permissive {
    fn validate_settlement(
        &self,
        _state: &GameState,
        _player: &Player,
        _position: HexPosition,
    ) -> Result<(), MoveRejection> {
        Ok(())
    }

    fn validate_road(
        &self,
        _state: &GameState,
        _player: &Player,
        _road: &Road,
    ) -> Result<(), MoveRejection> {
        Ok(())
    }
}

/// Standard placement rules on the tile-centre position model.
///
/// Positions are tile centres, so "adjacent" means one hex step apart and a
/// road joins two adjacent tiles.
#[derive(Debug, Clone, Copy, Default)]
pub struct StandardRules;

impl StandardRules {
    fn require_turn(state: &GameState, player: &Player) -> Result<(), MoveRejection> {
        if state.current_player().id != player.id {
            return Err(MoveRejection::OutOfTurn);
        }
        Ok(())
    }

    fn require_phase(state: &GameState, allowed: &[TurnPhase]) -> Result<(), MoveRejection> {
        let actual = state.turn_phase();
        if !allowed.contains(&actual) {
            return Err(MoveRejection::PhaseMismatch { actual });
        }
        Ok(())
    }

    fn require_on_board(state: &GameState, position: &HexPosition) -> Result<(), MoveRejection> {
        if !state.board().contains(&position.coord()) {
            return Err(MoveRejection::IllegalPosition(format!(
                "({}, {}) is off the board",
                position.q, position.r
            )));
        }
        Ok(())
    }

    fn charged_in_main(state: &GameState, cost: ResourceHand) -> ResourceHand {
        if state.turn_phase() == TurnPhase::Main {
            cost
        } else {
            ResourceHand::new()
        }
    }
}

impl PlacementValidator for StandardRules {
    fn validate_settlement(
        &self,
        state: &GameState,
        player: &Player,
        position: HexPosition,
    ) -> Result<(), MoveRejection> {
        Self::require_turn(state, player)?;
        Self::require_phase(state, &[TurnPhase::Setup, TurnPhase::Main])?;
        Self::require_on_board(state, &position)?;

        if state.building_owner(&position).is_some() {
            return Err(MoveRejection::IllegalPosition(format!(
                "({}, {}) is already built on",
                position.q, position.r
            )));
        }

        // Distance rule: no building on a neighbouring position
        let crowded = state
            .players()
            .iter()
            .flat_map(|p| p.settlements().iter().chain(p.cities()))
            .any(|other| other.distance_to(&position) == 1);
        if crowded {
            return Err(MoveRejection::IllegalPosition(format!(
                "({}, {}) is next to another building",
                position.q, position.r
            )));
        }

        if state.turn_phase() == TurnPhase::Main && !player.has_road_touching(&position) {
            return Err(MoveRejection::IllegalPosition(format!(
                "({}, {}) is not connected to your roads",
                position.q, position.r
            )));
        }

        Ok(())
    }

    fn validate_road(
        &self,
        state: &GameState,
        player: &Player,
        road: &Road,
    ) -> Result<(), MoveRejection> {
        Self::require_turn(state, player)?;
        Self::require_phase(state, &[TurnPhase::Setup, TurnPhase::Main])?;
        Self::require_on_board(state, &road.start)?;
        Self::require_on_board(state, &road.end)?;

        if road.start.distance_to(&road.end) != 1 {
            return Err(MoveRejection::IllegalPosition(
                "road endpoints must be adjacent".to_string(),
            ));
        }

        if state.road_owner(road).is_some() {
            return Err(MoveRejection::IllegalPosition(
                "road already built".to_string(),
            ));
        }

        // Must extend the player's network, and cannot pass through an
        // opponent's building to reach it
        let connected = [road.start, road.end].iter().any(|end| {
            if player.has_building_at(end) {
                return true;
            }
            let blocked = state
                .building_owner(end)
                .is_some_and(|owner| owner != player.id);
            !blocked && player.has_road_touching(end)
        });
        if !connected {
            return Err(MoveRejection::IllegalPosition(
                "road is not connected to your network".to_string(),
            ));
        }

        Ok(())
    }

    fn validate_city(
        &self,
        state: &GameState,
        player: &Player,
        _position: HexPosition,
    ) -> Result<(), MoveRejection> {
        Self::require_turn(state, player)?;
        Self::require_phase(state, &[TurnPhase::Main])
    }

    fn validate_robber_move(
        &self,
        state: &GameState,
        player: &Player,
        tile_id: usize,
    ) -> Result<(), MoveRejection> {
        Self::require_turn(state, player)?;
        Self::require_phase(state, &[TurnPhase::Robbing])?;
        if state.board().robber_tile_id() == Some(tile_id) {
            return Err(MoveRejection::IllegalPosition(
                "robber must move to a different tile".to_string(),
            ));
        }
        Ok(())
    }

    fn validate_end_turn(&self, state: &GameState, player: &Player) -> Result<(), MoveRejection> {
        Self::require_turn(state, player)
    }

    fn settlement_cost(&self, state: &GameState) -> ResourceHand {
        Self::charged_in_main(state, costs::settlement())
    }

    fn road_cost(&self, state: &GameState) -> ResourceHand {
        Self::charged_in_main(state, costs::road())
    }

    fn city_cost(&self, state: &GameState) -> ResourceHand {
        Self::charged_in_main(state, costs::city())
    }
}
