//! Game actions that players can take.
//!
//! This module defines the moves a player can submit and the events that
//! result from applying them.

use crate::game::TurnPhase;
use crate::player::{HexPosition, PlayerId, ResourceHand, Road};
use serde::{Deserialize, Serialize};

/// All possible actions a player can take
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameAction {
    /// Build a settlement at a position
    PlaceSettlement(HexPosition),
    /// Build a road
    PlaceRoad(Road),
    /// Upgrade a settlement to a city
    BuildCity(HexPosition),
    /// Move the robber to the tile with this id
    MoveRobber(usize),
    /// End your turn
    EndTurn,
}

/// Events that occur as a result of actions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameEvent {
    /// Building costs were paid
    ResourcesSpent {
        player: PlayerId,
        cost: ResourceHand,
    },

    /// A settlement was built
    SettlementBuilt {
        player: PlayerId,
        location: HexPosition,
        victory_points: u32,
    },

    /// A settlement was upgraded to a city
    CityBuilt {
        player: PlayerId,
        location: HexPosition,
        victory_points: u32,
    },

    /// A road was built
    RoadBuilt { player: PlayerId, road: Road },

    /// The robber was moved
    RobberMoved {
        player: PlayerId,
        from: Option<usize>,
        to: usize,
    },

    /// Turn ended
    TurnEnded {
        player: PlayerId,
        next_player: PlayerId,
    },

    /// The host changed the turn phase
    PhaseChanged { from: TurnPhase, to: TurnPhase },
}
