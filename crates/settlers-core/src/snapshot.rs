//! Wire snapshots of the game.
//!
//! Each domain type has a plain mapping function producing an owned,
//! serializable copy. Snapshots never borrow from the live state, so a
//! transport can hand them to clients after releasing its lock. Optional
//! fields always serialize as an explicit `null`.

use crate::board::{Board, HexTile, Port};
use crate::game::{GameState, TurnPhase};
use crate::player::{HexPosition, Player, PlayerId, ResourceHand, Road};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexTileSnapshot {
    pub id: usize,
    pub q: i32,
    pub r: i32,
    /// `wood`, `sheep`, `wheat`, `brick`, `ore` or `desert`
    pub resource: String,
    pub number: Option<u8>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PortSnapshot {
    pub q: i32,
    pub r: i32,
    /// Edge index, 0 = NE clockwise to 5 = NW
    pub direction: u8,
    /// None for a generic 3:1 port
    pub resource: Option<String>,
    pub ratio: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoardSnapshot {
    pub tiles: Vec<HexTileSnapshot>,
    pub robber: Option<HexTileSnapshot>,
    pub ports: Vec<PortSnapshot>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexPositionSnapshot {
    pub q: i32,
    pub r: i32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoadSnapshot {
    pub start: HexPositionSnapshot,
    pub end: HexPositionSnapshot,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerSnapshot {
    pub id: PlayerId,
    pub name: String,
    pub color: String,
    /// All five resources, keyed by name
    pub resources: ResourceHand,
    pub settlements: Vec<HexPositionSnapshot>,
    pub cities: Vec<HexPositionSnapshot>,
    pub roads: Vec<RoadSnapshot>,
    pub victory_points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateSnapshot {
    pub board: BoardSnapshot,
    pub players: Vec<PlayerSnapshot>,
    pub current_player_index: usize,
    pub turn_phase: TurnPhase,
}

pub fn tile_snapshot(tile: &HexTile) -> HexTileSnapshot {
    HexTileSnapshot {
        id: tile.id,
        q: tile.coord.q,
        r: tile.coord.r,
        resource: tile.terrain.name().to_string(),
        number: tile.number,
    }
}

pub fn port_snapshot(port: &Port) -> PortSnapshot {
    PortSnapshot {
        q: port.anchor.q,
        r: port.anchor.r,
        direction: port.direction.index(),
        resource: port.kind.resource().map(|r| r.name().to_string()),
        ratio: port.kind.ratio(),
    }
}

pub fn board_snapshot(board: &Board) -> BoardSnapshot {
    BoardSnapshot {
        tiles: board.tiles().iter().map(tile_snapshot).collect(),
        robber: board.robber().map(tile_snapshot),
        ports: board.ports().iter().map(port_snapshot).collect(),
    }
}

pub fn position_snapshot(position: &HexPosition) -> HexPositionSnapshot {
    HexPositionSnapshot {
        q: position.q,
        r: position.r,
    }
}

pub fn road_snapshot(road: &Road) -> RoadSnapshot {
    RoadSnapshot {
        start: position_snapshot(&road.start),
        end: position_snapshot(&road.end),
    }
}

pub fn player_snapshot(player: &Player) -> PlayerSnapshot {
    PlayerSnapshot {
        id: player.id,
        name: player.name.clone(),
        color: player.color.clone(),
        resources: player.resources,
        settlements: player.settlements().iter().map(position_snapshot).collect(),
        cities: player.cities().iter().map(position_snapshot).collect(),
        roads: player.roads().iter().map(road_snapshot).collect(),
        victory_points: player.victory_points(),
    }
}

pub fn game_snapshot(state: &GameState) -> GameStateSnapshot {
    GameStateSnapshot {
        board: board_snapshot(state.board()),
        players: state.players().iter().map(player_snapshot).collect(),
        current_player_index: state.current_player_index(),
        turn_phase: state.turn_phase(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::{PortKind, Resource, Terrain};
    use crate::hex::{Direction, HexCoord};
    use crate::rules::Permissive;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    #[test]
    fn test_desert_number_serializes_as_null() {
        let tile = HexTile::new(4, HexCoord::new(0, -1), Terrain::Desert, None);
        let value = serde_json::to_value(tile_snapshot(&tile)).unwrap();
        assert_eq!(
            value,
            json!({"id": 4, "q": 0, "r": -1, "resource": "desert", "number": null})
        );
    }

    #[test]
    fn test_board_without_desert_has_null_robber() {
        let tiles = vec![HexTile::new(
            0,
            HexCoord::new(0, 0),
            Terrain::Resource(Resource::Ore),
            Some(8),
        )];
        let board = Board::from_parts(tiles, vec![]);
        let value = serde_json::to_value(board_snapshot(&board)).unwrap();

        assert!(value.get("robber").is_some_and(|r| r.is_null()));
        assert_eq!(value["tiles"][0]["resource"], json!("ore"));
    }

    #[test]
    fn test_port_snapshot_fields() {
        let generic = Port {
            anchor: HexCoord::new(-2, 1),
            direction: Direction::West,
            kind: PortKind::Generic,
        };
        assert_eq!(
            serde_json::to_value(port_snapshot(&generic)).unwrap(),
            json!({"q": -2, "r": 1, "direction": 4, "resource": null, "ratio": 3})
        );

        let wheat = Port {
            kind: PortKind::Specific(Resource::Wheat),
            ..generic
        };
        assert_eq!(port_snapshot(&wheat).resource.as_deref(), Some("wheat"));
        assert_eq!(port_snapshot(&wheat).ratio, 2);
    }

    #[test]
    fn test_player_snapshot_has_all_resource_keys() {
        let player = Player::new(1, "Alice", "red");
        let value = serde_json::to_value(player_snapshot(&player)).unwrap();

        assert_eq!(
            value["resources"],
            json!({"wood": 0, "sheep": 0, "wheat": 0, "brick": 0, "ore": 0})
        );
        assert_eq!(value["victory_points"], json!(0));
        assert_eq!(value["settlements"], json!([]));
    }

    #[test]
    fn test_game_snapshot_shape() {
        let mut state = GameState::new(
            Board::standard(),
            vec![Player::new(1, "Alice", "red"), Player::new(2, "Bob", "blue")],
        )
        .unwrap();
        state
            .place_road(
                &Permissive,
                1,
                Road::new(HexPosition::new(0, 0), HexPosition::new(1, 0)),
            )
            .unwrap();

        let value = serde_json::to_value(game_snapshot(&state)).unwrap();
        assert_eq!(value["turn_phase"], json!("setup"));
        assert_eq!(value["current_player_index"], json!(0));
        assert_eq!(value["board"]["tiles"].as_array().map(Vec::len), Some(19));
        assert_eq!(value["board"]["ports"].as_array().map(Vec::len), Some(9));
        assert_eq!(
            value["players"][0]["roads"],
            json!([{"start": {"q": 0, "r": 0}, "end": {"q": 1, "r": 0}}])
        );
        assert_eq!(value["board"]["robber"]["resource"], json!("desert"));
    }
}
