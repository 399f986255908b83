//! Game board representation: terrain tiles, number tokens, ports and the robber.
//!
//! This module contains:
//! - Resource and terrain types
//! - Port types (generic 3:1 and resource-specific 2:1)
//! - The standard board generator
//! - Board queries and the robber relocation contract

use crate::game::GameError;
use crate::hex::{Direction, HexCoord};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// The five tradeable resources
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Resource {
    Wood,
    Sheep,
    Wheat,
    Brick,
    Ore,
}

impl Resource {
    /// All resource types
    pub const ALL: [Resource; 5] = [
        Resource::Wood,
        Resource::Sheep,
        Resource::Wheat,
        Resource::Brick,
        Resource::Ore,
    ];

    /// Lowercase wire name
    pub fn name(&self) -> &'static str {
        match self {
            Resource::Wood => "wood",
            Resource::Sheep => "sheep",
            Resource::Wheat => "wheat",
            Resource::Brick => "brick",
            Resource::Ore => "ore",
        }
    }
}

/// What a land tile is made of
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    /// Produces a resource when its number is rolled
    Resource(Resource),
    /// Produces nothing and starts with the robber
    Desert,
}

impl Terrain {
    /// The resource this terrain produces, if any
    pub fn resource(&self) -> Option<Resource> {
        match self {
            Terrain::Resource(r) => Some(*r),
            Terrain::Desert => None,
        }
    }

    pub fn is_desert(&self) -> bool {
        matches!(self, Terrain::Desert)
    }

    /// Lowercase wire name (`desert` or the resource name)
    pub fn name(&self) -> &'static str {
        match self {
            Terrain::Resource(r) => r.name(),
            Terrain::Desert => "desert",
        }
    }
}

/// Port types for maritime trading
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PortKind {
    /// 3:1 trade any resource
    Generic,
    /// 2:1 trade for a specific resource
    Specific(Resource),
}

impl PortKind {
    /// The exchange rate for this port
    pub fn ratio(&self) -> u32 {
        match self {
            PortKind::Generic => 3,
            PortKind::Specific(_) => 2,
        }
    }

    /// The resource a 2:1 port accepts
    pub fn resource(&self) -> Option<Resource> {
        match self {
            PortKind::Generic => None,
            PortKind::Specific(r) => Some(*r),
        }
    }
}

/// A port docked on one edge of a coastal tile
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    /// The coastal tile the port is attached to
    pub anchor: HexCoord,
    /// Which edge of the anchor tile faces the sea
    pub direction: Direction,
    pub kind: PortKind,
}

/// A single land tile on the board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HexTile {
    /// Stable identifier (0..18 on the standard board)
    pub id: usize,
    /// Position on the hex grid
    pub coord: HexCoord,
    pub terrain: Terrain,
    /// Dice number that triggers production (None for desert)
    pub number: Option<u8>,
}

impl HexTile {
    pub fn new(id: usize, coord: HexCoord, terrain: Terrain, number: Option<u8>) -> Self {
        Self {
            id,
            coord,
            terrain,
            number,
        }
    }

    /// Get the resource this tile produces, if any
    pub fn resource(&self) -> Option<Resource> {
        self.terrain.resource()
    }
}

/// Standard terrain distribution: 4 wood, 4 sheep, 4 wheat, 3 brick, 3 ore, 1 desert
pub fn standard_terrain() -> Vec<Terrain> {
    let counts = [
        (Terrain::Resource(Resource::Wood), 4),
        (Terrain::Resource(Resource::Sheep), 4),
        (Terrain::Resource(Resource::Wheat), 4),
        (Terrain::Resource(Resource::Brick), 3),
        (Terrain::Resource(Resource::Ore), 3),
        (Terrain::Desert, 1),
    ];
    counts
        .into_iter()
        .flat_map(|(terrain, n)| std::iter::repeat(terrain).take(n))
        .collect()
}

/// Standard number tokens (two of 3-6 and 8-11, one each of 2 and 12, never 7)
pub const STANDARD_NUMBERS: [u8; 18] = [2, 3, 3, 4, 4, 5, 5, 6, 6, 8, 8, 9, 9, 10, 10, 11, 11, 12];

/// Fixed port anchors around the perimeter, each facing off-board
pub const STANDARD_PORT_ANCHORS: [(i32, i32, Direction); 9] = [
    (0, -2, Direction::NorthWest),
    (1, -2, Direction::NorthEast),
    (2, -1, Direction::East),
    (2, 0, Direction::SouthEast),
    (1, 1, Direction::SouthEast),
    (-1, 2, Direction::SouthWest),
    (-2, 2, Direction::West),
    (-2, 1, Direction::West),
    (-1, -1, Direction::NorthWest),
];

/// Standard port set: four generic 3:1 ports and one 2:1 port per resource
pub fn standard_port_kinds() -> Vec<PortKind> {
    let mut kinds = vec![PortKind::Generic; 4];
    kinds.extend(Resource::ALL.into_iter().map(PortKind::Specific));
    kinds
}

/// The complete game board
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Board {
    /// Tiles ordered by id
    tiles: Vec<HexTile>,
    ports: Vec<Port>,
    /// Id of the tile the robber stands on
    robber: Option<usize>,
}

impl Board {
    /// Assemble a board from tiles and ports; the robber starts on the desert.
    ///
    /// Tiles must be ordered by id.
    pub fn from_parts(tiles: Vec<HexTile>, ports: Vec<Port>) -> Self {
        assert!(
            tiles.iter().enumerate().all(|(i, t)| t.id == i),
            "tile ids must match their position"
        );
        let robber = tiles.iter().find(|t| t.terrain.is_desert()).map(|t| t.id);
        Self {
            tiles,
            ports,
            robber,
        }
    }

    /// Create the standard board using the thread-local RNG
    pub fn standard() -> Self {
        let mut rng = rand::thread_rng();
        Self::standard_with_rng(&mut rng)
    }

    /// Create the standard board layout with randomized terrain, numbers and ports.
    ///
    /// Terrain, number tokens and port kinds are three independent shuffles of
    /// the provided RNG, so a seeded RNG yields a reproducible board.
    pub fn standard_with_rng<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let coords = HexCoord::standard_layout();

        let mut terrain = standard_terrain();
        terrain.shuffle(rng);

        let mut numbers = STANDARD_NUMBERS.to_vec();
        numbers.shuffle(rng);

        assert_eq!(coords.len(), terrain.len(), "terrain count must match layout");
        assert_eq!(
            numbers.len(),
            terrain.iter().filter(|t| !t.is_desert()).count(),
            "number tokens must cover every productive tile"
        );

        let mut next_number = numbers.into_iter();
        let tiles: Vec<HexTile> = coords
            .into_iter()
            .zip(terrain)
            .enumerate()
            .map(|(id, (coord, terrain))| {
                // The desert does not consume a token
                let number = if terrain.is_desert() {
                    None
                } else {
                    next_number.next()
                };
                HexTile::new(id, coord, terrain, number)
            })
            .collect();

        assert_eq!(
            tiles.iter().filter(|t| t.terrain.is_desert()).count(),
            1,
            "standard board has exactly one desert"
        );

        let ports = Self::standard_ports(rng);
        Self::from_parts(tiles, ports)
    }

    /// Shuffle the standard port kinds onto the fixed anchors
    fn standard_ports<R: Rng + ?Sized>(rng: &mut R) -> Vec<Port> {
        let mut kinds = standard_port_kinds();
        kinds.shuffle(rng);

        assert_eq!(kinds.len(), STANDARD_PORT_ANCHORS.len(), "one port kind per anchor");

        STANDARD_PORT_ANCHORS
            .iter()
            .zip(kinds)
            .map(|(&(q, r, direction), kind)| {
                let port = Port {
                    anchor: HexCoord::new(q, r),
                    direction,
                    kind,
                };
                debug!(
                    q,
                    r,
                    direction = direction.index(),
                    ratio = kind.ratio(),
                    resource = ?kind.resource(),
                    "generated port"
                );
                port
            })
            .collect()
    }

    // ==================== Query Methods ====================

    /// All tiles, ordered by id
    pub fn tiles(&self) -> &[HexTile] {
        &self.tiles
    }

    pub fn ports(&self) -> &[Port] {
        &self.ports
    }

    /// Get a tile by id
    pub fn tile(&self, id: usize) -> Option<&HexTile> {
        self.tiles.get(id)
    }

    /// Get a tile by coordinate
    pub fn tile_at(&self, coord: &HexCoord) -> Option<&HexTile> {
        self.tiles.iter().find(|t| t.coord == *coord)
    }

    /// Whether a coordinate is a tile of this board
    pub fn contains(&self, coord: &HexCoord) -> bool {
        self.tile_at(coord).is_some()
    }

    /// The desert tile, if the board has one
    pub fn desert(&self) -> Option<&HexTile> {
        self.tiles.iter().find(|t| t.terrain.is_desert())
    }

    /// Id of the tile the robber occupies
    pub fn robber_tile_id(&self) -> Option<usize> {
        self.robber
    }

    /// The tile the robber occupies
    pub fn robber(&self) -> Option<&HexTile> {
        self.robber.and_then(|id| self.tiles.get(id))
    }

    /// Ports anchored on the given tile
    pub fn ports_at(&self, coord: &HexCoord) -> Vec<&Port> {
        self.ports.iter().filter(|p| p.anchor == *coord).collect()
    }

    // ==================== Mutation Methods ====================

    /// Move the robber to another tile of this board
    pub fn move_robber(&mut self, tile_id: usize) -> Result<(), GameError> {
        if tile_id >= self.tiles.len() {
            return Err(GameError::UnknownTile(tile_id));
        }
        self.robber = Some(tile_id);
        Ok(())
    }
}

/// Generate a standard board from an explicit random source
pub fn generate_standard_board<R: Rng + ?Sized>(rng: &mut R) -> Board {
    Board::standard_with_rng(rng)
}
