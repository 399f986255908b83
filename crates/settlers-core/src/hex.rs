//! Hex coordinate system using axial coordinates (q, r).
//!
//! The board is a pointy-top hex grid. Every tile is addressed by its axial
//! coordinate; the third cube coordinate `s` is implicit (`q + r + s = 0`).
//! The standard board is the radius-2 hexagon of 19 tiles around the origin.

use serde::{Deserialize, Serialize};

/// Radius of the standard 19-tile board
pub const STANDARD_RADIUS: i32 = 2;

/// Direction of a hex edge, clockwise from NorthEast.
///
/// The discriminant is the edge index used on the wire (0 = NE ... 5 = NW).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Direction {
    /// Northeast edge (top-right)
    NorthEast = 0,
    /// East edge (right)
    East = 1,
    /// Southeast edge (bottom-right)
    SouthEast = 2,
    /// Southwest edge (bottom-left)
    SouthWest = 3,
    /// West edge (left)
    West = 4,
    /// Northwest edge (top-left)
    NorthWest = 5,
}

impl Direction {
    /// All edge directions in clockwise order starting from NorthEast
    pub const ALL: [Direction; 6] = [
        Direction::NorthEast,
        Direction::East,
        Direction::SouthEast,
        Direction::SouthWest,
        Direction::West,
        Direction::NorthWest,
    ];

    /// Edge index (0..=5)
    pub const fn index(self) -> u8 {
        self as u8
    }

    /// Direction for an edge index, if it is in range
    pub fn from_index(index: u8) -> Option<Self> {
        Self::ALL.get(index as usize).copied()
    }

    /// Unit axial offset `(dq, dr)` towards the neighbour across this edge
    pub const fn offset(self) -> (i32, i32) {
        match self {
            Direction::NorthEast => (1, -1),
            Direction::East => (1, 0),
            Direction::SouthEast => (0, 1),
            Direction::SouthWest => (-1, 1),
            Direction::West => (-1, 0),
            Direction::NorthWest => (0, -1),
        }
    }

    /// The same edge seen from the neighbouring hex
    pub const fn opposite(self) -> Self {
        match self {
            Direction::NorthEast => Direction::SouthWest,
            Direction::East => Direction::West,
            Direction::SouthEast => Direction::NorthWest,
            Direction::SouthWest => Direction::NorthEast,
            Direction::West => Direction::East,
            Direction::NorthWest => Direction::SouthEast,
        }
    }
}

/// Axial coordinate for hex grid.
///
/// In axial coordinates:
/// - `q` increases going east (right)
/// - `r` increases going southeast
/// - The third coordinate `s` (not stored) satisfies: q + r + s = 0
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub struct HexCoord {
    /// Column (increases going east)
    pub q: i32,
    /// Row (increases going southeast)
    pub r: i32,
}

impl HexCoord {
    /// Create a new hex coordinate
    pub const fn new(q: i32, r: i32) -> Self {
        Self { q, r }
    }

    /// The implicit third coordinate (s = -q - r)
    pub const fn s(&self) -> i32 {
        -self.q - self.r
    }

    /// Get the neighbor in a specific direction
    pub fn neighbor(&self, direction: Direction) -> HexCoord {
        let (dq, dr) = direction.offset();
        HexCoord::new(self.q + dq, self.r + dr)
    }

    /// The six neighboring hexes in clockwise order starting from NorthEast
    pub fn neighbors(&self) -> [HexCoord; 6] {
        Direction::ALL.map(|dir| self.neighbor(dir))
    }

    /// Distance to another hex (in hex steps)
    pub fn distance_to(&self, other: &HexCoord) -> u32 {
        let dq = (self.q - other.q).abs();
        let dr = (self.r - other.r).abs();
        let ds = (self.s() - other.s()).abs();
        ((dq + dr + ds) / 2) as u32
    }

    /// Which ring around the origin this hex lies on
    pub fn ring(&self) -> u32 {
        self.distance_to(&HexCoord::default())
    }

    /// Whether the hex is one of the 19 tiles of the standard board
    pub fn is_on_standard_board(&self) -> bool {
        self.ring() <= STANDARD_RADIUS as u32
    }

    /// Whether the hex lies on the outer ring of the standard board
    pub fn is_coastal(&self) -> bool {
        is_coastal(self.q, self.r)
    }

    /// The 19 coordinates of the standard board, row by row (r = -2..=2),
    /// west to east within a row.
    pub fn standard_layout() -> Vec<HexCoord> {
        let mut coords = Vec::with_capacity(19);
        for r in -STANDARD_RADIUS..=STANDARD_RADIUS {
            let q_min = (-STANDARD_RADIUS).max(-STANDARD_RADIUS - r);
            let q_max = STANDARD_RADIUS.min(STANDARD_RADIUS - r);
            for q in q_min..=q_max {
                coords.push(HexCoord::new(q, r));
            }
        }
        coords
    }
}

/// True iff `(q, r)` is on the outer ring of a radius-2 board:
/// `max(|q|, |r|, |q + r|) == 2`.
pub fn is_coastal(q: i32, r: i32) -> bool {
    q.abs().max(r.abs()).max((q + r).abs()) == STANDARD_RADIUS
}
