//! Settlers - board generation and game-state engine for a hex board game
//!
//! This crate provides the core game logic, including:
//! - Axial hex coordinates and edge directions
//! - Standard board generation with terrain, number tokens, ports and the robber
//! - Player state and resource management
//! - A turn-sequenced game state with pluggable placement rules
//! - Serializable snapshots for transports
//!
//! # Modules
//!
//! - [`hex`]: Coordinate system and coastal detection
//! - [`board`]: Board representation and the standard generator
//! - [`player`]: Player state, positions, roads and resources
//! - [`game`]: Game state, turn order and move application
//! - [`rules`]: Placement validators
//! - [`actions`]: Player actions and resulting events
//! - [`snapshot`]: Wire representation of the state
//!
//! The engine is synchronous and has no interior locking; a host that shares
//! a `GameState` between tasks must serialize mutations itself.

pub mod actions;
pub mod board;
pub mod game;
pub mod hex;
pub mod player;
pub mod rules;
pub mod snapshot;

// Re-export commonly used types
pub use actions::{GameAction, GameEvent};
pub use board::{generate_standard_board, Board, HexTile, Port, PortKind, Resource, Terrain};
pub use game::{GameError, GameState, TurnPhase};
pub use hex::{is_coastal, Direction, HexCoord};
pub use player::{costs, DevelopmentCard, HexPosition, Player, PlayerId, ResourceHand, Road};
pub use rules::{MoveRejection, Permissive, PlacementValidator, StandardRules};
pub use snapshot::{game_snapshot, BoardSnapshot, GameStateSnapshot, PlayerSnapshot};
